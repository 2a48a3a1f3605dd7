//! Per-request-class generation tokens.
//!
//! Every remote call is issued with the latest token of its class. A completion is
//! applied only while its token is still the latest one; anything older was
//! superseded and is dropped.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Optimize,
    Categories,
    GlassTypes,
    Pricing,
    PdfExport,
    History,
    ClearHistory,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        RequestKind::Optimize,
        RequestKind::Categories,
        RequestKind::GlassTypes,
        RequestKind::Pricing,
        RequestKind::PdfExport,
        RequestKind::History,
        RequestKind::ClearHistory,
    ];

    fn index(self) -> usize {
        match self {
            RequestKind::Optimize => 0,
            RequestKind::Categories => 1,
            RequestKind::GlassTypes => 2,
            RequestKind::Pricing => 3,
            RequestKind::PdfExport => 4,
            RequestKind::History => 5,
            RequestKind::ClearHistory => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Optimize => "optimize",
            RequestKind::Categories => "list_categories",
            RequestKind::GlassTypes => "list_glass_types",
            RequestKind::Pricing => "calculate_price",
            RequestKind::PdfExport => "generate_pdf",
            RequestKind::History => "load_history",
            RequestKind::ClearHistory => "clear_history",
        }
    }

    /// Message shown when the service gives no usable error text.
    pub fn fallback_message(self) -> &'static str {
        match self {
            RequestKind::Optimize => "An error occurred during optimization.",
            RequestKind::Categories => "Failed to load glass categories.",
            RequestKind::GlassTypes => "Failed to load glass types.",
            RequestKind::Pricing => "An error occurred while calculating the price.",
            RequestKind::PdfExport => "An error occurred while generating the PDF.",
            RequestKind::History => "Failed to load history.",
            RequestKind::ClearHistory => "An error occurred while clearing history.",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    kind: RequestKind,
    generation: u64,
}

impl RequestToken {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.generation)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestTokens {
    latest: [u64; RequestKind::ALL.len()],
    in_flight: [bool; RequestKind::ALL.len()],
}

impl RequestTokens {
    pub fn issue(&mut self, kind: RequestKind) -> RequestToken {
        let slot = kind.index();
        self.latest[slot] += 1;
        self.in_flight[slot] = true;
        RequestToken {
            kind,
            generation: self.latest[slot],
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest[token.kind.index()] == token.generation
    }

    /// Marks the request finished. Returns `false` for a superseded token, which
    /// must then be discarded by the caller.
    pub fn complete(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.in_flight[token.kind.index()] = false;
        true
    }

    /// Invalidates whatever is outstanding for `kind` without issuing a new request.
    pub fn supersede(&mut self, kind: RequestKind) {
        let slot = kind.index();
        self.latest[slot] += 1;
        self.in_flight[slot] = false;
    }

    pub fn is_loading(&self, kind: RequestKind) -> bool {
        self.in_flight[kind.index()]
    }

    pub fn any_loading(&self) -> bool {
        self.in_flight.iter().any(|loading| *loading)
    }
}
