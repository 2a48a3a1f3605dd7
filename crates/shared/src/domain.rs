use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{dimensions::parse_dimension_pair, error::ParseStockError};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SessionId);
id_newtype!(CategoryId);
id_newtype!(GlassId);

impl SessionId {
    /// Correlation key for one client session, derived from the wall clock in milliseconds.
    pub fn generate() -> Self {
        Self(Utc::now().timestamp_millis())
    }
}

pub const DEFAULT_STOCK_WIDTH: f64 = 321.0;
pub const DEFAULT_STOCK_HEIGHT: f64 = 225.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockSheet {
    pub width: f64,
    pub height: f64,
}

/// Sheets offered for selection; the first one is preselected.
pub const STOCK_PRESETS: [StockSheet; 2] = [
    StockSheet::new(DEFAULT_STOCK_WIDTH, DEFAULT_STOCK_HEIGHT),
    StockSheet::new(160.5, 255.0),
];

impl StockSheet {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl FromStr for StockSheet {
    type Err = ParseStockError;

    /// Accepts the same `WxH` form as a piece line, e.g. `321x225` or `160,5 x 255`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dimension_pair(s)
            .map(|(width, height)| Self::new(width, height))
            .ok_or_else(|| ParseStockError {
                input: s.to_string(),
            })
    }
}

impl Default for StockSheet {
    fn default() -> Self {
        Self::new(DEFAULT_STOCK_WIDTH, DEFAULT_STOCK_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceDimension {
    pub width: f64,
    pub height: f64,
}

impl PieceDimension {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// One cut sheet as laid out by the optimization service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub area: f64,
    pub waste_area: f64,
    pub waste_percentage: f64,
    /// Base64 encoded PNG preview.
    pub image: String,
}

impl Layout {
    pub fn utilization_percentage(&self) -> f64 {
        100.0 - self.waste_percentage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub layouts: Vec<Layout>,
    pub total_area: f64,
    pub average_waste: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlassType {
    pub id: GlassId,
    pub name: String,
    /// Price per square metre.
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub glass_name: String,
    pub area: f64,
    pub area_price: f64,
    pub waste_area: f64,
    pub waste_price: f64,
    pub total_price: f64,
}

impl PriceBreakdown {
    /// `area_price / area`, or `None` when the area is not positive.
    pub fn unit_price(&self) -> Option<f64> {
        (self.area > 0.0).then(|| self.area_price / self.area)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    pub glass_name: String,
    pub area: f64,
    pub waste_area: f64,
    pub total_price: f64,
}
