//! Free-text dimension list parsing.
//!
//! Lines are separated by newlines or hyphens. After trimming and removing all
//! whitespace a line must read `<number>x<number>` (case-insensitive `x`), where a
//! number is digits with an optional `.` or `,` decimal separator. Lines that do
//! not match, or whose values are not strictly positive, are dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::PieceDimension;

static DIMENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+[.,]?[0-9]*)x([0-9]+[.,]?[0-9]*)$").expect("dimension pattern")
});

pub const LINE_SEPARATORS: [char; 2] = ['\n', '-'];
pub const TRANSPORT_SEPARATOR: &str = "-";

pub fn parse_dimensions(text: &str) -> Vec<PieceDimension> {
    text.split(LINE_SEPARATORS.as_slice())
        .filter_map(parse_dimension_pair)
        .map(|(width, height)| PieceDimension::new(width, height))
        .collect()
}

/// Parses a single `WxH` line; `None` unless both values are strictly positive.
pub fn parse_dimension_pair(line: &str) -> Option<(f64, f64)> {
    let sanitized: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let captures = DIMENSION_RE.captures(&sanitized)?;
    let width = parse_component(captures.get(1)?.as_str())?;
    let height = parse_component(captures.get(2)?.as_str())?;
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn parse_component(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok()
}

/// Transport form of a piece list: `WxH` entries joined by `-`.
pub fn serialize_dimensions(pieces: &[PieceDimension]) -> String {
    join_dimensions(pieces, TRANSPORT_SEPARATOR)
}

/// Editable form of a piece list: one `WxH` per line. Parses back to `pieces`.
pub fn dimensions_text(pieces: &[PieceDimension]) -> String {
    join_dimensions(pieces, "\n")
}

fn join_dimensions(pieces: &[PieceDimension], separator: &str) -> String {
    pieces
        .iter()
        .map(|piece| format!("{}x{}", piece.width, piece.height))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(pieces: &[PieceDimension]) -> Vec<(f64, f64)> {
        pieces.iter().map(|p| (p.width, p.height)).collect()
    }

    #[test]
    fn keeps_only_valid_positive_lines() {
        let parsed = parse_dimensions("100x50\n0x10\nabc\n20,5x30");
        assert_eq!(pairs(&parsed), vec![(100.0, 50.0), (20.5, 30.0)]);
    }

    #[test]
    fn editable_text_lists_one_piece_per_line() {
        let pieces = [PieceDimension::new(60.0, 40.0), PieceDimension::new(20.5, 30.0)];
        let text = dimensions_text(&pieces);
        assert_eq!(text, "60x40\n20.5x30");
        assert_eq!(parse_dimensions(&text), pieces);
    }

    #[test]
    fn hyphen_separates_lines() {
        let parsed = parse_dimensions("100x50-60x40");
        assert_eq!(pairs(&parsed), vec![(100.0, 50.0), (60.0, 40.0)]);
    }

    #[test]
    fn whitespace_and_case_are_ignored() {
        let parsed = parse_dimensions("  10 0 X 5 0 \n\t60.5x40\r\n");
        assert_eq!(pairs(&parsed), vec![(100.0, 50.0), (60.5, 40.0)]);
    }

    #[test]
    fn drops_malformed_and_non_positive_lines() {
        assert!(parse_dimensions("").is_empty());
        assert!(parse_dimensions("\n\n").is_empty());
        assert!(parse_dimensions("x50").is_empty());
        assert!(parse_dimensions("1.2.3x4").is_empty());
        assert!(parse_dimensions("10x0").is_empty());
        assert!(parse_dimensions("0,0x5").is_empty());
        assert!(parse_dimensions("10x20x30").is_empty());
        assert!(parse_dimensions("١٢x٣").is_empty());
    }

    #[test]
    fn trailing_separator_is_accepted() {
        assert_eq!(parse_dimension_pair("100.x50"), Some((100.0, 50.0)));
        assert_eq!(parse_dimension_pair("100,x5,"), Some((100.0, 5.0)));
    }

    #[test]
    fn keeps_duplicates_in_input_order() {
        let parsed = parse_dimensions("60x40\n100x50\n60x40");
        assert_eq!(
            pairs(&parsed),
            vec![(60.0, 40.0), (100.0, 50.0), (60.0, 40.0)]
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "100x50\nfoo\n20,5x30-7x7";
        assert_eq!(parse_dimensions(text), parse_dimensions(text));
    }

    #[test]
    fn serialized_pieces_parse_back() {
        let pieces = vec![PieceDimension::new(100.0, 50.0), PieceDimension::new(20.5, 30.0)];
        let wire = serialize_dimensions(&pieces);
        assert_eq!(wire, "100x50-20.5x30");
        assert_eq!(parse_dimensions(&wire), pieces);
    }
}
