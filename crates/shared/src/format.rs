//! Display formatting for numbers, prices and dimensions.
//!
//! Numbers use a decimal comma and a fixed number of decimals; prices carry a
//! trailing euro sign.

pub const DEFAULT_DECIMALS: usize = 2;

/// Rounds half away from zero, so `12.125` shows as `12,13`.
pub fn format_number(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // -0.0 would otherwise render with a leading minus sign.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.decimals$}").replace('.', ",")
}

pub fn format_price(price: f64) -> String {
    format!("{} €", format_number(price, DEFAULT_DECIMALS))
}

pub fn format_area(area: f64) -> String {
    format!("{} m²", format_number(area, DEFAULT_DECIMALS))
}

pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_number(value, DEFAULT_DECIMALS))
}

pub fn format_dimensions(width: f64, height: f64) -> String {
    format!("{width} × {height} cm")
}

/// Inverse of [`format_number`]: accepts a decimal comma or point.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}
