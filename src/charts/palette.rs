//! Chart colours

use std::fmt;

/// An RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// CSS `rgba(...)` string with the given opacity
    pub fn rgba(&self, alpha: f64) -> String {
        format!("rgba({},{},{},{})", self.0, self.1, self.2, alpha)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Colours used across the dashboard figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Months with a non-negative net amount
    pub positive: Rgb,
    /// Months with a negative net amount
    pub negative: Rgb,
    pub observed: Rgb,
    pub forecast: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            positive: Rgb(0x5A, 0xA8, 0x00),
            negative: Rgb(0xAF, 0x00, 0x00),
            observed: Rgb(0x00, 0x8D, 0xEB),
            forecast: Rgb(0x5A, 0xA8, 0x00),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#008DEB"), Some(Rgb(0, 141, 235)));
        assert_eq!(Rgb::from_hex("5aa800"), Some(Rgb(90, 168, 0)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_rgba_and_display() {
        let c = Rgb(0, 141, 235);
        assert_eq!(c.rgba(0.12), "rgba(0,141,235,0.12)");
        assert_eq!(c.rgba(1.0), "rgba(0,141,235,1)");
        assert_eq!(c.to_string(), "#008DEB");
    }
}
