/// Converts a `#rrggbb` hex string to its R, G, B components.
/// Returns `None` for anything that is not `#` followed by six hex digits.
pub fn hex_to_rgb(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some([(value >> 16) as u8, (value >> 8) as u8, value as u8])
}

/// Converts R, G, B components to a lowercase `#rrggbb` string.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// True when the string is a well-formed `#rrggbb` color, case-insensitive.
pub fn is_hex_color(color: &str) -> bool {
    hex_to_rgb(color).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_colors() {
        assert_eq!(hex_to_rgb("#ffffff"), Some([255, 255, 255]));
        assert_eq!(hex_to_rgb("#000000"), Some([0, 0, 0]));
        assert_eq!(hex_to_rgb("#d4361e"), Some([212, 54, 30]));
    }

    #[test]
    fn accepts_uppercase_digits() {
        assert_eq!(hex_to_rgb("#FFCC00"), Some([255, 204, 0]));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert_eq!(hex_to_rgb("ffffff"), None);
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#ffgfff"), None);
        assert_eq!(hex_to_rgb("#fffffff"), None);
        assert_eq!(hex_to_rgb(""), None);
    }

    #[test]
    fn round_trips_through_hex() {
        let [r, g, b] = hex_to_rgb("#5880a8").unwrap();
        assert_eq!(rgb_to_hex(r, g, b), "#5880a8");
    }

    #[test]
    fn validates_hex_colors() {
        assert!(is_hex_color("#e4b4ca"));
        assert!(is_hex_color("#A3DC67"));
        assert!(!is_hex_color("#e4b4c"));
        assert!(!is_hex_color("blue"));
    }
}
