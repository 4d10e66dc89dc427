//! Username colors and hex color helpers.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// Fixed palette usernames are mapped onto.
pub const USERNAME_PALETTE: [&str; 6] = ["#d946ef", "#4ade80", "#f97316", "#3b82f6", "#ec4899", "#14b8a6"];

/// Pick the palette color for `username`.
///
/// The hash runs over UTF-16 code units. Each step shifts the 32-bit
/// truncation of the running hash but adds and subtracts at full width, so
/// other clients using the same palette agree on every user's color.
#[must_use]
pub fn username_color(username: &str) -> &'static str {
    let mut hash: i64 = 0;
    for unit in username.encode_utf16() {
        #[allow(clippy::cast_possible_truncation)]
        let shifted = (hash as i32).wrapping_shl(5);
        hash = i64::from(unit).wrapping_add(i64::from(shifted)).wrapping_sub(hash);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let index = (hash % USERNAME_PALETTE.len() as i64).unsigned_abs() as usize;
    USERNAME_PALETTE[index]
}

/// Parse `#RGB` or `#RRGGBB` values into RGB channels.
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some((r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// 24-bit ANSI foreground escape for a hex color; empty if unparsable.
#[must_use]
pub fn ansi_foreground(hex: &str) -> String {
    parse_hex_rgb(hex).map_or_else(String::new, |(r, g, b)| format!("\x1b[38;2;{r};{g};{b}m"))
}

pub const ANSI_RESET: &str = "\x1b[0m";
