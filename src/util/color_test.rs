use super::*;

// =============================================================
// username_color
// =============================================================

#[test]
fn username_color_matches_shared_palette_assignment() {
    assert_eq!(username_color(""), "#d946ef");
    assert_eq!(username_color("a"), "#4ade80");
    assert_eq!(username_color("alice"), "#d946ef");
    assert_eq!(username_color("bob"), "#4ade80");
    assert_eq!(username_color("carol"), "#4ade80");
}

#[test]
fn username_color_hashes_utf16_code_units() {
    assert_eq!(username_color("Zoë"), "#ec4899");
}

#[test]
fn username_color_handles_hash_beyond_32_bits() {
    assert_eq!(username_color("averyveryverylongusername_with_many_chars_1234567890"), "#f97316");
}

#[test]
fn username_color_is_stable_across_calls() {
    let first = username_color("dave");
    for _ in 0..10 {
        assert_eq!(username_color("dave"), first);
    }
    assert!(USERNAME_PALETTE.contains(&first));
}

// =============================================================
// hex helpers
// =============================================================

#[test]
fn parse_hex_rgb_supports_short_and_long_forms() {
    assert_eq!(parse_hex_rgb("#ABC"), Some((170, 187, 204)));
    assert_eq!(parse_hex_rgb("  #a1B2c3 "), Some((161, 178, 195)));
}

#[test]
fn parse_hex_rgb_rejects_invalid_inputs() {
    assert_eq!(parse_hex_rgb("AABBCC"), None);
    assert_eq!(parse_hex_rgb("#12"), None);
    assert_eq!(parse_hex_rgb("#12GG34"), None);
    assert_eq!(parse_hex_rgb("#ééé"), None);
}

#[test]
fn ansi_foreground_uses_truecolor_escape() {
    assert_eq!(ansi_foreground("#3b82f6"), "\x1b[38;2;59;130;246m");
    assert_eq!(ansi_foreground("blue"), "");
}
