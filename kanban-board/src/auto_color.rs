//! Deterministic default colors for lists and tags.
//!
//! A list created without an explicit color gets one derived from its name,
//! so the same name always renders the same way across clients.

/// Palette of 12 list/tag colors (6-char hex without `#`).
const PALETTE: &[&str] = &[
    "5e6c84", // slate
    "0079bf", // blue
    "00aecc", // sky
    "51e898", // mint
    "61bd4f", // green
    "f2d600", // yellow
    "ff9f1a", // orange
    "eb5a46", // red
    "c377e0", // purple
    "ff78cb", // pink
    "344563", // navy
    "b3bac5", // silver
];

/// Return a deterministic color for a list or tag name.
///
/// Names are compared case-insensitively and without surrounding whitespace.
pub fn auto_color(name: &str) -> &'static str {
    let normalized = name.trim().to_lowercase();
    let idx = (fnv1a(&normalized) as usize) % PALETTE.len();
    PALETTE[idx]
}

/// True for a 6-digit hex color, with or without a leading `#`.
pub fn is_hex_color(value: &str) -> bool {
    let digits = value.strip_prefix('#').unwrap_or(value);
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Strip a leading `#` and lowercase, the stored form of a color.
pub fn normalize_color(value: &str) -> String {
    value.trim().trim_start_matches('#').to_ascii_lowercase()
}

/// FNV-1a hash (32-bit) for short strings.
fn fnv1a(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in s.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
