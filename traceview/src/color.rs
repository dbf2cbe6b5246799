//! Deterministic color derivation for categories and phase codes.
//!
//! Colors are a contract, not a styling concern: the renderer keys legend
//! entries and bar fills off these functions, and exports can be compared
//! across runs, so the mapping must be exactly reproducible for a given
//! input string.

/// Ordered keyword palette for well-known trace categories. Matching is a
/// case-insensitive substring test against the event's category, first match
/// wins.
pub const CATEGORY_COLORS: [(&str, &str); 10] = [
    ("blink", "#FF6B6B"),
    ("v8", "#4ECDC4"),
    ("gpu", "#45B7D1"),
    ("renderer", "#96CEB4"),
    ("browser", "#FFEAA7"),
    ("loading", "#DDA0DD"),
    ("painting", "#98D8C8"),
    ("scripting", "#F7DC6F"),
    ("system", "#BB8FCE"),
    ("idle", "#85C1E9"),
];

/// CSS color for a category string.
///
/// Falls back to a polynomial hash over the category's UTF-16 code units
/// (`hash = unit + ((hash << 5) - hash)` with 32-bit wraparound), mapped to
/// `hsl(|hash| % 360, 70%, 60%)`. Deterministic for any input.
pub fn category_color(category: &str) -> String {
    let lower = category.to_lowercase();
    for (keyword, color) in CATEGORY_COLORS {
        if lower.contains(keyword) {
            return color.to_string();
        }
    }

    let mut hash: i32 = 0;
    for unit in category.encode_utf16() {
        hash = (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }
    let hue = hash.unsigned_abs() % 360;
    format!("hsl({hue}, 70%, 60%)")
}

/// Fixed CSS color per raw phase code for timeline tracks; unknown phases
/// share one neutral gray.
pub fn phase_color(ph: &str) -> &'static str {
    match ph {
        "B" => "#3B82F6",
        "E" => "#10B981",
        "X" => "#F59E0B",
        "I" => "#8B5CF6",
        "P" => "#EF4444",
        "C" => "#06B6D4",
        _ => "#6B7280",
    }
}
