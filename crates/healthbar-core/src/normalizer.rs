//! Normalizer: turns a raw diagnostic message into its deduplication key.
//!
//! Every maximal run of decimal digits becomes [`NUMBER_TOKEN`], so messages
//! that differ only by a counter, PID, size or address collapse into one
//! row. The mapping is lossy: the original numbers cannot be recovered from
//! the key, and [`display_message`] only removes the token for display.

use regex::Regex;
use std::sync::LazyLock;

/// Placeholder substituted for each run of digits.
pub const NUMBER_TOKEN: &str = "[NUMBER]";

// `\d` is Unicode-aware, so non-ASCII decimal digits are masked too.
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit-run pattern must compile"));

/// Mask digit runs and trim surrounding whitespace.
///
/// Total and idempotent: the token contains no digits, and trimming twice
/// changes nothing.
pub fn normalize(raw: &str) -> String {
    DIGIT_RUN.replace_all(raw, NUMBER_TOKEN).trim().to_string()
}

/// Render a normalized message for display by dropping every placeholder.
///
/// `"X [NUMBER] Y"` becomes `"X  Y"`; surrounding spaces are left alone.
pub fn display_message(normalized: &str) -> String {
    normalized.replace(NUMBER_TOKEN, "")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
