//! Core types for healthbar-core.
//!
//! A [`LogEntry`] is one row of the aggregate store. Cells are kept as the
//! text that appears in the file so a row written by hand (or by an older
//! version) survives a load/persist cycle unchanged, malformed cells
//! included.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Column header of the store file, in file order.
pub const HEADER: [&str; 7] = [
    "count",
    "timestamp",
    "warning",
    "category",
    "level",
    "solution",
    "ignore",
];

/// Wall-clock format of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_CATEGORY: &str = "0";
pub const DEFAULT_LEVEL: &str = "0";
/// Sentinel stored in `solution` until someone triages the entry.
pub const NO_SOLUTION: &str = "no_solution";
pub const DEFAULT_IGNORE: &str = "0";

/// Cells a row needs before its message column exists.
const KEYED_WIDTH: usize = 3;

/// One distinct normalized message and how often it has been seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Observation count as written in the file. Normally a positive integer.
    pub count: String,
    /// Time of the most recent observation, formatted with [`TIMESTAMP_FORMAT`].
    pub last_seen: String,
    /// Normalized message; the unique key of the store.
    pub message: String,
    /// Manual triage fields. Created with neutral defaults and never touched
    /// by ingestion.
    pub category: String,
    pub level: String,
    pub solution: String,
    pub ignore: String,
    /// Cells past `ignore`, written back untouched.
    #[serde(skip)]
    pub extra: Vec<String>,
    /// Cell count of the row on disk. Short rows are written back short.
    #[serde(skip)]
    width: usize,
}

impl LogEntry {
    /// First observation of `message` at `now`.
    pub fn new(message: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            count: "1".to_string(),
            last_seen: format_timestamp(now),
            message: message.into(),
            category: DEFAULT_CATEGORY.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            solution: NO_SOLUTION.to_string(),
            ignore: DEFAULT_IGNORE.to_string(),
            extra: Vec::new(),
            width: HEADER.len(),
        }
    }

    /// Whether the row has a message column at all. Rows cut short before
    /// it never match a key, not even the empty one.
    pub fn is_keyed(&self) -> bool {
        self.width >= KEYED_WIDTH
    }

    /// The count cell as an integer, or `None` when the cell is malformed or
    /// wider than `i128`.
    pub fn parsed_count(&self) -> Option<i128> {
        self.count.trim().parse().ok()
    }

    /// The count as a tally for summaries and sorting: negatives clamp to
    /// 0, oversized integers saturate, malformed cells count 0.
    pub fn tally(&self) -> u64 {
        if let Some(n) = self.parsed_count() {
            return u64::try_from(n.max(0)).unwrap_or(u64::MAX);
        }
        match split_integer(self.count.trim()) {
            Some((false, _)) => u64::MAX,
            _ => 0,
        }
    }

    /// The count cell after one more observation, or `None` when the cell is
    /// not an integer. Negative and arbitrarily wide integers are incremented
    /// as written: `-3` becomes `-2`.
    pub fn next_count(&self) -> Option<String> {
        let cell = self.count.trim();
        if let Some(next) = cell.parse::<i128>().ok().and_then(|n| n.checked_add(1)) {
            return Some(next.to_string());
        }
        let (negative, digits) = split_integer(cell)?;
        let digits = digits.trim_start_matches('0');
        if negative {
            let magnitude = decrement_digits(digits);
            return Some(match magnitude.as_str() {
                "" => "1".to_string(),
                "0" => "0".to_string(),
                m => format!("-{m}"),
            });
        }
        Some(increment_digits(digits))
    }

    /// Build an entry from one CSV record. Short records are padded with
    /// empty cells; cells past the seventh are kept in [`LogEntry::extra`].
    pub(crate) fn from_record(record: &csv::StringRecord) -> Self {
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();
        Self {
            count: cell(0),
            last_seen: cell(1),
            message: cell(2),
            category: cell(3),
            level: cell(4),
            solution: cell(5),
            ignore: cell(6),
            extra: record.iter().skip(HEADER.len()).map(str::to_string).collect(),
            width: record.len(),
        }
    }

    /// Cells to write, at the width the row was read with.
    pub(crate) fn to_record(&self) -> Vec<&str> {
        let cells = [
            self.count.as_str(),
            self.last_seen.as_str(),
            self.message.as_str(),
            self.category.as_str(),
            self.level.as_str(),
            self.solution.as_str(),
            self.ignore.as_str(),
        ];
        let mut record = cells[..self.width.min(cells.len())].to_vec();
        record.extend(self.extra.iter().map(String::as_str));
        record
    }
}

/// Split an integer cell into sign and ASCII digits.
fn split_integer(cell: &str) -> Option<(bool, &str)> {
    let (negative, digits) = match cell.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cell.strip_prefix('+').unwrap_or(cell)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((negative, digits))
}

/// `digits + 1` for a magnitude without leading zeros ("" is zero).
fn increment_digits(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            carry = false;
            break;
        }
    }
    if carry {
        bytes.insert(0, b'1');
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `digits - 1` for a magnitude without leading zeros. Zero stays "".
fn decrement_digits(digits: &str) -> String {
    if digits.is_empty() {
        return String::new();
    }
    let mut bytes = digits.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        if *b == b'0' {
            *b = b'9';
        } else {
            *b -= 1;
            break;
        }
    }
    let text = String::from_utf8_lossy(&bytes);
    match text.trim_start_matches('0') {
        "" => "0".to_string(),
        rest => rest.to_string(),
    }
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn new_entry_has_defaults() {
        let entry = LogEntry::new("Retry [NUMBER]", at(10, 0, 0));
        assert_eq!(entry.count, "1");
        assert_eq!(entry.last_seen, "2024-01-15 10:00:00");
        assert_eq!(entry.category, "0");
        assert_eq!(entry.level, "0");
        assert_eq!(entry.solution, "no_solution");
        assert_eq!(entry.ignore, "0");
    }

    #[test]
    fn timestamp_has_seconds_precision() {
        let ts = at(23, 59, 59) + chrono::Duration::milliseconds(999);
        assert_eq!(format_timestamp(ts), "2024-01-15 23:59:59");
    }

    fn with_count(count: &str) -> LogEntry {
        let mut entry = LogEntry::new("x", at(0, 0, 0));
        entry.count = count.to_string();
        entry
    }

    #[test]
    fn parsed_count_rejects_garbage() {
        assert_eq!(with_count("1").parsed_count(), Some(1));
        assert_eq!(with_count("-3").parsed_count(), Some(-3));
        assert_eq!(with_count(" 7 ").parsed_count(), Some(7));
        assert_eq!(with_count("many").parsed_count(), None);
        assert_eq!(with_count("12abc").parsed_count(), None);
        assert_eq!(with_count("").parsed_count(), None);
    }

    #[test]
    fn next_count_follows_integer_arithmetic() {
        assert_eq!(with_count("1").next_count().as_deref(), Some("2"));
        assert_eq!(with_count("-3").next_count().as_deref(), Some("-2"));
        assert_eq!(with_count("-1").next_count().as_deref(), Some("0"));
        assert_eq!(with_count("+4").next_count().as_deref(), Some("5"));
        assert_eq!(with_count(" 007 ").next_count().as_deref(), Some("8"));
        assert_eq!(
            with_count("18446744073709551616").next_count().as_deref(),
            Some("18446744073709551617")
        );
        assert_eq!(with_count("n/a").next_count(), None);
        assert_eq!(with_count("1.5").next_count(), None);
    }

    #[test]
    fn next_count_beyond_i128() {
        let max = i128::MAX.to_string();
        assert_eq!(
            with_count(&max).next_count().as_deref(),
            Some("170141183460469231731687303715884105728")
        );
        assert_eq!(
            with_count("999999999999999999999999999999999999999999").next_count().as_deref(),
            Some("1000000000000000000000000000000000000000000")
        );
        assert_eq!(
            with_count("-1000000000000000000000000000000000000000000").next_count().as_deref(),
            Some("-999999999999999999999999999999999999999999")
        );
    }

    #[test]
    fn tally_clamps_and_saturates() {
        assert_eq!(with_count("5").tally(), 5);
        assert_eq!(with_count("-3").tally(), 0);
        assert_eq!(with_count("18446744073709551616").tally(), u64::MAX);
        assert_eq!(with_count("999999999999999999999999999999999999999999").tally(), u64::MAX);
        assert_eq!(with_count("-999999999999999999999999999999999999999999").tally(), 0);
        assert_eq!(with_count("broken").tally(), 0);
    }

    #[test]
    fn short_record_is_not_keyed() {
        let record = csv::StringRecord::from(vec!["7", "t"]);
        let entry = LogEntry::from_record(&record);
        assert!(!entry.is_keyed());
        assert_eq!(entry.to_record(), vec!["7", "t"]);
        assert!(LogEntry::new("", at(0, 0, 0)).is_keyed());
    }

    #[test]
    fn extra_cells_are_kept() {
        let record =
            csv::StringRecord::from(vec!["1", "t", "m", "0", "0", "no_solution", "0", "x", "y"]);
        let entry = LogEntry::from_record(&record);
        assert_eq!(entry.extra, vec!["x", "y"]);
        assert_eq!(entry.to_record(), record.iter().collect::<Vec<_>>());
    }

    #[test]
    fn short_record_is_padded() {
        let record = csv::StringRecord::from(vec!["4", "2024-01-15 10:00:00", "disk full"]);
        let entry = LogEntry::from_record(&record);
        assert_eq!(entry.message, "disk full");
        assert_eq!(entry.category, "");
        assert_eq!(entry.ignore, "");
    }

    #[test]
    fn record_round_trips() {
        let entry = LogEntry::new("a, \"quoted\"\nline", at(1, 2, 3));
        let record = csv::StringRecord::from(entry.to_record());
        assert_eq!(LogEntry::from_record(&record), entry);
    }
}
