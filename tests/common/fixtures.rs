//! Static message corpora and raw store files used across harnesses.

/// Messages as a shell hook would hand them over, paired with their key.
pub const CORPUS_MESSAGES: &[(&str, &str)] = &[
    ("Error: disk 42 full", "Error: disk [NUMBER] full"),
    (
        "kernel: [12345.678901] usb 1-1: reset high-speed USB device number 3",
        "kernel: [[NUMBER].[NUMBER]] usb [NUMBER]-[NUMBER]: reset high-speed USB device number [NUMBER]",
    ),
    (
        "sshd[2211]: Failed password for root from 10.0.0.1 port 54321",
        "sshd[[NUMBER]]: Failed password for root from [NUMBER].[NUMBER].[NUMBER].[NUMBER] port [NUMBER]",
    ),
    ("WARNING: battery at 7%", "WARNING: battery at [NUMBER]%"),
    ("   trailing and leading   ", "trailing and leading"),
    ("no numbers here", "no numbers here"),
];

pub const HEADER_LINE: &str = "count,timestamp,warning,category,level,solution,ignore";

/// A store file in the expected schema, written by hand (LF endings).
pub fn raw_store(rows: &[&str]) -> String {
    let mut text = format!("{HEADER_LINE}\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}
