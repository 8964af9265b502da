//! Store: the flat CSV table holding one [`LogEntry`] per normalized message.
//!
//! The file is the single source of truth. Writers go through
//! [`Store::lock`], [`Store::load`], [`upsert`] and [`Store::persist`];
//! readers only ever call [`Store::load_or_empty`] and never lock.
//!
//! # File layout
//!
//! ```text
//! count,timestamp,warning,category,level,solution,ignore
//! 2,2024-01-15 10:00:01,Retry [NUMBER],0,0,no_solution,0
//! 1,2024-01-15 10:00:02,Fail now,0,0,no_solution,0
//! ```
//!
//! Row order is insertion order and is never changed by the store.
//!
//! # Recovery
//!
//! - Missing or empty file: zero entries.
//! - Header other than [`HEADER`]: the content is discarded and the next
//!   persist starts a fresh table (`store reset` warning).
//! - Non-integer count on a row being incremented: the count restarts at 1
//!   (`count repaired` warning). Negative or very wide integers are still
//!   integers and are incremented as written.
//! - Rows shorter than three cells have no message and never match a key.
//!   Short rows and cells past `ignore` are written back as they were read.

use crate::error::StoreError;
use crate::types::{format_timestamp, LogEntry, HEADER};
use chrono::NaiveDateTime;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Handle on the on-disk store. Cheap to construct; holds no file open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar file used for writer arbitration: `<store>.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Read every row in file order.
    ///
    /// A missing file, an empty file, or a file whose header does not match
    /// [`HEADER`] exactly all yield an empty table. Anything else that goes
    /// wrong (permissions, invalid UTF-8, unreadable device) is an error.
    pub fn load(&self) -> Result<Vec<LogEntry>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "store does not exist yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));
        let mut records = reader.records();

        let header = match records.next() {
            None => return Ok(Vec::new()),
            Some(record) => record.map_err(|err| StoreError::csv(&self.path, err))?,
        };
        if !header.iter().eq(HEADER) {
            tracing::warn!(
                event = "store reset",
                path = %self.path.display(),
                found = ?header.iter().collect::<Vec<_>>(),
                "store header does not match, starting a fresh table"
            );
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for record in records {
            let record = record.map_err(|err| StoreError::csv(&self.path, err))?;
            if record.is_empty() {
                continue;
            }
            entries.push(LogEntry::from_record(&record));
        }
        tracing::debug!(path = %self.path.display(), rows = entries.len(), "store loaded");
        Ok(entries)
    }

    /// [`Store::load`] for read-only consumers: any failure is logged and
    /// reported as an empty table.
    pub fn load_or_empty(&self) -> Vec<LogEntry> {
        self.load().unwrap_or_else(|error| {
            tracing::warn!(
                path = %self.path.display(),
                error = ?error,
                "store unreadable, treating as empty"
            );
            Vec::new()
        })
    }

    /// Replace the store with `entries`, header first, in sequence order.
    ///
    /// The rows go to a temporary file in the same directory, which is
    /// synced and then renamed over the store. A reader sees either the old
    /// table or the new one, and a failed write leaves the old table intact.
    pub fn persist(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .terminator(csv::Terminator::CRLF)
                .from_writer(tmp.as_file_mut());
            writer
                .write_record(HEADER)
                .map_err(|err| StoreError::csv(&self.path, err))?;
            for entry in entries {
                writer
                    .write_record(entry.to_record())
                    .map_err(|err| StoreError::csv(&self.path, err))?;
            }
            writer.flush().map_err(|err| StoreError::io(&self.path, err))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|err| StoreError::io(&self.path, err))?;

        // The temp file is created 0600; keep whatever mode the store had.
        match fs::metadata(&self.path) {
            Ok(meta) => tmp
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(|err| StoreError::io(&self.path, err))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(StoreError::io(&self.path, err)),
        }
        tmp.persist(&self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), rows = entries.len(), "store persisted");
        Ok(())
    }

    /// Take the exclusive writer lock, blocking until it is available.
    ///
    /// Held for a whole load/upsert/persist cycle so two ingestions cannot
    /// overwrite each other's increments. Released when the guard drops.
    pub fn lock(&self) -> Result<StoreLock, StoreError> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;

        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| StoreError::Lock { path: path.clone(), source })?;
        file.lock()
            .map_err(|source| StoreError::Lock { path: path.clone(), source })?;

        tracing::trace!(path = %path.display(), "store lock acquired");
        Ok(StoreLock { file, path })
    }
}

/// Guard returned by [`Store::lock`].
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(error) = self.file.unlock() {
            tracing::warn!(path = %self.path.display(), %error, "failed to release store lock");
        }
    }
}

/// What [`upsert`] did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// A new row was appended with count 1.
    Inserted,
    /// An existing row's count was incremented to `count`, as written.
    Incremented { count: String },
    /// An existing row had a malformed count and was reset to 1.
    Repaired,
}

/// Record one observation of `key` at `now`.
///
/// The first keyed row whose trimmed message equals `key` gets its count
/// bumped and its timestamp refreshed; nothing else in the table moves.
/// Without a match a new row is appended at the end.
pub fn upsert(entries: &mut Vec<LogEntry>, key: &str, now: NaiveDateTime) -> Upsert {
    let Some(index) = entries
        .iter()
        .position(|e| e.is_keyed() && e.message.trim() == key)
    else {
        entries.push(LogEntry::new(key, now));
        return Upsert::Inserted;
    };
    let entry = &mut entries[index];

    entry.last_seen = format_timestamp(now);
    match entry.next_count() {
        Some(count) => {
            entry.count = count.clone();
            Upsert::Incremented { count }
        }
        None => {
            tracing::warn!(
                event = "count repaired",
                key,
                cell = %entry.count,
                "count cell is not an integer, restarting at 1"
            );
            entry.count = "1".to_string();
            Upsert::Repaired
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(10, 0, s))
            .unwrap()
    }

    fn scratch() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("health_log.csv"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, store) = scratch();
        assert_eq!(store.load().unwrap(), vec![]);
    }

    #[test]
    fn empty_file_loads_empty() {
        let (_dir, store) = scratch();
        fs::write(store.path(), "").unwrap();
        assert_eq!(store.load().unwrap(), vec![]);
    }

    #[test]
    fn header_only_loads_empty() {
        let (_dir, store) = scratch();
        fs::write(store.path(), "count,timestamp,warning,category,level,solution,ignore\r\n")
            .unwrap();
        assert_eq!(store.load().unwrap(), vec![]);
    }

    #[test]
    fn foreign_header_loads_empty() {
        let (_dir, store) = scratch();
        fs::write(store.path(), "a,b,c\n1,2,3\n").unwrap();
        assert_eq!(store.load().unwrap(), vec![]);
    }

    #[test]
    fn reordered_header_is_foreign() {
        let (_dir, store) = scratch();
        fs::write(
            store.path(),
            "timestamp,count,warning,category,level,solution,ignore\n1,x,y,0,0,no_solution,0\n",
        )
        .unwrap();
        assert_eq!(store.load().unwrap(), vec![]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (_dir, store) = scratch();
        fs::write(
            store.path(),
            "count,timestamp,warning,category,level,solution,ignore\n\n3,t,a,0,0,no_solution,0\n\n",
        )
        .unwrap();
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, "3");
    }

    #[test]
    fn persist_then_load_round_trips() {
        let (_dir, store) = scratch();
        let mut entries = Vec::new();
        upsert(&mut entries, "Retry [NUMBER]", at(0));
        upsert(&mut entries, "has, comma", at(1));
        upsert(&mut entries, "has \"quotes\"\nand newline", at(2));
        upsert(&mut entries, "Retry [NUMBER]", at(3));

        store.persist(&entries).unwrap();
        assert_eq!(store.load().unwrap(), entries);
    }

    #[test]
    fn persist_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join(".health_bar").join("health_log.csv"));
        store.persist(&[LogEntry::new("x", at(0))]).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn persist_writes_header_first() {
        let (_dir, store) = scratch();
        store.persist(&[]).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("count,timestamp,warning,category,level,solution,ignore")
        );
    }

    #[test]
    fn persist_leaves_no_temp_files() {
        let (dir, store) = scratch();
        store.persist(&[LogEntry::new("x", at(0))]).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("health_log.csv")]);
    }

    #[test]
    fn persist_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let store = Store::new(blocker.join("health_log.csv"));
        assert!(store.persist(&[]).is_err());
    }

    #[test]
    fn load_or_empty_swallows_errors() {
        let (_dir, store) = scratch();
        fs::write(
            store.path(),
            b"count,timestamp,warning,category,level,solution,ignore\n1,t,\xff\xfe,0,0,x,0\n",
        )
        .unwrap();
        assert!(store.load().is_err());
        assert_eq!(store.load_or_empty(), vec![]);
    }

    #[test]
    fn lock_path_is_sidecar() {
        let store = Store::new("/tmp/hb/health_log.csv");
        assert_eq!(store.lock_path(), PathBuf::from("/tmp/hb/health_log.csv.lock"));
    }

    #[test]
    fn lock_is_reacquirable_after_drop() {
        let (_dir, store) = scratch();
        drop(store.lock().unwrap());
        let _again = store.lock().unwrap();
        assert!(store.lock_path().exists());
    }

    // -- upsert -------------------------------------------------------------

    #[test]
    fn upsert_appends_new_key() {
        let mut entries = vec![LogEntry::new("a", at(0))];
        assert_eq!(upsert(&mut entries, "b", at(5)), Upsert::Inserted);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], LogEntry::new("b", at(5)));
    }

    #[test]
    fn upsert_increments_in_place() {
        let mut entries = vec![
            LogEntry::new("a", at(0)),
            LogEntry::new("b", at(1)),
            LogEntry::new("c", at(2)),
        ];
        let before = entries.clone();
        assert_eq!(
            upsert(&mut entries, "b", at(9)),
            Upsert::Incremented { count: "2".to_string() }
        );
        assert_eq!(entries[0], before[0]);
        assert_eq!(entries[2], before[2]);
        assert_eq!(entries[1].count, "2");
        assert_eq!(entries[1].last_seen, "2024-01-15 10:00:09");
        assert_eq!(entries[1].message, "b");
    }

    #[test]
    fn upsert_leaves_triage_fields_alone() {
        let mut entry = LogEntry::new("a", at(0));
        entry.category = "disk".to_string();
        entry.level = "3".to_string();
        entry.solution = "clean /var".to_string();
        entry.ignore = "1".to_string();
        let mut entries = vec![entry.clone()];
        upsert(&mut entries, "a", at(1));
        assert_eq!(entries[0].category, entry.category);
        assert_eq!(entries[0].level, entry.level);
        assert_eq!(entries[0].solution, entry.solution);
        assert_eq!(entries[0].ignore, entry.ignore);
    }

    #[test]
    fn upsert_matches_trimmed_stored_message() {
        let mut entry = LogEntry::new("  a  ", at(0));
        entry.count = "4".to_string();
        let mut entries = vec![entry];
        assert_eq!(
            upsert(&mut entries, "a", at(1)),
            Upsert::Incremented { count: "5".to_string() }
        );
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn upsert_only_touches_first_match() {
        let mut entries = vec![LogEntry::new("a", at(0)), LogEntry::new("a", at(1))];
        upsert(&mut entries, "a", at(2));
        assert_eq!(entries[0].count, "2");
        assert_eq!(entries[1].count, "1");
    }

    /// Pins the reference behaviour: a corrupted count restarts at 1 rather
    /// than resuming from whatever digits the cell still holds.
    #[test]
    fn upsert_repairs_malformed_count_to_one() {
        let mut entry = LogEntry::new("a", at(0));
        entry.count = "12abc".to_string();
        let mut entries = vec![entry];
        assert_eq!(upsert(&mut entries, "a", at(3)), Upsert::Repaired);
        assert_eq!(entries[0].count, "1");
        assert_eq!(entries[0].last_seen, "2024-01-15 10:00:03");
    }

    /// Negative counts are integers too: incremented, not repaired.
    #[test]
    fn upsert_increments_negative_count() {
        let mut entry = LogEntry::new("a", at(0));
        entry.count = "-3".to_string();
        let mut entries = vec![entry];
        assert_eq!(
            upsert(&mut entries, "a", at(1)),
            Upsert::Incremented { count: "-2".to_string() }
        );
        assert_eq!(entries[0].count, "-2");
    }

    #[test]
    fn upsert_keeps_counting_past_u64() {
        let mut entry = LogEntry::new("a", at(0));
        entry.count = u64::MAX.to_string();
        let mut entries = vec![entry];
        upsert(&mut entries, "a", at(1));
        upsert(&mut entries, "a", at(2));
        assert_eq!(entries[0].count, "18446744073709551617");
    }

    #[test]
    fn short_row_never_matches_the_empty_key() {
        let record = csv::StringRecord::from(vec!["7", "t"]);
        let mut entries = vec![LogEntry::from_record(&record)];
        assert_eq!(upsert(&mut entries, "", at(4)), Upsert::Inserted);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].count, "7");
        assert_eq!(entries[0].last_seen, "t");
        assert_eq!(entries[1].count, "1");
        assert_eq!(entries[1].message, "");
    }

    #[cfg(unix)]
    #[test]
    fn persist_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = scratch();
        store.persist(&[LogEntry::new("x", at(0))]).unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.persist(&[LogEntry::new("y", at(1))]).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
