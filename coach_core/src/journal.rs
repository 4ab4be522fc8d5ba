//! Session record journal.
//!
//! Records are appended to a JSONL (JSON Lines) file with file locking so a
//! host and a background job can share it. The phase gate reads them back.

use crate::types::SessionRecord;
use crate::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for session records
pub trait RecordSink {
    fn append(&mut self, record: &SessionRecord) -> Result<()>;
}

/// JSONL-based record sink with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonlJournal {
    fn append(&mut self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended session record {} to journal", record.id);
        Ok(())
    }
}

/// Read all records, oldest first
///
/// Unparsable lines are logged and skipped.
pub fn read_records(path: &Path) -> Result<Vec<SessionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SessionRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    records.sort_by_key(|r| r.recorded_at);
    tracing::debug!("Read {} session records", records.len());
    Ok(records)
}
