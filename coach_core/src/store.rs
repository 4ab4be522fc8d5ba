//! Program and profile persistence with file locking.
//!
//! Layout under the store root:
//!
//! ```text
//! clients/<client_id>/profile.json
//! clients/<client_id>/program.json
//! clients/<client_id>/sessions.jsonl
//! clients/<client_id>/.lock
//! ```
//!
//! Writes go through a temp file and an atomic rename. `update_program` holds
//! an exclusive lock on the client's lock file for the whole
//! load-modify-save cycle, so only one writer touches a program at a time.
//! Different clients use different lock files.

use crate::types::{ClientProfile, Program};
use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const PROGRAM_FILE: &str = "program.json";
const PROFILE_FILE: &str = "profile.json";
const JOURNAL_FILE: &str = "sessions.jsonl";
const LOCK_FILE: &str = ".lock";

/// File-backed store of client profiles and programs
#[derive(Clone, Debug)]
pub struct ProgramStore {
    root: PathBuf,
}

impl ProgramStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn client_dir(&self, client_id: &str) -> Result<PathBuf> {
        let valid = !client_id.is_empty()
            && client_id != "."
            && client_id != ".."
            && !client_id.contains(['/', '\\']);
        if !valid {
            return Err(Error::Store(format!("invalid client id '{}'", client_id)));
        }
        Ok(self.root.join("clients").join(client_id))
    }

    pub fn program_path(&self, client_id: &str) -> Result<PathBuf> {
        Ok(self.client_dir(client_id)?.join(PROGRAM_FILE))
    }

    pub fn profile_path(&self, client_id: &str) -> Result<PathBuf> {
        Ok(self.client_dir(client_id)?.join(PROFILE_FILE))
    }

    /// Path of the client's session record journal
    pub fn journal_path(&self, client_id: &str) -> Result<PathBuf> {
        Ok(self.client_dir(client_id)?.join(JOURNAL_FILE))
    }

    pub fn has_program(&self, client_id: &str) -> Result<bool> {
        Ok(self.program_path(client_id)?.exists())
    }

    fn require_program(&self, client_id: &str) -> Result<()> {
        if self.has_program(client_id)? {
            Ok(())
        } else {
            Err(Error::Store(format!(
                "no program stored for client '{}'",
                client_id
            )))
        }
    }

    fn open_lock(&self, client_id: &str) -> Result<File> {
        let dir = self.client_dir(client_id)?;
        std::fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        Ok(file)
    }

    /// Load a client's program under a shared lock
    pub fn load_program(&self, client_id: &str) -> Result<Program> {
        self.require_program(client_id)?;
        let lock = self.open_lock(client_id)?;
        lock.lock_shared()?;
        let result = read_json(&self.program_path(client_id)?, "program", client_id);
        lock.unlock()?;
        result
    }

    /// Save a program, replacing any previous one for the same client
    pub fn save_program(&self, program: &Program) -> Result<()> {
        let lock = self.open_lock(&program.client_id)?;
        lock.lock_exclusive()?;
        let result = write_json_atomic(&self.program_path(&program.client_id)?, program);
        lock.unlock()?;
        result?;
        tracing::debug!("Saved program for client {}", program.client_id);
        Ok(())
    }

    pub fn load_profile(&self, client_id: &str) -> Result<ClientProfile> {
        read_json(&self.profile_path(client_id)?, "profile", client_id)
    }

    pub fn save_profile(&self, profile: &ClientProfile) -> Result<()> {
        write_json_atomic(&self.profile_path(&profile.id)?, profile)?;
        tracing::debug!("Saved profile for client {}", profile.id);
        Ok(())
    }

    /// Load, transform and save a program as one exclusive operation
    ///
    /// `f` receives the stored program and returns the replacement plus any
    /// value the caller wants back. Nothing is written if `f` fails.
    pub fn update_program<T, F>(&self, client_id: &str, f: F) -> Result<(Program, T)>
    where
        F: FnOnce(&Program) -> Result<(Program, T)>,
    {
        self.require_program(client_id)?;
        let lock = self.open_lock(client_id)?;
        lock.lock_exclusive()?;

        let result = (|| -> Result<(Program, T)> {
            let path = self.program_path(client_id)?;
            let current: Program = read_json(&path, "program", client_id)?;
            let (updated, value) = f(&current)?;
            if updated != current {
                write_json_atomic(&path, &updated)?;
            }
            Ok((updated, value))
        })();

        lock.unlock()?;
        result
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str, client_id: &str) -> Result<T> {
    if !path.exists() {
        return Err(Error::Store(format!(
            "no {} stored for client '{}'",
            what, client_id
        )));
    }
    let contents = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&contents)?;
    tracing::debug!("Loaded {} from {:?}", what, path);
    Ok(value)
}

/// Atomically write JSON by writing a temp file, syncing, then renaming
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
