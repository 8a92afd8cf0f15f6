// SPDX-License-Identifier: MIT

//! Move journal for rollback support

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::Result;

/// A single file move in the journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub category: String,
    pub file_hash: String,
    pub undone: bool,
}

/// Append-only JSONL journal of file moves
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Create a journal backed by the given file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append an entry to the journal
    pub fn append(&self, entry: &MoveEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all journal entries
    pub fn read_all(&self) -> Result<Vec<MoveEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse journal entry: {}", e);
                }
            }
        }

        Ok(entries)
    }

    /// Get the most recent N entries (newest first)
    pub fn get_recent(&self, count: usize) -> Result<Vec<MoveEntry>> {
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(count);
        Ok(entries)
    }

    /// Mark an entry as undone
    pub fn mark_undone(&self, id: &str) -> Result<()> {
        let entries = self.read_all()?;

        // Rewrite the entire file with the updated entry
        let file = File::create(&self.path)?;
        let mut writer = std::io::BufWriter::new(file);

        for mut entry in entries {
            if entry.id == id {
                entry.undone = true;
            }
            let json = serde_json::to_string(&entry)?;
            writeln!(writer, "{}", json)?;
        }

        Ok(())
    }

    /// Get entries that haven't been undone
    pub fn get_undoable(&self) -> Result<Vec<MoveEntry>> {
        let entries = self.read_all()?;
        Ok(entries.into_iter().filter(|e| !e.undone).collect())
    }

    /// Clear the journal
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Get journal file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create a new journal entry
pub fn create_entry(
    original_path: PathBuf,
    new_path: PathBuf,
    category: String,
    file_hash: String,
) -> MoveEntry {
    MoveEntry {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        original_path,
        new_path,
        category,
        file_hash,
        undone: false,
    }
}
