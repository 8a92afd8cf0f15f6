// SPDX-License-Identifier: MIT

//! SQLite index of analyzed files

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::analyze::FileReport;
use crate::{CuratorError, Result};

/// Database manager (thread-safe wrapper)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// An indexed file record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub path: String,
    pub category: Option<String>,
    pub confidence: f64,
    /// Purpose scores as stored JSON
    pub purposes: serde_json::Value,
    pub file_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Database statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStats {
    pub file_count: i64,
    pub category_count: i64,
}

impl Database {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.initialize()?;
        Ok(db)
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock()
            .map_err(|_| CuratorError::DatabaseLock("connection mutex poisoned".to_string()))
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                path TEXT NOT NULL,
                category TEXT,
                confidence REAL DEFAULT 0.0,
                purposes TEXT DEFAULT '{}',
                file_hash TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_files_hash ON files(file_hash);
            CREATE INDEX IF NOT EXISTS idx_files_category ON files(category);
        "#)?;
        Ok(())
    }

    /// Insert an analysis report; the top-scoring purpose becomes the
    /// record's category and confidence.
    pub fn insert_report(&self, report: &FileReport) -> Result<String> {
        let (category, confidence) = report.purposes.iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, score)| (Some(name.clone()), *score))
            .unwrap_or((None, 0.0));

        let id = uuid::Uuid::new_v4().to_string();
        let purposes_json = serde_json::to_string(&report.purposes)?;

        let conn = self.lock_conn()?;
        conn.execute(
            r#"INSERT OR REPLACE INTO files (id, path, category, confidence, purposes, file_hash, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                id,
                report.path.to_string_lossy(),
                category,
                confidence,
                purposes_json,
                report.content_hash,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(id)
    }

    /// Search files by path substring
    pub fn search_files(&self, query: &str, limit: usize) -> Result<Vec<FileRecord>> {
        let conn = self.lock_conn()?;
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"SELECT id, path, category, confidence, purposes, file_hash, created_at
               FROM files WHERE path LIKE ?1
               ORDER BY created_at DESC LIMIT ?2"#
        )?;

        let files = stmt.query_map(params![pattern, limit as i64], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    /// Get all files
    pub fn get_all_files(&self) -> Result<Vec<FileRecord>> {
        self.search_files("", 10_000)
    }

    /// Category names with file counts, most populous first
    pub fn get_category_stats(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT COALESCE(category, 'Uncategorized') AS cat, COUNT(*) AS cnt
               FROM files GROUP BY cat ORDER BY cnt DESC"#
        )?;
        let stats = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
    }

    /// Check for a duplicate by content hash
    pub fn find_duplicate(&self, hash: &str) -> Result<Option<String>> {
        let conn = self.lock_conn()?;
        let result: rusqlite::Result<String> = conn.query_row(
            "SELECT path FROM files WHERE file_hash = ?1 LIMIT 1",
            params![hash],
            |row| row.get(0),
        );
        match result {
            Ok(path) => Ok(Some(path)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DbStats> {
        let conn = self.lock_conn()?;
        let file_count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        let category_count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT category) FROM files WHERE category IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(DbStats { file_count, category_count })
    }

    /// Vacuum database
    pub fn vacuum(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("VACUUM", [])?;
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let purposes_str: String = row.get(4)?;
    let created_str: String = row.get(6)?;
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        category: row.get(2)?,
        confidence: row.get(3)?,
        purposes: serde_json::from_str(&purposes_str).unwrap_or(serde_json::json!({})),
        created_at: DateTime::parse_from_rfc3339(&created_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        file_hash: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FileMetadata;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample_report(path: &str, category: &str, score: f64, hash: &str) -> FileReport {
        let mut purposes = BTreeMap::new();
        purposes.insert(category.to_string(), score);
        FileReport {
            path: PathBuf::from(path),
            metadata: FileMetadata {
                name: "x.txt".to_string(),
                extension: "txt".to_string(),
                size: 10,
                created: None,
                modified: Utc::now(),
                year: 2025,
            },
            purposes,
            project: None,
            content_preview: String::new(),
            content_hash: hash.to_string(),
        }
    }

    #[test]
    fn test_insert_and_search() {
        let db = Database::in_memory().unwrap();
        db.insert_report(&sample_report("/docs/tax_return.txt", "Finance", 0.9, "h1")).unwrap();
        db.insert_report(&sample_report("/docs/vacation.txt", "Leisure", 0.7, "h2")).unwrap();

        let hits = db.search_files("tax", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category.as_deref(), Some("Finance"));
        assert!((hits[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_category_stats() {
        let db = Database::in_memory().unwrap();
        db.insert_report(&sample_report("/a", "Work", 0.8, "h1")).unwrap();
        db.insert_report(&sample_report("/b", "Work", 0.6, "h2")).unwrap();
        db.insert_report(&sample_report("/c", "Health", 0.6, "h3")).unwrap();

        let stats = db.get_category_stats().unwrap();
        assert_eq!(stats[0], ("Work".to_string(), 2));
    }

    #[test]
    fn test_find_duplicate_by_hash() {
        let db = Database::in_memory().unwrap();
        db.insert_report(&sample_report("/a", "Work", 0.8, "samehash")).unwrap();

        assert_eq!(db.find_duplicate("samehash").unwrap().as_deref(), Some("/a"));
        assert!(db.find_duplicate("otherhash").unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get_stats().unwrap().file_count, 0);

        db.insert_report(&sample_report("/a", "Work", 0.8, "h1")).unwrap();
        db.insert_report(&sample_report("/b", "Health", 0.6, "h2")).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.category_count, 2);
    }

    #[test]
    fn test_poisoned_lock_is_a_database_lock_error() {
        let db = Database::in_memory().unwrap();

        let poisoner = db.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.conn.lock().unwrap();
            panic!("poison the connection mutex");
        })
        .join();

        let err = db.get_stats().unwrap_err();
        assert!(matches!(err, CuratorError::DatabaseLock(_)), "got {:?}", err);
    }

    #[test]
    fn test_report_without_purposes_is_uncategorized() {
        let db = Database::in_memory().unwrap();
        let mut report = sample_report("/a", "Work", 0.8, "h1");
        report.purposes.clear();
        db.insert_report(&report).unwrap();

        let stats = db.get_category_stats().unwrap();
        assert_eq!(stats[0].0, "Uncategorized");
    }
}
