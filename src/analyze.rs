// SPDX-License-Identifier: MIT

//! File analysis orchestration
//!
//! Ties metadata extraction, content extraction, and classification
//! together into per-file reports, and walks directories applying the
//! same skip rules everywhere.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::classify::Classifier;
use crate::config::AppConfig;
use crate::extract::{content_hash, extract_metadata, ExtractorRegistry, FileMetadata};
use crate::Result;

/// Maximum characters kept in the content preview
const PREVIEW_CHARS: usize = 500;

/// Full analysis of one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub metadata: FileMetadata,
    /// Purpose categories with confidence scores
    pub purposes: BTreeMap<String, f64>,
    /// Best-matching project category
    pub project: Option<String>,
    /// First characters of the extracted content
    pub content_preview: String,
    pub content_hash: String,
}

/// File analyzer combining extraction and classification
pub struct Analyzer {
    registry: ExtractorRegistry,
    classifier: Classifier,
    max_content_bytes: usize,
}

impl Analyzer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            registry: ExtractorRegistry::new(),
            classifier: Classifier::new(
                config.categories.clone(),
                config.classification.clone(),
            ),
            max_content_bytes: config.scan.max_content_bytes,
        }
    }

    /// Analyze a single file
    pub fn analyze_file(&self, path: &Path) -> Result<FileReport> {
        debug!("Analyzing: {:?}", path);

        let metadata = extract_metadata(path)?;
        let hash = content_hash(path)?;
        let content = self.registry.extract_text(path, self.max_content_bytes);

        let classification = self.classifier.classify(&content, metadata.year);

        Ok(FileReport {
            path: path.to_path_buf(),
            metadata,
            purposes: classification.purposes,
            project: classification.project,
            content_preview: preview(&content),
            content_hash: hash,
        })
    }

    /// Analyze every processable file under a directory. Per-file
    /// failures are logged and skipped; the walk always completes.
    pub fn analyze_dir(&self, dir: &Path, recursive: bool) -> Vec<FileReport> {
        let mut reports = Vec::new();

        for path in collect_files(dir, recursive) {
            match self.analyze_file(&path) {
                Ok(report) => reports.push(report),
                Err(e) => error!("Failed to analyze {:?}: {}", path, e),
            }
        }

        reports
    }

    /// Analyze a directory and write one `<stem>_analysis.json` per file
    /// into `output_dir`.
    pub fn analyze_dir_to(
        &self,
        dir: &Path,
        output_dir: &Path,
        recursive: bool,
    ) -> Result<Vec<FileReport>> {
        let reports = self.analyze_dir(dir, recursive);
        for report in &reports {
            write_report(report, output_dir)?;
        }

        info!("Wrote {} analysis files to {:?}", reports.len(), output_dir);
        Ok(reports)
    }
}

/// Write one report as `<stem>_analysis.json` under `output_dir`
pub fn write_report(report: &FileReport, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let stem = report.path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let out = output_dir.join(format!("{}_analysis.json", stem));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&out, json)?;
    Ok(out)
}

/// Collect processable files under a directory
pub fn collect_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    walker.into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| should_process(p))
        .collect()
}

/// Check if a file should be processed
pub fn should_process(path: &Path) -> bool {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };

    // Skip hidden files
    if filename.starts_with('.') {
        return false;
    }

    // Skip temporary files
    let temp_extensions = [".tmp", ".part", ".crdownload", ".partial", ".download"];
    for ext in &temp_extensions {
        if filename.ends_with(ext) {
            return false;
        }
    }

    // Skip system files
    let skip_names = ["desktop.ini", "thumbs.db", ".ds_store"];
    if skip_names.iter().any(|n| filename.eq_ignore_ascii_case(n)) {
        return false;
    }

    // Skip our own working files: journal, config, SQLite index and
    // its sidecars. Organizing the journal away would orphan rollback.
    let own_names = ["curator_journal.jsonl", "curator.json", "curator.db"];
    if own_names.iter().any(|n| filename.eq_ignore_ascii_case(n)) {
        return false;
    }
    if filename.starts_with("curator.db-") {
        return false;
    }

    true
}

/// First `PREVIEW_CHARS` characters of the content
fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> Analyzer {
        Analyzer::new(&AppConfig::default())
    }

    #[test]
    fn test_should_process() {
        assert!(should_process(Path::new("/tmp/report.pdf")));
        assert!(!should_process(Path::new("/tmp/.hidden")));
        assert!(!should_process(Path::new("/tmp/download.part")));
        assert!(!should_process(Path::new("/tmp/Thumbs.db")));
    }

    #[test]
    fn test_should_process_skips_own_working_files() {
        assert!(!should_process(Path::new("/docs/curator_journal.jsonl")));
        assert!(!should_process(Path::new("/docs/curator.json")));
        assert!(!should_process(Path::new("/docs/curator.db")));
        assert!(!should_process(Path::new("/docs/curator.db-wal")));
        assert!(should_process(Path::new("/docs/other.jsonl")));
    }

    #[test]
    fn test_analyze_file_report_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.txt");
        std::fs::write(
            &path,
            "This is a sample work document about a personal project in finance. \
             Budget invoice payment statement for the bank.",
        ).unwrap();

        let report = analyzer().analyze_file(&path).unwrap();

        assert_eq!(report.metadata.extension, "txt");
        assert_eq!(report.metadata.name, "memo.txt");
        assert!(report.content_preview.chars().count() <= 500);
        assert_eq!(report.content_hash.len(), 64);
        assert!(report.purposes.contains_key("Finance"), "got: {:?}", report.purposes);
    }

    #[test]
    fn test_analyze_missing_file_errors() {
        let result = analyzer().analyze_file(Path::new("/no/such/file.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "word ".repeat(500);
        assert_eq!(preview(&long).chars().count(), 500);
    }

    #[test]
    fn test_analyze_dir_skips_hidden_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "work meeting project report").unwrap();
        std::fs::write(dir.path().join(".secret"), "hidden").unwrap();
        std::fs::write(dir.path().join("b.txt"), "vacation travel trip holiday").unwrap();

        let reports = analyzer().analyze_dir(dir.path(), false);
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_analyze_dir_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("top.txt"), "work project").unwrap();
        std::fs::write(sub.join("deep.txt"), "family birthday photo").unwrap();

        assert_eq!(analyzer().analyze_dir(dir.path(), false).len(), 1);
        assert_eq!(analyzer().analyze_dir(dir.path(), true).len(), 2);
    }

    #[test]
    fn test_write_report_for_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.txt");
        std::fs::write(&path, "meeting agenda for the work project").unwrap();

        let report = analyzer().analyze_file(&path).unwrap();
        let written = write_report(&report, &out.path().join("nested")).unwrap();

        assert_eq!(written.file_name().unwrap(), "memo_analysis.json");
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
        assert!(parsed.get("content_hash").is_some());
    }

    #[test]
    fn test_analyze_dir_to_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "course lecture homework exam").unwrap();

        let reports = analyzer()
            .analyze_dir_to(dir.path(), out.path(), false)
            .unwrap();
        assert_eq!(reports.len(), 1);

        let exported = out.path().join("notes_analysis.json");
        assert!(exported.exists());
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(exported).unwrap()).unwrap();
        assert!(parsed.get("purposes").is_some());
        assert!(parsed.get("content_preview").is_some());
    }
}
