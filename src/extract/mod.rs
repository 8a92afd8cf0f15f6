// SPDX-License-Identifier: MIT

//! Content extractors for different file types
//!
//! Each extractor normalizes one family of file formats into plain text.
//! The registry picks the first extractor (priority-ordered) that claims
//! a path.

pub mod docx;
pub mod pdf;
pub mod spreadsheet;
pub mod text;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// File attributes gathered before content analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub extension: String,
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub modified: DateTime<Utc>,
    /// Calendar year of the last modification, used for temporal bucketing
    pub year: i32,
}

/// Trait for content extractors
pub trait ContentExtractor: Send + Sync {
    /// Name of this extractor
    fn name(&self) -> &'static str;

    /// File extensions this extractor handles
    fn supported_extensions(&self) -> &[&str];

    /// Check if this extractor can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.supported_extensions().iter().any(|e| e.eq_ignore_ascii_case(ext))
        } else {
            false
        }
    }

    /// Extract normalized text from a file. `max_bytes` caps how much
    /// of the file itself is read in the plain-text paths; extractors
    /// that must parse a whole container (PDF, DOCX) may ignore it and
    /// rely on the registry truncating their output.
    fn extract(&self, path: &Path, max_bytes: usize) -> Result<String>;

    /// Priority (higher = preferred when multiple extractors match)
    fn priority(&self) -> u8 {
        50
    }
}

/// Registry of content extractors
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ContentExtractor>>,
}

impl ExtractorRegistry {
    /// Create a registry with the default extractors
    pub fn new() -> Self {
        let mut registry = Self { extractors: Vec::new() };

        registry.register(Box::new(pdf::PdfExtractor::new()));
        registry.register(Box::new(spreadsheet::SpreadsheetExtractor::new()));
        registry.register(Box::new(docx::DocxExtractor::new()));
        registry.register(Box::new(text::TextExtractor::new()));

        registry
    }

    /// Register a new extractor
    pub fn register(&mut self, extractor: Box<dyn ContentExtractor>) {
        self.extractors.push(extractor);
        self.extractors.sort_by_key(|e| std::cmp::Reverse(e.priority()));
    }

    /// Find the best extractor for a file
    pub fn find_extractor(&self, path: &Path) -> Option<&dyn ContentExtractor> {
        self.extractors.iter()
            .find(|e| e.can_handle(path))
            .map(|e| e.as_ref())
    }

    /// Extract text from a file, degrading to empty text when no
    /// extractor claims it or extraction fails. Unknown extensions with
    /// a textual MIME guess are read as plain text.
    pub fn extract_text(&self, path: &Path, max_bytes: usize) -> String {
        let content = match self.find_extractor(path) {
            Some(extractor) => match extractor.extract(path, max_bytes) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Failed to extract {:?} with {}: {}", path, extractor.name(), e);
                    return String::new();
                }
            },
            None if looks_textual(path) => match read_text_capped(path, max_bytes) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Failed to read {:?}: {}", path, e);
                    return String::new();
                }
            },
            None => {
                tracing::debug!("No extractor for: {:?}", path);
                return String::new();
            }
        };

        truncate_on_char_boundary(content, max_bytes)
    }

    /// Get number of registered extractors
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Get extractor names
    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read at most `max_bytes` of a file as lossy UTF-8. Oversized files
/// are never loaded whole.
pub fn read_text_capped(path: &Path, max_bytes: usize) -> std::io::Result<String> {
    use std::io::Read;

    let file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.take(max_bytes as u64).read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn truncate_on_char_boundary(mut content: String, max_bytes: usize) -> String {
    if content.len() > max_bytes {
        let mut cut = max_bytes;
        while !content.is_char_boundary(cut) {
            cut -= 1;
        }
        content.truncate(cut);
    }
    content
}

/// Extract file system metadata for a path
pub fn extract_metadata(path: &Path) -> Result<FileMetadata> {
    let stats = std::fs::metadata(path)?;

    let modified: DateTime<Utc> = stats.modified()?.into();
    let created: Option<DateTime<Utc>> = stats.created().ok().map(Into::into);

    Ok(FileMetadata {
        name: path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string(),
        extension: path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase(),
        size: stats.len(),
        created,
        modified,
        year: modified.year(),
    })
}

/// Calculate file hash for deduplication
pub fn content_hash(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let hash = blake3::hash(&data);
    Ok(hash.to_hex().to_string())
}

/// Whether a path with an unknown extension is likely to hold text,
/// judged from its guessed MIME type.
pub fn looks_textual(path: &Path) -> bool {
    let guess = mime_guess::from_path(path).first_or_octet_stream();
    guess.type_() == mime_guess::mime::TEXT
        || (guess.type_() == mime_guess::mime::APPLICATION
            && matches!(guess.subtype().as_str(), "json" | "xml" | "toml" | "yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_registry_has_default_extractors() {
        let registry = ExtractorRegistry::new();
        assert!(!registry.is_empty());
        assert!(registry.extractor_names().contains(&"text"));
        assert!(registry.extractor_names().contains(&"pdf"));
    }

    #[test]
    fn test_find_extractor_by_extension() {
        let registry = ExtractorRegistry::new();
        assert_eq!(registry.find_extractor(Path::new("notes.md")).unwrap().name(), "text");
        assert_eq!(registry.find_extractor(Path::new("report.pdf")).unwrap().name(), "pdf");
        assert_eq!(registry.find_extractor(Path::new("data.xlsx")).unwrap().name(), "spreadsheet");
        assert!(registry.find_extractor(Path::new("movie.mkv")).is_none());
    }

    #[test]
    fn test_extract_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.TXT");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "hello").unwrap();

        let meta = extract_metadata(&path).unwrap();
        assert_eq!(meta.name, "sample.TXT");
        assert_eq!(meta.extension, "txt");
        assert_eq!(meta.size, 6);
        assert!(meta.year >= 2024);
    }

    #[test]
    fn test_content_hash_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "same bytes").unwrap();

        let h1 = content_hash(&path).unwrap();
        let h2 = content_hash(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_extract_text_truncates_on_char_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uni.txt");
        std::fs::write(&path, "héllo wörld héllo wörld").unwrap();

        let registry = ExtractorRegistry::new();
        let content = registry.extract_text(&path, 7);
        assert!(content.len() <= 7);
        assert!(content.starts_with("héllo"));
    }

    #[test]
    fn test_unknown_textual_extension_falls_back_to_plain_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.py");
        std::fs::write(&path, "def budget(): return 42").unwrap();

        let registry = ExtractorRegistry::new();
        assert!(registry.find_extractor(&path).is_none());
        let content = registry.extract_text(&path, 1024);
        assert!(content.contains("budget"));
    }

    #[test]
    fn test_oversized_file_is_not_read_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.log");
        std::fs::write(&path, "entry ".repeat(10_000)).unwrap();

        let capped = read_text_capped(&path, 100).unwrap();
        assert!(capped.len() <= 100);

        let registry = ExtractorRegistry::new();
        let content = registry.extract_text(&path, 100);
        assert!(content.len() <= 100);
        assert!(content.starts_with("entry"));
    }

    #[test]
    fn test_looks_textual() {
        assert!(looks_textual(Path::new("a.txt")));
        assert!(looks_textual(Path::new("a.json")));
        assert!(!looks_textual(Path::new("a.png")));
    }
}
