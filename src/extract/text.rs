// SPDX-License-Identifier: MIT

//! Plain text extractor

use std::path::Path;

use super::{read_text_capped, ContentExtractor};
use crate::Result;

/// Extractor for plain text and markup files
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for TextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn supported_extensions(&self) -> &[&str] {
        &[
            "txt", "md", "markdown", "rst", "adoc", "asciidoc",
            "log", "json", "yaml", "yml", "toml", "xml", "html", "htm",
        ]
    }

    // Plain text is the fallback; let format-specific extractors win
    fn priority(&self) -> u8 {
        10
    }

    fn extract(&self, path: &Path, max_bytes: usize) -> Result<String> {
        Ok(read_text_capped(path, max_bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "project budget for next quarter").unwrap();

        let extractor = TextExtractor::new();
        assert!(extractor.can_handle(&path));
        let content = extractor.extract(&path, 4096).unwrap();
        assert_eq!(content, "project budget for next quarter");
    }

    #[test]
    fn test_extract_respects_byte_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.log");
        std::fs::write(&path, "line\n".repeat(1000)).unwrap();

        let content = TextExtractor::new().extract(&path, 50).unwrap();
        assert_eq!(content.len(), 50);
    }

    #[test]
    fn test_invalid_utf8_is_lossy_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.txt");
        std::fs::write(&path, [b'o', b'k', 0xFF, b'!']).unwrap();

        let content = TextExtractor::new().extract(&path, 4096).unwrap();
        assert!(content.starts_with("ok"));
        assert!(content.ends_with('!'));
    }
}
