// SPDX-License-Identifier: MIT

//! PDF text extractor

use std::path::Path;

use super::ContentExtractor;
use crate::{CuratorError, Result};

/// Extractor for PDF documents
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn priority(&self) -> u8 {
        60
    }

    // A PDF must be parsed whole; the registry caps the output instead.
    fn extract(&self, path: &Path, _max_bytes: usize) -> Result<String> {
        let bytes = std::fs::read(path)?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| CuratorError::Pdf(format!("Failed to extract text: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_handle_pdf_only() {
        let extractor = PdfExtractor::new();
        assert!(extractor.can_handle(Path::new("invoice.pdf")));
        assert!(extractor.can_handle(Path::new("INVOICE.PDF")));
        assert!(!extractor.can_handle(Path::new("invoice.txt")));
    }

    #[test]
    fn test_garbage_bytes_error_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        assert!(PdfExtractor::new().extract(&path, 4096).is_err());
    }
}
