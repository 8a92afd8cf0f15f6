// SPDX-License-Identifier: MIT

//! DOCX extractor (zip container, word/document.xml)

use std::path::Path;

use super::ContentExtractor;
use crate::{CuratorError, Result};

/// Extractor for DOCX documents
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Pull text runs out of word/document.xml without a full XML parse.
    /// Only the contents of `w:t` elements carry document text.
    fn extract_document_xml(content: &str) -> String {
        let mut text = String::new();
        let mut in_text = false;
        let mut current = String::new();

        for c in content.chars() {
            match c {
                '<' => {
                    if in_text && !current.is_empty() {
                        text.push_str(&current);
                        text.push(' ');
                        current.clear();
                    }
                    in_text = false;
                }
                '>' => {
                    if current.contains("w:t") && !current.contains('/') {
                        in_text = true;
                    }
                    current.clear();
                }
                _ => {
                    if in_text {
                        text.push(c);
                    } else {
                        current.push(c);
                    }
                }
            }
        }

        text
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn priority(&self) -> u8 {
        60
    }

    fn extract(&self, path: &Path, _max_bytes: usize) -> Result<String> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| CuratorError::Analysis(format!("Failed to open DOCX: {}", e)))?;

        let mut document_xml = match archive.by_name("word/document.xml") {
            Ok(file) => file,
            Err(_) => return Err(CuratorError::Analysis("No document.xml found".to_string())),
        };

        let mut content = String::new();
        std::io::Read::read_to_string(&mut document_xml, &mut content)?;

        Ok(Self::extract_document_xml(&content))
    }
}
