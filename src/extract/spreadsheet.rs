// SPDX-License-Identifier: MIT

//! Spreadsheet extractor using calamine

use std::path::Path;

use super::{read_text_capped, ContentExtractor};
use crate::{CuratorError, Result};

/// Extractor for spreadsheet files
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_workbook(path: &Path) -> Result<String> {
        use calamine::{open_workbook_auto, Reader};

        let mut workbook = open_workbook_auto(path)
            .map_err(|e| CuratorError::Spreadsheet(format!("Failed to open spreadsheet: {}", e)))?;

        let mut text = String::new();

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        text.push_str(&format!("Sheets: {}\n", sheet_names.join(", ")));

        // Read first sheet, first 20 rows
        if let Some(sheet_name) = sheet_names.first() {
            if let Ok(range) = workbook.worksheet_range(sheet_name) {
                for (i, row) in range.rows().enumerate() {
                    if i >= 20 {
                        text.push_str("...\n");
                        break;
                    }
                    let row_text: Vec<String> = row.iter()
                        .map(|c| c.to_string())
                        .collect();
                    text.push_str(&row_text.join("\t"));
                    text.push('\n');
                }
            }
        }

        Ok(text)
    }

    fn extract_csv(path: &Path, max_bytes: usize) -> Result<String> {
        // calamine does not read CSV; plain lines are already text
        Ok(read_text_capped(path, max_bytes)?)
    }
}

impl Default for SpreadsheetExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for SpreadsheetExtractor {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["xlsx", "xls", "ods", "csv"]
    }

    fn priority(&self) -> u8 {
        60
    }

    fn extract(&self, path: &Path, max_bytes: usize) -> Result<String> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Self::extract_csv(path, max_bytes),
            "xlsx" | "xls" | "ods" => Self::extract_workbook(path),
            _ => Err(CuratorError::UnsupportedFileType(ext)),
        }
    }
}
