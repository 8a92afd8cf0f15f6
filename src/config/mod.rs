// SPDX-License-Identifier: MIT

//! Configuration management for Curator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Directory scanning settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Category vocabularies
    #[serde(default)]
    pub categories: CategoryConfig,

    /// Classification scoring settings
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Similarity scoring settings
    #[serde(default)]
    pub similarity: SimilarityConfig,

    /// Reorganization settings
    #[serde(default)]
    pub organize: OrganizeConfig,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    /// Always descend into subdirectories, even without --recursive
    #[serde(default)]
    pub recursive: bool,

    /// Hard cap on bytes read from any single file
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CategoryConfig {
    #[serde(default = "default_purpose_categories")]
    pub purpose_categories: Vec<String>,

    #[serde(default = "default_project_categories")]
    pub project_categories: Vec<String>,

    #[serde(default = "default_version_types")]
    pub version_types: Vec<String>,

    /// Extra lexicon keywords per purpose category, merged over the
    /// built-in lexicons at classification time.
    #[serde(default)]
    pub keyword_overrides: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClassificationConfig {
    /// Minimum combined score for a category to be reported
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Weight of the lexicon hit-rate component
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    /// Weight of the category-name token-overlap component
    #[serde(default = "default_token_weight")]
    pub token_weight: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimilarityConfig {
    /// Weight of content (TF-IDF cosine) similarity
    #[serde(default = "default_content_weight")]
    pub content_weight: f64,

    /// Weight of filename stem similarity
    #[serde(default = "default_name_weight")]
    pub name_weight: f64,

    /// Overall similarity at or above which two files count as versions
    #[serde(default = "default_version_threshold")]
    pub version_threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OrganizeConfig {
    /// Categorization rules, applied in order; first match wins
    #[serde(default = "default_hierarchy_rules")]
    pub hierarchy_rules: Vec<HierarchyRule>,

    /// Place files into <category>/<year> subfolders
    #[serde(default)]
    pub year_subfolders: bool,

    /// Category for files no rule matches
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,
}

/// A single categorization rule
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HierarchyRule {
    /// Target category name
    pub category: String,

    /// Extensions (without dot) this rule matches; empty = any
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Filename keywords this rule matches; empty = any
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

// Default value functions
fn default_max_content_bytes() -> usize { 1_048_576 }
fn default_confidence_threshold() -> f64 { 0.5 }
fn default_keyword_weight() -> f64 { 0.7 }
fn default_token_weight() -> f64 { 0.3 }
fn default_content_weight() -> f64 { 0.6 }
fn default_name_weight() -> f64 { 0.4 }
fn default_version_threshold() -> f64 { 0.5 }
fn default_fallback_category() -> String { "Uncategorized".to_string() }
fn default_db_path() -> String { "curator.db".to_string() }

fn default_purpose_categories() -> Vec<String> {
    vec![
        "Work", "Leisure", "Personal Projects", "Private",
        "Family", "Education", "Finance", "Health",
    ].into_iter().map(String::from).collect()
}

fn default_project_categories() -> Vec<String> {
    vec!["Work", "Personal", "Academic", "Freelance"]
        .into_iter().map(String::from).collect()
}

fn default_version_types() -> Vec<String> {
    vec!["unique", "draft", "revised", "final"]
        .into_iter().map(String::from).collect()
}

fn default_hierarchy_rules() -> Vec<HierarchyRule> {
    let rule = |category: &str, extensions: &[&str]| HierarchyRule {
        category: category.to_string(),
        extensions: extensions.iter().map(|e| e.to_string()).collect(),
        keywords: Vec::new(),
    };

    vec![
        HierarchyRule {
            category: "Finance".to_string(),
            extensions: vec!["pdf".to_string()],
            keywords: vec!["invoice".to_string(), "receipt".to_string(), "statement".to_string()],
        },
        rule("Documents", &["pdf", "doc", "docx", "odt", "txt", "md", "rtf"]),
        rule("Spreadsheets", &["xls", "xlsx", "csv", "ods"]),
        rule("Presentations", &["ppt", "pptx", "odp"]),
        rule("Images", &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "heic"]),
        rule("Audio", &["mp3", "wav", "flac", "ogg", "m4a"]),
        rule("Videos", &["mp4", "mkv", "webm", "avi", "mov"]),
        rule("Code", &["rs", "py", "js", "ts", "go", "java", "c", "cpp", "h"]),
        rule("Archives", &["zip", "tar", "gz", "7z", "rar"]),
    ]
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            max_content_bytes: default_max_content_bytes(),
        }
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            purpose_categories: default_purpose_categories(),
            project_categories: default_project_categories(),
            version_types: default_version_types(),
            keyword_overrides: HashMap::new(),
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            keyword_weight: default_keyword_weight(),
            token_weight: default_token_weight(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            content_weight: default_content_weight(),
            name_weight: default_name_weight(),
            version_threshold: default_version_threshold(),
        }
    }
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            hierarchy_rules: default_hierarchy_rules(),
            year_subfolders: false,
            fallback_category: default_fallback_category(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            categories: CategoryConfig::default(),
            classification: ClassificationConfig::default(),
            similarity: SimilarityConfig::default(),
            organize: OrganizeConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::CuratorError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> crate::Result<()> {
        if self.categories.purpose_categories.is_empty() {
            return Err(crate::CuratorError::Config(
                "purpose_categories must not be empty".to_string(),
            ));
        }

        let weights = [
            ("classification.keyword_weight", self.classification.keyword_weight),
            ("classification.token_weight", self.classification.token_weight),
            ("classification.confidence_threshold", self.classification.confidence_threshold),
            ("similarity.content_weight", self.similarity.content_weight),
            ("similarity.name_weight", self.similarity.name_weight),
            ("similarity.version_threshold", self.similarity.version_threshold),
        ];
        for (name, value) in weights {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::CuratorError::Config(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }

        if self.organize.fallback_category.trim().is_empty() {
            return Err(crate::CuratorError::Config(
                "organize.fallback_category must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}
