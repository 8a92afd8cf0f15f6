// SPDX-License-Identifier: MIT

//! Curator: Content-Aware File Classifier & Folder Reorganizer
//!
//! Analyzes file content and metadata, classifies files into purpose
//! categories, detects near-duplicate versions, and reorganizes folders
//! with preview and rollback support.

pub mod analyze;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod history;
pub mod organize;
pub mod similarity;

pub use config::AppConfig;
pub use error::{CuratorError, Result};
