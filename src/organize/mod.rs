// SPDX-License-Identifier: MIT

//! Folder reorganization engine
//!
//! Turns categorization rules into a target hierarchy, previews the
//! plan, applies it by moving files (journaling every move), and rolls
//! moves back from the journal.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analyze::collect_files;
use crate::config::{HierarchyRule, OrganizeConfig};
use crate::extract::{content_hash, extract_metadata};
use crate::history::{create_entry, Journal};
use crate::Result;

/// A proposed reorganization: target folder (relative to the
/// destination root) mapped to the files that would move there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizePlan {
    pub assignments: BTreeMap<String, Vec<PathBuf>>,
}

impl OrganizePlan {
    /// Total number of files in the plan
    pub fn file_count(&self) -> usize {
        self.assignments.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Outcome of applying a plan
#[derive(Debug, Clone, Default)]
pub struct ApplySummary {
    pub moved: usize,
    pub failed: usize,
}

/// Outcome of a rollback
#[derive(Debug, Clone, Default)]
pub struct RollbackSummary {
    pub restored: usize,
    pub skipped: usize,
}

/// Folder reorganizer
pub struct Reorganizer {
    config: OrganizeConfig,
    journal: Journal,
}

impl Reorganizer {
    pub fn new(config: OrganizeConfig, journal: Journal) -> Self {
        Self { config, journal }
    }

    /// Generate a target hierarchy for all processable files in a
    /// directory. First matching rule wins; unmatched files land in the
    /// fallback category.
    pub fn generate_hierarchy(&self, source: &Path, recursive: bool) -> Result<OrganizePlan> {
        let mut assignments: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

        // The journal must never be part of its own plan; moving it
        // would strand every recorded move.
        let journal_path = self.journal.path().canonicalize().ok();

        for path in collect_files(source, recursive) {
            if let Some(ref journal) = journal_path {
                if path.canonicalize().map(|p| &p == journal).unwrap_or(false) {
                    continue;
                }
            }

            let category = self.categorize(&path);

            let target = if self.config.year_subfolders {
                match extract_metadata(&path) {
                    Ok(meta) => format!("{}/{}", category, meta.year),
                    Err(e) => {
                        debug!("No metadata for {:?}: {}", path, e);
                        category
                    }
                }
            } else {
                category
            };

            assignments.entry(target).or_default().push(path);
        }

        Ok(OrganizePlan { assignments })
    }

    /// Determine the category for a file from the configured rules
    pub fn categorize(&self, path: &Path) -> String {
        for rule in &self.config.hierarchy_rules {
            if rule_matches(rule, path) {
                return rule.category.clone();
            }
        }
        self.config.fallback_category.clone()
    }

    /// Render the plan without touching the filesystem
    pub fn preview(&self, plan: &OrganizePlan) -> String {
        let mut out = String::from("Proposed folder reorganization:\n");
        for (target, files) in &plan.assignments {
            out.push_str(&format!("\n{}/ ({} files)\n", target, files.len()));
            for file in files {
                out.push_str(&format!("  - {}\n", file.display()));
            }
        }
        out
    }

    /// Apply the plan: create target folders under `dest` and move
    /// files into them. Every move is journaled before it lands.
    pub fn apply(&self, plan: &OrganizePlan, dest: &Path) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();

        for (target, files) in &plan.assignments {
            let target_dir = dest.join(target);
            std::fs::create_dir_all(&target_dir)?;

            for file in files {
                match self.move_file(file, &target_dir, target) {
                    Ok(new_path) => {
                        info!("Moved {:?} -> {:?}", file, new_path);
                        summary.moved += 1;
                    }
                    Err(e) => {
                        warn!("Failed to move {:?}: {}", file, e);
                        summary.failed += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    fn move_file(&self, file: &Path, target_dir: &Path, category: &str) -> Result<PathBuf> {
        let name = file.file_name()
            .ok_or_else(|| crate::CuratorError::Analysis(
                format!("No file name in {:?}", file),
            ))?;

        let mut new_path = target_dir.join(name);

        // Handle filename collision
        if new_path.exists() {
            let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
            let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
            let timestamp = Local::now().format("%H%M%S").to_string();
            let renamed = if ext.is_empty() {
                format!("{}_{}", stem, timestamp)
            } else {
                format!("{}_{}.{}", stem, timestamp, ext)
            };
            new_path = target_dir.join(renamed);
        }

        let hash = content_hash(file).unwrap_or_default();

        // Journal before the move so a crash mid-move is recoverable
        let entry = create_entry(
            file.to_path_buf(),
            new_path.clone(),
            category.to_string(),
            hash,
        );
        self.journal.append(&entry)?;

        rename_or_copy(file, &new_path)?;
        Ok(new_path)
    }

    /// Roll back up to `count` journaled moves, newest first
    /// (0 = all). Restored entries are marked undone; category folders
    /// the restores emptied are pruned up to (but not including) `dest`.
    pub fn rollback(&self, dest: &Path, count: usize, dry_run: bool) -> Result<RollbackSummary> {
        let entries = self.journal.get_undoable()?;
        let take = if count == 0 { entries.len() } else { count };
        let to_undo: Vec<_> = entries.into_iter().rev().take(take).collect();

        let mut summary = RollbackSummary::default();

        if to_undo.is_empty() {
            info!("No moves to roll back");
            return Ok(summary);
        }

        let mut vacated: Vec<PathBuf> = Vec::new();

        for entry in to_undo {
            if !entry.new_path.exists() {
                warn!("File not found (moved or deleted since): {:?}", entry.new_path);
                summary.skipped += 1;
                continue;
            }
            if entry.original_path.exists() {
                warn!("Original path already occupied: {:?}", entry.original_path);
                summary.skipped += 1;
                continue;
            }

            if dry_run {
                info!("Would restore {:?} -> {:?}", entry.new_path, entry.original_path);
                summary.restored += 1;
            } else {
                if let Some(parent) = entry.original_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                rename_or_copy(&entry.new_path, &entry.original_path)?;
                self.journal.mark_undone(&entry.id)?;
                info!("Restored {:?} -> {:?}", entry.new_path, entry.original_path);
                summary.restored += 1;

                if let Some(parent) = entry.new_path.parent() {
                    vacated.push(parent.to_path_buf());
                }
            }
        }

        vacated.sort();
        vacated.dedup();
        for dir in vacated {
            prune_empty_chain(&dir, dest);
        }

        Ok(summary)
    }
}

/// Check whether a file satisfies a rule's conditions
fn rule_matches(rule: &HierarchyRule, path: &Path) -> bool {
    if !rule.extensions.is_empty() {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !rule.extensions.iter().any(|r| r.eq_ignore_ascii_case(&ext)) {
            return false;
        }
    }

    if !rule.keywords.is_empty() {
        let name = path.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if !rule.keywords.iter().any(|kw| name.contains(&kw.to_lowercase())) {
            return false;
        }
    }

    true
}

/// Move a file, falling back to copy+remove across devices
fn rename_or_copy(from: &Path, to: &Path) -> Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)?;
            Ok(())
        }
    }
}

/// Remove a directory and its now-empty ancestors, stopping at `stop`
/// or the first non-empty directory.
fn prune_empty_chain(dir: &Path, stop: &Path) {
    let mut current = dir;
    while current.starts_with(stop) && current != stop {
        let empty = std::fs::read_dir(current)
            .map(|mut it| it.next().is_none())
            .unwrap_or(false);
        if !empty {
            break;
        }
        if std::fs::remove_dir(current).is_err() {
            break;
        }
        debug!("Pruned empty dir: {:?}", current);
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn reorganizer(journal_dir: &Path) -> Reorganizer {
        let config = AppConfig::default();
        let journal = Journal::new(journal_dir.join("moves.jsonl"));
        Reorganizer::new(config.organize, journal)
    }

    #[test]
    fn test_categorize_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let r = reorganizer(dir.path());

        assert_eq!(r.categorize(Path::new("notes.txt")), "Documents");
        assert_eq!(r.categorize(Path::new("data.csv")), "Spreadsheets");
        assert_eq!(r.categorize(Path::new("photo.JPG")), "Images");
        assert_eq!(r.categorize(Path::new("mystery.xyz")), "Uncategorized");
    }

    #[test]
    fn test_keyword_rule_beats_plain_extension_rule() {
        let dir = tempfile::tempdir().unwrap();
        let r = reorganizer(dir.path());

        // Default rules put invoice/receipt PDFs under Finance first
        assert_eq!(r.categorize(Path::new("invoice_march.pdf")), "Finance");
        assert_eq!(r.categorize(Path::new("novel.pdf")), "Documents");
    }

    #[test]
    fn test_generate_hierarchy_groups_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "text").unwrap();
        std::fs::write(dir.path().join("b.txt"), "more text").unwrap();
        std::fs::write(dir.path().join("c.csv"), "x,y").unwrap();

        let r = reorganizer(dir.path());
        let plan = r.generate_hierarchy(dir.path(), false).unwrap();

        assert_eq!(plan.file_count(), 3);
        assert_eq!(plan.assignments["Documents"].len(), 2);
        assert_eq!(plan.assignments["Spreadsheets"].len(), 1);
    }

    #[test]
    fn test_year_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "text").unwrap();

        let mut config = AppConfig::default();
        config.organize.year_subfolders = true;
        let journal = Journal::new(dir.path().join("moves.jsonl"));
        let r = Reorganizer::new(config.organize, journal);

        let plan = r.generate_hierarchy(dir.path(), false).unwrap();
        let target = plan.assignments.keys().next().unwrap();
        assert!(target.starts_with("Documents/2"), "got {}", target);
    }

    #[test]
    fn test_preview_mutates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "text").unwrap();

        let r = reorganizer(dir.path());
        let plan = r.generate_hierarchy(dir.path(), false).unwrap();
        let rendered = r.preview(&plan);

        assert!(rendered.contains("Documents/"));
        assert!(rendered.contains("a.txt"));
        assert!(dir.path().join("a.txt").exists());
        assert!(!dir.path().join("Documents").exists());
    }

    #[test]
    fn test_apply_moves_and_journals() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "text").unwrap();
        std::fs::write(src.path().join("b.csv"), "x,y").unwrap();

        let r = reorganizer(src.path());
        let plan = r.generate_hierarchy(src.path(), false).unwrap();
        let summary = r.apply(&plan, dest.path()).unwrap();

        assert_eq!(summary.moved, 2);
        assert_eq!(summary.failed, 0);
        assert!(dest.path().join("Documents/a.txt").exists());
        assert!(dest.path().join("Spreadsheets/b.csv").exists());
        assert!(!src.path().join("a.txt").exists());

        let journal = Journal::new(src.path().join("moves.jsonl"));
        assert_eq!(journal.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_apply_then_rollback_restores_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(src.path().join("b.txt"), "beta").unwrap();

        let r = reorganizer(src.path());
        let plan = r.generate_hierarchy(src.path(), false).unwrap();
        r.apply(&plan, dest.path()).unwrap();
        assert!(!src.path().join("a.txt").exists());

        let summary = r.rollback(dest.path(), 0, false).unwrap();
        assert_eq!(summary.restored, 2);
        assert_eq!(summary.skipped, 0);

        assert_eq!(std::fs::read_to_string(src.path().join("a.txt")).unwrap(), "alpha");
        assert_eq!(std::fs::read_to_string(src.path().join("b.txt")).unwrap(), "beta");
        assert!(!dest.path().join("Documents").exists());

        // Everything is marked undone; a second rollback is a no-op
        let again = r.rollback(dest.path(), 0, false).unwrap();
        assert_eq!(again.restored, 0);
    }

    #[test]
    fn test_repeat_apply_leaves_journal_in_place() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(src.path().join("b.txt"), "beta").unwrap();

        let r = reorganizer(src.path());
        let plan = r.generate_hierarchy(src.path(), false).unwrap();
        r.apply(&plan, dest.path()).unwrap();

        // The journal now sits in the source; a second pass must not
        // treat it as a file to organize.
        let plan2 = r.generate_hierarchy(src.path(), false).unwrap();
        assert!(plan2.is_empty(), "second plan: {:?}", plan2.assignments);
        r.apply(&plan2, dest.path()).unwrap();
        assert!(src.path().join("moves.jsonl").exists());

        let summary = r.rollback(dest.path(), 0, false).unwrap();
        assert_eq!(summary.restored, 2);
        assert_eq!(std::fs::read_to_string(src.path().join("a.txt")).unwrap(), "alpha");
        assert_eq!(std::fs::read_to_string(src.path().join("b.txt")).unwrap(), "beta");
    }

    #[test]
    fn test_rollback_dry_run_moves_nothing() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "alpha").unwrap();

        let r = reorganizer(src.path());
        let plan = r.generate_hierarchy(src.path(), false).unwrap();
        r.apply(&plan, dest.path()).unwrap();

        let summary = r.rollback(dest.path(), 0, true).unwrap();
        assert_eq!(summary.restored, 1);
        assert!(dest.path().join("Documents/a.txt").exists());
        assert!(!src.path().join("a.txt").exists());
    }

    #[test]
    fn test_rollback_skips_occupied_original() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "alpha").unwrap();

        let r = reorganizer(src.path());
        let plan = r.generate_hierarchy(src.path(), false).unwrap();
        r.apply(&plan, dest.path()).unwrap();

        // Someone re-created the original path in the meantime
        std::fs::write(src.path().join("a.txt"), "squatter").unwrap();

        let summary = r.rollback(dest.path(), 0, false).unwrap();
        assert_eq!(summary.restored, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(std::fs::read_to_string(src.path().join("a.txt")).unwrap(), "squatter");
    }

    #[test]
    fn test_collision_gets_suffix() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "new").unwrap();
        std::fs::create_dir_all(dest.path().join("Documents")).unwrap();
        std::fs::write(dest.path().join("Documents/a.txt"), "existing").unwrap();

        let r = reorganizer(src.path());
        let plan = r.generate_hierarchy(src.path(), false).unwrap();
        let summary = r.apply(&plan, dest.path()).unwrap();

        assert_eq!(summary.moved, 1);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("Documents/a.txt")).unwrap(),
            "existing"
        );
        // The newcomer landed under a suffixed name
        let count = std::fs::read_dir(dest.path().join("Documents")).unwrap().count();
        assert_eq!(count, 2);
    }
}
