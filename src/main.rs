// SPDX-License-Identifier: MIT

//! Curator: Content-Aware File Classifier & Folder Reorganizer
//!
//! Analyzes file content, classifies files into purpose categories,
//! finds near-duplicate versions, and reorganizes folders with preview
//! and rollback.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use curator::analyze::{collect_files, write_report, Analyzer};
use curator::config::AppConfig;
use curator::db::Database;
use curator::history::Journal;
use curator::organize::Reorganizer;
use curator::similarity::{generate_version_name, label_versions, SimilarityEngine};
use curator::{CuratorError, Result};

/// Default journal file for move rollback
const JOURNAL_FILE: &str = "curator_journal.jsonl";

/// Curator CLI
#[derive(Parser, Debug)]
#[command(name = "curator")]
#[command(version)]
#[command(about = "Content-aware file classifier and folder reorganizer", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "curator.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "jsonl"])]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a file or directory and classify contents
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Directory to write per-file analysis JSON into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Recursive analysis for directories
        #[arg(short, long)]
        recursive: bool,

        /// Minimum confidence for a purpose to be shown (0.0-1.0)
        #[arg(long, default_value = "0.0")]
        min_confidence: f64,

        /// Skip writing results into the database index
        #[arg(long)]
        no_index: bool,
    },

    /// Find similar files and version groups in a directory
    Similar {
        /// Directory to scan
        dir: PathBuf,

        /// Similarity threshold for reported pairs (defaults to config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Recursive scan
        #[arg(short, long)]
        recursive: bool,
    },

    /// Reorganize a directory into a category hierarchy
    Organize {
        /// Directory to reorganize
        dir: PathBuf,

        /// Destination root (defaults to the source directory)
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Actually move files (default is preview only)
        #[arg(long)]
        apply: bool,

        /// Recursive scan
        #[arg(short, long)]
        recursive: bool,
    },

    /// Roll back journaled moves
    Rollback {
        /// Number of moves to roll back (0 = all)
        #[arg(short = 'n', long, default_value = "0")]
        count: usize,

        /// Show what would be restored without doing it
        #[arg(long)]
        dry_run: bool,

        /// Destination root whose empty folders should be pruned
        #[arg(short, long, default_value = ".")]
        dest: PathBuf,
    },

    /// Move journal operations
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Database index operations
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Initialize a new Curator project
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent journal entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Clear the journal
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    /// Show database statistics
    Stats,

    /// List categories with file counts
    Categories,

    /// Search indexed files by path
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Export database to JSON
    Export {
        /// Output file
        output: PathBuf,
    },

    /// Vacuum database (reclaim space)
    Vacuum,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "curator.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Analyze { path, output, recursive, min_confidence, no_index } => {
            run_analyze(config, path, output, recursive, min_confidence, no_index, &cli.format)
        }
        Commands::Similar { dir, threshold, recursive } => {
            run_similar(config, dir, threshold, recursive, &cli.format)
        }
        Commands::Organize { dir, dest, apply, recursive } => {
            run_organize(config, dir, dest, apply, recursive)
        }
        Commands::Rollback { count, dry_run, dest } => {
            run_rollback(config, count, dry_run, dest)
        }
        Commands::History { action } => run_history_command(action),
        Commands::Db { action } => run_db_command(config, action),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Init { dir, force } => run_init(dir, force),
    }
}

/// Run analysis over a file or directory
fn run_analyze(
    config: AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    recursive: bool,
    min_confidence: f64,
    no_index: bool,
    format: &str,
) -> Result<()> {
    let analyzer = Analyzer::new(&config);
    let recursive = recursive || config.scan.recursive;

    let reports = if path.is_dir() {
        if let Some(ref out) = output {
            analyzer.analyze_dir_to(&path, out, recursive)?
        } else {
            analyzer.analyze_dir(&path, recursive)
        }
    } else {
        let report = analyzer.analyze_file(&path)?;
        if let Some(ref out) = output {
            write_report(&report, out)?;
        }
        vec![report]
    };

    let db = if no_index {
        None
    } else {
        Some(Database::open(&config.database.path)?)
    };

    for report in &reports {
        if let Some(ref db) = db {
            if let Err(e) = db.insert_report(report) {
                warn!("Failed to index {:?}: {}", report.path, e);
            }
        }

        match format {
            "json" | "jsonl" => {}
            _ => {
                let purposes: Vec<String> = report.purposes.iter()
                    .filter(|(_, score)| **score >= min_confidence)
                    .map(|(name, score)| format!("{} ({:.0}%)", name, score * 100.0))
                    .collect();
                println!(
                    "{}: {}",
                    report.path.display(),
                    if purposes.is_empty() { "no confident purpose".to_string() } else { purposes.join(", ") }
                );
            }
        }
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&reports)?),
        "jsonl" => {
            for report in &reports {
                println!("{}", serde_json::to_string(report)?);
            }
        }
        _ => println!("\nAnalyzed {} files", reports.len()),
    }

    Ok(())
}

/// Report similar pairs and version groups
fn run_similar(
    config: AppConfig,
    dir: PathBuf,
    threshold: Option<f64>,
    recursive: bool,
    format: &str,
) -> Result<()> {
    if !dir.is_dir() {
        return Err(CuratorError::Config(format!("{:?} is not a directory", dir)));
    }

    let threshold = threshold.unwrap_or(config.similarity.version_threshold);
    let engine = SimilarityEngine::new(config.similarity.clone(), config.scan.max_content_bytes);

    let recursive = recursive || config.scan.recursive;
    let files = collect_files(&dir, recursive);
    let pairs = engine.find_similar_files(&files, threshold);
    let groups = engine.group_versions(&files);

    match format {
        "json" => {
            let output = serde_json::json!({
                "pairs": pairs.iter().map(|(a, b, s)| serde_json::json!({
                    "a": a.to_string_lossy(),
                    "b": b.to_string_lossy(),
                    "similarity": s,
                })).collect::<Vec<_>>(),
                "groups": groups,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("Similar pairs (threshold {:.2}):", threshold);
            for (a, b, score) in &pairs {
                println!("  {:.2}  {} <-> {}", score, a.display(), b.display());
            }

            println!("\nVersion groups: {}", groups.len());
            for group in &groups {
                println!("  group {}:", &group.id[..8]);
                for (member, label) in label_versions(group, &config.categories.version_types) {
                    let report = engine.compare_files(&member, &group.members[0])?;
                    println!(
                        "    [{}] {} (suggested: {})",
                        label,
                        member.display(),
                        generate_version_name(&member, &report)
                    );
                }
            }
        }
    }

    Ok(())
}

/// Preview or apply a reorganization
fn run_organize(
    config: AppConfig,
    dir: PathBuf,
    dest: Option<PathBuf>,
    apply: bool,
    recursive: bool,
) -> Result<()> {
    if !dir.is_dir() {
        return Err(CuratorError::Config(format!("{:?} is not a directory", dir)));
    }

    let dest = dest.unwrap_or_else(|| dir.clone());
    let journal = Journal::new(PathBuf::from(JOURNAL_FILE));
    let reorganizer = Reorganizer::new(config.organize.clone(), journal);

    let recursive = recursive || config.scan.recursive;
    let plan = reorganizer.generate_hierarchy(&dir, recursive)?;

    if plan.is_empty() {
        println!("Nothing to organize in {:?}", dir);
        return Ok(());
    }

    print!("{}", reorganizer.preview(&plan));

    if apply {
        let summary = reorganizer.apply(&plan, &dest)?;
        println!(
            "\nMoved {} files into {:?} ({} failed)",
            summary.moved, dest, summary.failed
        );
        println!("Rollback with: curator rollback --dest {:?}", dest);
    } else {
        println!("\nPreview only ({} files). Re-run with --apply to move.", plan.file_count());
    }

    Ok(())
}

/// Roll back journaled moves
fn run_rollback(config: AppConfig, count: usize, dry_run: bool, dest: PathBuf) -> Result<()> {
    let journal = Journal::new(PathBuf::from(JOURNAL_FILE));
    let reorganizer = Reorganizer::new(config.organize.clone(), journal);

    let summary = reorganizer.rollback(&dest, count, dry_run)?;

    if dry_run {
        println!("Dry run: {} move(s) would be restored, {} skipped.",
            summary.restored, summary.skipped);
    } else {
        println!("Restored {} move(s), {} skipped.", summary.restored, summary.skipped);
    }

    Ok(())
}

/// Run journal commands
fn run_history_command(action: HistoryCommands) -> Result<()> {
    let journal = Journal::new(PathBuf::from(JOURNAL_FILE));

    match action {
        HistoryCommands::List { count } => {
            let entries = journal.get_recent(count)?;
            println!("Recent moves ({} entries):", entries.len());
            for entry in entries {
                let status = if entry.undone { "[UNDONE]" } else { "" };
                println!(
                    "  {} {} -> {} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.original_path.display(),
                    entry.new_path.display(),
                    status
                );
            }
        }
        HistoryCommands::Clear { force } => {
            if !force {
                eprintln!("Use --force to confirm clearing the journal");
                return Ok(());
            }
            journal.clear()?;
            println!("Journal cleared");
        }
    }

    Ok(())
}

/// Run database commands
fn run_db_command(config: AppConfig, action: DbCommands) -> Result<()> {
    let db = Database::open(&config.database.path)?;

    match action {
        DbCommands::Stats => {
            let stats = db.get_stats()?;
            println!("Database statistics:");
            println!("  Files: {}", stats.file_count);
            println!("  Categories: {}", stats.category_count);
        }
        DbCommands::Categories => {
            println!("Categories:");
            for (name, count) in db.get_category_stats()? {
                println!("  {} ({} files)", name, count);
            }
        }
        DbCommands::Search { query, limit } => {
            let results = db.search_files(&query, limit)?;
            println!("Search results for '{}':", query);
            for record in results {
                println!(
                    "  {} [{}] ({:.0}%)",
                    record.path,
                    record.category.as_deref().unwrap_or("-"),
                    record.confidence * 100.0
                );
            }
        }
        DbCommands::Export { output } => {
            let files = db.get_all_files()?;
            let json = serde_json::to_string_pretty(&files)?;
            std::fs::write(&output, json)?;
            println!("Exported {} files to {:?}", files.len(), output);
        }
        DbCommands::Vacuum => {
            db.vacuum()?;
            println!("Database vacuumed successfully");
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Purpose categories: {}", config.categories.purpose_categories.len());
            println!("  Hierarchy rules: {}", config.organize.hierarchy_rules.len());
            println!("  Database: {}", config.database.path);
        }
    }

    Ok(())
}

/// Initialize a new Curator project
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("curator.json");

    if config_path.exists() && !force {
        return Err(CuratorError::Config(
            "curator.json already exists. Use --force to overwrite".to_string(),
        ));
    }

    std::fs::create_dir_all(&target)?;

    let config = AppConfig::default();
    config.save(&config_path)?;
    info!("Wrote default configuration");

    println!("Curator initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - curator.json");
    println!("\nNext steps:");
    println!("  1. curator analyze <dir>");
    println!("  2. curator organize <dir> --apply");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_analyze_command() {
        let cli = Cli::try_parse_from([
            "curator", "analyze", "/tmp/docs", "--recursive", "-o", "/tmp/out",
        ]).unwrap();

        match cli.command {
            Commands::Analyze { path, output, recursive, .. } => {
                assert_eq!(path, PathBuf::from("/tmp/docs"));
                assert_eq!(output, Some(PathBuf::from("/tmp/out")));
                assert!(recursive);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_similar_command() {
        let cli = Cli::try_parse_from([
            "curator", "similar", "/tmp/docs", "--threshold", "0.7",
        ]).unwrap();

        match cli.command {
            Commands::Similar { dir, threshold, .. } => {
                assert_eq!(dir, PathBuf::from("/tmp/docs"));
                assert_eq!(threshold, Some(0.7));
            }
            _ => panic!("Expected Similar command"),
        }
    }

    #[test]
    fn test_cli_organize_defaults_to_preview() {
        let cli = Cli::try_parse_from(["curator", "organize", "/tmp/docs"]).unwrap();

        match cli.command {
            Commands::Organize { apply, dest, .. } => {
                assert!(!apply);
                assert!(dest.is_none());
            }
            _ => panic!("Expected Organize command"),
        }
    }

    #[test]
    fn test_cli_rollback_command() {
        let cli = Cli::try_parse_from([
            "curator", "rollback", "-n", "3", "--dry-run",
        ]).unwrap();

        match cli.command {
            Commands::Rollback { count, dry_run, .. } => {
                assert_eq!(count, 3);
                assert!(dry_run);
            }
            _ => panic!("Expected Rollback command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_format() {
        assert!(Cli::try_parse_from([
            "curator", "--format", "xml", "db", "stats",
        ]).is_err());
    }
}
