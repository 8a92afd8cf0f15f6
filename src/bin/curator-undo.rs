// SPDX-License-Identifier: MIT

//! Curator Undo Utility
//!
//! Reverses file moves recorded in the move journal, without needing
//! the main binary's configuration.

use clap::Parser;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "curator-undo")]
#[command(version)]
#[command(about = "Undo Curator file moves")]
struct Args {
    /// Path to journal file
    #[arg(short, long, default_value = "curator_journal.jsonl")]
    journal_file: PathBuf,

    /// Number of moves to undo (default: 1, use 0 for all)
    #[arg(short, long, default_value = "1")]
    count: usize,

    /// Dry run - show what would be undone without doing it
    #[arg(long)]
    dry_run: bool,

    /// List all entries in the journal
    #[arg(long)]
    list: bool,
}

#[derive(Deserialize, Debug)]
struct MoveEntry {
    timestamp: String,
    original_path: String,
    new_path: String,
    category: String,
    #[serde(default)]
    undone: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if !args.journal_file.exists() {
        eprintln!("Journal file not found: {:?}", args.journal_file);
        eprintln!("No moves to undo.");
        return Ok(());
    }

    let file = File::open(&args.journal_file)?;
    let reader = BufReader::new(file);

    let mut entries: Vec<MoveEntry> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => eprintln!("Warning: Failed to parse journal entry: {}", e),
        }
    }

    if entries.is_empty() {
        println!("No journal entries found.");
        return Ok(());
    }

    if args.list {
        println!("Move journal ({} entries):", entries.len());
        println!("{:-<80}", "");
        for (i, entry) in entries.iter().rev().enumerate() {
            let status = if entry.undone { " [undone]" } else { "" };
            println!(
                "{:3}. [{}] {} -> {}{}",
                i + 1,
                &entry.timestamp[..19.min(entry.timestamp.len())],
                entry.original_path,
                entry.new_path,
                status
            );
            println!("     Category: {}", entry.category);
        }
        return Ok(());
    }

    // Reverse entries to undo most recent first
    entries.retain(|e| !e.undone);
    entries.reverse();

    let count = if args.count == 0 {
        entries.len()
    } else {
        args.count.min(entries.len())
    };

    println!(
        "{}Undoing {} move(s)...",
        if args.dry_run { "[DRY RUN] " } else { "" },
        count
    );

    let mut undone = 0;
    let mut failed = 0;

    for entry in entries.iter().take(count) {
        let new_path = PathBuf::from(&entry.new_path);
        let original_path = PathBuf::from(&entry.original_path);

        if !new_path.exists() {
            eprintln!(
                "  Skip: {} (file not found, may have been moved/deleted)",
                entry.new_path
            );
            failed += 1;
            continue;
        }

        if original_path.exists() {
            eprintln!(
                "  Skip: {} (original path already exists)",
                entry.original_path
            );
            failed += 1;
            continue;
        }

        if args.dry_run {
            println!("  Would restore: {} -> {}", entry.new_path, entry.original_path);
        } else {
            if let Some(parent) = original_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match fs::rename(&new_path, &original_path) {
                Ok(()) => {
                    println!("  Undone: {} -> {}", entry.new_path, entry.original_path);
                    undone += 1;
                }
                Err(e) => {
                    eprintln!("  Failed: {} ({})", entry.new_path, e);
                    failed += 1;
                }
            }
        }
    }

    println!();
    if args.dry_run {
        println!("Dry run complete. {} move(s) would be undone.", count - failed);
    } else {
        println!("Done. {} undone, {} failed/skipped.", undone, failed);
        if undone > 0 {
            println!("Note: Journal file not modified. Run again to undo more.");
        }
    }

    Ok(())
}
