//! Output formatting and styling module.
//!
//! All user-facing CLI text goes through [`OutputFormatter`]; diagnostics go
//! through `tracing` instead.

use crate::file_category::MediaType;
use crate::janitor::CleanupStats;
use crate::move_plan::MovePlan;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Per-category tallies for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTally {
    pub moved: usize,
    pub unchanged: usize,
    pub unorganized: usize,
    pub failed: usize,
}

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediatidy::output::OutputFormatter;
    /// OutputFormatter::success("Library organized");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for file operations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediatidy::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("done");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Lists plans grouped by media type, categories and files sorted.
    pub fn plan_listing(plans: &[MovePlan]) {
        let mut grouped: BTreeMap<MediaType, Vec<&MovePlan>> = BTreeMap::new();
        for plan in plans {
            grouped.entry(plan.media_type).or_default().push(plan);
        }

        for (media_type, mut group) in grouped {
            group.sort_by(|a, b| a.source.cmp(&b.source));
            Self::header(&format!("{} ({})", media_type.dir_name().to_uppercase(), group.len()));
            for plan in group {
                let name = file_name(&plan.source);
                if !plan.changed {
                    println!("  {} {}", "=".dimmed(), name.dimmed());
                    continue;
                }
                let marker = if plan.recognized { "→".green() } else { "→".yellow() };
                println!("  {} {} {}", name, marker, plan.destination.display());
                for sidecar in &plan.associated_moves {
                    println!(
                        "      + {} {} {}",
                        file_name(&sidecar.source),
                        "→".dimmed(),
                        sidecar.destination.display()
                    );
                }
            }
        }
    }

    /// Warns about destinations claimed by more than one source file.
    pub fn collision_report(collisions: &BTreeMap<PathBuf, BTreeSet<PathBuf>>) {
        if collisions.is_empty() {
            return;
        }
        Self::warning(&format!(
            "{} destination(s) claimed by more than one file; only the first will be moved:",
            collisions.len()
        ));
        for (destination, sources) in collisions {
            println!("  {}", destination.display().to_string().yellow());
            for source in sources {
                println!("    <- {}", source.display());
            }
        }
    }

    /// Prints a summary table with per-category counts.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediatidy::file_category::MediaType;
    /// use mediatidy::output::{CategoryTally, OutputFormatter};
    /// use std::collections::BTreeMap;
    ///
    /// let mut tallies = BTreeMap::new();
    /// tallies.insert(MediaType::Movies, CategoryTally { moved: 3, ..Default::default() });
    /// OutputFormatter::summary_table(&tallies);
    /// ```
    pub fn summary_table(tallies: &BTreeMap<MediaType, CategoryTally>) {
        Self::header("SUMMARY");

        let width = tallies
            .keys()
            .map(|t| t.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {:>6} | {:>9} | {:>11} | {:>6}",
            "Category".bold(),
            "Moved".bold(),
            "Unchanged".bold(),
            "Unorganized".bold(),
            "Failed".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 46));

        let mut total = CategoryTally::default();
        for (media_type, tally) in tallies {
            println!(
                "{:<width$} | {:>6} | {:>9} | {:>11} | {:>6}",
                media_type.dir_name(),
                tally.moved.to_string().green(),
                tally.unchanged,
                tally.unorganized.to_string().yellow(),
                Self::failed_count(tally.failed),
                width = width
            );
            total.moved += tally.moved;
            total.unchanged += tally.unchanged;
            total.unorganized += tally.unorganized;
            total.failed += tally.failed;
        }

        println!("{}", "-".repeat(width + 46));
        println!(
            "{:<width$} | {:>6} | {:>9} | {:>11} | {:>6}",
            "Total".bold(),
            total.moved.to_string().green().bold(),
            total.unchanged,
            total.unorganized.to_string().yellow(),
            Self::failed_count(total.failed),
            width = width
        );
    }

    fn failed_count(failed: usize) -> ColoredString {
        if failed == 0 {
            failed.to_string().normal()
        } else {
            failed.to_string().red().bold()
        }
    }

    /// Prints the scan total followed by one line per media type.
    pub fn scan_breakdown(total: usize, counts: &BTreeMap<MediaType, usize>) {
        Self::header(&format!("Found {} media files", total));
        for (media_type, count) in counts {
            println!("  {}: {}", media_type, count);
        }
    }

    /// Prints the counters from a cleanup pass.
    pub fn cleanup_stats(stats: &CleanupStats) {
        Self::header("CLEANUP");
        println!("  Empty directories removed: {}", stats.empty_dirs_removed);
        println!("  Junk files quarantined:    {}", stats.files_quarantined);
        println!("  Junk folders quarantined:  {}", stats.dirs_quarantined);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
