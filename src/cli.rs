//! Command-line interface module for mediatidy.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing
//! - Scanning with a per-type breakdown
//! - Organization orchestration (scan, plan, execute, clean up)
//! - Saving and applying plans
//! - Undo operation handling

use crate::config::OrganizerConfig;
use crate::file_category::MediaType;
use crate::file_organizer::{MoveExecutor, OperationLog, resolve_path};
use crate::janitor::{CleanupStats, DirectoryJanitor};
use crate::move_plan::{MovePlan, MovePlanner};
use crate::output::{CategoryTally, OutputFormatter};
use crate::plan_manager::{OrganizationPlan, PlanKind, PlanManager};
use crate::scanner::MediaScanner;
use crate::undo::UndoManager;
use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

/// Rename and relocate media files into a canonical library layout.
#[derive(Debug, Parser)]
#[command(name = "mediatidy", version, about)]
pub struct Cli {
    /// Configuration file (defaults to ./.mediatidy.toml, then ~/.config/mediatidy/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "mediatidy=trace" (overrides the config file)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the media files found in a directory, by type
    Scan {
        /// Directory to scan
        directory: PathBuf,
    },
    /// Scan a directory and organize its media files
    Organize {
        /// Directory to scan
        directory: PathBuf,
        /// Library root (defaults to organization.output_directory)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Show what would happen without touching any file
        #[arg(long)]
        dry_run: bool,
        /// Write the plan to a JSON file (a timestamped name in the current
        /// directory when FILE is omitted)
        #[arg(long, value_name = "FILE", num_args = 0..=1)]
        save_plan: Option<Option<PathBuf>>,
    },
    /// Execute a previously saved organization plan
    ApplyPlan {
        /// Plan file written by `organize --save-plan`
        plan: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Quarantine junk files and remove empty directories in a library
    Cleanup {
        output_dir: PathBuf,
    },
    /// Revert the most recent organize run into a library
    Undo {
        output_dir: PathBuf,
    },
    /// Show the effective configuration
    Info,
}

/// Runs the CLI application with the given command.
///
/// # Examples
///
/// ```no_run
/// use mediatidy::cli::{Command, run_cli};
/// use mediatidy::config::OrganizerConfig;
/// use std::path::PathBuf;
///
/// let command = Command::Organize {
///     directory: PathBuf::from("/downloads"),
///     output_dir: Some(PathBuf::from("/library")),
///     dry_run: true,
///     save_plan: None,
/// };
/// if let Err(e) = run_cli(command, &OrganizerConfig::default()) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: Command, config: &OrganizerConfig) -> Result<(), String> {
    match command {
        Command::Scan { directory } => scan_directory(&directory, config),
        Command::Organize {
            directory,
            output_dir,
            dry_run,
            save_plan,
        } => {
            let output_dir =
                output_dir.unwrap_or_else(|| config.organization.output_directory.clone());
            let save_plan = save_plan.map(|file| {
                file.unwrap_or_else(|| {
                    PlanManager::default_plan_path(PlanKind::Organization, Path::new("."))
                })
            });
            organize_directory(&directory, &output_dir, dry_run, save_plan.as_deref(), config)
        }
        Command::ApplyPlan { plan, dry_run } => apply_plan(&plan, dry_run, config),
        Command::Cleanup { output_dir } => cleanup_library(&output_dir, config),
        Command::Undo { output_dir } => undo_organization(&output_dir),
        Command::Info => show_info(config),
    }
}

/// Lists the media files under `directory` with a count per media type.
pub fn scan_directory(directory: &Path, config: &OrganizerConfig) -> Result<(), String> {
    OutputFormatter::info(&format!("Scanning: {}", directory.display()));
    let scanner =
        MediaScanner::new(config).map_err(|e| format!("Error compiling filters: {}", e))?;
    let files = scanner.scan(directory).map_err(|e| e.to_string())?;
    OutputFormatter::scan_breakdown(files.len(), &scanner.breakdown(&files));
    Ok(())
}

/// Paths as the rest of the run compares them: the scan root, the library
/// and every override root resolved to one absolute spelling.
fn resolved_layout(
    source: &Path,
    output_dir: &Path,
    config: &OrganizerConfig,
) -> Result<(PathBuf, PathBuf, OrganizerConfig), String> {
    let resolve = |path: &Path| {
        resolve_path(path).map_err(|e| format!("Cannot resolve {}: {}", path.display(), e))
    };
    let mut config = config.clone();
    for root in config.organization.output_directories.values_mut() {
        *root = resolve(root.as_path())?;
    }
    Ok((resolve(source)?, resolve(output_dir)?, config))
}

/// Organizes media files found under `source` into `output_dir`.
///
/// This function:
/// 1. Scans `source` for media files, skipping the library itself
/// 2. Plans every file and lists the plans by media type
/// 3. Reports destinations claimed by more than one file
/// 4. Optionally saves the plan
/// 5. Executes the plans (unless dry-run), records history and cleans up
pub fn organize_directory(
    source: &Path,
    output_dir: &Path,
    dry_run: bool,
    save_plan: Option<&Path>,
    config: &OrganizerConfig,
) -> Result<(), String> {
    let (source, output_dir, config) = resolved_layout(source, output_dir, config)?;
    let (source, output_dir) = (source.as_path(), output_dir.as_path());
    let config = &config;

    if dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", source.display()));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", source.display()));
    }

    let mut scanner = MediaScanner::new(config)
        .map_err(|e| format!("Error compiling filters: {}", e))?
        .skip_dir(output_dir);
    for root in config.organization.output_directories.values() {
        scanner = scanner.skip_dir(root);
    }
    let files = scanner.scan(source).map_err(|e| e.to_string())?;

    if files.is_empty() {
        OutputFormatter::plain("No media files found to organize.");
        return Ok(());
    }

    let plans = MovePlanner::new(config).plan_all(&files, output_dir);
    OutputFormatter::plan_listing(&plans);
    OutputFormatter::collision_report(&MovePlanner::find_collisions(&plans));

    if let Some(plan_path) = save_plan {
        let plan = OrganizationPlan::new(source, output_dir, &plans);
        PlanManager::save_organization_plan(&plan, plan_path).map_err(|e| e.to_string())?;
        OutputFormatter::success(&format!("Plan saved to {}", plan_path.display()));
    }

    execute_plans(&plans, source, output_dir, dry_run, config)
}

/// Loads a saved organization plan and executes it.
fn apply_plan(plan_path: &Path, dry_run: bool, config: &OrganizerConfig) -> Result<(), String> {
    let plan = PlanManager::load_organization_plan(plan_path).map_err(|e| e.to_string())?;
    OutputFormatter::info(&format!(
        "Applying plan created {} ({} files)",
        plan.timestamp,
        plan.plans.len()
    ));

    let plans = plan.move_plans();
    OutputFormatter::plan_listing(&plans);
    OutputFormatter::collision_report(&MovePlanner::find_collisions(&plans));

    let (source, output_dir, config) = resolved_layout(
        Path::new(&plan.source_directory),
        Path::new(&plan.output_directory),
        config,
    )?;
    execute_plans(&plans, &source, &output_dir, dry_run, &config)
}

fn execute_plans(
    plans: &[MovePlan],
    source: &Path,
    output_dir: &Path,
    dry_run: bool,
    config: &OrganizerConfig,
) -> Result<(), String> {
    let executor = MoveExecutor;
    let mut tallies: BTreeMap<MediaType, CategoryTally> = BTreeMap::new();
    let mut history = OperationLog::new(output_dir.to_path_buf());
    let mut vacated_dirs = BTreeSet::new();
    let mut failures = Vec::new();

    let pb = OutputFormatter::create_progress_bar(plans.len() as u64);
    for plan in plans {
        pb.set_message(
            plan.source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let report = executor.execute(plan, dry_run);
        let tally = tallies.entry(plan.media_type).or_default();
        match (report.success, plan.changed, plan.recognized) {
            (false, _, _) => tally.failed += 1,
            (true, false, _) => tally.unchanged += 1,
            (true, true, true) => tally.moved += 1,
            (true, true, false) => tally.unorganized += 1,
        }
        history.extend(report.operations);
        vacated_dirs.extend(report.vacated_dirs);
        failures.extend(report.errors);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let failed: usize = tallies.values().map(|t| t.failed).sum();

    if dry_run {
        OutputFormatter::summary_table(&tallies);
        OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
        return Ok(());
    }

    if !history.operations.is_empty() {
        match history.save(output_dir) {
            Ok(()) => OutputFormatter::success(&format!(
                "History saved. Use 'mediatidy undo {}' to revert changes.",
                output_dir.display()
            )),
            Err(e) => OutputFormatter::warning(&format!("Could not save history: {}", e)),
        }
    }

    let override_roots: Vec<PathBuf> = config
        .organization
        .output_directories
        .values()
        .cloned()
        .collect();
    let mut exclude = vec![source.to_path_buf(), output_dir.to_path_buf()];
    exclude.extend(override_roots.iter().cloned());

    let janitor = DirectoryJanitor;
    let mut stats = janitor.cleanup_empty_directories(vacated_dirs, true, &exclude);
    stats.absorb(cleanup_roots(&janitor, output_dir, &override_roots));
    info!(?stats, "cleanup finished");

    OutputFormatter::cleanup_stats(&stats);
    OutputFormatter::summary_table(&tallies);

    if failed > 0 {
        OutputFormatter::warning(&format!("{} file(s) could not be organized:", failed));
        for failure in &failures {
            OutputFormatter::error(&format!("    - {}", failure));
        }
    } else {
        OutputFormatter::success("Organization complete!");
    }
    Ok(())
}

fn cleanup_roots(janitor: &DirectoryJanitor, output_dir: &Path, override_roots: &[PathBuf]) -> CleanupStats {
    let mut stats = janitor.cleanup_output_directory(output_dir);
    for root in override_roots.iter().filter(|root| root.is_dir()) {
        stats.absorb(janitor.cleanup_category(root));
    }
    stats
}

fn cleanup_library(output_dir: &Path, config: &OrganizerConfig) -> Result<(), String> {
    if !output_dir.is_dir() {
        return Err(format!("Not a directory: {}", output_dir.display()));
    }
    OutputFormatter::info(&format!("Cleaning up: {}", output_dir.display()));

    let override_roots: Vec<PathBuf> = config
        .organization
        .output_directories
        .values()
        .cloned()
        .collect();
    let stats = cleanup_roots(&DirectoryJanitor, output_dir, &override_roots);
    OutputFormatter::cleanup_stats(&stats);
    Ok(())
}

/// Undoes the previous organize run into `output_dir`.
///
/// This function:
/// 1. Loads the operation history from disk
/// 2. Reverses all recorded file movements
/// 3. Reports on any skipped or failed restorations
/// 4. Deletes the history file if undo was successful
fn undo_organization(output_dir: &Path) -> Result<(), String> {
    OutputFormatter::info("Undoing previous organization...");

    let report = UndoManager::undo(output_dir).map_err(|e| format!("Error: {}", e))?;
    OutputFormatter::success("Undo complete!");
    OutputFormatter::plain(&format!("  Restored: {}", report.restored_files));

    if !report.skipped_files.is_empty() {
        OutputFormatter::warning(&format!("Skipped: {}", report.skipped_files.len()));
        for (path, reason) in &report.skipped_files {
            OutputFormatter::plain(&format!("    - {}: {}", path.display(), reason));
        }
    }

    if !report.failed_restores.is_empty() {
        OutputFormatter::error(&format!("Failed: {}", report.failed_restores.len()));
        for (path, reason) in &report.failed_restores {
            OutputFormatter::error(&format!("    - {}: {}", path.display(), reason));
        }
    }

    if !report.is_complete_success() {
        OutputFormatter::warning("History file was NOT deleted. Fix the issues and try again.");
    }

    Ok(())
}

fn show_info(config: &OrganizerConfig) -> Result<(), String> {
    OutputFormatter::header(&format!("mediatidy {}", env!("CARGO_PKG_VERSION")));
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| format!("Error rendering configuration: {}", e))?;
    OutputFormatter::plain(&rendered);
    Ok(())
}
