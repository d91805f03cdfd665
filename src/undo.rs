/// Undo functionality for reverting an organize run.
///
/// This module moves files back to their original locations based on the
/// operation history recorded in the output directory.
use crate::file_organizer::{Operation, OperationLog, OrganizeError, OrganizeResult, move_file};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Files that failed to restore, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files no longer at their recorded location.
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// Returns the total number of operations processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if the undo was completely successful.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

enum RestoreError {
    Missing(PathBuf),
    Failed(PathBuf, String),
}

/// Manages undo operations for file organization.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the most recent organize run recorded in `output_dir`.
    ///
    /// Operations are replayed newest first. Original parent directories are
    /// recreated as needed, and a file now occupying an original location is
    /// renamed to `<name>.bak.<timestamp>` before the restore.
    ///
    /// The history file is deleted only if every file was restored.
    ///
    /// # Errors
    ///
    /// Returns an error if `output_dir` does not exist, or if the history file
    /// is missing or corrupted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediatidy::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/library")) {
    ///     Ok(report) => println!("Restored {} files", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(output_dir: &Path) -> OrganizeResult<UndoReport> {
        if !output_dir.exists() {
            return Err(OrganizeError::InvalidBasePath {
                path: output_dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path does not exist",
                ),
            });
        }

        let log = OperationLog::load(output_dir)?.ok_or_else(|| {
            OrganizeError::InvalidHistoryFormat {
                reason: "No previous organization found to undo".to_string(),
            }
        })?;

        let mut report = UndoReport::default();
        for operation in log.operations.iter().rev() {
            match Self::restore_file(operation) {
                Ok(()) => {
                    info!(
                        "Restored: {} -> {}",
                        operation.new_path.display(),
                        operation.original_path.display()
                    );
                    report.restored_files += 1;
                }
                Err(RestoreError::Missing(path)) => {
                    warn!(path = %path.display(), "file not found, skipping");
                    report
                        .skipped_files
                        .push((path, "File not found at expected location".to_string()));
                }
                Err(RestoreError::Failed(path, reason)) => {
                    warn!(path = %path.display(), "{}", reason);
                    report.failed_restores.push((path, reason));
                }
            }
        }

        if report.is_complete_success()
            && let Err(e) = OperationLog::delete(output_dir)
        {
            warn!("Could not delete history file: {}", e);
        }

        Ok(report)
    }

    fn restore_file(operation: &Operation) -> Result<(), RestoreError> {
        if !operation.new_path.exists() {
            return Err(RestoreError::Missing(operation.new_path.clone()));
        }

        if operation.original_path.exists() {
            let backup_path = Self::generate_backup_path(&operation.original_path);
            fs::rename(&operation.original_path, &backup_path).map_err(|e| {
                RestoreError::Failed(
                    operation.original_path.clone(),
                    format!("Could not backup conflicting file: {}", e),
                )
            })?;
            info!("Backed up conflicting file to {}", backup_path.display());
        }

        move_file(&operation.new_path, &operation.original_path).map_err(|e| {
            RestoreError::Failed(
                operation.new_path.clone(),
                format!("Failed to restore file: {}", e),
            )
        })
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `movie.mkv` becomes `movie.mkv.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        original_path.with_file_name(format!("{}.bak.{}", filename, timestamp))
    }
}
