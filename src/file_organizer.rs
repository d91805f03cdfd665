/// Move execution for planned file relocations.
///
/// This module performs the filesystem side of a [`MovePlan`]: it creates
/// target directories, moves the main file and its sidecars (falling back to
/// copy and delete across filesystems), records provenance for unrecognized
/// files and keeps an operation history for undo.
use crate::file_category::MediaType;
use crate::move_plan::MovePlan;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// File written inside unorganized target directories recording where each
/// file came from.
pub const PROVENANCE_FILE: &str = "original_structure.txt";

/// Name of the undo history file kept in the output directory.
pub const HISTORY_FILE: &str = ".mediatidy_history.json";

/// Represents a single executed file move.
///
/// Records the original and new paths of a file so that the run can be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The original path of the file before organization.
    pub original_path: PathBuf,
    /// The new path of the file after organization.
    pub new_path: PathBuf,
    /// The category of the plan the move belonged to.
    pub media_type: MediaType,
}

/// Represents every move performed in one organize run.
///
/// This is persisted to disk to enable undo functionality.
#[derive(Debug, Clone)]
pub struct OperationLog {
    /// RFC 3339 timestamp of when the organization occurred.
    pub timestamp: String,
    /// The output directory the run organized into.
    pub base_path: PathBuf,
    /// All operations performed in this organization run.
    pub operations: Vec<Operation>,
}

impl OperationLog {
    /// Creates a new operation log for a given base path.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_path,
            operations: Vec::new(),
        }
    }

    /// Adds operations to this log.
    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) {
        self.operations.extend(operations);
    }

    fn history_file_path(base_path: &Path) -> PathBuf {
        base_path.join(HISTORY_FILE)
    }

    /// Saves this log to disk in JSON format.
    pub fn save(&self, base_path: &Path) -> OrganizeResult<()> {
        let json = json!({
            "timestamp": self.timestamp,
            "base_path": self.base_path.to_string_lossy().to_string(),
            "operations": self.operations.iter().map(|op| {
                json!({
                    "original_path": op.original_path.to_string_lossy().to_string(),
                    "new_path": op.new_path.to_string_lossy().to_string(),
                    "media_type": op.media_type.dir_name(),
                })
            }).collect::<Vec<_>>(),
        });

        fs::create_dir_all(base_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: base_path.to_path_buf(),
            source: e,
        })?;

        let json_string =
            serde_json::to_string_pretty(&json).map_err(|e| OrganizeError::HistoryWriteFailed {
                source: io::Error::new(
                    ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            })?;

        fs::write(Self::history_file_path(base_path), json_string)
            .map_err(|e| OrganizeError::HistoryWriteFailed { source: e })
    }

    /// Loads the most recent operation log from disk.
    pub fn load(base_path: &Path) -> OrganizeResult<Option<Self>> {
        let history_path = Self::history_file_path(base_path);

        if !history_path.exists() {
            return Ok(None);
        }

        let json_string = fs::read_to_string(&history_path)
            .map_err(|e| OrganizeError::HistoryReadFailed { source: e })?;

        let json: Value = serde_json::from_str(&json_string).map_err(|e| {
            OrganizeError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            }
        })?;

        let field = |value: &Value, name: &str| -> OrganizeResult<String> {
            value[name]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| OrganizeError::InvalidHistoryFormat {
                    reason: format!("Missing or invalid '{}' field", name),
                })
        };

        let ops_array =
            json["operations"]
                .as_array()
                .ok_or_else(|| OrganizeError::InvalidHistoryFormat {
                    reason: "Missing or invalid 'operations' field".to_string(),
                })?;

        let operations = ops_array
            .iter()
            .map(|op| {
                let media_type = field(op, "media_type")?.parse().map_err(|reason| {
                    OrganizeError::InvalidHistoryFormat { reason }
                })?;
                Ok(Operation {
                    original_path: PathBuf::from(field(op, "original_path")?),
                    new_path: PathBuf::from(field(op, "new_path")?),
                    media_type,
                })
            })
            .collect::<OrganizeResult<Vec<_>>>()?;

        Ok(Some(OperationLog {
            timestamp: field(&json, "timestamp")?,
            base_path: PathBuf::from(field(&json, "base_path")?),
            operations,
        }))
    }

    /// Deletes the history file for a given base path.
    pub fn delete(base_path: &Path) -> OrganizeResult<()> {
        let history_path = Self::history_file_path(base_path);
        if history_path.exists() {
            fs::remove_file(&history_path)
                .map_err(|e| OrganizeError::HistoryWriteFailed { source: e })?;
        }
        Ok(())
    }
}

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a target directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file to its destination.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// The destination is already occupied by another file.
    DestinationExists { source: PathBuf, destination: PathBuf },
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath { path: PathBuf, source: io::Error },
    /// Failed to write history file.
    HistoryWriteFailed { source: io::Error },
    /// Failed to read history file.
    HistoryReadFailed { source: io::Error },
    /// History file has invalid format.
    InvalidHistoryFormat { reason: String },
    /// Failed to write a plan file.
    PlanWriteFailed { path: PathBuf, source: io::Error },
    /// Failed to read a plan file.
    PlanReadFailed { path: PathBuf, source: io::Error },
    /// Plan file has invalid format or type.
    InvalidPlanFormat { reason: String },
    /// Failed to append to a provenance record.
    ProvenanceWriteFailed { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DestinationExists {
                source,
                destination,
            } => {
                write!(
                    f,
                    "Refusing to move {}: {} already exists",
                    source.display(),
                    destination.display()
                )
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::HistoryWriteFailed { source } => {
                write!(f, "Failed to write history file: {}", source)
            }
            Self::HistoryReadFailed { source } => {
                write!(f, "Failed to read history file: {}", source)
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid history file format: {}", reason)
            }
            Self::PlanWriteFailed { path, source } => {
                write!(f, "Failed to write plan {}: {}", path.display(), source)
            }
            Self::PlanReadFailed { path, source } => {
                write!(f, "Failed to read plan {}: {}", path.display(), source)
            }
            Self::InvalidPlanFormat { reason } => {
                write!(f, "Invalid plan file: {}", reason)
            }
            Self::ProvenanceWriteFailed { path, source } => {
                write!(f, "Failed to record provenance in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Absolute, symlink-free form of `path`, so that differently spelled paths
/// (`organized_media`, `./organized_media`) compare equal.
///
/// Trailing components that do not exist yet are appended to the canonical
/// form of the deepest existing ancestor. Nothing is created.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(canonical) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(canonical, |resolved, name| resolved.join(name)));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(e);
                };
                missing.push(name);
                existing = parent;
            }
            Err(e) => return Err(e),
        }
    }
}

/// True when both paths name the same location, however they are spelled.
pub fn same_path(a: &Path, b: &Path) -> bool {
    a == b
        || matches!(
            (resolve_path(a), resolve_path(b)),
            (Ok(a), Ok(b)) if a == b
        )
}

/// Moves one file, never overwriting an existing destination.
///
/// Tries a rename first. When source and destination are on different
/// filesystems the file is copied, its timestamps are carried over, and the
/// original is removed.
pub fn move_file(source: &Path, destination: &Path) -> OrganizeResult<()> {
    if same_path(source, destination) {
        return Ok(());
    }
    if destination.exists() {
        return Err(OrganizeError::DestinationExists {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let failure = |e: io::Error| OrganizeError::FileMoveFailure {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source_error: e,
    };

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            warn!(
                source = %source.display(),
                destination = %destination.display(),
                "rename crosses filesystems, copying instead"
            );
            copy_then_remove(source, destination).map_err(failure)
        }
        Err(e) => Err(failure(e)),
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    copy_then_remove_with(source, destination, |path, metadata| {
        filetime::set_file_times(
            path,
            filetime::FileTime::from_last_access_time(metadata),
            filetime::FileTime::from_last_modification_time(metadata),
        )
    })
}

/// Copies, stamps the copy with `preserve_times`, then removes the source.
/// Timestamps are best effort: a stamping failure is logged and the move
/// still completes.
fn copy_then_remove_with(
    source: &Path,
    destination: &Path,
    preserve_times: impl FnOnce(&Path, &fs::Metadata) -> io::Result<()>,
) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    if let Err(e) = fs::copy(source, destination) {
        // Leave no half-written copy behind; the original is untouched.
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    if let Err(e) = preserve_times(destination, &metadata) {
        warn!(
            destination = %destination.display(),
            error = %e,
            "could not carry over timestamps"
        );
    }
    if let Err(e) = fs::remove_file(source) {
        // Keep exactly one copy so a retry is not blocked by the destination.
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}

/// Outcome of executing one plan.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// False if any single move in the plan failed.
    pub success: bool,
    /// Moves that completed, in order. Not rolled back on failure.
    pub operations: Vec<Operation>,
    /// Directories files were moved out of, for post-run cleanup.
    pub vacated_dirs: BTreeSet<PathBuf>,
    /// Every error that made the plan fail, move errors first.
    pub errors: Vec<String>,
}

/// Performs the filesystem mutation described by a [`MovePlan`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveExecutor;

impl MoveExecutor {
    /// Executes a plan.
    ///
    /// In dry-run mode the intended moves are logged and nothing is touched.
    /// Otherwise the main file moves first, then each sidecar. The first
    /// failure stops the plan; files already moved stay where they are.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediatidy::config::OrganizerConfig;
    /// use mediatidy::file_organizer::MoveExecutor;
    /// use mediatidy::move_plan::MovePlanner;
    /// use std::path::Path;
    ///
    /// let planner = MovePlanner::new(&OrganizerConfig::default());
    /// let plan = planner.plan(Path::new("/downloads/Heat.1995.mkv"), Path::new("/library"));
    /// let report = MoveExecutor.execute(&plan, false);
    /// if !report.success {
    ///     eprintln!("{} was not fully moved", plan.source.display());
    /// }
    /// ```
    pub fn execute(&self, plan: &MovePlan, dry_run: bool) -> ExecutionReport {
        if dry_run {
            for (from, to) in plan.moves().filter(|(from, to)| from != to) {
                info!("[DRY RUN] Would move: {} -> {}", from.display(), to.display());
            }
            return ExecutionReport {
                success: true,
                ..Default::default()
            };
        }

        let mut report = ExecutionReport::default();
        if let Err(e) = self.move_all(plan, &mut report) {
            error!(source = %plan.source.display(), "plan failed: {}", e);
            report.errors.push(e.to_string());
        }

        // Files that did move are still recorded after a partial failure.
        if !plan.recognized
            && !report.operations.is_empty()
            && let Err(e) = record_provenance(&plan.target_dir, &report.operations)
        {
            error!("{}", e);
            report.errors.push(e.to_string());
        }

        report.success = report.errors.is_empty();
        report
    }

    fn move_all(&self, plan: &MovePlan, report: &mut ExecutionReport) -> OrganizeResult<()> {
        for (from, to) in plan.moves() {
            if from == to {
                continue;
            }
            move_file(from, to)?;
            info!("Moved: {} -> {}", from.display(), to.display());
            if let Some(parent) = from.parent() {
                report.vacated_dirs.insert(parent.to_path_buf());
            }
            report.operations.push(Operation {
                original_path: from.to_path_buf(),
                new_path: to.to_path_buf(),
                media_type: plan.media_type,
            });
        }
        Ok(())
    }
}

/// Appends the executed moves to the provenance file in `target_dir`,
/// grouped by the directory each file came from.
pub fn record_provenance(target_dir: &Path, operations: &[Operation]) -> OrganizeResult<()> {
    let path = target_dir.join(PROVENANCE_FILE);
    let mut by_source_dir: BTreeMap<PathBuf, Vec<&Operation>> = BTreeMap::new();
    for op in operations {
        let dir = op
            .original_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        by_source_dir.entry(dir).or_default().push(op);
    }

    let mut text = format!("# {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    for (dir, ops) in &by_source_dir {
        text.push_str(&format!("[{}]\n", dir.display()));
        for op in ops {
            let name = |p: &Path| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            };
            text.push_str(&format!(
                "  {} -> {}\n",
                name(&op.original_path),
                name(&op.new_path)
            ));
        }
    }
    text.push('\n');

    let write_err = |e| OrganizeError::ProvenanceWriteFailed {
        path: path.clone(),
        source: e,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_plan::AssociatedMove;
    use tempfile::TempDir;

    fn plan_for(source: PathBuf, target_dir: PathBuf, name: &str, recognized: bool) -> MovePlan {
        MovePlan {
            destination: target_dir.join(name),
            changed: true,
            associated_moves: Vec::new(),
            media_type: MediaType::Movies,
            recognized,
            source,
            target_dir,
        }
    }

    #[test]
    fn test_resolve_path_unifies_spellings() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let library = temp_dir.path().join("organized_media");
        fs::create_dir(&library).unwrap();
        let dotted = temp_dir.path().join(".").join("sub").join("..").join("organized_media");
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        assert_eq!(
            resolve_path(&dotted).unwrap(),
            resolve_path(&library).unwrap()
        );
    }

    #[test]
    fn test_resolve_path_keeps_missing_tail() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("out").join("movies");

        let resolved = resolve_path(&missing).unwrap();

        assert_eq!(
            resolved,
            fs::canonicalize(temp_dir.path()).unwrap().join("out").join("movies")
        );
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_move_file_creates_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.mkv");
        fs::write(&source, "data").unwrap();
        let destination = temp_dir.path().join("x").join("y").join("b.mkv");

        move_file(&source, &destination).expect("move failed");

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "data");
    }

    #[test]
    fn test_move_file_refuses_to_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.mkv");
        let destination = temp_dir.path().join("b.mkv");
        fs::write(&source, "new").unwrap();
        fs::write(&destination, "old").unwrap();

        let result = move_file(&source, &destination);

        assert!(matches!(result, Err(OrganizeError::DestinationExists { .. })));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "old");
        assert!(source.exists());
    }

    #[test]
    fn test_copy_then_remove_keeps_mtime() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.mkv");
        fs::write(&source, "data").unwrap();
        let mtime = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();
        let destination = temp_dir.path().join("b.mkv");

        copy_then_remove(&source, &destination).expect("copy failed");

        assert!(!source.exists());
        let meta = fs::metadata(&destination).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn test_copy_completes_when_timestamps_fail() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.mkv");
        fs::write(&source, "data").unwrap();
        let destination = temp_dir.path().join("b.mkv");

        copy_then_remove_with(&source, &destination, |_, _| {
            Err(io::Error::new(ErrorKind::PermissionDenied, "utime refused"))
        })
        .expect("copy failed");

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "data");
        // Nothing left behind to block a later move of the same file.
        assert!(move_file(&destination, &source).is_ok());
    }

    #[test]
    fn test_move_and_provenance_failures_both_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("random-video-file.mp4");
        fs::write(&source, "x").unwrap();
        let target = temp_dir.path().join("out").join("movies").join("unorganized");
        // A directory where the record file should go makes the append fail.
        fs::create_dir_all(target.join(PROVENANCE_FILE)).unwrap();

        let mut plan = plan_for(source.clone(), target.clone(), "random-video-file.mp4", false);
        plan.associated_moves.push(AssociatedMove {
            source: temp_dir.path().join("missing.srt"),
            destination: target.join("missing.srt"),
        });

        let report = MoveExecutor.execute(&plan, false);

        assert!(!report.success);
        assert_eq!(report.operations.len(), 1);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("missing.srt"));
        assert!(report.errors[1].contains("provenance"));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("Heat.1995.mkv");
        fs::write(&source, "x").unwrap();
        let target = temp_dir.path().join("out").join("movies");
        let plan = plan_for(source.clone(), target.clone(), "Heat.1995.mkv", true);

        let report = MoveExecutor.execute(&plan, true);

        assert!(report.success);
        assert!(report.operations.is_empty());
        assert!(source.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_execute_moves_main_and_sidecars() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src_dir = temp_dir.path().join("in");
        fs::create_dir(&src_dir).unwrap();
        let source = src_dir.join("heat 1995.mkv");
        let subtitle = src_dir.join("heat 1995.srt");
        fs::write(&source, "x").unwrap();
        fs::write(&subtitle, "1").unwrap();
        let target = temp_dir.path().join("out").join("movies");

        let mut plan = plan_for(source.clone(), target.clone(), "heat.1995.mkv", true);
        plan.associated_moves.push(AssociatedMove {
            source: subtitle.clone(),
            destination: target.join("heat 1995.srt"),
        });

        let report = MoveExecutor.execute(&plan, false);

        assert!(report.success);
        assert_eq!(report.operations.len(), 2);
        assert_eq!(report.vacated_dirs, BTreeSet::from([src_dir]));
        assert!(target.join("heat.1995.mkv").exists());
        assert!(target.join("heat 1995.srt").exists());
        assert!(!target.join(PROVENANCE_FILE).exists());
    }

    #[test]
    fn test_partial_failure_is_not_rolled_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("clip.mkv");
        fs::write(&source, "x").unwrap();
        let target = temp_dir.path().join("out");

        let mut plan = plan_for(source.clone(), target.clone(), "clip.mkv", true);
        plan.associated_moves.push(AssociatedMove {
            source: temp_dir.path().join("missing.srt"),
            destination: target.join("missing.srt"),
        });

        let report = MoveExecutor.execute(&plan, false);

        assert!(!report.success);
        assert_eq!(report.operations.len(), 1);
        assert!(target.join("clip.mkv").exists());
        assert!(!source.exists());
    }

    #[test]
    fn test_unrecognized_moves_are_recorded() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src_dir = temp_dir.path().join("Camcorder");
        fs::create_dir(&src_dir).unwrap();
        let source = src_dir.join("random-video-file.mp4");
        fs::write(&source, "x").unwrap();
        let target = temp_dir.path().join("out").join("movies").join("unorganized");

        let plan = plan_for(source.clone(), target.clone(), "random-video-file.mp4", false);
        assert!(MoveExecutor.execute(&plan, false).success);

        let record = fs::read_to_string(target.join(PROVENANCE_FILE)).unwrap();
        assert!(record.contains(&format!("[{}]", src_dir.display())));
        assert!(record.contains("random-video-file.mp4 -> random-video-file.mp4"));
    }

    #[test]
    fn test_history_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut log = OperationLog::new(temp_dir.path().to_path_buf());
        log.extend([Operation {
            original_path: PathBuf::from("/in/a.mkv"),
            new_path: PathBuf::from("/out/tv_shows/A/Season 1/a.mkv"),
            media_type: MediaType::TvShows,
        }]);
        log.save(temp_dir.path()).expect("save failed");

        let loaded = OperationLog::load(temp_dir.path())
            .expect("load failed")
            .expect("no history");
        assert_eq!(loaded.operations, log.operations);
        assert_eq!(loaded.timestamp, log.timestamp);

        OperationLog::delete(temp_dir.path()).unwrap();
        assert!(OperationLog::load(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_history_format() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join(HISTORY_FILE), "{\"timestamp\": 3}").unwrap();
        assert!(matches!(
            OperationLog::load(temp_dir.path()),
            Err(OrganizeError::InvalidHistoryFormat { .. })
        ));
    }
}
