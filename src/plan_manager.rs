//! Saving and loading plans as JSON documents.
//!
//! An organization plan captures a batch of [`MovePlan`]s so it can be
//! reviewed and applied later. A duplicate plan records keep/remove decisions
//! produced by an external duplicate finder.

use crate::file_category::MediaType;
use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::move_plan::{AssociatedMove, MovePlan};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PLAN_VERSION: &str = "1.0";
pub const ORGANIZATION_PLAN_TYPE: &str = "file_organization";
pub const DUPLICATE_PLAN_TYPE: &str = "duplicate_removal";

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A sidecar move in a saved plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedEntry {
    pub from: String,
    pub to: String,
}

/// One file's move in a saved plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub from: String,
    pub to: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub recognized: bool,
    #[serde(default)]
    pub changed: bool,
    /// Empty in plans that predate this field; the destination's parent is used.
    #[serde(default)]
    pub target_dir: String,
    #[serde(default)]
    pub associated: Vec<AssociatedEntry>,
}

impl From<&MovePlan> for PlanEntry {
    fn from(plan: &MovePlan) -> Self {
        Self {
            from: path_string(&plan.source),
            to: path_string(&plan.destination),
            media_type: plan.media_type,
            recognized: plan.recognized,
            changed: plan.changed,
            target_dir: path_string(&plan.target_dir),
            associated: plan
                .associated_moves
                .iter()
                .map(|m| AssociatedEntry {
                    from: path_string(&m.source),
                    to: path_string(&m.destination),
                })
                .collect(),
        }
    }
}

impl From<&PlanEntry> for MovePlan {
    fn from(entry: &PlanEntry) -> Self {
        let source = PathBuf::from(&entry.from);
        let destination = PathBuf::from(&entry.to);
        let target_dir = if entry.target_dir.is_empty() {
            destination.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            PathBuf::from(&entry.target_dir)
        };
        Self {
            changed: source != destination,
            associated_moves: entry
                .associated
                .iter()
                .map(|a| AssociatedMove {
                    source: PathBuf::from(&a.from),
                    destination: PathBuf::from(&a.to),
                })
                .collect(),
            media_type: entry.media_type,
            recognized: entry.recognized,
            source,
            destination,
            target_dir,
        }
    }
}

/// A saved batch of move plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationPlan {
    pub version: String,
    #[serde(rename = "type")]
    pub plan_type: String,
    pub timestamp: String,
    pub source_directory: String,
    pub output_directory: String,
    pub plans: Vec<PlanEntry>,
}

impl OrganizationPlan {
    pub fn new(source_directory: &Path, output_directory: &Path, plans: &[MovePlan]) -> Self {
        Self {
            version: PLAN_VERSION.to_string(),
            plan_type: ORGANIZATION_PLAN_TYPE.to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            source_directory: path_string(source_directory),
            output_directory: path_string(output_directory),
            plans: plans.iter().map(PlanEntry::from).collect(),
        }
    }

    /// The saved entries as executable plans.
    pub fn move_plans(&self) -> Vec<MovePlan> {
        self.plans.iter().map(MovePlan::from).collect()
    }
}

/// Keep/remove decision for one group of identical files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Empty when no file was selected.
    pub keep: String,
    pub remove: Vec<String>,
    pub count: usize,
}

impl DuplicateGroup {
    pub fn keep_path(&self) -> Option<PathBuf> {
        let keep = self.keep.trim();
        (!keep.is_empty()).then(|| PathBuf::from(keep))
    }
}

/// Saved duplicate-removal decisions, keyed by content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePlan {
    pub version: String,
    #[serde(rename = "type")]
    pub plan_type: String,
    pub timestamp: String,
    pub source_directory: String,
    pub duplicates: BTreeMap<String, Vec<String>>,
    pub organized: BTreeMap<String, DuplicateGroup>,
}

impl DuplicatePlan {
    /// Builds a plan from duplicate sets, keeping the first path of each set.
    /// Sets with fewer than two files are not duplicates and get no decision.
    pub fn new(source_directory: &Path, duplicates: &BTreeMap<String, Vec<PathBuf>>) -> Self {
        let organized = duplicates
            .iter()
            .filter(|(_, paths)| paths.len() >= 2)
            .map(|(hash, paths)| {
                let group = DuplicateGroup {
                    keep: path_string(&paths[0]),
                    remove: paths[1..].iter().map(|p| path_string(p)).collect(),
                    count: paths.len(),
                };
                (hash.clone(), group)
            })
            .collect();

        Self {
            version: PLAN_VERSION.to_string(),
            plan_type: DUPLICATE_PLAN_TYPE.to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            source_directory: path_string(source_directory),
            duplicates: duplicates
                .iter()
                .map(|(hash, paths)| (hash.clone(), paths.iter().map(|p| path_string(p)).collect()))
                .collect(),
            organized,
        }
    }
}

/// Which kind of plan a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Organization,
    Duplicates,
}

/// Reads and writes plan files.
pub struct PlanManager;

impl PlanManager {
    pub fn save_organization_plan(plan: &OrganizationPlan, path: &Path) -> OrganizeResult<()> {
        Self::write_json(plan, path)?;
        info!(path = %path.display(), plans = plan.plans.len(), "saved organization plan");
        Ok(())
    }

    /// Loads an organization plan, rejecting files of any other type.
    pub fn load_organization_plan(path: &Path) -> OrganizeResult<OrganizationPlan> {
        let plan: OrganizationPlan = Self::read_json(path)?;
        Self::check_type(&plan.plan_type, ORGANIZATION_PLAN_TYPE)?;
        info!(path = %path.display(), created = %plan.timestamp, "loaded organization plan");
        Ok(plan)
    }

    pub fn save_duplicate_plan(plan: &DuplicatePlan, path: &Path) -> OrganizeResult<()> {
        Self::write_json(plan, path)?;
        info!(path = %path.display(), groups = plan.organized.len(), "saved duplicate plan");
        Ok(())
    }

    /// Loads a duplicate plan, rejecting files of any other type.
    pub fn load_duplicate_plan(path: &Path) -> OrganizeResult<DuplicatePlan> {
        let plan: DuplicatePlan = Self::read_json(path)?;
        Self::check_type(&plan.plan_type, DUPLICATE_PLAN_TYPE)?;
        info!(path = %path.display(), created = %plan.timestamp, "loaded duplicate plan");
        Ok(plan)
    }

    /// Timestamped plan file name inside `dir`, e.g.
    /// `organization_plan_20250101_120000.json`.
    pub fn default_plan_path(kind: PlanKind, dir: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let prefix = match kind {
            PlanKind::Organization => "organization_plan",
            PlanKind::Duplicates => "duplicate_plan",
        };
        dir.join(format!("{}_{}.json", prefix, timestamp))
    }

    fn check_type(found: &str, expected: &str) -> OrganizeResult<()> {
        if found == expected {
            Ok(())
        } else {
            Err(OrganizeError::InvalidPlanFormat {
                reason: format!("expected plan type '{}', found '{}'", expected, found),
            })
        }
    }

    fn write_json<T: Serialize>(value: &T, path: &Path) -> OrganizeResult<()> {
        let write_err = |source| OrganizeError::PlanWriteFailed {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(value).map_err(|e| OrganizeError::InvalidPlanFormat {
            reason: e.to_string(),
        })?;
        fs::write(path, json).map_err(write_err)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> OrganizeResult<T> {
        let content = fs::read_to_string(path).map_err(|source| OrganizeError::PlanReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| OrganizeError::InvalidPlanFormat {
            reason: format!("JSON parse error: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_plan() -> MovePlan {
        MovePlan {
            source: PathBuf::from("/in/movie.mkv"),
            destination: PathBuf::from("/out/movies/unorganized/movie.mkv"),
            associated_moves: vec![AssociatedMove {
                source: PathBuf::from("/in/movie.srt"),
                destination: PathBuf::from("/out/movies/unorganized/movie.srt"),
            }],
            changed: true,
            media_type: MediaType::Movies,
            recognized: false,
            target_dir: PathBuf::from("/out/movies/unorganized"),
        }
    }

    #[test]
    fn test_organization_plan_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("plans").join("plan.json");
        let plan = OrganizationPlan::new(Path::new("/in"), Path::new("/out"), &[sample_plan()]);

        PlanManager::save_organization_plan(&plan, &path).expect("save failed");
        let loaded = PlanManager::load_organization_plan(&path).expect("load failed");

        assert_eq!(loaded, plan);
        assert_eq!(loaded.move_plans(), vec![sample_plan()]);
    }

    #[test]
    fn test_plan_json_shape() {
        let plan = OrganizationPlan::new(Path::new("/in"), Path::new("/out"), &[sample_plan()]);
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["type"], "file_organization");
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["plans"][0]["media_type"], "movies");
        assert_eq!(value["plans"][0]["associated"][0]["from"], "/in/movie.srt");
    }

    #[test]
    fn test_entry_without_target_dir_uses_parent() {
        let entry: PlanEntry = serde_json::from_str(
            r#"{"from": "/in/a.mkv", "to": "/out/movies/a.mkv", "media_type": "movies"}"#,
        )
        .unwrap();
        let plan = MovePlan::from(&entry);
        assert_eq!(plan.target_dir, PathBuf::from("/out/movies"));
        assert!(plan.changed);
        assert!(plan.associated_moves.is_empty());
    }

    #[test]
    fn test_wrong_plan_type_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("dupes.json");
        let plan = DuplicatePlan::new(Path::new("/in"), &BTreeMap::new());
        PlanManager::save_duplicate_plan(&plan, &path).unwrap();

        assert!(matches!(
            PlanManager::load_organization_plan(&path),
            Err(OrganizeError::InvalidPlanFormat { .. })
        ));
    }

    #[test]
    fn test_duplicate_plan_decisions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("dupes.json");
        let duplicates = BTreeMap::from([
            (
                "abc".to_string(),
                vec![PathBuf::from("/in/a.mkv"), PathBuf::from("/in/copy/a.mkv")],
            ),
            ("single".to_string(), vec![PathBuf::from("/in/b.mkv")]),
        ]);
        let plan = DuplicatePlan::new(Path::new("/in"), &duplicates);
        PlanManager::save_duplicate_plan(&plan, &path).unwrap();

        let loaded = PlanManager::load_duplicate_plan(&path).unwrap();
        assert_eq!(loaded.duplicates.len(), 2);
        assert_eq!(loaded.organized.len(), 1);
        let group = &loaded.organized["abc"];
        assert_eq!(group.keep_path(), Some(PathBuf::from("/in/a.mkv")));
        assert_eq!(group.remove, vec!["/in/copy/a.mkv".to_string()]);
        assert_eq!(group.count, 2);
    }

    #[test]
    fn test_missing_plan_file() {
        assert!(matches!(
            PlanManager::load_organization_plan(Path::new("/non/existent/plan.json")),
            Err(OrganizeError::PlanReadFailed { .. })
        ));
    }

    #[test]
    fn test_default_plan_path() {
        let path = PlanManager::default_plan_path(PlanKind::Organization, Path::new("/plans"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("organization_plan_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "organization_plan_20250101_120000.json".len());
    }
}
