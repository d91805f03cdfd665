//! Move planning.
//!
//! A [`MovePlan`] is a pure description of where one media file and its
//! sidecars would go. Building one touches the filesystem only to list the
//! file's directory and stat sidecar candidates.

use crate::associated::AssociatedFileResolver;
use crate::config::{OrganizeBy, OrganizerConfig};
use crate::directory_planner::DirectoryPlanner;
use crate::file_category::{MediaClassifier, MediaType};
use crate::file_organizer::same_path;
use crate::naming::{NameSynthesizer, clean_filename};
use crate::pattern::PatternExtractor;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A sidecar that travels with its main file under its original name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociatedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Planned relocation of one media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub associated_moves: Vec<AssociatedMove>,
    /// `source != destination`.
    pub changed: bool,
    pub media_type: MediaType,
    pub recognized: bool,
    pub target_dir: PathBuf,
}

impl MovePlan {
    /// Every `(source, destination)` pair in execution order, main file first.
    pub fn moves(&self) -> impl Iterator<Item = (&Path, &Path)> {
        std::iter::once((self.source.as_path(), self.destination.as_path())).chain(
            self.associated_moves
                .iter()
                .map(|m| (m.source.as_path(), m.destination.as_path())),
        )
    }

    /// Directories this plan moves files out of.
    pub fn source_dirs(&self) -> BTreeSet<PathBuf> {
        self.moves()
            .filter(|(from, to)| from != to)
            .filter_map(|(from, _)| from.parent().map(Path::to_path_buf))
            .collect()
    }
}

/// Keeps the source spelling when `destination` is where `source` already is,
/// so an in-place file compares equal to its destination.
fn in_place_or(source: &Path, destination: PathBuf) -> PathBuf {
    if same_path(source, &destination) {
        source.to_path_buf()
    } else {
        destination
    }
}

/// Composes extraction, classification, naming, directory resolution and
/// sidecar discovery into move plans.
#[derive(Debug, Clone)]
pub struct MovePlanner {
    config: OrganizerConfig,
    classifier: MediaClassifier,
    directories: DirectoryPlanner,
    associated: AssociatedFileResolver,
}

impl MovePlanner {
    pub fn new(config: &OrganizerConfig) -> Self {
        let classifier = MediaClassifier::new(&config.advanced);
        Self {
            config: config.clone(),
            classifier: classifier.clone(),
            directories: DirectoryPlanner::new(config),
            associated: AssociatedFileResolver::new(classifier),
        }
    }

    /// Plans the move of `file` into the tree rooted at `base_dir`.
    ///
    /// When a per-category override root is configured for the file's type it
    /// replaces `base_dir`.
    pub fn plan(&self, file: &Path, base_dir: &Path) -> MovePlan {
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (media_type, recognized) = self.classifier.classify(file);
        let info = PatternExtractor::extract(&filename);
        let new_name = NameSynthesizer::build(file, &info, media_type);

        let base_dir = match self.config.output_directory_for(media_type) {
            Some(root) if self.config.organization.organize_by == OrganizeBy::Type => root,
            _ => base_dir,
        };
        let target_dir = self
            .directories
            .resolve(base_dir, media_type, &info, recognized, file);
        let destination = in_place_or(file, target_dir.join(&new_name));

        let associated_moves = self
            .associated
            .find(file)
            .into_iter()
            .map(|source| {
                let name = source
                    .file_name()
                    .map(|n| clean_filename(&n.to_string_lossy()))
                    .unwrap_or_default();
                AssociatedMove {
                    destination: in_place_or(&source, target_dir.join(name)),
                    source,
                }
            })
            .collect();

        let plan = MovePlan {
            changed: file != destination,
            source: file.to_path_buf(),
            destination,
            associated_moves,
            media_type,
            recognized,
            target_dir,
        };
        debug!(
            source = %plan.source.display(),
            destination = %plan.destination.display(),
            changed = plan.changed,
            sidecars = plan.associated_moves.len(),
            "planned move"
        );
        plan
    }

    /// Plans every file, keeping input order.
    ///
    /// A file in `files` is always planned as a main file of its own, so it is
    /// never also carried along as another plan's sidecar.
    pub fn plan_all(&self, files: &[PathBuf], base_dir: &Path) -> Vec<MovePlan> {
        let primaries: BTreeSet<&Path> = files.iter().map(PathBuf::as_path).collect();
        files
            .iter()
            .map(|file| {
                let mut plan = self.plan(file, base_dir);
                plan.associated_moves
                    .retain(|sidecar| !primaries.contains(sidecar.source.as_path()));
                plan
            })
            .collect()
    }

    /// Destinations claimed by more than one distinct source, across main
    /// files and sidecars of all plans.
    pub fn find_collisions(plans: &[MovePlan]) -> BTreeMap<PathBuf, BTreeSet<PathBuf>> {
        let mut claims: BTreeMap<PathBuf, BTreeSet<PathBuf>> = BTreeMap::new();
        for plan in plans {
            for (from, to) in plan.moves() {
                claims
                    .entry(to.to_path_buf())
                    .or_default()
                    .insert(from.to_path_buf());
            }
        }
        claims.retain(|_, sources| sources.len() > 1);
        claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plan_recognized_movie() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src = temp_dir.path().join("in");
        fs::create_dir(&src).unwrap();
        let file = src.join("[YTS] The.Matrix.1999.1080p.BluRay.x264.mkv");
        fs::write(&file, "x").unwrap();
        let out = temp_dir.path().join("out");

        let plan = MovePlanner::new(&OrganizerConfig::default()).plan(&file, &out);

        assert_eq!(plan.media_type, MediaType::Movies);
        assert!(plan.recognized);
        assert!(plan.changed);
        assert_eq!(plan.destination, out.join("movies").join("The.Matrix.1999.mkv"));
        assert_eq!(plan.target_dir, out.join("movies"));
        assert!(!out.exists(), "planning must not create directories");
    }

    #[test]
    fn test_sidecars_keep_original_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("Show Name - S01E01 - Pilot.mkv");
        fs::write(&file, "x").unwrap();
        fs::write(temp_dir.path().join("Show Name - S01E01 - Pilot.srt"), "1").unwrap();
        let out = temp_dir.path().join("out");

        let plan = MovePlanner::new(&OrganizerConfig::default()).plan(&file, &out);
        let season = out.join("tv_shows").join("Show.Name").join("Season 01");

        assert_eq!(plan.destination, season.join("Show.Name.S01E01.mkv"));
        assert_eq!(
            plan.associated_moves,
            vec![AssociatedMove {
                source: temp_dir.path().join("Show Name - S01E01 - Pilot.srt"),
                destination: season.join("Show Name - S01E01 - Pilot.srt"),
            }]
        );
        assert_eq!(plan.source_dirs(), BTreeSet::from([temp_dir.path().to_path_buf()]));
    }

    #[test]
    fn test_override_root_used_for_type() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("Heat.1995.mkv");
        fs::write(&file, "x").unwrap();
        let films = temp_dir.path().join("films");

        let mut config = OrganizerConfig::default();
        config
            .organization
            .output_directories
            .insert(MediaType::Movies, films.clone());
        let plan = MovePlanner::new(&config).plan(&file, &temp_dir.path().join("out"));

        assert_eq!(plan.destination, films.join("Heat.1995.mkv"));
    }

    #[test]
    fn test_unchanged_when_already_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let out = temp_dir.path().join("out");
        let movies = out.join("movies");
        fs::create_dir_all(&movies).unwrap();
        let file = movies.join("Heat.1995.mkv");
        fs::write(&file, "x").unwrap();

        let plan = MovePlanner::new(&OrganizerConfig::default()).plan(&file, &out);
        assert!(!plan.changed);
        assert!(plan.source_dirs().is_empty());
    }

    #[test]
    fn test_batch_members_are_not_sidecars() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let holiday = temp_dir.path().join("Holiday");
        fs::create_dir(&holiday).unwrap();
        let first = holiday.join("IMG_20190101_120000.jpg");
        let second = holiday.join("IMG_20190101_130000.jpg");
        fs::write(&first, "a").unwrap();
        fs::write(&second, "b").unwrap();
        let planner = MovePlanner::new(&OrganizerConfig::default());
        let out = temp_dir.path().join("out");

        // On its own the first photo would carry the second along.
        assert_eq!(planner.plan(&first, &out).associated_moves.len(), 1);

        let plans = planner.plan_all(&[first, second], &out);
        assert!(plans.iter().all(|plan| plan.associated_moves.is_empty()));
        assert!(MovePlanner::find_collisions(&plans).is_empty());
    }

    #[test]
    fn test_find_collisions() {
        let plan = |src: &str, dst: &str| MovePlan {
            source: PathBuf::from(src),
            destination: PathBuf::from(dst),
            associated_moves: Vec::new(),
            changed: true,
            media_type: MediaType::Movies,
            recognized: true,
            target_dir: PathBuf::from("/out/movies"),
        };
        let plans = vec![
            plan("/a/Heat.1995.mkv", "/out/movies/Heat.1995.mkv"),
            plan("/b/[x] Heat (1995).mkv", "/out/movies/Heat.1995.mkv"),
            plan("/a/Alien.1979.mkv", "/out/movies/Alien.1979.mkv"),
        ];

        let collisions = MovePlanner::find_collisions(&plans);
        assert_eq!(collisions.len(), 1);
        assert_eq!(
            collisions[Path::new("/out/movies/Heat.1995.mkv")].len(),
            2
        );
    }
}
