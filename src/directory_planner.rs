//! Target directory resolution.
//!
//! Recognized files go to a canonical location under their category root.
//! Everything else goes to `<category root>/unorganized/`, keeping up to two
//! meaningful segments of the directory the file came from.

use crate::config::{OrganizeBy, OrganizerConfig};
use crate::file_category::MediaType;
use crate::file_organizer::resolve_path;
use crate::naming::dotted;
use crate::pattern::PatternInfo;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Name of the per-category subtree for files without a confident match.
pub const UNORGANIZED_DIR: &str = "unorganized";

/// Directory names too generic to carry any information about a file.
const COMMON_GENERIC_NAMES: &[&str] = &[
    "downloads",
    "desktop",
    "documents",
    "videos",
    "pictures",
    "music",
];

/// How the `unorganized` branch of one category preserves source context.
#[derive(Debug, Clone, Copy)]
pub struct UnorganizedPolicy {
    /// Names specific to this category that are skipped as well as the common ones.
    pub generic_names: &'static [&'static str],
    pub max_preserved_segments: usize,
}

impl UnorganizedPolicy {
    /// Returns the policy for a media type.
    pub fn for_media_type(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Movies => Self {
                generic_names: &["movies", "films"],
                max_preserved_segments: 2,
            },
            MediaType::TvShows => Self {
                generic_names: &["tv", "tv_shows", "shows", "series"],
                max_preserved_segments: 2,
            },
            MediaType::Music => Self {
                generic_names: &["audio", "songs"],
                max_preserved_segments: 2,
            },
            MediaType::Photos => Self {
                generic_names: &["photos", "images"],
                max_preserved_segments: 2,
            },
        }
    }

    /// True if a directory name says nothing beyond "a folder of stuff".
    pub fn is_generic(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        COMMON_GENERIC_NAMES.contains(&lower.as_str()) || self.generic_names.contains(&lower.as_str())
    }
}

/// Resolves where a classified file belongs.
#[derive(Debug, Clone)]
pub struct DirectoryPlanner {
    organize_by: OrganizeBy,
    override_roots: Vec<PathBuf>,
}

impl DirectoryPlanner {
    pub fn new(config: &OrganizerConfig) -> Self {
        Self {
            organize_by: config.organization.organize_by,
            override_roots: config
                .organization
                .output_directories
                .values()
                .map(|root| resolve_path(root).unwrap_or_else(|_| root.clone()))
                .collect(),
        }
    }

    /// Returns the category root for `media_type` under `base_dir`.
    ///
    /// A configured override root already is its category root, so no type
    /// segment is appended to it.
    pub fn category_root(&self, base_dir: &Path, media_type: MediaType) -> PathBuf {
        let resolved = resolve_path(base_dir).unwrap_or_else(|_| base_dir.to_path_buf());
        if self.override_roots.contains(&resolved) {
            base_dir.to_path_buf()
        } else {
            base_dir.join(media_type.dir_name())
        }
    }

    /// Resolves the target directory for a file. Pure: nothing is created
    /// here, the executor creates directories when a move actually runs.
    pub fn resolve(
        &self,
        base_dir: &Path,
        media_type: MediaType,
        info: &PatternInfo,
        recognized: bool,
        source_path: &Path,
    ) -> PathBuf {
        if self.organize_by == OrganizeBy::None {
            return base_dir.to_path_buf();
        }

        let root = self.category_root(base_dir, media_type);

        let target = match (media_type, recognized) {
            (MediaType::Movies, true) => root,
            (MediaType::TvShows, true) => {
                let show = dotted(&info.title);
                if show.is_empty() || info.season.is_empty() {
                    unorganized_dir(&root, media_type, source_path)
                } else {
                    root.join(show).join(format!("Season {}", info.season))
                }
            }
            _ => unorganized_dir(&root, media_type, source_path),
        };

        debug!(
            source = %source_path.display(),
            media_type = %media_type,
            recognized,
            target = %target.display(),
            "resolved target directory"
        );
        target
    }
}

fn unorganized_dir(root: &Path, media_type: MediaType, source_path: &Path) -> PathBuf {
    let base = root.join(UNORGANIZED_DIR);
    let parent = source_path.parent().unwrap_or_else(|| Path::new(""));

    // Already quarantined: keep its place so re-planning is a no-op.
    let resolved_parent = resolve_path(parent).unwrap_or_else(|_| parent.to_path_buf());
    let resolved_base = resolve_path(&base).unwrap_or_else(|_| base.clone());
    if let Ok(relative) = resolved_parent.strip_prefix(&resolved_base) {
        if relative.as_os_str().is_empty() {
            return base;
        }
        return base.join(relative);
    }

    preserved_segments(parent, UnorganizedPolicy::for_media_type(media_type))
        .into_iter()
        .fold(base, |dir, segment| dir.join(segment))
}

/// Picks the trailing segments of `parent` worth keeping, in order.
pub fn preserved_segments(parent: &Path, policy: UnorganizedPolicy) -> Vec<String> {
    let names: Vec<String> = parent
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let start = names.len().saturating_sub(policy.max_preserved_segments);
    names[start..]
        .iter()
        .filter(|name| name.chars().count() > 2 && !policy.is_generic(name))
        .map(|name| dotted(name))
        .filter(|name| !name.is_empty())
        .collect()
}
