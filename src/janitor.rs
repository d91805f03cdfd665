//! Post-batch cleanup of source and output trees.
//!
//! Two passes are provided: removing directories a batch left empty, and
//! quarantining incidental junk (thumbnail caches, VCS folders) that ends up
//! inside the organized library. Junk is relocated, never deleted.

use crate::file_category::MediaType;
use crate::file_organizer::move_file;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Per-category directory that receives quarantined junk.
pub const QUARANTINE_DIR: &str = "unorganized_files";

const JUNK_FILES: &[&str] = &["thumbs.db", ".ds_store", "desktop.ini", "folder.jpg"];
const JUNK_DIRS: &[&str] = &["__pycache__", ".git", ".svn", ".cache"];

/// Counters returned by cleanup passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub empty_dirs_removed: usize,
    pub files_quarantined: usize,
    pub dirs_quarantined: usize,
}

impl CleanupStats {
    /// Adds another pass's counters to these.
    pub fn absorb(&mut self, other: CleanupStats) {
        self.empty_dirs_removed += other.empty_dirs_removed;
        self.files_quarantined += other.files_quarantined;
        self.dirs_quarantined += other.dirs_quarantined;
    }
}

fn is_junk_file(name: &str) -> bool {
    JUNK_FILES.contains(&name.to_lowercase().as_str())
}

fn is_junk_dir(name: &str) -> bool {
    JUNK_DIRS.contains(&name.to_lowercase().as_str())
}

enum Removal {
    Removed,
    Missing,
    Kept,
}

/// Removes one directory if it is empty right now.
fn remove_if_empty(dir: &Path) -> Removal {
    match fs::read_dir(dir) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                return Removal::Kept;
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => return Removal::Missing,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list directory");
            return Removal::Kept;
        }
    }

    match fs::remove_dir(dir) {
        Ok(()) => {
            info!("Removed empty directory: {}", dir.display());
            Removal::Removed
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Removal::Missing,
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DirectoryNotEmpty | ErrorKind::ResourceBusy | ErrorKind::PermissionDenied
            ) =>
        {
            debug!(dir = %dir.display(), error = %e, "directory left in place");
            Removal::Kept
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to remove directory");
            Removal::Kept
        }
    }
}

/// Picks a free name next to `path` by suffixing `_1`, `_2`, ... to its stem.
fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    (1..)
        .map(|n| parent.join(format!("{}_{}{}", stem, n, extension)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Cleans up after organize runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryJanitor;

impl DirectoryJanitor {
    /// Removes the given directories if they are empty, deepest first.
    ///
    /// With `recursive`, each removal continues up the parent chain while the
    /// parent is empty. Climbing stops at an excluded path, at any ancestor of
    /// an excluded path, and at the first directory that cannot be removed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediatidy::janitor::DirectoryJanitor;
    /// use std::path::PathBuf;
    ///
    /// let vacated = vec![PathBuf::from("/downloads/Heat (1995)")];
    /// let stats = DirectoryJanitor.cleanup_empty_directories(
    ///     vacated,
    ///     true,
    ///     &[PathBuf::from("/downloads")],
    /// );
    /// println!("removed {} directories", stats.empty_dirs_removed);
    /// ```
    pub fn cleanup_empty_directories(
        &self,
        dirs: impl IntoIterator<Item = PathBuf>,
        recursive: bool,
        exclude: &[PathBuf],
    ) -> CleanupStats {
        let mut ordered: Vec<PathBuf> = dirs.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        ordered.sort_by(|a, b| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| a.cmp(b))
        });

        let stops = |dir: &Path| exclude.iter().any(|ex| ex.starts_with(dir));

        let mut stats = CleanupStats::default();
        for dir in ordered {
            let mut current = Some(dir.as_path());
            while let Some(dir) = current {
                if stops(dir) {
                    break;
                }
                match remove_if_empty(dir) {
                    Removal::Removed => stats.empty_dirs_removed += 1,
                    Removal::Missing => {}
                    Removal::Kept => break,
                }
                if !recursive {
                    break;
                }
                current = dir.parent().filter(|p| !p.as_os_str().is_empty());
            }
        }
        stats
    }

    /// Runs [`cleanup_category`](Self::cleanup_category) over every category
    /// directory present under `root`.
    pub fn cleanup_output_directory(&self, root: &Path) -> CleanupStats {
        let mut stats = CleanupStats::default();
        for media_type in MediaType::ALL {
            let category = root.join(media_type.dir_name());
            if category.is_dir() {
                stats.absorb(self.cleanup_category(&category));
            }
        }
        stats
    }

    /// Quarantines junk inside one category tree, then removes directories
    /// left empty. The category root and its quarantine directory are kept.
    /// Safe to run repeatedly.
    pub fn cleanup_category(&self, category: &Path) -> CleanupStats {
        let mut stats = CleanupStats::default();
        let quarantine = category.join(QUARANTINE_DIR);
        if let Err(e) = fs::create_dir_all(&quarantine) {
            warn!(dir = %quarantine.display(), error = %e, "cannot create quarantine directory");
            return stats;
        }

        for (junk, is_dir) in find_junk(category, &quarantine) {
            let Ok(relative) = junk.strip_prefix(category) else {
                continue;
            };
            let destination = quarantine.join(relative);
            let result = if is_dir {
                relocate_dir(&junk, &destination)
            } else {
                relocate_file(&junk, &destination).map(|_| ())
            };
            match result {
                Ok(()) => {
                    info!("Quarantined: {} -> {}", junk.display(), destination.display());
                    if is_dir {
                        stats.dirs_quarantined += 1;
                    } else {
                        stats.files_quarantined += 1;
                    }
                }
                Err(e) => warn!(path = %junk.display(), error = %e, "failed to quarantine"),
            }
        }

        stats.empty_dirs_removed += remove_empty_below(category, &quarantine);
        stats
    }
}

/// Junk entries under `category`, sorted, never looking inside `quarantine`
/// or inside a junk directory.
fn find_junk(category: &Path, quarantine: &Path) -> Vec<(PathBuf, bool)> {
    let mut junk = Vec::new();
    let mut walker = WalkDir::new(category)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if entry.path() == quarantine {
                walker.skip_current_dir();
            } else if is_junk_dir(&name) {
                junk.push((entry.path().to_path_buf(), true));
                walker.skip_current_dir();
            }
        } else if is_junk_file(&name) {
            junk.push((entry.path().to_path_buf(), false));
        }
    }
    junk
}

fn relocate_file(source: &Path, destination: &Path) -> io::Result<PathBuf> {
    let destination = unique_path(destination);
    move_file(source, &destination).map_err(io::Error::other)?;
    Ok(destination)
}

/// Moves a directory, merging into an existing destination entry by entry.
fn relocate_dir(source: &Path, destination: &Path) -> io::Result<()> {
    if !destination.exists() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        if fs::rename(source, destination).is_ok() {
            return Ok(());
        }
    }

    fs::create_dir_all(destination)?;
    let mut children: Vec<PathBuf> = fs::read_dir(source)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    children.sort();

    for child in children {
        let Some(name) = child.file_name() else {
            continue;
        };
        let target = destination.join(name);
        if child.is_dir() {
            relocate_dir(&child, &target)?;
        } else {
            relocate_file(&child, &target)?;
        }
    }
    fs::remove_dir(source)
}

fn remove_empty_below(category: &Path, quarantine: &Path) -> usize {
    let dirs: Vec<PathBuf> = WalkDir::new(category)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != quarantine)
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect();

    // Pre-order reversed: children come before their parents.
    dirs.iter()
        .rev()
        .filter(|dir| matches!(remove_if_empty(dir), Removal::Removed))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_junk_names_case_insensitive() {
        assert!(is_junk_file("Thumbs.db"));
        assert!(is_junk_file(".DS_Store"));
        assert!(!is_junk_file("thumbs.jpg"));
        assert!(is_junk_dir("__pycache__"));
        assert!(is_junk_dir(".GIT"));
    }

    #[test]
    fn test_unique_path_suffixes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("Thumbs.db");
        assert_eq!(unique_path(&path), path);
        fs::write(&path, "").unwrap();
        assert_eq!(unique_path(&path), temp_dir.path().join("Thumbs_1.db"));
        fs::write(temp_dir.path().join("Thumbs_1.db"), "").unwrap();
        assert_eq!(unique_path(&path), temp_dir.path().join("Thumbs_2.db"));
    }

    #[test]
    fn test_empty_dirs_removed_up_to_exclude() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("in");
        let deep = root.join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();

        let stats = DirectoryJanitor.cleanup_empty_directories(vec![deep], true, &[root.clone()]);

        assert_eq!(stats.empty_dirs_removed, 3);
        assert!(root.exists());
        assert!(!root.join("a").exists());
    }

    #[test]
    fn test_non_recursive_removes_only_given() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let parent = temp_dir.path().join("a");
        let child = parent.join("b");
        fs::create_dir_all(&child).unwrap();

        let stats = DirectoryJanitor.cleanup_empty_directories(vec![child.clone()], false, &[]);

        assert_eq!(stats.empty_dirs_removed, 1);
        assert!(!child.exists());
        assert!(parent.exists());
    }

    #[test]
    fn test_non_empty_directory_kept() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("keep");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("movie.mkv"), "x").unwrap();

        let stats = DirectoryJanitor.cleanup_empty_directories(
            vec![dir.clone(), temp_dir.path().join("missing")],
            true,
            &[temp_dir.path().to_path_buf()],
        );

        assert_eq!(stats.empty_dirs_removed, 0);
        assert!(dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied_stops_climbing() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let locked = temp_dir.path().join("locked");
        let child = locked.join("empty");
        fs::create_dir_all(&child).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions; nothing to observe then.
        let privileged = fs::write(locked.join("write-check"), "").is_ok();
        let stats = if privileged {
            None
        } else {
            Some(DirectoryJanitor.cleanup_empty_directories(vec![child.clone()], true, &[]))
        };
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if let Some(stats) = stats {
            assert_eq!(stats.empty_dirs_removed, 0);
            assert!(child.exists());
            assert!(locked.exists());
        }
    }

    #[test]
    fn test_junk_directory_merged_into_quarantine() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let category = temp_dir.path().join("movies");
        let cache = category.join("x").join(".cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("a.bin"), "new").unwrap();
        let existing = category.join(QUARANTINE_DIR).join("x").join(".cache");
        fs::create_dir_all(&existing).unwrap();
        fs::write(existing.join("a.bin"), "old").unwrap();

        let stats = DirectoryJanitor.cleanup_category(&category);

        assert_eq!(stats.dirs_quarantined, 1);
        assert_eq!(fs::read_to_string(existing.join("a.bin")).unwrap(), "old");
        assert_eq!(fs::read_to_string(existing.join("a_1.bin")).unwrap(), "new");
        assert!(!category.join("x").exists());
        assert_eq!(stats.empty_dirs_removed, 1);
    }

    #[test]
    fn test_quarantine_is_not_rescanned() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let category = temp_dir.path().join("photos");
        let quarantine = category.join(QUARANTINE_DIR);
        fs::create_dir_all(quarantine.join("empty")).unwrap();
        fs::write(quarantine.join("Thumbs.db"), "").unwrap();

        let stats = DirectoryJanitor.cleanup_category(&category);

        assert_eq!(stats, CleanupStats::default());
        assert!(quarantine.join("Thumbs.db").exists());
        assert!(quarantine.join("empty").exists());
    }
}
