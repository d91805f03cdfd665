//! Candidate file discovery.

use crate::config::{CompiledFilters, ConfigError, OrganizerConfig};
use crate::file_category::{MediaClassifier, MediaType, extension_of};
use crate::file_organizer::{OrganizeError, OrganizeResult, resolve_path};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walks a directory tree and returns the media files worth planning.
#[derive(Debug, Clone)]
pub struct MediaScanner {
    classifier: MediaClassifier,
    filters: CompiledFilters,
    skip_dirs: Vec<PathBuf>,
}

impl MediaScanner {
    /// Builds a scanner from the configured extension lists and ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if an ignore pattern is not a valid glob.
    pub fn new(config: &OrganizerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            classifier: MediaClassifier::new(&config.advanced),
            filters: config.compile_filters()?,
            skip_dirs: Vec::new(),
        })
    }

    /// Never descend into `dir`, e.g. an output directory nested inside the
    /// scan root. Any spelling of the path works.
    pub fn skip_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.skip_dirs.push(resolve_path(&dir).unwrap_or(dir));
        self
    }

    /// Recursively lists regular files under `root` with a media extension that
    /// no ignore pattern matches, sorted by path. Returned paths are absolute
    /// and symlink-free.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidBasePath`] if `root` is not a directory.
    pub fn scan(&self, root: &Path) -> OrganizeResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            });
        }
        let root = resolve_path(root).map_err(|source| OrganizeError::InvalidBasePath {
            path: root.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|entry| !self.skip_dirs.iter().any(|dir| entry.path() == dir))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.classifier.is_media_extension(&extension_of(path)))
            .filter(|path| self.filters.should_include(path))
            .collect();

        files.sort();
        debug!(root = %root.display(), count = files.len(), "scan complete");
        Ok(files)
    }

    /// Counts scanned files per media type, classifying each path afresh.
    pub fn breakdown(&self, files: &[PathBuf]) -> BTreeMap<MediaType, usize> {
        let mut counts = BTreeMap::new();
        for file in files {
            let (media_type, _) = self.classifier.classify(file);
            *counts.entry(media_type).or_insert(0) += 1;
        }
        counts
    }
}
