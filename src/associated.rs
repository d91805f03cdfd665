//! Sidecar discovery.
//!
//! Finds the subtitles, artwork and metadata files in a media file's directory
//! that have to move with it. Ambiguous files are kept together with the main
//! file; only small videos that look like samples are left behind.

use crate::file_category::{MediaClassifier, extension_of};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tiff", ".tif",
];
pub const METADATA_EXTENSIONS: &[&str] = &[".nfo", ".xml", ".txt"];
pub const SUBTITLE_EXTENSIONS: &[&str] = &[".srt", ".vtt", ".ass", ".ssa", ".sub", ".idx"];

/// Artwork names that tie a sidecar to a title without repeating its name.
const ARTWORK_KEYWORDS: &[&str] = &[
    "poster", "fanart", "banner", "logo", "clearart", "thumb", "backdrop",
];

/// Any sample-sized video under this many bytes is junk when its name says so.
pub const SAMPLE_NAMED_LIMIT: u64 = 50 * 1024 * 1024;
/// Any video under this many bytes is junk regardless of name.
pub const TINY_VIDEO_LIMIT: u64 = 10 * 1024 * 1024;

/// Characters of stem compared by the lenient artwork/metadata fallback.
const LENIENT_PREFIX_CHARS: usize = 10;

static SAMPLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[\W_])(?:sample|trailer|preview)(?:[\W_]|$)").unwrap());

fn is_always_keep(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
        || METADATA_EXTENSIONS.contains(&ext)
        || SUBTITLE_EXTENSIONS.contains(&ext)
}

fn is_art_or_metadata(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext) || METADATA_EXTENSIONS.contains(&ext)
}

/// Returns true if the file name carries a sample/trailer/preview marker as a
/// whole word, prefix or suffix.
pub fn has_sample_marker(file_name: &str) -> bool {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    SAMPLE_RE.is_match(&stem)
}

/// Sample/junk test: a video that is either named like a sample and under
/// 50MB, or under 10MB whatever its name.
pub fn is_sample_or_junk(file_name: &str, is_video: bool, size: u64) -> bool {
    if !is_video {
        return false;
    }
    (has_sample_marker(file_name) && size < SAMPLE_NAMED_LIMIT) || size < TINY_VIDEO_LIMIT
}

/// Name similarity between a main stem and a candidate sidecar.
pub fn stems_related(main_stem: &str, other_stem: &str, other_ext: &str) -> bool {
    let main = main_stem.to_lowercase();
    let other = other_stem.to_lowercase();

    if main == other {
        return true;
    }

    let prefixed = |long: &str, short: &str| {
        ['-', '_', '.']
            .iter()
            .any(|sep| long.starts_with(&format!("{}{}", short, sep)))
    };
    if prefixed(&other, &main) || prefixed(&main, &other) {
        return true;
    }

    if shares_artwork_keyword(&main, &other) {
        return true;
    }

    if is_art_or_metadata(other_ext) {
        let head = |s: &str| s.chars().take(LENIENT_PREFIX_CHARS).collect::<String>();
        let (main_head, other_head) = (head(&main), head(&other));
        if (!main_head.is_empty() && other.starts_with(&main_head))
            || (!other_head.is_empty() && main.starts_with(&other_head))
        {
            return true;
        }
    }

    false
}

/// Artwork like `poster.jpg` or `movie-fanart.jpg`: one stem carries a
/// keyword and what remains of it overlaps the other stem.
fn shares_artwork_keyword(main: &str, other: &str) -> bool {
    ARTWORK_KEYWORDS.iter().any(|keyword| {
        [(other, main), (main, other)].iter().any(|(tagged, plain)| {
            if !tagged.contains(keyword) {
                return false;
            }
            let rest = tagged
                .replace(keyword, "")
                .trim_matches(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
                .to_string();
            rest.is_empty() || plain.contains(rest.as_str()) || rest.contains(*plain)
        })
    })
}

/// Finds sidecar files next to a main media file.
#[derive(Debug, Clone)]
pub struct AssociatedFileResolver {
    classifier: MediaClassifier,
}

impl AssociatedFileResolver {
    pub fn new(classifier: MediaClassifier) -> Self {
        Self { classifier }
    }

    /// Lists the files in `main_file`'s directory that belong with it, sorted
    /// by path. Non-recursive; never includes `main_file` itself.
    pub fn find(&self, main_file: &Path) -> Vec<PathBuf> {
        let Some(dir) = main_file.parent() else {
            return Vec::new();
        };
        let main_stem = main_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let entries = match fs::read_dir(if dir.as_os_str().is_empty() { Path::new(".") } else { dir }) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot list directory for sidecars");
                return Vec::new();
            }
        };

        let mut found: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| dir.join(entry.file_name()))
            .filter(|path| path != main_file)
            .filter(|path| self.belongs_with(&main_stem, path))
            .collect();

        found.sort();
        debug!(main = %main_file.display(), count = found.len(), "associated files");
        found
    }

    fn belongs_with(&self, main_stem: &str, candidate: &Path) -> bool {
        let name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = candidate
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = extension_of(candidate);

        if !stems_related(main_stem, &stem, &ext) {
            return false;
        }

        if is_always_keep(&ext) {
            return true;
        }

        let is_video = self.classifier.is_video_extension(&ext);
        let size = fs::metadata(candidate).map(|m| m.len()).unwrap_or(0);
        if is_sample_or_junk(&name, is_video, size) {
            debug!(file = %candidate.display(), size, "skipping sample/junk file");
            return false;
        }

        true
    }
}

impl Default for AssociatedFileResolver {
    fn default() -> Self {
        Self::new(MediaClassifier::default())
    }
}
