//! Canonical filename synthesis.

use crate::file_category::{MediaType, extension_of};
use crate::pattern::PatternInfo;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static LEADING_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[.*?\]").unwrap());
static BRACED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{.*?\}").unwrap());
static SEPARATORS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_\s.]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Replaces filesystem-invalid characters with `_` and trims leading and
/// trailing dots and spaces.
///
/// # Examples
///
/// ```
/// use mediatidy::naming::clean_filename;
///
/// assert_eq!(clean_filename(" What?: Part 1. "), "What__ Part 1");
/// ```
pub fn clean_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    cleaned.trim_matches(|c| c == ' ' || c == '.').to_string()
}

/// Normalizes a human-entered name: drops a leading `[group]` tag and any
/// `{...}` groups, cleans invalid characters and collapses runs of `_`,
/// whitespace and `.` into single spaces.
///
/// # Examples
///
/// ```
/// use mediatidy::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename("[grp] Some__Name..here {x}"), "Some Name here");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let name = name.trim();
    let name = LEADING_TAG_RE.replace(name, "");
    let name = BRACED_RE.replace_all(&name, "");
    let name = clean_filename(&name);
    let name = SEPARATORS_RE.replace_all(&name, " ");
    name.trim_end_matches(['.', ' ']).trim().to_string()
}

/// Sanitizes a name and joins its words with dots (`"Show Name"` -> `"Show.Name"`).
pub fn dotted(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(&sanitize_filename(name), ".")
        .into_owned()
}

/// Builds canonical output filenames.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSynthesizer;

impl NameSynthesizer {
    /// Builds the output filename for `path` from its extracted tokens.
    ///
    /// Without a usable title the original stem is sanitized and kept.
    /// Otherwise the name is `Title[.Year][.SxxEyy].ext`, with season and
    /// episode digits exactly as captured.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediatidy::file_category::MediaType;
    /// use mediatidy::naming::NameSynthesizer;
    /// use mediatidy::pattern::PatternExtractor;
    /// use std::path::Path;
    ///
    /// let path = Path::new("Movie Name (2020) [1080p] [HEVC].mkv");
    /// let info = PatternExtractor::extract("Movie Name (2020) [1080p] [HEVC].mkv");
    /// assert_eq!(NameSynthesizer::build(path, &info, MediaType::Movies), "Movie.Name.2020.mkv");
    /// ```
    pub fn build(path: &Path, info: &PatternInfo, media_type: MediaType) -> String {
        let extension = extension_of(path);
        let title = dotted(&info.title);

        if title.is_empty() {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = clean_filename(&dotted(&stem));
            debug!(media_type = %media_type, name = %name, "no title extracted, keeping original stem");
            return format!("{}{}", name, extension);
        }

        let mut components = vec![title];
        if !info.year.is_empty() {
            components.push(info.year.clone());
        }
        if info.has_episode() {
            components.push(format!("S{}E{}", info.season, info.episode));
        }

        let name = clean_filename(&components.join("."));
        debug!(media_type = %media_type, name = %name, "synthesized canonical name");
        format!("{}{}", name, extension)
    }
}
