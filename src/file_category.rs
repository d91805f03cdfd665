/// Media categorization for organizing files by type.
///
/// This module maps file extensions to the four library categories and decides
/// whether a file's name is confident enough to be placed in the canonical tree.
///
/// # Examples
///
/// ```
/// use mediatidy::file_category::{MediaClassifier, MediaType};
/// use std::path::Path;
///
/// let classifier = MediaClassifier::default();
/// assert_eq!(
///     classifier.classify(Path::new("The.Matrix.1999.mkv")),
///     (MediaType::Movies, true)
/// );
/// assert_eq!(
///     classifier.classify(Path::new("Show.S01E02.mkv")),
///     (MediaType::TvShows, true)
/// );
/// ```
use crate::config::AdvancedSettings;
use crate::pattern::PatternExtractor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Represents a library category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Feature films and any video without an episode marker
    Movies,
    /// Episodic video
    TvShows,
    /// Audio files
    Music,
    /// Still images
    Photos,
}

impl MediaType {
    /// Every category, in display order.
    pub const ALL: [MediaType; 4] = [
        MediaType::Movies,
        MediaType::TvShows,
        MediaType::Music,
        MediaType::Photos,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediatidy::file_category::MediaType;
    ///
    /// assert_eq!(MediaType::TvShows.dir_name(), "tv_shows");
    /// assert_eq!(MediaType::Photos.dir_name(), "photos");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            MediaType::Movies => "movies",
            MediaType::TvShows => "tv_shows",
            MediaType::Music => "music",
            MediaType::Photos => "photos",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|t| t.dir_name() == s)
            .ok_or_else(|| format!("unknown media type '{}'", s))
    }
}

/// Substrings that mark a video as bonus material rather than a feature.
///
/// Matched against the lowercased filename after spaces, underscores and
/// dashes have been turned into dots.
const NON_MOVIE_KEYWORDS: &[&str] = &[
    "sample",
    "trailer",
    "preview",
    "intro",
    "outro",
    "behind.the.scenes",
    "blooper",
    "featurette",
    "deleted.scene",
    "alternate.ending",
];

/// Normalizes an extension to lowercase with a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Returns the lowercased extension of a path including its leading dot, or
/// an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default()
}

/// Assigns a media category and a recognized flag to a file path.
#[derive(Debug, Clone)]
pub struct MediaClassifier {
    video: HashSet<String>,
    audio: HashSet<String>,
    photo: HashSet<String>,
}

impl MediaClassifier {
    /// Creates a classifier from the configured extension lists.
    pub fn new(settings: &AdvancedSettings) -> Self {
        let set = |list: &[String]| list.iter().map(|e| normalize_extension(e)).collect();
        Self {
            video: set(&settings.video_extensions),
            audio: set(&settings.audio_extensions),
            photo: set(&settings.photo_extensions),
        }
    }

    pub fn is_video_extension(&self, ext: &str) -> bool {
        self.video.contains(&normalize_extension(ext))
    }

    /// Returns true if the extension belongs to any configured category.
    pub fn is_media_extension(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        self.video.contains(&ext) || self.audio.contains(&ext) || self.photo.contains(&ext)
    }

    /// Classifies a file by extension, then by filename heuristics.
    ///
    /// Unknown extensions fall back to `(Movies, false)`. Audio and photo files
    /// are never recognized.
    pub fn classify(&self, path: &Path) -> (MediaType, bool) {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = extension_of(path);

        let result = if self.video.contains(&ext) {
            Self::classify_video(&filename)
        } else if self.audio.contains(&ext) {
            (MediaType::Music, false)
        } else if self.photo.contains(&ext) {
            (MediaType::Photos, false)
        } else {
            (MediaType::Movies, false)
        };

        debug!(
            file = %filename,
            media_type = %result.0,
            recognized = result.1,
            "classified"
        );
        result
    }

    fn classify_video(filename: &str) -> (MediaType, bool) {
        let info = PatternExtractor::extract(filename);

        if !info.season.is_empty() || !info.episode.is_empty() || has_episode_token(filename) {
            return (MediaType::TvShows, info.has_episode());
        }

        if !info.year.is_empty() {
            return (MediaType::Movies, true);
        }

        let recognized = info.title.chars().count() > 2 && !has_non_movie_keyword(filename);
        (MediaType::Movies, recognized)
    }
}

impl Default for MediaClassifier {
    fn default() -> Self {
        Self::new(&AdvancedSettings::default())
    }
}

fn has_episode_token(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    let bytes = lower.as_bytes();
    // s<digits>e<digits>
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b's' {
            return false;
        }
        let digits = bytes[i + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        let rest = &bytes[i + 1 + digits..];
        rest.first() == Some(&b'e') && rest.get(1).is_some_and(|c| c.is_ascii_digit())
    })
}

/// Returns true if the filename contains a bonus-material keyword.
pub fn has_non_movie_keyword(filename: &str) -> bool {
    let normalized: String = filename
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { '.' } else { c })
        .collect();
    NON_MOVIE_KEYWORDS.iter().any(|k| normalized.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_dir_names() {
        assert_eq!(MediaType::Movies.dir_name(), "movies");
        assert_eq!(MediaType::TvShows.dir_name(), "tv_shows");
        assert_eq!(MediaType::Music.dir_name(), "music");
        assert_eq!(MediaType::Photos.dir_name(), "photos");
    }

    #[test]
    fn test_media_type_from_str() {
        assert_eq!("tv_shows".parse::<MediaType>(), Ok(MediaType::TvShows));
        assert!("unsorted".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("MKV"), ".mkv");
        assert_eq!(normalize_extension(".Mp4"), ".mp4");
    }

    #[test]
    fn test_movie_with_year_is_recognized() {
        let c = MediaClassifier::default();
        assert_eq!(
            c.classify(Path::new("/in/[YTS] The.Matrix.1999.1080p.BluRay.x264.mkv")),
            (MediaType::Movies, true)
        );
        assert_eq!(
            c.classify(Path::new("some film 1954 restored.avi")),
            (MediaType::Movies, true)
        );
    }

    #[test]
    fn test_episode_recognized_only_with_both_numbers() {
        let c = MediaClassifier::default();
        assert_eq!(
            c.classify(Path::new("Show.Name.S01E01.mkv")),
            (MediaType::TvShows, true)
        );
        // token present but no title in front of it, so nothing is captured
        assert_eq!(
            c.classify(Path::new("S01E01.mkv")),
            (MediaType::TvShows, false)
        );
    }

    #[test]
    fn test_video_without_pattern_is_unrecognized() {
        let c = MediaClassifier::default();
        assert_eq!(
            c.classify(Path::new("random-video-file.mp4")),
            (MediaType::Movies, false)
        );
    }

    #[test]
    fn test_audio_and_photo_never_recognized() {
        let c = MediaClassifier::default();
        assert_eq!(
            c.classify(Path::new("Artist - Song (1999).mp3")),
            (MediaType::Music, false)
        );
        assert_eq!(
            c.classify(Path::new("holiday 2015.JPG")),
            (MediaType::Photos, false)
        );
    }

    #[test]
    fn test_unknown_extension_falls_back_to_movies() {
        let c = MediaClassifier::default();
        assert_eq!(
            c.classify(Path::new("notes.2019.xyz")),
            (MediaType::Movies, false)
        );
    }

    #[test]
    fn test_non_movie_keyword_normalization() {
        assert!(has_non_movie_keyword("Film - Behind The Scenes.mkv"));
        assert!(has_non_movie_keyword("film.behind.the.scenes.mkv"));
        assert!(has_non_movie_keyword("film_deleted_scene_3.mkv"));
        assert!(has_non_movie_keyword("TRAILER.mp4"));
        assert!(!has_non_movie_keyword("The.Feature.mkv"));
    }

    #[test]
    fn test_episode_token_detection() {
        assert!(has_episode_token("x.s1e2.mkv"));
        assert!(has_episode_token("S10E100"));
        assert!(!has_episode_token("season one.mkv"));
        assert!(!has_episode_token("s01e.mkv"));
    }
}
