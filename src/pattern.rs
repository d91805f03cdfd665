//! Filename pattern extraction.
//!
//! Parses a media filename into structural tokens (title, year, season,
//! episode, quality, codec). Every cascade here is an ordered list where the
//! first match wins, so the order of each table is part of the observable
//! behavior.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Structural tokens extracted from a filename.
///
/// All fields are empty strings when nothing matched. `season` and `episode`
/// keep the literal digits that were captured (`"01"` stays `"01"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInfo {
    pub title: String,
    pub year: String,
    pub season: String,
    pub episode: String,
    pub quality: String,
    pub codec: String,
}

impl PatternInfo {
    /// True when both a season and an episode number were captured.
    pub fn has_episode(&self) -> bool {
        !self.season.is_empty() && !self.episode.is_empty()
    }
}

static GROUP_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\[[^\]]*\]|\{[^}]*\})\s*").unwrap());

static TV_DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)[.\s]S(\d+)E(\d+)").unwrap());
static TV_DASHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)\s*-\s*S(\d+)E(\d+)").unwrap());
static TRAILING_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*$").unwrap());

// Years 1880-2030 that are not glued to other digits. The regex crate has no
// look-around, so the boundary is matched as a non-capturing group.
const YEAR: &str = r"(188\d|189\d|19\d\d|20[0-2]\d|2030)";

static MOVIE_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\((\d{4})\)").unwrap());
// Greedy title: the last dotted year wins, so `Death.Race.2000.1975` keeps
// `2000` in the title.
static MOVIE_DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(.+)\.{YEAR}(?:\D|$)")).unwrap());
static BARE_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?:^|\D){YEAR}(?:\D|$)")).unwrap());

static Q_4K: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)2160p|4K|UHD").unwrap());
static Q_1080: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)1080p|FHD|FullHD").unwrap());
static Q_720: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)720p|HD").unwrap());
static Q_480: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)480p|SD").unwrap());

static C_HEVC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bHEVC\b|\bx265\b|H\.265").unwrap());
static C_AVC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAVC\b|\bx264\b|H\.264").unwrap());
static C_XVID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bXVID\b|DivX").unwrap());

/// A `(predicate, result)` pair in an ordered detection cascade.
struct Marker {
    regex: &'static LazyLock<Regex>,
    label: &'static str,
}

/// Quality markers, highest priority first.
static QUALITY_MARKERS: &[Marker] = &[
    Marker { regex: &Q_4K, label: "4K" },
    Marker { regex: &Q_1080, label: "1080p" },
    Marker { regex: &Q_720, label: "720p" },
    Marker { regex: &Q_480, label: "480p" },
];

/// Codec markers, highest priority first.
static CODEC_MARKERS: &[Marker] = &[
    Marker { regex: &C_HEVC, label: "HEVC" },
    Marker { regex: &C_AVC, label: "AVC" },
    Marker { regex: &C_XVID, label: "XVID" },
];

/// Stateless filename parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    /// Extracts structural tokens from a filename. Never fails; anything that
    /// does not match stays empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediatidy::pattern::PatternExtractor;
    ///
    /// let info = PatternExtractor::extract("Show.Name.S02E15.720p.x264.mkv");
    /// assert_eq!(info.title, "Show.Name");
    /// assert_eq!(info.season, "02");
    /// assert_eq!(info.episode, "15");
    /// assert_eq!(info.codec, "AVC");
    /// ```
    pub fn extract(filename: &str) -> PatternInfo {
        let name = GROUP_TAG_RE.replace(filename, "");
        let name = name.as_ref();

        let mut info = PatternInfo::default();

        if !Self::extract_episode(name, &mut info) {
            Self::extract_movie(name, &mut info);
        }

        info.quality = first_marker(QUALITY_MARKERS, name);
        info.codec = first_marker(CODEC_MARKERS, name);

        info
    }

    fn extract_episode(name: &str, info: &mut PatternInfo) -> bool {
        for re in [&TV_DOTTED_RE, &TV_DASHED_RE] {
            if let Some(caps) = re.captures(name) {
                let title = caps[1].trim();
                info.title = TRAILING_DASH_RE.replace(title, "").into_owned();
                info.season = caps[2].to_string();
                info.episode = caps[3].to_string();
                return true;
            }
        }
        false
    }

    fn extract_movie(name: &str, info: &mut PatternInfo) {
        for re in [&MOVIE_PAREN_RE, &MOVIE_DOTTED_RE] {
            if let Some(caps) = re.captures(name) {
                info.title = caps[1].trim().to_string();
                info.year = caps[2].to_string();
                return;
            }
        }

        if let Some(caps) = BARE_YEAR_RE.captures(name)
            && let Some(year) = caps.get(1)
        {
            info.year = year.as_str().to_string();
            info.title = name[..year.start()].trim().to_string();
        }
    }
}

fn first_marker(markers: &[Marker], name: &str) -> String {
    markers
        .iter()
        .find(|m| m.regex.is_match(name))
        .map(|m| m.label.to_string())
        .unwrap_or_default()
}
