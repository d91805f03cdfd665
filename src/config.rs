//! Organizer configuration.
//!
//! Configuration is loaded from TOML files and covers the extension lists used
//! for classification, the output layout, scan exclusions and logging.
//!
//! # Configuration File Format
//!
//! ```toml
//! [advanced]
//! video_extensions = [".mkv", ".mp4"]
//! audio_extensions = [".mp3", ".flac"]
//! photo_extensions = [".jpg", ".png"]
//! ignore_patterns = ["*.part", "**/.Trash/**"]
//!
//! [organization]
//! output_directory = "organized_media"
//! organize_by = "type"
//!
//! [organization.output_directories]
//! movies = "/mnt/films"
//!
//! [logging]
//! level = "info"
//! file = "logs/mediatidy.log"
//! ```

use crate::file_category::MediaType;
use glob::Pattern;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid ignore pattern '{}'", pattern)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// How the output tree is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizeBy {
    /// One subtree per media type.
    #[default]
    Type,
    /// Everything directly in the output directory.
    None,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub advanced: AdvancedSettings,
    #[serde(default)]
    pub organization: OrganizationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Extension lists and scan exclusions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSettings {
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
    #[serde(default = "default_photo_extensions")]
    pub photo_extensions: Vec<String>,
    /// Glob patterns matched against full paths; matches are never scanned.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

/// Output layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSettings {
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
    /// Per-category override roots, keyed by category directory name.
    #[serde(default)]
    pub output_directories: BTreeMap<MediaType, PathBuf>,
    #[serde(default)]
    pub organize_by: OrganizeBy,
}

/// Log sink settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn to_strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_video_extensions() -> Vec<String> {
    to_strings(&[
        ".mkv", ".mp4", ".avi", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".mpg", ".mpeg", ".ts",
        ".m2ts",
    ])
}

fn default_audio_extensions() -> Vec<String> {
    to_strings(&[
        ".mp3", ".flac", ".wav", ".aac", ".ogg", ".m4a", ".wma", ".opus", ".alac",
    ])
}

fn default_photo_extensions() -> Vec<String> {
    to_strings(&[
        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".webp", ".heic", ".raw",
        ".cr2", ".nef",
    ])
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("organized_media")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            video_extensions: default_video_extensions(),
            audio_extensions: default_audio_extensions(),
            photo_extensions: default_photo_extensions(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            output_directories: BTreeMap::new(),
            organize_by: OrganizeBy::Type,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.mediatidy.toml` in the current directory
    /// 3. Look for `~/.config/mediatidy/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any file that is found fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".mediatidy.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("mediatidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Looks up a value by dotted key (`"organization.organize_by"`), returning
    /// `default` when the key is missing or has a different shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediatidy::config::OrganizerConfig;
    ///
    /// let config = OrganizerConfig::default();
    /// let by: String = config.get("organization.organize_by", String::new());
    /// assert_eq!(by, "type");
    /// let missing: u32 = config.get("organization.nope", 7);
    /// assert_eq!(missing, 7);
    /// ```
    pub fn get<T: DeserializeOwned>(&self, dotted_key: &str, default: T) -> T {
        let Ok(mut value) = toml::Value::try_from(self) else {
            return default;
        };
        for key in dotted_key.split('.') {
            match value.get(key) {
                Some(next) => value = next.clone(),
                None => return default,
            }
        }
        value.try_into().unwrap_or(default)
    }

    /// Returns the override root configured for a media type, if any.
    pub fn output_directory_for(&self, media_type: MediaType) -> Option<&Path> {
        self.organization
            .output_directories
            .get(&media_type)
            .map(PathBuf::as_path)
    }

    /// Compile the scan exclusions into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob pattern is invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.advanced.ignore_patterns)
    }
}

/// Pre-compiled scan exclusions.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    ignore_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let ignore_patterns = patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ignore_patterns })
    }

    /// Check if a path should be scanned.
    ///
    /// A pattern matches either the full path or the bare file name.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        !self
            .ignore_patterns
            .iter()
            .any(|p| p.matches_path(file_path) || p.matches(&file_name))
    }
}
