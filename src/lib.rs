//! mediatidy - rename and relocate media files into a canonical library layout
//!
//! Structural metadata (title, year, season/episode, quality, codec) is read
//! from filenames only. Files are classified by media type, given canonical
//! names, and moved together with their subtitles, artwork and metadata into
//! `<library>/<type>/...`. Anything without a confident match goes to an
//! `unorganized` branch that keeps a trace of where it came from.

pub mod associated;
pub mod cli;
pub mod config;
pub mod directory_planner;
pub mod file_category;
pub mod file_organizer;
pub mod janitor;
pub mod logging;
pub mod move_plan;
pub mod naming;
pub mod output;
pub mod pattern;
pub mod plan_manager;
pub mod scanner;
pub mod undo;

pub use associated::AssociatedFileResolver;
pub use config::{CompiledFilters, ConfigError, OrganizerConfig};
pub use directory_planner::DirectoryPlanner;
pub use file_category::{MediaClassifier, MediaType};
pub use file_organizer::{ExecutionReport, MoveExecutor, OrganizeError, OrganizeResult};
pub use janitor::{CleanupStats, DirectoryJanitor};
pub use move_plan::{AssociatedMove, MovePlan, MovePlanner};
pub use naming::NameSynthesizer;
pub use pattern::{PatternExtractor, PatternInfo};
pub use plan_manager::PlanManager;
pub use scanner::MediaScanner;
pub use undo::{UndoManager, UndoReport};

pub use cli::{Cli, Command, run_cli};
