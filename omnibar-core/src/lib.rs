//! # Omnibar Core
//!
//! The staged command-resolution pipeline behind a command palette:
//! classify plugins into four typed pools, build one composite keyword
//! matcher, then resolve each keystroke through four short-circuiting
//! stages (regexp commands, single-token search, keyword commands,
//! fallback). Selection dispatch, session state, lifecycle hooks,
//! configuration, and record storage round out the core.

pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod matcher;
pub mod plugin;
pub mod session;
pub mod storage;
pub mod types;
pub mod usage;

// Re-export commonly used types at the crate root.
pub use classifier::{PluginCustomization, PluginVariant, Pools, RegexpCommand, classify};
pub use config::{GeneralConfig, OmnibarConfig};
pub use dispatch::{Dispatcher, HostMessage, HostMessenger, SelectionOutcome};
pub use engine::{ResolutionEngine, Resolved, StageOutcome};
pub use error::{ConfigError, OmnibarError, PipelineError, PluginError, Result, StorageError};
pub use lifecycle::{LifecycleEvent, LifecycleHooks, initial_input};
pub use matcher::{CompositeMatcher, ParsedInput};
pub use plugin::{BoundCommand, CommandSpec, EnterContext, MatchType, Plugin};
pub use session::{Session, SessionState};
pub use storage::{
    CONFIG_RECORD, FileStore, LAST_CMD_RECORD, MemoryStore, Storage, get_record, set_record,
};
pub use types::{DisplayItem, EnterOutcome, ItemKind, Resolution};
pub use usage::{QueryStat, UsageEntry, UsageRecord, UsageStore};
