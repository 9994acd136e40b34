//! The plugin capability pair and command descriptors.
//!
//! A plugin either exposes an ordered list of [`CommandSpec`] triggers or,
//! with no commands at all, acts as a contextual search provider for
//! single-token queries. Both roles implement the same async capability
//! pair: `on_input` produces candidates, `on_enter` reacts to a selection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::PluginError;
use crate::session::SessionState;
use crate::types::{DisplayItem, EnterOutcome, Resolution};

/// How a command's trigger is matched against the input.
///
/// An unrecognized or missing value decays to `Keyword`; several shipped
/// plugin descriptors historically relied on that default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Keyword,
    Regexp,
    Other,
}

impl<'de> Deserialize<'de> for MatchType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "regexp" => MatchType::Regexp,
            "other" => MatchType::Other,
            _ => MatchType::Keyword,
        })
    }
}

/// A single trigger definition owned by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Trigger string; unique among keyword commands.
    pub key: String,
    #[serde(default, rename = "type")]
    pub match_type: MatchType,
    /// Alternate-behavior toggle for the command's enter handler.
    #[serde(default)]
    pub shift_flag: bool,
    /// Pattern source; present only for regexp-type commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Icon URL shown next to results from this command.
    #[serde(default)]
    pub icon: String,
}

impl CommandSpec {
    /// Create a keyword command with the given trigger.
    pub fn keyword(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            match_type: MatchType::Keyword,
            shift_flag: false,
            regex: None,
            title: title.into(),
            subtitle: String::new(),
            icon: String::new(),
        }
    }

    /// Create a regexp command with the given pattern source.
    pub fn regexp(
        key: impl Into<String>,
        pattern: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            match_type: MatchType::Regexp,
            shift_flag: false,
            regex: Some(pattern.into()),
            title: title.into(),
            subtitle: String::new(),
            icon: String::new(),
        }
    }

    /// Create a fallback ("other") command.
    pub fn fallback(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            match_type: MatchType::Other,
            shift_flag: false,
            regex: None,
            title: title.into(),
            subtitle: String::new(),
            icon: String::new(),
        }
    }

    /// Set the subtitle shown under suggestion items.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Set the icon URL.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Enable the shift-flag alternate behavior.
    pub fn with_shift(mut self) -> Self {
        self.shift_flag = true;
        self
    }
}

/// Everything a plugin's enter handler needs about the selection.
pub struct EnterContext<'a> {
    /// The selected item.
    pub item: &'a DisplayItem,
    /// The active command, if the selection happened under one.
    pub command: Option<&'a CommandSpec>,
    /// The query part of the current input.
    pub query: &'a str,
    /// Whether the shift-flag alternate behavior is requested.
    pub shift: bool,
    /// The full rendered list the selection was made from.
    pub list: &'a [DisplayItem],
    /// How many list entries a shift-variant handler may act on.
    pub max_operands: usize,
}

/// The capability pair every command plugin and search provider implements.
///
/// Handlers receive the session state explicitly rather than an implicit
/// calling context; the engine passes a snapshot taken for the resolution
/// that invoked them.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Monotonic code version, compared against persisted customization.
    fn version(&self) -> u32;

    /// Icon URL for this plugin's suggestion items.
    fn icon(&self) -> &str {
        ""
    }

    /// Built-in command descriptors. `None` marks a search provider.
    fn commands(&self) -> Option<Vec<CommandSpec>> {
        None
    }

    /// Host this search provider is tied to, if any. Host-specific providers
    /// are queried ahead of generic ones in embedded contexts.
    fn host(&self) -> Option<&str> {
        None
    }

    /// Whether the palette stays open after this plugin handles a selection.
    fn keep_panel_open(&self) -> bool {
        false
    }

    /// Produce candidates for the current input.
    ///
    /// For keyword commands `query` is the parsed remainder after the
    /// trigger; for regexp and fallback commands it is the raw input; for
    /// search providers it is the single-token query.
    async fn on_input(
        &self,
        query: &str,
        command: Option<&CommandSpec>,
        session: &SessionState,
    ) -> Result<Resolution, PluginError>;

    /// React to a selected item while one of this plugin's commands is
    /// active.
    async fn on_enter(
        &self,
        ctx: EnterContext<'_>,
        session: &SessionState,
    ) -> Result<EnterOutcome, PluginError> {
        let _ = (ctx, session);
        Ok(EnterOutcome::Done)
    }
}

/// A command spec bound to its owning plugin.
///
/// The plugin reference is a dispatch back-reference, not ownership: the
/// pools hold the plugins, commands only need to reach their handlers.
#[derive(Clone)]
pub struct BoundCommand {
    pub spec: CommandSpec,
    pub plugin: Arc<dyn Plugin>,
}

impl BoundCommand {
    pub fn new(spec: CommandSpec, plugin: Arc<dyn Plugin>) -> Self {
        Self { spec, plugin }
    }

    /// Name of the owning plugin.
    pub fn plugin_name(&self) -> &str {
        self.plugin.name()
    }

    /// Icon for this command: the spec's own, falling back to the plugin's.
    pub fn icon(&self) -> &str {
        if self.spec.icon.is_empty() {
            self.plugin.icon()
        } else {
            &self.spec.icon
        }
    }
}

impl std::fmt::Debug for BoundCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCommand")
            .field("spec", &self.spec)
            .field("plugin", &self.plugin.name())
            .finish()
    }
}
