//! Core type definitions for the Omnibar pipeline.
//!
//! Defines the fundamental data structures shared across the system:
//! display items, resolution outcomes, and selection results.

use serde::{Deserialize, Serialize};

/// The kind of a rendered item, used by selection dispatch when no command
/// is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A suggestion to switch to a keyword command ("plugins" in the wire
    /// shape); selecting it re-fills the input with `"<key> "`.
    Plugins,
    /// Selecting the item opens its URL payload.
    Url,
    /// Selecting the item copies its URL payload to the clipboard.
    Copy,
    /// Selecting the item forwards it to the embedding host.
    Action,
    /// An item owned by an active command; dispatch delegates to the
    /// command's plugin.
    Command,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Plugins => write!(f, "plugins"),
            ItemKind::Url => write!(f, "url"),
            ItemKind::Copy => write!(f, "copy"),
            ItemKind::Action => write!(f, "action"),
            ItemKind::Command => write!(f, "command"),
        }
    }
}

/// A single renderable entry produced by the pipeline or a plugin.
///
/// The `{key, id, icon, title, desc, is_warn}` shape is the stable contract
/// between the pipeline/plugins and the rendering layer. `kind` and `url`
/// carry the dispatch payload that the original wire shape encoded in
/// `data-*` attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub kind: ItemKind,
    /// The owning command key, or the kind tag for command-less items.
    pub key: String,
    pub id: String,
    /// Icon URL.
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub is_warn: bool,
    /// Payload for `Url` and `Copy` items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DisplayItem {
    /// Create a plugin-keyword suggestion item.
    pub fn suggestion(
        key: impl Into<String>,
        icon: impl Into<String>,
        title: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            kind: ItemKind::Plugins,
            id: key.clone(),
            key,
            icon: icon.into(),
            title: title.into(),
            desc: desc.into(),
            is_warn: false,
            url: None,
        }
    }

    /// Create an item that opens a URL when selected.
    pub fn link(
        id: impl Into<String>,
        icon: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            kind: ItemKind::Url,
            key: ItemKind::Url.to_string(),
            id: id.into(),
            icon: icon.into(),
            title: title.into(),
            desc: url.clone(),
            is_warn: false,
            url: Some(url),
        }
    }

    /// Create an item owned by a command, for command-stage results.
    pub fn for_command(
        key: impl Into<String>,
        id: impl Into<String>,
        icon: impl Into<String>,
        title: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            kind: ItemKind::Command,
            key: key.into(),
            id: id.into(),
            icon: icon.into(),
            title: title.into(),
            desc: desc.into(),
            is_warn: false,
            url: None,
        }
    }

    /// Attach a URL payload to the item.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Mark the item as a warning entry.
    pub fn warn(mut self) -> Self {
        self.is_warn = true;
        self
    }
}

/// The terminal outcome of one resolution pass, or of one plugin input
/// handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Render these items.
    Items(Vec<DisplayItem>),
    /// A side effect already happened; keep the current render untouched.
    Deferred,
    /// Nothing matched anywhere; render "no results".
    Empty,
}

impl Resolution {
    /// The rendered items, if any.
    pub fn items(&self) -> &[DisplayItem] {
        match self {
            Resolution::Items(items) => items,
            _ => &[],
        }
    }

    /// True when the resolution carries no renderable items.
    pub fn is_empty(&self) -> bool {
        match self {
            Resolution::Items(items) => items.is_empty(),
            Resolution::Deferred => false,
            Resolution::Empty => true,
        }
    }
}

/// What a plugin's enter handler asks the controller to do afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// The side effect is complete.
    Done,
    /// Re-run resolution for the current input and re-render.
    Refresh,
}
