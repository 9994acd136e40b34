//! The web-search fallback command.
//!
//! Registered as an "other"-type command, so it only runs when no earlier
//! stage resolved; the raw input reaches it verbatim and becomes one search
//! candidate per configured engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use omnibar_core::error::PluginError;
use omnibar_core::plugin::{CommandSpec, EnterContext, Plugin};
use omnibar_core::session::SessionState;
use omnibar_core::types::{DisplayItem, EnterOutcome, Resolution};

/// One search engine. `query_url` contains a `%s` placeholder for the
/// encoded query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSpec {
    pub name: String,
    pub query_url: String,
    #[serde(default)]
    pub icon: String,
}

/// Fallback command producing a search candidate per engine.
pub struct WebSearchPlugin {
    engines: Vec<EngineSpec>,
}

impl WebSearchPlugin {
    pub fn new(engines: Vec<EngineSpec>) -> Self {
        Self { engines }
    }

    /// The engine set shipped by default.
    pub fn default_engines() -> Vec<EngineSpec> {
        vec![
            EngineSpec {
                name: "Google".into(),
                query_url: "https://www.google.com/search?q=%s".into(),
                icon: String::new(),
            },
            EngineSpec {
                name: "DuckDuckGo".into(),
                query_url: "https://duckduckgo.com/?q=%s".into(),
                icon: String::new(),
            },
            EngineSpec {
                name: "Bing".into(),
                query_url: "https://www.bing.com/search?q=%s".into(),
                icon: String::new(),
            },
        ]
    }
}

impl Default for WebSearchPlugin {
    fn default() -> Self {
        Self::new(Self::default_engines())
    }
}

#[async_trait]
impl Plugin for WebSearchPlugin {
    fn name(&self) -> &str {
        "websearch"
    }

    fn version(&self) -> u32 {
        2
    }

    fn commands(&self) -> Option<Vec<CommandSpec>> {
        Some(vec![
            CommandSpec::fallback("search", "Web search")
                .with_subtitle("Search the web for anything else"),
        ])
    }

    async fn on_input(
        &self,
        query: &str,
        _command: Option<&CommandSpec>,
        _session: &SessionState,
    ) -> Result<Resolution, PluginError> {
        let encoded = urlencoding::encode(query);
        let items = self
            .engines
            .iter()
            .map(|engine| {
                DisplayItem::link(
                    &engine.name,
                    &engine.icon,
                    format!("Search {} for \"{query}\"", engine.name),
                    engine.query_url.replace("%s", encoded.as_ref()),
                )
            })
            .collect();
        Ok(Resolution::Items(items))
    }

    async fn on_enter(
        &self,
        ctx: EnterContext<'_>,
        _session: &SessionState,
    ) -> Result<EnterOutcome, PluginError> {
        if let Some(url) = &ctx.item.url {
            if let Err(err) = open::that(url) {
                warn!(url = %url, error = %err, "failed to open search url");
            }
        }
        Ok(EnterOutcome::Done)
    }
}
