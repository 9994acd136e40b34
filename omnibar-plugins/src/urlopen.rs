//! Regexp command that intercepts URL-shaped input.
//!
//! Typing an address straight into the palette resolves before any keyword
//! parsing happens, so `docs.rs/regex` never falls through to the search or
//! fallback stages.

use async_trait::async_trait;
use tracing::warn;
use url::Url;

use omnibar_core::error::PluginError;
use omnibar_core::plugin::{CommandSpec, EnterContext, Plugin};
use omnibar_core::session::SessionState;
use omnibar_core::types::{DisplayItem, EnterOutcome, Resolution};

/// Matches `host.tld`, optionally with a scheme and a path, and nothing
/// with whitespace in it.
const URL_PATTERN: &str = r"^(?:https?://)?[\w-]+(?:\.[\w-]+)+(?:/\S*)?$";

/// The `goto` regexp command.
pub struct UrlOpenPlugin;

impl UrlOpenPlugin {
    /// Normalize the typed address to an absolute URL.
    fn normalize(input: &str) -> Option<String> {
        let candidate = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{input}")
        };
        Url::parse(&candidate).ok().map(|url| url.to_string())
    }
}

#[async_trait]
impl Plugin for UrlOpenPlugin {
    fn name(&self) -> &str {
        "goto"
    }

    fn version(&self) -> u32 {
        3
    }

    fn commands(&self) -> Option<Vec<CommandSpec>> {
        Some(vec![
            CommandSpec::regexp("goto", URL_PATTERN, "Open URL")
                .with_subtitle("Open the typed address"),
        ])
    }

    async fn on_input(
        &self,
        query: &str,
        _command: Option<&CommandSpec>,
        _session: &SessionState,
    ) -> Result<Resolution, PluginError> {
        let Some(url) = Self::normalize(query) else {
            return Ok(Resolution::Items(Vec::new()));
        };
        let item = DisplayItem::link(query, "", format!("Open {url}"), url);
        Ok(Resolution::Items(vec![item]))
    }

    async fn on_enter(
        &self,
        ctx: EnterContext<'_>,
        _session: &SessionState,
    ) -> Result<EnterOutcome, PluginError> {
        if let Some(url) = &ctx.item.url {
            if let Err(err) = open::that(url) {
                warn!(url = %url, error = %err, "failed to open url");
            }
        }
        Ok(EnterOutcome::Done)
    }
}
