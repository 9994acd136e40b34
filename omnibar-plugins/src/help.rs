//! The `?` help command: lists every registered keyword command.

use async_trait::async_trait;
use std::sync::Arc;

use omnibar_core::error::PluginError;
use omnibar_core::plugin::{CommandSpec, MatchType, Plugin};
use omnibar_core::session::SessionState;
use omnibar_core::types::{DisplayItem, Resolution};

/// One catalog row shown by the help command.
#[derive(Debug, Clone, PartialEq)]
pub struct HelpEntry {
    pub key: String,
    pub title: String,
    pub subtitle: String,
    pub icon: String,
}

/// Keyword command `?` over a catalog collected from the other plugins.
///
/// Selecting an entry suggests switching to that command, so the palette
/// stays open after dispatch.
pub struct HelpPlugin {
    catalog: Vec<HelpEntry>,
}

impl HelpPlugin {
    pub fn new(catalog: Vec<HelpEntry>) -> Self {
        Self { catalog }
    }

    /// Collect the catalog from the keyword commands of a plugin set.
    pub fn from_plugins(plugins: &[Arc<dyn Plugin>]) -> Self {
        let mut catalog = Vec::new();
        for plugin in plugins {
            let Some(commands) = plugin.commands() else {
                continue;
            };
            for spec in commands {
                if spec.match_type != MatchType::Keyword {
                    continue;
                }
                let icon = if spec.icon.is_empty() {
                    plugin.icon().to_string()
                } else {
                    spec.icon.clone()
                };
                catalog.push(HelpEntry {
                    key: spec.key,
                    title: spec.title,
                    subtitle: spec.subtitle,
                    icon,
                });
            }
        }
        Self::new(catalog)
    }
}

#[async_trait]
impl Plugin for HelpPlugin {
    fn name(&self) -> &str {
        "help"
    }

    fn version(&self) -> u32 {
        2
    }

    fn commands(&self) -> Option<Vec<CommandSpec>> {
        Some(vec![
            CommandSpec::keyword("?", "Help").with_subtitle("List available commands"),
        ])
    }

    fn keep_panel_open(&self) -> bool {
        true
    }

    async fn on_input(
        &self,
        query: &str,
        _command: Option<&CommandSpec>,
        _session: &SessionState,
    ) -> Result<Resolution, PluginError> {
        let query = query.to_lowercase();
        let items = self
            .catalog
            .iter()
            .filter(|entry| {
                query.is_empty()
                    || entry.key.to_lowercase().contains(&query)
                    || entry.title.to_lowercase().contains(&query)
            })
            .map(|entry| {
                DisplayItem::suggestion(
                    entry.key.clone(),
                    entry.icon.clone(),
                    format!("{}: {}", entry.key, entry.title),
                    entry.subtitle.clone(),
                )
            })
            .collect();
        Ok(Resolution::Items(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnibar_core::types::ItemKind;

    fn help() -> HelpPlugin {
        HelpPlugin::new(vec![
            HelpEntry {
                key: "bm".into(),
                title: "Bookmarks".into(),
                subtitle: "search bookmarks".into(),
                icon: String::new(),
            },
            HelpEntry {
                key: "on".into(),
                title: "Enable extension".into(),
                subtitle: String::new(),
                icon: String::new(),
            },
        ])
    }

    #[tokio::test]
    async fn test_empty_query_lists_everything() {
        let resolution = help()
            .on_input("", None, &SessionState::default())
            .await
            .unwrap();
        let items = resolution.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, ItemKind::Plugins);
        assert_eq!(items[0].title, "bm: Bookmarks");
    }

    #[tokio::test]
    async fn test_query_filters_by_key_and_title() {
        let resolution = help()
            .on_input("book", None, &SessionState::default())
            .await
            .unwrap();
        let items = resolution.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "bm");
    }

    #[tokio::test]
    async fn test_from_plugins_collects_keyword_commands_only() {
        struct Mixed;

        #[async_trait]
        impl Plugin for Mixed {
            fn name(&self) -> &str {
                "mixed"
            }

            fn version(&self) -> u32 {
                1
            }

            fn commands(&self) -> Option<Vec<CommandSpec>> {
                Some(vec![
                    CommandSpec::keyword("bm", "Bookmarks"),
                    CommandSpec::regexp("dl", "^magnet:", "Download"),
                    CommandSpec::fallback("search", "Web search"),
                ])
            }

            async fn on_input(
                &self,
                _query: &str,
                _command: Option<&CommandSpec>,
                _session: &SessionState,
            ) -> Result<Resolution, PluginError> {
                Ok(Resolution::Empty)
            }
        }

        let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(Mixed)];
        let help = HelpPlugin::from_plugins(&plugins);
        assert_eq!(help.catalog.len(), 1);
        assert_eq!(help.catalog[0].key, "bm");
    }

    #[test]
    fn test_help_keeps_panel_open() {
        assert!(help().keep_panel_open());
    }
}
