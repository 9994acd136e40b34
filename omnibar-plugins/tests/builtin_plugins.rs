//! Integration tests for the built-in plugin set running through the full
//! pipeline: classification, the composite matcher, and all four stages.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;

use omnibar_core::{
    CommandSpec, DisplayItem, ItemKind, MemoryStore, Plugin, PluginError, Resolution,
    ResolutionEngine, Session, SessionState, classify,
};
use omnibar_plugins::{HelpPlugin, UrlOpenPlugin, WebSearchPlugin, default_sites, registry};

// ── Fixtures ─────────────────────────────────────────────────────────────

/// A bookmark-style keyword plugin standing in for a real browser plugin.
struct BookmarkStub;

#[async_trait]
impl Plugin for BookmarkStub {
    fn name(&self) -> &str {
        "bookmark"
    }

    fn version(&self) -> u32 {
        4
    }

    fn commands(&self) -> Option<Vec<CommandSpec>> {
        Some(vec![
            CommandSpec::keyword("bm", "Bookmarks")
                .with_subtitle("search bookmarks")
                .with_shift(),
        ])
    }

    async fn on_input(
        &self,
        query: &str,
        command: Option<&CommandSpec>,
        _session: &SessionState,
    ) -> Result<Resolution, PluginError> {
        let key = command.map(|c| c.key.as_str()).unwrap_or_default();
        Ok(Resolution::Items(vec![DisplayItem::for_command(
            key,
            "1",
            "",
            format!("Bookmark for {query}"),
            "",
        )]))
    }
}

fn assemble() -> Vec<Arc<dyn Plugin>> {
    let base: Vec<Arc<dyn Plugin>> = vec![
        Arc::new(UrlOpenPlugin),
        Arc::new(WebSearchPlugin::default()),
        Arc::new(BookmarkStub),
    ];
    let help: Arc<dyn Plugin> = Arc::new(HelpPlugin::from_plugins(&base));
    let mut plugins = base;
    plugins.push(help);
    plugins
}

fn engine(session: Session) -> ResolutionEngine {
    let plugins = assemble();
    let host_providers = registry(default_sites());
    let pools = classify(
        &plugins,
        &HashMap::new(),
        session.host_context().map(str::to_string).as_deref(),
        &host_providers,
    );
    ResolutionEngine::new(pools, Arc::new(session), Arc::new(MemoryStore::new())).unwrap()
}

// ── Stage coverage over the shipped set ──────────────────────────────────

#[tokio::test]
async fn typed_address_is_intercepted_before_everything_else() {
    let engine = engine(Session::new());
    let resolved = engine.resolve("docs.rs/regex").await;
    let items = resolved.resolution.items();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ItemKind::Url);
    assert_eq!(items[0].url.as_deref(), Some("https://docs.rs/regex"));

    // The regexp stage marked its command active.
    let state = engine.session().snapshot().await;
    assert_eq!(state.cmd, "goto");
}

#[tokio::test]
async fn keyword_command_still_works_alongside_builtins() {
    let engine = engine(Session::new());
    let resolved = engine.resolve("bm rust book").await;
    let items = resolved.resolution.items();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Bookmark for rust book");
    assert_eq!(items[0].key, "bm");
}

#[tokio::test]
async fn help_command_lists_keyword_triggers() {
    let engine = engine(Session::new());
    let resolved = engine.resolve("? book").await;
    let items = resolved.resolution.items();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ItemKind::Plugins);
    assert_eq!(items[0].id, "bm");
    assert_eq!(items[0].title, "bm: Bookmarks");
}

#[tokio::test]
async fn unmatched_multiword_input_falls_back_to_web_search() {
    let engine = engine(Session::new());
    let resolved = engine.resolve("how to exit vim").await;
    let items = resolved.resolution.items();

    assert_eq!(items.len(), 3);
    assert!(items[0].title.starts_with("Search Google"));
    assert_eq!(
        items[0].url.as_deref(),
        Some("https://www.google.com/search?q=how%20to%20exit%20vim")
    );
    let state = engine.session().snapshot().await;
    assert_eq!(state.cmd, "search");
}

#[tokio::test]
async fn embedded_host_gets_its_site_provider() {
    let engine = engine(Session::embedded("github.com"));
    let resolved = engine.resolve("tokio").await;
    let items = resolved.resolution.items();

    // Single token, no name match: the GitHub provider is the only
    // stage-2 contributor for this host.
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Search GitHub for \"tokio\"");
    assert_eq!(
        items[0].url.as_deref(),
        Some("https://github.com/search?q=tokio")
    );
}

#[tokio::test]
async fn standalone_single_token_reaches_the_fallback() {
    // Without an embedding host there are no providers, "tokio" matches no
    // trigger, so the fallback produces the search candidates.
    let engine = engine(Session::new());
    let resolved = engine.resolve("tokio").await;
    let items = resolved.resolution.items();

    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.kind == ItemKind::Url));
}

#[tokio::test]
async fn single_token_matching_a_trigger_suggests_it() {
    let engine = engine(Session::new());
    let resolved = engine.resolve("b").await;
    let items = resolved.resolution.items();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ItemKind::Plugins);
    assert_eq!(items[0].id, "bm");
}
