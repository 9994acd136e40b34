//! Controller lifecycle events the pipeline attaches to.
//!
//! The autocomplete controller owns the text box and fires these events;
//! the pipeline (and the embedder) register handlers that run in
//! registration order. `initial_input` implements the shipped `Init`
//! behavior: pre-filling the box from the cached last command or the
//! configured default plugin.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::classifier::Pools;
use crate::config::OmnibarConfig;
use crate::storage::{LAST_CMD_RECORD, Storage, get_record};

/// The five controller lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// First render after setup.
    Init,
    /// An item was chosen.
    Enter,
    /// The query was cleared.
    Empty,
    /// The list became visible.
    Show,
    /// The list was hidden.
    Clear,
}

type Handler = Box<dyn Fn(LifecycleEvent) + Send + Sync>;

/// Per-event handler registry, fired in registration order.
#[derive(Default)]
pub struct LifecycleHooks {
    handlers: HashMap<LifecycleEvent, Vec<Handler>>,
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event.
    pub fn bind<F>(&mut self, event: LifecycleEvent, handler: F)
    where
        F: Fn(LifecycleEvent) + Send + Sync + 'static,
    {
        self.handlers
            .entry(event)
            .or_default()
            .push(Box::new(handler));
    }

    /// Fire all handlers bound to `event`, in registration order. Returns
    /// how many ran.
    pub fn fire(&self, event: LifecycleEvent) -> usize {
        match self.handlers.get(&event) {
            Some(handlers) => {
                for handler in handlers {
                    handler(event);
                }
                handlers.len()
            }
            None => 0,
        }
    }
}

/// Text to pre-fill the input with on `Init`, if any.
///
/// With `cache_last_cmd` set, the stored last-used command text wins.
/// Otherwise, when `default_plugin` names a registered command plugin, its
/// first keyword command is offered as `"<key> "`.
pub async fn initial_input(
    config: &OmnibarConfig,
    pools: &Pools,
    storage: &dyn Storage,
) -> Option<String> {
    if config.general.cache_last_cmd {
        return get_record::<String>(storage, LAST_CMD_RECORD)
            .await
            .ok()
            .flatten();
    }

    let name = config.general.default_plugin.as_deref()?;
    pools
        .keyword_commands
        .values()
        .find(|command| command.plugin_name() == name)
        .map(|command| format!("{} ", command.spec.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::error::PluginError;
    use crate::plugin::{CommandSpec, Plugin};
    use crate::session::SessionState;
    use crate::storage::{MemoryStore, set_record};
    use crate::types::Resolution;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NamedPlugin {
        name: &'static str,
        key: &'static str,
    }

    #[async_trait]
    impl Plugin for NamedPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn version(&self) -> u32 {
            1
        }

        fn commands(&self) -> Option<Vec<CommandSpec>> {
            Some(vec![CommandSpec::keyword(self.key, self.name)])
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

    fn pools_with(name: &'static str, key: &'static str) -> Pools {
        let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(NamedPlugin { name, key })];
        classify(
            &plugins,
            &std::collections::HashMap::new(),
            None,
            &std::collections::HashMap::new(),
        )
    }

    #[test]
    fn test_hooks_fire_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut hooks = LifecycleHooks::new();

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            hooks.bind(LifecycleEvent::Show, move |_| {
                order.lock().unwrap().push(tag);
            });
        }

        assert_eq!(hooks.fire(LifecycleEvent::Show), 3);
        assert_eq!(order.lock().unwrap().as_slice(), &["first", "second", "third"]);
    }

    #[test]
    fn test_unbound_event_fires_nothing() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut hooks = LifecycleHooks::new();
        let seen = Arc::clone(&counter);
        hooks.bind(LifecycleEvent::Enter, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(hooks.fire(LifecycleEvent::Empty), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initial_input_prefers_cached_last_command() {
        let store = MemoryStore::new();
        set_record(&store, LAST_CMD_RECORD, &"bm rust").await.unwrap();

        let config = OmnibarConfig::default();
        let pools = pools_with("bookmark", "bm");
        let input = initial_input(&config, &pools, &store).await;
        assert_eq!(input.as_deref(), Some("bm rust"));
    }

    #[tokio::test]
    async fn test_initial_input_default_plugin_prefill() {
        let store = MemoryStore::new();
        let mut config = OmnibarConfig::default();
        config.general.cache_last_cmd = false;
        config.general.default_plugin = Some("bookmark".into());

        let pools = pools_with("bookmark", "bm");
        let input = initial_input(&config, &pools, &store).await;
        assert_eq!(input.as_deref(), Some("bm "));
    }

    #[tokio::test]
    async fn test_initial_input_nothing_configured() {
        let store = MemoryStore::new();
        let mut config = OmnibarConfig::default();
        config.general.cache_last_cmd = false;

        let pools = pools_with("bookmark", "bm");
        assert_eq!(initial_input(&config, &pools, &store).await, None);
    }
}
