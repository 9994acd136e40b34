//! Plugin classification: one flat plugin list in, four typed pools out.
//!
//! Each plugin is either a command plugin (routed per command into the
//! keyword, regexp, or fallback pool, after merging persisted per-command
//! customization) or a search provider. Classification has no side effects
//! and is idempotent for the same inputs.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::plugin::{BoundCommand, CommandSpec, MatchType, Plugin};

/// Persisted per-plugin command overrides, versioned against the plugin's
/// code version.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PluginCustomization {
    /// Version of the plugin the record was written for; records that never
    /// carried one count as version 1.
    #[serde(default = "default_customization_version")]
    pub version: u32,
    pub commands: Vec<CommandSpec>,
}

fn default_customization_version() -> u32 {
    1
}

/// The role a plugin plays, decided once at classification time.
pub enum PluginVariant {
    /// Exposes trigger commands.
    Commands(Vec<CommandSpec>),
    /// No commands: contributes contextual results for single-token queries.
    Provider,
}

impl PluginVariant {
    /// Decide the variant for a plugin from its descriptor.
    pub fn of(plugin: &dyn Plugin) -> Self {
        match plugin.commands() {
            Some(commands) => PluginVariant::Commands(commands),
            None => PluginVariant::Provider,
        }
    }
}

/// A regexp-type command with its compiled pattern.
#[derive(Debug, Clone)]
pub struct RegexpCommand {
    pub bound: BoundCommand,
    pub pattern: Regex,
}

impl RegexpCommand {
    fn compile(bound: BoundCommand) -> Result<Self, PipelineError> {
        let source = bound.spec.regex.as_deref().unwrap_or_default();
        let pattern = Regex::new(source).map_err(|source| PipelineError::InvalidRegex {
            key: bound.spec.key.clone(),
            source,
        })?;
        Ok(Self { bound, pattern })
    }
}

/// The four disjoint command pools, immutable after construction.
pub struct Pools {
    /// Trigger key (lowercased) to command; last write wins on collision.
    pub keyword_commands: BTreeMap<String, BoundCommand>,
    /// Ordered; only the first matching entry is ever used.
    pub regexp_commands: Vec<RegexpCommand>,
    /// Ordered fallback pool; only the first entry is ever consulted.
    pub other_commands: Vec<BoundCommand>,
    /// Ordered providers, host-specific one (if any) appended last.
    pub search_providers: Vec<Arc<dyn Plugin>>,
}

impl Pools {
    /// First regexp command whose pattern matches the input, if any.
    pub fn find_regexp_match(&self, input: &str) -> Option<&RegexpCommand> {
        self.regexp_commands
            .iter()
            .find(|entry| entry.pattern.is_match(input))
    }

    /// Keyword command for a (lowercased) trigger key.
    pub fn keyword_command(&self, key: &str) -> Option<&BoundCommand> {
        self.keyword_commands.get(&key.to_lowercase())
    }
}

/// Partition the plugin set into the four pools.
///
/// `persisted` holds per-plugin command customization; a missing entry falls
/// back to the plugin's built-in commands. A host-specific provider
/// registered for `host_context` is appended after all generic providers so
/// it is tried last when flattening stage-2 results.
pub fn classify(
    plugins: &[Arc<dyn Plugin>],
    persisted: &HashMap<String, PluginCustomization>,
    host_context: Option<&str>,
    host_providers: &HashMap<String, Arc<dyn Plugin>>,
) -> Pools {
    let mut keyword_commands = BTreeMap::new();
    let mut regexp_commands = Vec::new();
    let mut other_commands = Vec::new();
    let mut search_providers: Vec<Arc<dyn Plugin>> = Vec::new();

    for plugin in plugins {
        match PluginVariant::of(plugin.as_ref()) {
            PluginVariant::Commands(built_in) => {
                let effective = effective_commands(
                    plugin.version(),
                    built_in,
                    persisted.get(plugin.name()),
                );

                for spec in effective {
                    route_command(
                        BoundCommand::new(spec, Arc::clone(plugin)),
                        &mut keyword_commands,
                        &mut regexp_commands,
                        &mut other_commands,
                    );
                }
            }
            PluginVariant::Provider => {
                search_providers.push(Arc::clone(plugin));
            }
        }
    }

    if let Some(host) = host_context {
        if let Some(provider) = host_providers.get(host) {
            debug!(host, provider = provider.name(), "appending host provider");
            search_providers.push(Arc::clone(provider));
        }
    }

    debug!(
        keywords = keyword_commands.len(),
        regexps = regexp_commands.len(),
        fallbacks = other_commands.len(),
        providers = search_providers.len(),
        "plugins classified"
    );

    Pools {
        keyword_commands,
        regexp_commands,
        other_commands,
        search_providers,
    }
}

/// Resolve a plugin's effective command list against persisted
/// customization.
///
/// When the plugin code is newer than the stored record, the code's
/// commands overwrite the stored ones key by key and stored-only keys
/// survive underneath, so a new release's commands always appear even when
/// the record predates them. Otherwise the stored commands are used as-is.
fn effective_commands(
    version: u32,
    built_in: Vec<CommandSpec>,
    stored: Option<&PluginCustomization>,
) -> Vec<CommandSpec> {
    let Some(stored) = stored else {
        return built_in;
    };

    if version > stored.version {
        let mut merged = built_in;
        for spec in &stored.commands {
            if !merged.iter().any(|c| c.key == spec.key) {
                merged.push(spec.clone());
            }
        }
        merged
    } else {
        stored.commands.clone()
    }
}

fn route_command(
    bound: BoundCommand,
    keyword_commands: &mut BTreeMap<String, BoundCommand>,
    regexp_commands: &mut Vec<RegexpCommand>,
    other_commands: &mut Vec<BoundCommand>,
) {
    match bound.spec.match_type {
        MatchType::Regexp => match RegexpCommand::compile(bound) {
            Ok(entry) => regexp_commands.push(entry),
            Err(err) => warn!(error = %err, "skipping regexp command"),
        },
        MatchType::Other => other_commands.push(bound),
        // Keyword is also the defensive default for unrecognized types.
        MatchType::Keyword => {
            keyword_commands.insert(bound.spec.key.to_lowercase(), bound);
        }
    }
}
