//! The staged resolution engine.
//!
//! One raw input string goes through four stages in strict order (regexp
//! commands, single-token search, keyword-command parsing, fallback) and
//! the first stage that resolves terminates the pipeline. Stage results are
//! an explicit three-way value; resolution is never signalled through error
//! propagation.

use futures::future::join_all;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classifier::Pools;
use crate::error::PipelineError;
use crate::matcher::CompositeMatcher;
use crate::plugin::{BoundCommand, Plugin};
use crate::session::{Session, SessionState};
use crate::storage::{LAST_CMD_RECORD, Storage, set_record};
use crate::types::{DisplayItem, Resolution};

/// What one stage decided.
#[derive(Debug)]
pub enum StageOutcome {
    /// Terminal: no further stage runs.
    Resolved(Resolution),
    /// Hand the input to the next stage.
    PassThrough,
    /// The stage's sole handler failed; terminal, surfaces as "no results".
    Failed,
}

/// One resolution's output, tagged with its generation so the controller
/// can discard it when a newer keystroke has superseded it.
#[derive(Debug)]
pub struct Resolved {
    pub generation: u64,
    pub resolution: Resolution,
}

/// Runs the four-stage pipeline over one immutable set of pools.
pub struct ResolutionEngine {
    pools: Pools,
    matcher: CompositeMatcher,
    session: Arc<Session>,
    storage: Arc<dyn Storage>,
}

impl ResolutionEngine {
    /// Build the engine; the composite matcher is derived from the keyword
    /// pool here and is immutable for the session.
    pub fn new(
        pools: Pools,
        session: Arc<Session>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, PipelineError> {
        let matcher =
            CompositeMatcher::build(pools.keyword_commands.keys().map(String::as_str))?;
        Ok(Self {
            pools,
            matcher,
            session,
            storage,
        })
    }

    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    pub fn matcher(&self) -> &CompositeMatcher {
        &self.matcher
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Whether a resolution is still the newest one. The controller checks
    /// this before rendering (last-keystroke-wins).
    pub fn is_current(&self, resolved: &Resolved) -> bool {
        self.session.is_current(resolved.generation)
    }

    /// Resolve one keystroke's input.
    ///
    /// `input` is non-empty; the empty input box is a controller lifecycle
    /// event that never reaches the pipeline.
    pub async fn resolve(&self, input: &str) -> Resolved {
        let generation = self.session.begin_resolution();
        self.session
            .apply(generation, |state| {
                state.input = input.to_string();
                state.cmd.clear();
                state.flag = None;
                state.query.clear();
                state.active_command = None;
            })
            .await;

        let resolution = self.run_stages(generation, input).await;
        Resolved {
            generation,
            resolution,
        }
    }

    /// Stage order 1→2→3→4 is a hard invariant; the first resolving stage
    /// ends the pass.
    async fn run_stages(&self, generation: u64, input: &str) -> Resolution {
        match self.regexp_stage(generation, input).await {
            StageOutcome::Resolved(resolution) => return resolution,
            StageOutcome::Failed => return Resolution::Empty,
            StageOutcome::PassThrough => {}
        }
        match self.search_stage(input).await {
            StageOutcome::Resolved(resolution) => return resolution,
            StageOutcome::Failed => return Resolution::Empty,
            StageOutcome::PassThrough => {}
        }
        match self.command_stage(generation, input).await {
            StageOutcome::Resolved(resolution) => return resolution,
            StageOutcome::Failed => return Resolution::Empty,
            StageOutcome::PassThrough => {}
        }
        match self.default_stage(generation, input).await {
            StageOutcome::Resolved(resolution) => resolution,
            StageOutcome::Failed | StageOutcome::PassThrough => Resolution::Empty,
        }
    }

    /// Stage 1: regexp commands. First matching entry wins; later entries
    /// are unreachable by design.
    async fn regexp_stage(&self, generation: u64, input: &str) -> StageOutcome {
        let Some(entry) = self.pools.find_regexp_match(input) else {
            return StageOutcome::PassThrough;
        };
        debug!(key = %entry.bound.spec.key, "regexp command matched");
        self.call_command(generation, &entry.bound, input).await
    }

    /// Stage 2: plugin-name matching plus the search-provider fan-out.
    /// Only single-token input is eligible; any space skips the stage.
    async fn search_stage(&self, input: &str) -> StageOutcome {
        if input.contains(' ') {
            return StageOutcome::PassThrough;
        }

        let session = self.session.snapshot().await;
        let mut items = self.find_matched_plugins(input);
        items.extend(self.search_in_providers(input, &session).await);

        if items.is_empty() {
            StageOutcome::PassThrough
        } else {
            StageOutcome::Resolved(Resolution::Items(items))
        }
    }

    /// Stage 3: parse against the composite matcher and run the keyword
    /// command. A matched keyword command always terminates, even with an
    /// empty result.
    async fn command_stage(&self, generation: u64, input: &str) -> StageOutcome {
        let Some(parsed) = self.matcher.parse(input) else {
            return StageOutcome::PassThrough;
        };
        let Some(command) = self.pools.keyword_commands.get(&parsed.cmd) else {
            return StageOutcome::PassThrough;
        };
        let command = command.clone();

        let mut command_changed = false;
        let applied = self
            .session
            .apply(generation, |state| {
                state.cmd = parsed.cmd.clone();
                state.flag = parsed.flag.clone();
                state.query = parsed.query.clone();
                if state.last_cmd != parsed.cmd {
                    state.last_cmd = parsed.cmd.clone();
                    command_changed = true;
                }
            })
            .await;

        if applied {
            if let Err(err) = set_record(self.storage.as_ref(), LAST_CMD_RECORD, &input).await {
                warn!(error = %err, "failed to persist last command");
            }
            // One usage event per command change, never per keystroke.
            if command_changed {
                info!(target: "omnibar::usage", command = %parsed.cmd, "command input");
            }
        }

        self.call_command(generation, &command, &parsed.query).await
    }

    /// Stage 4: the fallback pool. Terminal whatever happens; only the
    /// first registered fallback is ever consulted.
    async fn default_stage(&self, generation: u64, input: &str) -> StageOutcome {
        match self.pools.other_commands.first() {
            Some(fallback) => self.call_command(generation, fallback, input).await,
            None => StageOutcome::Resolved(Resolution::Empty),
        }
    }

    /// Mark the command active and run its input handler. Handler failure
    /// is isolated here; the caller maps it to an empty resolution.
    async fn call_command(
        &self,
        generation: u64,
        command: &BoundCommand,
        query: &str,
    ) -> StageOutcome {
        self.session
            .apply(generation, |state| {
                state.cmd = command.spec.key.clone();
                state.active_command = Some(command.clone());
            })
            .await;

        let session = self.session.snapshot().await;
        match command
            .plugin
            .on_input(query, Some(&command.spec), &session)
            .await
        {
            Ok(resolution) => StageOutcome::Resolved(resolution),
            Err(err) => {
                warn!(
                    plugin = command.plugin_name(),
                    key = %command.spec.key,
                    error = %err,
                    "command handler failed"
                );
                StageOutcome::Failed
            }
        }
    }

    /// One suggestion item per keyword key containing the query.
    fn find_matched_plugins(&self, query: &str) -> Vec<DisplayItem> {
        self.pools
            .keyword_commands
            .iter()
            .filter(|(key, _)| key.contains(query))
            .map(|(key, command)| {
                DisplayItem::suggestion(
                    key.clone(),
                    command.icon(),
                    format!("{key}: {}", command.spec.title),
                    command.spec.subtitle.clone(),
                )
            })
            .collect()
    }

    /// Fan out to every provider and flatten in provider order. A failing
    /// provider contributes nothing; the others are unaffected.
    async fn search_in_providers(
        &self,
        query: &str,
        session: &SessionState,
    ) -> Vec<DisplayItem> {
        let mut providers: Vec<&Arc<dyn Plugin>> = self.pools.search_providers.iter().collect();
        if self.session.host_context().is_some() {
            // Host-specific providers are queried ahead of generic ones, in
            // a stable order.
            providers.sort_by(|a, b| match (a.host(), b.host()) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        let calls = providers.into_iter().map(|provider| async move {
            match provider.on_input(query, None, session).await {
                Ok(Resolution::Items(items)) => items,
                Ok(_) => Vec::new(),
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "provider failed, skipping");
                    Vec::new()
                }
            }
        });

        join_all(calls).await.into_iter().flatten().collect()
    }
}
