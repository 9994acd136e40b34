//! Session state shared between the engine, dispatch, and plugin handlers.
//!
//! One [`Session`] lives for one palette lifetime. Each keystroke starts a
//! new resolution generation; writes from a superseded generation are
//! dropped so a slow resolution can never clobber the state of a newer one
//! (last-keystroke-wins).

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::plugin::BoundCommand;

/// The mutable per-keystroke record: the last parsed command, flag and
/// query, plus the last-used command key for usage-event de-duplication.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Raw input the current resolution was started with.
    pub input: String,
    /// Parsed command key, empty when no command matched.
    pub cmd: String,
    /// Parsed `-<flag>` value, if present.
    pub flag: Option<String>,
    /// Parsed query remainder.
    pub query: String,
    /// Last command key a usage event was emitted for.
    pub last_cmd: String,
    /// The command currently driving the rendered list, if any.
    pub active_command: Option<BoundCommand>,
}

impl SessionState {
    /// True while a command's results are on screen.
    pub fn has_active_command(&self) -> bool {
        self.active_command.is_some()
    }
}

/// Process-wide session record, owned by the embedder for one palette
/// lifetime.
///
/// Execution is cooperative and single-threaded in practice, but resolutions
/// overlap in time: generation tracking is what enforces the stale-write
/// ordering, the mutex only guards the snapshot/apply critical sections.
pub struct Session {
    state: Mutex<SessionState>,
    /// Last issued resolution generation.
    generation: AtomicU64,
    /// Highest generation whose writes were applied.
    applied: AtomicU64,
    /// Host of the embedding page, when running inside one.
    host_context: Option<String>,
}

impl Session {
    /// Create a session for a standalone (non-embedded) palette.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            generation: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            host_context: None,
        }
    }

    /// Create a session embedded in a page with the given host.
    pub fn embedded(host: impl Into<String>) -> Self {
        Self {
            host_context: Some(host.into()),
            ..Self::new()
        }
    }

    /// Host of the embedding page, if any.
    pub fn host_context(&self) -> Option<&str> {
        self.host_context.as_deref()
    }

    /// Start a new resolution, superseding any in-flight one.
    pub fn begin_resolution(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Whether `generation` is still the newest resolution. The controller
    /// checks this before rendering a resolution's output.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Mutate the state on behalf of `generation`. Returns `false` without
    /// touching anything when a newer generation has already written.
    pub async fn apply<F>(&self, generation: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        let mut state = self.state.lock().await;
        if generation < self.applied.load(Ordering::Acquire) {
            return false;
        }
        self.applied.fetch_max(generation, Ordering::AcqRel);
        mutate(&mut state);
        true
    }

    /// Clone the current state for handlers.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_in_order() {
        let session = Session::new();
        let first = session.begin_resolution();
        let second = session.begin_resolution();

        assert!(session.apply(first, |s| s.cmd = "bm".into()).await);
        assert!(session.apply(second, |s| s.cmd = "site".into()).await);
        assert_eq!(session.snapshot().await.cmd, "site");
    }

    #[tokio::test]
    async fn test_stale_write_is_dropped() {
        let session = Session::new();
        let slow = session.begin_resolution();
        let fast = session.begin_resolution();

        // The newer keystroke finishes first.
        assert!(session.apply(fast, |s| s.cmd = "site".into()).await);
        // The superseded resolution completes afterwards and must not win.
        assert!(!session.apply(slow, |s| s.cmd = "bm".into()).await);
        assert_eq!(session.snapshot().await.cmd, "site");
    }

    #[tokio::test]
    async fn test_is_current_tracks_latest_generation() {
        let session = Session::new();
        let first = session.begin_resolution();
        assert!(session.is_current(first));

        let second = session.begin_resolution();
        assert!(!session.is_current(first));
        assert!(session.is_current(second));
    }

    #[test]
    fn test_embedded_session_host() {
        let session = Session::embedded("github.com");
        assert_eq!(session.host_context(), Some("github.com"));
        assert_eq!(Session::new().host_context(), None);
    }
}
