//! Selection dispatch.
//!
//! When the user picks a rendered item, either no command is active and the
//! item's kind decides what happens, or the active command's plugin gets the
//! selection through `on_enter`. The decision (`select`) is pure and
//! separately testable from the side effects (`perform`).

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::GeneralConfig;
use crate::plugin::EnterContext;
use crate::session::Session;
use crate::storage::Storage;
use crate::types::{DisplayItem, EnterOutcome, ItemKind};
use crate::usage::UsageStore;

/// What the controller should do with a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// Re-fill the input with `"<key> "` and keep the palette open.
    Refill(String),
    /// Open the URL with the system handler, then close.
    OpenUrl(String),
    /// Copy the value to the clipboard, then close.
    Copy(String),
    /// The item was forwarded to the embedding host, then close.
    Forwarded(DisplayItem),
    /// An active command's plugin handled the selection.
    Handled { close: bool, refresh: bool },
    /// Nothing to do (no payload, or an out-of-range index).
    Ignored,
}

/// Message posted to the embedding host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostMessage {
    /// Ask the host to hide the palette.
    CloseBox,
    /// Forward a selected action item for the host to execute.
    Command { info: DisplayItem },
}

/// Channel to the embedding page, present only in embedded contexts.
pub trait HostMessenger: Send + Sync {
    fn post(&self, message: HostMessage);
}

/// Routes selections to plugins or the item-kind branches.
pub struct Dispatcher {
    session: Arc<Session>,
    usage: UsageStore,
    host: Option<Arc<dyn HostMessenger>>,
    max_operands: usize,
}

impl Dispatcher {
    pub fn new(
        session: Arc<Session>,
        storage: Arc<dyn Storage>,
        general: &GeneralConfig,
    ) -> Self {
        Self {
            session,
            usage: UsageStore::new(storage),
            host: None,
            max_operands: general.max_operands_num,
        }
    }

    /// Attach the embedding host's message channel.
    pub fn with_host(mut self, host: Arc<dyn HostMessenger>) -> Self {
        self.host = Some(host);
        self
    }

    /// Decide what a selection means. Side effects other than plugin
    /// `on_enter`, usage recording, and host messages happen later in
    /// [`perform`](Self::perform).
    pub async fn select(&self, index: usize, list: &[DisplayItem]) -> SelectionOutcome {
        let Some(item) = list.get(index) else {
            return SelectionOutcome::Ignored;
        };
        let session = self.session.snapshot().await;

        let Some(command) = session.active_command.clone() else {
            return self.select_without_command(item);
        };

        let plugin = Arc::clone(&command.plugin);
        let ctx = EnterContext {
            item,
            command: Some(&command.spec),
            query: &session.query,
            shift: command.spec.shift_flag,
            list,
            max_operands: self.max_operands,
        };

        let outcome = match plugin.on_enter(ctx, &session).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(plugin = plugin.name(), error = %err, "enter handler failed");
                return SelectionOutcome::Handled {
                    close: false,
                    refresh: false,
                };
            }
        };

        if let Err(err) = self
            .usage
            .record_use(plugin.name(), &session.query, &item.id)
            .await
        {
            warn!(plugin = plugin.name(), error = %err, "failed to record usage");
        }
        info!(target: "omnibar::usage", plugin = plugin.name(), "item selected");

        let close = !plugin.keep_panel_open();
        if close {
            self.close_box();
        }
        SelectionOutcome::Handled {
            close,
            refresh: outcome == EnterOutcome::Refresh,
        }
    }

    fn select_without_command(&self, item: &DisplayItem) -> SelectionOutcome {
        info!(target: "omnibar::usage", kind = %item.kind, "item selected");

        let outcome = match item.kind {
            ItemKind::Plugins => SelectionOutcome::Refill(format!("{} ", item.id)),
            ItemKind::Url => match &item.url {
                Some(url) => SelectionOutcome::OpenUrl(url.clone()),
                None => SelectionOutcome::Ignored,
            },
            ItemKind::Copy => match &item.url {
                Some(value) => SelectionOutcome::Copy(value.clone()),
                None => SelectionOutcome::Ignored,
            },
            ItemKind::Action => {
                if let Some(host) = &self.host {
                    host.post(HostMessage::Command { info: item.clone() });
                }
                SelectionOutcome::Forwarded(item.clone())
            }
            // A command-owned item with no active command has nowhere to go.
            ItemKind::Command => SelectionOutcome::Ignored,
        };

        // Switching to a suggested command keeps the palette open; every
        // other branch closes it.
        if !matches!(outcome, SelectionOutcome::Refill(_)) {
            self.close_box();
        }
        outcome
    }

    /// Execute the side effect an outcome asks for.
    pub fn perform(&self, outcome: &SelectionOutcome) {
        match outcome {
            SelectionOutcome::OpenUrl(url) => {
                if let Err(err) = open::that(url) {
                    warn!(url = %url, error = %err, "failed to open url");
                }
            }
            SelectionOutcome::Copy(value) => match arboard::Clipboard::new() {
                Ok(mut clipboard) => {
                    if let Err(err) = clipboard.set_text(value.clone()) {
                        warn!(error = %err, "failed to copy to clipboard");
                    }
                }
                Err(err) => warn!(error = %err, "clipboard unavailable"),
            },
            _ => {}
        }
    }

    fn close_box(&self) {
        if let Some(host) = &self.host {
            host.post(HostMessage::CloseBox);
        }
    }
}
