//! Per-feature usage records.
//!
//! Features (extension toggling, bookmark search, ...) record which item a
//! query led to; the counts feed a frequency-then-recency ordering of later
//! candidate lists for the same query. One named record per feature,
//! read-modify-write, last-write-wins.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::StorageError;
use crate::storage::{Storage, get_record, set_record};
use crate::types::DisplayItem;

/// Use count and last-use stamp for one (item, query) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryStat {
    pub num: u32,
    /// Milliseconds since the epoch of the most recent use.
    pub update: i64,
}

/// All recorded queries that led to one item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageEntry {
    pub id: String,
    #[serde(default)]
    pub queries: HashMap<String, QueryStat>,
}

/// The persisted record for one feature: item id to its usage entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageRecord {
    pub entries: HashMap<String, UsageEntry>,
}

impl UsageRecord {
    fn stat(&self, id: &str, query: &str) -> QueryStat {
        self.entries
            .get(id)
            .and_then(|entry| entry.queries.get(query))
            .copied()
            .unwrap_or_default()
    }
}

/// Records selections and ranks candidate lists by past usage.
pub struct UsageStore {
    storage: Arc<dyn Storage>,
}

impl UsageStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Record that `query` led the user to `id` under `feature`.
    pub async fn record_use(
        &self,
        feature: &str,
        query: &str,
        id: &str,
    ) -> Result<(), StorageError> {
        let mut record: UsageRecord = get_record(self.storage.as_ref(), feature)
            .await?
            .unwrap_or_default();

        let entry = record
            .entries
            .entry(id.to_string())
            .or_insert_with(|| UsageEntry {
                id: id.to_string(),
                queries: HashMap::new(),
            });
        let stat = entry.queries.entry(query.to_string()).or_default();
        stat.num += 1;
        stat.update = Utc::now().timestamp_millis();

        set_record(self.storage.as_ref(), feature, &record).await
    }

    /// Order `items` by `(use count desc, last use desc)` for this query.
    ///
    /// Items without history keep their relative order at the end. A storage
    /// failure returns the list unranked; ranking is never worth an error.
    pub async fn rank(
        &self,
        feature: &str,
        query: &str,
        mut items: Vec<DisplayItem>,
    ) -> Vec<DisplayItem> {
        let record: UsageRecord = match get_record(self.storage.as_ref(), feature).await {
            Ok(Some(record)) => record,
            Ok(None) => return items,
            Err(err) => {
                warn!(feature, error = %err, "usage record unavailable, skipping rank");
                return items;
            }
        };

        items.sort_by_key(|item| {
            let stat = record.stat(&item.id, query);
            (Reverse(stat.num), Reverse(stat.update))
        });
        items
    }
}
