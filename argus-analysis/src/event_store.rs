//! Event Store — classified HTTP traffic retention and queries
//!
//! Append-only, process-wide store behind one reader-writer lock. Raw
//! inputs are normalized and classified exactly once on the way in; the
//! stored records are immutable and only ever leave as snapshot copies.
//! Identifiers come from a store-owned counter, so concurrent batches
//! can never collide the way wall-clock ids could.

use crate::signature_engine::SignatureEngine;
use crate::types::{EventInput, HttpEventRecord};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Limit applied when a query asks for zero or fewer records.
pub const DEFAULT_QUERY_LIMIT: usize = 200;

// ── Count Filter ─────────────────────────────────────────────────────────────

/// Field-equality predicate for [`EventStore::count_matching`]. An empty
/// filter counts every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountFilter {
    pub is_attack: Option<bool>,
    pub is_successful: Option<bool>,
}

impl CountFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn attacks() -> Self {
        CountFilter { is_attack: Some(true), ..Self::default() }
    }

    pub fn successful() -> Self {
        CountFilter { is_successful: Some(true), ..Self::default() }
    }

    fn matches(&self, record: &HttpEventRecord) -> bool {
        self.is_attack.map_or(true, |want| record.verdict.is_attack == want)
            && self.is_successful.map_or(true, |want| record.verdict.is_successful == want)
    }
}

// ── Event Store ──────────────────────────────────────────────────────────────

pub struct EventStore {
    events: RwLock<Vec<HttpEventRecord>>,
    engine: SignatureEngine,
    next_seq: AtomicU64,
    total_ingested: AtomicU64,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            engine: SignatureEngine::new(),
            next_seq: AtomicU64::new(1),
            total_ingested: AtomicU64::new(0),
        }
    }

    /// The classifier this store labels unclassified inputs with.
    pub fn engine(&self) -> &SignatureEngine {
        &self.engine
    }

    /// Classifies and appends a batch. Inputs carrying a classification
    /// block are trusted verbatim; the rest are run through the signature
    /// engine. Inputs without an id get `evt-{n}` from the store counter.
    /// The whole batch becomes visible atomically, in input order.
    pub fn insert_many(&self, inputs: Vec<EventInput>) -> Vec<HttpEventRecord> {
        let mut stored = Vec::with_capacity(inputs.len());
        for mut input in inputs {
            let verdict = match input.classification.take() {
                Some(v) => v,
                None => self.engine.classify(
                    &input.url,
                    input.raw_request.as_deref().unwrap_or(""),
                    input.status_code,
                ),
            };
            let id = match input.id.take() {
                Some(id) if !id.is_empty() => id,
                _ => format!("evt-{}", self.next_seq.fetch_add(1, Ordering::Relaxed)),
            };
            stored.push(HttpEventRecord::from_classified(id, input, verdict));
        }

        {
            let mut events = self.events.write();
            events.extend(stored.iter().cloned());
        }
        self.total_ingested.fetch_add(stored.len() as u64, Ordering::Relaxed);
        info!(count = stored.len(), "ingested event batch");
        stored
    }

    /// Snapshot of all records in insertion order. Always a copy — the
    /// internal vector never escapes.
    pub fn find(&self) -> Vec<HttpEventRecord> {
        self.events.read().clone()
    }

    /// Most recent records first (stable: equal timestamps keep insertion
    /// order), truncated to `limit`. A zero or negative limit is clamped
    /// to [`DEFAULT_QUERY_LIMIT`].
    pub fn find_sorted_limited(&self, limit: i64) -> Vec<HttpEventRecord> {
        let limit = if limit <= 0 { DEFAULT_QUERY_LIMIT } else { limit as usize };
        let mut snapshot = self.events.read().clone();
        snapshot.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        snapshot.truncate(limit);
        snapshot
    }

    /// Exact id lookup. Absence is `None`, never an error.
    pub fn find_by_id(&self, id: &str) -> Option<HttpEventRecord> {
        self.events.read().iter().find(|e| e.id == id).cloned()
    }

    /// Counts records satisfying the filter; an empty filter counts all.
    pub fn count_matching(&self, filter: CountFilter) -> usize {
        self.events.read().iter().filter(|e| filter.matches(e)).count()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    pub fn total_ingested(&self) -> u64 {
        self.total_ingested.load(Ordering::Relaxed)
    }

    /// Drops every stored record. The only way records are destroyed.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}
