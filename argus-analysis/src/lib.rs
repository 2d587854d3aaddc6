//! # Argus Analysis — HTTP Traffic Attack Detection Core
//!
//! The detection-and-query pipeline behind the Argus monitoring dashboard:
//! - **Signature Engine** — labels a single HTTP transaction as benign or
//!   malicious by matching an ordered list of attack signatures
//! - **Event Store** — append-only, process-wide retention of classified
//!   events with sorted/limited/by-id/count queries
//! - **Traffic Stats** — read-side aggregation (per-type and per-severity
//!   counts, hourly time bins, top offending IPs and payloads)
//!
//! Everything here is synchronous and in-memory; the external transport
//! lives in `argus-server`.

pub mod error;
pub mod event_store;
pub mod signature_engine;
pub mod traffic_stats;
pub mod types;

pub use error::{AnalyzerError, AnalyzerResult};
pub use event_store::{CountFilter, EventStore, DEFAULT_QUERY_LIMIT};
pub use signature_engine::SignatureEngine;
pub use types::{AttackType, EventInput, HttpEventRecord, Severity, Verdict};
