//! Capture ingester — turns an uploaded traffic artifact into a batch of
//! event inputs.
//!
//! Real capture parsing is out of scope for the analyzer: this
//! collaborator synthesizes a representative batch sized from the
//! artifact (one event per KB, between 2 and 50), rotating through a
//! fixed table of sample requests. Attack samples carry a curated
//! classification; the benign sample is left to the signature engine.

use argus_analysis::signature_engine::SignatureEngine;
use argus_analysis::types::{AttackType, EventInput, Severity};
use chrono::{DateTime, Duration, Utc};

const MIN_EVENTS: usize = 2;
const MAX_EVENTS: usize = 50;
const BYTES_PER_EVENT: usize = 1000;

const BASE_NETWORKS: [&str; 4] = ["192.168.1", "10.0.0", "172.16.0", "203.0.113"];
const METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

struct SampleRequest {
    url: &'static str,
    attack_type: AttackType,
    severity: Severity,
}

const SAMPLE_REQUESTS: [SampleRequest; 8] = [
    SampleRequest { url: "/api/users?id=1' OR '1'='1", attack_type: AttackType::SqlInjection, severity: Severity::Critical },
    SampleRequest { url: "/search?q=<script>alert('xss')</script>", attack_type: AttackType::Xss, severity: Severity::High },
    SampleRequest { url: "/files/../../../etc/passwd", attack_type: AttackType::DirectoryTraversal, severity: Severity::Critical },
    SampleRequest { url: "/exec?cmd=ls+-la", attack_type: AttackType::CommandInjection, severity: Severity::Critical },
    SampleRequest { url: "/api/admin?auth=bypass", attack_type: AttackType::AuthBypass, severity: Severity::High },
    SampleRequest { url: "/upload?file=shell.php", attack_type: AttackType::FileUpload, severity: Severity::High },
    SampleRequest { url: "/test?foo=bar", attack_type: AttackType::None, severity: Severity::Low },
    SampleRequest { url: "/api/data?callback=malicious", attack_type: AttackType::JsonpInjection, severity: Severity::Medium },
];

/// Synthesizes one event per [`BYTES_PER_EVENT`] of artifact, clamped to
/// 2–50, timestamps spread a minute apart ending at `now`.
pub fn synthesize_events(
    artifact_len: usize,
    now: DateTime<Utc>,
    engine: &SignatureEngine,
) -> Vec<EventInput> {
    let count = (artifact_len / BYTES_PER_EVENT).clamp(MIN_EVENTS, MAX_EVENTS);
    let mut events = Vec::with_capacity(count);

    for i in 0..count {
        let network = BASE_NETWORKS[i % BASE_NETWORKS.len()];
        let method = METHODS[i % METHODS.len()];
        let sample = &SAMPLE_REQUESTS[i % SAMPLE_REQUESTS.len()];
        let benign = sample.attack_type == AttackType::None;
        // Benign traffic succeeds; attacks land a mix of 200s and 403s
        let status_code = if benign || i % 3 == 0 { 200 } else { 403 };
        let raw_request = format!("{} {} HTTP/1.1", method, sample.url);

        let mut verdict = engine.classify(sample.url, &raw_request, status_code);
        if !benign {
            verdict.is_attack = true;
            verdict.attack_type = sample.attack_type;
            verdict.severity = sample.severity;
            verdict.is_successful = (200..400).contains(&status_code);
        }

        events.push(EventInput {
            id: None,
            timestamp: now - Duration::minutes((count - i) as i64),
            src_ip: format!("{}.{}", network, 100 + i),
            dest_ip: format!("{}.1", network),
            method: method.into(),
            url: sample.url.into(),
            status_code,
            user_agent: if i % 2 == 0 { "Mozilla/5.0" } else { "curl/1.0" }.into(),
            raw_request: Some(raw_request),
            classification: Some(verdict),
        });
    }
    events
}
