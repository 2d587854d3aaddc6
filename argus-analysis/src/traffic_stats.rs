//! Traffic Stats — read-side aggregation for the dashboard
//!
//! Pure functions over a store snapshot: per-type and per-severity
//! counts, hourly time bins, top offending source IPs, top repeated
//! payloads, unique-IP cardinality. Deterministic for a fixed snapshot;
//! nothing here touches the store.

use crate::types::{HttpEventRecord, Severity};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Query strings longer than this are too noisy to group on.
pub const MAX_PAYLOAD_LEN: usize = 100;
/// Default breadth of the top-IP / top-payload breakdowns.
pub const DEFAULT_TOP_N: usize = 5;
/// Default window of the dashboard's time-series chart.
pub const DEFAULT_RECENT_BINS: usize = 7;

// ── Aggregated Shapes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackStats {
    pub attacks_by_type: HashMap<String, u64>,
    pub severity_count: HashMap<String, u64>,
    pub time_bins: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpActivity {
    pub ip: String,
    pub attacks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadActivity {
    pub payload: String,
    pub count: u64,
    pub attack_type: String,
}

// ── Aggregation ──────────────────────────────────────────────────────────────

/// Hour-granularity bin label, e.g. `2024-03-08T14h`.
fn hour_bin(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%Hh").to_string()
}

/// One pass over the snapshot: attack counts per type (attacks only),
/// record counts per severity (all known severities pre-seeded to zero),
/// and record counts per hour bin.
pub fn aggregate(events: &[HttpEventRecord]) -> AttackStats {
    let mut stats = AttackStats::default();
    for severity in Severity::ALL {
        stats.severity_count.insert(severity.label().into(), 0);
    }
    for event in events {
        if event.verdict.is_attack {
            *stats
                .attacks_by_type
                .entry(event.verdict.attack_type.label().into())
                .or_insert(0) += 1;
        }
        *stats
            .severity_count
            .entry(event.verdict.severity.label().into())
            .or_insert(0) += 1;
        *stats.time_bins.entry(hour_bin(&event.timestamp)).or_insert(0) += 1;
    }
    stats
}

/// The most recent `n` bins, ascending by label. Bin labels sort
/// lexicographically in chronological order.
pub fn recent_time_bins(bins: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let skip = bins.len().saturating_sub(n);
    bins.iter().skip(skip).map(|(label, count)| (label.clone(), *count)).collect()
}

/// Attack counts per source address, most active first, ties broken by
/// first-seen order, truncated to `n`.
pub fn top_source_ips(events: &[HttpEventRecord], n: usize) -> Vec<IpActivity> {
    let mut counts: HashMap<&str, (u64, usize)> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        if !event.verdict.is_attack {
            continue;
        }
        let entry = counts.entry(event.src_ip.as_str()).or_insert((0, idx));
        entry.0 += 1;
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.truncate(n);
    ranked
        .into_iter()
        .map(|(ip, (attacks, _))| IpActivity { ip: ip.into(), attacks })
        .collect()
}

/// Attack counts grouped by the verbatim query string (text after the
/// first `?`). Empty and over-length payloads are excluded; each distinct
/// payload keeps the attack type of its first-seen occurrence.
pub fn top_payloads(events: &[HttpEventRecord], n: usize) -> Vec<PayloadActivity> {
    let mut counts: HashMap<&str, (u64, &'static str, usize)> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        if !event.verdict.is_attack {
            continue;
        }
        let Some(query) = event.url.splitn(2, '?').nth(1) else { continue };
        if query.is_empty() || query.len() >= MAX_PAYLOAD_LEN {
            continue;
        }
        let entry = counts
            .entry(query)
            .or_insert((0, event.verdict.attack_type.label(), idx));
        entry.0 += 1;
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .2.cmp(&b.1 .2)));
    ranked.truncate(n);
    ranked
        .into_iter()
        .map(|(payload, (count, attack_type, _))| PayloadActivity {
            payload: payload.into(),
            count,
            attack_type: attack_type.into(),
        })
        .collect()
}

/// Cardinality of distinct source addresses across the snapshot.
pub fn unique_source_ips(events: &[HttpEventRecord]) -> usize {
    events.iter().map(|e| e.src_ip.as_str()).collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttackType, EventInput, Verdict};
    use chrono::TimeZone;

    fn record(url: &str, src_ip: &str, attack: Option<AttackType>, hour: u32) -> HttpEventRecord {
        let verdict = match attack {
            Some(attack_type) => Verdict {
                is_attack: true,
                attack_type,
                severity: Severity::High,
                is_successful: false,
                detection_reasons: vec!["matched".into()],
            },
            None => Verdict::benign(),
        };
        let input = EventInput {
            id: None,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 8, hour, 15, 0).unwrap(),
            src_ip: src_ip.into(),
            dest_ip: "10.0.0.1".into(),
            method: "GET".into(),
            url: url.into(),
            status_code: 200,
            user_agent: "Mozilla/5.0".into(),
            raw_request: None,
            classification: None,
        };
        HttpEventRecord::from_classified("evt-test".into(), input, verdict)
    }

    #[test]
    fn test_empty_snapshot_aggregates_to_zero() {
        let stats = aggregate(&[]);
        assert!(stats.attacks_by_type.is_empty());
        assert!(stats.time_bins.is_empty());
        assert_eq!(stats.severity_count.len(), 4);
        assert!(stats.severity_count.values().all(|&c| c == 0));
        assert!(top_source_ips(&[], 5).is_empty());
        assert!(top_payloads(&[], 5).is_empty());
        assert_eq!(unique_source_ips(&[]), 0);
    }

    #[test]
    fn test_attacks_by_type_ignores_benign() {
        let events = vec![
            record("/a?q=1", "1.1.1.1", Some(AttackType::Xss), 10),
            record("/b?q=2", "1.1.1.1", Some(AttackType::Xss), 10),
            record("/c?q=3", "1.1.1.1", Some(AttackType::Ssrf), 10),
            record("/d", "1.1.1.1", None, 10),
        ];
        let stats = aggregate(&events);
        assert_eq!(stats.attacks_by_type.get("XSS"), Some(&2));
        assert_eq!(stats.attacks_by_type.get("SSRF"), Some(&1));
        assert!(stats.attacks_by_type.get("NONE").is_none());
    }

    #[test]
    fn test_severity_counts_cover_all_levels() {
        let events = vec![
            record("/a", "1.1.1.1", None, 10),
            record("/b?q=1", "1.1.1.1", Some(AttackType::Xss), 10),
        ];
        let stats = aggregate(&events);
        assert_eq!(stats.severity_count.get("LOW"), Some(&1));
        assert_eq!(stats.severity_count.get("HIGH"), Some(&1));
        assert_eq!(stats.severity_count.get("MEDIUM"), Some(&0));
        assert_eq!(stats.severity_count.get("CRITICAL"), Some(&0));
    }

    #[test]
    fn test_time_bins_truncate_to_the_hour() {
        let events = vec![
            record("/a", "1.1.1.1", None, 10),
            record("/b", "1.1.1.1", None, 10),
            record("/c", "1.1.1.1", None, 11),
        ];
        let stats = aggregate(&events);
        assert_eq!(stats.time_bins.get("2024-03-08T10h"), Some(&2));
        assert_eq!(stats.time_bins.get("2024-03-08T11h"), Some(&1));
    }

    #[test]
    fn test_recent_time_bins_keep_latest_ascending() {
        let events: Vec<_> = (0..10)
            .map(|h| record("/a", "1.1.1.1", None, h))
            .collect();
        let stats = aggregate(&events);
        let recent = recent_time_bins(&stats.time_bins, DEFAULT_RECENT_BINS);
        assert_eq!(recent.len(), 7);
        assert_eq!(recent.first().unwrap().0, "2024-03-08T03h");
        assert_eq!(recent.last().unwrap().0, "2024-03-08T09h");
        assert!(recent.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_top_source_ips_ranked_with_first_seen_tiebreak() {
        let events = vec![
            record("/a?q=1", "2.2.2.2", Some(AttackType::Xss), 10),
            record("/b?q=1", "1.1.1.1", Some(AttackType::Xss), 10),
            record("/c?q=1", "3.3.3.3", Some(AttackType::Xss), 10),
            record("/d?q=1", "1.1.1.1", Some(AttackType::Xss), 10),
            record("/benign", "9.9.9.9", None, 10),
        ];
        let top = top_source_ips(&events, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], IpActivity { ip: "1.1.1.1".into(), attacks: 2 });
        // 2.2.2.2 and 3.3.3.3 tie on count; 2.2.2.2 was seen first
        assert_eq!(top[1], IpActivity { ip: "2.2.2.2".into(), attacks: 1 });
    }

    #[test]
    fn test_top_payloads_group_by_query_string() {
        let long_query = format!("/x?{}", "a".repeat(MAX_PAYLOAD_LEN));
        let events = vec![
            record("/a?id=1' OR '1'='1", "1.1.1.1", Some(AttackType::SqlInjection), 10),
            record("/b?id=1' OR '1'='1", "2.2.2.2", Some(AttackType::Xss), 10),
            record("/c?q=<script>", "1.1.1.1", Some(AttackType::Xss), 10),
            record("/no-query", "1.1.1.1", Some(AttackType::Xss), 10),
            record(&long_query, "1.1.1.1", Some(AttackType::Xss), 10),
            record("/benign?foo=bar", "1.1.1.1", None, 10),
        ];
        let top = top_payloads(&events, 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].payload, "id=1' OR '1'='1");
        assert_eq!(top[0].count, 2);
        // First-seen occurrence decides the displayed attack type
        assert_eq!(top[0].attack_type, "SQL Injection");
        assert_eq!(top[1].payload, "q=<script>");
    }

    #[test]
    fn test_unique_source_ips() {
        let events = vec![
            record("/a", "1.1.1.1", None, 10),
            record("/b", "1.1.1.1", None, 10),
            record("/c", "2.2.2.2", None, 10),
        ];
        assert_eq!(unique_source_ips(&events), 2);
    }
}
