//! Signature Engine — attack classification for single HTTP events
//!
//! An ordered list of regex signatures is matched against the URL and raw
//! request text of one event. Every matching signature contributes a
//! detection reason; the type and severity of the verdict come from the
//! last signature that matched (list order is the tie-break). A verdict
//! is "successful" when the flagged request drew a 2xx/3xx response —
//! the response body itself is never inspected.

use crate::types::{AttackType, Severity, Verdict};
use regex::Regex;
use tracing::warn;

// ── Signature ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Signature {
    pub attack_type: AttackType,
    pub severity: Severity,
    pub description: String,
    pub regex: Regex,
}

impl Signature {
    fn new(attack: AttackType, sev: Severity, desc: &str, pattern: &str) -> Option<Self> {
        Regex::new(pattern).ok().map(|regex| Self {
            attack_type: attack,
            severity: sev,
            description: desc.into(),
            regex,
        })
    }
}

// ── Signature Engine ─────────────────────────────────────────────────────────

pub struct SignatureEngine {
    signatures: Vec<Signature>,
}

impl SignatureEngine {
    pub fn new() -> Self {
        let mut engine = Self { signatures: Vec::new() };
        engine.load_builtin_signatures();
        engine
    }

    fn load_builtin_signatures(&mut self) {
        let defs: Vec<(AttackType, Severity, &str, &str)> = vec![
            // ── SQL Injection ────────────────────────────────────────────
            (AttackType::SqlInjection, Severity::High,
             "SQLi: UNION-based SELECT",
             r"(?i)union\s*.*\s*select"),
            (AttackType::SqlInjection, Severity::High,
             "SQLi: SELECT ... FROM probe",
             r"(?i)select\s*.*\s*from"),
            (AttackType::SqlInjection, Severity::High,
             "SQLi: tautology (OR 1=1)",
             r"(?i)(?:'\s*or\s+.*=.*|'\s*or\s+'[^']*'\s*=\s*'[^']*'|or\s+1\s*=\s*1)"),

            // ── XSS ──────────────────────────────────────────────────────
            (AttackType::Xss, Severity::High,
             "XSS: onerror event handler",
             r"(?i)onerror="),
            (AttackType::Xss, Severity::High,
             "XSS: onload event handler",
             r"(?i)onload="),

            // ── Path Traversal ───────────────────────────────────────────
            (AttackType::DirectoryTraversal, Severity::High,
             "PathTrav: dot-dot-slash sequence",
             r"\.\./"),

            // ── SSRF ─────────────────────────────────────────────────────
            (AttackType::Ssrf, Severity::Critical,
             "SSRF: loopback address target",
             r"(?i)localhost|127\.0\.0\.1"),
        ];

        for (attack, sev, desc, pattern) in defs {
            if let Some(sig) = Signature::new(attack, sev, desc, pattern) {
                self.signatures.push(sig);
            }
        }
    }

    /// Classifies one event. Never fails: missing inputs arrive as empty
    /// strings / zero and yield a benign verdict. `&self` only — safe to
    /// call concurrently.
    pub fn classify(&self, url: &str, raw_request: &str, status_code: u16) -> Verdict {
        let text = format!("{} {}", url, raw_request);
        let mut verdict = Verdict::benign();

        for sig in &self.signatures {
            if sig.regex.is_match(&text) {
                verdict.is_attack = true;
                verdict.attack_type = sig.attack_type;
                verdict.severity = sig.severity;
                verdict.detection_reasons.push(sig.description.clone());
            }
        }

        if verdict.is_attack {
            verdict.is_successful = (200..400).contains(&status_code);
            warn!(
                attack = verdict.attack_type.label(),
                severity = verdict.severity.label(),
                status = status_code,
                url = %url.get(..200).unwrap_or(url),
                "attack signature matched"
            );
        }
        verdict
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }
}
