//! Shared types for the traffic analysis pipeline.

use chrono::{DateTime, Utc};

/// Verdict severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Attack categories the pipeline can label an event with. `None` marks a
/// benign event; the last four are produced only by capture ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AttackType {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "SQL Injection")]
    SqlInjection,
    #[serde(rename = "XSS")]
    Xss,
    #[serde(rename = "Directory Traversal")]
    DirectoryTraversal,
    #[serde(rename = "SSRF")]
    Ssrf,
    #[serde(rename = "Command Injection")]
    CommandInjection,
    #[serde(rename = "Auth Bypass")]
    AuthBypass,
    #[serde(rename = "File Upload")]
    FileUpload,
    #[serde(rename = "JSONP Injection")]
    JsonpInjection,
}

impl AttackType {
    pub fn label(&self) -> &'static str {
        match self {
            AttackType::None => "NONE",
            AttackType::SqlInjection => "SQL Injection",
            AttackType::Xss => "XSS",
            AttackType::DirectoryTraversal => "Directory Traversal",
            AttackType::Ssrf => "SSRF",
            AttackType::CommandInjection => "Command Injection",
            AttackType::AuthBypass => "Auth Bypass",
            AttackType::FileUpload => "File Upload",
            AttackType::JsonpInjection => "JSONP Injection",
        }
    }
}

/// Classification outcome for one HTTP event. Computed once at ingestion
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_attack: bool,
    pub attack_type: AttackType,
    pub severity: Severity,
    pub is_successful: bool,
    pub detection_reasons: Vec<String>,
}

impl Verdict {
    pub fn benign() -> Self {
        Verdict {
            is_attack: false,
            attack_type: AttackType::None,
            severity: Severity::Low,
            is_successful: false,
            detection_reasons: Vec::new(),
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::benign()
    }
}

/// One observed (or synthesized) HTTP transaction as delivered by a
/// producer, before the store has assigned an identifier. Missing fields
/// default to empty / zero; a producer that already labeled the event
/// (e.g. capture ingestion) supplies `classification` and the store
/// trusts it verbatim.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub src_ip: String,
    #[serde(default)]
    pub dest_ip: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Verdict>,
}

/// A stored, classified HTTP transaction. The verdict is flattened so the
/// dashboard sees `isAttack`, `attackType`, … as top-level fields.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEventRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub src_ip: String,
    pub dest_ip: String,
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_request: Option<String>,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl HttpEventRecord {
    /// Builds the immutable record from a normalized input and its
    /// verdict. Every classification field is set here; nothing is merged
    /// from partially populated inputs.
    pub fn from_classified(id: String, input: EventInput, verdict: Verdict) -> Self {
        HttpEventRecord {
            id,
            timestamp: input.timestamp,
            src_ip: input.src_ip,
            dest_ip: input.dest_ip,
            method: input.method,
            url: input.url,
            status_code: input.status_code,
            user_agent: input.user_agent,
            raw_request: input.raw_request,
            verdict,
        }
    }
}
