//! Typed view over the external detection service's response. Field names
//! and shapes are the wire contract; keep them exactly in sync with the
//! service.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Default, Clone, Debug, PartialEq, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct SuspiciousAccount {
    pub account_id: String,
    /// Service's risk estimate, roughly 0-100.
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    #[serde(default)]
    pub ring_id: Option<String>,
}

#[derive(Default, Clone, Debug, PartialEq, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct FraudRing {
    pub ring_id: String,
    /// Unique within the ring.
    pub member_accounts: Vec<String>,
    pub pattern_type: String,
    pub risk_score: f64,
}

#[derive(Default, Clone, Debug, PartialEq, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct DetectionSummary {
    pub total_accounts_analyzed: u64,
    pub suspicious_accounts_flagged: u64,
    pub fraud_rings_detected: u64,
    pub processing_time_seconds: f64,
}

/// Immutable artifact of one detection run.
#[derive(Default, Clone, Debug, PartialEq, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct DetectionResult {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: DetectionSummary,
}
