use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    detection::DetectionSummary,
    graph::{EdgeKind, NodeClass},
    pipeline::IngestionPhase,
};

#[derive(Default, Clone, Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct GraphNodeResponse {
    pub id: String,
    pub suspicion_score: f64,
    pub patterns: Vec<String>,
    pub ring_id: Option<String>,
    pub class: NodeClass,
}

#[derive(Default, Clone, Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct GraphEdgeResponse {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub ring_id: Option<String>,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNodeResponse>,
    pub edges: Vec<GraphEdgeResponse>,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct IngestResponse {
    pub status: String,
    pub message: String,
    pub track_id: String,
    pub ledger_id: String,
    pub transactions: usize,
    pub summary: DetectionSummary,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct StatusResponse {
    pub phase: IngestionPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub ledger_id: Option<String>,
    pub summary: Option<DetectionSummary>,
}
