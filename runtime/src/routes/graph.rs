use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};

use super::types::{GraphEdgeResponse, GraphNodeResponse, GraphResponse};
use crate::AppState;

pub fn graph_routes() -> Router<Arc<AppState>> {
    Router::new().route("/graph", get(get_graph))
}

/// Current graph model, empty until a detection run has succeeded. The
/// rendering collaborator owns layout and interaction; this is data only.
async fn get_graph(State(state): State<Arc<AppState>>) -> Json<GraphResponse> {
    let response = state.pipeline.session().with_graph(|graph| {
        let Some(graph) = graph else {
            return GraphResponse {
                nodes: Vec::new(),
                edges: Vec::new(),
            };
        };

        let nodes = graph
            .nodes()
            .map(|node| GraphNodeResponse {
                id: node.id.clone(),
                suspicion_score: node.suspicion_score,
                patterns: node.patterns.clone(),
                ring_id: node.ring_id.clone(),
                class: node.class,
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| GraphEdgeResponse {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                kind: edge.kind,
                ring_id: edge.ring_id.clone(),
            })
            .collect();

        GraphResponse { nodes, edges }
    });

    Json(response)
}
