use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Suspicion classification the rendering collaborator styles on.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum NodeClass {
    #[default]
    Normal,
    SuspiciousMedium,
    SuspiciousHigh,
}

impl NodeClass {
    /// Strictly above 50 is high; any positive score is medium; zero is
    /// normal even for accounts the service lists.
    pub fn from_score(score: f64) -> Self {
        if score > 50.0 {
            Self::SuspiciousHigh
        } else if score > 0.0 {
            Self::SuspiciousMedium
        } else {
            Self::Normal
        }
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    #[default]
    Transaction,
    RingCooccurrence,
}

/// One account.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub suspicion_score: f64,
    pub patterns: Vec<String>,
    pub ring_id: Option<String>,
    pub class: NodeClass,
}

/// One transaction or one ring co-membership pair. The id encodes
/// (kind, source, target, disambiguator), so identical inputs always
/// produce identical edge sets.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub ring_id: Option<String>,
}

/// Directed multigraph handed to the rendering collaborator. Node and edge
/// iteration follows insertion order, which the assembler keys by first
/// occurrence.
#[derive(Default, Clone, Debug)]
pub struct GraphModel {
    graph: StableDiGraph<GraphNode, GraphEdge>,
    account_index: HashMap<String, NodeIndex>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_account(&self, account_id: &str) -> bool {
        self.account_index.contains_key(account_id)
    }

    /// Idempotent on the account id: re-adding returns the existing index.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&index) = self.account_index.get(&node.id) {
            return index;
        }
        let account_id = node.id.clone();
        let index = self.graph.add_node(node);
        self.account_index.insert(account_id, index);
        index
    }

    /// Skips edges whose endpoints were never added; returns whether the
    /// edge landed.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        let source = match self.account_index.get(&edge.source) {
            Some(index) => *index,
            None => return false,
        };
        let target = match self.account_index.get(&edge.target) {
            Some(index) => *index,
            None => return false,
        };
        self.graph.add_edge(source, target, edge);
        true
    }

    pub fn node(&self, account_id: &str) -> Option<&GraphNode> {
        self.account_index
            .get(account_id)
            .and_then(|index| self.graph.node_weight(*index))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.graph.edge_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_and_kind_serialize_to_renderer_vocabulary() {
        assert_eq!(
            serde_json::to_string(&NodeClass::SuspiciousHigh).unwrap(),
            "\"suspicious-high\""
        );
        assert_eq!(
            serde_json::to_string(&NodeClass::SuspiciousMedium).unwrap(),
            "\"suspicious-medium\""
        );
        assert_eq!(
            serde_json::to_string(&NodeClass::Normal).unwrap(),
            "\"normal\""
        );
        assert_eq!(
            serde_json::to_string(&EdgeKind::Transaction).unwrap(),
            "\"transaction\""
        );
        assert_eq!(
            serde_json::to_string(&EdgeKind::RingCooccurrence).unwrap(),
            "\"ring-cooccurrence\""
        );
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(NodeClass::from_score(50.0), NodeClass::SuspiciousMedium);
        assert_eq!(NodeClass::from_score(50.1), NodeClass::SuspiciousHigh);
        assert_eq!(NodeClass::from_score(0.0), NodeClass::Normal);
        assert_eq!(NodeClass::from_score(0.1), NodeClass::SuspiciousMedium);
    }

    #[test]
    fn readding_an_account_keeps_one_node() {
        let mut model = GraphModel::new();
        let first = model.add_node(GraphNode {
            id: "A".to_string(),
            ..GraphNode::default()
        });
        let second = model.add_node(GraphNode {
            id: "A".to_string(),
            suspicion_score: 99.0,
            ..GraphNode::default()
        });
        assert_eq!(first, second);
        assert_eq!(model.node_count(), 1);
        // First occurrence wins.
        assert_eq!(model.node("A").unwrap().suspicion_score, 0.0);
    }

    #[test]
    fn edges_with_unknown_endpoints_are_dropped() {
        let mut model = GraphModel::new();
        model.add_node(GraphNode {
            id: "A".to_string(),
            ..GraphNode::default()
        });
        let landed = model.add_edge(GraphEdge {
            id: "tx-A-B-0".to_string(),
            source: "A".to_string(),
            target: "B".to_string(),
            ..GraphEdge::default()
        });
        assert!(!landed);
        assert_eq!(model.edge_count(), 0);
    }
}
