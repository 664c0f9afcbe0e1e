use std::collections::{HashMap, HashSet};

use crate::{
    detection::{DetectionResult, SuspiciousAccount},
    ledger::TransactionRecord,
};

use super::types::{EdgeKind, GraphEdge, GraphModel, GraphNode, NodeClass};

/// Build the account graph for one detection run.
///
/// The node set is the union of transaction endpoints and every account the
/// detection result names (suspicious accounts and ring members), each
/// exactly once; when no transactions are supplied the detection result
/// alone determines the nodes, so a previously-downloaded result still
/// renders. One transaction edge per ledger row keeps parallel transfers
/// visible; ring edges connect every unordered member pair once per ring.
/// Insertion order is keyed by first occurrence, so identical inputs
/// assemble identical graphs.
pub fn assemble(transactions: &[TransactionRecord], detection: &DetectionResult) -> GraphModel {
    let mut flagged: HashMap<&str, &SuspiciousAccount> = HashMap::new();
    for account in &detection.suspicious_accounts {
        flagged.entry(account.account_id.as_str()).or_insert(account);
    }

    let candidate_ids = transactions
        .iter()
        .flat_map(|tx| [tx.sender_id.as_str(), tx.receiver_id.as_str()])
        .chain(
            detection
                .suspicious_accounts
                .iter()
                .map(|account| account.account_id.as_str()),
        )
        .chain(
            detection
                .fraud_rings
                .iter()
                .flat_map(|ring| ring.member_accounts.iter().map(String::as_str)),
        );

    let mut model = GraphModel::new();
    for account_id in candidate_ids {
        if model.contains_account(account_id) {
            continue;
        }
        let node = match flagged.get(account_id) {
            Some(account) => GraphNode {
                id: account_id.to_string(),
                suspicion_score: account.suspicion_score,
                patterns: account.detected_patterns.clone(),
                ring_id: account.ring_id.clone(),
                class: NodeClass::from_score(account.suspicion_score),
            },
            None => GraphNode {
                id: account_id.to_string(),
                ..GraphNode::default()
            },
        };
        model.add_node(node);
    }

    // The row ordinal keeps repeated sender/receiver pairs distinct; the
    // ledger is a multigraph.
    for (ordinal, tx) in transactions.iter().enumerate() {
        model.add_edge(GraphEdge {
            id: format!("tx-{}-{}-{}", tx.sender_id, tx.receiver_id, ordinal),
            source: tx.sender_id.clone(),
            target: tx.receiver_id.clone(),
            kind: EdgeKind::Transaction,
            ring_id: None,
        });
    }

    let mut seen_ring_pairs: HashSet<String> = HashSet::new();
    for ring in &detection.fraud_rings {
        let members = &ring.member_accounts;
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let (source, target) = (&members[i], &members[j]);
                if source == target {
                    continue;
                }
                let id = format!("ring-{}-{}-{}", source, target, ring.ring_id);
                if !seen_ring_pairs.insert(id.clone()) {
                    continue;
                }
                model.add_edge(GraphEdge {
                    id,
                    source: source.clone(),
                    target: target.clone(),
                    kind: EdgeKind::RingCooccurrence,
                    ring_id: Some(ring.ring_id.clone()),
                });
            }
        }
    }

    model
}
