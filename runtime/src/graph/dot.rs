use std::fmt::Write;

use super::types::{EdgeKind, GraphModel, NodeClass};

/// Graphviz rendering of an assembled graph. Node fills follow the same
/// classification the interactive renderer styles on; ring edges are drawn
/// dashed and undirected.
pub fn render_dot(model: &GraphModel) -> String {
    let mut output = String::new();
    writeln!(
        &mut output,
        "digraph MulingGraph {{\n    graph [bgcolor=\"#0d1117\", fontname=\"Inter\", rankdir=LR, splines=true, overlap=false, pad=0.4];\n    node [style=filled, fontname=\"Inter\", fontsize=10, shape=ellipse, fontcolor=\"#e6edf3\"];\n    edge [arrowsize=0.7, penwidth=1.1];"
    )
    .unwrap();

    for node in model.nodes() {
        let fill = match node.class {
            NodeClass::SuspiciousHigh => "#e53e3e",
            NodeClass::SuspiciousMedium => "#f6ad55",
            NodeClass::Normal => "#667eea",
        };
        writeln!(
            &mut output,
            "    \"{}\" [fillcolor=\"{}\", tooltip=\"score {:.1}\"];",
            node.id, fill, node.suspicion_score
        )
        .unwrap();
    }

    for edge in model.edges() {
        match edge.kind {
            EdgeKind::Transaction => writeln!(
                &mut output,
                "    \"{}\" -> \"{}\" [color=\"#8b949e\"];",
                edge.source, edge.target
            )
            .unwrap(),
            EdgeKind::RingCooccurrence => writeln!(
                &mut output,
                "    \"{}\" -> \"{}\" [color=\"#d29922\", style=dashed, dir=none];",
                edge.source, edge.target
            )
            .unwrap(),
        }
    }

    output.push_str("}\n");
    output
}
