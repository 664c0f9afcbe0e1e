//! Offline rendering demo: assemble the account graph from a ledger (and an
//! optional downloaded detection result) and write it out as Graphviz DOT.
//!
//!     cargo run --example render_graph -- ledger.csv [detection.json]

use std::path::PathBuf;

use anyhow::{Context, Result};
use muling_runtime::{
    detection::DetectionResult,
    graph::{assemble, render_dot},
    ledger::parse_ledger,
};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let ledger_path = PathBuf::from(
        args.next()
            .context("usage: render_graph <ledger.csv> [detection.json]")?,
    );
    let detection_path = args.next().map(PathBuf::from);

    let raw = tokio::fs::read_to_string(&ledger_path)
        .await
        .with_context(|| format!("failed to read ledger at {}", ledger_path.display()))?;
    let transactions = parse_ledger(&raw)?;

    let detection = match detection_path {
        Some(path) => {
            let body = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read detection result at {}", path.display()))?;
            serde_json::from_str::<DetectionResult>(&body)
                .with_context(|| format!("failed to decode detection result at {}", path.display()))?
        }
        None => DetectionResult::default(),
    };

    let graph = assemble(&transactions, &detection);
    println!(
        "Assembled graph ({} accounts, {} edges)",
        graph.node_count(),
        graph.edge_count()
    );

    tokio::fs::write("graph.dot", render_dot(&graph)).await?;
    println!("Wrote graph.dot");
    Ok(())
}
