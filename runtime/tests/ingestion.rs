use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::{Result, bail};
use async_trait::async_trait;
use muling_runtime::{
    SUPPORTED_EXTENSIONS,
    detection::{
        DetectionResult, DetectionService, DetectionSummary, FraudRing, SuspiciousAccount,
    },
    graph::{EdgeKind, NodeClass},
    ledger::{LedgerError, LedgerManager},
    pipeline::{IngestError, IngestionPhase, Pipeline},
};
use tempfile::TempDir;

const LEDGER: &str = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
T1,A,B,100,2024-01-01 00:00:00\n\
T2,B,C,250,2024-01-01 01:00:00\n";

enum StubBehavior {
    Succeed(DetectionResult),
    Fail(String),
}

struct StubDetector {
    behavior: StubBehavior,
    calls: AtomicUsize,
}

impl StubDetector {
    fn succeeding(result: DetectionResult) -> Arc<Self> {
        Arc::new(Self {
            behavior: StubBehavior::Succeed(result),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: StubBehavior::Fail(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetectionService for StubDetector {
    async fn detect(&self, _filename: &str, _ledger: &[u8]) -> Result<DetectionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Succeed(result) => Ok(result.clone()),
            StubBehavior::Fail(message) => bail!("{message}"),
        }
    }
}

fn sample_result() -> DetectionResult {
    DetectionResult {
        suspicious_accounts: vec![SuspiciousAccount {
            account_id: "B".to_string(),
            suspicion_score: 72.5,
            detected_patterns: vec!["cycle".to_string()],
            ring_id: Some("RING_001".to_string()),
        }],
        fraud_rings: vec![FraudRing {
            ring_id: "RING_001".to_string(),
            member_accounts: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            pattern_type: "cycle".to_string(),
            risk_score: 80.0,
        }],
        summary: DetectionSummary {
            total_accounts_analyzed: 3,
            suspicious_accounts_flagged: 1,
            fraud_rings_detected: 1,
            processing_time_seconds: 0.01,
        },
    }
}

async fn pipeline_with(dir: &TempDir, detector: Arc<StubDetector>) -> Result<Pipeline> {
    let manager = LedgerManager::new(dir.path().join("input"), SUPPORTED_EXTENSIONS).await?;
    Ok(Pipeline::new(manager, detector))
}

async fn write_ledger(pipeline: &Pipeline, filename: &str, contents: &str) -> Result<PathBuf> {
    let path = pipeline.ledger_manager().input_dir().join(filename);
    tokio::fs::write(&path, contents).await?;
    Ok(path)
}

#[tokio::test]
async fn successful_ingestion_assembles_graph_and_moves_ledger() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector.clone()).await?;
    let path = write_ledger(&pipeline, "ledger.csv", LEDGER).await?;

    let report = pipeline.ingest_file(&path, None).await?;
    assert_eq!(report.transactions, 2);
    assert_eq!(report.summary.fraud_rings_detected, 1);
    assert!(report.ledger_id.starts_with("ledger-"));
    assert!(report.track_id.starts_with("upload-"));
    assert_eq!(detector.calls(), 1);

    let snapshot = pipeline.session().snapshot();
    assert_eq!(snapshot.phase, IngestionPhase::Succeeded);
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.summary.unwrap().total_accounts_analyzed, 3);

    pipeline.session().with_graph(|graph| {
        let graph = graph.expect("graph assembled on success");
        assert_eq!(graph.node_count(), 3);
        // 2 transaction edges + 3 ring-pair edges.
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.node("B").unwrap().class, NodeClass::SuspiciousHigh);
        assert_eq!(graph.node("A").unwrap().class, NodeClass::Normal);
        assert_eq!(
            graph
                .edges()
                .filter(|e| e.kind == EdgeKind::RingCooccurrence)
                .count(),
            3
        );
    });

    // The consumed ledger leaves the input dir.
    assert!(!path.exists());
    assert!(
        pipeline
            .ledger_manager()
            .input_dir()
            .join("__processed__")
            .join("ledger.csv")
            .exists()
    );
    Ok(())
}

#[tokio::test]
async fn non_csv_filenames_are_rejected_before_anything_else() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector.clone()).await?;
    let path = write_ledger(&pipeline, "ledger.txt", LEDGER).await?;

    let err = pipeline.ingest_file(&path, None).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidFileType(_)));
    assert_eq!(detector.calls(), 0);

    let snapshot = pipeline.session().snapshot();
    assert_eq!(snapshot.phase, IngestionPhase::Failed);
    assert!(snapshot.error.unwrap().contains("invalid file type"));
    Ok(())
}

#[tokio::test]
async fn parse_failure_bypasses_the_upload() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector.clone()).await?;
    let path = write_ledger(
        &pipeline,
        "ledger.csv",
        "transaction_id,amount,timestamp\nT1,100,2024-01-01 00:00:00\n",
    )
    .await?;

    let err = pipeline.ingest_file(&path, None).await.unwrap_err();
    match err {
        IngestError::Ledger(LedgerError::MissingColumns(missing)) => {
            assert_eq!(missing, vec!["sender_id".to_string(), "receiver_id".to_string()]);
        }
        other => panic!("expected missing columns, got {other}"),
    }
    assert_eq!(detector.calls(), 0);
    assert!(
        pipeline
            .session()
            .snapshot()
            .error
            .unwrap()
            .contains("missing required columns: sender_id, receiver_id")
    );
    Ok(())
}

#[tokio::test]
async fn header_only_ledger_fails_as_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector.clone()).await?;
    let path = write_ledger(
        &pipeline,
        "ledger.csv",
        "transaction_id,sender_id,receiver_id,amount,timestamp\n",
    )
    .await?;

    let err = pipeline.ingest_file(&path, None).await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::Ledger(LedgerError::EmptyLedger)
    ));
    assert_eq!(detector.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_file_is_a_read_failure() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector.clone()).await?;
    let path = pipeline.ledger_manager().input_dir().join("missing.csv");

    let err = pipeline.ingest_file(&path, None).await.unwrap_err();
    assert!(matches!(err, IngestError::Read(_)));
    assert_eq!(detector.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn upload_failure_surfaces_the_service_message_and_releases_loading() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::failing("Detection error: graph construction blew up");
    let pipeline = pipeline_with(&dir, detector.clone()).await?;
    let path = write_ledger(&pipeline, "ledger.csv", LEDGER).await?;

    let err = pipeline.ingest_file(&path, None).await.unwrap_err();
    assert!(matches!(err, IngestError::Upload(_)));
    assert_eq!(detector.calls(), 1);

    let snapshot = pipeline.session().snapshot();
    assert_eq!(snapshot.phase, IngestionPhase::Failed);
    assert!(!snapshot.loading);
    assert!(
        snapshot
            .error
            .unwrap()
            .contains("Detection error: graph construction blew up")
    );
    assert!(pipeline.session().result().is_none());
    pipeline.session().with_graph(|graph| assert!(graph.is_none()));
    Ok(())
}

#[tokio::test]
async fn a_new_success_clears_a_previous_failure() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector.clone()).await?;

    let bad = write_ledger(&pipeline, "bad.csv", "not,a,ledger\nx,y,z\n").await?;
    assert!(pipeline.ingest_file(&bad, None).await.is_err());
    assert!(pipeline.session().snapshot().error.is_some());

    let good = write_ledger(&pipeline, "good.csv", LEDGER).await?;
    pipeline.ingest_file(&good, None).await?;

    let snapshot = pipeline.session().snapshot();
    assert_eq!(snapshot.phase, IngestionPhase::Succeeded);
    assert!(snapshot.error.is_none());
    assert!(pipeline.session().result().is_some());
    Ok(())
}

#[tokio::test]
async fn a_new_failure_clears_a_previous_result() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector.clone()).await?;

    let good = write_ledger(&pipeline, "good.csv", LEDGER).await?;
    pipeline.ingest_file(&good, None).await?;
    assert!(pipeline.session().result().is_some());

    let wrong = write_ledger(&pipeline, "wrong.txt", LEDGER).await?;
    assert!(pipeline.ingest_file(&wrong, None).await.is_err());

    let snapshot = pipeline.session().snapshot();
    assert_eq!(snapshot.phase, IngestionPhase::Failed);
    assert!(snapshot.error.is_some());
    assert!(pipeline.session().result().is_none());
    Ok(())
}

#[tokio::test]
async fn parsed_transactions_are_recorded_on_the_session() -> Result<()> {
    let dir = TempDir::new()?;
    let detector = StubDetector::succeeding(sample_result());
    let pipeline = pipeline_with(&dir, detector).await?;
    let path = write_ledger(&pipeline, "ledger.csv", LEDGER).await?;

    pipeline.ingest_file(&path, None).await?;

    let transactions = pipeline.session().transactions();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].transaction_id, "T1");
    assert_eq!(transactions[1].sender_id, "B");
    Ok(())
}
