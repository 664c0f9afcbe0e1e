use std::{path::Path, sync::Arc};

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    detection::{DetectionService, DetectionSummary},
    graph::assemble,
    ledger::{LedgerManager, parse_ledger},
};

use super::{
    error::IngestError,
    session::{IngestionPhase, LoadingGuard, SessionHandle},
    utils::compute_mdhash_id,
};

/// Outcome of a successful ingestion, echoed back to the uploader.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub track_id: String,
    pub ledger_id: String,
    pub transactions: usize,
    pub summary: DetectionSummary,
}

/// Sequences one ledger through validate -> parse -> detect -> assemble and
/// records the outcome in the session state.
pub struct Pipeline {
    manager: LedgerManager,
    detector: Arc<dyn DetectionService>,
    session: SessionHandle,
    processing_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(manager: LedgerManager, detector: Arc<dyn DetectionService>) -> Self {
        Self {
            manager,
            detector,
            session: SessionHandle::new(),
            processing_lock: Mutex::new(()),
        }
    }

    pub fn ledger_manager(&self) -> &LedgerManager {
        &self.manager
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub async fn ingest_file(
        &self,
        file_path: &Path,
        track_id: Option<String>,
    ) -> Result<IngestReport, IngestError> {
        let track_id = track_id.unwrap_or_else(|| generate_track_id("upload"));

        // Overlapping submissions queue here, so the session is written by
        // one ingestion at a time.
        let _processing = self.processing_lock.lock().await;

        let filename = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        self.session.begin();
        if !self.manager.is_supported_file(&filename) {
            return self.abort(IngestError::InvalidFileType(filename));
        }

        self.session.advance(IngestionPhase::Parsing);
        let bytes = match self.manager.file_repo().read(file_path).await {
            Ok(bytes) => bytes,
            Err(err) => return self.abort(IngestError::Read(format!("{err:#}"))),
        };
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => return self.abort(IngestError::Read("ledger is not valid UTF-8".into())),
        };

        let transactions = match parse_ledger(&text) {
            Ok(transactions) => transactions,
            Err(err) => return self.abort(IngestError::from(err)),
        };
        let ledger_id = compute_mdhash_id(&text, "ledger-");
        self.session
            .record_ledger(ledger_id.clone(), transactions.clone());

        self.session.advance(IngestionPhase::Uploading);
        let detection = {
            let _loading = LoadingGuard::acquire(&self.session);
            self.detector.detect(&filename, text.as_bytes()).await
        };
        let detection = match detection {
            Ok(detection) => detection,
            Err(err) => return self.abort(IngestError::Upload(format!("{err:#}"))),
        };

        // Assembly is downstream of success, not part of the upload step.
        let graph = assemble(&transactions, &detection);
        let report = IngestReport {
            track_id,
            ledger_id,
            transactions: transactions.len(),
            summary: detection.summary.clone(),
        };
        self.session.complete(detection, graph);

        if let Err(err) = self.manager.move_to_processed(file_path).await {
            warn!(error = %err, "failed moving ledger to processed directory");
        }

        info!(
            track_id = %report.track_id,
            ledger_id = %report.ledger_id,
            transactions = report.transactions,
            "ledger ingested"
        );
        Ok(report)
    }

    fn abort(&self, err: IngestError) -> Result<IngestReport, IngestError> {
        self.session.fail(err.to_string());
        Err(err)
    }
}

fn generate_track_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}
