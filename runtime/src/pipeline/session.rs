use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use ts_rs::TS;

use crate::{
    detection::{DetectionResult, DetectionSummary},
    graph::GraphModel,
    ledger::TransactionRecord,
};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum IngestionPhase {
    #[default]
    Idle,
    Validating,
    Parsing,
    Uploading,
    Succeeded,
    Failed,
}

/// State of the single ingestion session. `error` and `result` are mutually
/// exclusive: exactly one display state at a time.
#[derive(Default)]
struct SessionState {
    phase: IngestionPhase,
    loading: bool,
    error: Option<String>,
    ledger_id: Option<String>,
    transactions: Vec<TransactionRecord>,
    result: Option<DetectionResult>,
    graph: Option<GraphModel>,
}

/// Read-only view handed to presentation.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub phase: IngestionPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub ledger_id: Option<String>,
    pub summary: Option<DetectionSummary>,
}

/// Shared handle over the session. All writes go through the pipeline;
/// routes only read. Critical sections are short and never held across an
/// await.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a fresh submission; a previous result or error is
    /// discarded.
    pub fn begin(&self) {
        let mut state = self.write();
        *state = SessionState {
            phase: IngestionPhase::Validating,
            ..SessionState::default()
        };
    }

    pub fn advance(&self, phase: IngestionPhase) {
        self.write().phase = phase;
    }

    pub fn record_ledger(&self, ledger_id: String, transactions: Vec<TransactionRecord>) {
        let mut state = self.write();
        state.ledger_id = Some(ledger_id);
        state.transactions = transactions;
    }

    /// Success replaces any prior error. The graph is rebuilt from scratch,
    /// never patched incrementally.
    pub fn complete(&self, result: DetectionResult, graph: GraphModel) {
        let mut state = self.write();
        state.phase = IngestionPhase::Succeeded;
        state.error = None;
        state.result = Some(result);
        state.graph = Some(graph);
    }

    /// Failure replaces any prior result.
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.write();
        state.phase = IngestionPhase::Failed;
        state.error = Some(message.into());
        state.result = None;
        state.graph = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read();
        SessionSnapshot {
            phase: state.phase,
            loading: state.loading,
            error: state.error.clone(),
            ledger_id: state.ledger_id.clone(),
            summary: state.result.as_ref().map(|result| result.summary.clone()),
        }
    }

    pub fn result(&self) -> Option<DetectionResult> {
        self.read().result.clone()
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.read().transactions.clone()
    }

    pub fn with_graph<R>(&self, f: impl FnOnce(Option<&GraphModel>) -> R) -> R {
        let state = self.read();
        f(state.graph.as_ref())
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    fn set_loading(&self, loading: bool) {
        self.write().loading = loading;
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().expect("session lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().expect("session lock poisoned")
    }
}

/// Scoped `loading` toggle around the upload call. Dropping the guard
/// releases the flag on every exit path, failure included, so the flag
/// flips exactly once each way per upload.
pub struct LoadingGuard {
    session: SessionHandle,
}

impl LoadingGuard {
    pub fn acquire(session: &SessionHandle) -> Self {
        session.set_loading(true);
        Self {
            session: session.clone(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.session.set_loading(false);
    }
}
