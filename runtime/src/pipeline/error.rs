use thiserror::Error;

use crate::ledger::LedgerError;

/// Terminal failures of one ingestion attempt; none are retried. Parser and
/// validation failures abort before any network call.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid file type '{0}': only .csv ledgers are accepted")]
    InvalidFileType(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("failed to read ledger: {0}")]
    Read(String),

    #[error("detection upload failed: {0}")]
    Upload(String),
}
