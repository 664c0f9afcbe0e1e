pub mod error;
pub mod ingestion;
pub mod session;

pub mod utils;

pub use error::IngestError;
pub use ingestion::{IngestReport, Pipeline};
pub use session::{IngestionPhase, LoadingGuard, SessionHandle, SessionSnapshot};
