pub mod manager;
pub mod parser;
pub mod types;

pub use manager::{FileRepository, FsFileRepository, LedgerManager, normalize_extension};
pub use parser::{LedgerError, REQUIRED_COLUMNS, parse_ledger};
pub use types::TransactionRecord;
