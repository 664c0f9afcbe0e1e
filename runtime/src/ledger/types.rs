use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One validated data row of an uploaded ledger. Immutable for the lifetime
/// of the ingestion session that produced it.
#[derive(Default, Clone, Debug, PartialEq, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub timestamp: String,
}
