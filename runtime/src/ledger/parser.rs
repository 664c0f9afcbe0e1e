use thiserror::Error;

use super::types::TransactionRecord;

/// Columns every ledger must carry, in any order. Unknown columns are
/// ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No header at all, or a header with no data rows.
    #[error("ledger is empty or has no data rows")]
    EmptyLedger,

    /// Every required column absent from the header, reported together.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Required-column positions resolved by name against the header, once.
struct ColumnLayout {
    transaction_id: usize,
    sender_id: usize,
    receiver_id: usize,
    amount: usize,
    timestamp: usize,
}

impl ColumnLayout {
    fn resolve(header: &[String]) -> Result<Self, LedgerError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !header.iter().any(|field| field == *column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::MissingColumns(missing));
        }

        let position = |name: &str| {
            header
                .iter()
                .position(|field| field == name)
                .expect("required column present in header")
        };
        Ok(Self {
            transaction_id: position("transaction_id"),
            sender_id: position("sender_id"),
            receiver_id: position("receiver_id"),
            amount: position("amount"),
            timestamp: position("timestamp"),
        })
    }

    /// Highest index a row must reach for every required field to exist.
    fn widest(&self) -> usize {
        self.transaction_id
            .max(self.sender_id)
            .max(self.receiver_id)
            .max(self.amount)
            .max(self.timestamp)
    }
}

/// Decode a raw delimited-text ledger into transaction records.
///
/// Pure transform. Blank lines are discarded before the header is read,
/// header fields are matched case-insensitively in any order, and rows too
/// short to reach every required column are skipped rather than fatal. A
/// malformed amount parses to NaN instead of aborting the ledger; see
/// DESIGN.md before tightening that.
pub fn parse_ledger(raw: &str) -> Result<Vec<TransactionRecord>, LedgerError> {
    let lines: Vec<&str> = raw.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(LedgerError::EmptyLedger);
    }

    let header: Vec<String> = lines[0]
        .split(',')
        .map(|field| field.trim().to_lowercase())
        .collect();
    let layout = ColumnLayout::resolve(&header)?;
    let widest = layout.widest();

    let mut records = Vec::with_capacity(lines.len() - 1);
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() <= widest {
            continue;
        }
        records.push(TransactionRecord {
            transaction_id: fields[layout.transaction_id].to_string(),
            sender_id: fields[layout.sender_id].to_string(),
            receiver_id: fields[layout.receiver_id].to_string(),
            amount: fields[layout.amount].parse::<f64>().unwrap_or(f64::NAN),
            timestamp: fields[layout.timestamp].to_string(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str =
        "transaction_id,sender_id,receiver_id,amount,timestamp\nT1,A,B,100,2024-01-01";

    #[test]
    fn parses_a_single_data_row() {
        let records = parse_ledger(CANONICAL).unwrap();
        assert_eq!(
            records,
            vec![TransactionRecord {
                transaction_id: "T1".to_string(),
                sender_id: "A".to_string(),
                receiver_id: "B".to_string(),
                amount: 100.0,
                timestamp: "2024-01-01".to_string(),
            }]
        );
    }

    #[test]
    fn header_order_is_irrelevant() {
        let permuted =
            "timestamp,amount,receiver_id,sender_id,transaction_id\n2024-01-01,100,B,A,T1";
        assert_eq!(
            parse_ledger(permuted).unwrap(),
            parse_ledger(CANONICAL).unwrap()
        );
    }

    #[test]
    fn header_fields_are_trimmed_and_lowercased() {
        let sloppy = " Transaction_ID , SENDER_id ,receiver_id, amount ,timestamp\nT1,A,B,100,2024-01-01";
        assert_eq!(parse_ledger(sloppy).unwrap().len(), 1);
    }

    #[test]
    fn reports_every_missing_column_together() {
        let ledger = "transaction_id,amount,timestamp\nT1,100,2024-01-01";
        let err = parse_ledger(ledger).unwrap_err();
        assert_eq!(
            err,
            LedgerError::MissingColumns(vec![
                "sender_id".to_string(),
                "receiver_id".to_string()
            ])
        );
    }

    #[test]
    fn header_only_ledger_is_empty() {
        let err = parse_ledger("transaction_id,sender_id,receiver_id,amount,timestamp\n");
        assert_eq!(err.unwrap_err(), LedgerError::EmptyLedger);
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        assert_eq!(parse_ledger("  \n\n \t \n").unwrap_err(), LedgerError::EmptyLedger);
    }

    #[test]
    fn blank_lines_are_discarded_before_header_and_rows() {
        let ledger =
            "\n\ntransaction_id,sender_id,receiver_id,amount,timestamp\n\nT1,A,B,100,2024-01-01\n\n";
        assert_eq!(parse_ledger(ledger).unwrap().len(), 1);
    }

    #[test]
    fn short_rows_are_silently_skipped() {
        let ledger = "transaction_id,sender_id,receiver_id,amount,timestamp\nT1,A,B\nT2,A,B,50,2024-01-02";
        let records = parse_ledger(ledger).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_id, "T2");
    }

    #[test]
    fn malformed_amount_parses_to_nan() {
        let ledger = "transaction_id,sender_id,receiver_id,amount,timestamp\nT1,A,B,oops,2024-01-01";
        let records = parse_ledger(ledger).unwrap();
        assert!(records[0].amount.is_nan());
    }

    #[test]
    fn extra_columns_are_ignored() {
        let ledger = "memo,transaction_id,sender_id,receiver_id,amount,timestamp\nhello,T1,A,B,42.5,2024-01-01";
        let records = parse_ledger(ledger).unwrap();
        assert_eq!(records[0].amount, 42.5);
        assert_eq!(records[0].sender_id, "A");
    }

    #[test]
    fn fields_are_trimmed_per_row() {
        let ledger =
            "transaction_id,sender_id,receiver_id,amount,timestamp\n T1 , A , B , 100 , 2024-01-01 ";
        let records = parse_ledger(ledger).unwrap();
        assert_eq!(records[0].sender_id, "A");
        assert_eq!(records[0].timestamp, "2024-01-01");
    }
}
