use std::path::Path;
use tracing::{info, warn};

use super::BatchRow;
use crate::common::errors::{EngineError, Result};
use crate::common::traits::BatchStore;
use crate::common::types::{OrderBook, OrderRequest};

/// Read a batch and collapse duplicate tickers
///
/// When a ticker appears more than once the row encountered last wins.
pub fn load_batch(store: &dyn BatchStore, source: &Path) -> Result<OrderBook> {
    let rows = store.read_batch(source)?;
    let total = rows.len();

    let requests = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| to_request(row).ok_or_else(|| EngineError::BatchRead {
            path: source.display().to_string(),
            reason: format!("row {} has an empty ticker", index + 2),
        }))
        .collect::<Result<Vec<_>>>()?;

    let book = OrderBook::from_requests(requests);
    if book.len() < total {
        warn!(
            batch = %source.display(),
            duplicates = total - book.len(),
            "Collapsed duplicate tickers"
        );
    }
    info!(batch = %source.display(), orders = book.len(), "Loaded order batch");
    Ok(book)
}

fn to_request(row: BatchRow) -> Option<OrderRequest> {
    let ticker = row.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return None;
    }
    Some(OrderRequest {
        ticker,
        side: row.side,
        raw_amount: row.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::MockBatchStore;
    use crate::common::types::Side;
    use pretty_assertions::assert_eq;

    fn store_with(rows: Vec<BatchRow>) -> MockBatchStore {
        let mut store = MockBatchStore::new();
        store
            .expect_read_batch()
            .returning(move |_| Ok(rows.clone()));
        store
    }

    #[test]
    fn test_last_row_wins() {
        let store = store_with(vec![
            BatchRow::new("aapl", Side::Buy),
            BatchRow::new("MSFT", Side::Buy),
            BatchRow::new("AAPL", Side::Sell),
            BatchRow::new("TSLA", Side::Sell),
            BatchRow::new("MSFT", Side::Sell),
        ]);

        let book = load_batch(&store, Path::new("batch.csv")).unwrap();
        let summary: Vec<_> = book
            .requests()
            .iter()
            .map(|r| (r.ticker.as_str(), r.side))
            .collect();

        assert_eq!(
            summary,
            vec![("AAPL", Side::Sell), ("TSLA", Side::Sell), ("MSFT", Side::Sell)]
        );
    }

    #[test]
    fn test_empty_batch_is_empty_book() {
        let store = store_with(Vec::new());
        let book = load_batch(&store, Path::new("batch.csv")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_blank_ticker_is_malformed() {
        let store = store_with(vec![BatchRow::new("  ", Side::Buy)]);
        let err = load_batch(&store, Path::new("batch.csv")).unwrap_err();
        assert!(matches!(err, EngineError::BatchRead { .. }));
    }

    #[test]
    fn test_read_failure_propagates() {
        let mut store = MockBatchStore::new();
        store.expect_read_batch().returning(|path| {
            Err(EngineError::BatchRead {
                path: path.display().to_string(),
                reason: "permission denied".to_string(),
            })
        });

        let err = load_batch(&store, Path::new("batch.csv")).unwrap_err();
        assert!(matches!(err, EngineError::BatchRead { .. }));
    }
}
