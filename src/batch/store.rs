//! CSV-backed batch storage

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use tracing::debug;

use super::{BatchRow, AMOUNT_COLUMN, BATCH_COLUMNS};
use crate::common::errors::{EngineError, Result};
use crate::common::traits::BatchStore;

/// Stores each batch as a CSV file with a `ticker,side` header
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvBatchStore;

impl CsvBatchStore {
    pub fn new() -> Self {
        Self
    }
}

fn read_error(path: &Path, reason: impl std::fmt::Display) -> EngineError {
    EngineError::BatchRead {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn write_error(path: &Path, reason: impl std::fmt::Display) -> EngineError {
    EngineError::BatchWrite {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

impl BatchStore for CsvBatchStore {
    fn read_batch(&self, path: &Path) -> Result<Vec<BatchRow>> {
        let file = File::open(path).map_err(|e| read_error(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows = Vec::new();
        for (index, record) in reader.deserialize::<BatchRow>().enumerate() {
            // Header is line 1
            let row = record.map_err(|e| read_error(path, format!("row {}: {}", index + 2, e)))?;
            rows.push(row);
        }

        debug!(path = %path.display(), rows = rows.len(), "Read batch");
        Ok(rows)
    }

    fn write_batch(&self, path: &Path, rows: &[BatchRow]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_error(path, e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| write_error(path, e))?;

        let with_amount = rows.iter().any(|row| row.amount.is_some());
        let mut header = BATCH_COLUMNS.to_vec();
        if with_amount {
            header.push(AMOUNT_COLUMN);
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(&header)
            .map_err(|e| write_error(path, e))?;
        for row in rows {
            let mut record = vec![row.ticker.clone(), row.side.to_string()];
            if with_amount {
                record.push(row.amount.map(|a| a.to_string()).unwrap_or_default());
            }
            writer
                .write_record(&record)
                .map_err(|e| write_error(path, e))?;
        }
        writer.flush().map_err(|e| write_error(path, e))?;

        debug!(path = %path.display(), rows = rows.len(), "Wrote batch");
        Ok(())
    }

    fn append_batch(&self, path: &Path, rows: &[BatchRow]) -> Result<()> {
        let mut existing = if path.exists() {
            self.read_batch(path)?
        } else {
            Vec::new()
        };
        existing.extend_from_slice(rows);
        self.write_batch(path, &existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Side;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_read_with_optional_amount_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        fs::write(&path, "ticker,side,amount\nAAPL,buy,100\nF, sell ,\n").unwrap();

        let rows = CsvBatchStore::new().read_batch(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, Some(dec!(100)));
        assert_eq!(rows[1].side, Side::Sell);
        assert_eq!(rows[1].amount, None);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvBatchStore::new()
            .read_batch(&dir.path().join("absent.csv"))
            .unwrap_err();
        assert!(matches!(err, EngineError::BatchRead { .. }));
    }

    #[test]
    fn test_unknown_side_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        fs::write(&path, "ticker,side\nAAPL,hold\n").unwrap();

        let err = CsvBatchStore::new().read_batch(&path).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_clear_leaves_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        fs::write(&path, "ticker,side\nAAPL,buy\n").unwrap();

        let store = CsvBatchStore::new();
        store.clear_batch(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ticker,side\n");
        assert!(store.read_batch(&path).unwrap().is_empty());
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("batch.csv");

        let store = CsvBatchStore::new();
        store
            .append_batch(&path, &[BatchRow::new("MSFT", Side::Buy)])
            .unwrap();
        store
            .append_batch(&path, &[BatchRow::new("TSLA", Side::Sell)])
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ticker,side\nMSFT,buy\nTSLA,sell\n"
        );
    }

    #[test]
    fn test_append_keeps_existing_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        fs::write(&path, "ticker,side,amount\nAAPL,buy,100\n").unwrap();

        let store = CsvBatchStore::new();
        store
            .append_batch(&path, &[BatchRow::new("F", Side::Sell)])
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ticker,side,amount\nAAPL,buy,100\nF,sell,\n"
        );
        let rows = store.read_batch(&path).unwrap();
        assert_eq!(rows[0].amount, Some(dec!(100)));
        assert_eq!(rows[1].amount, None);
    }
}
