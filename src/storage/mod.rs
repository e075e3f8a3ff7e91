// src/storage/mod.rs
use crate::extractors::spending::SpendingRecord;
use crate::utils::error::{AppError, StorageError};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Where one extraction run writes its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Csv(PathBuf),
    Sqlite(PathBuf),
}

impl OutputTarget {
    /// Resolves the two optional CLI destinations into exactly one target.
    /// Zero or both supplied is a configuration error, raised before any
    /// row is processed.
    pub fn resolve(csv: Option<PathBuf>, sqlite: Option<PathBuf>) -> Result<Self, AppError> {
        match (csv, sqlite) {
            (Some(path), None) => Ok(OutputTarget::Csv(path)),
            (None, Some(path)) => Ok(OutputTarget::Sqlite(path)),
            (Some(_), Some(_)) => Err(AppError::Config(
                "Supply either --csv or --sqlite, not both".to_string(),
            )),
            (None, None) => Err(AppError::Config(
                "One of --csv or --sqlite is required".to_string(),
            )),
        }
    }
}

pub struct StorageManager;

impl StorageManager {
    pub fn new() -> Self {
        Self
    }

    /// Writes the record collection to the chosen destination and returns
    /// the path written.
    pub fn save(
        &self,
        records: &[SpendingRecord],
        target: &OutputTarget,
    ) -> Result<PathBuf, StorageError> {
        match target {
            OutputTarget::Csv(path) => self.save_to_csv(records, path),
            OutputTarget::Sqlite(path) => self.save_to_sqlite(records, path),
        }
    }

    /// Saves records as UTF-8 delimited text. The header row comes from the
    /// record's field names in declaration order.
    ///
    /// An empty collection is a `StorageError::NoRecords`, not a silent
    /// header-only file.
    pub fn save_to_csv(
        &self,
        records: &[SpendingRecord],
        path: &Path,
    ) -> Result<PathBuf, StorageError> {
        if records.is_empty() {
            return Err(StorageError::NoRecords);
        }

        tracing::info!("Saving {} records to CSV file {}", records.len(), path.display());
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(path.to_path_buf())
    }

    /// Saves records into the `spending_data` table, creating it if absent.
    ///
    /// The schema is static DDL with one TEXT column per record field in
    /// declaration order; values are bound as parameters, one insert per
    /// record, all inside a single transaction committed at the end.
    pub fn save_to_sqlite(
        &self,
        records: &[SpendingRecord],
        path: &Path,
    ) -> Result<PathBuf, StorageError> {
        if records.is_empty() {
            return Err(StorageError::NoRecords);
        }

        tracing::info!(
            "Saving {} records to SQLite database {}",
            records.len(),
            path.display()
        );
        let mut conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS spending_data (
                 company TEXT,
                 cardholder TEXT,
                 vendor TEXT,
                 date TEXT,
                 amount TEXT
             )",
            [],
        )?;

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO spending_data (company, cardholder, vendor, date, amount)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(rusqlite::params![
                    record.company,
                    record.cardholder,
                    record.vendor,
                    record.date,
                    record.amount.to_string(),
                ])?;
            }
        }
        tx.commit()?;

        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<SpendingRecord> {
        vec![
            SpendingRecord {
                company: "Acme Inc".to_string(),
                cardholder: "JOHN DOE".to_string(),
                vendor: "Office Depot".to_string(),
                date: "01/02/2025".to_string(),
                amount: 12.34,
            },
            SpendingRecord {
                company: "Beta LLC".to_string(),
                cardholder: "RENÉE DUBOIS".to_string(),
                vendor: "Delta Air".to_string(),
                date: "01/15/2025".to_string(),
                amount: 1234.56,
            },
        ]
    }

    #[test]
    fn csv_sink_writes_header_and_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        StorageManager::new().save_to_csv(&sample_records(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("company,cardholder,vendor,date,amount"));
        assert_eq!(lines.count(), 2);
        // Extended characters in names must survive the write.
        assert!(contents.contains("RENÉE DUBOIS"));
    }

    #[test]
    fn sqlite_sink_creates_table_and_inserts_all_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.db");

        StorageManager::new().save_to_sqlite(&sample_records(), &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM spending_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let vendor: String = conn
            .query_row(
                "SELECT vendor FROM spending_data WHERE cardholder = ?1",
                ["JOHN DOE"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(vendor, "Office Depot");
    }

    #[test]
    fn sqlite_sink_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.db");
        let manager = StorageManager::new();

        manager.save_to_sqlite(&sample_records(), &path).unwrap();
        manager.save_to_sqlite(&sample_records(), &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM spending_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn empty_collection_is_an_error_for_both_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out.csv");
        let db_path = dir.path().join("out.db");
        let manager = StorageManager::new();

        assert!(matches!(
            manager.save_to_csv(&[], &csv_path),
            Err(StorageError::NoRecords)
        ));
        assert!(matches!(
            manager.save_to_sqlite(&[], &db_path),
            Err(StorageError::NoRecords)
        ));
        // Nothing may be created on the refused write.
        assert!(!csv_path.exists());
        assert!(!db_path.exists());
    }

    #[test]
    fn exactly_one_destination_must_be_supplied() {
        let path = PathBuf::from("out.csv");

        assert!(matches!(
            OutputTarget::resolve(None, None),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            OutputTarget::resolve(Some(path.clone()), Some(path.clone())),
            Err(AppError::Config(_))
        ));
        assert_eq!(
            OutputTarget::resolve(Some(path.clone()), None).unwrap(),
            OutputTarget::Csv(path.clone())
        );
        assert_eq!(
            OutputTarget::resolve(None, Some(path.clone())).unwrap(),
            OutputTarget::Sqlite(path)
        );
    }
}
