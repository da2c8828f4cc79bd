//! Saved-file repository: encoding, persistence and listing of PDF records

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Result, VaultError};
use super::store::KeyValueStore;

/// Storage key namespace for PDF records
pub const KEY_PREFIX: &str = "pdf:";

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

/// A persisted PDF record.
///
/// The stored JSON value carries `name`, `data` and `uploadDate`; the record
/// id doubles as the storage key and is never serialized into the value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileRecord {
    /// Storage key, `pdf:<unix-millis>_<suffix>`
    #[serde(skip)]
    pub id: String,
    /// Original file name, not validated for uniqueness
    pub name: String,
    /// Full file content as a base64 data URI
    pub data: String,
    /// RFC 3339 timestamp captured at upload time
    pub upload_date: String,
}

impl StoredFileRecord {
    /// Decode the data URI back to the original file bytes
    pub fn decoded_data(&self) -> Result<Vec<u8>> {
        let (_, payload) = self
            .data
            .split_once(',')
            .ok_or(VaultError::InvalidDataUri)?;
        Ok(BASE64.decode(payload)?)
    }

    /// Upload date formatted for display in the local timezone
    pub fn upload_date_display(&self) -> String {
        DateTime::parse_from_rfc3339(&self.upload_date)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| self.upload_date.clone())
    }
}

/// A file handed to the repository for saving
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    /// Whether the bytes look like a PDF file
    pub fn is_pdf(&self) -> bool {
        self.bytes.starts_with(PDF_MAGIC)
    }
}

/// Outcome of a batch save
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Number of records persisted
    pub saved: usize,
    /// Number of non-PDF inputs silently skipped
    pub skipped: usize,
    /// Per-file persistence failures, keyed by file name
    pub failures: Vec<(String, VaultError)>,
}

/// Repository over the saved-files namespace of a [`KeyValueStore`]
pub struct FileRepository {
    store: Arc<dyn KeyValueStore>,
}

impl FileRepository {
    /// Create a repository over `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist every PDF in `files`.
    ///
    /// Non-PDF inputs are skipped without error; a failure on one file is
    /// recorded in the report and does not abort the rest of the batch.
    pub fn save_files(&self, files: Vec<IncomingFile>) -> SaveReport {
        let mut report = SaveReport::default();
        for file in files {
            if !file.is_pdf() {
                tracing::info!("Skipping non-PDF input: {}", file.name);
                report.skipped += 1;
                continue;
            }
            match self.save_file(&file) {
                Ok(id) => {
                    tracing::info!("Saved {} as {}", file.name, id);
                    report.saved += 1;
                }
                Err(err) => {
                    tracing::error!("Failed to save {}: {}", file.name, err);
                    report.failures.push((file.name, err));
                }
            }
        }
        report
    }

    fn save_file(&self, file: &IncomingFile) -> Result<String> {
        let id = new_record_id();
        let record = StoredFileRecord {
            id: id.clone(),
            name: file.name.clone(),
            data: format!("data:application/pdf;base64,{}", BASE64.encode(&file.bytes)),
            upload_date: Utc::now().to_rfc3339(),
        };
        let value = serde_json::to_string(&record)
            .map_err(|_| VaultError::MalformedRecord(id.clone()))?;
        self.store.set(&id, &value)?;
        Ok(id)
    }

    /// List all saved records in key (upload) order.
    ///
    /// Keys whose fetch comes back empty, and values that fail to
    /// deserialize, are skipped rather than failing the listing.
    pub fn list_files(&self) -> Result<Vec<StoredFileRecord>> {
        let keys = self.store.list(KEY_PREFIX)?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            match self.fetch_record(&key) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => tracing::warn!("Skipping unreadable record {}: {}", key, err),
            }
        }
        Ok(records)
    }

    /// Fetch a single record by id, `None` if absent
    pub fn get_file(&self, id: &str) -> Result<Option<StoredFileRecord>> {
        self.fetch_record(id)
    }

    /// Remove a record. Removing an absent id is a no-op success.
    pub fn delete_file(&self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        tracing::info!("Deleted record {}", id);
        Ok(())
    }

    fn fetch_record(&self, id: &str) -> Result<Option<StoredFileRecord>> {
        let Some(value) = self.store.get(id)? else {
            return Ok(None);
        };
        let mut record: StoredFileRecord = serde_json::from_str(&value)
            .map_err(|_| VaultError::MalformedRecord(id.to_string()))?;
        record.id = id.to_string();
        Ok(Some(record))
    }
}

/// Generate a fresh record id: `pdf:<unix-millis>_<8-char suffix>`
fn new_record_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}_{}", KEY_PREFIX, Utc::now().timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    const PDF_BYTES: &[u8] = b"%PDF-1.4 fake body";

    fn test_repo() -> FileRepository {
        FileRepository::new(Arc::new(MemoryStore::new()))
    }

    fn incoming(name: &str, bytes: &[u8]) -> IncomingFile {
        IncomingFile {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_save_and_list_roundtrip() {
        let repo = test_repo();
        let report = repo.save_files(vec![incoming("a.pdf", PDF_BYTES)]);
        assert_eq!(report.saved, 1);
        assert!(report.failures.is_empty());

        let records = repo.list_files().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "a.pdf");
        assert_eq!(records[0].decoded_data().unwrap(), PDF_BYTES);
    }

    #[test]
    fn test_non_pdf_inputs_are_skipped() {
        let repo = test_repo();
        let report = repo.save_files(vec![incoming("notes.txt", b"plain text")]);
        assert_eq!(report.saved, 0);
        assert_eq!(report.skipped, 1);
        assert!(repo.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_record() {
        let repo = test_repo();
        repo.save_files(vec![incoming("a.pdf", PDF_BYTES)]);
        let id = repo.list_files().unwrap()[0].id.clone();

        repo.delete_file(&id).unwrap();
        assert!(repo.list_files().unwrap().is_empty());
        assert!(repo.get_file(&id).unwrap().is_none());
        // deleting again is a no-op
        repo.delete_file(&id).unwrap();
    }

    #[test]
    fn test_list_skips_corrupt_records() {
        let store = Arc::new(MemoryStore::new());
        let repo = FileRepository::new(store.clone());
        repo.save_files(vec![incoming("good.pdf", PDF_BYTES)]);
        store.set("pdf:0_corrupt", "{not json").unwrap();

        let records = repo.list_files().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "good.pdf");
    }

    #[test]
    fn test_record_id_format() {
        let id = new_record_id();
        assert!(id.starts_with(KEY_PREFIX));
        let rest = &id[KEY_PREFIX.len()..];
        let (millis, suffix) = rest.split_once('_').expect("separator");
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn test_records_list_in_upload_order() {
        let repo = test_repo();
        repo.save_files(vec![incoming("first.pdf", PDF_BYTES)]);
        repo.save_files(vec![incoming("second.pdf", PDF_BYTES)]);

        let names: Vec<_> = repo
            .list_files()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first.pdf", "second.pdf"]);
    }

    #[test]
    fn test_decoded_data_rejects_plain_payload() {
        let record = StoredFileRecord {
            id: "pdf:1_aaaaaaaa".to_string(),
            name: "a.pdf".to_string(),
            data: "no-comma-here".to_string(),
            upload_date: Utc::now().to_rfc3339(),
        };
        assert!(matches!(
            record.decoded_data(),
            Err(VaultError::InvalidDataUri)
        ));
    }

    #[test]
    fn test_wire_format_field_names() {
        let store = Arc::new(MemoryStore::new());
        let repo = FileRepository::new(store.clone());

        repo.save_files(vec![incoming("a.pdf", PDF_BYTES)]);
        let id = repo.list_files().unwrap()[0].id.clone();
        let raw = store.get(&id).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("name").is_some());
        assert!(value.get("uploadDate").is_some());
        assert!(value["data"]
            .as_str()
            .unwrap()
            .starts_with("data:application/pdf;base64,"));
    }
}
