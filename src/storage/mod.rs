// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::bbmp::models::SectionDocument;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Persists one section document as JSON, one file per
    /// (hid, category) key. The `columns` and `records` fields are
    /// stored as JSON-array strings, matching the published document
    /// shape consumed downstream.
    pub fn save_section_document(&self, doc: &SectionDocument) -> Result<PathBuf, StorageError> {
        let filename = format!("{}_{}.json", slugify(&doc.category), doc.hid);
        let file_path = self.base_dir.join(filename);

        let columns_json = serde_json::to_string(&doc.columns)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let records_json = serde_json::to_string(&doc.records)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut stored = serde_json::json!({
            "category": doc.category,
            "columns": columns_json,
            "records": records_json,
            "grand_total_beds": doc.grand_total_beds,
            "grand_occupied_beds": doc.grand_occupied_beds,
            "grand_available_beds": doc.grand_available_beds,
            "hid": doc.hid,
            "scraped_at": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(summary) = &doc.summary {
            stored["summary"] = serde_json::to_value(summary)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        }

        let stored_str = serde_json::to_string_pretty(&stored)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, stored_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved section document to {}", file_path.display());

        Ok(file_path)
    }
}

/// Filesystem-safe name derived from the category label.
fn slugify(category: &str) -> String {
    category
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbmp::models::FacilityRecord;

    fn sample_record(category: &str) -> FacilityRecord {
        FacilityRecord {
            snum: format!("{}_1", category),
            facility_type: "GenWard".to_string(),
            total_gen: 10,
            total_hdu: 2,
            total_icu: 3,
            total_ice_vent: 1,
            total_allot: 16,
            filled_gen: 5,
            filled_hdu: 1,
            filled_icu: 2,
            filled_icu_vent: 0,
            filled_allot: 8,
            net_gen: 5,
            net_hdu: 1,
            net_icu: 1,
            net_icu_vent: 1,
            net_allot: 8,
            total_beds: 16,
            total_occupied_beds: 8,
            total_available_beds: 8,
        }
    }

    #[test]
    fn stored_document_keeps_records_as_json_string() {
        let category = "Private Hospitals".to_string();
        let doc = SectionDocument {
            category: category.clone(),
            columns: vec!["Sl".to_string(), "Hospital".to_string()],
            records: vec![sample_record(&category)],
            grand_total_beds: 16,
            grand_occupied_beds: 8,
            grand_available_beds: 8,
            hid: 42,
            summary: None,
        };

        let dir = std::env::temp_dir().join(format!("bedstatus_test_{}", std::process::id()));
        let storage = StorageManager::new(&dir).expect("storage init failed");
        let path = storage.save_section_document(&doc).expect("save failed");

        let contents = fs::read_to_string(&path).expect("read failed");
        let stored: serde_json::Value = serde_json::from_str(&contents).expect("parse failed");

        assert_eq!(stored["category"], "Private Hospitals");
        assert_eq!(stored["hid"], 42);
        assert!(stored.get("summary").is_none());

        // records is a JSON-array string that parses back to the records
        let records_str = stored["records"].as_str().expect("records not a string");
        let parsed: Vec<FacilityRecord> =
            serde_json::from_str(records_str).expect("records round-trip failed");
        assert_eq!(parsed, doc.records);

        fs::remove_dir_all(&dir).ok();
    }
}
