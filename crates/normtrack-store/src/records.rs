//! Append-only JSON store for submitted form records.
//!
//! Records live in a single `forms_data.json` under the uploads root. Every
//! write rewrites the whole file; there is no concurrent-writer safety and
//! no durability guarantee beyond the rewrite itself.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use normtrack_core::types::{FormRecord, FormType, RiskLevel};

use crate::error::StoreError;

/// Filter applied to dashboard queries. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub form_type: Option<FormType>,
    pub department: Option<String>,
}

impl DashboardFilter {
    fn matches(&self, record: &FormRecord) -> bool {
        if let Some(start) = self.start {
            if record.submitted_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if record.submitted_at > end {
                return false;
            }
        }
        if let Some(form_type) = self.form_type {
            if record.form_type != form_type {
                return false;
            }
        }
        if let Some(ref department) = self.department {
            if record.department != *department {
                return false;
            }
        }
        true
    }
}

/// JSON-file-backed store for form records.
pub struct RecordStore {
    base_dir: PathBuf,
    records_file: PathBuf,
}

impl RecordStore {
    /// Open a store rooted at `base_dir`, creating the directory tree, the
    /// per-form-type attachment directories, and an empty records file on
    /// first use.
    pub fn open(base_dir: impl Into<PathBuf>, records_file: &str) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        let records_file = base_dir.join(records_file);

        std::fs::create_dir_all(&base_dir)?;
        for form_type in [
            FormType::SopProduction,
            FormType::Hirarc,
            FormType::InternalAudit,
        ] {
            std::fs::create_dir_all(base_dir.join(form_type.dir_name()))?;
        }
        let store = Self {
            base_dir,
            records_file,
        };
        if !store.records_file.exists() {
            store.save(&[])?;
            info!(
                "Initialized empty records file at {}",
                store.records_file.display()
            );
        }
        Ok(store)
    }

    /// The uploads root this store was opened at.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load all records. A missing file reads as an empty list.
    pub fn load(&self) -> Result<Vec<FormRecord>, StoreError> {
        if !self.records_file.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.records_file)?;
        let records: Vec<FormRecord> = serde_json::from_str(&content)
            .map_err(|e| StoreError::RecordsFile(e.to_string()))?;
        Ok(records)
    }

    /// Rewrite the records file with the given set.
    pub fn save(&self, records: &[FormRecord]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.records_file, content)?;
        Ok(())
    }

    /// Append one record, stamping its submission time, and rewrite the file.
    ///
    /// Returns the stored record.
    pub fn append(&self, mut record: FormRecord) -> Result<FormRecord, StoreError> {
        record.submitted_at = Utc::now();
        let mut records = self.load()?;
        records.push(record.clone());
        self.save(&records)?;
        debug!(
            "Appended {} record {} ({} total)",
            record.form_type.label(),
            record.id,
            records.len()
        );
        Ok(record)
    }

    /// Records matching the given dashboard filter, in stored order.
    pub fn filter(&self, filter: &DashboardFilter) -> Result<Vec<FormRecord>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// Submission counts per form type.
    pub fn counts_by_type(&self) -> Result<BTreeMap<FormType, usize>, StoreError> {
        let mut counts = BTreeMap::new();
        for record in self.load()? {
            *counts.entry(record.form_type).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Risk-level counts per department, over records carrying a risk level.
    pub fn risk_levels_by_department(
        &self,
    ) -> Result<BTreeMap<String, BTreeMap<RiskLevel, usize>>, StoreError> {
        let mut table: BTreeMap<String, BTreeMap<RiskLevel, usize>> = BTreeMap::new();
        for record in self.load()? {
            if let Some(level) = record.risk_level() {
                *table
                    .entry(record.department.clone())
                    .or_default()
                    .entry(level)
                    .or_insert(0) += 1;
            }
        }
        Ok(table)
    }

    /// Submissions per calendar day (UTC), for the trend chart.
    pub fn daily_trend(&self) -> Result<BTreeMap<NaiveDate, usize>, StoreError> {
        let mut trend = BTreeMap::new();
        for record in self.load()? {
            *trend.entry(record.submitted_at.date_naive()).or_insert(0) += 1;
        }
        Ok(trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn make_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("uploads"), "forms_data.json").unwrap();
        (dir, store)
    }

    fn hirarc_record(department: &str, level: &str) -> FormRecord {
        FormRecord::new(FormType::Hirarc, department)
            .with_field("area_kerja", "Gudang")
            .with_field("tingkat_risiko", level)
    }

    #[test]
    fn test_open_creates_layout() {
        let (dir, store) = make_store();
        assert!(store.base_dir().join("forms_data.json").exists());
        assert!(dir.path().join("uploads").join("SOP_Produksi").is_dir());
        assert!(dir.path().join("uploads").join("HIRARC").is_dir());
        assert!(dir.path().join("uploads").join("Audit_Internal").is_dir());
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let (_dir, store) = make_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_reload() {
        let (_dir, store) = make_store();
        let stored = store
            .append(FormRecord::new(FormType::SopProduction, "Produksi"))
            .unwrap();
        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, stored.id);
        assert_eq!(records[0].form_type, FormType::SopProduction);
    }

    #[test]
    fn test_append_preserves_order() {
        let (_dir, store) = make_store();
        let first = store.append(hirarc_record("A", "Rendah")).unwrap();
        let second = store.append(hirarc_record("B", "Tinggi")).unwrap();
        let records = store.load().unwrap();
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1].id, second.id);
    }

    #[test]
    fn test_reopen_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        {
            let store = RecordStore::open(&uploads, "forms_data.json").unwrap();
            store
                .append(FormRecord::new(FormType::Hirarc, "Produksi"))
                .unwrap();
        }
        let store = RecordStore::open(&uploads, "forms_data.json").unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let (_dir, store) = make_store();
        std::fs::write(store.base_dir().join("forms_data.json"), "{ not json").unwrap();
        assert!(matches!(
            store.load(),
            Err(StoreError::RecordsFile(_))
        ));
    }

    #[test]
    fn test_filter_by_form_type_and_department() {
        let (_dir, store) = make_store();
        store.append(hirarc_record("Produksi", "Tinggi")).unwrap();
        store.append(hirarc_record("Gudang", "Rendah")).unwrap();
        store
            .append(FormRecord::new(FormType::SopProduction, "Produksi"))
            .unwrap();

        let filter = DashboardFilter {
            form_type: Some(FormType::Hirarc),
            department: Some("Produksi".to_string()),
            ..Default::default()
        };
        let hits = store.filter(&filter).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].department, "Produksi");
    }

    #[test]
    fn test_filter_by_time_range() {
        let (_dir, store) = make_store();
        store.append(hirarc_record("Produksi", "Sedang")).unwrap();

        let past_only = DashboardFilter {
            end: Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(store.filter(&past_only).unwrap().is_empty());

        let open_ended = DashboardFilter {
            start: Some(Utc::now() - Duration::hours(1)),
            ..Default::default()
        };
        assert_eq!(store.filter(&open_ended).unwrap().len(), 1);
    }

    #[test]
    fn test_counts_by_type() {
        let (_dir, store) = make_store();
        store.append(hirarc_record("A", "Rendah")).unwrap();
        store.append(hirarc_record("B", "Rendah")).unwrap();
        store
            .append(FormRecord::new(FormType::InternalAudit, "QA"))
            .unwrap();

        let counts = store.counts_by_type().unwrap();
        assert_eq!(counts.get(&FormType::Hirarc), Some(&2));
        assert_eq!(counts.get(&FormType::InternalAudit), Some(&1));
        assert_eq!(counts.get(&FormType::SopProduction), None);
    }

    #[test]
    fn test_risk_levels_by_department() {
        let (_dir, store) = make_store();
        store.append(hirarc_record("Produksi", "Tinggi")).unwrap();
        store.append(hirarc_record("Produksi", "Tinggi")).unwrap();
        store.append(hirarc_record("Produksi", "Rendah")).unwrap();
        store.append(hirarc_record("Gudang", "Sedang")).unwrap();
        // SOP record has no risk level; it must not appear
        store
            .append(FormRecord::new(FormType::SopProduction, "Produksi"))
            .unwrap();

        let table = store.risk_levels_by_department().unwrap();
        assert_eq!(table["Produksi"][&RiskLevel::High], 2);
        assert_eq!(table["Produksi"][&RiskLevel::Low], 1);
        assert_eq!(table["Gudang"][&RiskLevel::Medium], 1);
        assert_eq!(table["Produksi"].values().sum::<usize>(), 3);
    }

    #[test]
    fn test_daily_trend() {
        let (_dir, store) = make_store();
        store.append(hirarc_record("A", "Rendah")).unwrap();
        store.append(hirarc_record("B", "Rendah")).unwrap();

        let trend = store.daily_trend().unwrap();
        let today = Utc::now().date_naive();
        assert_eq!(trend.get(&today), Some(&2));
        assert_eq!(trend.len(), 1);
    }

    #[test]
    fn test_empty_store_aggregations() {
        let (_dir, store) = make_store();
        assert!(store.counts_by_type().unwrap().is_empty());
        assert!(store.risk_levels_by_department().unwrap().is_empty());
        assert!(store.daily_trend().unwrap().is_empty());
        assert!(store
            .filter(&DashboardFilter::default())
            .unwrap()
            .is_empty());
    }
}
