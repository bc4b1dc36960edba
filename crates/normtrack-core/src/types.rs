use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The kind of ISO management form a record belongs to.
///
/// Serialized with the user-facing Indonesian labels so stored records match
/// what the forms display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormType {
    /// Standard operating procedure for production.
    #[serde(rename = "SOP Produksi")]
    SopProduction,
    /// Hazard identification, risk assessment and risk control.
    #[serde(rename = "HIRARC")]
    Hirarc,
    /// Internal audit finding.
    #[serde(rename = "Audit Internal")]
    InternalAudit,
}

impl FormType {
    /// The user-facing label, as shown on forms and stored in records.
    pub fn label(&self) -> &'static str {
        match self {
            FormType::SopProduction => "SOP Produksi",
            FormType::Hirarc => "HIRARC",
            FormType::InternalAudit => "Audit Internal",
        }
    }

    /// Directory name used for attachments of this form type.
    pub fn dir_name(&self) -> &'static str {
        match self {
            FormType::SopProduction => "SOP_Produksi",
            FormType::Hirarc => "HIRARC",
            FormType::InternalAudit => "Audit_Internal",
        }
    }

    /// The fields that must be present and non-blank for this form type.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            FormType::SopProduction => &[
                "nomor_sop",
                "judul_sop",
                "departemen",
                "tanggal_efektif",
                "penyusun",
                "reviewer",
                "approver",
            ],
            FormType::Hirarc => &[
                "area_kerja",
                "aktivitas",
                "bahaya",
                "risiko",
                "tingkat_risiko",
                "pengendalian",
                "pic",
                "deadline",
            ],
            FormType::InternalAudit => &[
                "nomor_audit",
                "tanggal_audit",
                "departemen",
                "auditor",
                "auditee",
                "temuan",
                "kategori_temuan",
                "tindakan_perbaikan",
                "deadline",
            ],
        }
    }

    /// Date-formatted fields that must parse as `YYYY-MM-DD`.
    pub fn date_fields(&self) -> &'static [&'static str] {
        match self {
            FormType::SopProduction => &["tanggal_efektif"],
            FormType::Hirarc => &["deadline"],
            FormType::InternalAudit => &["tanggal_audit", "deadline"],
        }
    }

    /// Parse a user-facing label back into a form type.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "SOP Produksi" => Some(FormType::SopProduction),
            "HIRARC" => Some(FormType::Hirarc),
            "Audit Internal" => Some(FormType::InternalAudit),
            _ => None,
        }
    }
}

/// HIRARC risk level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Rendah")]
    Low,
    #[serde(rename = "Sedang")]
    Medium,
    #[serde(rename = "Tinggi")]
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Rendah",
            RiskLevel::Medium => "Sedang",
            RiskLevel::High => "Tinggi",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Rendah" => Some(RiskLevel::Low),
            "Sedang" => Some(RiskLevel::Medium),
            "Tinggi" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Internal audit finding category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCategory {
    Major,
    Minor,
    #[serde(rename = "Observasi")]
    Observation,
}

impl FindingCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FindingCategory::Major => "Major",
            FindingCategory::Minor => "Minor",
            FindingCategory::Observation => "Observasi",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Major" => Some(FindingCategory::Major),
            "Minor" => Some(FindingCategory::Minor),
            "Observasi" => Some(FindingCategory::Observation),
            _ => None,
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// One submitted form entry.
///
/// Form-specific fields live in `fields` keyed by their form field names
/// (e.g. `nomor_sop`, `tingkat_risiko`). `attachment` is a path relative to
/// the uploads root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: Uuid,
    pub form_type: FormType,
    pub department: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

impl FormRecord {
    /// Create a record stamped with the current time.
    pub fn new(form_type: FormType, department: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            form_type,
            department: department.into(),
            submitted_at: Utc::now(),
            fields: BTreeMap::new(),
            attachment: None,
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The record's risk level, when it carries a `tingkat_risiko` field.
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.fields
            .get("tingkat_risiko")
            .and_then(|v| RiskLevel::parse(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_type_labels_round_trip() {
        for ft in [
            FormType::SopProduction,
            FormType::Hirarc,
            FormType::InternalAudit,
        ] {
            assert_eq!(FormType::parse(ft.label()), Some(ft));
        }
        assert_eq!(FormType::parse("Unknown"), None);
    }

    #[test]
    fn test_form_type_dir_names_have_no_spaces() {
        for ft in [
            FormType::SopProduction,
            FormType::Hirarc,
            FormType::InternalAudit,
        ] {
            assert!(!ft.dir_name().contains(' '));
        }
    }

    #[test]
    fn test_form_type_serde_uses_labels() {
        let json = serde_json::to_string(&FormType::SopProduction).unwrap();
        assert_eq!(json, "\"SOP Produksi\"");
        let back: FormType = serde_json::from_str("\"Audit Internal\"").unwrap();
        assert_eq!(back, FormType::InternalAudit);
    }

    #[test]
    fn test_required_fields_match_original_forms() {
        assert_eq!(FormType::SopProduction.required_fields().len(), 7);
        assert_eq!(FormType::Hirarc.required_fields().len(), 8);
        assert_eq!(FormType::InternalAudit.required_fields().len(), 9);
        assert!(FormType::Hirarc
            .required_fields()
            .contains(&"tingkat_risiko"));
        assert!(FormType::InternalAudit
            .required_fields()
            .contains(&"kategori_temuan"));
    }

    #[test]
    fn test_date_fields_are_required() {
        for ft in [
            FormType::SopProduction,
            FormType::Hirarc,
            FormType::InternalAudit,
        ] {
            for field in ft.date_fields() {
                assert!(ft.required_fields().contains(field));
            }
        }
    }

    #[test]
    fn test_risk_level_round_trip() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(RiskLevel::parse(level.label()), Some(level));
        }
        assert_eq!(RiskLevel::parse("Ekstrem"), None);
    }

    #[test]
    fn test_finding_category_round_trip() {
        for cat in [
            FindingCategory::Major,
            FindingCategory::Minor,
            FindingCategory::Observation,
        ] {
            assert_eq!(FindingCategory::parse(cat.label()), Some(cat));
        }
        assert_eq!(FindingCategory::parse("Critical"), None);
    }

    #[test]
    fn test_form_record_builder() {
        let record = FormRecord::new(FormType::Hirarc, "Produksi")
            .with_field("area_kerja", "Gudang")
            .with_field("tingkat_risiko", "Tinggi");
        assert_eq!(record.department, "Produksi");
        assert_eq!(record.fields.get("area_kerja").unwrap(), "Gudang");
        assert_eq!(record.risk_level(), Some(RiskLevel::High));
        assert!(record.attachment.is_none());
    }

    #[test]
    fn test_form_record_risk_level_absent() {
        let record = FormRecord::new(FormType::SopProduction, "QA");
        assert_eq!(record.risk_level(), None);
    }

    #[test]
    fn test_form_record_serde_round_trip() {
        let record = FormRecord::new(FormType::InternalAudit, "Keuangan")
            .with_field("nomor_audit", "AUD-2024-001")
            .with_field("kategori_temuan", "Minor");
        let json = serde_json::to_string(&record).unwrap();
        let back: FormRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(json.contains("Audit Internal"));
    }
}
