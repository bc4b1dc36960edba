//! Form field validation for ISO management records.
//!
//! Checks required fields, date and email formats, enumerated values
//! (risk level, finding category), and attachment constraints. Failure is a
//! typed [`ValidationError`], not a boolean/message pair, so callers can
//! match on the cause while still rendering the original Indonesian
//! user-facing text via `Display`.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use normtrack_core::error::NormtrackError;
use normtrack_core::types::{FindingCategory, FormType, RiskLevel};

/// Errors from form validation. Display strings are the user-facing messages.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field berikut harus diisi: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Format email tidak valid")]
    InvalidEmail,
    #[error("Field {field}: Format tanggal harus YYYY-MM-DD")]
    InvalidDate { field: String },
    #[error("Tingkat risiko tidak valid")]
    InvalidRiskLevel,
    #[error("Kategori temuan tidak valid")]
    InvalidFindingCategory,
    #[error("File belum diunggah")]
    AttachmentMissing,
    #[error("Format file tidak valid. Format yang diizinkan: {allowed}")]
    UnsupportedFileType { allowed: String },
    #[error("Ukuran file terlalu besar. Maksimum: {max_mb}MB")]
    FileTooLarge { max_mb: u64 },
}

impl From<ValidationError> for NormtrackError {
    fn from(err: ValidationError) -> Self {
        NormtrackError::Validation(err.to_string())
    }
}

/// A pending attachment, described by name and size only.
///
/// The validator never reads file contents; byte-level handling belongs to
/// the attachment store.
#[derive(Debug, Clone)]
pub struct AttachmentMeta {
    pub name: String,
    pub size: u64,
}

/// Validates form submissions before they reach the record store.
pub struct FormValidator {
    allowed_extensions: Vec<String>,
    max_file_size: u64,
    email_re: Regex,
    date_re: Regex,
}

impl FormValidator {
    /// Create a validator with explicit attachment constraints.
    ///
    /// Extensions are matched case-insensitively and include the leading dot.
    pub fn new(allowed_extensions: Vec<String>, max_file_size: u64) -> Self {
        Self {
            allowed_extensions,
            max_file_size,
            email_re: Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email regex is valid"),
            date_re: Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex is valid"),
        }
    }

    /// Check that every required field is present and non-blank.
    pub fn require_fields(
        &self,
        fields: &BTreeMap<String, String>,
        required: &[&str],
    ) -> Result<(), ValidationError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| {
                fields
                    .get(**name)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Check email format.
    pub fn validate_email(&self, email: &str) -> Result<(), ValidationError> {
        if self.email_re.is_match(email) {
            Ok(())
        } else {
            Err(ValidationError::InvalidEmail)
        }
    }

    /// Check `YYYY-MM-DD` date format for the named field.
    pub fn validate_date(&self, field: &str, value: &str) -> Result<(), ValidationError> {
        if self.date_re.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::InvalidDate {
                field: field.to_string(),
            })
        }
    }

    /// Check that a mandatory upload is present.
    pub fn require_attachment<'a>(
        &self,
        attachment: Option<&'a AttachmentMeta>,
    ) -> Result<&'a AttachmentMeta, ValidationError> {
        attachment.ok_or(ValidationError::AttachmentMissing)
    }

    /// Check attachment extension and size.
    pub fn validate_attachment(&self, meta: &AttachmentMeta) -> Result<(), ValidationError> {
        let ext = std::path::Path::new(&meta.name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        if !self.allowed_extensions.iter().any(|a| *a == ext) {
            return Err(ValidationError::UnsupportedFileType {
                allowed: self.allowed_extensions.join(", "),
            });
        }
        if meta.size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                max_mb: self.max_file_size / 1024 / 1024,
            });
        }
        Ok(())
    }

    /// Validate a submission for the given form type.
    ///
    /// Runs the required-field check, per-field date checks, the enumerated
    /// value checks specific to the form, and the attachment check when an
    /// attachment is supplied.
    pub fn validate(
        &self,
        form_type: FormType,
        fields: &BTreeMap<String, String>,
        attachment: Option<&AttachmentMeta>,
    ) -> Result<(), ValidationError> {
        self.require_fields(fields, form_type.required_fields())?;

        for field in form_type.date_fields() {
            // Required check above guarantees presence.
            if let Some(value) = fields.get(*field) {
                self.validate_date(field, value)?;
            }
        }

        match form_type {
            FormType::Hirarc => {
                let level = fields.get("tingkat_risiko").map(String::as_str).unwrap_or("");
                if RiskLevel::parse(level).is_none() {
                    return Err(ValidationError::InvalidRiskLevel);
                }
            }
            FormType::InternalAudit => {
                let cat = fields.get("kategori_temuan").map(String::as_str).unwrap_or("");
                if FindingCategory::parse(cat).is_none() {
                    return Err(ValidationError::InvalidFindingCategory);
                }
            }
            FormType::SopProduction => {}
        }

        if let Some(meta) = attachment {
            self.validate_attachment(meta)?;
        }

        debug!("Validated {} submission", form_type.label());
        Ok(())
    }
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new(vec![".pdf".to_string()], 5 * 1024 * 1024)
    }
}
