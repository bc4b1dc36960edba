//! Persistence for ISO management records.
//!
//! A whole-file JSON record store plus filesystem attachment storage,
//! with the in-memory aggregations the dashboard renders.

pub mod attachments;
pub mod error;
pub mod records;

pub use attachments::{AttachmentInfo, AttachmentStore};
pub use error::StoreError;
pub use records::{DashboardFilter, RecordStore};
