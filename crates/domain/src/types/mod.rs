//! Domain types and models
//!
//! Canonical records exchanged between the internal system and any CRM
//! adapter. Field names serialize as camelCase so records coming from the web
//! tier deserialize unchanged.

pub mod check_in;
pub mod credentials;
pub mod crm;
pub mod settings;

pub use check_in::CheckInData;
pub use credentials::{CrmCredentials, CrmType, SupportedCrm};
pub use crm::{
    AttachmentReport, CheckInSyncReport, CrmContactData, CrmJobData, CustomerType, DateRange,
    JobStatus,
};
pub use settings::{CustomerMatchStrategy, SyncSettings};

/// Free-form JSON object used for metadata and custom field bags
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
