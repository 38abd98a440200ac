//! Per-company sync settings

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Which customer attributes are used to find an existing CRM record.
///
/// An explicit external id is always tried first regardless of strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerMatchStrategy {
    Email,
    Phone,
    Name,
    #[default]
    All,
}

impl_domain_status_conversions!(CustomerMatchStrategy {
    Email => "email",
    Phone => "phone",
    Name => "name",
    All => "all",
});

impl CustomerMatchStrategy {
    pub fn matches_email(self) -> bool {
        matches!(self, Self::Email | Self::All)
    }

    pub fn matches_phone(self) -> bool {
        matches!(self, Self::Phone | Self::All)
    }

    pub fn matches_name(self) -> bool {
        matches!(self, Self::Name | Self::All)
    }
}

/// Controls which steps of a check-in sync run.
///
/// Supplied fresh on every sync call; adapters never cache it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    pub sync_customers: bool,
    pub create_new_customers: bool,
    pub update_existing_customers: bool,
    pub sync_check_ins_as_jobs: bool,
    pub sync_photos: bool,
    pub customer_match_strategy: CustomerMatchStrategy,
    /// Internal metadata key -> CRM custom field name
    pub custom_field_mapping: HashMap<String, String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            sync_customers: true,
            create_new_customers: true,
            update_existing_customers: true,
            sync_check_ins_as_jobs: true,
            sync_photos: true,
            customer_match_strategy: CustomerMatchStrategy::All,
            custom_field_mapping: HashMap::new(),
        }
    }
}
