//! Job status vocabulary tables
//!
//! Each provider names job states differently. A table maps the canonical
//! lowercase status to the provider's spelling and back. The first entry for a
//! status is the one sent on writes; later entries are accepted on reads.

use fieldsync_domain::JobStatus;

/// Fixed canonical <-> provider status table
#[derive(Debug, Clone, Copy)]
pub struct StatusTable {
    entries: &'static [(JobStatus, &'static str)],
    default: JobStatus,
}

impl StatusTable {
    pub const fn new(entries: &'static [(JobStatus, &'static str)], default: JobStatus) -> Self {
        Self { entries, default }
    }

    /// Provider spelling for `status`; unmapped statuses get the provider's
    /// spelling of the default.
    pub fn to_provider(&self, status: &str) -> &'static str {
        let canonical = JobStatus::parse(status).unwrap_or(self.default);
        self.lookup(canonical).or_else(|| self.lookup(self.default)).unwrap_or("")
    }

    /// Canonical status for a provider spelling.
    pub fn from_provider(&self, provider_status: &str) -> JobStatus {
        let needle = provider_status.trim();
        self.entries
            .iter()
            .find(|(_, spelling)| spelling.eq_ignore_ascii_case(needle))
            .map(|(status, _)| *status)
            .or_else(|| JobStatus::parse(needle))
            .unwrap_or(self.default)
    }

    fn lookup(&self, status: JobStatus) -> Option<&'static str> {
        self.entries.iter().find(|(s, _)| *s == status).map(|(_, spelling)| *spelling)
    }
}
