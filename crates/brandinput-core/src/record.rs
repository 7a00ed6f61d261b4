//! Personnel records produced by either record store.

/// `account_type` value that marks the restricted tier.
pub const RESTRICTED_ACCOUNT_TYPE: &str = "Core Brands";

/// Account classification tier, derived from a record's `account_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountTier {
    /// Full population: lead analyst, watcher list, reporter.
    Open,
    /// Minimal population: one manager as watcher and reporter.
    Restricted,
}

/// Assignable personnel for one account/partner combination.
///
/// `watchers` is always present; backends drop empty cells before building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonnelRecord {
    pub account_type: Option<String>,
    pub media_partner: Option<String>,
    /// Solutions manager; a record without one cannot populate a ticket.
    pub primary_manager: Option<String>,
    /// Becomes the reporter on open-tier tickets.
    pub secondary_manager: Option<String>,
    pub client_analytics: Option<String>,
    pub watchers: Vec<String>,
}

impl PersonnelRecord {
    #[must_use]
    pub fn tier(&self) -> AccountTier {
        match self.account_type.as_deref() {
            Some(kind) if kind.trim().eq_ignore_ascii_case(RESTRICTED_ACCOUNT_TYPE) => {
                AccountTier::Restricted
            }
            _ => AccountTier::Open,
        }
    }

    /// Builds a watcher list from allow-listed cells, skipping empty values.
    pub fn collect_watchers<I, S>(cells: I) -> Vec<String>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        cells
            .into_iter()
            .flatten()
            .filter_map(|cell| non_empty(cell.as_ref()))
            .collect()
    }
}

/// Trims a cell value, treating blank strings as absent.
#[must_use]
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
