//! Ticket-side domain types: the ticket snapshot read from the tracker, the
//! closed set of ticket varieties, and the keys used for personnel lookups.

use std::fmt;

/// A ticket as read from the tracker, reduced to the fields the automation
/// consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ticket {
    pub key: String,
    /// Reporter display name.
    pub reporter: Option<String>,
    pub status: Option<String>,
    pub advertiser: Option<String>,
    /// URL-shaped value whose final path segment is the numeric study id.
    pub study_reference: Option<String>,
    pub media_partner: Option<String>,
    /// Direct parent-account id, when the requester filled it in.
    pub account_id: Option<i64>,
    pub lead_analyst: Option<String>,
}

impl Ticket {
    /// Advertiser name, or an empty string when the field is unset.
    #[must_use]
    pub fn advertiser_name(&self) -> &str {
        self.advertiser.as_deref().unwrap_or_default()
    }
}

/// Ticket fields the automation writes besides reporter and watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketField {
    LeadAnalyst,
}

/// Mutually exclusive ticket classifications, decided by which search matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variety {
    Standard,
    YouTube,
    InFlightRoi,
    Retail,
}

impl Variety {
    pub const ALL: [Variety; 4] = [
        Variety::Standard,
        Variety::YouTube,
        Variety::InFlightRoi,
        Variety::Retail,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Variety::Standard => "Standard",
            Variety::YouTube => "YouTube",
            Variety::InFlightRoi => "In-Flight ROI",
            Variety::Retail => "Retail",
        }
    }

    /// Retail-family tickets are looked up by advertiser name; every other
    /// variety by the numeric account key.
    #[must_use]
    pub fn keyed_by_account(self) -> bool {
        !matches!(self, Variety::Retail)
    }
}

impl fmt::Display for Variety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved parent-company identifier used to key personnel lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountKey(pub i64);

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The key a record store searches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Account(AccountKey),
    Advertiser(String),
}

impl LookupKey {
    #[must_use]
    pub fn for_variety(variety: Variety, account: AccountKey, advertiser: &str) -> Self {
        if variety.keyed_by_account() {
            LookupKey::Account(account)
        } else {
            LookupKey::Advertiser(advertiser.to_string())
        }
    }

    /// Text form stored in the relational `account` column.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            LookupKey::Account(key) => key.to_string(),
            LookupKey::Advertiser(name) => name.clone(),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Account(key) => write!(f, "account {key}"),
            LookupKey::Advertiser(name) => write!(f, "advertiser '{name}'"),
        }
    }
}
