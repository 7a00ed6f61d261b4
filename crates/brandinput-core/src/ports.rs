//! Capabilities the orchestrator needs from its collaborators.
//!
//! Each collaborator reports failures through its own error type; the
//! orchestrator only logs them and routes the ticket to the notify path.

use std::future::Future;

use crate::notification::{Notification, SourceContext};
use crate::query::TicketQuery;
use crate::record::PersonnelRecord;
use crate::ticket::{AccountKey, LookupKey, Ticket, TicketField};

/// Issue tracker operations.
pub trait TicketStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn search(
        &self,
        query: &TicketQuery,
    ) -> impl Future<Output = Result<Vec<Ticket>, Self::Error>> + Send;

    /// Re-reads a ticket so field checks see its current state.
    fn get_ticket(&self, key: &str) -> impl Future<Output = Result<Ticket, Self::Error>> + Send;

    fn update_field(
        &self,
        key: &str,
        field: TicketField,
        user: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn add_watcher(&self, key: &str, user: &str)
        -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn set_reporter(
        &self,
        key: &str,
        user: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn transition(
        &self,
        key: &str,
        transition_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// External study service: study id to parent-company account key.
pub trait AccountLookup {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `Ok(None)` means the service has no parent company for the study.
    fn resolve_parent_id(
        &self,
        study_id: i64,
    ) -> impl Future<Output = Result<Option<AccountKey>, Self::Error>> + Send;
}

/// Personnel record backend (spreadsheet or relational table).
pub trait RecordSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `Ok(None)` means no row matched; errors are backend failures.
    fn lookup(
        &self,
        key: &LookupKey,
        media_partner: Option<&str>,
    ) -> impl Future<Output = Result<Option<PersonnelRecord>, Self::Error>> + Send;

    /// Describes the backend for the missing-input-data alert.
    fn source_context(&self) -> SourceContext;
}

pub trait Notifier {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
