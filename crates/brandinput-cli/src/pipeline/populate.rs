//! Field population from a personnel record.

use brandinput_core::{AccountTier, PersonnelRecord, Ticket, TicketField, TicketStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum PopulateError {
    #[error("record has no solutions manager")]
    MissingManager,
    #[error("record has no secondary solutions manager to set as reporter")]
    MissingSecondaryManager,
    #[error("failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PopulateError {
    /// Data-side failures: nothing was written to the ticket.
    pub(crate) fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingManager | Self::MissingSecondaryManager)
    }
}

fn store_err<E>(action: &'static str) -> impl FnOnce(E) -> PopulateError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| PopulateError::Store {
        action,
        source: Box::new(e),
    }
}

/// Writes `record` onto `ticket`.
///
/// With `branch_on_tier`, restricted-tier records only get their manager added
/// as watcher and reporter. Otherwise the lead analyst is filled (unless
/// already set), the manager and the record's watchers are added, and the
/// secondary manager becomes reporter. Required names are checked before the
/// first write.
pub(crate) async fn apply<S: TicketStore>(
    store: &S,
    ticket: &Ticket,
    record: &PersonnelRecord,
    branch_on_tier: bool,
) -> Result<(), PopulateError> {
    let key = ticket.key.as_str();

    if branch_on_tier && record.tier() == AccountTier::Restricted {
        let manager = record
            .primary_manager
            .as_deref()
            .ok_or(PopulateError::MissingManager)?;
        store
            .add_watcher(key, manager)
            .await
            .map_err(store_err("add watcher"))?;
        store
            .set_reporter(key, manager)
            .await
            .map_err(store_err("set reporter"))?;
        tracing::info!(ticket = %key, manager, "restricted account populated");
        return Ok(());
    }

    let manager = record
        .primary_manager
        .as_deref()
        .ok_or(PopulateError::MissingManager)?;
    // Only the primary manager is strictly required. A missing secondary is
    // also rejected up front: otherwise the analyst and watchers would be
    // written and the reporter update would then fail, leaving the ticket
    // partly populated.
    let reporter = record
        .secondary_manager
        .as_deref()
        .ok_or(PopulateError::MissingSecondaryManager)?;

    if let Some(current) = ticket.lead_analyst.as_deref() {
        tracing::info!(
            ticket = %key,
            lead_analyst = current,
            "Lead Analyst has already been assigned"
        );
    } else if let Some(analyst) = record.client_analytics.as_deref() {
        store
            .update_field(key, TicketField::LeadAnalyst, analyst)
            .await
            .map_err(store_err("set lead analyst"))?;
        tracing::info!(ticket = %key, lead_analyst = analyst, "lead analyst assigned");
    } else {
        tracing::warn!(
            ticket = %key,
            "record has no client analytics contact; lead analyst left empty"
        );
    }

    for watcher in watcher_order(manager, &record.watchers) {
        store
            .add_watcher(key, watcher)
            .await
            .map_err(store_err("add watcher"))?;
    }

    store
        .set_reporter(key, reporter)
        .await
        .map_err(store_err("set reporter"))?;

    tracing::info!(ticket = %key, manager, reporter, "ticket fields populated");
    Ok(())
}

/// Manager first, then the record's watchers, each name once.
fn watcher_order<'a>(manager: &'a str, watchers: &'a [String]) -> Vec<&'a str> {
    let mut ordered: Vec<&str> = Vec::with_capacity(watchers.len() + 1);
    for name in std::iter::once(manager).chain(watchers.iter().map(String::as_str)) {
        if !ordered.contains(&name) {
            ordered.push(name);
        }
    }
    ordered
}
