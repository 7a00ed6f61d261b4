//! Account resolution: direct ticket field first, study service second.

use brandinput_core::{parse_study_id, AccountKey, AccountLookup, StudyReferenceError, Ticket};
use thiserror::Error;

use super::RunContext;

#[derive(Debug, Error)]
pub(crate) enum ResolveError {
    #[error("ticket has neither an account id nor a study reference")]
    MissingStudyReference,
    #[error("malformed study reference: {0}")]
    MalformedStudyReference(#[from] StudyReferenceError),
    #[error("study lookup failed: {0}")]
    Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Resolves the account key for `ticket`.
///
/// `Ok(None)` means the study service has no parent company for the study.
/// The study service is never called when the ticket carries an account id.
pub(crate) async fn resolve_account<L: AccountLookup>(
    lookup: &L,
    ticket: &Ticket,
    ctx: &mut RunContext,
) -> Result<Option<AccountKey>, ResolveError> {
    if let Some(id) = ticket.account_id {
        tracing::info!("{}", trace_line("From Jira Ticket", ticket, &id.to_string()));
        return Ok(Some(AccountKey(id)));
    }

    let reference = ticket
        .study_reference
        .as_deref()
        .ok_or(ResolveError::MissingStudyReference)?;
    let study_id = parse_study_id(reference)?;

    let resolved = if let Some(cached) = ctx.cached_study(study_id) {
        cached
    } else {
        let resolved = lookup
            .resolve_parent_id(study_id)
            .await
            .map_err(|e| ResolveError::Lookup(Box::new(e)))?;
        ctx.cache_study(study_id, resolved);
        resolved
    };

    let shown = resolved.map_or_else(|| "None".to_string(), |key| key.to_string());
    tracing::info!("{}", trace_line("From Study Builder", ticket, &shown));
    Ok(resolved)
}

/// Media partner to match on, or `None` for the partner-agnostic row.
///
/// Only qualified partners carry their own rows, and only for qualified
/// advertisers.
pub(crate) fn partner_qualifier<'a>(
    ticket: &'a Ticket,
    qualified_partners: &[String],
    qualified_advertisers: &[String],
) -> Option<&'a str> {
    let partner = ticket.media_partner.as_deref()?;
    let advertiser = ticket.advertiser.as_deref()?;
    let partner_ok = qualified_partners.iter().any(|p| p == partner);
    let advertiser_ok = qualified_advertisers.iter().any(|a| a == advertiser);
    (partner_ok && advertiser_ok).then_some(partner)
}

fn trace_line(source: &str, ticket: &Ticket, id: &str) -> String {
    format!(
        "{:<12}{:.<30}{:.>10}  ({source})",
        ticket.key,
        ticket.advertiser_name(),
        id
    )
}
