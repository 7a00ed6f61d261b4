//! Ticket processing: fetch each variety's tickets, then run every ticket
//! through resolve, fetch, populate and progress under its variety policy.
//!
//! Failures are contained per ticket. Only the initial searches can abort a
//! run.

mod populate;
mod resolve;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use brandinput_core::{
    AccountKey, AccountLookup, LookupKey, Notification, Notifier, RecordSource, Template, Ticket,
    TicketStore, Variety, VarietyPolicy,
};

use self::populate::PopulateError;
use self::resolve::{partner_qualifier, resolve_account};

/// Tickets per variety; `None` when a search matched nothing.
pub(crate) type Batches = BTreeMap<Variety, Option<Vec<Ticket>>>;

/// Pipeline stage at which a ticket was routed to the notify path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Resolving,
    Fetching,
    Populating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TicketOutcome {
    Done { progressed: bool },
    FailedNotified(Stage),
    FailedNotifiedProgress,
}

/// Per-run bookkeeping, created fresh for every run.
#[derive(Debug, Default)]
pub(crate) struct RunContext {
    /// Advertisers whose account key was found.
    pub providers: BTreeSet<String>,
    /// Advertisers whose account key could not be found.
    pub null_providers: BTreeSet<String>,
    pub outcomes: Vec<(Variety, String, TicketOutcome)>,
    study_cache: HashMap<i64, Option<AccountKey>>,
}

impl RunContext {
    fn cached_study(&self, study_id: i64) -> Option<Option<AccountKey>> {
        self.study_cache.get(&study_id).copied()
    }

    fn cache_study(&mut self, study_id: i64, resolved: Option<AccountKey>) {
        self.study_cache.insert(study_id, resolved);
    }

    /// Outcome counts for one variety: (done, progressed, failed).
    pub(crate) fn tally(&self, variety: Variety) -> (usize, usize, usize) {
        self.outcomes
            .iter()
            .filter(|(v, _, _)| *v == variety)
            .fold((0, 0, 0), |(done, progressed, failed), (_, _, outcome)| match outcome {
                TicketOutcome::Done { progressed: true } => (done + 1, progressed + 1, failed),
                TicketOutcome::Done { progressed: false } => (done + 1, progressed, failed),
                TicketOutcome::FailedNotified(_) | TicketOutcome::FailedNotifiedProgress => {
                    (done, progressed, failed + 1)
                }
            })
    }
}

pub(crate) struct PipelineSettings {
    pub transition_id: String,
    pub target_status: String,
    pub batch_delay: Duration,
    pub qualified_partners: Vec<String>,
    pub qualified_advertisers: Vec<String>,
}

pub(crate) struct Pipeline<S, L, R, N> {
    store: S,
    lookup: L,
    records: R,
    notifier: N,
    policies: Vec<VarietyPolicy>,
    settings: PipelineSettings,
}

impl<S, L, R, N> Pipeline<S, L, R, N>
where
    S: TicketStore + Sync,
    L: AccountLookup + Sync,
    R: RecordSource + Sync,
    N: Notifier + Sync,
{
    pub(crate) fn new(
        store: S,
        lookup: L,
        records: R,
        notifier: N,
        policies: Vec<VarietyPolicy>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            lookup,
            records,
            notifier,
            policies,
            settings,
        }
    }

    pub(crate) fn records(&self) -> &R {
        &self.records
    }

    /// Runs one search per variety and logs what each returned.
    ///
    /// # Errors
    ///
    /// Any failed search aborts the run.
    pub(crate) async fn fetch_all(&self) -> Result<Batches, S::Error> {
        let mut batches = Batches::new();
        for policy in &self.policies {
            let tickets = self.store.search(&policy.query).await.map_err(|e| {
                tracing::error!(variety = %policy.variety, error = %e, "ticket search failed");
                e
            })?;

            if tickets.is_empty() {
                tracing::info!(variety = %policy.variety, "{} has no tickets", policy.variety);
                batches.insert(policy.variety, None);
                continue;
            }

            tracing::info!(
                variety = %policy.variety,
                count = tickets.len(),
                "{} tickets found",
                policy.variety
            );
            for ticket in &tickets {
                tracing::info!(
                    variety = %policy.variety,
                    "{}: {}",
                    ticket.key,
                    ticket.reporter.as_deref().unwrap_or("<no reporter>")
                );
            }
            batches.insert(policy.variety, Some(tickets));
        }
        Ok(batches)
    }

    /// Processes every batch in policy order, pausing before each non-empty one.
    pub(crate) async fn dispatch(&self, mut batches: Batches, ctx: &mut RunContext) {
        for policy in &self.policies {
            let Some(Some(tickets)) = batches.remove(&policy.variety) else {
                continue;
            };

            tokio::time::sleep(self.settings.batch_delay).await;
            tracing::info!(variety = %policy.variety, count = tickets.len(), "processing batch");

            for ticket in tickets {
                let outcome = self.process_ticket(policy, &ticket, ctx).await;
                tracing::debug!(ticket = %ticket.key, ?outcome, "ticket finished");
                ctx.outcomes.push((policy.variety, ticket.key, outcome));
            }
        }
    }

    /// Fetches, dispatches and summarises one run.
    ///
    /// # Errors
    ///
    /// Returns the ticket store error if a search fails; nothing is processed
    /// in that case.
    pub(crate) async fn run(&self) -> Result<RunContext, S::Error> {
        let batches = self.fetch_all().await?;
        let mut ctx = RunContext::default();
        self.dispatch(batches, &mut ctx).await;
        self.log_summary(&ctx);
        Ok(ctx)
    }

    async fn process_ticket(
        &self,
        policy: &VarietyPolicy,
        listed: &Ticket,
        ctx: &mut RunContext,
    ) -> TicketOutcome {
        if !policy.populate {
            return if policy.progress {
                self.progress(listed).await
            } else {
                TicketOutcome::Done { progressed: false }
            };
        }

        let ticket = match self.store.get_ticket(&listed.key).await {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::error!(ticket = %listed.key, error = %e, "failed to read ticket");
                self.notify_missing_data(listed).await;
                return TicketOutcome::FailedNotified(Stage::Resolving);
            }
        };
        let advertiser = ticket.advertiser_name().to_string();

        let account = match resolve_account(&self.lookup, &ticket, ctx).await {
            Ok(Some(account)) => {
                ctx.providers.insert(advertiser.clone());
                account
            }
            Ok(None) => {
                ctx.null_providers.insert(advertiser);
                tracing::error!(ticket = %ticket.key, "no account found for study");
                self.notify_missing_data(&ticket).await;
                return TicketOutcome::FailedNotified(Stage::Resolving);
            }
            Err(e) => {
                ctx.null_providers.insert(advertiser);
                tracing::error!(ticket = %ticket.key, error = %e, "account resolution failed");
                self.notify_missing_data(&ticket).await;
                return TicketOutcome::FailedNotified(Stage::Resolving);
            }
        };

        let partner = partner_qualifier(
            &ticket,
            &self.settings.qualified_partners,
            &self.settings.qualified_advertisers,
        );
        let key = LookupKey::for_variety(policy.variety, account, ticket.advertiser_name());

        let mut record = match self.records.lookup(&key, partner).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::error!(
                    ticket = %ticket.key,
                    %key,
                    partner = partner.unwrap_or("<none>"),
                    "no personnel record found"
                );
                self.notify_missing_data(&ticket).await;
                return TicketOutcome::FailedNotified(Stage::Fetching);
            }
            Err(e) => {
                tracing::error!(
                    ticket = %ticket.key,
                    %key,
                    error = %e,
                    "record store lookup failed"
                );
                self.notify_missing_data(&ticket).await;
                return TicketOutcome::FailedNotified(Stage::Fetching);
            }
        };
        record.watchers.extend(policy.extra_watchers.iter().cloned());

        let branch_on_tier = policy.branch_on_tier;
        if let Err(e) = populate::apply(&self.store, &ticket, &record, branch_on_tier).await {
            tracing::error!(ticket = %ticket.key, error = %e, "ticket population failed");
            let template = population_template(&e, self.records.source_context());
            self.notify(template, &ticket).await;
            return TicketOutcome::FailedNotified(Stage::Populating);
        }

        if policy.progress {
            self.progress(&ticket).await
        } else {
            TicketOutcome::Done { progressed: false }
        }
    }

    async fn progress(&self, ticket: &Ticket) -> TicketOutcome {
        match self
            .store
            .transition(&ticket.key, &self.settings.transition_id)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    ticket = %ticket.key,
                    "ticket moved to {}",
                    self.settings.target_status
                );
                TicketOutcome::Done { progressed: true }
            }
            Err(e) => {
                tracing::error!(ticket = %ticket.key, error = %e, "status transition failed");
                self.notify(Template::ProgressionFailed, ticket).await;
                TicketOutcome::FailedNotifiedProgress
            }
        }
    }

    async fn notify_missing_data(&self, ticket: &Ticket) {
        let template = Template::MissingInputData(self.records.source_context());
        self.notify(template, ticket).await;
    }

    /// Sends an alert; delivery failures are logged and swallowed.
    async fn notify(&self, template: Template, ticket: &Ticket) {
        let name = template.name();
        let notification = Notification::new(template, &ticket.key, ticket.advertiser_name());
        match self.notifier.send(&notification).await {
            Ok(()) => tracing::warn!(ticket = %ticket.key, template = name, "notification sent"),
            Err(e) => tracing::error!(
                ticket = %ticket.key,
                template = name,
                error = %e,
                "failed to send notification"
            ),
        }
    }

    fn log_summary(&self, ctx: &RunContext) {
        for policy in &self.policies {
            let (done, progressed, failed) = ctx.tally(policy.variety);
            tracing::info!(
                variety = %policy.variety,
                done,
                progressed,
                failed,
                "run summary"
            );
        }
        tracing::info!(providers = ?ctx.providers, "advertisers with an account");
        if !ctx.null_providers.is_empty() {
            tracing::warn!(null_providers = ?ctx.null_providers, "advertisers without an account");
        }
    }
}

fn population_template(
    error: &PopulateError,
    context: brandinput_core::SourceContext,
) -> Template {
    if error.is_missing_data() {
        Template::MissingInputData(context)
    } else {
        Template::PopulationFailed
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
