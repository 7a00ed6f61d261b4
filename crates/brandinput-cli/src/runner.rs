//! Wiring of the real collaborators for a run, plus the `check` and
//! `migrate` commands.

use std::time::{Duration, SystemTime};

use anyhow::Context;
use brandinput_core::{AppConfig, DataSource, Variety, VarietyPolicy};
use brandinput_jira::JiraClient;
use brandinput_study::StudyClient;

use crate::logging;
use crate::notify::SmtpNotifier;
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::sources::RecordStore;

type LivePipeline = Pipeline<JiraClient, StudyClient, RecordStore, SmtpNotifier>;

fn jira_client(config: &AppConfig) -> anyhow::Result<JiraClient> {
    JiraClient::new(
        &config.jira.url,
        &config.jira.username,
        &config.jira.token,
        config.request_timeout_secs,
        config.jira.fields.clone(),
        config.jira.max_results,
    )
    .context("failed to build Jira client")
}

fn study_client(config: &AppConfig) -> anyhow::Result<StudyClient> {
    StudyClient::with_base_url(
        &config.study_api_url,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
    )
    .context("failed to build study service client")
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<LivePipeline> {
    let policies =
        VarietyPolicy::table(&config.jql, &config.youtube_watchers, &config.roi_watchers);
    let settings = PipelineSettings {
        transition_id: config.jira.transition_id.clone(),
        target_status: config.jira.target_status.clone(),
        batch_delay: Duration::from_millis(config.batch_delay_ms),
        qualified_partners: config.qualified_media_partners.clone(),
        qualified_advertisers: config.qualified_advertisers.clone(),
    };

    Ok(Pipeline::new(
        jira_client(config)?,
        study_client(config)?,
        RecordStore::from_config(config)?,
        SmtpNotifier::new(&config.email).context("invalid email configuration")?,
        policies,
        settings,
    ))
}

/// One full pass over every variety.
///
/// With `dry_run`, tickets are listed and nothing is written or sent.
pub(crate) async fn run_once(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    tracing::info!(source = %config.data_source, env = %config.env, dry_run, "run starting");
    pipeline.records().probe().await;

    let result = if dry_run {
        list_tickets(&pipeline).await
    } else {
        pipeline
            .run()
            .await
            .map(|_| ())
            .context("ticket search failed; run aborted")
    };

    pipeline.records().close().await;

    if !dry_run {
        purge_logs_best_effort(config);
    }

    if result.is_ok() {
        tracing::info!("run complete");
    }
    result
}

async fn list_tickets(pipeline: &LivePipeline) -> anyhow::Result<()> {
    let batches = pipeline
        .fetch_all()
        .await
        .context("ticket search failed")?;

    for variety in Variety::ALL {
        let tickets = batches.get(&variety).and_then(Option::as_ref);
        println!("{variety}: {}", tickets.map_or(0, Vec::len));
        for ticket in tickets.into_iter().flatten() {
            println!("  {:<12} {}", ticket.key, ticket.advertiser_name());
        }
    }
    Ok(())
}

fn purge_logs_best_effort(config: &AppConfig) {
    match logging::purge_logs(&config.log_dir, config.log_retention_days, SystemTime::now()) {
        Ok(removed) => tracing::info!(removed = removed.len(), "log purge complete"),
        Err(e) => tracing::warn!(
            dir = %config.log_dir.display(),
            error = %e,
            "log purge failed"
        ),
    }
}

/// Validates configuration and probes the record store without touching tickets.
pub(crate) async fn check_config(config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!(?config, "configuration loaded");

    jira_client(config)?;
    study_client(config)?;
    SmtpNotifier::new(&config.email).context("invalid email configuration")?;

    let store = RecordStore::from_config(config)?;
    store.probe().await;
    store.close().await;

    println!("configuration OK ({} source)", config.data_source);
    Ok(())
}

/// Applies pending migrations to the assignments database.
pub(crate) async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    if config.data_source != DataSource::Database {
        tracing::warn!("data source is not the database; migrating anyway");
    }
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required to run migrations")?;

    let pool = brandinput_db::connect_pool(url, brandinput_db::PoolConfig::default())
        .await
        .context("failed to connect to database")?;
    let applied = brandinput_db::run_migrations(&pool).await?;
    pool.close().await;

    println!("applied {applied} migration(s)");
    Ok(())
}
