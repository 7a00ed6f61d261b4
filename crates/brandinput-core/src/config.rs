use std::path::PathBuf;

use crate::app_config::{
    AppConfig, DataSource, EmailConfig, Environment, FieldIds, JiraConfig, JqlConfig,
};
use crate::ConfigError;

/// Separator for list-valued variables; partner names contain commas.
const LIST_SEPARATOR: char = '|';

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        or_default(var, default)
            .parse::<u16>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let list = |var: &str, default: &str| -> Vec<String> { parse_list(&or_default(var, default)) };

    let env = parse_environment(&or_default("BRANDINPUT_ENV", "development"))?;
    let data_source = parse_data_source(&or_default("BRANDINPUT_DATA_SOURCE", "spreadsheet"))?;

    let (username, token) = parse_basic_auth(&require("JIRA_AUTH")?)?;
    let defaults = FieldIds::default();
    let fields = FieldIds {
        advertiser: or_default("JIRA_FIELD_ADVERTISER", &defaults.advertiser),
        study_reference: or_default("JIRA_FIELD_STUDY_REFERENCE", &defaults.study_reference),
        media_partner: or_default("JIRA_FIELD_MEDIA_PARTNER", &defaults.media_partner),
        account_id: or_default("JIRA_FIELD_ACCOUNT_ID", &defaults.account_id),
        lead_analyst: or_default("JIRA_FIELD_LEAD_ANALYST", &defaults.lead_analyst),
    };
    let jira = JiraConfig {
        url: require("JIRA_URL")?,
        username,
        token,
        transition_id: or_default("JIRA_TRANSITION_ID", "21"),
        target_status: or_default("JIRA_TARGET_STATUS", "Input Verification"),
        max_results: parse_u32("JIRA_MAX_RESULTS", "500")?,
        fields,
    };

    let jql = JqlConfig {
        project: require("JIRA_PROJECT")?,
        reporter: require("JIRA_REPORTER")?,
        issue_type: require("JIRA_ISSUE_TYPE")?,
        vertical: require("JIRA_VERTICAL")?,
        retail_vertical: require("JIRA_RETAIL_VERTICAL")?,
        status: require("JIRA_STATUS")?,
        product: require("JIRA_PRODUCT")?,
        yt_media_partner: require("JIRA_YT_MEDIA_PARTNER")?,
    };

    let database_url = match data_source {
        DataSource::Database => Some(require("DATABASE_URL")?),
        DataSource::Spreadsheet => lookup("DATABASE_URL").ok(),
    };

    let email = EmailConfig {
        smtp_host: require("SMTP_HOST")?,
        smtp_port: parse_u16("SMTP_PORT", "25")?,
        subject: require("EMAIL_SUBJECT")?,
        to: require("EMAIL_TO")?,
        from: require("EMAIL_FROM")?,
        cc: lookup("EMAIL_CC").ok().filter(|v| !v.trim().is_empty()),
    };

    Ok(AppConfig {
        env,
        log_level: or_default("BRANDINPUT_LOG_LEVEL", env.default_log_level()),
        log_dir: PathBuf::from(or_default("BRANDINPUT_LOG_DIR", "./logs")),
        log_retention_days: parse_u64("BRANDINPUT_LOG_RETENTION_DAYS", "30")?,
        app_name: or_default("BRANDINPUT_APP_NAME", "brand_input"),
        data_source,
        jira,
        jql,
        study_api_url: require("STUDY_API_URL")?,
        request_timeout_secs: parse_u64("BRANDINPUT_REQUEST_TIMEOUT_SECS", "30")?,
        max_retries: parse_u32("BRANDINPUT_MAX_RETRIES", "3")?,
        retry_backoff_base_ms: parse_u64("BRANDINPUT_RETRY_BACKOFF_BASE_MS", "1000")?,
        spreadsheet_dir: PathBuf::from(or_default("BRANDINPUT_SPREADSHEET_DIR", "./input")),
        spreadsheet_sheet: or_default("BRANDINPUT_SPREADSHEET_SHEET", "CPG"),
        database_url,
        db_schema: or_default("BRANDINPUT_DB_SCHEMA", "cpg_assignments"),
        db_table: or_default("BRANDINPUT_DB_TABLE", "assignments"),
        youtube_watchers: list("BRANDINPUT_YOUTUBE_WATCHERS", ""),
        roi_watchers: list("BRANDINPUT_ROI_WATCHERS", ""),
        qualified_media_partners: list(
            "BRANDINPUT_QUALIFIED_MEDIA_PARTNERS",
            "YouTube|Snapchat, Inc.|Spotify",
        ),
        qualified_advertisers: list("BRANDINPUT_QUALIFIED_ADVERTISERS", "Pepsico"),
        batch_delay_ms: parse_u64("BRANDINPUT_BATCH_DELAY_MS", "2000")?,
        schedule_cron: or_default("BRANDINPUT_SCHEDULE_CRON", "0 0 7 * * Mon-Fri"),
        email,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDINPUT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Accepts the symbolic names and the legacy `1`/`2` selector values.
fn parse_data_source(s: &str) -> Result<DataSource, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "spreadsheet" | "excel" => Ok(DataSource::Spreadsheet),
        "2" | "database" | "mysql" | "postgres" => Ok(DataSource::Database),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDINPUT_DATA_SOURCE".to_string(),
            reason: format!("expected 'spreadsheet' or 'database', got '{other}'"),
        }),
    }
}

/// Splits `user,token` into its two halves.
fn parse_basic_auth(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once(',') {
        Some((user, token)) if !user.trim().is_empty() && !token.trim().is_empty() => {
            Ok((user.trim().to_string(), token.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidEnvVar {
            var: "JIRA_AUTH".to_string(),
            reason: "expected 'user,token'".to_string(),
        }),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
