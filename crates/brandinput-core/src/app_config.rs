use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Tracing filter used when `BRANDINPUT_LOG_LEVEL` is unset.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Test => "warn",
            Environment::Production => "info",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Backing store for personnel records, chosen once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Spreadsheet,
    Database,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Spreadsheet => write!(f, "spreadsheet"),
            DataSource::Database => write!(f, "database"),
        }
    }
}

/// Custom-field ids of the tracker project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIds {
    pub advertiser: String,
    pub study_reference: String,
    pub media_partner: String,
    pub account_id: String,
    pub lead_analyst: String,
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            advertiser: "customfield_10414".to_string(),
            study_reference: "customfield_17018".to_string(),
            media_partner: "customfield_17028".to_string(),
            account_id: "customfield_11492".to_string(),
            lead_analyst: "customfield_12325".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct JiraConfig {
    pub url: String,
    pub username: String,
    pub token: String,
    /// Transition that moves a ticket to `target_status`.
    pub transition_id: String,
    pub target_status: String,
    pub max_results: u32,
    pub fields: FieldIds,
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("token", &"[redacted]")
            .field("transition_id", &self.transition_id)
            .field("target_status", &self.target_status)
            .field("max_results", &self.max_results)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Predicate values spliced into the variety searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JqlConfig {
    pub project: String,
    pub reporter: String,
    pub issue_type: String,
    pub vertical: String,
    pub retail_vertical: String,
    pub status: String,
    pub product: String,
    pub yt_media_partner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub subject: String,
    pub to: String,
    pub from: String,
    pub cc: Option<String>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub log_retention_days: u64,
    pub app_name: String,
    pub data_source: DataSource,
    pub jira: JiraConfig,
    pub jql: JqlConfig,
    pub study_api_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub spreadsheet_dir: PathBuf,
    pub spreadsheet_sheet: String,
    pub database_url: Option<String>,
    pub db_schema: String,
    pub db_table: String,
    pub youtube_watchers: Vec<String>,
    pub roi_watchers: Vec<String>,
    pub qualified_media_partners: Vec<String>,
    pub qualified_advertisers: Vec<String>,
    pub batch_delay_ms: u64,
    pub schedule_cron: String,
    pub email: EmailConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field("log_retention_days", &self.log_retention_days)
            .field("app_name", &self.app_name)
            .field("data_source", &self.data_source)
            .field("jira", &self.jira)
            .field("jql", &self.jql)
            .field("study_api_url", &self.study_api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("spreadsheet_dir", &self.spreadsheet_dir)
            .field("spreadsheet_sheet", &self.spreadsheet_sheet)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_schema", &self.db_schema)
            .field("db_table", &self.db_table)
            .field("youtube_watchers", &self.youtube_watchers)
            .field("roi_watchers", &self.roi_watchers)
            .field("qualified_media_partners", &self.qualified_media_partners)
            .field("qualified_advertisers", &self.qualified_advertisers)
            .field("batch_delay_ms", &self.batch_delay_ms)
            .field("schedule_cron", &self.schedule_cron)
            .field("email", &self.email)
            .finish()
    }
}
