pub mod app_config;
pub mod config;
pub mod notification;
pub mod policy;
pub mod ports;
pub mod query;
pub mod record;
pub mod study;
pub mod ticket;

pub use app_config::{
    AppConfig, DataSource, EmailConfig, Environment, FieldIds, JiraConfig, JqlConfig,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use notification::{Notification, SourceContext, Template};
pub use policy::VarietyPolicy;
pub use ports::{AccountLookup, Notifier, RecordSource, TicketStore};
pub use query::{build_jql, TicketQuery};
pub use record::{AccountTier, PersonnelRecord, RESTRICTED_ACCOUNT_TYPE};
pub use study::{parse_study_id, StudyReferenceError};
pub use ticket::{AccountKey, LookupKey, Ticket, TicketField, Variety};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
