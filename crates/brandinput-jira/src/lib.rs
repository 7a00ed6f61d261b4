pub mod client;
pub mod error;
pub mod types;

pub use client::JiraClient;
pub use error::JiraError;
