//! HTTP client for the study service.
//!
//! The service maps a study id to the study's metadata; the only field the
//! workflow needs is the parent company id, which is the account key used to
//! look up personnel records.

use std::time::Duration;

use brandinput_core::{AccountKey, AccountLookup};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::StudyError;
use crate::retry::retry_with_backoff;

#[derive(Debug, Deserialize)]
struct StudyResponse {
    #[serde(alias = "parent_company_id", rename = "parentCompanyId", default)]
    parent_company_id: Option<i64>,
}

/// Client for the study service's `/studies/{id}` endpoint.
pub struct StudyClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl StudyClient {
    /// Creates a client against `base_url` (e.g. `https://hub.example.com/api`).
    ///
    /// # Errors
    ///
    /// Returns [`StudyError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StudyError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, StudyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandinput/0.1 (field-input-automation)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| StudyError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches the parent company id for `study_id`.
    ///
    /// A 404 or a study without a parent company yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StudyError`] once retries are exhausted on transient failures,
    /// or immediately on a non-retriable status or malformed body.
    pub async fn parent_company_id(&self, study_id: i64) -> Result<Option<i64>, StudyError> {
        let url = self
            .base_url
            .join(&format!("studies/{study_id}"))
            .map_err(|e| StudyError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(url.clone(), study_id)
        })
        .await
    }

    async fn fetch_once(&self, url: Url, study_id: i64) -> Result<Option<i64>, StudyError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(study_id, "study not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StudyError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let study: StudyResponse =
            serde_json::from_str(&text).map_err(|e| StudyError::Deserialize {
                context: format!("study({study_id})"),
                source: e,
            })?;
        Ok(study.parent_company_id)
    }
}

impl AccountLookup for StudyClient {
    type Error = StudyError;

    async fn resolve_parent_id(&self, study_id: i64) -> Result<Option<AccountKey>, StudyError> {
        Ok(self.parent_company_id(study_id).await?.map(AccountKey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_accepts_camel_and_snake_case() {
        let camel: StudyResponse = serde_json::from_str(r#"{"parentCompanyId": 501}"#).unwrap();
        let snake: StudyResponse = serde_json::from_str(r#"{"parent_company_id": 502}"#).unwrap();
        assert_eq!(camel.parent_company_id, Some(501));
        assert_eq!(snake.parent_company_id, Some(502));
    }

    #[test]
    fn missing_parent_is_none() {
        let study: StudyResponse =
            serde_json::from_str(r#"{"id": 9001, "parentCompanyId": null}"#).unwrap();
        assert!(study.parent_company_id.is_none());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = StudyClient::with_base_url("::not a url", 30, 0, 0);
        assert!(matches!(result, Err(StudyError::InvalidBaseUrl { .. })));
    }
}
