//! HTTP client for the Jira REST v2 API.
//!
//! Wraps `reqwest` with basic authentication, the project's custom-field
//! mapping, and typed errors. Implements [`TicketStore`] for the orchestrator.

use std::time::Duration;

use brandinput_core::{FieldIds, Ticket, TicketField, TicketQuery, TicketStore};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::json;

use crate::error::JiraError;
use crate::types::{RawIssue, SearchResponse};

/// Client for a Jira server's REST v2 API.
///
/// Use [`JiraClient::new`] with the configured base URL; tests point it at a
/// wiremock server.
pub struct JiraClient {
    client: Client,
    base_url: Url,
    username: String,
    token: String,
    fields: FieldIds,
    max_results: u32,
}

impl JiraClient {
    /// Creates a client for the Jira instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`JiraError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        base_url: &str,
        username: &str,
        token: &str,
        timeout_secs: u64,
        fields: FieldIds,
        max_results: u32,
    ) -> Result<Self, JiraError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandinput/0.1 (field-input-automation)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| JiraError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            username: username.to_owned(),
            token: token.to_owned(),
            fields,
            max_results,
        })
    }

    /// Runs a JQL search and returns every matching issue as a [`Ticket`].
    ///
    /// # Errors
    ///
    /// - [`JiraError::Http`] on network failure.
    /// - [`JiraError::UnexpectedStatus`] on a non-2xx response (bad JQL is a 400).
    /// - [`JiraError::Deserialize`] if the body is not a search result.
    pub async fn search_issues(&self, jql: &str) -> Result<Vec<Ticket>, JiraError> {
        let mut url = self.endpoint("rest/api/2/search")?;
        url.query_pairs_mut()
            .append_pair("jql", jql)
            .append_pair("maxResults", &self.max_results.to_string())
            .append_pair("fields", &self.field_list());

        let body = Self::send_json(self.request(Method::GET, url)).await?;
        let response: SearchResponse =
            serde_json::from_value(body).map_err(|e| JiraError::Deserialize {
                context: format!("search(jql={jql})"),
                source: e,
            })?;

        if (response.total as usize) > response.issues.len() {
            tracing::warn!(
                total = response.total,
                returned = response.issues.len(),
                "Jira search truncated by maxResults"
            );
        }

        Ok(response
            .issues
            .into_iter()
            .map(|issue| issue.into_ticket(&self.fields))
            .collect())
    }

    /// Reads a single issue.
    ///
    /// # Errors
    ///
    /// Same as [`JiraClient::search_issues`]; a missing issue is a 404
    /// [`JiraError::UnexpectedStatus`].
    pub async fn get_issue(&self, key: &str) -> Result<Ticket, JiraError> {
        let mut url = self.endpoint(&format!("rest/api/2/issue/{key}"))?;
        url.query_pairs_mut()
            .append_pair("fields", &self.field_list());

        let body = Self::send_json(self.request(Method::GET, url)).await?;
        let issue: RawIssue = serde_json::from_value(body).map_err(|e| JiraError::Deserialize {
            context: format!("issue({key})"),
            source: e,
        })?;
        Ok(issue.into_ticket(&self.fields))
    }

    /// Sets a user-picker field, addressed by account name.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError`] if the update request fails.
    pub async fn set_user_field(
        &self,
        key: &str,
        field_id: &str,
        user: &str,
    ) -> Result<(), JiraError> {
        let url = self.endpoint(&format!("rest/api/2/issue/{key}"))?;
        let body = json!({ "fields": { field_id: { "name": user } } });
        Self::send_empty(self.request(Method::PUT, url).json(&body)).await
    }

    /// Adds `user` to the issue's watchers.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError`] if the request fails.
    pub async fn add_issue_watcher(&self, key: &str, user: &str) -> Result<(), JiraError> {
        let url = self.endpoint(&format!("rest/api/2/issue/{key}/watchers"))?;
        // The watchers endpoint takes a bare JSON string.
        Self::send_empty(self.request(Method::POST, url).json(&user)).await
    }

    /// Executes workflow transition `transition_id` on the issue.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError`] if the transition is rejected (e.g. not available
    /// from the current status) or the request fails.
    pub async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<(), JiraError> {
        let url = self.endpoint(&format!("rest/api/2/issue/{key}/transitions"))?;
        let body = json!({ "transition": { "id": transition_id } });
        Self::send_empty(self.request(Method::POST, url).json(&body)).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, JiraError> {
        self.base_url
            .join(path)
            .map_err(|e| JiraError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Comma-separated field list requested on every read.
    fn field_list(&self) -> String {
        [
            "summary",
            "status",
            "reporter",
            &self.fields.advertiser,
            &self.fields.study_reference,
            &self.fields.media_partner,
            &self.fields.account_id,
            &self.fields.lead_analyst,
        ]
        .join(",")
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.token))
    }

    /// Sends the request and parses a JSON body from a 2xx response.
    async fn send_json(request: RequestBuilder) -> Result<serde_json::Value, JiraError> {
        let response = Self::check_status(request.send().await?).await?;
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| JiraError::Deserialize {
            context: url,
            source: e,
        })
    }

    /// Sends the request and discards the (usually empty) 2xx body.
    async fn send_empty(request: RequestBuilder) -> Result<(), JiraError> {
        Self::check_status(request.send().await?).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, JiraError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(JiraError::UnexpectedStatus {
            status: status.as_u16(),
            url,
            body,
        })
    }
}

impl TicketStore for JiraClient {
    type Error = JiraError;

    async fn search(&self, query: &TicketQuery) -> Result<Vec<Ticket>, JiraError> {
        self.search_issues(&query.jql).await
    }

    async fn get_ticket(&self, key: &str) -> Result<Ticket, JiraError> {
        self.get_issue(key).await
    }

    async fn update_field(
        &self,
        key: &str,
        field: TicketField,
        user: &str,
    ) -> Result<(), JiraError> {
        let field_id = match field {
            TicketField::LeadAnalyst => self.fields.lead_analyst.clone(),
        };
        self.set_user_field(key, &field_id, user).await
    }

    async fn add_watcher(&self, key: &str, user: &str) -> Result<(), JiraError> {
        self.add_issue_watcher(key, user).await
    }

    async fn set_reporter(&self, key: &str, user: &str) -> Result<(), JiraError> {
        self.set_user_field(key, "reporter", user).await
    }

    async fn transition(&self, key: &str, transition_id: &str) -> Result<(), JiraError> {
        self.transition_issue(key, transition_id).await
    }
}
