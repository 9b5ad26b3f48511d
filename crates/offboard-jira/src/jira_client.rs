use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adf::comment_document;
use crate::transport_helpers::truncate_for_error;

const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One workflow transition currently available on an issue.
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TransitionListResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[async_trait]
/// Trait contract for the tracker operations the pipeline performs.
pub trait IssueTracker: Send + Sync {
    /// Transitions available from the issue's current status. Never cached.
    async fn list_transitions(&self, issue_key: &str) -> Result<Vec<Transition>>;

    async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()>;

    /// Posts `text` as a single-paragraph comment.
    async fn add_comment(&self, issue_key: &str, text: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
/// Public struct `JiraConfig` used to build a [`JiraClient`].
pub struct JiraConfig {
    pub base_url: String,
    pub account_email: String,
    pub api_token: String,
    pub request_timeout_ms: u64,
}

#[derive(Clone)]
/// Basic-auth Jira Cloud REST v3 client. Failed calls are not retried.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    account_email: String,
    api_token: String,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            bail!("jira base url is required");
        }
        if config.account_email.trim().is_empty() || config.api_token.trim().is_empty() {
            bail!("jira account email and api token are required");
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("offboard-jira-webhook"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create jira api client")?;
        Ok(Self {
            http,
            base_url,
            account_email: config.account_email.trim().to_string(),
            api_token: config.api_token.trim().to_string(),
        })
    }

    fn issue_url(&self, issue_key: &str, resource: &str) -> String {
        format!(
            "{}/rest/api/3/issue/{}/{}",
            self.base_url, issue_key, resource
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.account_email, Some(&self.api_token))
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .authorized(request)
            .send()
            .await
            .with_context(|| format!("jira api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "jira api {operation} failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, ERROR_BODY_MAX_CHARS)
            );
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode jira {operation}"))
    }

    async fn request_status(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<u16> {
        let response = self
            .authorized(request)
            .send()
            .await
            .with_context(|| format!("jira api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "jira api {operation} failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, ERROR_BODY_MAX_CHARS)
            );
        }
        Ok(status.as_u16())
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn list_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let url = self.issue_url(issue_key, "transitions");
        let response: TransitionListResponse = self
            .request_json("list transitions", self.http.get(url))
            .await?;
        Ok(response.transitions)
    }

    async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()> {
        let url = self.issue_url(issue_key, "transitions");
        let payload = json!({ "transition": { "id": transition_id } });
        let status = self
            .request_status("transition issue", self.http.post(url).json(&payload))
            .await?;
        tracing::debug!(issue_key, transition_id, status, "jira transition applied");
        Ok(())
    }

    async fn add_comment(&self, issue_key: &str, text: &str) -> Result<()> {
        let url = self.issue_url(issue_key, "comment");
        let payload = json!({ "body": comment_document(text) });
        let status = self
            .request_status("create comment", self.http.post(url).json(&payload))
            .await?;
        tracing::debug!(issue_key, status, "jira comment created");
        Ok(())
    }
}
