use offboard_jira::adf::rich_text_to_plain;
use offboard_jira::transport_helpers::is_valid_issue_key;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
/// The parts of a Jira issue webhook the pipeline consumes.
pub struct IncomingEvent {
    pub issue_key: String,
    pub description_text: String,
    pub webhook_event: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
/// Enumerates supported `EventParseError` values.
pub enum EventParseError {
    #[error("webhook payload must be a JSON object")]
    NotAnObject,
    #[error("webhook payload is missing issue.key")]
    MissingIssueKey,
    #[error("webhook payload has an invalid issue.key '{0}'")]
    InvalidIssueKey(String),
}

impl IncomingEvent {
    pub fn new(issue_key: impl Into<String>, description_text: impl Into<String>) -> Self {
        Self {
            issue_key: issue_key.into(),
            description_text: description_text.into(),
            webhook_event: None,
        }
    }

    /// Reads `issue.key` (required) and `issue.fields.description`, which may
    /// be absent, `null`, a plain string or an ADF document.
    pub fn from_payload(payload: &Value) -> Result<Self, EventParseError> {
        if !payload.is_object() {
            return Err(EventParseError::NotAnObject);
        }
        let issue = payload.get("issue");
        let issue_key = issue
            .and_then(|issue| issue.get("key"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(EventParseError::MissingIssueKey)?;
        if !is_valid_issue_key(issue_key) {
            return Err(EventParseError::InvalidIssueKey(issue_key.to_string()));
        }

        let description_text = issue
            .and_then(|issue| issue.get("fields"))
            .and_then(|fields| fields.get("description"))
            .map(rich_text_to_plain)
            .unwrap_or_default();
        let webhook_event = payload
            .get("webhookEvent")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            issue_key: issue_key.to_string(),
            description_text,
            webhook_event,
        })
    }
}
