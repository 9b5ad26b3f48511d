use std::sync::Arc;

use offboard_ai::{ChatRequest, LlmClient};

use crate::executor::ExecutionResults;

pub const EXECUTIVE_SUMMARY_UNAVAILABLE: &str = "Executive summary unavailable.";
const COMMENT_HEADER: &str = "AI Agent Processed Deactivation Request";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything reported back on the ticket for one run.
pub struct Summary {
    pub email: String,
    pub result_lines: String,
    pub executive: Option<String>,
}

impl Summary {
    pub fn render_comment(&self) -> String {
        let mut comment = format!(
            "{COMMENT_HEADER}\n\nUser: {}\n\nExecution Results:\n{}",
            self.email, self.result_lines
        );
        if let Some(executive) = self.executive.as_deref() {
            comment.push_str("\nExecutive Summary:\n");
            comment.push_str(executive);
            comment.push('\n');
        }
        comment
    }
}

/// One `SYSTEM : Status` line per system, each newline-terminated.
pub fn render_result_lines(results: &ExecutionResults) -> String {
    results
        .iter()
        .map(|(system, status)| format!("{} : {}\n", system.to_ascii_uppercase(), status))
        .collect()
}

pub fn build_executive_summary_prompt(email: &str, result_lines: &str) -> String {
    format!(
        r#"Write a short executive summary (3-4 lines) of this user access deactivation run for the ticket reviewer.

User email: {email}

Per-system results:
{result_lines}
IMPORTANT: Reproduce the user email address EXACTLY as written above ({email}). Do NOT replace it with a placeholder, mask it, or redact it.
Return plain text only, no JSON and no markdown headings."#
    )
}

#[derive(Clone)]
/// Builds the ticket comment, optionally with a model-written recap.
pub struct SummaryGenerator {
    llm: Option<Arc<dyn LlmClient>>,
    model: String,
    executive_enabled: bool,
}

impl SummaryGenerator {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        model: impl Into<String>,
        executive_enabled: bool,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            executive_enabled,
        }
    }

    pub async fn summarize(&self, email: &str, results: &ExecutionResults) -> Summary {
        let result_lines = render_result_lines(results);
        let executive = match (self.executive_enabled, self.llm.as_ref()) {
            (true, Some(llm)) => Some(
                self.executive_summary(llm.as_ref(), email, &result_lines)
                    .await,
            ),
            _ => None,
        };
        Summary {
            email: email.to_string(),
            result_lines,
            executive,
        }
    }

    async fn executive_summary(
        &self,
        llm: &dyn LlmClient,
        email: &str,
        result_lines: &str,
    ) -> String {
        let request = ChatRequest::single_prompt(
            self.model.as_str(),
            build_executive_summary_prompt(email, result_lines),
        );
        match llm.complete(request).await {
            Ok(response) => {
                let text = response.message.text_content().trim();
                if text.is_empty() {
                    tracing::warn!("executive summary response was empty");
                    EXECUTIVE_SUMMARY_UNAVAILABLE.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "executive summary model call failed");
                EXECUTIVE_SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}
