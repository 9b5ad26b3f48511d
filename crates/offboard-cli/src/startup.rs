use std::sync::Arc;

use anyhow::{Context, Result};
use offboard_ai::{GeminiClient, GeminiConfig, LlmClient};
use offboard_gateway::{run_webhook_server, WebhookServerConfig};
use offboard_jira::{IssueTracker, JiraClient, JiraConfig};
use offboard_pipeline::{DeactivationPipeline, PipelineConfig};

use crate::Cli;

/// `None` when no usable Gemini key is configured.
pub fn build_llm_client(cli: &Cli) -> Result<Option<Arc<dyn LlmClient>>> {
    let Some(api_key) = cli
        .gemini_api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    else {
        tracing::warn!("GEMINI_API_KEY is not set, running with heuristic extraction only");
        return Ok(None);
    };
    let client = GeminiClient::new(GeminiConfig {
        api_base: cli.gemini_api_base.clone(),
        api_key: api_key.to_string(),
        request_timeout_ms: cli.request_timeout_ms,
    })
    .context("failed to create gemini client")?;
    Ok(Some(Arc::new(client)))
}

pub fn build_jira_client(cli: &Cli) -> Result<JiraClient> {
    JiraClient::new(JiraConfig {
        base_url: cli.jira_base.clone(),
        account_email: cli.jira_email.clone(),
        api_token: cli.jira_api_token.clone(),
        request_timeout_ms: cli.request_timeout_ms,
    })
    .context("failed to create jira client")
}

pub fn build_pipeline_config(cli: &Cli) -> PipelineConfig {
    PipelineConfig {
        model: cli.model.trim().to_string(),
        extraction_fallback: cli.extraction_fallback.into(),
        execution_policy: cli.execution_policy.to_policy(cli.success_probability),
        execution_delay_ms: cli.execution_delay_ms,
        executive_summary: cli.executive_summary,
        mark_in_progress: cli.mark_in_progress,
    }
}

pub fn build_server_config(cli: &Cli) -> Result<WebhookServerConfig> {
    let llm = build_llm_client(cli)?;
    let tracker: Arc<dyn IssueTracker> = Arc::new(build_jira_client(cli)?);
    let pipeline = DeactivationPipeline::new(build_pipeline_config(cli), llm, tracker);
    Ok(WebhookServerConfig {
        bind: cli.bind.clone(),
        max_body_bytes: cli.max_body_bytes,
        pipeline: Arc::new(pipeline),
    })
}

pub async fn run_cli(cli: Cli) -> Result<()> {
    let config = build_server_config(&cli)?;
    tracing::info!(
        model = cli.model.as_str(),
        execution_policy = ?cli.execution_policy,
        extraction_fallback = ?cli.extraction_fallback,
        "offboard service configured"
    );
    run_webhook_server(config).await
}
