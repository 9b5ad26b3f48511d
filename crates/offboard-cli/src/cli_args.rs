use clap::{ArgAction, Parser};
use offboard_ai::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

use crate::{CliExecutionPolicy, CliExtractionFallback};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let parsed = value
        .parse::<f64>()
        .map_err(|error| format!("failed to parse float: {error}"))?;
    if !parsed.is_finite() || !(0.0..=1.0).contains(&parsed) {
        return Err("value must be a finite number in range 0.0..=1.0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "offboard",
    about = "Jira webhook service that classifies and executes access deactivation requests",
    version
)]
/// Public struct `Cli` used to configure the offboard service.
pub struct Cli {
    #[arg(
        long,
        env = "OFFBOARD_BIND",
        default_value = "127.0.0.1:8000",
        help = "Socket address for the webhook listener"
    )]
    pub bind: String,

    #[arg(
        long = "jira-base",
        env = "JIRA_BASE",
        help = "Jira Cloud site root, for example https://acme.atlassian.net"
    )]
    pub jira_base: String,

    #[arg(
        long = "jira-email",
        env = "JIRA_EMAIL",
        help = "Account email used for Jira basic auth"
    )]
    pub jira_email: String,

    #[arg(
        long = "jira-api-token",
        env = "JIRA_API_TOKEN",
        hide_env_values = true,
        help = "API token used for Jira basic auth"
    )]
    pub jira_api_token: String,

    #[arg(
        long = "gemini-api-key",
        env = "GEMINI_API_KEY",
        hide_env_values = true,
        help = "Gemini API key. When unset or blank the service runs without a language model."
    )]
    pub gemini_api_key: Option<String>,

    #[arg(
        long = "gemini-api-base",
        env = "OFFBOARD_GEMINI_API_BASE",
        default_value = DEFAULT_GEMINI_API_BASE,
        help = "Base URL for the Gemini generateContent API"
    )]
    pub gemini_api_base: String,

    #[arg(
        long,
        env = "OFFBOARD_MODEL",
        default_value = DEFAULT_GEMINI_MODEL,
        help = "Gemini model used for extraction and summaries"
    )]
    pub model: String,

    #[arg(
        long = "request-timeout-ms",
        env = "OFFBOARD_REQUEST_TIMEOUT_MS",
        default_value_t = 8_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each outbound Jira or Gemini request"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "extraction-fallback",
        env = "OFFBOARD_EXTRACTION_FALLBACK",
        value_enum,
        default_value_t = CliExtractionFallback::OnFailure,
        help = "When the regex heuristic replaces model extraction"
    )]
    pub extraction_fallback: CliExtractionFallback,

    #[arg(
        long = "execution-policy",
        env = "OFFBOARD_EXECUTION_POLICY",
        value_enum,
        default_value_t = CliExecutionPolicy::AllowList,
        help = "How simulated per-system deactivation decides success"
    )]
    pub execution_policy: CliExecutionPolicy,

    #[arg(
        long = "success-probability",
        env = "OFFBOARD_SUCCESS_PROBABILITY",
        default_value_t = 0.75,
        value_parser = parse_probability,
        help = "Success probability for supported systems under --execution-policy=probabilistic"
    )]
    pub success_probability: f64,

    #[arg(
        long = "execution-delay-ms",
        env = "OFFBOARD_EXECUTION_DELAY_MS",
        default_value_t = 0,
        help = "Artificial latency per simulated system action"
    )]
    pub execution_delay_ms: u64,

    #[arg(
        long = "executive-summary",
        env = "OFFBOARD_EXECUTIVE_SUMMARY",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Append a model-written executive summary to the ticket comment"
    )]
    pub executive_summary: bool,

    #[arg(
        long = "mark-in-progress",
        env = "OFFBOARD_MARK_IN_PROGRESS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Move processed tickets to In Progress before routing"
    )]
    pub mark_in_progress: bool,

    #[arg(
        long = "max-body-bytes",
        env = "OFFBOARD_MAX_BODY_BYTES",
        default_value_t = 1_048_576,
        value_parser = parse_positive_usize,
        help = "Largest accepted webhook request body"
    )]
    pub max_body_bytes: usize,
}
