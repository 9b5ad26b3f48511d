//! Deactivation-request pipeline for Jira webhooks.
//!
//! Normalizes ticket markup, extracts a structured intent (LLM first, regex
//! fallback), simulates per-system deactivation, reports back to the ticket
//! and routes its workflow status. Every invocation is self-contained.

pub mod event;
pub mod executor;
pub mod intent;
pub mod markup;
pub mod orchestrator;
pub mod routing;
pub mod summary;
#[cfg(test)]
mod test_support;

pub use event::{EventParseError, IncomingEvent};
pub use executor::{
    ActionExecutor, ExecutionPolicy, ExecutionResults, SystemStatus, SUPPORTED_SYSTEMS,
};
pub use intent::{
    ExtractedIntent, ExtractionFallback, IntentAction, IntentExtractor, DEFAULT_SYSTEM,
    EMAIL_NOT_FOUND,
};
pub use markup::normalize_markup;
pub use orchestrator::{DeactivationPipeline, PipelineConfig, PipelineOutcome, PipelineStatus};
pub use routing::{decide_target_status, RouteOutcome, WorkflowRouter};
pub use summary::{Summary, SummaryGenerator, EXECUTIVE_SUMMARY_UNAVAILABLE};
