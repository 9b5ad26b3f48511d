use std::sync::Arc;
use std::time::Duration;

use offboard_ai::LlmClient;
use offboard_jira::IssueTracker;

use crate::event::IncomingEvent;
use crate::executor::{ActionExecutor, ExecutionPolicy, ExecutionResults};
use crate::intent::{ExtractionFallback, IntentExtractor};
use crate::markup::normalize_markup;
use crate::routing::{RouteOutcome, WorkflowRouter};
use crate::summary::SummaryGenerator;

#[derive(Debug, Clone, PartialEq)]
/// Public struct `PipelineConfig` used across offboard components.
pub struct PipelineConfig {
    pub model: String,
    pub extraction_fallback: ExtractionFallback,
    pub execution_policy: ExecutionPolicy,
    pub execution_delay_ms: u64,
    pub executive_summary: bool,
    pub mark_in_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: offboard_ai::DEFAULT_GEMINI_MODEL.to_string(),
            extraction_fallback: ExtractionFallback::default(),
            execution_policy: ExecutionPolicy::default(),
            execution_delay_ms: 0,
            executive_summary: true,
            mark_in_progress: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `PipelineStatus` values reported to the webhook caller.
pub enum PipelineStatus {
    Ignored,
    IgnoredNotDeactivation,
    Processed,
}

impl PipelineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignored => "Ignored",
            Self::IgnoredNotDeactivation => "Ignored - Not deactivation",
            Self::Processed => "Processed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineStage {
    Received,
    Normalized,
    Ignored,
    Classified,
    Executed,
    Reported,
    Routed,
    Done,
}

impl PipelineStage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Normalized => "normalized",
            Self::Ignored => "ignored",
            Self::Classified => "classified",
            Self::Executed => "executed",
            Self::Reported => "reported",
            Self::Routed => "routed",
            Self::Done => "done",
        }
    }
}

fn enter_stage(issue_key: &str, stage: PipelineStage) {
    tracing::debug!(issue_key, stage = stage.as_str(), "pipeline stage");
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of one webhook invocation.
pub struct PipelineOutcome {
    pub status: PipelineStatus,
    pub results: Option<ExecutionResults>,
    pub comment_posted: bool,
    pub route: Option<RouteOutcome>,
}

impl PipelineOutcome {
    fn ignored(status: PipelineStatus) -> Self {
        Self {
            status,
            results: None,
            comment_posted: false,
            route: None,
        }
    }
}

#[derive(Clone)]
/// Wires extraction, execution, reporting and routing for one event at a time.
pub struct DeactivationPipeline {
    extractor: IntentExtractor,
    executor: ActionExecutor,
    summarizer: SummaryGenerator,
    router: WorkflowRouter,
    tracker: Arc<dyn IssueTracker>,
}

impl DeactivationPipeline {
    pub fn new(
        config: PipelineConfig,
        llm: Option<Arc<dyn LlmClient>>,
        tracker: Arc<dyn IssueTracker>,
    ) -> Self {
        Self {
            extractor: IntentExtractor::new(
                llm.clone(),
                config.model.as_str(),
                config.extraction_fallback,
            ),
            executor: ActionExecutor::new(
                config.execution_policy,
                Duration::from_millis(config.execution_delay_ms),
            ),
            summarizer: SummaryGenerator::new(llm, config.model, config.executive_summary),
            router: WorkflowRouter::new(tracker.clone(), config.mark_in_progress),
            tracker,
        }
    }

    pub fn llm_configured(&self) -> bool {
        self.extractor.llm_configured()
    }

    pub async fn handle(&self, event: &IncomingEvent) -> PipelineOutcome {
        let issue_key = event.issue_key.as_str();
        enter_stage(issue_key, PipelineStage::Received);
        tracing::info!(
            issue_key,
            webhook_event = event.webhook_event.as_deref().unwrap_or("unknown"),
            description_chars = event.description_text.chars().count(),
            "webhook received"
        );

        let text = normalize_markup(&event.description_text);
        enter_stage(issue_key, PipelineStage::Normalized);

        let Some(intent) = self.extractor.extract(&text).await else {
            tracing::info!(issue_key, "no structured intent, ignoring");
            enter_stage(issue_key, PipelineStage::Ignored);
            return PipelineOutcome::ignored(PipelineStatus::Ignored);
        };
        if !intent.is_deactivation() {
            tracing::info!(
                issue_key,
                action = intent.action.as_str(),
                "not a deactivation request, ignoring"
            );
            enter_stage(issue_key, PipelineStage::Ignored);
            return PipelineOutcome::ignored(PipelineStatus::IgnoredNotDeactivation);
        }
        enter_stage(issue_key, PipelineStage::Classified);

        let results = self
            .executor
            .execute_all(&intent.email, &intent.systems)
            .await;
        enter_stage(issue_key, PipelineStage::Executed);

        let summary = self.summarizer.summarize(&intent.email, &results).await;
        let comment_posted = match self
            .tracker
            .add_comment(issue_key, &summary.render_comment())
            .await
        {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(issue_key, error = %error, "failed to post summary comment");
                false
            }
        };
        enter_stage(issue_key, PipelineStage::Reported);

        let route = self.router.route(issue_key, &results).await;
        enter_stage(issue_key, PipelineStage::Routed);

        tracing::info!(
            issue_key,
            systems = results.len(),
            comment_posted,
            target = route.target.unwrap_or("none"),
            transitioned = route.applied,
            "deactivation request processed"
        );
        enter_stage(issue_key, PipelineStage::Done);
        PipelineOutcome {
            status: PipelineStatus::Processed,
            results: Some(results),
            comment_posted,
            route: Some(route),
        }
    }
}
