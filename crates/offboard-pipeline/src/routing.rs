use std::sync::Arc;

use anyhow::Result;
use offboard_jira::IssueTracker;

use crate::executor::ExecutionResults;

pub const STATUS_DONE: &str = "Done";
pub const STATUS_IN_REVIEW: &str = "In Review";
pub const STATUS_IN_PROGRESS: &str = "In Progress";

/// Target status for aggregated results; first matching rule wins.
pub fn decide_target_status(results: &ExecutionResults) -> Option<&'static str> {
    if results.all_succeeded() {
        Some(STATUS_DONE)
    } else if results.any_unsupported() {
        Some(STATUS_IN_REVIEW)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// What the router decided and whether the target transition was applied.
pub struct RouteOutcome {
    pub target: Option<&'static str>,
    pub applied: bool,
}

#[derive(Clone)]
/// Best-effort workflow transitions. Tracker failures are logged, never raised.
pub struct WorkflowRouter {
    tracker: Arc<dyn IssueTracker>,
    mark_in_progress_first: bool,
}

impl WorkflowRouter {
    pub fn new(tracker: Arc<dyn IssueTracker>, mark_in_progress_first: bool) -> Self {
        Self {
            tracker,
            mark_in_progress_first,
        }
    }

    pub async fn route(&self, issue_key: &str, results: &ExecutionResults) -> RouteOutcome {
        if self.mark_in_progress_first {
            self.apply_named_transition(issue_key, STATUS_IN_PROGRESS)
                .await;
        }

        let Some(target) = decide_target_status(results) else {
            tracing::info!(issue_key, "failures present, ticket stays in its current status");
            return RouteOutcome::default();
        };

        let applied = self.transition_to(issue_key, target).await;
        RouteOutcome {
            target: Some(target),
            applied,
        }
    }

    /// Applies `target` directly when available, otherwise hops through
    /// "In Progress" and tries once more.
    pub async fn transition_to(&self, issue_key: &str, target: &str) -> bool {
        if self.apply_named_transition(issue_key, target).await {
            return true;
        }
        if target.eq_ignore_ascii_case(STATUS_IN_PROGRESS) {
            return false;
        }
        if !self
            .apply_named_transition(issue_key, STATUS_IN_PROGRESS)
            .await
        {
            tracing::info!(issue_key, target, "no path to target transition, skipping");
            return false;
        }
        let applied = self.apply_named_transition(issue_key, target).await;
        if !applied {
            tracing::info!(
                issue_key,
                target,
                "target transition unavailable after intermediate hop, skipping"
            );
        }
        applied
    }

    async fn apply_named_transition(&self, issue_key: &str, name: &str) -> bool {
        match self.try_named_transition(issue_key, name).await {
            Ok(applied) => applied,
            Err(error) => {
                tracing::warn!(
                    issue_key,
                    transition = name,
                    error = %error,
                    "jira transition failed"
                );
                false
            }
        }
    }

    async fn try_named_transition(&self, issue_key: &str, name: &str) -> Result<bool> {
        let transitions = self.tracker.list_transitions(issue_key).await?;
        let Some(transition) = transitions
            .iter()
            .find(|transition| transition.name.trim().eq_ignore_ascii_case(name))
        else {
            tracing::debug!(issue_key, transition = name, "transition not available");
            return Ok(false);
        };
        self.tracker
            .transition_issue(issue_key, &transition.id)
            .await?;
        tracing::info!(
            issue_key,
            transition = name,
            transition_id = transition.id.as_str(),
            "ticket transitioned"
        );
        Ok(true)
    }
}
