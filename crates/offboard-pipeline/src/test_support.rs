//! In-memory collaborators shared by the pipeline unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use offboard_ai::{AiError, ChatRequest, ChatResponse, ChatUsage, LlmClient, Message};
use offboard_jira::{IssueTracker, Transition};

#[derive(Clone, Default)]
/// Replies from a queue of scripted answers; an empty queue repeats the last.
pub(crate) struct ScriptedLlm {
    replies: Arc<Mutex<VecDeque<Option<String>>>>,
    last: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedLlm {
    pub(crate) fn replying(text: &str) -> Self {
        Self::scripted(vec![Some(text)])
    }

    pub(crate) fn failing() -> Self {
        Self::scripted(vec![None])
    }

    /// `None` entries answer with a provider error.
    pub(crate) fn scripted(replies: Vec<Option<&str>>) -> Self {
        let llm = Self::default();
        if let Ok(mut queue) = llm.replies.lock() {
            queue.extend(replies.into_iter().map(|reply| reply.map(str::to_string)));
        }
        llm
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, AiError> {
        self.requests.lock().expect("requests lock").push(request);
        let next = self.replies.lock().expect("replies lock").pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().expect("last lock") = reply.clone();
                reply
            }
            None => self.last.lock().expect("last lock").clone(),
        };
        match reply {
            Some(text) => Ok(ChatResponse {
                message: Message::assistant_text(text),
                finish_reason: Some("STOP".to_string()),
                usage: ChatUsage::default(),
            }),
            None => Err(AiError::HttpStatus {
                status: 503,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TrackerCall {
    ListTransitions(String),
    Transition(String, String),
    Comment(String, String),
}

#[derive(Default)]
struct FakeTrackerState {
    /// Workflow edges: (from status, transition id, transition name, to status).
    workflow: Vec<(String, String, String, String)>,
    status: String,
    calls: Vec<TrackerCall>,
    fail_comments: bool,
    fail_listing: bool,
}

#[derive(Clone, Default)]
/// A tiny workflow graph that records every call made against it.
pub(crate) struct FakeTracker {
    state: Arc<Mutex<FakeTrackerState>>,
}

impl FakeTracker {
    /// Open → In Progress → {Done, In Review}; Open has no direct Done edge.
    pub(crate) fn standard_workflow(initial_status: &str) -> Self {
        let tracker = Self::default();
        {
            let mut state = tracker.state.lock().expect("tracker lock");
            state.status = initial_status.to_string();
            state.workflow = vec![
                edge("Open", "11", "In Progress", "In Progress"),
                edge("In Progress", "31", "Done", "Done"),
                edge("In Progress", "41", "In Review", "In Review"),
                edge("In Review", "31", "Done", "Done"),
            ];
        }
        tracker
    }

    /// Every status can reach every listed transition directly.
    pub(crate) fn flat_workflow(names: &[&str]) -> Self {
        let tracker = Self::default();
        {
            let mut state = tracker.state.lock().expect("tracker lock");
            state.status = "Open".to_string();
            state.workflow = names
                .iter()
                .enumerate()
                .map(|(index, name)| edge("*", &format!("{}", index + 1), name, name))
                .collect();
        }
        tracker
    }

    /// Open → In Progress only; In Progress is a dead end.
    pub(crate) fn dead_end_workflow() -> Self {
        let tracker = Self::default();
        {
            let mut state = tracker.state.lock().expect("tracker lock");
            state.status = "Open".to_string();
            state.workflow = vec![edge("Open", "11", "In Progress", "In Progress")];
        }
        tracker
    }

    pub(crate) fn failing_comments(self) -> Self {
        self.state.lock().expect("tracker lock").fail_comments = true;
        self
    }

    pub(crate) fn failing_listing(self) -> Self {
        self.state.lock().expect("tracker lock").fail_listing = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<TrackerCall> {
        self.state.lock().expect("tracker lock").calls.clone()
    }

    pub(crate) fn status(&self) -> String {
        self.state.lock().expect("tracker lock").status.clone()
    }

    pub(crate) fn comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::Comment(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn applied_transition_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::Transition(_, id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

fn edge(from: &str, id: &str, name: &str, to: &str) -> (String, String, String, String) {
    (
        from.to_string(),
        id.to_string(),
        name.to_string(),
        to.to_string(),
    )
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn list_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let mut state = self.state.lock().expect("tracker lock");
        state
            .calls
            .push(TrackerCall::ListTransitions(issue_key.to_string()));
        if state.fail_listing {
            return Err(anyhow!("jira api list transitions failed with status 500"));
        }
        let current = state.status.clone();
        Ok(state
            .workflow
            .iter()
            .filter(|(from, _, _, _)| from == "*" || *from == current)
            .map(|(_, id, name, _)| Transition {
                id: id.clone(),
                name: name.clone(),
            })
            .collect())
    }

    async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()> {
        let mut state = self.state.lock().expect("tracker lock");
        state.calls.push(TrackerCall::Transition(
            issue_key.to_string(),
            transition_id.to_string(),
        ));
        let current = state.status.clone();
        let target = state
            .workflow
            .iter()
            .find(|(from, id, _, _)| (from == "*" || *from == current) && id == transition_id)
            .map(|(_, _, _, to)| to.clone())
            .ok_or_else(|| anyhow!("transition {transition_id} is not valid from {current}"))?;
        state.status = target;
        Ok(())
    }

    async fn add_comment(&self, issue_key: &str, text: &str) -> Result<()> {
        let mut state = self.state.lock().expect("tracker lock");
        state
            .calls
            .push(TrackerCall::Comment(issue_key.to_string(), text.to_string()));
        if state.fail_comments {
            return Err(anyhow!("jira api create comment failed with status 500"));
        }
        Ok(())
    }
}
