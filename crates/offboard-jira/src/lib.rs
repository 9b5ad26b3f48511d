//! Jira Cloud REST v3 surface used by the offboard service.
//!
//! Provides the [`IssueTracker`] seam consumed by the pipeline, the
//! basic-auth [`JiraClient`] implementing it, and helpers for the Atlassian
//! Document Format bodies Jira sends and accepts.

pub mod adf;
pub mod jira_client;
pub mod transport_helpers;

pub use jira_client::{IssueTracker, JiraClient, JiraConfig, Transition};
