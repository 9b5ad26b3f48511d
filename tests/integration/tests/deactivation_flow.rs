use std::sync::Arc;

use httpmock::prelude::*;
use offboard_ai::{GeminiClient, GeminiConfig, LlmClient};
use offboard_jira::{IssueTracker, JiraClient, JiraConfig};
use offboard_pipeline::{
    DeactivationPipeline, IncomingEvent, PipelineConfig, PipelineStatus, SystemStatus,
};
use serde_json::{json, Value};

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn gemini_client(server: &MockServer) -> Arc<dyn LlmClient> {
    Arc::new(
        GeminiClient::new(GeminiConfig {
            api_base: format!("{}/v1beta", server.base_url()),
            api_key: "test-gemini-key".to_string(),
            request_timeout_ms: 2_000,
        })
        .expect("gemini client"),
    )
}

fn jira_client(server: &MockServer) -> Arc<dyn IssueTracker> {
    Arc::new(
        JiraClient::new(JiraConfig {
            base_url: server.base_url(),
            account_email: "ops@example.com".to_string(),
            api_token: "secret-token".to_string(),
            request_timeout_ms: 2_000,
        })
        .expect("jira client"),
    )
}

fn pipeline(llm: Option<Arc<dyn LlmClient>>, jira: &MockServer) -> DeactivationPipeline {
    DeactivationPipeline::new(
        PipelineConfig {
            executive_summary: false,
            ..PipelineConfig::default()
        },
        llm,
        jira_client(jira),
    )
}

fn event(issue_key: &str, description: Value) -> IncomingEvent {
    IncomingEvent::from_payload(&json!({
        "webhookEvent": "jira:issue_created",
        "issue": {"key": issue_key, "fields": {"description": description}}
    }))
    .expect("valid webhook payload")
}

#[tokio::test]
async fn integration_supported_systems_are_reported_and_closed() {
    let gemini = MockServer::start();
    let extraction = gemini.mock(|when, then| {
        when.method(POST)
            .path(GEMINI_PATH)
            .query_param("key", "test-gemini-key");
        then.status(200).json_body(gemini_reply(
            "```json\n{\"action\":\"deactivate\",\"email\":\"jane@example.com\",\"systems\":[\"jira\",\"confluence\"]}\n```",
        ));
    });
    let jira = MockServer::start();
    let comment = jira.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/issue/OPS-100/comment")
            .json_body(json!({
                "body": {
                    "type": "doc",
                    "version": 1,
                    "content": [{
                        "type": "paragraph",
                        "content": [{
                            "type": "text",
                            "text": "AI Agent Processed Deactivation Request\n\nUser: jane@example.com\n\nExecution Results:\nJIRA : Success\nCONFLUENCE : Success\n"
                        }]
                    }]
                }
            }));
        then.status(201).json_body(json!({"id": "10001"}));
    });
    let listing = jira.mock(|when, then| {
        when.method(GET).path("/rest/api/3/issue/OPS-100/transitions");
        then.status(200).json_body(json!({
            "transitions": [
                {"id": "21", "name": "In Progress"},
                {"id": "31", "name": "Done"}
            ]
        }));
    });
    let transition = jira.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/issue/OPS-100/transitions")
            .json_body(json!({"transition": {"id": "31"}}));
        then.status(204);
    });

    let outcome = pipeline(Some(gemini_client(&gemini)), &jira)
        .handle(&event(
            "OPS-100",
            json!("Please deactivate [jane@example.com|mailto:jane@example.com] from Jira and Confluence."),
        ))
        .await;

    assert_eq!(outcome.status, PipelineStatus::Processed);
    assert!(outcome.comment_posted);
    extraction.assert_hits(1);
    comment.assert();
    listing.assert_hits(1);
    transition.assert();
}

#[tokio::test]
async fn integration_unsupported_system_routes_to_in_review() {
    let gemini = MockServer::start();
    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_reply(
            r#"{"action":"deactivate","email":"sam@example.com","systems":["jira","slack"]}"#,
        ));
    });
    let jira = MockServer::start();
    jira.mock(|when, then| {
        when.method(POST).path("/rest/api/3/issue/OPS-101/comment");
        then.status(201).json_body(json!({"id": "10002"}));
    });
    jira.mock(|when, then| {
        when.method(GET).path("/rest/api/3/issue/OPS-101/transitions");
        then.status(200).json_body(json!({
            "transitions": [
                {"id": "31", "name": "Done"},
                {"id": "41", "name": "In Review"}
            ]
        }));
    });
    let in_review = jira.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/issue/OPS-101/transitions")
            .json_body(json!({"transition": {"id": "41"}}));
        then.status(204);
    });

    let outcome = pipeline(Some(gemini_client(&gemini)), &jira)
        .handle(&event("OPS-101", json!("Remove sam@example.com from Jira and Slack")))
        .await;

    assert_eq!(outcome.status, PipelineStatus::Processed);
    let results = outcome.results.expect("execution results");
    assert_eq!(results.get("slack"), Some(SystemStatus::UnsupportedSystem));
    in_review.assert();
}

#[tokio::test]
async fn integration_llm_outage_falls_back_to_heuristic() {
    let gemini = MockServer::start();
    let outage = gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(503).body("model overloaded");
    });
    let jira = MockServer::start();
    let comment = jira.mock(|when, then| {
        when.method(POST).path("/rest/api/3/issue/OPS-102/comment");
        then.status(201).json_body(json!({"id": "10003"}));
    });
    jira.mock(|when, then| {
        when.method(GET).path("/rest/api/3/issue/OPS-102/transitions");
        then.status(200)
            .json_body(json!({"transitions": [{"id": "31", "name": "Done"}]}));
    });
    let done = jira.mock(|when, then| {
        when.method(POST)
            .path("/rest/api/3/issue/OPS-102/transitions")
            .json_body(json!({"transition": {"id": "31"}}));
        then.status(204);
    });

    let adf_description = json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{"type": "text", "text": "Offboard alex@example.com please"}]
        }]
    });
    let outcome = pipeline(Some(gemini_client(&gemini)), &jira)
        .handle(&event("OPS-102", adf_description))
        .await;

    assert_eq!(outcome.status, PipelineStatus::Processed);
    outage.assert_hits(1);
    comment.assert();
    done.assert();
    let results = outcome.results.expect("execution results");
    assert_eq!(results.get("jira"), Some(SystemStatus::Success));
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn integration_non_deactivation_ticket_makes_no_jira_calls() {
    let gemini = MockServer::start();
    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200)
            .json_body(gemini_reply(r#"{"action":"ignore"}"#));
    });
    let jira = MockServer::start();
    let any_jira_call = jira.mock(|_when, then| {
        then.status(500);
    });

    let outcome = pipeline(Some(gemini_client(&gemini)), &jira)
        .handle(&event("OPS-103", json!("My laptop will not boot.")))
        .await;

    assert_eq!(outcome.status, PipelineStatus::IgnoredNotDeactivation);
    assert!(outcome.results.is_none());
    any_jira_call.assert_hits(0);
}

#[tokio::test]
async fn integration_jira_failures_do_not_abort_processing() {
    let jira = MockServer::start();
    let comment = jira.mock(|when, then| {
        when.method(POST).path("/rest/api/3/issue/OPS-104/comment");
        then.status(500).body("jira is down");
    });
    let listing = jira.mock(|when, then| {
        when.method(GET).path("/rest/api/3/issue/OPS-104/transitions");
        then.status(500).body("jira is down");
    });

    let outcome = pipeline(None, &jira)
        .handle(&event("OPS-104", json!("deactivate pat@example.com")))
        .await;

    assert_eq!(outcome.status, PipelineStatus::Processed);
    assert!(!outcome.comment_posted);
    comment.assert_hits(1);
    assert!(listing.hits() >= 1);
    let route = outcome.route.expect("route attempted");
    assert!(!route.applied);
}
