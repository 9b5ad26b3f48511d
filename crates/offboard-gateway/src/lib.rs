//! HTTP surface of the offboard service: the Jira webhook endpoint and a
//! health probe, served with axum.
pub mod webhook_server;

pub use webhook_server::*;
