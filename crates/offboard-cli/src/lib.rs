//! Command-line entry point: flag/env parsing and service wiring.
mod bootstrap_helpers;
mod cli_args;
mod cli_types;
mod startup;

pub use bootstrap_helpers::init_tracing;
pub use cli_args::Cli;
pub use cli_types::{CliExecutionPolicy, CliExtractionFallback};
pub use startup::{
    build_jira_client, build_llm_client, build_pipeline_config, build_server_config, run_cli,
};
