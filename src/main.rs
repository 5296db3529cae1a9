//! Advisor dashboard — one-shot load against the configured record store.
//!
//! Loads ~/.advisor-dashboard/config.json (or `ADVISOR_INSTANCE_URL`), runs a
//! full dashboard refresh and prints the summary as JSON on stdout.
//!
//! Usage: `RUST_LOG=debug advisor-dashboard`

use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;

use advisor_dashboard::config::load_config;
use advisor_dashboard::dashboard::SummaryCounts;
use advisor_dashboard::session::TabLabel;
use advisor_dashboard::{Dashboard, DashboardSession, LoadResult, TableApiClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    counts: SummaryCounts,
    using_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_error: Option<String>,
    tabs: Vec<TabLabel>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match TableApiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build record store client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let dashboard = Dashboard::new(Arc::new(client)).with_fallback(config.fallback_on_error);
    let mut session = DashboardSession::with_dashboard(dashboard);
    let result = session.refresh().await;

    let summary = Summary {
        counts: session.counts(),
        using_fallback: session.dashboard().using_fallback(),
        fallback_cause: match &result {
            LoadResult::Fallback { cause, .. } => Some(cause.to_string()),
            _ => None,
        },
        load_error: match &result {
            LoadResult::Failed(cause) => Some(cause.to_string()),
            _ => None,
        },
        tabs: session.tabs(),
    };

    let failed = summary.load_error.is_some();
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{}", json);
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            log::error!("Failed to serialize summary: {}", e);
            ExitCode::FAILURE
        }
    }
}
