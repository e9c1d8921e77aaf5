use tokio::sync::mpsc;

use crate::api::client::PlannerClient;
use crate::api::types::WriteAction;
use crate::error::ErrorInfo;

use super::state::AppMessage;

pub(super) fn spawn_fetch_day(
    client: &PlannerClient,
    day_id: &str,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let client = client.clone();
    let tx = tx.clone();
    let day_id = day_id.to_string();
    tokio::spawn(async move {
        match client.fetch_day(&day_id).await {
            Ok(plan) => {
                tracing::info!(target: "planner.load", day = %day_id, blocks = plan.blocks.len(), "day loaded");
                let _ = tx.send(AppMessage::DayLoaded(plan));
            }
            Err(e) => {
                tracing::error!(target: "planner.load", day = %day_id, error = %e, "day fetch failed");
                let _ = tx.send(AppMessage::ApiError(ErrorInfo::from_planner_error(&e)));
            }
        }
    });
}

pub(super) fn spawn_fetch_corpus(client: &PlannerClient, tx: &mpsc::UnboundedSender<AppMessage>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        match client.fetch_corpus().await {
            Ok(corpus) => {
                tracing::info!(
                    target: "planner.load",
                    routines = corpus.routines.len(),
                    events = corpus.events.len(),
                    tasks = corpus.tasks.len(),
                    projects = corpus.projects.len(),
                    "corpus loaded"
                );
                let _ = tx.send(AppMessage::CorpusLoaded(corpus));
            }
            Err(e) => {
                tracing::error!(target: "planner.load", error = %e, "corpus fetch failed");
                let _ = tx.send(AppMessage::ApiError(ErrorInfo::from_planner_error(&e)));
            }
        }
    });
}

/// Fire and forget. Local state already reflects the change and is never rolled
/// back; a failure only reaches the log.
pub(super) fn spawn_write(client: &PlannerClient, action: WriteAction) {
    let client = client.clone();
    tokio::spawn(async move {
        match client.write(&action).await {
            Ok(receipt) => {
                tracing::debug!(
                    target: "planner.write",
                    action = action.name(),
                    id = receipt.id.as_deref().unwrap_or("-"),
                    "write acknowledged"
                );
            }
            Err(e) => {
                tracing::error!(target: "planner.write", action = action.name(), error = %e, "write failed");
            }
        }
    });
}
