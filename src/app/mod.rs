mod cursor;
mod delete;
mod editing;
mod grab;
mod input;
mod ordering;
pub(crate) mod predict;
pub(crate) mod schedule;
pub(crate) mod slash;
pub(crate) mod smart_time;
mod state;
mod tasks;
mod typing;
pub use editing::TimeInput;
pub use state::*;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::api::client::PlannerClient;
use crate::api::types::{Corpus, DayPlan};
use crate::config::AppConfig;
use crate::error::{ErrorInfo, ErrorPopup, Result};
use crate::keys::action::Action;
use crate::keys::KeybindingMap;

use schedule::Schedule;
use tasks::{spawn_fetch_corpus, spawn_fetch_day, spawn_write};

/// Loaded plans are put in start-time order without queuing a write.
pub fn handle_day_loaded(state: &mut AppState, plan: DayPlan) {
    let mut schedule = Schedule::from_plan(plan);
    if let Some(from) = schedule.sort_by_time() {
        tracing::debug!(target: "planner.load", from, "loaded plan was out of order");
    }
    state.schedule = schedule;
    state.cursor = cursor::initial(&state.schedule);
    state.mode = Mode::Navigating;
    state.loading = false;
    state.status_message = None;
}

pub fn handle_corpus_loaded(state: &mut AppState, corpus: Corpus) {
    state.corpus = corpus;
}

pub fn handle_api_error(state: &mut AppState, error: ErrorInfo) {
    state.loading = false;
    state.status_message = None;
    state.error_popup = Some(ErrorPopup::from_error_info(&error));
}

fn reload(state: &mut AppState, client: &PlannerClient, tx: &mpsc::UnboundedSender<AppMessage>) {
    state.loading = true;
    state.status_message = Some("Reloading...".into());
    spawn_fetch_day(client, &state.schedule.day_id, tx);
    spawn_fetch_corpus(client, tx);
}

/// Global bindings only apply while navigating so they never eat typed text.
fn handle_global_action(
    state: &mut AppState,
    action: Action,
    client: &PlannerClient,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    match action {
        Action::Quit => state.should_quit = true,
        Action::Help => state.show_help = true,
        Action::Reload => reload(state, client, tx),
    }
}

pub async fn run(config: &AppConfig, terminal: &mut DefaultTerminal) -> Result<()> {
    let keybindings = KeybindingMap::new(&config.keybindings.bindings)?;

    let day_id = chrono::Local::now().format("%Y-%m-%d").to_string();
    let mut state = AppState::new(&day_id, keybindings.hints());
    state.catch_all_type = config.schedule.catch_all_type;
    state.default_task_minutes = config.schedule.default_task_minutes;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

    let client = PlannerClient::new(&config.backend.url, &config.backend.api_token);

    spawn_fetch_day(&client, &day_id, &tx);
    spawn_fetch_corpus(&client, &tx);

    // Key releases only matter for modifiers, which end a multi-task grab.
    let event_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(Event::Key(key))) => {
                    let forward = match key.kind {
                        KeyEventKind::Press | KeyEventKind::Repeat => true,
                        KeyEventKind::Release => matches!(key.code, KeyCode::Modifier(_)),
                    };
                    if forward && event_tx.send(AppMessage::Key(key)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
                _ => {}
            }
        }
    });

    let tick_tx = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15));
        loop {
            interval.tick().await;
            if tick_tx.send(AppMessage::Tick).is_err() {
                break;
            }
        }
    });

    loop {
        terminal.draw(|frame| crate::ui::render(frame, &state))?;

        if let Some(msg) = rx.recv().await {
            match msg {
                AppMessage::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        input::handle_key(&mut state, &key);
                    } else if state.error_popup.is_some() {
                        state.error_popup = None;
                    } else if state.show_help {
                        state.show_help = false;
                    } else if let Some(action) = keybindings
                        .resolve(&key)
                        .filter(|_| state.mode == Mode::Navigating)
                    {
                        handle_global_action(&mut state, action, &client, &tx);
                    } else {
                        state.refresh_clock();
                        input::handle_key(&mut state, &key);
                    }

                    if !state.outbox.is_empty() {
                        tracing::debug!(
                            target: "planner.write",
                            pending = state.outbox.len(),
                            "flushing outbox"
                        );
                        for action in state.outbox.drain() {
                            spawn_write(&client, action);
                        }
                    }
                    if state.search_scheduled {
                        let _ = tx.send(AppMessage::RunSearch);
                    }
                }
                AppMessage::RunSearch => typing::run_deferred_search(&mut state),
                AppMessage::DayLoaded(plan) => handle_day_loaded(&mut state, plan),
                AppMessage::CorpusLoaded(corpus) => handle_corpus_loaded(&mut state, corpus),
                AppMessage::ApiError(err) => handle_api_error(&mut state, err),
                AppMessage::Tick => state.refresh_clock(),
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}
