use crossterm::event::{KeyCode, KeyEvent};

use crate::api::types::WriteAction;

use super::schedule::BlockId;
use super::state::{AppState, Cursor, Focus, Mode};

/// `Cmd/Ctrl+Backspace`: the selected task, or the selected block (asking first
/// when it still holds tasks).
pub(super) fn delete_selected(state: &mut AppState) -> Mode {
    let Cursor::Block { id, focus } = state.cursor.clone() else {
        return Mode::Navigating;
    };
    match focus {
        Focus::Task(task_id) => {
            delete_task(state, &id, &task_id);
            Mode::Navigating
        }
        Focus::Header => {
            let has_tasks = state
                .schedule
                .get(&id)
                .is_some_and(|b| !b.tasks.is_empty());
            if has_tasks {
                Mode::ConfirmDelete { block_id: id }
            } else {
                delete_block(state, &id);
                Mode::Navigating
            }
        }
        Focus::Input { .. } => Mode::Navigating,
    }
}

pub(super) fn handle_confirm_delete_key(
    state: &mut AppState,
    block_id: BlockId,
    key: &KeyEvent,
) -> Mode {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            delete_block(state, &block_id);
            Mode::Navigating
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Navigating,
        _ => Mode::ConfirmDelete { block_id },
    }
}

/// Selection moves to the task that slid into the slot, else the new last task,
/// else the before-first input slot.
fn delete_task(state: &mut AppState, block_id: &str, task_id: &str) {
    let Some((_, index, _)) = state.schedule.take_task(task_id) else {
        return;
    };
    tracing::info!(target: "planner.write", task = %task_id, "task deleted");
    state.outbox.push(WriteAction::DeleteTask {
        id: task_id.to_string(),
    });

    let tasks = state
        .schedule
        .get(block_id)
        .map(|b| b.tasks.as_slice())
        .unwrap_or_default();
    let focus = match tasks.get(index).or(tasks.last()) {
        Some(next) => Focus::Task(next.id.clone()),
        None => Focus::Input { after: None },
    };
    state.cursor = Cursor::Block {
        id: block_id.to_string(),
        focus,
    };
}

fn delete_block(state: &mut AppState, block_id: &str) {
    let Some((index, _)) = state.schedule.remove(block_id) else {
        return;
    };
    tracing::info!(target: "planner.write", block = %block_id, index, "block deleted");
    state.outbox.push(WriteAction::DeleteBlock {
        id: block_id.to_string(),
    });
    if index < state.schedule.len() {
        state.outbox.push(WriteAction::ReorderBlockIndices {
            day_id: state.schedule.day_id.clone(),
            from_index: index,
        });
    }

    let next = index.min(state.schedule.len().saturating_sub(1));
    state.cursor = match state.schedule.id_at(next) {
        Some(id) => Cursor::Block {
            id: id.to_string(),
            focus: Focus::Header,
        },
        None => Cursor::Between { after: None },
    };
}
