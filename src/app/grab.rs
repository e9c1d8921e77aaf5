use chrono::NaiveTime;
use crossterm::event::{KeyCode, KeyEvent, ModifierKeyCode};

use crate::api::types::{BlockPatch, WriteAction};
use crate::keys::is_command_modifier;

use super::cursor;
use super::editing::TimeInput;
use super::input::typed_char;
use super::schedule::{BlockId, Schedule, TaskId};
use super::smart_time;
use super::state::{AppState, Cursor, Focus, GrabPhase, Mode, MultiGrab};

/// Block drop waiting for its start time to be confirmed.
pub struct PendingMove {
    pub block_id: BlockId,
    pub old_index: usize,
    pub new_index: usize,
    pub original_time: NaiveTime,
    pub time: TimeInput,
}

fn focus_task(cursor: &mut Cursor, block_id: &str, task_id: &str) {
    *cursor = Cursor::Block {
        id: block_id.to_string(),
        focus: Focus::Task(task_id.to_string()),
    };
}

fn is_release_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter) || typed_char(key) == Some('g')
}

// --- Single block ---

pub(super) fn start_block_grab(state: &AppState, block_id: &str) -> Mode {
    let (Some(index), Some(block)) = (state.schedule.index_of(block_id), state.schedule.get(block_id))
    else {
        return Mode::Navigating;
    };
    tracing::debug!(target: "planner.grab", block = %block_id, index, "block grabbed");
    Mode::GrabbedBlock {
        block_id: block_id.to_string(),
        original_index: index,
        original_time: block.time,
    }
}

pub(super) fn handle_block_grab_key(
    state: &mut AppState,
    block_id: BlockId,
    original_index: usize,
    original_time: NaiveTime,
    key: &KeyEvent,
) -> Mode {
    let Some(index) = state.schedule.index_of(&block_id) else {
        return Mode::Navigating;
    };
    match key.code {
        KeyCode::Up if index > 0 => {
            state.schedule.swap(index, index - 1);
        }
        KeyCode::Down => {
            state.schedule.swap(index, index + 1);
        }
        KeyCode::Esc => {
            state.schedule.move_to(&block_id, original_index);
            return Mode::Navigating;
        }
        _ if is_release_key(key) => {
            if index == original_index {
                return Mode::Navigating;
            }
            let duration = state.schedule.get(&block_id).map(|b| b.duration).unwrap_or(0);
            let suggested =
                smart_time::for_moved_block(&state.schedule, index, duration, state.now);
            return Mode::ConfirmMove {
                block_id,
                old_index: original_index,
                new_index: index,
                original_time,
                time: TimeInput::new(suggested),
            };
        }
        _ => {}
    }
    Mode::GrabbedBlock {
        block_id,
        original_index,
        original_time,
    }
}

pub(super) fn handle_confirm_move_key(
    state: &mut AppState,
    mut pending: PendingMove,
    key: &KeyEvent,
) -> Mode {
    match key.code {
        KeyCode::Enter => {
            let Some(time) = pending.time.value() else {
                return confirm_mode(pending);
            };
            if let Some(block) = state.schedule.get_mut(&pending.block_id) {
                block.time = time;
            }
            tracing::info!(
                target: "planner.write",
                block = %pending.block_id,
                from = pending.old_index,
                to = pending.new_index,
                "block moved"
            );
            if time != pending.original_time {
                state.outbox.push(WriteAction::UpdateBlock {
                    id: pending.block_id.clone(),
                    patch: BlockPatch {
                        time: Some(time),
                        ..BlockPatch::default()
                    },
                });
            }
            state.outbox.push(WriteAction::ReorderBlockIndices {
                day_id: state.schedule.day_id.clone(),
                from_index: pending.old_index.min(pending.new_index),
            });
            Mode::Navigating
        }
        KeyCode::Esc => {
            state.schedule.move_to(&pending.block_id, pending.old_index);
            if let Some(block) = state.schedule.get_mut(&pending.block_id) {
                block.time = pending.original_time;
            }
            Mode::Navigating
        }
        _ => {
            pending.time.handle_key(key);
            confirm_mode(pending)
        }
    }
}

fn confirm_mode(pending: PendingMove) -> Mode {
    Mode::ConfirmMove {
        block_id: pending.block_id,
        old_index: pending.old_index,
        new_index: pending.new_index,
        original_time: pending.original_time,
        time: pending.time,
    }
}

// --- Single task ---

fn neighbour(schedule: &Schedule, block_index: usize, down: bool) -> Option<BlockId> {
    let index = if down {
        block_index + 1
    } else {
        block_index.checked_sub(1)?
    };
    schedule.id_at(index).map(str::to_string)
}

pub(super) fn start_task_grab(state: &AppState, task_id: &str) -> Mode {
    let Some((origin_block, origin_index)) = state.schedule.find_task(task_id) else {
        return Mode::Navigating;
    };
    tracing::debug!(target: "planner.grab", task = %task_id, "task grabbed");
    Mode::GrabbedTask {
        task_id: task_id.to_string(),
        origin_block,
        origin_index,
    }
}

/// One step up or down; past the first or last task the task crosses into the
/// neighbouring block.
fn step_task(schedule: &mut Schedule, task_id: &str, down: bool) -> Option<BlockId> {
    let (block_id, index) = schedule.find_task(task_id)?;
    let block_index = schedule.index_of(&block_id)?;
    let len = schedule.get(&block_id)?.tasks.len();

    if down && index + 1 < len {
        schedule.get_mut(&block_id)?.tasks.swap(index, index + 1);
        return Some(block_id);
    }
    if !down && index > 0 {
        schedule.get_mut(&block_id)?.tasks.swap(index, index - 1);
        return Some(block_id);
    }

    let target = neighbour(schedule, block_index, down)?;
    let (_, _, task) = schedule.take_task(task_id)?;
    let position = if down { 0 } else { usize::MAX };
    schedule.insert_task(&target, position, task)?;
    Some(target)
}

pub(super) fn handle_task_grab_key(
    state: &mut AppState,
    task_id: TaskId,
    origin_block: BlockId,
    origin_index: usize,
    key: &KeyEvent,
) -> Mode {
    let grabbed = |task_id, origin_block, origin_index| Mode::GrabbedTask {
        task_id,
        origin_block,
        origin_index,
    };
    if is_command_modifier(key.modifiers) {
        return grabbed(task_id, origin_block, origin_index);
    }

    match key.code {
        KeyCode::Up | KeyCode::Down => {
            if let Some(block_id) =
                step_task(&mut state.schedule, &task_id, key.code == KeyCode::Down)
            {
                focus_task(&mut state.cursor, &block_id, &task_id);
            }
        }
        KeyCode::Esc => {
            if let Some((_, _, task)) = state.schedule.take_task(&task_id) {
                state.schedule.insert_task(&origin_block, origin_index, task);
            }
            focus_task(&mut state.cursor, &origin_block, &task_id);
            return Mode::Navigating;
        }
        _ if is_release_key(key) => {
            release_task(state, &task_id, &origin_block, origin_index);
            return Mode::Navigating;
        }
        _ => {}
    }
    grabbed(task_id, origin_block, origin_index)
}

fn release_task(state: &mut AppState, task_id: &str, origin_block: &str, origin_index: usize) {
    let Some((block_id, position)) = state.schedule.find_task(task_id) else {
        return;
    };
    if block_id == origin_block && position == origin_index {
        return;
    }
    if block_id != origin_block {
        state.outbox.push(WriteAction::MoveTask {
            task_id: task_id.to_string(),
            from_block_id: origin_block.to_string(),
            to_block_id: block_id.clone(),
            position,
        });
    }
    push_reorder_tasks(state, &block_id);
}

fn push_reorder_tasks(state: &mut AppState, block_id: &str) {
    let Some(block) = state.schedule.get(block_id) else {
        return;
    };
    state.outbox.push(WriteAction::ReorderTasks {
        block_id: block_id.to_string(),
        task_ids: block.task_ids(),
    });
}

// --- Multi task ---

pub(super) fn start_multi_grab(state: &AppState) -> Mode {
    let Some(task_id) = state.selected_task_id() else {
        return Mode::Navigating;
    };
    let snapshot = state
        .schedule
        .iter()
        .map(|b| (b.id.clone(), b.task_ids()))
        .collect();
    tracing::debug!(target: "planner.grab", task = %task_id, "multi-task grab started");
    Mode::GrabbedTasks(MultiGrab {
        tasks: vec![task_id.to_string()],
        phase: GrabPhase::Collecting,
        snapshot,
    })
}

/// Pulls every grabbed task out and reinserts them, in grab order, at the first
/// task's slot shifted by the grabbed tasks that sat before it. Returns that block.
fn collapse(schedule: &mut Schedule, tasks: &[TaskId]) -> Option<BlockId> {
    let first = tasks.first()?;
    let (block_id, first_index) = schedule.find_task(first)?;
    let before = schedule
        .get(&block_id)?
        .tasks
        .iter()
        .take(first_index)
        .filter(|t| tasks.contains(&t.id))
        .count();

    let taken: Vec<_> = tasks
        .iter()
        .filter_map(|id| schedule.take_task(id).map(|(_, _, task)| task))
        .collect();
    let start = first_index - before;
    for (offset, task) in taken.into_iter().enumerate() {
        schedule.insert_task(&block_id, start + offset, task);
    }
    Some(block_id)
}

/// Grabbed tasks sit next to each other, in grab order, in one block.
fn is_contiguous(schedule: &Schedule, tasks: &[TaskId]) -> bool {
    let Some((block_id, start)) = tasks.first().and_then(|t| schedule.find_task(t)) else {
        return false;
    };
    tasks.iter().enumerate().all(|(offset, id)| {
        schedule
            .find_task(id)
            .is_some_and(|(b, i)| b == block_id && i == start + offset)
    })
}

/// Moves the grabbed run one slot, crossing into the neighbouring block at an edge.
fn move_group(schedule: &mut Schedule, tasks: &[TaskId], down: bool) -> Option<BlockId> {
    if !is_contiguous(schedule, tasks) {
        collapse(schedule, tasks)?;
    }
    let (block_id, start) = schedule.find_task(tasks.first()?)?;
    let block_index = schedule.index_of(&block_id)?;
    let count = tasks.len();
    let block = schedule.get_mut(&block_id)?;
    let len = block.tasks.len();

    if down && start + count < len {
        block.tasks[start..=start + count].rotate_right(1);
        return Some(block_id);
    }
    if !down && start > 0 {
        block.tasks[start - 1..start + count].rotate_left(1);
        return Some(block_id);
    }

    let target = neighbour(schedule, block_index, down)?;
    let taken: Vec<_> = tasks
        .iter()
        .filter_map(|id| schedule.take_task(id).map(|(_, _, task)| task))
        .collect();
    let base = if down {
        0
    } else {
        schedule.get(&target)?.tasks.len()
    };
    for (offset, task) in taken.into_iter().enumerate() {
        schedule.insert_task(&target, base + offset, task);
    }
    Some(target)
}

/// Modifier let go while collecting: collapse the set and wait for the drop.
pub(super) fn handle_modifier_release(
    schedule: &mut Schedule,
    cursor: &mut Cursor,
    grab: &mut MultiGrab,
    key: &KeyEvent,
) {
    let KeyCode::Modifier(modifier) = key.code else {
        return;
    };
    let command = matches!(
        modifier,
        ModifierKeyCode::LeftControl
            | ModifierKeyCode::RightControl
            | ModifierKeyCode::LeftSuper
            | ModifierKeyCode::RightSuper
            | ModifierKeyCode::LeftMeta
            | ModifierKeyCode::RightMeta
    );
    if !command || grab.phase != GrabPhase::Collecting {
        return;
    }
    if let Some(block_id) = collapse(schedule, &grab.tasks) {
        focus_task(cursor, &block_id, &grab.tasks[0]);
    }
    grab.phase = GrabPhase::Committing;
    tracing::debug!(target: "planner.grab", tasks = grab.tasks.len(), "grab set collapsed");
}

pub(super) fn handle_multi_grab_key(
    state: &mut AppState,
    mut grab: MultiGrab,
    key: &KeyEvent,
) -> Mode {
    if is_command_modifier(key.modifiers) {
        match key.code {
            KeyCode::Char('g') | KeyCode::Char('G') => {
                if let Some(task_id) = state.selected_task_id() {
                    if !grab.tasks.iter().any(|t| t == task_id) {
                        grab.tasks.push(task_id.to_string());
                    }
                }
                grab.phase = GrabPhase::Collecting;
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
                if let Some(block_id) = move_group(&mut state.schedule, &grab.tasks, false) {
                    focus_task(&mut state.cursor, &block_id, &grab.tasks[0]);
                }
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
                if let Some(block_id) = move_group(&mut state.schedule, &grab.tasks, true) {
                    focus_task(&mut state.cursor, &block_id, &grab.tasks[0]);
                }
            }
            _ => {}
        }
        return Mode::GrabbedTasks(grab);
    }

    match key.code {
        KeyCode::Up => cursor::step(state, false),
        KeyCode::Down => cursor::step(state, true),
        KeyCode::Enter => {
            if grab.phase == GrabPhase::Collecting {
                collapse(&mut state.schedule, &grab.tasks);
            }
            if drop_tasks(state, &grab) {
                return Mode::Navigating;
            }
            grab.phase = GrabPhase::Committing;
        }
        KeyCode::Esc => {
            restore(&mut state.schedule, &grab);
            if let Some(origin) = grab.origin_of(&grab.tasks[0]) {
                focus_task(&mut state.cursor, origin, &grab.tasks[0]);
            }
            return Mode::Navigating;
        }
        _ => {}
    }
    Mode::GrabbedTasks(grab)
}

/// Drop target under the cursor: block and raw insertion index.
fn drop_target(state: &AppState) -> Option<(BlockId, usize)> {
    let Cursor::Block { id, focus } = &state.cursor else {
        return None;
    };
    let index = match focus {
        Focus::Header => 0,
        Focus::Input { after } => after.map(|n| n + 1).unwrap_or(0),
        Focus::Task(task_id) => state.schedule.get(id)?.task_index(task_id)?,
    };
    Some((id.clone(), index))
}

/// Places the run before the first non-grabbed task at or after the target, and
/// persists every relocation. Returns false when the cursor is not inside a block.
fn drop_tasks(state: &mut AppState, grab: &MultiGrab) -> bool {
    let Some((block_id, raw)) = drop_target(state) else {
        return false;
    };
    let anchor = state.schedule.get(&block_id).and_then(|b| {
        b.tasks
            .iter()
            .skip(raw)
            .find(|t| !grab.tasks.contains(&t.id))
            .map(|t| t.id.clone())
    });

    let taken: Vec<_> = grab
        .tasks
        .iter()
        .filter_map(|id| state.schedule.take_task(id).map(|(_, _, task)| task))
        .collect();
    let start = anchor
        .and_then(|a| state.schedule.find_task(&a))
        .map(|(_, i)| i)
        .unwrap_or_else(|| {
            state
                .schedule
                .get(&block_id)
                .map(|b| b.tasks.len())
                .unwrap_or(0)
        });
    for (offset, task) in taken.into_iter().enumerate() {
        state.schedule.insert_task(&block_id, start + offset, task);
    }

    for (offset, task_id) in grab.tasks.iter().enumerate() {
        let Some(origin) = grab.origin_of(task_id) else {
            continue;
        };
        if origin != block_id {
            state.outbox.push(WriteAction::MoveTask {
                task_id: task_id.clone(),
                from_block_id: origin.to_string(),
                to_block_id: block_id.clone(),
                position: start + offset,
            });
        }
    }
    push_reorder_tasks(state, &block_id);
    tracing::info!(
        target: "planner.write",
        block = %block_id,
        tasks = grab.tasks.len(),
        "grabbed tasks dropped"
    );
    focus_task(&mut state.cursor, &block_id, &grab.tasks[0]);
    true
}

/// Non-grabbed tasks never change relative order, so reinserting the grabbed ones
/// at their snapshot indices, lowest first, rebuilds every block exactly.
fn restore(schedule: &mut Schedule, grab: &MultiGrab) {
    let mut taken: Vec<_> = grab
        .tasks
        .iter()
        .filter_map(|id| {
            let origin = grab.origin_of(id)?;
            let index = grab.snapshot.get(origin)?.iter().position(|t| t == id)?;
            let (_, _, task) = schedule.take_task(id)?;
            Some((origin.to_string(), index, task))
        })
        .collect();
    taken.sort_by_key(|(_, index, _)| *index);
    for (block_id, index, task) in taken {
        schedule.insert_task(&block_id, index, task);
    }
}
