use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::api::types::{BlockPatch, TaskPatch, WriteAction};
use crate::keys::is_command_modifier;

use super::state::{AppState, CommandInput, Cursor, Focus, Mode, TaskInput};
use super::{cursor, delete, editing, grab, ordering, typing};

/// Printable character typed without Ctrl, Alt or Super.
pub(crate) fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}

/// Single entry point for keys reaching the schedule.
pub fn handle_key(state: &mut AppState, key: &KeyEvent) {
    if key.kind == KeyEventKind::Release {
        if let Mode::GrabbedTasks(multi) = &mut state.mode {
            grab::handle_modifier_release(&mut state.schedule, &mut state.cursor, multi, key);
        }
        return;
    }

    let mode = std::mem::take(&mut state.mode);
    state.mode = match mode {
        Mode::Navigating => handle_navigating_key(state, key),
        Mode::TypingCommand(input) => typing::handle_command_key(state, input, key),
        Mode::TypingTask(input) => typing::handle_task_key(state, input, key),
        Mode::EditingBlock(editor) => editing::handle_block_editor_key(state, editor, key),
        Mode::EditingTask(editor) => editing::handle_task_editor_key(state, editor, key),
        Mode::EditingNote(editor) => editing::handle_note_editor_key(state, editor, key),
        Mode::GrabbedBlock {
            block_id,
            original_index,
            original_time,
        } => grab::handle_block_grab_key(state, block_id, original_index, original_time, key),
        Mode::GrabbedTask {
            task_id,
            origin_block,
            origin_index,
        } => grab::handle_task_grab_key(state, task_id, origin_block, origin_index, key),
        Mode::GrabbedTasks(multi) => grab::handle_multi_grab_key(state, multi, key),
        Mode::ConfirmMove {
            block_id,
            old_index,
            new_index,
            original_time,
            time,
        } => grab::handle_confirm_move_key(
            state,
            grab::PendingMove {
                block_id,
                old_index,
                new_index,
                original_time,
                time,
            },
            key,
        ),
        Mode::ConfirmDelete { block_id } => delete::handle_confirm_delete_key(state, block_id, key),
    };

    ordering::apply(state);
}

fn handle_navigating_key(state: &mut AppState, key: &KeyEvent) -> Mode {
    if is_command_modifier(key.modifiers) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
                cursor::jump_header(state, false)
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
                cursor::jump_header(state, true)
            }
            KeyCode::Left => cursor::leave_block(state, false),
            KeyCode::Right => cursor::leave_block(state, true),
            KeyCode::Backspace => return delete::delete_selected(state),
            KeyCode::Char('g') | KeyCode::Char('G') => return grab::start_multi_grab(state),
            _ => {}
        }
        return Mode::Navigating;
    }

    match key.code {
        KeyCode::Up => cursor::step(state, false),
        KeyCode::Down => cursor::step(state, true),
        KeyCode::Tab => cursor::enter_block(state),
        KeyCode::BackTab => cursor::to_header(state),
        KeyCode::Esc => cursor::escape_outward(state),
        KeyCode::Enter => match &state.cursor {
            Cursor::Between { .. } => cursor::next_block(state),
            _ => cursor::enter_block(state),
        },
        _ => {
            if let Some(c) = typed_char(key) {
                return handle_char(state, c);
            }
        }
    }
    Mode::Navigating
}

fn handle_char(state: &mut AppState, c: char) -> Mode {
    let current = state.cursor.clone();
    match current {
        Cursor::None => Mode::Navigating,
        Cursor::Between { .. } => {
            if c.is_whitespace() {
                return Mode::Navigating;
            }
            let mut input = CommandInput::default();
            input.buffer.insert_char(c);
            typing::refresh_command(state, &mut input);
            Mode::TypingCommand(input)
        }
        Cursor::Block {
            id,
            focus: Focus::Header,
        } => match c {
            'e' => editing::open_block_editor(state, &id),
            'n' => editing::open_note_editor(state, &id),
            'g' => grab::start_block_grab(state, &id),
            ' ' => {
                toggle_block(state, &id);
                Mode::Navigating
            }
            _ => Mode::Navigating,
        },
        Cursor::Block {
            focus: Focus::Task(task_id),
            ..
        } => match c {
            'e' => editing::open_task_editor(state, &task_id),
            'g' => grab::start_task_grab(state, &task_id),
            ' ' => {
                toggle_task(state, &task_id);
                Mode::Navigating
            }
            _ => Mode::Navigating,
        },
        Cursor::Block {
            focus: Focus::Input { .. },
            ..
        } => {
            if c.is_whitespace() {
                return Mode::Navigating;
            }
            let mut input = TaskInput {
                buffer: Default::default(),
                suggestions: Vec::new(),
                selected: 0,
            };
            input.buffer.insert_char(c);
            typing::refresh_task(state, &mut input);
            Mode::TypingTask(input)
        }
    }
}

fn toggle_block(state: &mut AppState, block_id: &str) {
    let Some(block) = state.schedule.get_mut(block_id) else {
        return;
    };
    block.completed = !block.completed;
    let completed = block.completed;
    state.outbox.push(WriteAction::UpdateBlock {
        id: block_id.to_string(),
        patch: BlockPatch {
            completed: Some(completed),
            ..BlockPatch::default()
        },
    });
}

fn toggle_task(state: &mut AppState, task_id: &str) {
    let Some(task) = state.schedule.task_mut(task_id) else {
        return;
    };
    task.completed = !task.completed;
    let completed = task.completed;
    state.outbox.push(WriteAction::UpdateTask {
        id: task_id.to_string(),
        patch: TaskPatch {
            completed: Some(completed),
            ..TaskPatch::default()
        },
    });
}
