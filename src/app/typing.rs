use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::types::{Block, BlockMetadata, BlockType, Task, WriteAction};
use crate::command::{self, BlockIntent};
use crate::edit_buffer::EditBuffer;

use super::input::typed_char;
use super::predict::{self, Candidate, MatchKind, MIN_QUERY_CHARS, TASK_SUGGESTION_LIMIT};
use super::schedule::generate_id;
use super::slash::{self, PickerState, SlashAction};
use super::smart_time;
use super::state::{AppState, CommandInput, CommandMenu, Cursor, Focus, Mode, TaskInput};

const COMMAND_MATCH_KINDS: [MatchKind; 2] = [MatchKind::Routine, MatchKind::Event];

// --- Command line (between blocks) ---

/// Re-evaluates the buffer after an edit: slash menu, command preview, and
/// scheduling a predictive search when no grammar matches.
pub(super) fn refresh_command(state: &mut AppState, input: &mut CommandInput) {
    let text = input.buffer.to_string();
    if text == "/" {
        input.menu = Some(CommandMenu::Slash { selected: 0 });
    }
    input.preview = command::parse(&text).map(|c| c.intent());
    if input.preview.is_none() && text.trim().chars().count() >= MIN_QUERY_CHARS {
        state.search_scheduled = true;
    } else {
        input.suggestion = None;
    }
}

pub(super) fn handle_command_key(
    state: &mut AppState,
    mut input: CommandInput,
    key: &KeyEvent,
) -> Mode {
    let Some(slot) = state.between_index() else {
        return Mode::Navigating;
    };

    match input.menu.take() {
        Some(CommandMenu::Slash { selected }) => {
            return handle_slash_key(state, input, selected, slot, key)
        }
        Some(CommandMenu::Picker(picker)) => {
            return handle_picker_key(state, input, picker, slot, key)
        }
        None => {}
    }

    if let Some(c) = typed_char(key) {
        input.buffer.insert_char(c);
        refresh_command(state, &mut input);
        return Mode::TypingCommand(input);
    }

    match key.code {
        KeyCode::Esc => return Mode::Navigating,
        KeyCode::Enter => return commit_command(state, input, slot),
        KeyCode::Backspace => {
            if key.modifiers.contains(KeyModifiers::ALT) {
                input.buffer.delete_word_back();
            } else {
                input.buffer.delete_back();
            }
            if input.buffer.is_empty() {
                return Mode::Navigating;
            }
            refresh_command(state, &mut input);
        }
        KeyCode::Tab => {
            if let Some(m) = input.suggestion.take() {
                input.buffer = EditBuffer::new(m.item.name());
                refresh_command(state, &mut input);
            }
        }
        KeyCode::Left => input.buffer.move_left(),
        KeyCode::Right => input.buffer.move_right(),
        KeyCode::Home => input.buffer.move_home(),
        KeyCode::End => input.buffer.move_end(),
        _ => {}
    }
    Mode::TypingCommand(input)
}

fn handle_slash_key(
    state: &mut AppState,
    mut input: CommandInput,
    selected: usize,
    slot: Option<usize>,
    key: &KeyEvent,
) -> Mode {
    let count = slash::all_items().len();
    match key.code {
        KeyCode::Up => {
            input.menu = Some(CommandMenu::Slash {
                selected: selected.saturating_sub(1),
            });
        }
        KeyCode::Down => {
            input.menu = Some(CommandMenu::Slash {
                selected: (selected + 1).min(count.saturating_sub(1)),
            });
        }
        KeyCode::Enter => match slash::item_at(selected).map(|i| i.action) {
            Some(SlashAction::Block(block_type)) => {
                let intent = BlockIntent {
                    block_type,
                    title: block_type.label().to_string(),
                    time: None,
                    duration: block_type.default_duration(),
                };
                create_from_intent(state, slot, intent);
                return Mode::Navigating;
            }
            Some(SlashAction::Pick(kind)) => {
                input.menu = Some(CommandMenu::Picker(PickerState::open(&state.corpus, kind)));
            }
            None => input.menu = Some(CommandMenu::Slash { selected }),
        },
        KeyCode::Esc | KeyCode::Backspace => return Mode::Navigating,
        _ => {
            // Any other typing closes the menu and edits the command line.
            if let Some(c) = typed_char(key) {
                input.buffer.insert_char(c);
                refresh_command(state, &mut input);
            } else {
                input.menu = Some(CommandMenu::Slash { selected });
            }
        }
    }
    Mode::TypingCommand(input)
}

fn handle_picker_key(
    state: &mut AppState,
    mut input: CommandInput,
    mut picker: PickerState,
    slot: Option<usize>,
    key: &KeyEvent,
) -> Mode {
    if let Some(c) = typed_char(key) {
        picker.push(&state.corpus, c);
        input.menu = Some(CommandMenu::Picker(picker));
        return Mode::TypingCommand(input);
    }
    match key.code {
        KeyCode::Up => picker.move_up(),
        KeyCode::Down => picker.move_down(),
        KeyCode::Enter => {
            if let Some(m) = picker.items.get(picker.selected) {
                create_from_candidate(state, slot, &m.item);
                return Mode::Navigating;
            }
        }
        KeyCode::Esc => {
            input.menu = Some(CommandMenu::Slash { selected: 0 });
            return Mode::TypingCommand(input);
        }
        KeyCode::Backspace => {
            if !picker.pop(&state.corpus) {
                input.menu = Some(CommandMenu::Slash { selected: 0 });
                return Mode::TypingCommand(input);
            }
        }
        _ => {}
    }
    input.menu = Some(CommandMenu::Picker(picker));
    Mode::TypingCommand(input)
}

/// Quick or enhanced command, then predictive match, then a literal block.
fn commit_command(state: &mut AppState, mut input: CommandInput, slot: Option<usize>) -> Mode {
    let text = input.buffer.to_string();
    if let Some(cmd) = command::parse(&text) {
        create_from_intent(state, slot, cmd.intent());
        return Mode::Navigating;
    }

    if std::mem::take(&mut state.search_scheduled) {
        input.suggestion = predict::best(&state.corpus, &COMMAND_MATCH_KINDS, &text);
    }
    if let Some(m) = input.suggestion {
        create_from_candidate(state, slot, &m.item);
        return Mode::Navigating;
    }

    let title = text.trim();
    if title.is_empty() {
        return Mode::Navigating;
    }
    let block_type = state.catch_all_type;
    let intent = BlockIntent {
        block_type,
        title: title.to_string(),
        time: None,
        duration: block_type.default_duration(),
    };
    create_from_intent(state, slot, intent);
    Mode::Navigating
}

pub(super) fn create_from_intent(state: &mut AppState, slot: Option<usize>, intent: BlockIntent) {
    let time = intent.time.unwrap_or_else(|| {
        smart_time::for_slot(&state.schedule, slot, intent.duration, state.now)
    });
    let block = Block::new(
        generate_id("block"),
        intent.block_type,
        &intent.title,
        time,
        intent.duration,
    );
    insert_new_block(state, slot, block);
}

/// Routine or event from the corpus; other kinds never become blocks.
fn create_from_candidate(state: &mut AppState, slot: Option<usize>, item: &Candidate) {
    let (block_type, title, duration, fixed_time, metadata) = match item {
        Candidate::Routine(r) => (
            BlockType::Routine,
            r.name.clone(),
            r.duration,
            None,
            BlockMetadata {
                routine_id: Some(r.id.clone()),
                ..BlockMetadata::default()
            },
        ),
        Candidate::Event(e) => (
            BlockType::Event,
            e.name.clone(),
            e.duration,
            e.time,
            BlockMetadata {
                event_id: Some(e.id.clone()),
                zoom_link: e.zoom_link.clone(),
                ..BlockMetadata::default()
            },
        ),
        Candidate::Task(_) | Candidate::Project(_) => return,
    };
    let time = fixed_time
        .unwrap_or_else(|| smart_time::for_slot(&state.schedule, slot, duration, state.now));
    let mut block = Block::new(generate_id("block"), block_type, &title, time, duration);
    block.metadata = metadata;
    insert_new_block(state, slot, block);
}

/// Inserts into the between-slot and leaves the cursor just after the new block.
fn insert_new_block(state: &mut AppState, slot: Option<usize>, block: Block) {
    let day_id = state.schedule.day_id.clone();
    let id = block.id.clone();
    let index = state
        .schedule
        .insert(slot.map(|i| i + 1).unwrap_or(0), block.clone());
    tracing::info!(target: "planner.write", id = %id, index, "block created");
    state.outbox.push(WriteAction::CreateBlock { day_id: day_id.clone(), block });
    if index + 1 < state.schedule.len() {
        state.outbox.push(WriteAction::ReorderBlockIndices {
            day_id,
            from_index: index,
        });
    }
    state.cursor = Cursor::Between { after: Some(id) };
}

// --- Task line (inside a block) ---

pub(super) fn refresh_task(state: &mut AppState, input: &mut TaskInput) {
    let text = input.buffer.to_string();
    if input.buffer.trailing_tag('@').is_some()
        || text.trim().chars().count() >= MIN_QUERY_CHARS
    {
        state.search_scheduled = true;
    } else {
        input.suggestions.clear();
        input.selected = 0;
    }
}

fn run_task_search(state: &AppState, input: &mut TaskInput) {
    input.suggestions = match input.buffer.trailing_tag('@') {
        Some((_, tag)) => predict::search(&state.corpus, MatchKind::Project, &tag),
        None => {
            let text = input.buffer.to_string();
            let query = text.trim();
            if query.chars().count() >= MIN_QUERY_CHARS {
                predict::search(&state.corpus, MatchKind::Task, query)
            } else {
                Vec::new()
            }
        }
    };
    input.suggestions.truncate(TASK_SUGGESTION_LIMIT);
    input.selected = 0;
}

/// Runs the search scheduled by the last keystroke against the current buffer.
pub(super) fn run_deferred_search(state: &mut AppState) {
    if !std::mem::take(&mut state.search_scheduled) {
        return;
    }
    let mut mode = std::mem::take(&mut state.mode);
    match &mut mode {
        Mode::TypingCommand(input) => {
            let text = input.buffer.to_string();
            input.suggestion = if command::parse(&text).is_some() {
                None
            } else {
                predict::best(&state.corpus, &COMMAND_MATCH_KINDS, &text)
            };
        }
        Mode::TypingTask(input) => run_task_search(state, input),
        _ => {}
    }
    state.mode = mode;
}

fn task_slot(state: &AppState) -> Option<(String, Option<usize>)> {
    match &state.cursor {
        Cursor::Block {
            id,
            focus: Focus::Input { after },
        } => Some((id.clone(), *after)),
        _ => None,
    }
}

pub(super) fn handle_task_key(state: &mut AppState, mut input: TaskInput, key: &KeyEvent) -> Mode {
    let Some((block_id, after)) = task_slot(state) else {
        return Mode::Navigating;
    };

    if let Some(c) = typed_char(key) {
        input.buffer.insert_char(c);
        refresh_task(state, &mut input);
        return Mode::TypingTask(input);
    }

    match key.code {
        KeyCode::Esc => {
            if input.suggestions.is_empty() {
                return Mode::Navigating;
            }
            input.suggestions.clear();
            input.selected = 0;
        }
        KeyCode::Enter => return commit_task(state, input, &block_id, after),
        KeyCode::Backspace => {
            if key.modifiers.contains(KeyModifiers::ALT) {
                input.buffer.delete_word_back();
            } else {
                input.buffer.delete_back();
            }
            if input.buffer.is_empty() {
                return Mode::Navigating;
            }
            refresh_task(state, &mut input);
        }
        KeyCode::Up => input.selected = input.selected.saturating_sub(1),
        KeyCode::Down => {
            if input.selected + 1 < input.suggestions.len() {
                input.selected += 1;
            }
        }
        KeyCode::Left => input.buffer.move_left(),
        KeyCode::Right => input.buffer.move_right(),
        KeyCode::Home => input.buffer.move_home(),
        KeyCode::End => input.buffer.move_end(),
        _ => {}
    }
    Mode::TypingTask(input)
}

/// Selected completion (inventory task or project tag) or the literal text.
fn commit_task(
    state: &mut AppState,
    mut input: TaskInput,
    block_id: &str,
    after: Option<usize>,
) -> Mode {
    if std::mem::take(&mut state.search_scheduled) {
        run_task_search(state, &mut input);
    }

    let id = generate_id("task");
    let task = match input.suggestions.get(input.selected).map(|m| &m.item) {
        Some(Candidate::Task(inv)) => Task {
            id,
            title: inv.title.clone(),
            duration: inv.duration,
            completed: false,
            project_id: inv.project_id.clone(),
            source_task_id: Some(inv.id.clone()),
        },
        Some(Candidate::Project(project)) => {
            let project_id = project.id.clone();
            let title = input.buffer.text_without_tag('@');
            if title.is_empty() {
                return Mode::TypingTask(input);
            }
            let mut task = Task::new(id, &title, state.default_task_minutes);
            task.project_id = Some(project_id);
            task
        }
        _ => {
            let text = input.buffer.to_string();
            let title = text.trim();
            if title.is_empty() {
                return Mode::Navigating;
            }
            Task::new(id, title, state.default_task_minutes)
        }
    };

    let position = after.map(|n| n + 1).unwrap_or(0);
    let Some(position) = state.schedule.insert_task(block_id, position, task.clone()) else {
        return Mode::Navigating;
    };
    tracing::info!(target: "planner.write", block = %block_id, position, "task created");
    state.outbox.push(WriteAction::CreateTask {
        block_id: block_id.to_string(),
        task,
        position,
    });
    state.cursor = Cursor::Block {
        id: block_id.to_string(),
        focus: Focus::Input {
            after: Some(position),
        },
    };
    Mode::Navigating
}
