use std::collections::{HashMap, VecDeque};

use chrono::{Local, NaiveTime, Timelike};

use crate::api::types::{BlockType, Corpus, DayPlan, WriteAction};
use crate::command::BlockIntent;
use crate::edit_buffer::EditBuffer;
use crate::error::{ErrorInfo, ErrorPopup};

use super::editing::{DurationInput, TimeInput};
use super::predict::Match;
use super::schedule::{BlockId, Schedule, TaskId};
use super::slash::PickerState;

#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    Key(crossterm::event::KeyEvent),
    DayLoaded(DayPlan),
    CorpusLoaded(Corpus),
    ApiError(ErrorInfo),
    /// Predictive search queued behind the key that scheduled it.
    RunSearch,
    Tick,
}

/// Where the keyboard acts. Stores ids; indices are derived on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cursor {
    #[default]
    None,
    /// Gap after the given block; `None` is before the first block.
    Between { after: Option<BlockId> },
    Block { id: BlockId, focus: Focus },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Header,
    /// Task-input slot; `after: None` is before the first task.
    Input { after: Option<usize> },
    Task(TaskId),
}

/// Index-based view of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition {
    Block(usize),
    /// `-1` is before the first block.
    Between(i32),
    None,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandInput {
    pub buffer: EditBuffer,
    pub preview: Option<BlockIntent>,
    pub suggestion: Option<Match>,
    pub menu: Option<CommandMenu>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandMenu {
    Slash { selected: usize },
    Picker(PickerState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub buffer: EditBuffer,
    pub suggestions: Vec<Match>,
    pub selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField {
    Title,
    Time,
    Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockEditor {
    pub block_id: BlockId,
    pub field: BlockField,
    pub title: EditBuffer,
    pub time: TimeInput,
    pub duration: DurationInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskEditor {
    pub task_id: TaskId,
    pub field: TaskField,
    pub title: EditBuffer,
    pub duration: DurationInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteEditor {
    pub block_id: BlockId,
    pub buffer: EditBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabPhase {
    /// Modifier held, tasks being added.
    Collecting,
    /// Set collapsed into one run, waiting for the drop.
    Committing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiGrab {
    /// Grab order.
    pub tasks: Vec<TaskId>,
    pub phase: GrabPhase,
    /// Task order of every block before the first grab.
    pub snapshot: HashMap<BlockId, Vec<TaskId>>,
}

impl MultiGrab {
    pub fn origin_of(&self, task_id: &str) -> Option<&str> {
        self.snapshot
            .iter()
            .find(|(_, ids)| ids.iter().any(|t| t == task_id))
            .map(|(b, _)| b.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    #[default]
    Navigating,
    TypingCommand(CommandInput),
    TypingTask(TaskInput),
    EditingBlock(BlockEditor),
    EditingTask(TaskEditor),
    EditingNote(NoteEditor),
    GrabbedBlock {
        block_id: BlockId,
        original_index: usize,
        original_time: NaiveTime,
    },
    GrabbedTask {
        task_id: TaskId,
        origin_block: BlockId,
        origin_index: usize,
    },
    GrabbedTasks(MultiGrab),
    ConfirmMove {
        block_id: BlockId,
        old_index: usize,
        new_index: usize,
        original_time: NaiveTime,
        time: TimeInput,
    },
    ConfirmDelete {
        block_id: BlockId,
    },
}

impl Mode {
    /// Grabs and the move confirmation keep blocks where the user put them.
    pub fn suspends_auto_sort(&self) -> bool {
        matches!(
            self,
            Mode::GrabbedBlock { .. }
                | Mode::GrabbedTask { .. }
                | Mode::GrabbedTasks(_)
                | Mode::ConfirmMove { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Navigating => "NAV",
            Mode::TypingCommand(_) => "COMMAND",
            Mode::TypingTask(_) => "TASK",
            Mode::EditingBlock(_) => "EDIT BLOCK",
            Mode::EditingTask(_) => "EDIT TASK",
            Mode::EditingNote(_) => "NOTE",
            Mode::GrabbedBlock { .. } => "GRAB",
            Mode::GrabbedTask { .. } => "GRAB",
            Mode::GrabbedTasks(m) if m.phase == GrabPhase::Collecting => "COLLECT",
            Mode::GrabbedTasks(_) => "DROP",
            Mode::ConfirmMove { .. } => "MOVE",
            Mode::ConfirmDelete { .. } => "DELETE",
        }
    }
}

/// Writes waiting to be handed to the backend, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outbox {
    queue: VecDeque<WriteAction>,
}

impl Outbox {
    pub fn push(&mut self, action: WriteAction) {
        tracing::debug!(target: "planner.write", action = action.name(), "queued");
        self.queue.push_back(action);
    }

    pub fn drain(&mut self) -> Vec<WriteAction> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &WriteAction> {
        self.queue.iter()
    }
}

pub struct AppState {
    pub date_display: String,
    pub schedule: Schedule,
    pub corpus: Corpus,
    pub cursor: Cursor,
    pub mode: Mode,
    pub outbox: Outbox,
    pub now: NaiveTime,
    pub loading: bool,
    pub status_message: Option<String>,
    pub hints: Vec<(String, &'static str)>,
    pub should_quit: bool,
    pub show_help: bool,
    pub error_popup: Option<ErrorPopup>,
    pub search_scheduled: bool,
    pub catch_all_type: BlockType,
    pub default_task_minutes: u32,
}

impl AppState {
    pub fn new(day_id: &str, hints: Vec<(String, &'static str)>) -> Self {
        let now = Local::now();
        Self {
            date_display: now.format("%a %b %d, %Y").to_string(),
            schedule: Schedule::new(day_id),
            corpus: Corpus::default(),
            cursor: Cursor::None,
            mode: Mode::Navigating,
            outbox: Outbox::default(),
            now: truncate_seconds(now.time()),
            loading: true,
            status_message: Some("Loading today's plan...".into()),
            hints,
            should_quit: false,
            show_help: false,
            error_popup: None,
            search_scheduled: false,
            catch_all_type: BlockType::Personal,
            default_task_minutes: 15,
        }
    }

    pub fn refresh_clock(&mut self) {
        self.now = truncate_seconds(Local::now().time());
    }

    pub fn cursor_position(&self) -> CursorPosition {
        match &self.cursor {
            Cursor::None => CursorPosition::None,
            Cursor::Between { after: None } => CursorPosition::Between(-1),
            Cursor::Between { after: Some(id) } => match self.schedule.index_of(id) {
                Some(i) => CursorPosition::Between(i as i32),
                None => CursorPosition::None,
            },
            Cursor::Block { id, .. } => match self.schedule.index_of(id) {
                Some(i) => CursorPosition::Block(i),
                None => CursorPosition::None,
            },
        }
    }

    /// `-2` outside an input slot, `-1` before the first task, `n` after task `n`.
    pub fn task_input_position(&self) -> i32 {
        match &self.cursor {
            Cursor::Block {
                focus: Focus::Input { after },
                ..
            } => after.map(|n| n as i32).unwrap_or(-1),
            _ => -2,
        }
    }

    pub fn selected_task_index(&self) -> Option<usize> {
        match &self.cursor {
            Cursor::Block {
                id,
                focus: Focus::Task(task_id),
            } => self.schedule.get(id)?.task_index(task_id),
            _ => None,
        }
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        match &self.cursor {
            Cursor::Block {
                focus: Focus::Task(task_id),
                ..
            } => Some(task_id),
            _ => None,
        }
    }

    /// Index of the block before the between-slot (`None` before the first block).
    pub fn between_index(&self) -> Option<Option<usize>> {
        match &self.cursor {
            Cursor::Between { after: None } => Some(None),
            Cursor::Between { after: Some(id) } => self.schedule.index_of(id).map(Some),
            _ => None,
        }
    }
}

fn truncate_seconds(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}
