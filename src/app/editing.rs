use chrono::NaiveTime;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::types::{
    minutes_of, time_from_minutes, BlockPatch, TaskPatch, WriteAction, MINUTES_PER_DAY,
};
use crate::edit_buffer::EditBuffer;

use super::input::typed_char;
use super::state::{
    AppState, BlockEditor, BlockField, Mode, NoteEditor, TaskEditor, TaskField,
};

pub const TIME_NUDGE_MINUTES: i32 = 15;
pub const DURATION_NUDGE_MINUTES: i32 = 5;

/// `HH:MM` edited digit by digit; the cursor indexes the four digits and skips the colon.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeInput {
    digits: [u8; 4],
    pub cursor: usize,
}

impl TimeInput {
    pub fn new(time: NaiveTime) -> Self {
        let m = minutes_of(time);
        let (h, m) = (m / 60, m % 60);
        Self {
            digits: [(h / 10) as u8, (h % 10) as u8, (m / 10) as u8, (m % 10) as u8],
            cursor: 0,
        }
    }

    pub fn type_digit(&mut self, digit: u8) {
        self.digits[self.cursor] = digit.min(9);
        self.move_right();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(3);
    }

    /// Shifts the time by `delta` minutes, clamped to the day. Keeps the cursor.
    pub fn nudge(&mut self, delta: i32) {
        let base = self.value().map(minutes_of).unwrap_or(0) as i32;
        let m = (base + delta).clamp(0, MINUTES_PER_DAY as i32 - 1) as u32;
        let cursor = self.cursor;
        *self = Self::new(time_from_minutes(m));
        self.cursor = cursor;
    }

    pub fn value(&self) -> Option<NaiveTime> {
        let [h1, h2, m1, m2] = self.digits.map(u32::from);
        NaiveTime::from_hms_opt(h1 * 10 + h2, m1 * 10 + m2, 0)
    }

    pub fn display(&self) -> String {
        let d = self.digits;
        format!("{}{}:{}{}", d[0], d[1], d[2], d[3])
    }

    /// Column of the cursor inside `display()`.
    pub fn display_cursor(&self) -> usize {
        if self.cursor >= 2 {
            self.cursor + 1
        } else {
            self.cursor
        }
    }

    pub(super) fn handle_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => self.type_digit(c as u8 - b'0'),
            KeyCode::Left | KeyCode::Backspace => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => self.nudge(TIME_NUDGE_MINUTES),
            KeyCode::Down => self.nudge(-TIME_NUDGE_MINUTES),
            _ => {}
        }
    }
}

/// Minutes field. The first digit typed replaces the current value.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationInput {
    pub value: u32,
    fresh: bool,
}

impl DurationInput {
    pub fn new(value: u32) -> Self {
        Self { value, fresh: true }
    }

    pub fn type_digit(&mut self, digit: u32) {
        if self.fresh {
            self.value = digit;
            self.fresh = false;
            return;
        }
        let next = self.value * 10 + digit;
        if next <= MINUTES_PER_DAY {
            self.value = next;
        }
    }

    pub fn delete_back(&mut self) {
        self.fresh = false;
        self.value /= 10;
    }

    pub fn nudge(&mut self, delta: i32) {
        self.fresh = false;
        self.value = (self.value as i32 + delta).clamp(DURATION_NUDGE_MINUTES, MINUTES_PER_DAY as i32)
            as u32;
    }

    pub fn value(&self) -> Option<u32> {
        (self.value > 0).then_some(self.value)
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => self.type_digit(u32::from(c as u8 - b'0')),
            KeyCode::Backspace => self.delete_back(),
            KeyCode::Up => self.nudge(DURATION_NUDGE_MINUTES),
            KeyCode::Down => self.nudge(-DURATION_NUDGE_MINUTES),
            _ => {}
        }
    }
}

fn edit_text(buffer: &mut EditBuffer, key: &KeyEvent) {
    if let Some(c) = typed_char(key) {
        buffer.insert_char(c);
        return;
    }
    match (key.modifiers, key.code) {
        (KeyModifiers::ALT, KeyCode::Backspace) => buffer.delete_word_back(),
        (_, KeyCode::Backspace) => buffer.delete_back(),
        (_, KeyCode::Delete) => buffer.delete_forward(),
        (KeyModifiers::ALT, KeyCode::Left) => buffer.move_word_left(),
        (KeyModifiers::ALT, KeyCode::Right) => buffer.move_word_right(),
        (_, KeyCode::Left) => buffer.move_left(),
        (_, KeyCode::Right) => buffer.move_right(),
        (_, KeyCode::Home) => buffer.move_home(),
        (_, KeyCode::End) => buffer.move_end(),
        _ => {}
    }
}

// --- Opening editors ---

pub(super) fn open_block_editor(state: &AppState, block_id: &str) -> Mode {
    match state.schedule.get(block_id) {
        Some(block) => Mode::EditingBlock(BlockEditor {
            block_id: block.id.clone(),
            field: BlockField::Title,
            title: EditBuffer::new(&block.title),
            time: TimeInput::new(block.time),
            duration: DurationInput::new(block.duration),
        }),
        None => Mode::Navigating,
    }
}

pub(super) fn open_task_editor(state: &AppState, task_id: &str) -> Mode {
    match state.schedule.task(task_id) {
        Some(task) => Mode::EditingTask(TaskEditor {
            task_id: task.id.clone(),
            field: TaskField::Title,
            title: EditBuffer::new(&task.title),
            duration: DurationInput::new(task.duration),
        }),
        None => Mode::Navigating,
    }
}

pub(super) fn open_note_editor(state: &AppState, block_id: &str) -> Mode {
    match state.schedule.get(block_id) {
        Some(block) => Mode::EditingNote(NoteEditor {
            block_id: block.id.clone(),
            buffer: EditBuffer::new(block.note.as_deref().unwrap_or("")),
        }),
        None => Mode::Navigating,
    }
}

// --- Block editor ---

pub(super) fn handle_block_editor_key(
    state: &mut AppState,
    mut editor: BlockEditor,
    key: &KeyEvent,
) -> Mode {
    match key.code {
        KeyCode::Esc => return Mode::Navigating,
        KeyCode::Enter => {
            commit_block_editor(state, &editor);
            return Mode::Navigating;
        }
        KeyCode::Tab => {
            editor.field = match editor.field {
                BlockField::Title => BlockField::Time,
                BlockField::Time => BlockField::Duration,
                BlockField::Duration => BlockField::Title,
            };
        }
        KeyCode::BackTab => {
            editor.field = match editor.field {
                BlockField::Title => BlockField::Duration,
                BlockField::Time => BlockField::Title,
                BlockField::Duration => BlockField::Time,
            };
        }
        _ => match editor.field {
            BlockField::Title => edit_text(&mut editor.title, key),
            BlockField::Time => editor.time.handle_key(key),
            BlockField::Duration => editor.duration.handle_key(key),
        },
    }
    Mode::EditingBlock(editor)
}

fn commit_block_editor(state: &mut AppState, editor: &BlockEditor) {
    let Some(block) = state.schedule.get_mut(&editor.block_id) else {
        return;
    };
    let mut patch = BlockPatch::default();

    let title = editor.title.to_string().trim().to_string();
    if !title.is_empty() && title != block.title {
        block.title = title.clone();
        patch.title = Some(title);
    }
    if let Some(time) = editor.time.value() {
        if time != block.time {
            block.time = time;
            patch.time = Some(time);
        }
    }
    if let Some(duration) = editor.duration.value() {
        if duration != block.duration {
            block.duration = duration;
            patch.duration = Some(duration);
        }
    }

    if !patch.is_empty() {
        state.outbox.push(WriteAction::UpdateBlock {
            id: editor.block_id.clone(),
            patch,
        });
    }
}

// --- Task editor ---

pub(super) fn handle_task_editor_key(
    state: &mut AppState,
    mut editor: TaskEditor,
    key: &KeyEvent,
) -> Mode {
    match key.code {
        KeyCode::Esc => return Mode::Navigating,
        KeyCode::Enter => {
            commit_task_editor(state, &editor);
            return Mode::Navigating;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            editor.field = match editor.field {
                TaskField::Title => TaskField::Duration,
                TaskField::Duration => TaskField::Title,
            };
        }
        _ => match editor.field {
            TaskField::Title => edit_text(&mut editor.title, key),
            TaskField::Duration => editor.duration.handle_key(key),
        },
    }
    Mode::EditingTask(editor)
}

fn commit_task_editor(state: &mut AppState, editor: &TaskEditor) {
    let Some(task) = state.schedule.task_mut(&editor.task_id) else {
        return;
    };
    let mut patch = TaskPatch::default();

    let title = editor.title.to_string().trim().to_string();
    if !title.is_empty() && title != task.title {
        task.title = title.clone();
        patch.title = Some(title);
    }
    if let Some(duration) = editor.duration.value() {
        if duration != task.duration {
            task.duration = duration;
            patch.duration = Some(duration);
        }
    }

    if !patch.is_empty() {
        state.outbox.push(WriteAction::UpdateTask {
            id: editor.task_id.clone(),
            patch,
        });
    }
}

// --- Note editor ---

pub(super) fn handle_note_editor_key(
    state: &mut AppState,
    mut editor: NoteEditor,
    key: &KeyEvent,
) -> Mode {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => return Mode::Navigating,
        (KeyModifiers::ALT | KeyModifiers::SHIFT, KeyCode::Enter) => editor.buffer.insert_newline(),
        (_, KeyCode::Enter) => {
            commit_note_editor(state, &editor);
            return Mode::Navigating;
        }
        _ => edit_text(&mut editor.buffer, key),
    }
    Mode::EditingNote(editor)
}

fn commit_note_editor(state: &mut AppState, editor: &NoteEditor) {
    let Some(block) = state.schedule.get_mut(&editor.block_id) else {
        return;
    };
    let text = editor.buffer.to_string();
    let text = text.trim_end();
    let note = (!text.trim().is_empty()).then(|| text.to_string());
    if note == block.note {
        return;
    }
    block.note = note.clone();
    state.outbox.push(WriteAction::UpdateBlock {
        id: editor.block_id.clone(),
        patch: BlockPatch {
            note: Some(note.unwrap_or_default()),
            ..BlockPatch::default()
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::handle_key;
    use crate::app::state::{Cursor, Focus};
    use crate::app::test_helpers::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn time_input_skips_colon() {
        let mut input = TimeInput::new(t(9, 0));
        assert_eq!(input.display(), "09:00");
        input.type_digit(1);
        input.type_digit(4);
        assert_eq!(input.cursor, 2);
        assert_eq!(input.display_cursor(), 3);
        input.type_digit(3);
        input.type_digit(0);
        assert_eq!(input.value(), Some(t(14, 30)));
        // Cursor stays on the last digit.
        input.type_digit(5);
        assert_eq!(input.display(), "14:35");
    }

    #[test]
    fn time_input_invalid_digits_have_no_value() {
        let mut input = TimeInput::new(t(9, 0));
        input.type_digit(9);
        assert_eq!(input.display(), "99:00");
        assert_eq!(input.value(), None);
    }

    #[test]
    fn time_nudge_clamps_to_day() {
        let mut input = TimeInput::new(t(23, 50));
        input.nudge(15);
        assert_eq!(input.value(), Some(t(23, 59)));
        let mut input = TimeInput::new(t(0, 10));
        input.nudge(-15);
        assert_eq!(input.value(), Some(t(0, 0)));
    }

    #[test]
    fn duration_first_digit_replaces() {
        let mut input = DurationInput::new(90);
        input.type_digit(4);
        input.type_digit(5);
        assert_eq!(input.value(), Some(45));
        input.delete_back();
        input.delete_back();
        assert_eq!(input.value(), None);
    }

    #[test]
    fn duration_nudge_has_floor() {
        let mut input = DurationInput::new(5);
        input.nudge(-5);
        assert_eq!(input.value, 5);
        input.nudge(5);
        assert_eq!(input.value, 10);
    }

    #[test]
    fn block_editor_persists_only_changed_fields() {
        let mut state = state_with(vec![block("a", 9, 0, 60)]);
        state.cursor = header("a");
        press(&mut state, char_key('e'));
        assert!(matches!(state.mode, Mode::EditingBlock(_)));

        press(&mut state, key(KeyCode::Tab));
        press(&mut state, key(KeyCode::Up));
        press(&mut state, key(KeyCode::Enter));

        assert_eq!(state.mode, Mode::Navigating);
        assert_eq!(state.schedule.get("a").unwrap().time, t(9, 15));
        let writes = state.outbox.drain();
        assert_eq!(
            writes,
            vec![WriteAction::UpdateBlock {
                id: "a".into(),
                patch: BlockPatch {
                    time: Some(t(9, 15)),
                    ..BlockPatch::default()
                },
            }]
        );
    }

    #[test]
    fn block_editor_escape_discards() {
        let mut state = state_with(vec![block("a", 9, 0, 60)]);
        state.cursor = header("a");
        press(&mut state, char_key('e'));
        type_str(&mut state, "!!");
        press(&mut state, key(KeyCode::Esc));
        assert_eq!(state.schedule.get("a").unwrap().title, "a");
        assert!(state.outbox.is_empty());
    }

    #[test]
    fn unchanged_commit_writes_nothing() {
        let mut state = state_with(vec![block("a", 9, 0, 60)]);
        state.cursor = header("a");
        press(&mut state, char_key('e'));
        press(&mut state, key(KeyCode::Enter));
        assert!(state.outbox.is_empty());
    }

    #[test]
    fn task_editor_updates_duration() {
        let mut state = state_with(vec![block_with_tasks("a", 9, 0, 60, &["t1"])]);
        state.cursor = task_focus("a", "t1");
        press(&mut state, char_key('e'));
        press(&mut state, key(KeyCode::Tab));
        type_str(&mut state, "25");
        press(&mut state, key(KeyCode::Enter));

        assert_eq!(state.schedule.task("t1").unwrap().duration, 25);
        assert_eq!(
            state.outbox.drain(),
            vec![WriteAction::UpdateTask {
                id: "t1".into(),
                patch: TaskPatch {
                    duration: Some(25),
                    ..TaskPatch::default()
                },
            }]
        );
    }

    #[test]
    fn note_editor_multiline_and_clear() {
        let mut state = state_with(vec![block("a", 9, 0, 60)]);
        state.cursor = header("a");
        press(&mut state, char_key('n'));
        type_str(&mut state, "agenda");
        press(&mut state, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        type_str(&mut state, "- budget");
        press(&mut state, key(KeyCode::Enter));
        assert_eq!(
            state.schedule.get("a").unwrap().note.as_deref(),
            Some("agenda\n- budget")
        );

        state.outbox.drain();
        press(&mut state, char_key('n'));
        for _ in 0..20 {
            press(&mut state, key(KeyCode::Backspace));
        }
        press(&mut state, key(KeyCode::Enter));
        assert_eq!(state.schedule.get("a").unwrap().note, None);
        match &state.outbox.drain()[0] {
            WriteAction::UpdateBlock { patch, .. } => assert_eq!(patch.note.as_deref(), Some("")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn editing_keeps_cursor_on_block() {
        let mut state = state_with(vec![block("a", 9, 0, 60)]);
        state.cursor = header("a");
        press(&mut state, char_key('e'));
        handle_key(&mut state, &key(KeyCode::Esc));
        assert_eq!(
            state.cursor,
            Cursor::Block {
                id: "a".into(),
                focus: Focus::Header
            }
        );
    }
}
