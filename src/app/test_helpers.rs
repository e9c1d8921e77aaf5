use chrono::NaiveTime;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::types::{Block, BlockType, Corpus, Event, InventoryTask, Project, Routine, Task};

use super::cursor;
use super::input::handle_key;
use super::schedule::Schedule;
use super::state::{AppState, Cursor, Focus};

pub const TEST_DAY: &str = "2026-10-19";

pub fn block(id: &str, hour: u32, minute: u32, duration: u32) -> Block {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
    Block::new(id.to_string(), BlockType::DeepWork, id, time, duration)
}

pub fn block_with_tasks(id: &str, hour: u32, minute: u32, duration: u32, tasks: &[&str]) -> Block {
    let mut b = block(id, hour, minute, duration);
    b.tasks = tasks
        .iter()
        .map(|t| Task::new(t.to_string(), t, 15))
        .collect();
    b
}

/// Keeps the given order; nothing is sorted.
pub fn schedule_of(blocks: Vec<Block>) -> Schedule {
    let mut schedule = Schedule::new(TEST_DAY);
    for b in blocks {
        let at = schedule.len();
        schedule.insert(at, b);
    }
    schedule
}

pub fn state_with(blocks: Vec<Block>) -> AppState {
    let mut state = AppState::new(TEST_DAY, Vec::new());
    state.schedule = schedule_of(blocks);
    state.loading = false;
    state.status_message = None;
    state.now = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    state.cursor = cursor::initial(&state.schedule);
    state
}

pub fn corpus() -> Corpus {
    Corpus {
        routines: vec![
            Routine {
                id: "r1".into(),
                name: "Morning pages".into(),
                duration: 20,
            },
            Routine {
                id: "r2".into(),
                name: "Pomodoro".into(),
                duration: 25,
            },
        ],
        events: vec![
            Event {
                id: "e1".into(),
                name: "Standup".into(),
                time: NaiveTime::from_hms_opt(9, 30, 0),
                duration: 15,
                zoom_link: Some("https://zoom.example/standup".into()),
            },
            Event {
                id: "e2".into(),
                name: "Retro".into(),
                time: None,
                duration: 60,
                zoom_link: None,
            },
        ],
        tasks: vec![
            InventoryTask {
                id: "i1".into(),
                title: "Email".into(),
                duration: 10,
                project_id: None,
            },
            InventoryTask {
                id: "i2".into(),
                title: "Review PRs".into(),
                duration: 30,
                project_id: Some("p1".into()),
            },
            InventoryTask {
                id: "i3".into(),
                title: "Water plants".into(),
                duration: 15,
                project_id: Some("p2".into()),
            },
        ],
        projects: vec![
            Project {
                id: "p1".into(),
                name: "Thesis".into(),
            },
            Project {
                id: "p2".into(),
                name: "Garden".into(),
            },
        ],
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

pub fn press(state: &mut AppState, key: KeyEvent) {
    handle_key(state, &key);
}

pub fn type_str(state: &mut AppState, text: &str) {
    for c in text.chars() {
        press(state, char_key(c));
    }
}

pub fn header(id: &str) -> Cursor {
    Cursor::Block {
        id: id.into(),
        focus: Focus::Header,
    }
}

pub fn input(id: &str, after: Option<usize>) -> Cursor {
    Cursor::Block {
        id: id.into(),
        focus: Focus::Input { after },
    }
}

pub fn task_focus(block_id: &str, task_id: &str) -> Cursor {
    Cursor::Block {
        id: block_id.into(),
        focus: Focus::Task(task_id.into()),
    }
}

pub fn between(after: Option<&str>) -> Cursor {
    Cursor::Between {
        after: after.map(str::to_string),
    }
}
