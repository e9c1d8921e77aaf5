use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions resolved before the schedule sees a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Help,
    Reload,
}

impl Action {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "quit" => Some(Self::Quit),
            "help" => Some(Self::Help),
            "reload" => Some(Self::Reload),
            _ => None,
        }
    }

    pub fn hint_text(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Help => "help",
            Self::Reload => "reload",
        }
    }
}

pub fn defaults() -> HashMap<KeyEvent, Action> {
    let mut m = HashMap::new();
    m.insert(
        KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        Action::Quit,
    );
    m.insert(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE), Action::Help);
    m.insert(
        KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
        Action::Reload,
    );
    m
}
