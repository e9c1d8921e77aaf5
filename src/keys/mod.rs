pub mod action;
pub mod parser;

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::{PlannerError, Result};
use action::Action;

pub struct KeybindingMap {
    bindings: HashMap<KeyEvent, Action>,
}

impl KeybindingMap {
    pub fn new(overrides: &HashMap<String, String>) -> Result<Self> {
        let mut bindings = action::defaults();

        for (action_name, key_str) in overrides {
            let action = Action::from_str(action_name)
                .ok_or_else(|| PlannerError::Config(format!("Unknown action: {}", action_name)))?;
            let key_event = parser::parse_key(key_str)?;

            bindings.retain(|_, v| v != &action);
            bindings.insert(key_event, action);
        }

        Ok(Self { bindings })
    }

    /// Matches on code and modifiers only; kind and state are ignored.
    pub fn resolve(&self, key: &KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let lookup = KeyEvent::new(key.code, key.modifiers);
        self.bindings.get(&lookup).copied()
    }

    pub fn hints(&self) -> Vec<(String, &'static str)> {
        let mut hints = Vec::new();
        for action in [Action::Quit, Action::Help, Action::Reload] {
            if let Some((key_event, _)) = self.bindings.iter().find(|(_, a)| **a == action) {
                hints.push((format_key_event(key_event), action.hint_text()));
            }
        }
        hints
    }
}

/// Ctrl on Linux/Windows terminals, Super (Cmd) where the terminal reports it.
pub fn is_command_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
}

pub fn format_key_event(key: &KeyEvent) -> String {
    let mut parts = Vec::new();

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl".to_string());
    }
    if key.modifiers.contains(KeyModifiers::SUPER) {
        parts.push("Cmd".to_string());
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt".to_string());
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        parts.push("Shift".to_string());
    }

    let key_str = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };
    parts.push(key_str);

    parts.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    #[test]
    fn defaults_resolve_ctrl_q_to_quit() {
        let map = KeybindingMap::new(&HashMap::new()).unwrap();
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(map.resolve(&key), Some(Action::Quit));
    }

    #[test]
    fn plain_letters_are_never_global() {
        let map = KeybindingMap::new(&HashMap::new()).unwrap();
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map.resolve(&key), None);
    }

    #[test]
    fn override_replaces_existing_binding() {
        let mut overrides = HashMap::new();
        overrides.insert("quit".into(), "Ctrl+x".into());

        let map = KeybindingMap::new(&overrides).unwrap();

        let old_key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(map.resolve(&old_key), None);

        let new_key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(map.resolve(&new_key), Some(Action::Quit));
    }

    #[test]
    fn unknown_action_in_override_returns_error() {
        let mut overrides = HashMap::new();
        overrides.insert("nonexistent".into(), "q".into());
        assert!(KeybindingMap::new(&overrides).is_err());
    }

    #[test]
    fn release_events_do_not_trigger_actions() {
        let map = KeybindingMap::new(&HashMap::new()).unwrap();
        let key = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map.resolve(&key), None);
    }

    #[test]
    fn resolve_ignores_key_state_flags() {
        let map = KeybindingMap::new(&HashMap::new()).unwrap();
        let key = KeyEvent {
            code: KeyCode::F(1),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NUM_LOCK,
        };
        assert_eq!(map.resolve(&key), Some(Action::Help));
    }

    #[test]
    fn hints_list_global_actions() {
        let map = KeybindingMap::new(&HashMap::new()).unwrap();
        let hints = map.hints();
        assert_eq!(hints[0], ("Ctrl+q".to_string(), "quit"));
        assert!(hints.iter().any(|(_, label)| *label == "reload"));
    }

    #[test]
    fn command_modifier_accepts_ctrl_or_super() {
        assert!(is_command_modifier(KeyModifiers::CONTROL));
        assert!(is_command_modifier(KeyModifiers::SUPER));
        assert!(is_command_modifier(KeyModifiers::CONTROL | KeyModifiers::SHIFT));
        assert!(!is_command_modifier(KeyModifiers::SHIFT));
    }

    #[test]
    fn format_key_event_with_cmd() {
        let key = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::SUPER);
        assert_eq!(format_key_event(&key), "Cmd+g");
    }
}
