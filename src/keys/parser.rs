//! Parses binding strings from the `[keybindings]` config table, such as
//! `Ctrl+r`, `Alt+Enter`, `Ctrl++` or `F5`, into the key events crossterm reports.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{PlannerError, Result};

const NAMED_KEYS: &[(&[&str], KeyCode)] = &[
    (&["enter", "return"], KeyCode::Enter),
    (&["esc", "escape"], KeyCode::Esc),
    (&["tab"], KeyCode::Tab),
    (&["backtab"], KeyCode::BackTab),
    (&["backspace", "bs"], KeyCode::Backspace),
    (&["delete", "del"], KeyCode::Delete),
    (&["insert", "ins"], KeyCode::Insert),
    (&["home"], KeyCode::Home),
    (&["end"], KeyCode::End),
    (&["pageup", "pgup"], KeyCode::PageUp),
    (&["pagedown", "pgdn"], KeyCode::PageDown),
    (&["up", "↑"], KeyCode::Up),
    (&["down", "↓"], KeyCode::Down),
    (&["left", "←"], KeyCode::Left),
    (&["right", "→"], KeyCode::Right),
    (&["space"], KeyCode::Char(' ')),
    (&["plus"], KeyCode::Char('+')),
];

fn modifier(name: &str) -> Option<KeyModifiers> {
    let m = match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => KeyModifiers::CONTROL,
        "shift" => KeyModifiers::SHIFT,
        "alt" | "opt" | "option" => KeyModifiers::ALT,
        "cmd" | "super" | "meta" => KeyModifiers::SUPER,
        _ => return None,
    };
    Some(m)
}

/// Splits `Ctrl+Shift+k` into `(["Ctrl", "Shift"], "k")`. A trailing `+`
/// is the plus key itself, so `Ctrl++` binds Ctrl and `+`.
fn split_chord(input: &str) -> (Vec<&str>, &str) {
    let (prefix, key) = match input.strip_suffix('+') {
        Some(rest) if rest.is_empty() || rest.ends_with('+') => {
            (rest.strip_suffix('+').unwrap_or(rest), "+")
        }
        _ => match input.rsplit_once('+') {
            Some((mods, key)) => (mods, key),
            None => ("", input),
        },
    };
    let mods = prefix
        .split('+')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();
    (mods, key.trim())
}

fn key_code(name: &str) -> std::result::Result<KeyCode, String> {
    let lower = name.to_lowercase();
    if let Some((_, code)) = NAMED_KEYS
        .iter()
        .find(|(names, _)| names.contains(&lower.as_str()))
    {
        return Ok(*code);
    }

    if let Some(digits) = lower.strip_prefix('f').filter(|d| !d.is_empty()) {
        return match digits.parse::<u8>() {
            Ok(n @ 1..=12) => Ok(KeyCode::F(n)),
            Ok(n) => Err(format!("Function key out of range: F{}", n)),
            Err(_) => Err(format!("Unknown key: {}", name)),
        };
    }

    let mut chars = lower.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(KeyCode::Char(ch)),
        (None, _) => Err("No key code found".to_string()),
        _ => Err(format!("Unknown key: {}", name)),
    }
}

/// Terminals report Shift+Tab as BackTab with the Shift flag still set.
fn normalize(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    match code {
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => {
            KeyEvent::new(KeyCode::BackTab, modifiers)
        }
        KeyCode::BackTab => KeyEvent::new(code, modifiers | KeyModifiers::SHIFT),
        _ => KeyEvent::new(code, modifiers),
    }
}

pub fn parse_key(input: &str) -> Result<KeyEvent> {
    let (mods, key) = split_chord(input.trim());

    let modifiers = mods.iter().try_fold(KeyModifiers::NONE, |acc, name| {
        modifier(name).map(|m| acc | m).ok_or_else(|| {
            PlannerError::Config(format!("Unknown modifier '{}' in key '{}'", name, input))
        })
    })?;

    let code =
        key_code(key).map_err(|e| PlannerError::Config(format!("{} in key '{}'", e, input)))?;
    Ok(normalize(code, modifiers))
}
