use super::schedule::Schedule;
use super::state::{AppState, Cursor, Focus};

/// Cursor to use right after a day loads.
pub(super) fn initial(schedule: &Schedule) -> Cursor {
    match schedule.id_at(0) {
        Some(id) => Cursor::Block {
            id: id.to_string(),
            focus: Focus::Header,
        },
        None => Cursor::Between { after: None },
    }
}

/// Every position the arrow keys can stop at, top to bottom. A mid-list input
/// slot is only a stop while the cursor is on it.
fn stops(schedule: &Schedule, current: &Cursor) -> Vec<Cursor> {
    let mut out = vec![Cursor::Between { after: None }];
    for block in schedule.iter() {
        let at = |focus| Cursor::Block {
            id: block.id.clone(),
            focus,
        };
        out.push(at(Focus::Header));
        out.push(at(Focus::Input { after: None }));
        let last = block.tasks.len().checked_sub(1);
        for (i, task) in block.tasks.iter().enumerate() {
            out.push(at(Focus::Task(task.id.clone())));
            let slot = at(Focus::Input { after: Some(i) });
            if Some(i) == last || *current == slot {
                out.push(slot);
            }
        }
        out.push(Cursor::Between {
            after: Some(block.id.clone()),
        });
    }
    out
}

pub(super) fn step(state: &mut AppState, down: bool) {
    let stops = stops(&state.schedule, &state.cursor);
    let next = match stops.iter().position(|c| *c == state.cursor) {
        Some(i) if down => stops.get(i + 1),
        Some(i) => i.checked_sub(1).and_then(|j| stops.get(j)),
        None if down => stops.first(),
        None => None,
    };
    if let Some(next) = next {
        state.cursor = next.clone();
    }
}

/// Header-to-header jump. Inside a block, moving up lands on its own header first.
pub(super) fn jump_header(state: &mut AppState, down: bool) {
    let target = match &state.cursor {
        Cursor::None => (down && !state.schedule.is_empty()).then_some(0),
        Cursor::Between { after: None } => down.then_some(0),
        Cursor::Between { after: Some(id) } => state
            .schedule
            .index_of(id)
            .map(|i| if down { i + 1 } else { i }),
        Cursor::Block { id, focus } => state.schedule.index_of(id).and_then(|i| {
            if down {
                Some(i + 1)
            } else if *focus != Focus::Header {
                Some(i)
            } else {
                i.checked_sub(1)
            }
        }),
    };
    if let Some(id) = target.and_then(|i| state.schedule.id_at(i)) {
        state.cursor = Cursor::Block {
            id: id.to_string(),
            focus: Focus::Header,
        };
    }
}

/// Leaves the block for the between-slot before (`forward == false`) or after it.
pub(super) fn leave_block(state: &mut AppState, forward: bool) {
    let Cursor::Block { id, .. } = &state.cursor else {
        return;
    };
    let Some(index) = state.schedule.index_of(id) else {
        return;
    };
    let after = if forward {
        Some(id.clone())
    } else {
        index
            .checked_sub(1)
            .and_then(|i| state.schedule.id_at(i))
            .map(str::to_string)
    };
    state.cursor = Cursor::Between { after };
}

/// One level outward: task, input slot, header, then the between-slot after the block.
pub(super) fn escape_outward(state: &mut AppState) {
    let Cursor::Block { id, focus } = &state.cursor else {
        return;
    };
    let id = id.clone();
    state.cursor = match focus {
        Focus::Task(task_id) => {
            let after = state.schedule.get(&id).and_then(|b| b.task_index(task_id));
            Cursor::Block {
                id,
                focus: Focus::Input { after },
            }
        }
        Focus::Input { .. } => Cursor::Block {
            id,
            focus: Focus::Header,
        },
        Focus::Header => Cursor::Between { after: Some(id) },
    };
}

pub(super) fn enter_block(state: &mut AppState) {
    if let Cursor::Block { focus, .. } = &mut state.cursor {
        if *focus == Focus::Header {
            *focus = Focus::Input { after: None };
        }
    }
}

pub(super) fn to_header(state: &mut AppState) {
    if let Cursor::Block { focus, .. } = &mut state.cursor {
        *focus = Focus::Header;
    }
}

/// `Enter` on an empty between-slot: header of the following block.
pub(super) fn next_block(state: &mut AppState) {
    let Some(slot) = state.between_index() else {
        return;
    };
    let next = slot.map(|i| i + 1).unwrap_or(0);
    if let Some(id) = state.schedule.id_at(next) {
        state.cursor = Cursor::Block {
            id: id.to_string(),
            focus: Focus::Header,
        };
    }
}

/// Repairs ids and slots that no longer exist after a mutation.
pub(super) fn reconcile(state: &mut AppState) {
    let schedule = &state.schedule;
    let repaired = match &state.cursor {
        Cursor::None => None,
        Cursor::Between { after: Some(id) } if !schedule.contains(id) => {
            Some(Cursor::Between { after: None })
        }
        Cursor::Between { .. } => None,
        Cursor::Block { id, .. } if !schedule.contains(id) => {
            Some(Cursor::Between { after: None })
        }
        Cursor::Block { id, focus } => {
            let tasks = schedule.get(id).map(|b| b.tasks.len()).unwrap_or(0);
            match focus {
                Focus::Task(task_id) => match schedule.find_task(task_id) {
                    Some((owner, _)) if owner == *id => None,
                    Some((owner, _)) => Some(Cursor::Block {
                        id: owner,
                        focus: Focus::Task(task_id.clone()),
                    }),
                    None => Some(Cursor::Block {
                        id: id.clone(),
                        focus: Focus::Input { after: None },
                    }),
                },
                Focus::Input { after: Some(n) } if *n >= tasks => Some(Cursor::Block {
                    id: id.clone(),
                    focus: Focus::Input {
                        after: tasks.checked_sub(1),
                    },
                }),
                _ => None,
            }
        }
    };
    if let Some(cursor) = repaired {
        state.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_helpers::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn two_blocks() -> AppState {
        state_with(vec![
            block_with_tasks("a", 9, 0, 60, &["t1", "t2"]),
            block("b", 11, 0, 30),
        ])
    }

    #[test]
    fn down_walks_every_stop() {
        let mut state = two_blocks();
        state.cursor = Cursor::Between { after: None };
        let mut seen = vec![state.cursor.clone()];
        for _ in 0..12 {
            press(&mut state, key(KeyCode::Down));
            if seen.last() != Some(&state.cursor) {
                seen.push(state.cursor.clone());
            }
        }
        assert_eq!(
            seen,
            vec![
                Cursor::Between { after: None },
                header("a"),
                input("a", None),
                task_focus("a", "t1"),
                task_focus("a", "t2"),
                input("a", Some(1)),
                between(Some("a")),
                header("b"),
                input("b", None),
                between(Some("b")),
            ]
        );
    }

    #[test]
    fn up_at_top_is_noop() {
        let mut state = two_blocks();
        state.cursor = Cursor::Between { after: None };
        press(&mut state, key(KeyCode::Up));
        assert_eq!(state.cursor, Cursor::Between { after: None });
    }

    #[test]
    fn up_from_header_reaches_previous_trailing_slot() {
        let mut state = two_blocks();
        state.cursor = header("b");
        press(&mut state, key(KeyCode::Up));
        assert_eq!(state.cursor, between(Some("a")));
        press(&mut state, key(KeyCode::Up));
        assert_eq!(state.cursor, input("a", Some(1)));
    }

    #[test]
    fn mid_slot_is_transient() {
        let mut state = two_blocks();
        state.cursor = input("a", Some(0));
        press(&mut state, key(KeyCode::Down));
        assert_eq!(state.cursor, task_focus("a", "t2"));
        press(&mut state, key(KeyCode::Up));
        assert_eq!(state.cursor, task_focus("a", "t1"));
    }

    #[test]
    fn ctrl_arrows_jump_headers() {
        let mut state = two_blocks();
        state.cursor = task_focus("a", "t2");
        press(&mut state, KeyEvent::new(KeyCode::Down, KeyModifiers::CONTROL));
        assert_eq!(state.cursor, header("b"));
        press(&mut state, KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert_eq!(state.cursor, header("a"));
        press(&mut state, KeyEvent::new(KeyCode::Char('k'), KeyModifiers::SUPER));
        assert_eq!(state.cursor, header("a"));
        press(&mut state, KeyEvent::new(KeyCode::Char('j'), KeyModifiers::SUPER));
        assert_eq!(state.cursor, header("b"));
    }

    #[test]
    fn ctrl_left_right_leave_block() {
        let mut state = two_blocks();
        state.cursor = header("b");
        press(&mut state, KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL));
        assert_eq!(state.cursor, between(Some("a")));

        state.cursor = input("a", None);
        press(&mut state, KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        assert_eq!(state.cursor, between(Some("a")));

        state.cursor = header("a");
        press(&mut state, KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL));
        assert_eq!(state.cursor, between(None));
    }

    #[test]
    fn tab_enters_and_backtab_returns() {
        let mut state = two_blocks();
        state.cursor = header("a");
        press(&mut state, key(KeyCode::Tab));
        assert_eq!(state.cursor, input("a", None));
        assert_eq!(state.task_input_position(), -1);
        press(&mut state, key(KeyCode::BackTab));
        assert_eq!(state.cursor, header("a"));
        press(&mut state, key(KeyCode::Enter));
        assert_eq!(state.cursor, input("a", None));
    }

    #[test]
    fn escape_walks_outward() {
        let mut state = two_blocks();
        state.cursor = task_focus("a", "t2");
        press(&mut state, key(KeyCode::Esc));
        assert_eq!(state.cursor, input("a", Some(1)));
        press(&mut state, key(KeyCode::Esc));
        assert_eq!(state.cursor, header("a"));
        press(&mut state, key(KeyCode::Esc));
        assert_eq!(state.cursor, between(Some("a")));
        press(&mut state, key(KeyCode::Esc));
        assert_eq!(state.cursor, between(Some("a")));
    }

    #[test]
    fn enter_on_empty_between_moves_to_next_block() {
        let mut state = two_blocks();
        state.cursor = between(Some("a"));
        press(&mut state, key(KeyCode::Enter));
        assert_eq!(state.cursor, header("b"));
        state.cursor = between(Some("b"));
        press(&mut state, key(KeyCode::Enter));
        assert_eq!(state.cursor, between(Some("b")));
    }

    #[test]
    fn reconcile_repairs_stale_cursor() {
        let mut state = two_blocks();
        state.cursor = header("gone");
        reconcile(&mut state);
        assert_eq!(state.cursor, between(None));

        state.cursor = input("b", Some(4));
        reconcile(&mut state);
        assert_eq!(state.cursor, input("b", None));

        state.cursor = task_focus("b", "t1");
        reconcile(&mut state);
        assert_eq!(state.cursor, task_focus("a", "t1"));
    }

    #[test]
    fn initial_cursor_is_first_header() {
        let state = two_blocks();
        assert_eq!(initial(&state.schedule), header("a"));
        assert_eq!(initial(&Schedule::new("d")), between(None));
    }
}
