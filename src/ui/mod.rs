pub mod header;
pub mod schedule_view;
pub mod status_bar;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block as WidgetBlock, BorderType, Borders, Clear};
use ratatui::Frame;

use crate::app::predict::Match;
use crate::app::slash::{self, PickerState};
use crate::app::{
    AppState, BlockEditor, BlockField, CommandMenu, CursorPosition, Mode, NoteEditor,
    TaskEditor, TaskField, TimeInput,
};
use crate::edit_buffer::EditBuffer;
use crate::error::ErrorPopup;

use header::Header;
use schedule_view::ScheduleView;
use status_bar::StatusBar;

const POPUP_LIST_LIMIT: usize = 10;

fn mode_hint(mode: &Mode) -> Option<&'static str> {
    match mode {
        Mode::Navigating => None,
        Mode::TypingCommand(_) => Some("Enter create  Tab accept match  Esc cancel"),
        Mode::TypingTask(_) => Some("Enter add  Up/Down pick  Esc dismiss"),
        Mode::EditingBlock(_) | Mode::EditingTask(_) => {
            Some("Tab next field  arrows nudge  Enter save  Esc discard")
        }
        Mode::EditingNote(_) => Some("Alt+Enter newline  Enter save  Esc discard"),
        Mode::GrabbedBlock { .. } | Mode::GrabbedTask { .. } => {
            Some("arrows move  Enter/g drop  Esc cancel")
        }
        Mode::GrabbedTasks(_) => {
            Some("Ctrl+g add  Ctrl+arrows move group  Enter drop  Esc cancel")
        }
        Mode::ConfirmMove { .. } => Some("type or nudge the time  Enter confirm  Esc undo"),
        Mode::ConfirmDelete { .. } => Some("y confirm  n cancel"),
    }
}

/// Where the cursor sits, e.g. `block 2/4 · task 3`.
fn cursor_label(state: &AppState) -> Option<String> {
    let total = state.schedule.len();
    match state.cursor_position() {
        CursorPosition::None => None,
        CursorPosition::Between(-1) => Some("top".into()),
        CursorPosition::Between(i) => Some(format!("after {}/{}", i + 1, total)),
        CursorPosition::Block(i) => {
            let block = format!("block {}/{}", i + 1, total);
            let detail = match (state.selected_task_index(), state.task_input_position()) {
                (Some(t), _) => format!(" · task {}", t + 1),
                (None, -1) => " · new task".to_string(),
                (None, n) if n >= 0 => format!(" · after task {}", n + 1),
                _ => String::new(),
            };
            Some(block + &detail)
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let header = Header {
        date: &state.date_display,
        block_count: state.schedule.len(),
        planned_minutes: state.schedule.iter().map(|b| b.duration).sum(),
    };
    frame.render_widget(header, chunks[0]);

    let view = ScheduleView {
        schedule: &state.schedule,
        cursor: &state.cursor,
        mode: &state.mode,
        loading: state.loading,
    };
    frame.render_widget(view, chunks[1]);

    match &state.mode {
        Mode::TypingCommand(input) => match &input.menu {
            Some(CommandMenu::Slash { selected }) => {
                render_slash_popup(frame, *selected, chunks[1])
            }
            Some(CommandMenu::Picker(picker)) => render_picker_popup(frame, picker, chunks[1]),
            None => {}
        },
        Mode::EditingBlock(editor) => render_block_editor(frame, editor, chunks[1]),
        Mode::EditingTask(editor) => render_task_editor(frame, editor, chunks[1]),
        Mode::EditingNote(editor) => render_note_editor(frame, editor, chunks[1]),
        Mode::ConfirmMove {
            old_index,
            new_index,
            time,
            ..
        } => render_confirm_move(frame, *old_index, *new_index, time, chunks[1]),
        Mode::ConfirmDelete { block_id } => {
            let (title, tasks) = state
                .schedule
                .get(block_id)
                .map(|b| (b.title.as_str(), b.tasks.len()))
                .unwrap_or(("", 0));
            render_confirm_delete(frame, title, tasks, chunks[1]);
        }
        _ => {}
    }

    if state.show_help {
        render_help_popup(frame, &state.hints, chunks[1]);
    }

    if let Some(err) = &state.error_popup {
        render_error_popup(frame, err, chunks[1]);
    }

    let status = StatusBar {
        hints: &state.hints,
        message: state.status_message.as_deref(),
        mode_label: state.mode.label(),
        mode_hint: mode_hint(&state.mode),
        position: cursor_label(state),
    };
    frame.render_widget(status, chunks[2]);
}

/// Centered bordered popup; returns the inner area.
fn popup_frame(
    frame: &mut Frame,
    area: Rect,
    width_percent: u16,
    height: u16,
    title: String,
    color: Color,
) -> Rect {
    let popup_width = (area.width * width_percent / 100).max(30).min(area.width);
    let popup_height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);
    frame.render_widget(Clear, popup_area);

    let block = WidgetBlock::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(title);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    inner
}

fn render_row(frame: &mut Frame, inner: Rect, row: u16, line: Line) {
    if row < inner.height {
        frame.render_widget(line, Rect::new(inner.x, inner.y + row, inner.width, 1));
    }
}

fn padded(text: &str, width: usize) -> String {
    let display: String = text.chars().take(width).collect();
    let padding = width.saturating_sub(display.chars().count());
    format!("{}{}", display, " ".repeat(padding))
}

fn list_style(selected: bool, color: Color) -> Style {
    if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default().fg(color)
    }
}

fn render_slash_popup(frame: &mut Frame, selected: usize, area: Rect) {
    let items = slash::all_items();
    let inner = popup_frame(
        frame,
        area,
        50,
        items.len() as u16 + 2,
        " New block ".into(),
        Color::Cyan,
    );
    for (i, item) in items.iter().enumerate() {
        let text = format!("{:<12} {}", item.name, item.description);
        let line = Line::from(Span::styled(
            padded(&text, inner.width as usize),
            list_style(i == selected, Color::Gray),
        ));
        render_row(frame, inner, i as u16, line);
    }
}

fn render_match_list(
    frame: &mut Frame,
    inner: Rect,
    first_row: u16,
    items: &[Match],
    selected: usize,
) {
    if items.is_empty() {
        let line = Line::styled("No results", Style::default().fg(Color::DarkGray));
        render_row(frame, inner, first_row, line);
        return;
    }
    let scroll_offset = if selected >= POPUP_LIST_LIMIT {
        selected - POPUP_LIST_LIMIT + 1
    } else {
        0
    };
    for (i, m) in items
        .iter()
        .skip(scroll_offset)
        .take(POPUP_LIST_LIMIT)
        .enumerate()
    {
        let line = Line::from(Span::styled(
            padded(&m.preview_text, inner.width as usize),
            list_style(i + scroll_offset == selected, Color::Gray),
        ));
        render_row(frame, inner, first_row + i as u16, line);
    }
}

fn render_picker_popup(frame: &mut Frame, picker: &PickerState, area: Rect) {
    let visible = picker.items.len().clamp(1, POPUP_LIST_LIMIT);
    let title = if picker.query.is_empty() {
        format!(" Pick {:?} ", picker.kind)
    } else {
        format!(" Pick {:?}: {} ", picker.kind, picker.query)
    };
    let inner = popup_frame(frame, area, 60, visible as u16 + 2, title, Color::Yellow);
    render_match_list(frame, inner, 0, &picker.items, picker.selected);
}

fn field_line(label: &str, value: Vec<Span<'static>>, active: bool) -> Line<'static> {
    let label_style = if active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![Span::styled(format!("{:>9}  ", label), label_style)];
    spans.extend(value);
    Line::from(spans)
}

fn text_spans(buffer: &EditBuffer, active: bool) -> Vec<Span<'static>> {
    let style = Style::default().fg(Color::White);
    if active {
        schedule_view::buffer_spans(buffer, style)
    } else {
        vec![Span::styled(buffer.to_string(), style)]
    }
}

fn time_spans(time: &TimeInput, active: bool) -> Vec<Span<'static>> {
    let text = time.display();
    if !active {
        return vec![Span::styled(text, Style::default().fg(Color::White))];
    }
    let cursor = time.display_cursor();
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let style = if i == cursor {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(c.to_string(), style)
        })
        .collect()
}

fn minutes_spans(value: u32, active: bool) -> Vec<Span<'static>> {
    let style = if active {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        Style::default().fg(Color::White)
    };
    vec![Span::styled(format!("{}m", value), style)]
}

fn render_block_editor(frame: &mut Frame, editor: &BlockEditor, area: Rect) {
    let inner = popup_frame(frame, area, 60, 5, " Edit block ".into(), Color::Cyan);
    let rows = [
        field_line(
            "title",
            text_spans(&editor.title, editor.field == BlockField::Title),
            editor.field == BlockField::Title,
        ),
        field_line(
            "start",
            time_spans(&editor.time, editor.field == BlockField::Time),
            editor.field == BlockField::Time,
        ),
        field_line(
            "duration",
            minutes_spans(editor.duration.value, editor.field == BlockField::Duration),
            editor.field == BlockField::Duration,
        ),
    ];
    for (i, line) in rows.into_iter().enumerate() {
        render_row(frame, inner, i as u16, line);
    }
}

fn render_task_editor(frame: &mut Frame, editor: &TaskEditor, area: Rect) {
    let inner = popup_frame(frame, area, 60, 4, " Edit task ".into(), Color::Cyan);
    render_row(
        frame,
        inner,
        0,
        field_line(
            "title",
            text_spans(&editor.title, editor.field == TaskField::Title),
            editor.field == TaskField::Title,
        ),
    );
    render_row(
        frame,
        inner,
        1,
        field_line(
            "duration",
            minutes_spans(editor.duration.value, editor.field == TaskField::Duration),
            editor.field == TaskField::Duration,
        ),
    );
}

fn render_note_editor(frame: &mut Frame, editor: &NoteEditor, area: Rect) {
    let text = editor.buffer.to_string();
    let line_count = text.split('\n').count().max(1);
    let inner = popup_frame(
        frame,
        area,
        70,
        line_count as u16 + 2,
        " Note ".into(),
        Color::Cyan,
    );

    // Map the flat cursor onto (line, column).
    let mut line_start = 0;
    for (row, text_line) in text.split('\n').enumerate() {
        let len = text_line.chars().count();
        let cursor = editor.buffer.cursor;
        let spans = if cursor >= line_start && cursor <= line_start + len {
            let chars: Vec<char> = text_line.chars().collect();
            let col = cursor - line_start;
            let before: String = chars[..col].iter().collect();
            let at = chars.get(col).copied().unwrap_or(' ');
            let after: String = chars.iter().skip(col + 1).collect();
            vec![
                Span::raw(before),
                Span::styled(at.to_string(), Style::default().fg(Color::Black).bg(Color::White)),
                Span::raw(after),
            ]
        } else {
            vec![Span::raw(text_line.to_string())]
        };
        render_row(frame, inner, row as u16, Line::from(spans));
        line_start += len + 1;
    }
}

fn render_confirm_move(
    frame: &mut Frame,
    old_index: usize,
    new_index: usize,
    time: &TimeInput,
    area: Rect,
) {
    let inner = popup_frame(frame, area, 50, 5, " Move block ".into(), Color::Yellow);
    render_row(
        frame,
        inner,
        0,
        Line::styled(
            format!("Position {} -> {}", old_index + 1, new_index + 1),
            Style::default().fg(Color::Gray),
        ),
    );
    render_row(frame, inner, 1, field_line("new start", time_spans(time, true), true));
    render_row(
        frame,
        inner,
        2,
        Line::styled("Enter confirm, Esc undo", Style::default().fg(Color::DarkGray)),
    );
}

fn render_confirm_delete(frame: &mut Frame, title: &str, tasks: usize, area: Rect) {
    let inner = popup_frame(frame, area, 50, 4, " Delete block ".into(), Color::Red);
    render_row(
        frame,
        inner,
        0,
        Line::styled(
            format!("Delete \"{}\" and its {} task(s)?", title, tasks),
            Style::default().fg(Color::White),
        ),
    );
    render_row(
        frame,
        inner,
        1,
        Line::styled("y confirm, n cancel", Style::default().fg(Color::DarkGray)),
    );
}

fn render_help_popup(frame: &mut Frame, hints: &[(String, &str)], area: Rect) {
    const SCHEDULE_KEYS: [(&str, &str); 9] = [
        ("arrows", "move between slots, blocks and tasks"),
        ("Tab/S-Tab", "enter block / back to header"),
        ("Ctrl+arrows", "jump blocks, leave block"),
        ("type", "command between blocks, task inside"),
        ("e / n", "edit / note"),
        ("Space", "toggle done"),
        ("g", "grab block or task"),
        ("Ctrl+g", "collect tasks for a group move"),
        ("Ctrl+Bksp", "delete"),
    ];
    let line_count = hints.len() + SCHEDULE_KEYS.len();
    let inner = popup_frame(
        frame,
        area,
        60,
        line_count as u16 + 3,
        " Help ".into(),
        Color::Cyan,
    );

    let global = hints.iter().map(|(k, a)| (k.as_str(), *a));
    for (i, (key_str, action_name)) in global.chain(SCHEDULE_KEYS).enumerate() {
        if i as u16 >= inner.height.saturating_sub(1) {
            break;
        }
        let line = Line::from(vec![
            Span::styled(format!("{:>12}", key_str), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(action_name.to_string(), Style::default().fg(Color::White)),
        ]);
        render_row(frame, inner, i as u16, line);
    }

    if inner.height > 0 {
        let footer = Line::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        );
        render_row(frame, inner, inner.height - 1, footer);
    }
}

fn render_error_popup(frame: &mut Frame, popup: &ErrorPopup, area: Rect) {
    let popup_width = (area.width * 50 / 100).max(30).min(area.width);
    let inner_width = popup_width.saturating_sub(2) as usize;

    let msg_lines = wrap_text(&popup.message, inner_width);
    // blank, message, blank, hint, blank, footer
    let content_height = 1 + msg_lines.len() + 1 + 1 + 1 + 1;
    let inner = popup_frame(
        frame,
        area,
        50,
        content_height as u16 + 2,
        format!(" ! {} ", popup.title),
        Color::Red,
    );

    let mut row: u16 = 1;
    for line_text in &msg_lines {
        if row >= inner.height.saturating_sub(1) {
            break;
        }
        let line = Line::styled(line_text.clone(), Style::default().fg(Color::White));
        render_row(frame, inner, row, line);
        row += 1;
    }

    row += 1;
    if row < inner.height.saturating_sub(1) {
        let hint = Line::styled(popup.hint.clone(), Style::default().fg(Color::DarkGray));
        render_row(frame, inner, row, hint);
        row += 1;
    }

    row += 1;
    let footer = Line::styled(
        "Press any key to close",
        Style::default().fg(Color::DarkGray),
    );
    render_row(frame, inner, row, footer);
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_helpers::*;
    use crate::app::{CommandInput, Cursor};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(state: &AppState) -> String {
        let backend = TestBackend::new(70, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn cursor_label_follows_the_cursor() {
        let mut state = state_with(vec![
            block("a", 8, 0, 30),
            block_with_tasks("b", 9, 0, 60, &["t1", "t2"]),
        ]);
        state.cursor = between(None);
        assert_eq!(cursor_label(&state).as_deref(), Some("top"));
        state.cursor = between(Some("a"));
        assert_eq!(cursor_label(&state).as_deref(), Some("after 1/2"));
        state.cursor = header("b");
        assert_eq!(cursor_label(&state).as_deref(), Some("block 2/2"));
        state.cursor = task_focus("b", "t2");
        assert_eq!(cursor_label(&state).as_deref(), Some("block 2/2 · task 2"));
        state.cursor = input("b", None);
        assert_eq!(cursor_label(&state).as_deref(), Some("block 2/2 · new task"));
        state.cursor = input("b", Some(0));
        assert_eq!(cursor_label(&state).as_deref(), Some("block 2/2 · after task 1"));
        state.cursor = Cursor::None;
        assert_eq!(cursor_label(&state), None);
    }

    #[test]
    fn status_bar_shows_cursor_label() {
        let mut state = state_with(vec![block_with_tasks("gym", 7, 0, 45, &["t1"])]);
        state.cursor = task_focus("gym", "t1");
        let out = screen(&state);
        assert!(out.contains("block 1/1 · task 1"));
    }

    #[test]
    fn wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn slash_menu_lists_every_item() {
        let mut state = state_with(vec![]);
        state.cursor = between(None);
        let mut input = CommandInput::default();
        input.buffer.insert_char('/');
        input.menu = Some(CommandMenu::Slash { selected: 0 });
        state.mode = Mode::TypingCommand(input);

        let out = screen(&state);
        assert!(out.contains("New block"));
        for item in slash::all_items() {
            assert!(out.contains(item.name), "missing {}", item.name);
        }
    }

    #[test]
    fn confirm_delete_names_block() {
        let mut state = state_with(vec![block_with_tasks("gym", 7, 0, 45, &["t1", "t2"])]);
        state.mode = Mode::ConfirmDelete {
            block_id: "gym".into(),
        };
        let out = screen(&state);
        assert!(out.contains("Delete \"gym\" and its 2 task(s)?"));
        assert!(out.contains("DELETE"));
    }

    #[test]
    fn error_popup_is_drawn() {
        let mut state = state_with(vec![]);
        state.error_popup = Some(ErrorPopup {
            title: "Network Error".into(),
            message: "connection refused".into(),
            hint: "Check the backend".into(),
        });
        let out = screen(&state);
        assert!(out.contains("Network Error"));
        assert!(out.contains("connection refused"));
    }

    #[test]
    fn help_lists_global_and_schedule_keys() {
        let mut state = state_with(vec![]);
        state.hints = vec![("Ctrl+q".into(), "quit")];
        state.show_help = true;
        let out = screen(&state);
        assert!(out.contains("Ctrl+q"));
        assert!(out.contains("grab block or task"));
    }
}
