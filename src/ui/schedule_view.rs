use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::api::types::{format_hhmm, time_from_minutes, Block, BlockType, Task};
use crate::app::schedule::Schedule;
use crate::app::{CommandInput, Cursor, Focus, Mode, TaskInput};
use crate::command;
use crate::edit_buffer::EditBuffer;

pub struct ScheduleView<'a> {
    pub schedule: &'a Schedule,
    pub cursor: &'a Cursor,
    pub mode: &'a Mode,
    pub loading: bool,
}

fn type_color(block_type: BlockType) -> Color {
    match block_type {
        BlockType::DeepWork => Color::Magenta,
        BlockType::Break => Color::Green,
        BlockType::Meeting => Color::Blue,
        BlockType::Health => Color::LightGreen,
        BlockType::Exercise => Color::Yellow,
        BlockType::Admin => Color::Gray,
        BlockType::Personal => Color::Cyan,
        BlockType::Routine => Color::LightBlue,
        BlockType::Event => Color::LightRed,
    }
}

fn selected_style() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

/// Buffer text with a block cursor drawn at the edit position.
pub(super) fn buffer_spans(buffer: &EditBuffer, style: Style) -> Vec<Span<'static>> {
    let before: String = buffer.chars[..buffer.cursor].iter().collect();
    let at = buffer.chars.get(buffer.cursor).copied().unwrap_or(' ');
    let after: String = buffer
        .chars
        .iter()
        .skip(buffer.cursor + 1)
        .collect();
    vec![
        Span::styled(before, style),
        Span::styled(at.to_string(), Style::default().fg(Color::Black).bg(Color::White)),
        Span::styled(after, style),
    ]
}

fn render_centered_message(msg: &str, area: Rect, buf: &mut Buffer) {
    if area.height > 0 {
        let line = Line::styled(msg, Style::default().fg(Color::DarkGray));
        let y = area.y + area.height / 2;
        line.render(Rect::new(area.x, y, area.width, 1), buf);
    }
}

impl<'a> ScheduleView<'a> {
    fn block_grabbed(&self, block_id: &str) -> bool {
        match self.mode {
            Mode::GrabbedBlock { block_id: id, .. } | Mode::ConfirmMove { block_id: id, .. } => {
                id == block_id
            }
            _ => false,
        }
    }

    fn task_grabbed(&self, task_id: &str) -> bool {
        match self.mode {
            Mode::GrabbedTask { task_id: id, .. } => id == task_id,
            Mode::GrabbedTasks(grab) => grab.tasks.iter().any(|t| t == task_id),
            _ => false,
        }
    }

    fn between_rows(&self, after: Option<&str>, rows: &mut Vec<Line<'static>>) -> bool {
        let selected = matches!(
            self.cursor,
            Cursor::Between { after: a } if a.as_deref() == after
        );
        if !selected {
            rows.push(Line::styled("  ·", Style::default().fg(Color::DarkGray)));
            return false;
        }
        match self.mode {
            Mode::TypingCommand(input) => command_rows(input, rows),
            _ => rows.push(Line::from(vec![
                Span::styled("▎", Style::default().fg(Color::Cyan).bg(Color::DarkGray)),
                Span::styled(" + type a command, / for the menu", selected_style()),
            ])),
        }
        true
    }

    fn header_row(&self, block: &Block) -> Line<'static> {
        let selected = matches!(
            self.cursor,
            Cursor::Block { id, focus: Focus::Header } if *id == block.id
        );
        let grabbed = self.block_grabbed(&block.id);
        let base = if selected {
            selected_style()
        } else {
            Style::default().fg(Color::Gray)
        };
        let base = if block.completed {
            base.add_modifier(Modifier::CROSSED_OUT)
        } else {
            base
        };

        let marker = if grabbed {
            Span::styled("⇅", Style::default().fg(Color::Yellow).bg(Color::DarkGray))
        } else if selected {
            Span::styled("▎", Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        } else {
            Span::raw(" ")
        };
        let range = format!(
            " {}-{} ",
            format_hhmm(block.time),
            format_hhmm(time_from_minutes(block.end_minutes()))
        );
        let kind = Span::styled(
            format!("{:<9} ", block.block_type.label()),
            base.fg(type_color(block.block_type)),
        );
        let mut spans = vec![
            marker,
            Span::styled(range, base.add_modifier(Modifier::BOLD)),
            kind,
            Span::styled(block.title.clone(), base),
        ];
        if !block.tasks.is_empty() {
            let done = block.tasks.iter().filter(|t| t.completed).count();
            spans.push(Span::styled(
                format!(" [{}/{}]", done, block.tasks.len()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if block.completed {
            spans.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
        }
        if block.metadata.zoom_link.is_some() {
            spans.push(Span::styled(" [zoom]", Style::default().fg(Color::Blue)));
        }
        Line::from(spans)
    }

    fn task_row(&self, block: &Block, task: &Task) -> Line<'static> {
        let selected = matches!(
            self.cursor,
            Cursor::Block { id, focus: Focus::Task(t) } if *id == block.id && *t == task.id
        );
        let style = if selected {
            selected_style()
        } else {
            Style::default().fg(Color::Gray)
        };
        let bullet = match (self.task_grabbed(&task.id), task.completed) {
            (true, _) => Span::styled("≡ ", Style::default().fg(Color::Yellow)),
            (false, true) => Span::styled("● ", Style::default().fg(Color::Green)),
            (false, false) => Span::styled("○ ", style),
        };
        let title_style = if task.completed {
            style.add_modifier(Modifier::DIM)
        } else {
            style
        };
        Line::from(vec![
            Span::styled("      ", style),
            bullet,
            Span::styled(task.title.clone(), title_style),
            Span::styled(
                format!(" ({}m)", task.duration),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }

    /// Input slot inside `block` when the cursor sits on it.
    fn input_slot(&self, block: &Block) -> Option<Option<usize>> {
        match self.cursor {
            Cursor::Block {
                id,
                focus: Focus::Input { after },
            } if *id == block.id => Some(*after),
            _ => None,
        }
    }

    fn input_rows(&self, rows: &mut Vec<Line<'static>>) {
        match self.mode {
            Mode::TypingTask(input) => task_input_rows(input, rows),
            _ => rows.push(Line::from(vec![
                Span::styled("▎", Style::default().fg(Color::Cyan).bg(Color::DarkGray)),
                Span::styled("     + add a task, @ for a project", selected_style()),
            ])),
        }
    }
}

fn command_rows(input: &CommandInput, rows: &mut Vec<Line<'static>>) {
    let style = selected_style();
    let mut spans = vec![Span::styled("▎ > ", style)];
    spans.extend(buffer_spans(&input.buffer, style));
    rows.push(Line::from(spans));

    let hint = match (&input.preview, &input.suggestion) {
        (Some(intent), _) => Some(format!("    ↳ {}", command::describe(intent))),
        (None, Some(m)) => Some(format!("    ↳ {}  [Tab]", m.preview_text)),
        (None, None) => None,
    };
    if let Some(hint) = hint {
        rows.push(Line::styled(hint, Style::default().fg(Color::Green)));
    }
}

fn task_input_rows(input: &TaskInput, rows: &mut Vec<Line<'static>>) {
    let style = selected_style();
    let mut spans = vec![Span::styled("▎     + ", style)];
    spans.extend(buffer_spans(&input.buffer, style));
    rows.push(Line::from(spans));

    for (i, m) in input.suggestions.iter().enumerate() {
        let style = if i == input.selected {
            Style::default().fg(Color::White).bg(Color::Blue)
        } else {
            Style::default().fg(Color::Gray)
        };
        rows.push(Line::from(vec![
            Span::raw("        "),
            Span::styled(m.preview_text.clone(), style),
        ]));
    }
}

impl<'a> Widget for ScheduleView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.loading {
            render_centered_message(" Loading today's plan...", area, buf);
            return;
        }

        // Phase 1: build rows, remembering where the cursor is
        let mut rows: Vec<Line<'static>> = Vec::new();
        let mut selected_row = 0;

        if self.between_rows(None, &mut rows) {
            selected_row = 0;
        }
        if self.schedule.is_empty() {
            rows.push(Line::styled(
                "  No blocks yet. Type a command above, e.g. `dw 9` or `mt standup @10 30m`.",
                Style::default().fg(Color::DarkGray),
            ));
        }

        for block in self.schedule.iter() {
            let header_row = rows.len();
            rows.push(self.header_row(block));
            if matches!(self.cursor, Cursor::Block { id, .. } if *id == block.id) {
                selected_row = header_row;
            }

            if let Some(note) = &block.note {
                let first = note.lines().next().unwrap_or_default();
                rows.push(Line::styled(
                    format!("      ✎ {}", first),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ));
            }

            let slot = self.input_slot(block);
            if slot == Some(None) {
                selected_row = rows.len();
                self.input_rows(&mut rows);
            }
            for (i, task) in block.tasks.iter().enumerate() {
                if matches!(
                    self.cursor,
                    Cursor::Block { id, focus: Focus::Task(t) } if *id == block.id && *t == task.id
                ) {
                    selected_row = rows.len();
                }
                rows.push(self.task_row(block, task));
                if slot == Some(Some(i)) {
                    selected_row = rows.len();
                    self.input_rows(&mut rows);
                }
            }

            let slot_row = rows.len();
            if self.between_rows(Some(&block.id), &mut rows) {
                selected_row = slot_row;
            }
        }

        // Phase 2: scroll so the cursor row stays near the middle
        let viewport_height = area.height as usize;
        let half = viewport_height / 2;
        let scroll_offset = if selected_row > half {
            (selected_row - half).min(rows.len().saturating_sub(viewport_height))
        } else {
            0
        };

        // Phase 3: draw
        for (i, row) in rows.into_iter().skip(scroll_offset).enumerate() {
            if i >= viewport_height {
                break;
            }
            let y = area.y + i as u16;
            row.render(Rect::new(area.x, y, area.width, 1), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_helpers::*;

    fn read_line(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| {
                buf.cell((x, y))
                    .unwrap()
                    .symbol()
                    .chars()
                    .next()
                    .unwrap_or(' ')
            })
            .collect()
    }

    fn all_lines(buf: &Buffer, area: Rect) -> Vec<String> {
        (0..area.height)
            .map(|y| read_line(buf, y, area.width))
            .collect()
    }

    fn render(
        schedule: &Schedule,
        cursor: &Cursor,
        mode: &Mode,
        area: Rect,
    ) -> Vec<String> {
        let mut buf = Buffer::empty(area);
        ScheduleView {
            schedule,
            cursor,
            mode,
            loading: false,
        }
        .render(area, &mut buf);
        all_lines(&buf, area)
    }

    #[test]
    fn loading_shows_message() {
        let area = Rect::new(0, 0, 50, 5);
        let mut buf = Buffer::empty(area);
        let schedule = schedule_of(vec![]);
        ScheduleView {
            schedule: &schedule,
            cursor: &Cursor::None,
            mode: &Mode::Navigating,
            loading: true,
        }
        .render(area, &mut buf);
        assert!(all_lines(&buf, area).iter().any(|l| l.contains("Loading")));
    }

    #[test]
    fn blocks_render_time_range_type_and_tasks() {
        let schedule = schedule_of(vec![
            block_with_tasks("focus", 9, 0, 90, &["write intro"]),
            block("lunch", 12, 0, 45),
        ]);
        let lines = render(
            &schedule,
            &header("focus"),
            &Mode::Navigating,
            Rect::new(0, 0, 60, 10),
        );
        assert!(lines
            .iter()
            .any(|l| l.contains("09:00-10:30") && l.contains("Deep work") && l.contains("[0/1]")));
        assert!(lines.iter().any(|l| l.contains("○ write intro (15m)")));
        assert!(lines.iter().any(|l| l.contains("12:00-12:45")));
    }

    #[test]
    fn selected_between_slot_shows_prompt() {
        let schedule = schedule_of(vec![block("a", 9, 0, 60)]);
        let lines = render(
            &schedule,
            &between(Some("a")),
            &Mode::Navigating,
            Rect::new(0, 0, 60, 6),
        );
        assert!(lines.iter().any(|l| l.contains("type a command")));
    }

    #[test]
    fn typing_command_shows_preview() {
        let schedule = schedule_of(vec![]);
        let mut input = CommandInput::default();
        for c in "ad 930".chars() {
            input.buffer.insert_char(c);
        }
        input.preview = command::parse("ad 930").map(|c| c.intent());
        let lines = render(
            &schedule,
            &between(None),
            &Mode::TypingCommand(input),
            Rect::new(0, 0, 60, 6),
        );
        assert!(lines.iter().any(|l| l.contains("> ad 930")));
        assert!(lines.iter().any(|l| l.contains("Admin: Admin at 09:30 (30m)")));
    }

    #[test]
    fn grabbed_tasks_are_marked() {
        let schedule = schedule_of(vec![block_with_tasks("a", 9, 0, 60, &["t1", "t2"])]);
        let mode = Mode::GrabbedTask {
            task_id: "t2".into(),
            origin_block: "a".into(),
            origin_index: 1,
        };
        let lines = render(
            &schedule,
            &task_focus("a", "t2"),
            &mode,
            Rect::new(0, 0, 60, 8),
        );
        assert!(lines.iter().any(|l| l.contains("≡ t2")));
        assert!(lines.iter().any(|l| l.contains("○ t1")));
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let blocks = (0..12)
            .map(|i| block(&format!("b{:02}", i), 6 + i, 0, 30))
            .collect();
        let schedule = schedule_of(blocks);
        let lines = render(
            &schedule,
            &header("b11"),
            &Mode::Navigating,
            Rect::new(0, 0, 60, 6),
        );
        assert!(lines.iter().any(|l| l.contains("17:00-17:30")));
    }
}
