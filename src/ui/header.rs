use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

pub struct Header<'a> {
    pub date: &'a str,
    pub block_count: usize,
    /// Sum of block durations in minutes.
    pub planned_minutes: u32,
}

impl<'a> Widget for Header<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = Span::styled(
            " dayplan ",
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

        let summary = Span::styled(
            format!(
                " [{} blocks, {}h{:02}m] ",
                self.block_count,
                self.planned_minutes / 60,
                self.planned_minutes % 60
            ),
            Style::default().fg(Color::Cyan).bg(Color::DarkGray),
        );

        let spacer_len = area.width.saturating_sub(
            title.width() as u16 + summary.width() as u16 + self.date.len() as u16 + 1,
        );
        let bg = Style::default().bg(Color::DarkGray);
        let spacer = Span::styled(" ".repeat(spacer_len as usize), bg);

        let date = Span::styled(
            format!("{} ", self.date),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let line = Line::from(vec![title, summary, spacer, date]);
        line.render(area, buf);
    }
}
