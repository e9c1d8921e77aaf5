use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

pub struct StatusBar<'a> {
    pub hints: &'a [(String, &'static str)],
    pub message: Option<&'a str>,
    pub mode_label: &'a str,
    /// Keys that apply in the current mode, shown instead of the global hints.
    pub mode_hint: Option<&'a str>,
    /// Cursor location, right-aligned.
    pub position: Option<String>,
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            format!(" {} ", self.mode_label),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        spans.push(Span::raw(" "));

        if let Some(msg) = self.message {
            spans.push(Span::styled(msg.to_string(), Style::default().fg(Color::Yellow)));
        } else if let Some(hint) = self.mode_hint {
            spans.push(Span::styled(hint.to_string(), Style::default().fg(Color::Gray)));
        } else {
            for (i, (key, action)) in self.hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled("  ", Style::default().fg(Color::DarkGray)));
                }
                spans.push(Span::styled(
                    format!("[{}]", key),
                    Style::default().fg(Color::Cyan),
                ));
                spans.push(Span::styled(
                    action.to_string(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::DIM),
                ));
            }
        }

        let line = Line::from(spans);
        let left_width = line.width() as u16;
        line.render(area, buf);

        if let Some(position) = self.position {
            let text = format!(" {} ", position);
            let width = text.chars().count() as u16;
            // Hidden rather than drawn over the left side.
            if left_width + width <= area.width {
                let right = Rect::new(area.x + area.width - width, area.y, width, 1);
                Line::from(Span::styled(text, Style::default().fg(Color::Magenta)))
                    .render(right, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| {
                buf.cell((x, 0))
                    .unwrap()
                    .symbol()
                    .chars()
                    .next()
                    .unwrap_or(' ')
            })
            .collect()
    }

    #[test]
    fn status_bar_renders_hints() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        let hints = vec![("Ctrl+q".to_string(), "quit"), ("F1".to_string(), "help")];
        StatusBar {
            hints: &hints,
            message: None,
            mode_label: "NAV",
            mode_hint: None,
            position: None,
        }
        .render(area, &mut buf);

        let content = row(&buf, area.width);
        assert!(content.contains("NAV"));
        assert!(content.contains("[Ctrl+q]"));
        assert!(content.contains("quit"));
        assert!(content.contains("[F1]"));
    }

    #[test]
    fn message_replaces_hints() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        let hints = vec![("Ctrl+q".to_string(), "quit")];
        StatusBar {
            hints: &hints,
            message: Some("Loading today's plan..."),
            mode_label: "NAV",
            mode_hint: None,
            position: None,
        }
        .render(area, &mut buf);

        let content = row(&buf, area.width);
        assert!(content.contains("Loading today's plan..."));
        assert!(!content.contains("[Ctrl+q]"));
    }

    #[test]
    fn mode_hint_replaces_hints() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        StatusBar {
            hints: &[],
            message: None,
            mode_label: "GRAB",
            mode_hint: Some("arrows move, Enter drops"),
            position: None,
        }
        .render(area, &mut buf);

        let content = row(&buf, area.width);
        assert!(content.contains("GRAB"));
        assert!(content.contains("Enter drops"));
    }

    #[test]
    fn position_renders_at_right_edge() {
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);

        StatusBar {
            hints: &[],
            message: None,
            mode_label: "NAV",
            mode_hint: None,
            position: Some("block 2/3".into()),
        }
        .render(area, &mut buf);

        let content = row(&buf, area.width);
        assert!(content.starts_with(" NAV "));
        assert!(content.ends_with(" block 2/3 "));
    }

    #[test]
    fn position_hidden_when_it_would_overlap() {
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);

        StatusBar {
            hints: &[],
            message: Some("Saved the whole day"),
            mode_label: "NAV",
            mode_hint: None,
            position: Some("block 2/3".into()),
        }
        .render(area, &mut buf);

        let content = row(&buf, area.width);
        assert!(!content.contains("block"));
        assert!(content.contains("Saved"));
    }
}
