use std::fmt;

/// Single-line (or note) text input with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBuffer {
    pub chars: Vec<char>,
    pub cursor: usize,
}

impl EditBuffer {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete_word_back(&mut self) {
        let end = self.cursor;
        self.move_word_left();
        self.chars.drain(self.cursor..end);
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn move_word_left(&mut self) {
        while self.cursor > 0 && self.chars[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
        while self.cursor > 0 && !self.chars[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
    }

    pub fn move_word_right(&mut self) {
        let len = self.chars.len();
        while self.cursor < len && !self.chars[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
        while self.cursor < len && self.chars[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
    }

    /// The last whitespace-separated token when it starts with `sigil`:
    /// `(position of the sigil, text after it)`.
    pub fn trailing_tag(&self, sigil: char) -> Option<(usize, String)> {
        let start = self
            .chars
            .iter()
            .rposition(|c| c.is_whitespace())
            .map(|p| p + 1)
            .unwrap_or(0);
        if self.chars.get(start) != Some(&sigil) {
            return None;
        }
        Some((start, self.chars[start + 1..].iter().collect()))
    }

    /// Text with any trailing `sigil` token removed, trimmed.
    pub fn text_without_tag(&self, sigil: char) -> String {
        let text: String = match self.trailing_tag(sigil) {
            Some((start, _)) => self.chars[..start].iter().collect(),
            None => self.chars.iter().collect(),
        };
        text.trim().to_string()
    }
}

impl fmt::Display for EditBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_at_end() {
        let buf = EditBuffer::new("focus");
        assert_eq!(buf.to_string(), "focus");
        assert_eq!(buf.cursor, 5);
    }

    #[test]
    fn insert_mid_text() {
        let mut buf = EditBuffer::new("stndup");
        buf.cursor = 1;
        buf.insert_char('a');
        assert_eq!(buf.to_string(), "standup");
        assert_eq!(buf.cursor, 2);
    }

    #[test]
    fn delete_back_at_start_is_noop() {
        let mut buf = EditBuffer::new("gym");
        buf.cursor = 0;
        buf.delete_back();
        assert_eq!(buf.to_string(), "gym");
        assert_eq!(buf.cursor, 0);
    }

    #[test]
    fn delete_forward_removes_under_cursor() {
        let mut buf = EditBuffer::new("xgym");
        buf.cursor = 0;
        buf.delete_forward();
        assert_eq!(buf.to_string(), "gym");
    }

    #[test]
    fn delete_word_back_removes_previous_word() {
        let mut buf = EditBuffer::new("review pull request");
        buf.delete_word_back();
        assert_eq!(buf.to_string(), "review pull ");
        assert_eq!(buf.cursor, 12);
    }

    #[test]
    fn word_jumps() {
        let mut buf = EditBuffer::new("plan the week");
        buf.move_home();
        buf.move_word_right();
        assert_eq!(buf.cursor, 5);
        buf.move_end();
        buf.move_word_left();
        assert_eq!(buf.cursor, 9);
    }

    #[test]
    fn unicode_is_char_indexed() {
        let mut buf = EditBuffer::new("café");
        buf.delete_back();
        assert_eq!(buf.to_string(), "caf");
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn trailing_tag_found_at_end() {
        let buf = EditBuffer::new("water plants @gar");
        assert_eq!(buf.trailing_tag('@'), Some((13, "gar".to_string())));
        assert_eq!(buf.text_without_tag('@'), "water plants");
    }

    #[test]
    fn trailing_tag_alone() {
        let buf = EditBuffer::new("@");
        assert_eq!(buf.trailing_tag('@'), Some((0, String::new())));
        assert_eq!(buf.text_without_tag('@'), "");
    }

    #[test]
    fn trailing_tag_absent_when_not_last_token() {
        let buf = EditBuffer::new("email @bob about it");
        assert_eq!(buf.trailing_tag('@'), None);
        assert_eq!(buf.text_without_tag('@'), "email @bob about it");
    }

    #[test]
    fn newline_in_notes() {
        let mut buf = EditBuffer::new("line");
        buf.insert_newline();
        buf.insert_char('2');
        assert_eq!(buf.to_string(), "line\n2");
    }
}
