/// Editable single line of text with a cursor, counted in chars
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    /// Pre-filled with `text`, cursor at the end
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, text: &str) {
        *self = Self::new(text);
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Drop everything before the cursor (Ctrl+U)
    pub fn clear_to_start(&mut self) {
        self.chars.drain(..self.cursor);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_text_is_editable() {
        let mut line = LineBuffer::new("/mnt/disk1");
        assert_eq!(line.cursor(), 10);

        line.backspace();
        line.insert('2');
        assert_eq!(line.text(), "/mnt/disk2");
    }

    #[test]
    fn test_cursor_movement_and_delete() {
        let mut line = LineBuffer::new("abc");
        line.home();
        line.delete();
        assert_eq!(line.text(), "bc");

        line.right();
        line.insert('X');
        assert_eq!(line.text(), "bXc");

        line.end();
        line.right();
        assert_eq!(line.cursor(), 3);
        line.left();
        line.clear_to_start();
        assert_eq!(line.text(), "c");
        assert_eq!(line.cursor(), 0);
    }

    #[test]
    fn test_multibyte_chars() {
        let mut line = LineBuffer::new("Диск");
        line.backspace();
        assert_eq!(line.text(), "Дис");
        line.home();
        line.backspace();
        assert_eq!(line.text(), "Дис");
    }
}
