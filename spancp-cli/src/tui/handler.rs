use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press does to the destination line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    ClearToStart,
    Complete,
    Submit,
    Cancel,
    Ignore,
}

/// Map key events to line edits
pub fn handle_key(key: KeyEvent) -> EditAction {
    if key.kind == KeyEventKind::Release {
        return EditAction::Ignore;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => EditAction::Cancel,
        KeyCode::Char('a') if ctrl => EditAction::Home,
        KeyCode::Char('e') if ctrl => EditAction::End,
        KeyCode::Char('u') if ctrl => EditAction::ClearToStart,
        KeyCode::Char(_) if ctrl => EditAction::Ignore,
        KeyCode::Char(c) => EditAction::Insert(c),
        KeyCode::Esc => EditAction::Cancel,
        KeyCode::Enter => EditAction::Submit,
        KeyCode::Tab => EditAction::Complete,
        KeyCode::Backspace => EditAction::Backspace,
        KeyCode::Delete => EditAction::Delete,
        KeyCode::Left => EditAction::Left,
        KeyCode::Right => EditAction::Right,
        KeyCode::Home => EditAction::Home,
        KeyCode::End => EditAction::End,
        _ => EditAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_cancel_keys() {
        assert_eq!(
            handle_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            EditAction::Cancel
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            EditAction::Cancel
        );
        assert_eq!(
            handle_key(press(KeyCode::Esc, KeyModifiers::NONE)),
            EditAction::Cancel
        );
    }

    #[test]
    fn test_typing_and_completion() {
        assert_eq!(
            handle_key(press(KeyCode::Char('D'), KeyModifiers::SHIFT)),
            EditAction::Insert('D')
        );
        assert_eq!(
            handle_key(press(KeyCode::Tab, KeyModifiers::NONE)),
            EditAction::Complete
        );
        assert_eq!(
            handle_key(press(KeyCode::Enter, KeyModifiers::NONE)),
            EditAction::Submit
        );
    }

    #[test]
    fn test_release_is_ignored() {
        let mut key = press(KeyCode::Char('x'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(handle_key(key), EditAction::Ignore);
    }
}
