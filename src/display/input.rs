use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Nothing to do.
    None,
    /// Append a character to the pending input.
    Insert(char),
    Backspace,
    /// Discard the pending input (Escape, Ctrl+U).
    Clear,
    /// Submit the pending input (Enter).
    Submit,
    /// Run now with the inputs collected so far (Ctrl+R).
    Run,
    /// Leave the session (Ctrl+C, Ctrl+D).
    Quit,
}

/// Map a terminal key event to an action.
pub fn action_for_key(event: &KeyEvent) -> InputAction {
    if event.kind == KeyEventKind::Release {
        return InputAction::None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c' | 'd') if ctrl => InputAction::Quit,
        KeyCode::Char('r') if ctrl => InputAction::Run,
        KeyCode::Char('u') if ctrl => InputAction::Clear,
        KeyCode::Char(_) if ctrl => InputAction::None,
        KeyCode::Char(c) => InputAction::Insert(c),
        KeyCode::Backspace => InputAction::Backspace,
        KeyCode::Enter => InputAction::Submit,
        KeyCode::Esc => InputAction::Clear,
        _ => InputAction::None,
    }
}

/// A session command typed on the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Reset,
    /// Replace the source with a file's contents.
    Load(PathBuf),
    /// Write the source to a file (default name when absent).
    Save(Option<PathBuf>),
    Quit,
}

/// Parse a session command. Returns `None` for ordinary input, so text that
/// merely starts with `:` is still collected as an answer.
///
/// Accepted forms: `:run`, `:reset`, `:load PATH`, `:save`, `:save PATH`,
/// `:quit` / `:q`.
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.trim().strip_prefix(':')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match (name, arg.is_empty()) {
        ("run", true) => Some(Command::Run),
        ("reset", true) => Some(Command::Reset),
        ("quit" | "q", true) => Some(Command::Quit),
        ("load", false) => Some(Command::Load(PathBuf::from(arg))),
        ("save", true) => Some(Command::Save(None)),
        ("save", false) => Some(Command::Save(Some(PathBuf::from(arg)))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn printable_keys_insert() {
        assert_eq!(
            action_for_key(&key(KeyCode::Char('a'), KeyModifiers::NONE)),
            InputAction::Insert('a')
        );
        assert_eq!(
            action_for_key(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            InputAction::Insert('A')
        );
    }

    #[test]
    fn control_keys() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(action_for_key(&key(KeyCode::Char('c'), ctrl)), InputAction::Quit);
        assert_eq!(action_for_key(&key(KeyCode::Char('d'), ctrl)), InputAction::Quit);
        assert_eq!(action_for_key(&key(KeyCode::Char('r'), ctrl)), InputAction::Run);
        assert_eq!(action_for_key(&key(KeyCode::Char('u'), ctrl)), InputAction::Clear);
        assert_eq!(action_for_key(&key(KeyCode::Char('x'), ctrl)), InputAction::None);
    }

    #[test]
    fn editing_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(action_for_key(&key(KeyCode::Enter, none)), InputAction::Submit);
        assert_eq!(action_for_key(&key(KeyCode::Backspace, none)), InputAction::Backspace);
        assert_eq!(action_for_key(&key(KeyCode::Esc, none)), InputAction::Clear);
        assert_eq!(action_for_key(&key(KeyCode::F(1), none)), InputAction::None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut event = key(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(action_for_key(&event), InputAction::None);
    }

    #[test]
    fn parse_commands() {
        assert_eq!(parse_command(":run"), Some(Command::Run));
        assert_eq!(parse_command("  :reset "), Some(Command::Reset));
        assert_eq!(parse_command(":q"), Some(Command::Quit));
        assert_eq!(
            parse_command(":load demos/greet.py"),
            Some(Command::Load(PathBuf::from("demos/greet.py")))
        );
        assert_eq!(parse_command(":save"), Some(Command::Save(None)));
        assert_eq!(
            parse_command(":save out.py"),
            Some(Command::Save(Some(PathBuf::from("out.py"))))
        );
    }

    #[test]
    fn ordinary_text_is_not_a_command() {
        assert_eq!(parse_command("run"), None);
        assert_eq!(parse_command(":"), None);
        assert_eq!(parse_command(":load"), None);
        assert_eq!(parse_command(":run now"), None);
        assert_eq!(parse_command(":)"), None);
        assert_eq!(parse_command("12:30"), None);
    }
}
