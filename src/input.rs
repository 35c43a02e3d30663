use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Next,
    Prev,
}

/// What a key press asks the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The input field now holds this text.
    Input(String),
    BackspaceOnEmpty,
    Reset,
    CycleDuration(Cycle),
    Quit,
}

/// Translate a terminal key press into a command, given the current contents
/// of the input field. Returns `None` for keys the test does not use.
pub fn translate_key(key: &KeyEvent, raw_input: &str) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('c') if ctrl => Some(Command::Quit),
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => None,
        KeyCode::Char(c) => {
            let mut value = String::with_capacity(raw_input.len() + c.len_utf8());
            value.push_str(raw_input);
            value.push(c);
            Some(Command::Input(value))
        }
        KeyCode::Backspace if raw_input.is_empty() => Some(Command::BackspaceOnEmpty),
        KeyCode::Backspace => {
            let mut value = raw_input.to_string();
            value.pop();
            Some(Command::Input(value))
        }
        KeyCode::Tab => Some(Command::Reset),
        KeyCode::Right => Some(Command::CycleDuration(Cycle::Next)),
        KeyCode::Left => Some(Command::CycleDuration(Cycle::Prev)),
        _ => None,
    }
}
