use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which bindings are live, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyContext {
    Loading,
    Error,
    FreeText,
    List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    Acknowledge,
    Cancel,
    Commit,
    Edit(KeyEvent),
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Select,
    Back,
    ManualEntry,
    Refresh,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

pub fn action_for(key: KeyEvent, context: KeyContext) -> Option<Action> {
    if is_ctrl_c(&key) {
        return Some(Action::Quit);
    }

    match context {
        KeyContext::Loading => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        },
        KeyContext::Error => match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(Action::Acknowledge),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        },
        KeyContext::FreeText => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Commit),
            _ => Some(Action::Edit(key)),
        },
        KeyContext::List => {
            // Ctrl/Alt chords have no list binding
            if key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            {
                return None;
            }
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
                KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
                KeyCode::PageUp => Some(Action::PageUp),
                KeyCode::PageDown => Some(Action::PageDown),
                KeyCode::Home | KeyCode::Char('g') => Some(Action::Home),
                KeyCode::End | KeyCode::Char('G') => Some(Action::End),
                KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Some(Action::Select),
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                    Some(Action::Back)
                }
                KeyCode::Char('m') => Some(Action::ManualEntry),
                KeyCode::Char('r') => Some(Action::Refresh),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            }
        }
    }
}
