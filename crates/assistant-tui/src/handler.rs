use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.conversation.is_open() {
        handle_open(app, key);
    } else {
        handle_closed(app, key);
    }
}

fn handle_closed(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char('o') => app.conversation.open(),
        _ => {}
    }
}

fn handle_open(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.conversation.close(),
        KeyCode::Enter => app.submit(),

        // Editing
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),

        // Transcript scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => {
            let page = app.page();
            app.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.page();
            app.scroll_down(page);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::ChatClient;

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:1/chat"))
    }

    #[test]
    fn test_closed_widget_opens_and_quits() {
        let mut app = app();
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.conversation.is_open());
        assert!(app.input.is_empty());

        press(&mut app, KeyCode::Enter);
        assert!(app.conversation.is_open());

        press(&mut app, KeyCode::Esc);
        assert!(!app.conversation.is_open());
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_q_in_open_widget_does_not_quit() {
        let mut app = app();
        app.conversation.open();
        for c in "quit".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.input, "quit");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = app();
        app.conversation.open();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_enter_on_blank_input_sends_nothing() {
        let mut app = app();
        app.conversation.open();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.conversation.messages().len(), 1);
        assert!(app.send_task.is_none());
    }
}
