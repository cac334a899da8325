use assistant_core::{ChatClient, ChatError, Conversation, Outcome};
use tokio::task::JoinHandle;

/// Frames of the spinner shown next to the typing indicator.
pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,

    // Chat state
    pub conversation: Conversation,
    pub client: ChatClient,
    pub send_task: Option<JoinHandle<Outcome>>,
    pub priming_task: Option<JoinHandle<Result<Option<String>, ChatError>>>,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Transcript scrolling
    pub scroll: u16,
    pub max_scroll: u16, // updated during render
    pub follow_bottom: bool,
    pub chat_height: u16,

    // Animation state
    pub animation_frame: u8,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        Self {
            should_quit: false,
            conversation: Conversation::new(),
            client,
            send_task: None,
            priming_task: None,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            max_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            animation_frame: 0,
        }
    }

    /// Fetch the initial business context in the background.
    pub fn start_priming(&mut self) {
        let client = self.client.clone();
        self.priming_task = Some(tokio::spawn(async move { client.prime().await }));
    }

    /// Send the current input. Whitespace-only input, or input typed while a
    /// reply is still pending, stays in the box untouched.
    pub fn submit(&mut self) {
        let Some(request) = self.conversation.begin_send(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.follow_bottom = true;

        let client = self.client.clone();
        self.send_task = Some(tokio::spawn(async move { client.send(&request).await }));
    }

    /// Collect any background request that has completed.
    pub async fn poll_tasks(&mut self) {
        if self.send_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.send_task.take() {
                let outcome = task
                    .await
                    .unwrap_or_else(|e| Err(ChatError::Transport(e.to_string())));
                self.conversation.finish(outcome);
                self.follow_bottom = true;
            }
        }

        if self.priming_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(task) = self.priming_task.take() {
                let result = task
                    .await
                    .unwrap_or_else(|e| Err(ChatError::Transport(e.to_string())));
                self.conversation.apply_priming(result);
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_typing() {
            self.animation_frame = (self.animation_frame + 1) % SPINNER.len() as u8;
        }
    }

    pub fn spinner(&self) -> char {
        SPINNER[self.animation_frame as usize % SPINNER.len()]
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
        if self.scroll >= self.max_scroll {
            self.follow_bottom = true;
        }
    }

    pub fn page(&self) -> u16 {
        self.chat_height.max(1)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(task) = &self.send_task {
            task.abort();
        }
        if let Some(task) = &self.priming_task {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::Sender;

    fn app() -> App {
        App::new(ChatClient::new("http://127.0.0.1:1/chat"))
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("aéb", 0), 0);
        assert_eq!(char_to_byte_index("aéb", 2), 3);
        assert_eq!(char_to_byte_index("aéb", 10), 4);
    }

    #[test]
    fn test_editing_keeps_cursor_on_char_boundaries() {
        let mut app = app();
        for c in "₹500".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.cursor, 4);

        app.cursor_home();
        app.cursor_right();
        app.backspace();
        assert_eq!(app.input, "500");
        assert_eq!(app.cursor, 0);

        app.delete();
        assert_eq!(app.input, "00");

        app.cursor_end();
        app.cursor_right();
        assert_eq!(app.cursor, 2);
        app.insert_char('!');
        assert_eq!(app.input, "00!");
    }

    #[test]
    fn test_scroll_follow_bottom() {
        let mut app = app();
        app.max_scroll = 10;
        app.scroll = 10;
        app.scroll_up(3);
        assert_eq!(app.scroll, 7);
        assert!(!app.follow_bottom);

        app.scroll_down(50);
        assert_eq!(app.scroll, 10);
        assert!(app.follow_bottom);
    }

    #[test]
    fn test_spinner_only_moves_while_typing() {
        let mut app = app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }

    #[tokio::test]
    async fn test_submit_whitespace_keeps_input() {
        let mut app = app();
        app.input = "   ".to_string();
        app.submit();
        assert_eq!(app.input, "   ");
        assert!(app.send_task.is_none());
        assert_eq!(app.conversation.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_appends_and_rejects_second_send() {
        let mut app = app();
        app.input = "first".to_string();
        app.cursor = 5;
        app.submit();

        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert!(app.send_task.is_some());
        assert!(app.conversation.is_typing());
        let last = app.conversation.last().unwrap();
        assert_eq!(last.sender, Sender::User);
        assert_eq!(last.text, "first");

        app.input = "second".to_string();
        app.submit();
        assert_eq!(app.input, "second");
        assert_eq!(app.conversation.messages().len(), 2);

        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }
}
