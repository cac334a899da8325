use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use assistant_core::{Message, Sender};
use crate::app::App;

const PLACEHOLDER: &str = "Ask about business help, schemes...";

/// Width of the avatar column ("U  " / "B  ")
const AVATAR_WIDTH: usize = 3;

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            // First word on line
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            // Word fits on current line
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            // Word doesn't fit, start new line
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Cyan),
        Sender::Assistant => Style::default().fg(Color::Green),
    }
}

fn avatar(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "U",
        Sender::Assistant => "B",
    }
}

/// One message as pre-wrapped lines: avatar on the first line, text indented
/// under it, blank line after.
fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let text_width = width.saturating_sub(AVATAR_WIDTH).max(1);
    let style = sender_style(message.sender);
    let mut lines = Vec::new();

    for (i, chunk) in wrap_text_to_width(&message.text, text_width).into_iter().enumerate() {
        let gutter = if i == 0 {
            Span::styled(
                format!("{:<width$}", avatar(message.sender), width = AVATAR_WIDTH),
                style.add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(" ".repeat(AVATAR_WIDTH))
        };
        lines.push(Line::from(vec![gutter, Span::styled(chunk, style)]));
    }
    lines.push(Line::default());
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.conversation.is_open() {
        render_chat(app, frame, body_area);
    } else {
        render_closed(frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let context = match app.conversation.context() {
        Some(token) => format!(" [{}]", token),
        None => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" Business Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(context, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.conversation.is_open() {
        " Enter send | Esc close | Up/Down/PgUp/PgDn scroll | Ctrl+C quit "
    } else {
        " Enter open chat | q quit "
    };
    let footer = Paragraph::new(Span::styled(hints, Style::default().fg(Color::White)))
        .style(Style::default().bg(Color::Blue));
    frame.render_widget(footer, area);
}

fn render_closed(frame: &mut Frame, area: Rect) {
    let [_, hint_area, _] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let hint = Paragraph::new(Line::from(vec![
        Span::raw("Press "),
        Span::styled("Enter", Style::default().fg(Color::Yellow).bold()),
        Span::raw(" to chat with the Business Assistant"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hint, hint_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Inner size minus borders
    let inner_width = chat_area.width.saturating_sub(2) as usize;
    app.chat_height = chat_area.height.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.conversation.messages() {
        lines.extend(message_lines(message, inner_width));
    }

    if app.conversation.is_typing() {
        let style = sender_style(Sender::Assistant);
        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", "B", width = AVATAR_WIDTH), style.add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("... {}", app.spinner()),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    let total_lines = lines.len().min(u16::MAX as usize) as u16;
    app.max_scroll = total_lines.saturating_sub(app.chat_height);
    if app.follow_bottom {
        app.scroll = app.max_scroll;
    } else {
        app.scroll = app.scroll.min(app.max_scroll);
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Business Assistant ")
        .title_bottom(Line::from(" Here to help your business grow ").alignment(Alignment::Right));

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .scroll((app.scroll, 0));
    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.conversation.is_in_flight() {
        Color::DarkGray
    } else {
        Color::Yellow
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ");

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Scroll horizontally to keep the cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = app.input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(input_block), area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}
