//! Form view: lays out and draws every widget of the sender.
//!
//! Pure rendering: takes the form state and the session and draws them into
//! a ratatui `Frame`. The modal dialog, when present, is drawn last on top.

use std::rc::Rc;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use serjson_core::errors::Severity;
use serjson_core::session::Session;

use crate::app::{App, Dialog, Field};


/// Everything a frame needs, borrowed from the runner.
pub struct RenderState<'a> {
    pub app: &'a App,
    pub session: &'a Session,
}


/// Label of the open/close button.
pub fn toggle_label(open: bool) -> &'static str {
    if open {
        "Close Port"
    } else {
        "Open Port"
    }
}


/// Split the screen into the form's rows.
fn form_rows(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // menu bar
            Constraint::Length(3), // port selector
            Constraint::Length(3), // baud rate
            Constraint::Length(1), // open / close
            Constraint::Length(3), // key + value
            Constraint::Length(1), // modify
            Constraint::Length(4), // preview
            Constraint::Length(1), // send
            Constraint::Min(4),    // receive log
            Constraint::Length(1), // status bar
        ])
        .split(area)
}


/// How far the receive log can scroll back on a screen of size `area`.
pub fn receive_scroll_limit(area: Rect, text: &str) -> usize {
    let pane = form_rows(area)[8];
    let rows = wrapped_row_count(text, pane.width.saturating_sub(2));
    max_scroll_offset(rows, pane.height) as usize
}


/// Render the full form.
pub fn render_frame(frame: &mut Frame, state: &RenderState) {
    let chunks = form_rows(frame.area());

    let app = state.app;
    let session = state.session;

    render_menu_bar(frame, chunks[0]);
    render_port_selector(frame, chunks[1], app, session.is_open());
    render_text_field(frame, chunks[2], "Baudrate", app, Field::Baud);
    render_button(frame, chunks[3], toggle_label(session.is_open()), app.focus == Field::OpenButton);

    let kv = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(10)])
        .split(chunks[4]);
    render_key_selector(frame, kv[0], app);
    render_text_field(frame, kv[1], "Value", app, Field::Value);

    render_button(frame, chunks[5], "Modify JSON", app.focus == Field::ModifyButton);
    render_preview(frame, chunks[6], &session.preview());
    render_button(frame, chunks[7], "Send JSON", app.focus == Field::SendButton);
    render_receive(frame, chunks[8], session.receive_text(), app.receive_scroll_back);
    render_status_bar(frame, chunks[9], state);

    if let Some(dialog) = app.dialog() {
        let area = frame.area();
        render_dialog(frame, area, dialog);
    }
}


fn render_menu_bar(frame: &mut Frame, area: Rect) {
    let items = vec![
        Span::styled(" SerJSON ", Style::default().bold()),
        Span::raw("  F2 open/close  F5 rescan  F9 send  Ctrl-L clear  Ctrl-Q quit"),
    ];
    let menu = Paragraph::new(Line::from(items)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(menu, area);
}


fn field_block(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(format!(" {} ", title))
}


fn render_port_selector(frame: &mut Frame, area: Rect, app: &App, open: bool) {
    let focused = app.focus == Field::Port;
    let text = match app.selected_port() {
        Some(port) if app.ports().len() > 1 => format!("< {} >", port),
        Some(port) => port.to_string(),
        None => "(no serial ports found, F5 to rescan)".to_string(),
    };
    let title = if open { "Serial port (open)" } else { "Serial port" };
    frame.render_widget(Paragraph::new(text).block(field_block(title, focused)), area);
}


fn render_key_selector(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Field::Key;
    let text = format!("< {} >", app.selected_key().wire_name());
    frame.render_widget(Paragraph::new(text).block(field_block("Key", focused)), area);
}


fn render_text_field(frame: &mut Frame, area: Rect, title: &str, app: &App, field: Field) {
    let input = match field {
        Field::Baud => &app.baud,
        _ => &app.value,
    };
    let focused = app.focus == field;
    let inner_width = area.width.saturating_sub(2) as usize;
    let (shown, cursor_col) = input.visible(inner_width);

    let paragraph = if input.is_empty() && field == Field::Value {
        Paragraph::new(Span::styled("Enter a number", Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(shown)
    };
    frame.render_widget(paragraph.block(field_block(title, focused)), area);

    if focused && app.dialog().is_none() && area.height > 2 {
        frame.set_cursor_position((area.x + 1 + cursor_col as u16, area.y + 1));
    }
}


fn render_button(frame: &mut Frame, area: Rect, label: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::Cyan)
    };
    let button = Paragraph::new(format!("[ {} ]", label))
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(button, area);
}


fn render_preview(frame: &mut Frame, area: Rect, json: &str) {
    let block = Block::default().borders(Borders::ALL).title(" JSON preview ");
    let paragraph = Paragraph::new(json.to_string())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}


/// Render the receive log, pinned to the bottom unless scrolled back.
///
/// Long lines wrap; a device that echoes JSON without a terminator produces
/// one ever-growing line.
fn render_receive(frame: &mut Frame, area: Rect, text: &str, scroll_back: usize) {
    let rows = wrapped_row_count(text, area.width.saturating_sub(2));
    let max = max_scroll_offset(rows, area.height);
    let offset = max.saturating_sub(scroll_back.min(u16::MAX as usize) as u16);

    let title = if scroll_back > 0 && max > 0 {
        " Serial output (scrolled) ".to_string()
    } else {
        " Serial output ".to_string()
    };
    let paragraph = Paragraph::new(text.to_string())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(paragraph, area);
}


/// Number of screen rows `text` takes when wrapped at `width` columns.
pub fn wrapped_row_count(text: &str, width: u16) -> usize {
    let width = width.max(1) as usize;
    text.lines()
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum()
}


/// Calculate the maximum scroll offset for a given content and viewport.
///
/// `line_count`: the total number of lines in the content.
/// `viewport_height`: the visible height (including borders).
///
/// Returns 0 if the content fits within the viewport.
pub fn max_scroll_offset(line_count: usize, viewport_height: u16) -> u16 {
    // Subtract 2 for top and bottom borders
    let usable = viewport_height.saturating_sub(2) as usize;
    if line_count > usable {
        (line_count - usable).min(u16::MAX as usize) as u16
    } else {
        0
    }
}


fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let session = state.session;
    let link = match session.port_name() {
        Some(name) => format!(" {} open", name),
        None => " port closed".to_string(),
    };
    let text = match state.app.status_message() {
        Some(msg) => format!("{} | {}", link, msg),
        None => format!("{} | {} keys set", link, session.payload().len()),
    };
    let style = if session.is_open() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}


/// Severity color for dialogs.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Warning => Color::Yellow,
        Severity::Critical => Color::Red,
    }
}


fn render_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog) {
    let color = severity_color(dialog.severity);
    let rect = centered_rect(50, 9, area);
    let text = format!("\n {}\n\n [Enter] OK", dialog.message.replace('\n', "\n "));
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", dialog.title)),
        )
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, rect);
    frame.render_widget(paragraph, rect);
}


/// A rect `width_pct` percent wide and `height` rows tall, centered in `area`.
pub fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * width_pct.min(100) as u32 / 100) as u16;
    let width = width.max(area.width.min(30));
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
