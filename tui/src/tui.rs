//! TUI runner: ratatui event loop with terminal setup and cleanup.
//!
//! The [`Tui`] struct owns the ratatui terminal, the form state ([`App`]),
//! and the serial [`Session`]. It runs the main loop: draw frames, poll for
//! keyboard events, apply actions to the session, and poll the serial port
//! on a fixed interval while it is open.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;
use ratatui::Terminal;
use tracing::info;

use serjson_core::session::{Session, Toggle};

use crate::app::{App, AppAction, Key};
use crate::form::{receive_scroll_limit, render_frame, RenderState};


/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    session: Session,
    list_ports: fn() -> Vec<String>,
    poll_interval: Duration,
    last_poll: Instant,
}


impl Tui {
    /// Create a new TUI, entering raw mode and the alternate screen.
    ///
    /// `list_ports` is called at startup and on every rescan.
    pub fn new(
        session: Session,
        list_ports: fn() -> Vec<String>,
        port: Option<&str>,
        baud: Option<&str>,
    ) -> Result<Self, io::Error> {
        let default_baud = session.settings().baud_rate.to_string();
        let mut app = App::new(list_ports(), baud.unwrap_or(&default_baud));
        if let Some(port) = port {
            app.select_port(port);
        }
        let poll_interval = session.settings().poll_interval();

        terminal::enable_raw_mode()?;
        let terminal = undo_on_error(enter_screen(), || {
            let _ = terminal::disable_raw_mode();
        })?;

        Ok(Self {
            terminal,
            app,
            session,
            list_ports,
            poll_interval,
            last_poll: Instant::now(),
        })
    }

    /// Run the main event loop until quit is requested.
    pub fn run(&mut self) -> Result<(), io::Error> {
        info!("form started with {} ports", self.app.ports().len());
        loop {
            let state = RenderState {
                app: &self.app,
                session: &self.session,
            };
            let area = self.terminal.draw(|frame| render_frame(frame, &state))?.area;
            let limit = receive_scroll_limit(area, self.session.receive_text());
            self.app.set_receive_scroll_limit(limit);

            let timeout = poll_timeout(self.last_poll, Instant::now(), self.poll_interval);
            if event::poll(timeout)? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind != KeyEventKind::Release {
                        let key = crossterm_to_key(key_event.code, key_event.modifiers);
                        if let Some(action) = self.app.handle_key(key) {
                            if apply_action(
                                &mut self.app,
                                &mut self.session,
                                action,
                                self.list_ports,
                                now_ms(),
                            ) {
                                break;
                            }
                        }
                    }
                }
            }

            let now = Instant::now();
            if poll_due(self.last_poll, now, self.poll_interval) {
                self.session.poll();
                self.app.clear_expired_status(now_ms());
                self.last_poll = now;
            }
        }

        self.session.close();
        self.shutdown()
    }

    /// Restore the terminal to its normal state.
    fn shutdown(&mut self) -> Result<(), io::Error> {
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}


impl Drop for Tui {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}


/// Open the alternate screen and build the ratatui terminal on stdout.
fn enter_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}


/// Run `undo` if `result` is an error, then pass the result through.
fn undo_on_error<T>(result: Result<T, io::Error>, undo: impl FnOnce()) -> Result<T, io::Error> {
    if result.is_err() {
        undo();
    }
    result
}


/// Whether the serial port is due for another read.
pub fn poll_due(last_poll: Instant, now: Instant, interval: Duration) -> bool {
    now.saturating_duration_since(last_poll) >= interval
}


/// How long to wait for a key before the next serial read is due.
pub fn poll_timeout(last_poll: Instant, now: Instant, interval: Duration) -> Duration {
    interval.saturating_sub(now.saturating_duration_since(last_poll))
}


fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}


// ---------------------------------------------------------------------------
// Action handling
// ---------------------------------------------------------------------------

/// Apply an `AppAction` to the session and reflect the outcome in the form.
///
/// Returns `true` if the application should quit.
pub fn apply_action(
    app: &mut App,
    session: &mut Session,
    action: AppAction,
    list_ports: fn() -> Vec<String>,
    now_ms: u64,
) -> bool {
    match action {
        AppAction::Quit => return true,
        AppAction::TogglePort => {
            let port = app.selected_port().unwrap_or("").to_string();
            match session.toggle(&port, &app.baud.text()) {
                Ok(Toggle::Opened { port, baud_rate }) => {
                    app.set_status(&format!("Opened {} at {} baud", port, baud_rate), now_ms);
                }
                Ok(Toggle::Closed { port }) => {
                    app.set_status(&format!("Closed {}", port), now_ms);
                }
                Err(e) => app.show_error(&e),
            }
        }
        AppAction::ModifyJson => match session.modify(app.selected_key(), &app.value.text()) {
            Ok(value) => {
                app.set_status(&format!("{} = {}", app.selected_key(), value), now_ms);
            }
            Err(e) => app.show_error(&e),
        },
        AppAction::SendJson => match session.send() {
            Ok(n) => app.set_status(&format!("Sent {} bytes", n), now_ms),
            Err(e) => app.show_error(&e),
        },
        AppAction::RefreshPorts => {
            app.set_ports(list_ports());
            app.set_status(&format!("{} ports found", app.ports().len()), now_ms);
        }
        AppAction::ClearReceive => {
            session.clear_receive();
            app.receive_scroll_back = 0;
        }
        AppAction::RemoveKey => {
            let key = app.selected_key();
            let msg = match session.remove_key(key) {
                Some(_) => format!("Removed {}", key),
                None => format!("{} is not set", key),
            };
            app.set_status(&msg, now_ms);
        }
        AppAction::ClearPayload => {
            session.clear_payload();
            app.set_status("JSON cleared", now_ms);
        }
    }
    false
}


// ---------------------------------------------------------------------------
// Key conversion
// ---------------------------------------------------------------------------

/// Convert a crossterm `KeyCode` + `KeyModifiers` into our domain `Key` type.
pub fn crossterm_to_key(code: KeyCode, modifiers: KeyModifiers) -> Key {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(ch) = code {
            return Key::Ctrl(ch.to_ascii_lowercase());
        }
    }
    if modifiers.contains(KeyModifiers::ALT) {
        return Key::Char('\0');
    }
    match code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => Key::BackTab,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => Key::Char('\0'), // unmapped keys produce a null char
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
