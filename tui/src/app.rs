//! Form state machine.
//!
//! Tracks which field has focus, the contents of the editable fields, the
//! port and key selectors, the modal dialog, and transient status messages.
//! The `App` struct does not perform I/O or touch the serial session; key
//! presses that need the session come back as an [`AppAction`].

use serjson_core::errors::{SessionError, Severity};
use serjson_core::payload::ParamKey;

use crate::input::InputLine;


// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A focusable element of the form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Port,
    Baud,
    OpenButton,
    Key,
    Value,
    ModifyButton,
    SendButton,
}


impl Field {
    pub const ORDER: [Field; 7] = [
        Field::Port,
        Field::Baud,
        Field::OpenButton,
        Field::Key,
        Field::Value,
        Field::ModifyButton,
        Field::SendButton,
    ];

    fn position(&self) -> usize {
        Field::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Field {
        Field::ORDER[(self.position() + 1) % Field::ORDER.len()]
    }

    pub fn prev(&self) -> Field {
        let len = Field::ORDER.len();
        Field::ORDER[(self.position() + len - 1) % len]
    }

    /// Whether this field is a free-text field.
    pub fn is_text(&self) -> bool {
        matches!(self, Field::Baud | Field::Value)
    }
}


// ---------------------------------------------------------------------------
// Dialog
// ---------------------------------------------------------------------------

/// A modal message. While one is showing, all other input is blocked.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}


impl Dialog {
    pub fn from_error(error: &SessionError) -> Self {
        Dialog {
            title: error.title().to_string(),
            message: error.to_string(),
            severity: error.severity(),
        }
    }
}


// ---------------------------------------------------------------------------
// AppAction
// ---------------------------------------------------------------------------

/// Something the form asks the runner to do.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Quit,
    /// Open the selected port, or close the open one.
    TogglePort,
    /// Store the value field under the selected key.
    ModifyJson,
    /// Write the JSON to the open port.
    SendJson,
    /// Re-enumerate serial devices.
    RefreshPorts,
    /// Empty the receive log.
    ClearReceive,
    /// Drop the selected key from the JSON.
    RemoveKey,
    /// Drop every key from the JSON.
    ClearPayload,
}


// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level UI state for the form.
pub struct App {
    /// Field with keyboard focus.
    pub focus: Field,
    /// Device names offered by the port selector.
    ports: Vec<String>,
    port_index: usize,
    /// Baud rate field.
    pub baud: InputLine,
    key_index: usize,
    /// Value field.
    pub value: InputLine,
    /// Modal dialog, if one is open.
    dialog: Option<Dialog>,
    /// Transient status message and the time it was set.
    status_message: Option<(String, u64)>,
    /// Time-to-live for status messages in milliseconds.
    status_ttl_ms: u64,
    /// Rows scrolled back from the bottom of the receive log.
    pub receive_scroll_back: usize,
    /// Furthest the receive log can scroll back, as of the last frame.
    receive_scroll_limit: usize,
}


impl App {
    /// Create a form with the given ports and initial baud rate text.
    pub fn new(ports: Vec<String>, baud_text: &str) -> Self {
        App {
            focus: Field::Port,
            ports,
            port_index: 0,
            baud: InputLine::with_text(baud_text),
            key_index: 0,
            value: InputLine::new(),
            dialog: None,
            status_message: None,
            status_ttl_ms: 4000,
            receive_scroll_back: 0,
            receive_scroll_limit: 0,
        }
    }

    // -------------------------------------------------------------------
    // Selectors
    // -------------------------------------------------------------------

    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    /// The selected device name, or `None` if no ports are known.
    pub fn selected_port(&self) -> Option<&str> {
        self.ports.get(self.port_index).map(|s| s.as_str())
    }

    /// Replace the port list, keeping the current selection if it is still
    /// present.
    pub fn set_ports(&mut self, ports: Vec<String>) {
        let current = self.selected_port().map(|s| s.to_string());
        self.ports = ports;
        self.port_index = current
            .and_then(|name| self.ports.iter().position(|p| *p == name))
            .unwrap_or(0);
    }

    /// Select `name` in the port selector, adding it if it is not listed.
    pub fn select_port(&mut self, name: &str) {
        match self.ports.iter().position(|p| p == name) {
            Some(i) => self.port_index = i,
            None => {
                self.ports.push(name.to_string());
                self.port_index = self.ports.len() - 1;
            }
        }
    }

    pub fn selected_key(&self) -> ParamKey {
        ParamKey::ALL[self.key_index]
    }

    fn cycle_port(&mut self, forward: bool) {
        let len = self.ports.len();
        if len == 0 {
            return;
        }
        self.port_index = if forward {
            (self.port_index + 1) % len
        } else {
            (self.port_index + len - 1) % len
        };
    }

    fn cycle_key(&mut self, forward: bool) {
        let len = ParamKey::ALL.len();
        self.key_index = if forward {
            (self.key_index + 1) % len
        } else {
            (self.key_index + len - 1) % len
        };
    }

    /// Record how far the receive log can scroll and pull the current
    /// position back inside that range.
    pub fn set_receive_scroll_limit(&mut self, limit: usize) {
        self.receive_scroll_limit = limit;
        self.receive_scroll_back = self.receive_scroll_back.min(limit);
    }

    // -------------------------------------------------------------------
    // Dialog
    // -------------------------------------------------------------------

    pub fn show_error(&mut self, error: &SessionError) {
        self.dialog = Some(Dialog::from_error(error));
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    // -------------------------------------------------------------------
    // Status messages
    // -------------------------------------------------------------------

    pub fn set_status(&mut self, msg: &str, now_ms: u64) {
        self.status_message = Some((msg.to_string(), now_ms));
    }

    /// Clear the status message if it has expired relative to `now_ms`.
    pub fn clear_expired_status(&mut self, now_ms: u64) {
        if let Some((_, created)) = &self.status_message {
            if now_ms.saturating_sub(*created) >= self.status_ttl_ms {
                self.status_message = None;
            }
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(msg, _)| msg.as_str())
    }

    // -------------------------------------------------------------------
    // Input processing
    // -------------------------------------------------------------------

    /// Process a key event and return an optional action.
    ///
    /// Routing:
    /// - While a dialog is open, only Enter / Escape / Space (dismiss) are
    ///   handled.
    /// - Global shortcuts (quit, F-keys, focus movement) come next.
    /// - Everything else goes to the focused field.
    pub fn handle_key(&mut self, key: Key) -> Option<AppAction> {
        if self.dialog.is_some() {
            if matches!(key, Key::Enter | Key::Escape | Key::Char(' ')) {
                self.dismiss_dialog();
            }
            return None;
        }

        match key {
            Key::Ctrl('c') | Key::Ctrl('q') => return Some(AppAction::Quit),
            Key::Ctrl('l') => return Some(AppAction::ClearReceive),
            Key::Ctrl('k') => return Some(AppAction::ClearPayload),
            Key::F(2) => return Some(AppAction::TogglePort),
            Key::F(5) => return Some(AppAction::RefreshPorts),
            Key::F(9) => return Some(AppAction::SendJson),
            Key::Tab | Key::Down => {
                self.focus = self.focus.next();
                return None;
            }
            Key::BackTab | Key::Up => {
                self.focus = self.focus.prev();
                return None;
            }
            Key::PageUp => {
                self.receive_scroll_back = self
                    .receive_scroll_back
                    .saturating_add(5)
                    .min(self.receive_scroll_limit);
                return None;
            }
            Key::PageDown => {
                self.receive_scroll_back = self.receive_scroll_back.saturating_sub(5);
                return None;
            }
            _ => {}
        }

        match self.focus {
            Field::Port => self.handle_selector_key(key, true),
            Field::Key => self.handle_selector_key(key, false),
            Field::Baud => {
                if key == Key::Enter {
                    self.focus = self.focus.next();
                } else {
                    edit(&mut self.baud, key);
                }
                None
            }
            Field::Value => {
                if key == Key::Enter {
                    Some(AppAction::ModifyJson)
                } else {
                    edit(&mut self.value, key);
                    None
                }
            }
            Field::OpenButton => press(key, AppAction::TogglePort),
            Field::ModifyButton => press(key, AppAction::ModifyJson),
            Field::SendButton => press(key, AppAction::SendJson),
        }
    }

    fn handle_selector_key(&mut self, key: Key, is_port: bool) -> Option<AppAction> {
        match key {
            Key::Left | Key::Right | Key::Char(' ') => {
                let forward = key != Key::Left;
                if is_port {
                    self.cycle_port(forward);
                } else {
                    self.cycle_key(forward);
                }
            }
            Key::Enter => self.focus = self.focus.next(),
            Key::Delete | Key::Backspace if !is_port => return Some(AppAction::RemoveKey),
            _ => {}
        }
        None
    }
}


/// Apply an editing key to a text field.
fn edit(input: &mut InputLine, key: Key) {
    match key {
        Key::Char(ch) if !ch.is_control() => input.insert(ch),
        Key::Backspace => input.delete_back(),
        Key::Delete => input.delete_forward(),
        Key::Left => input.move_left(),
        Key::Right => input.move_right(),
        Key::Home | Key::Ctrl('a') => input.move_home(),
        Key::End | Key::Ctrl('e') => input.move_end(),
        Key::Ctrl('u') => input.clear(),
        Key::Ctrl('w') => input.delete_word_back(),
        _ => {}
    }
}


/// Buttons fire on Enter or Space.
fn press(key: Key, action: AppAction) -> Option<AppAction> {
    match key {
        Key::Enter | Key::Char(' ') => Some(action),
        _ => None,
    }
}


// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A simplified key event for the TUI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Ctrl(char),
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serjson_core::errors::{LinkError, ValueError};

    fn app() -> App {
        App::new(
            vec!["/dev/ttyS0".into(), "/dev/ttyUSB0".into()],
            "115200",
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(Key::Char(ch));
        }
    }

    // --- Construction ---

    #[test]
    fn new_focuses_port() {
        let app = app();
        assert_eq!(app.focus, Field::Port);
        assert_eq!(app.selected_port(), Some("/dev/ttyS0"));
        assert_eq!(app.baud.text(), "115200");
        assert_eq!(app.selected_key(), ParamKey::PulseWidth1);
        assert!(app.dialog().is_none());
    }

    #[test]
    fn no_ports_means_no_selection() {
        let app = App::new(Vec::new(), "9600");
        assert_eq!(app.selected_port(), None);
    }

    // --- Focus ---

    #[test]
    fn tab_cycles_through_all_fields() {
        let mut app = app();
        for expected in Field::ORDER.iter().skip(1) {
            app.handle_key(Key::Tab);
            assert_eq!(app.focus, *expected);
        }
        app.handle_key(Key::Tab);
        assert_eq!(app.focus, Field::Port);
    }

    #[test]
    fn backtab_wraps_backwards() {
        let mut app = app();
        app.handle_key(Key::BackTab);
        assert_eq!(app.focus, Field::SendButton);
        app.handle_key(Key::Up);
        assert_eq!(app.focus, Field::ModifyButton);
    }

    #[test]
    fn text_fields() {
        assert!(Field::Baud.is_text());
        assert!(Field::Value.is_text());
        assert!(!Field::Port.is_text());
        assert!(!Field::SendButton.is_text());
    }

    // --- Selectors ---

    #[test]
    fn port_selector_cycles() {
        let mut app = app();
        app.handle_key(Key::Right);
        assert_eq!(app.selected_port(), Some("/dev/ttyUSB0"));
        app.handle_key(Key::Right);
        assert_eq!(app.selected_port(), Some("/dev/ttyS0"));
        app.handle_key(Key::Left);
        assert_eq!(app.selected_port(), Some("/dev/ttyUSB0"));
    }

    #[test]
    fn key_selector_cycles_in_order() {
        let mut app = app();
        app.focus = Field::Key;
        let mut seen = vec![app.selected_key()];
        for _ in 0..3 {
            app.handle_key(Key::Right);
            seen.push(app.selected_key());
        }
        assert_eq!(seen, ParamKey::ALL.to_vec());
        app.handle_key(Key::Right);
        assert_eq!(app.selected_key(), ParamKey::PulseWidth1);
        app.handle_key(Key::Left);
        assert_eq!(app.selected_key(), ParamKey::PulseInterval);
    }

    #[test]
    fn set_ports_keeps_selection() {
        let mut app = app();
        app.handle_key(Key::Right);
        app.set_ports(vec!["/dev/ttyACM0".into(), "/dev/ttyUSB0".into()]);
        assert_eq!(app.selected_port(), Some("/dev/ttyUSB0"));
        app.set_ports(vec!["/dev/ttyACM0".into()]);
        assert_eq!(app.selected_port(), Some("/dev/ttyACM0"));
        app.set_ports(Vec::new());
        assert_eq!(app.selected_port(), None);
    }

    #[test]
    fn select_port_adds_unknown() {
        let mut app = app();
        app.select_port("COM9");
        assert_eq!(app.selected_port(), Some("COM9"));
        assert_eq!(app.ports().len(), 3);
        app.select_port("/dev/ttyS0");
        assert_eq!(app.selected_port(), Some("/dev/ttyS0"));
    }

    // --- Text fields ---

    #[test]
    fn typing_into_baud() {
        let mut app = app();
        app.focus = Field::Baud;
        app.handle_key(Key::Ctrl('u'));
        type_text(&mut app, "9600");
        assert_eq!(app.baud.text(), "9600");
        app.handle_key(Key::Enter);
        assert_eq!(app.focus, Field::OpenButton);
    }

    #[test]
    fn enter_in_value_modifies() {
        let mut app = app();
        app.focus = Field::Value;
        type_text(&mut app, "12.5");
        assert_eq!(app.value.text(), "12.5");
        assert_eq!(app.handle_key(Key::Enter), Some(AppAction::ModifyJson));
    }

    #[test]
    fn space_is_text_in_fields() {
        let mut app = app();
        app.focus = Field::Value;
        assert_eq!(app.handle_key(Key::Char(' ')), None);
        assert_eq!(app.value.text(), " ");
    }

    // --- Buttons and shortcuts ---

    #[test]
    fn buttons_fire_actions() {
        let mut app = app();
        app.focus = Field::OpenButton;
        assert_eq!(app.handle_key(Key::Enter), Some(AppAction::TogglePort));
        app.focus = Field::ModifyButton;
        assert_eq!(app.handle_key(Key::Char(' ')), Some(AppAction::ModifyJson));
        app.focus = Field::SendButton;
        assert_eq!(app.handle_key(Key::Enter), Some(AppAction::SendJson));
        assert_eq!(app.handle_key(Key::Char('x')), None);
    }

    #[test]
    fn global_shortcuts() {
        let mut app = app();
        app.focus = Field::Value;
        assert_eq!(app.handle_key(Key::F(2)), Some(AppAction::TogglePort));
        assert_eq!(app.handle_key(Key::F(5)), Some(AppAction::RefreshPorts));
        assert_eq!(app.handle_key(Key::F(9)), Some(AppAction::SendJson));
        assert_eq!(app.handle_key(Key::Ctrl('l')), Some(AppAction::ClearReceive));
        assert_eq!(app.handle_key(Key::Ctrl('q')), Some(AppAction::Quit));
        assert_eq!(app.handle_key(Key::Ctrl('c')), Some(AppAction::Quit));
    }

    #[test]
    fn page_keys_scroll_receive_log() {
        let mut app = app();
        app.set_receive_scroll_limit(100);
        app.handle_key(Key::PageUp);
        app.handle_key(Key::PageUp);
        assert_eq!(app.receive_scroll_back, 10);
        app.handle_key(Key::PageDown);
        assert_eq!(app.receive_scroll_back, 5);
        app.handle_key(Key::PageDown);
        app.handle_key(Key::PageDown);
        assert_eq!(app.receive_scroll_back, 0);
    }

    #[test]
    fn page_up_stops_at_scroll_limit() {
        let mut app = app();
        for _ in 0..20 {
            app.handle_key(Key::PageUp);
        }
        assert_eq!(app.receive_scroll_back, 0);

        app.set_receive_scroll_limit(7);
        for _ in 0..20 {
            app.handle_key(Key::PageUp);
        }
        assert_eq!(app.receive_scroll_back, 7);
        app.handle_key(Key::PageDown);
        assert_eq!(app.receive_scroll_back, 2);
    }

    #[test]
    fn shrinking_log_pulls_scroll_back_in() {
        let mut app = app();
        app.set_receive_scroll_limit(50);
        app.handle_key(Key::PageUp);
        app.handle_key(Key::PageUp);
        app.set_receive_scroll_limit(3);
        assert_eq!(app.receive_scroll_back, 3);
    }

    #[test]
    fn delete_on_key_selector_removes_key() {
        let mut app = app();
        app.focus = Field::Key;
        assert_eq!(app.handle_key(Key::Delete), Some(AppAction::RemoveKey));
        assert_eq!(app.handle_key(Key::Backspace), Some(AppAction::RemoveKey));
        app.focus = Field::Port;
        assert_eq!(app.handle_key(Key::Delete), None);
        assert_eq!(app.ports().len(), 2);
    }

    #[test]
    fn ctrl_k_clears_payload_from_any_field() {
        let mut app = app();
        app.focus = Field::Value;
        assert_eq!(app.handle_key(Key::Ctrl('k')), Some(AppAction::ClearPayload));
        app.focus = Field::SendButton;
        assert_eq!(app.handle_key(Key::Ctrl('k')), Some(AppAction::ClearPayload));
    }

    // --- Dialog ---

    #[test]
    fn dialog_from_error() {
        let dialog = Dialog::from_error(&SessionError::PortClosed);
        assert_eq!(dialog.title, "Port Closed");
        assert_eq!(dialog.message, "Open the serial port first.");
        assert_eq!(dialog.severity, Severity::Warning);
    }

    #[test]
    fn dialog_blocks_input_until_dismissed() {
        let mut app = app();
        app.focus = Field::SendButton;
        app.show_error(&SessionError::InvalidValue(ValueError::Empty));

        assert_eq!(app.handle_key(Key::Enter), None);
        assert!(app.dialog().is_none());

        app.show_error(&SessionError::Open(LinkError::NoPort));
        assert_eq!(app.handle_key(Key::F(9)), None);
        assert_eq!(app.handle_key(Key::Tab), None);
        assert_eq!(app.focus, Field::SendButton);
        assert!(app.dialog().is_some());
        app.handle_key(Key::Escape);
        assert!(app.dialog().is_none());
    }

    // --- Status messages ---

    #[test]
    fn status_expires() {
        let mut app = app();
        app.set_status("Sent 12 bytes", 1000);
        app.clear_expired_status(2000);
        assert_eq!(app.status_message(), Some("Sent 12 bytes"));
        app.clear_expired_status(5000);
        assert!(app.status_message().is_none());
    }
}
