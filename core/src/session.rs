//! Session: the state behind the form.
//!
//! A `Session` owns the payload being built, the open serial link (if any),
//! and the receive log. Every user operation is one method that either
//! succeeds or returns a `SessionError` describing the dialog to show. The
//! session performs no terminal I/O.

use tracing::{debug, info, warn};

use crate::errors::{LinkError, SessionError};
use crate::link::{PortOpener, SerialLink};
use crate::payload::{ParamKey, ParamValue, Payload};
use crate::receive::{ReceiveDecoder, ReceiveLog};
use crate::settings::Settings;


/// Outcome of a successful open/close toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle {
    Opened { port: String, baud_rate: u32 },
    Closed { port: String },
}


/// Parse the baud rate field. Must be a positive integer.
pub fn parse_baud(text: &str) -> Result<u32, LinkError> {
    let trimmed = text.trim();
    match trimmed.parse::<u32>() {
        Ok(baud) if baud > 0 => Ok(baud),
        _ => Err(LinkError::InvalidBaud(trimmed.to_string())),
    }
}


pub struct Session {
    opener: Box<dyn PortOpener>,
    link: Option<Box<dyn SerialLink>>,
    payload: Payload,
    decoder: ReceiveDecoder,
    log: ReceiveLog,
    settings: Settings,
}

impl Session {
    pub fn new(opener: Box<dyn PortOpener>, settings: Settings) -> Self {
        Session {
            opener,
            link: None,
            payload: Payload::new(),
            decoder: ReceiveDecoder::new(),
            log: ReceiveLog::new(settings.receive_log_limit),
            settings,
        }
    }

    // -------------------------------------------------------------------
    // Port
    // -------------------------------------------------------------------

    /// Close the port if open, otherwise open `port` at the rate in
    /// `baud_text`. A failed open leaves the session closed.
    pub fn toggle(&mut self, port: &str, baud_text: &str) -> Result<Toggle, SessionError> {
        if let Some(name) = self.release_link() {
            return Ok(Toggle::Closed { port: name });
        }

        let baud_rate = parse_baud(baud_text).map_err(SessionError::Open)?;
        if port.is_empty() {
            return Err(SessionError::Open(LinkError::NoPort));
        }
        match self
            .opener
            .open(port, baud_rate, self.settings.read_timeout())
        {
            Ok(link) => {
                info!("port {} open at {} baud", port, baud_rate);
                self.link = Some(link);
                Ok(Toggle::Opened {
                    port: port.to_string(),
                    baud_rate,
                })
            }
            Err(e) => {
                warn!("cannot open {}: {}", port, e);
                Err(SessionError::Open(e))
            }
        }
    }

    /// Close the port if open. Returns whether a port was closed.
    pub fn close(&mut self) -> bool {
        self.release_link().is_some()
    }

    /// Drop the open link and return its name.
    fn release_link(&mut self) -> Option<String> {
        let link = self.link.take()?;
        let name = link.name().to_string();
        drop(link);
        self.decoder.reset();
        info!("port {} closed", name);
        Some(name)
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Device name of the open port.
    pub fn port_name(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.name())
    }

    // -------------------------------------------------------------------
    // Payload
    // -------------------------------------------------------------------

    /// Parse `value_text` and store it under `key`. The payload is left
    /// unchanged when parsing fails.
    pub fn modify(&mut self, key: ParamKey, value_text: &str) -> Result<ParamValue, SessionError> {
        let value = ParamValue::parse(value_text).map_err(|e| {
            debug!("rejected value for {}: {}", key, e);
            SessionError::InvalidValue(e)
        })?;
        self.payload.set(key, value);
        debug!("{} = {}", key, value);
        Ok(value)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Drop `key` from the payload. Returns the value it held.
    pub fn remove_key(&mut self, key: ParamKey) -> Option<ParamValue> {
        let old = self.payload.remove(key);
        if old.is_some() {
            debug!("removed {}", key);
        }
        old
    }

    pub fn clear_payload(&mut self) {
        self.payload.clear();
        debug!("payload cleared");
    }

    /// JSON text as it will be sent.
    pub fn preview(&self) -> String {
        self.payload.to_json(self.settings.json_style)
    }

    // -------------------------------------------------------------------
    // Send / receive
    // -------------------------------------------------------------------

    /// Write the current JSON to the port. Returns the number of bytes sent.
    pub fn send(&mut self) -> Result<usize, SessionError> {
        let text = self.preview();
        let link = self.link.as_mut().ok_or(SessionError::PortClosed)?;
        match link.write_all(text.as_bytes()) {
            Ok(()) => {
                info!("sent {} bytes to {}: {}", text.len(), link.name(), text);
                Ok(text.len())
            }
            Err(e) => {
                warn!("send to {} failed: {}", link.name(), e);
                Err(SessionError::Write(e))
            }
        }
    }

    /// Read any waiting bytes into the receive log. Does nothing while the
    /// port is closed. Returns the number of bytes read.
    pub fn poll(&mut self) -> usize {
        let link = match self.link.as_mut() {
            Some(link) => link,
            None => return 0,
        };
        let result = match link.bytes_to_read() {
            Ok(0) => return 0,
            Ok(_) => link.read_available(),
            Err(e) => Err(e),
        };
        match result {
            Ok(bytes) => {
                let text = self.decoder.feed(&bytes);
                if !text.is_empty() {
                    self.log.append(&text);
                }
                bytes.len()
            }
            Err(e) => {
                warn!("read error: {}", e);
                self.log.append_line(&format!("[Read Error]: {}", e));
                0
            }
        }
    }

    pub fn receive_text(&self) -> &str {
        self.log.text()
    }

    pub fn clear_receive(&mut self) {
        self.log.clear();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
