//! In-memory serial link for tests.
//!
//! `MockLink` clones share one state, so a test can keep a handle while the
//! session owns the boxed link, then inspect what was written.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use super::{PortOpener, SerialLink};
use crate::errors::LinkError;


#[derive(Default)]
struct MockState {
    written: Vec<u8>,
    inbound: VecDeque<Vec<u8>>,
    fail_write: Option<String>,
    fail_read: Option<String>,
    reads: usize,
}


/// A test-double link that records writes and replays queued inbound chunks.
#[derive(Clone)]
pub struct MockLink {
    name: String,
    state: Rc<RefCell<MockState>>,
}

impl MockLink {
    pub fn new(name: &str) -> Self {
        MockLink {
            name: name.to_string(),
            state: Rc::new(RefCell::new(MockState::default())),
        }
    }

    /// Queue one chunk to be returned by the next read.
    pub fn push_inbound(&self, bytes: &[u8]) {
        self.state.borrow_mut().inbound.push_back(bytes.to_vec());
    }

    /// Make every following write fail with `message`.
    pub fn fail_writes(&self, message: &str) {
        self.state.borrow_mut().fail_write = Some(message.to_string());
    }

    /// Make every following read fail with `message`.
    pub fn fail_reads(&self, message: &str) {
        self.state.borrow_mut().fail_read = Some(message.to_string());
    }

    /// All bytes written so far.
    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    /// Number of `read_available` calls that reached the link.
    pub fn read_count(&self) -> usize {
        self.state.borrow().reads
    }

    /// Number of queued inbound chunks not yet read.
    pub fn pending_chunks(&self) -> usize {
        self.state.borrow().inbound.len()
    }
}

impl SerialLink for MockLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        if let Some(msg) = &state.fail_write {
            return Err(LinkError::Write(io::Error::new(io::ErrorKind::Other, msg.clone())));
        }
        state.written.extend_from_slice(bytes);
        Ok(())
    }

    fn bytes_to_read(&mut self) -> Result<usize, LinkError> {
        let state = self.state.borrow();
        Ok(state.inbound.iter().map(|c| c.len()).sum())
    }

    fn read_available(&mut self) -> Result<Vec<u8>, LinkError> {
        let mut state = self.state.borrow_mut();
        state.reads += 1;
        if let Some(msg) = &state.fail_read {
            return Err(LinkError::Read(io::Error::new(io::ErrorKind::Other, msg.clone())));
        }
        let mut out = Vec::new();
        while let Some(chunk) = state.inbound.pop_front() {
            out.extend(chunk);
        }
        Ok(out)
    }
}


/// A test-double opener that hands out a prepared link or a prepared error.
///
/// Clones share the attempt record.
#[derive(Clone)]
pub struct MockOpener {
    link: Option<MockLink>,
    error: Option<String>,
    attempts: Rc<RefCell<Vec<(String, u32, Duration)>>>,
}

impl MockOpener {
    /// Every open succeeds with a clone of `link`.
    pub fn with_link(link: MockLink) -> Self {
        MockOpener {
            link: Some(link),
            error: None,
            attempts: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Every open fails with `message`.
    pub fn failing(message: &str) -> Self {
        MockOpener {
            link: None,
            error: Some(message.to_string()),
            attempts: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// `(port, baud, timeout)` for every open that reached the opener.
    pub fn attempts(&self) -> Vec<(String, u32, Duration)> {
        self.attempts.borrow().clone()
    }
}

impl PortOpener for MockOpener {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialLink>, LinkError> {
        self.attempts
            .borrow_mut()
            .push((port.to_string(), baud_rate, timeout));
        if port.is_empty() {
            return Err(LinkError::NoPort);
        }
        match (&self.link, &self.error) {
            (_, Some(msg)) => Err(LinkError::Open {
                port: port.to_string(),
                message: msg.clone(),
            }),
            (Some(link), None) => {
                let mut link = link.clone();
                link.name = port.to_string();
                Ok(Box::new(link))
            }
            (None, None) => Err(LinkError::Open {
                port: port.to_string(),
                message: "no mock link configured".into(),
            }),
        }
    }
}
