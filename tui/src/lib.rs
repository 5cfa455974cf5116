//! SerJSON TUI: the terminal form for building and sending payloads.
//!
//! # Modules
//!
//! - [`app`]: form state machine: focus, fields, dialogs, key routing
//! - [`form`]: ratatui rendering of the form
//! - [`input`]: single-line text editing
//! - [`tui`]: terminal setup and the event / poll loop

pub mod app;
pub mod form;
pub mod input;
pub mod tui;
