//! SerJSON core: payload model, serial link, and session state.
//!
//! Nothing here touches the terminal. The form in `serjson-tui` and the
//! `serjson` binary drive a [`session::Session`] and render what it reports.
//!
//! # Modules
//!
//! - [`payload`]: parameter keys, numeric values, JSON encoding
//! - [`link`]: serial link traits, `serialport` backend, mocks
//! - [`receive`]: inbound decoding and the receive log
//! - [`session`]: open/close, modify, send, poll
//! - [`settings`]: `config.yaml` loading
//! - [`cli`] / [`command`] / [`help`]: command-line surface

pub mod cli;
pub mod command;
pub mod errors;
pub mod help;
pub mod link;
pub mod payload;
pub mod receive;
pub mod session;
pub mod settings;
