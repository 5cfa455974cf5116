//! Serial link backends.
//!
//! Provides the `SerialLink` trait for an open port and the `PortOpener` trait
//! that produces one. `serial` holds the production implementations over the
//! `serialport` crate; `mock` holds in-memory doubles for tests.

pub mod mock;
pub mod serial;

use std::time::Duration;

use crate::errors::LinkError;

pub use serial::{list_ports, PortLink, SystemOpener};

/// An open serial endpoint. Closing is done by dropping it.
pub trait SerialLink {
    /// Device name this link was opened on.
    fn name(&self) -> &str;

    /// Write every byte of `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Number of inbound bytes waiting to be read.
    fn bytes_to_read(&mut self) -> Result<usize, LinkError>;

    /// Read whatever is waiting without blocking past the read timeout.
    fn read_available(&mut self) -> Result<Vec<u8>, LinkError>;
}

/// Opens serial links by device name.
pub trait PortOpener {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialLink>, LinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::{MockLink, MockOpener};

    #[test]
    fn mock_implements_traits() {
        let link = MockLink::new("/dev/null");
        let _: &dyn SerialLink = &link;
        let opener = MockOpener::with_link(link);
        let _: &dyn PortOpener = &opener;
    }
}
