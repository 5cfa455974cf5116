//! Production serial backend over the `serialport` crate.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, warn};

use super::{PortOpener, SerialLink};
use crate::errors::LinkError;


/// Device names of the serial ports the OS currently reports.
///
/// Enumeration failures are logged and yield an empty list.
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("serial port enumeration failed: {}", e);
            Vec::new()
        }
    }
}


/// An open OS serial port.
pub struct PortLink {
    name: String,
    port: Box<dyn SerialPort>,
}

impl PortLink {
    /// Open `name` at `baud_rate`, 8N1, no flow control.
    pub fn open(name: &str, baud_rate: u32, timeout: Duration) -> Result<PortLink, LinkError> {
        if name.is_empty() {
            return Err(LinkError::NoPort);
        }
        let port = serialport::new(name, baud_rate)
            .timeout(timeout)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|e| LinkError::Open {
                port: name.to_string(),
                message: e.to_string(),
            })?;
        info!("opened {} at {} baud", name, baud_rate);
        Ok(PortLink {
            name: name.to_string(),
            port,
        })
    }
}

impl SerialLink for PortLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.port.write_all(bytes).map_err(LinkError::Write)?;
        self.port.flush().map_err(LinkError::Write)
    }

    fn bytes_to_read(&mut self) -> Result<usize, LinkError> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(|e| LinkError::Read(io::Error::from(e)))
    }

    fn read_available(&mut self) -> Result<Vec<u8>, LinkError> {
        let waiting = self.bytes_to_read()?;
        let mut buf = vec![0u8; waiting];
        let mut filled = 0;
        while filled < waiting {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LinkError::Read(e)),
            }
        }
        buf.truncate(filled);
        debug!("read {} bytes from {}", filled, self.name);
        Ok(buf)
    }
}

impl Drop for PortLink {
    fn drop(&mut self) {
        info!("closed {}", self.name);
    }
}


/// Opens real OS serial ports.
pub struct SystemOpener;

impl PortOpener for SystemOpener {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialLink>, LinkError> {
        PortLink::open(port, baud_rate, timeout).map(|link| Box::new(link) as Box<dyn SerialLink>)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_empty_name_is_no_port() {
        let result = SystemOpener.open("", 115_200, Duration::from_millis(100));
        assert!(matches!(result, Err(LinkError::NoPort)));
    }

    #[test]
    fn open_missing_device_fails() {
        let result = PortLink::open(
            "/dev/serjson-does-not-exist",
            9600,
            Duration::from_millis(100),
        );
        match result {
            Err(LinkError::Open { port, .. }) => {
                assert_eq!(port, "/dev/serjson-does-not-exist");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opened a device that does not exist"),
        }
    }

    #[test]
    fn list_ports_does_not_panic() {
        let ports = list_ports();
        assert!(ports.iter().all(|p| !p.is_empty()));
    }
}
