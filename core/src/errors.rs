use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Value errors
// ---------------------------------------------------------------------------

/// A form value that could not be stored in the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Nothing was entered.
    Empty,
    /// The text is not a number of the expected kind.
    NotANumber(String),
    /// The text parsed as a float but the result is infinite or NaN.
    NotFinite(String),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Empty => write!(f, "no value entered"),
            ValueError::NotANumber(text) => write!(f, "'{}' is not a valid number", text),
            ValueError::NotFinite(text) => {
                write!(f, "'{}' is out of range for a JSON number", text)
            }
        }
    }
}

impl std::error::Error for ValueError {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum LinkError {
    /// No device name was given.
    NoPort,
    /// The baud rate text is not a positive integer.
    InvalidBaud(String),
    /// The OS refused to open the device.
    Open { port: String, message: String },
    /// Writing to an open device failed.
    Write(std::io::Error),
    /// Reading from an open device failed.
    Read(std::io::Error),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::NoPort => write!(f, "no serial port selected"),
            LinkError::InvalidBaud(text) => write!(f, "invalid baud rate: '{}'", text),
            LinkError::Open { port, message } => {
                write!(f, "could not open {}: {}", port, message)
            }
            LinkError::Write(e) => write!(f, "write failed: {}", e),
            LinkError::Read(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// How loudly a session error should be reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Critical,
}

/// A failed user operation. Each variant maps to one dialog.
#[derive(Debug)]
pub enum SessionError {
    /// Opening the port failed (bad port, bad baud rate, OS error).
    Open(LinkError),
    /// The value field did not hold a number.
    InvalidValue(ValueError),
    /// Send was requested while no port is open.
    PortClosed,
    /// The payload could not be written.
    Write(LinkError),
}

impl SessionError {
    /// Dialog title for this error.
    pub fn title(&self) -> &'static str {
        match self {
            SessionError::Open(_) => "Serial Error",
            SessionError::InvalidValue(_) => "Invalid Input",
            SessionError::PortClosed => "Port Closed",
            SessionError::Write(_) => "Send Error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SessionError::PortClosed => Severity::Warning,
            _ => Severity::Critical,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Open(e) => write!(f, "Cannot open port:\n{}", e),
            SessionError::InvalidValue(_) => write!(f, "Please enter a valid number."),
            SessionError::PortClosed => write!(f, "Open the serial port first."),
            SessionError::Write(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Open(e) | SessionError::Write(e) => Some(e),
            SessionError::InvalidValue(e) => Some(e),
            SessionError::PortClosed => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io { path: PathBuf, error: std::io::Error },
    /// The config file is not valid YAML for `Settings`.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(f, "cannot read '{}': {}", path.display(), error)
            }
            ConfigError::Parse(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
