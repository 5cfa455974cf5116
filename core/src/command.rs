//! Command: the typed interface for every `serjson` invocation.
//!
//! | Command | Meaning |
//! |---------|---------|
//! | `tui` | Interactive form (default when no command is given) |
//! | `ports` | List serial devices |
//! | `keys` | List accepted payload keys |
//! | `send` | Build one payload from `key=value` pairs and send it |
//! | `help` | Usage text |

use crate::payload::{JsonStyle, ParamKey};


#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Launch the terminal form, optionally preselecting port and baud rate.
    Tui {
        port: Option<String>,
        baud: Option<String>,
    },

    /// Print available serial device names, one per line.
    Ports,

    /// Print the accepted payload keys.
    Keys,

    /// Send one payload and exit.
    Send {
        port: String,
        /// Baud rate text; the configured default is used when omitted.
        baud: Option<String>,
        /// Separator style; the configured default is used when omitted.
        style: Option<JsonStyle>,
        /// Key/value pairs in command-line order. Values are parsed when
        /// the payload is built so errors read the same as in the form.
        pairs: Vec<(ParamKey, String)>,
    },

    /// Print usage.
    Help { topic: Option<String> },
}
