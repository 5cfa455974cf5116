//! Help system: usage text for the `serjson` command line.

use crate::payload::ParamKey;


/// Generate help text for a given topic.
///
/// - `None` → overview of all commands
/// - `Some("send")` etc. → detailed help for one command
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => command_help(t).unwrap_or_else(|| {
            format!("Unknown help topic: '{}'. Run 'serjson help' for a list of commands.", t)
        }),
    }
}


/// One line per accepted payload key.
pub fn key_list() -> String {
    ParamKey::ALL
        .iter()
        .map(|k| k.wire_name())
        .collect::<Vec<_>>()
        .join("\n")
}


fn overview() -> String {
    "\
serjson - build a JSON parameter object and send it over a serial port

Usage: serjson [command] [args...]

Commands:
  tui      Interactive form (default)
  ports    List serial devices
  keys     List payload keys
  send     Send one payload and exit
  help     Show help for a command

Settings are read from $SERJSON_CONFIG_DIR/config.yaml
(default ~/.config/serjson/config.yaml)."
        .to_string()
}


fn command_help(topic: &str) -> Option<String> {
    let text = match topic {
        "tui" => "\
serjson tui [--port <device>] [--baud <rate>]

Open the form. Tab / Shift-Tab move between fields, Enter presses the
focused button, Left/Right cycle selectors. Delete on the key selector
drops that key from the JSON. PageUp / PageDown scroll the receive log.

  F2      Open / close the port
  F5      Rescan ports
  F9      Send JSON
  Ctrl-K  Clear the JSON
  Ctrl-L  Clear the receive log
  Ctrl-Q  Quit",
        "ports" => "\
serjson ports

Print the serial devices the OS reports, one per line.",
        "keys" => "\
serjson keys

Print the keys accepted in the payload.",
        "send" => "\
serjson send --port <device> [--baud <rate>] [--style compact|spaced] key=value...

Build a payload from the given pairs, print its JSON, and write it to the
port. Values containing '.' are floats, others integers.

Example:
  serjson send --port /dev/ttyUSB0 pulseWidth1=12 pulseInterval=12.5",
        "help" => "\
serjson help [command]",
        _ => return None,
    };
    Some(text.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_lists_commands() {
        let text = help_text(None);
        for cmd in ["tui", "ports", "keys", "send", "help"] {
            assert!(text.contains(cmd), "overview missing {}", cmd);
        }
    }

    #[test]
    fn command_topic() {
        assert!(help_text(Some("send")).contains("--port <device>"));
    }

    #[test]
    fn unknown_topic() {
        assert!(help_text(Some("flash")).starts_with("Unknown help topic"));
    }

    #[test]
    fn key_list_has_all_keys() {
        assert_eq!(
            key_list(),
            "pulseWidth1\ninterPulseDelay\npulseWidth2\npulseInterval"
        );
    }
}
