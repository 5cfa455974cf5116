//! SerJSON CLI: the command-line entry point.
//!
//! # Usage
//!
//! ```text
//! serjson                                   # interactive form
//! serjson tui --port /dev/ttyUSB0 --baud 9600
//! serjson ports
//! serjson send --port COM3 pulseWidth1=12 pulseInterval=12.5
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use serjson_core::cli::parse_args;
use serjson_core::command::Command;
use serjson_core::errors::SessionError;
use serjson_core::help::{help_text, key_list};
use serjson_core::link::{list_ports, PortOpener, SystemOpener};
use serjson_core::payload::{JsonStyle, ParamKey};
use serjson_core::session::Session;
use serjson_core::settings::{self, Settings};

const LOG_FILE: &str = "serjson.log";


fn main() {
    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let cmd = match parse_args(&arg_refs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("serjson: {}", e);
            process::exit(1);
        }
    };

    let config_dir = resolve_config_dir();
    if let Err(e) = init_logging(&config_dir) {
        // The form owns the terminal, so logging is best-effort.
        eprintln!("serjson: logging disabled ({})", e);
    }

    let settings = match settings::load(&config_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("serjson: {}", e);
            process::exit(1);
        }
    };

    match cmd {
        Command::Tui { port, baud } => {
            let session = Session::new(Box::new(SystemOpener), settings);
            let result = serjson_tui::tui::Tui::new(
                session,
                list_ports,
                port.as_deref(),
                baud.as_deref(),
            )
            .and_then(|mut tui| tui.run());
            if let Err(e) = result {
                eprintln!("serjson tui: {}", e);
                process::exit(1);
            }
        }
        Command::Ports => {
            for port in list_ports() {
                println!("{}", port);
            }
        }
        Command::Keys => println!("{}", key_list()),
        Command::Help { topic } => println!("{}", help_text(topic.as_deref())),
        Command::Send {
            port,
            baud,
            style,
            pairs,
        } => {
            let request = SendRequest {
                port: &port,
                baud: baud.as_deref(),
                style,
                pairs: &pairs,
            };
            match send_once(Box::new(SystemOpener), &settings, &request) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("serjson: {}: {}", e.title(), e);
                    process::exit(1);
                }
            }
        }
    }
}


fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SERJSON_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("serjson")
}


/// Install a file-backed tracing subscriber. Level comes from `SERJSON_LOG`.
fn init_logging(config_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(config_dir)
        .map_err(|e| format!("cannot create '{}': {}", config_dir.display(), e))?;
    let path = config_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("cannot open '{}': {}", path.display(), e))?;
    let filter =
        EnvFilter::try_from_env("SERJSON_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e.to_string())
}


/// Parameters of a one-shot send.
struct SendRequest<'a> {
    port: &'a str,
    baud: Option<&'a str>,
    style: Option<JsonStyle>,
    pairs: &'a [(ParamKey, String)],
}


/// Build a payload from `request.pairs`, open the port, write it once, and
/// close. Values are checked before the port is touched. Returns the JSON
/// that was sent.
fn send_once(
    opener: Box<dyn PortOpener>,
    settings: &Settings,
    request: &SendRequest,
) -> Result<String, SessionError> {
    let settings = Settings {
        json_style: request.style.unwrap_or(settings.json_style),
        ..settings.clone()
    };
    let default_baud = settings.baud_rate.to_string();
    let baud = request.baud.unwrap_or(&default_baud).to_string();

    let mut session = Session::new(opener, settings);
    for (key, value) in request.pairs {
        session.modify(*key, value)?;
    }
    session.toggle(request.port, &baud)?;
    let result = session.send();
    session.close();
    match result {
        Ok(n) => {
            info!("one-shot send of {} bytes to {}", n, request.port);
            Ok(session.preview())
        }
        Err(e) => {
            warn!("one-shot send to {} failed: {}", request.port, e);
            Err(e)
        }
    }
}
