use crate::command::Command;
use crate::payload::{JsonStyle, ParamKey};


/// Parse CLI arguments into a typed Command.
///
/// Arguments are expected WITHOUT the program name. No arguments, or only
/// flags, launch the form.
pub fn parse_args(args: &[&str]) -> Result<Command, String> {
    match args.first() {
        None => Ok(Command::Tui {
            port: None,
            baud: None,
        }),
        Some(first) if first.starts_with("--") => parse_tui(args),
        Some(&"tui") => parse_tui(&args[1..]),
        Some(&"ports") => Ok(Command::Ports),
        Some(&"keys") => Ok(Command::Keys),
        Some(&"send") => parse_send(&args[1..]),
        Some(&"help") | Some(&"-h") => Ok(Command::Help {
            topic: args.get(1).map(|s| s.to_string()),
        }),
        Some(other) => Err(format!(
            "Unknown command: '{}'. Run 'serjson help' for usage.",
            other
        )),
    }
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `serjson [tui] [--port <p>] [--baud <b>]`
fn parse_tui(args: &[&str]) -> Result<Command, String> {
    let mut port = None;
    let mut baud = None;
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--port" => {
                i += 1;
                port = Some(take_arg(args, i, "--port")?);
            }
            "--baud" => {
                i += 1;
                baud = Some(take_arg(args, i, "--baud")?);
            }
            other => return Err(format!("Unknown flag for tui: '{}'", other)),
        }
        i += 1;
    }
    Ok(Command::Tui { port, baud })
}

/// `serjson send --port <p> [--baud <b>] [--style compact|spaced] key=value...`
fn parse_send(args: &[&str]) -> Result<Command, String> {
    let mut port = None;
    let mut baud = None;
    let mut style = None;
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--port" => {
                i += 1;
                port = Some(take_arg(args, i, "--port")?);
            }
            "--baud" => {
                i += 1;
                baud = Some(take_arg(args, i, "--baud")?);
            }
            "--style" => {
                i += 1;
                let text = take_arg(args, i, "--style")?;
                style = Some(
                    JsonStyle::parse(&text)
                        .ok_or_else(|| format!("Unknown style: '{}' (compact|spaced)", text))?,
                );
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown flag for send: '{}'", flag));
            }
            pair => pairs.push(parse_pair(pair)?),
        }
        i += 1;
    }
    let port = port.ok_or_else(|| {
        "Usage: serjson send --port <p> [--baud <b>] [--style <s>] key=value...".to_string()
    })?;
    Ok(Command::Send {
        port,
        baud,
        style,
        pairs,
    })
}

/// `pulseWidth1=12`
fn parse_pair(text: &str) -> Result<(ParamKey, String), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("Expected key=value, got '{}'", text))?;
    let key = ParamKey::from_wire_name(key).ok_or_else(|| {
        format!("Unknown key: '{}'. Run 'serjson keys' for the list.", key)
    })?;
    Ok((key, value.to_string()))
}


// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn take_arg(args: &[&str], index: usize, flag: &str) -> Result<String, String> {
    if index >= args.len() {
        return Err(format!("{} requires a value", flag));
    }
    Ok(args[index].into())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
