//! Line-based parameter control from stdin.
//!
//! Commands: `start <hex>`, `end <hex>`, `height <number>`,
//! `distance <number>`, `quit`.

use std::io::BufRead;
use std::thread;

use crate::color::ColorStop;
use crate::controls::{ControlHandle, ControlMessage};

/// One parsed console line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Update(ControlMessage),
    Quit,
}

/// Parse one console line. Colours never fail (bad hex is black).
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let name = words.next().ok_or_else(|| "empty command".to_string())?;
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments for '{}'", name));
    }

    let number = |arg: Option<&str>| -> Result<f32, String> {
        let text = arg.ok_or_else(|| format!("'{}' needs a number", name))?;
        text.parse::<f32>()
            .map_err(|e| format!("invalid number '{}': {}", text, e))
    };

    match name.to_lowercase().as_str() {
        "start" => Ok(Command::Update(ControlMessage::SetStartColor(
            ColorStop::from_hex(arg.unwrap_or_default()),
        ))),
        "end" => Ok(Command::Update(ControlMessage::SetEndColor(
            ColorStop::from_hex(arg.unwrap_or_default()),
        ))),
        "height" => Ok(Command::Update(ControlMessage::SetHeightScale(number(arg)?))),
        "distance" => Ok(Command::Update(ControlMessage::SetDistanceScale(number(arg)?))),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}'", other)),
    }
}

/// Read commands from `input` until EOF or `quit`
pub fn run_console<R: BufRead>(input: R, handle: &ControlHandle) {
    for line in input.lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Update(message)) => {
                handle.send(message);
            }
            Ok(Command::Quit) => {
                handle.cancel();
                break;
            }
            Err(e) => log::warn!("Ignoring console input: {}", e),
        }
    }
}

/// Spawn the stdin reader thread
pub fn spawn_console(handle: ControlHandle) -> thread::JoinHandle<()> {
    thread::spawn(move || run_console(std::io::stdin().lock(), &handle))
}
