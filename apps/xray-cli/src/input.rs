//! Line-oriented console input.
//!
//! Shortcuts cover the intents a graphical front end would bind to buttons
//! and mouse clicks; anything else is read as a raw `verb/arg/...` command.

use tokio::sync::mpsc::{self, error::TrySendError};
use xray_client::ClientCommand;
use xray_core::BreakpointKind;
use xray_proto::{Command, ProtoError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Client(ClientCommand),
    /// Print the current mirror.
    Show,
    Help,
    Empty,
}

pub const HELP: &str = "\
shortcuts:
  s | step             step and fetch memory
  o | over             step over
  c | continue         continue
  p | pause            pause
  r | refresh          request context, registers and breakpoints
  m | mem              fetch memory for the current mode
  force                fetch the whole image
  mode                 toggle full image / video window
  sel <addr>|none      select an address
  region <n>|none      highlight region n
  bp <pc|mem|io>       add a breakpoint at the selection
  rm <id>              remove breakpoint
  show                 print registers, breakpoints and selection
  q | quit             exit
anything else is sent as a raw command, e.g. get_memory/15360/64";

pub fn parse(line: &str) -> Result<Input, ProtoError> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Input::Empty);
    };
    let arg = words.next();
    let invalid = || ProtoError::InvalidCommand(line.to_string());

    let command = match (head, arg) {
        ("q" | "quit" | "exit", None) => ClientCommand::Shutdown,
        ("h" | "help" | "?", None) => return Ok(Input::Help),
        ("show", None) => return Ok(Input::Show),
        ("s" | "step", None) => ClientCommand::Step,
        ("o" | "over", None) => ClientCommand::Send(Command::StepOver),
        ("c" | "continue", None) => ClientCommand::Send(Command::Continue),
        ("p" | "pause", None) => ClientCommand::Send(Command::Pause),
        ("r" | "refresh", None) => ClientCommand::Send(Command::Refresh),
        ("m" | "mem", None) => ClientCommand::RequestMemoryUpdate,
        ("force", None) => ClientCommand::Send(Command::ForceMemoryUpdate),
        ("mode", None) => ClientCommand::ToggleMemoryMode,
        ("sel", Some(addr)) => ClientCommand::Select(optional(addr, parse_address).ok_or_else(invalid)?),
        ("region", Some(n)) => {
            ClientCommand::SelectRegion(optional(n, |n| n.parse().ok()).ok_or_else(invalid)?)
        }
        ("bp", Some(kind)) => ClientCommand::AddBreakpointAtSelection(
            BreakpointKind::from_token(kind).ok_or_else(invalid)?,
        ),
        ("rm", Some(id)) => ClientCommand::Send(Command::RemoveBreakpoint {
            id: id.parse().map_err(|_| invalid())?,
        }),
        _ if arg.is_none() => ClientCommand::Send(Command::parse(head)?),
        _ => return Err(invalid()),
    };
    Ok(Input::Client(command))
}

/// `none` clears; anything else must parse.
fn optional<T>(word: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Option<T>> {
    if word.eq_ignore_ascii_case("none") {
        Some(None)
    } else {
        parse(word).map(Some)
    }
}

/// Decimal, `0x` hex or `$` hex.
pub fn parse_address(word: &str) -> Option<u16> {
    if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix('$')) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        word.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    Sent,
    /// The driver has not caught up; the command was not queued.
    Busy,
    /// The driver is gone.
    Closed,
}

/// Queue `command` for the driver without waiting for room.
pub fn submit(tx: &mpsc::Sender<ClientCommand>, command: ClientCommand) -> Submit {
    match tx.try_send(command) {
        Ok(()) => Submit::Sent,
        Err(TrySendError::Full(_)) => Submit::Busy,
        Err(TrySendError::Closed(_)) => Submit::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts() {
        assert_eq!(parse("s").unwrap(), Input::Client(ClientCommand::Step));
        assert_eq!(parse("  quit ").unwrap(), Input::Client(ClientCommand::Shutdown));
        assert_eq!(parse("").unwrap(), Input::Empty);
        assert_eq!(
            parse("sel $3C00").unwrap(),
            Input::Client(ClientCommand::Select(Some(0x3C00)))
        );
        assert_eq!(
            parse("sel none").unwrap(),
            Input::Client(ClientCommand::Select(None))
        );
        assert_eq!(
            parse("region 3").unwrap(),
            Input::Client(ClientCommand::SelectRegion(Some(3)))
        );
        assert_eq!(
            parse("bp io").unwrap(),
            Input::Client(ClientCommand::AddBreakpointAtSelection(
                BreakpointKind::IoWatch
            ))
        );
        assert_eq!(
            parse("rm 7").unwrap(),
            Input::Client(ClientCommand::Send(Command::RemoveBreakpoint { id: 7 }))
        );
    }

    #[test]
    fn raw_commands_pass_through() {
        assert_eq!(
            parse("get_memory/15360/64").unwrap(),
            Input::Client(ClientCommand::Send(Command::GetMemory {
                start: 15360,
                len: 64
            }))
        );
        assert_eq!(
            parse("hard_reset").unwrap(),
            Input::Client(ClientCommand::Send(Command::HardReset))
        );
    }

    #[test]
    fn bad_input_is_rejected() {
        for line in ["sel 0x10000", "bp nope", "rm x", "region -1", "step now", "add_breakpoint/pc"] {
            assert!(parse(line).is_err(), "{line:?}");
        }
    }

    #[test]
    fn address_forms() {
        assert_eq!(parse_address("15360"), Some(0x3C00));
        assert_eq!(parse_address("0x3c00"), Some(0x3C00));
        assert_eq!(parse_address("$FFFF"), Some(0xFFFF));
        assert_eq!(parse_address("65536"), None);
    }

    #[test]
    fn submit_reports_full_and_closed_channels() {
        let (tx, mut rx) = mpsc::channel(1);
        assert_eq!(submit(&tx, ClientCommand::Step), Submit::Sent);
        assert_eq!(submit(&tx, ClientCommand::Step), Submit::Busy);
        assert_eq!(rx.try_recv().unwrap(), ClientCommand::Step);
        assert!(rx.try_recv().is_err());

        assert_eq!(submit(&tx, ClientCommand::Shutdown), Submit::Sent);
        drop(rx);
        assert_eq!(submit(&tx, ClientCommand::Step), Submit::Closed);
    }
}
