//! Outgoing command vocabulary.
//!
//! A command travels as one text message shaped like a path: `verb[/arg]*`.
//! The session may put a fixed prefix in front (the emulator endpoint matches
//! on `action/...`). Verbs are not validated here; the target ignores what it
//! does not understand.

use std::fmt;

use serde::Deserialize;
use xray_core::BreakpointKind;
use xray_core::trs80::{VIDEO_RAM_END, VIDEO_RAM_START};

use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask for context, registers and breakpoints.
    Refresh,
    Step,
    StepOver,
    Continue,
    Stop,
    Pause,
    SoftReset,
    HardReset,
    /// Ask for a binary memory block.
    GetMemory { start: u16, len: u32 },
    /// Ask for the whole image regardless of what the target thinks changed.
    ForceMemoryUpdate,
    AddBreakpoint { kind: BreakpointKind, address: u16 },
    RemoveBreakpoint { id: u32 },
    KeyEvent { down: bool, shift: bool, key: String },
    /// Any other verb with primitive arguments.
    Custom { verb: String, args: Vec<String> },
}

impl Command {
    pub fn custom(verb: impl Into<String>, args: impl IntoIterator<Item = impl ToString>) -> Self {
        Self::Custom {
            verb: verb.into(),
            args: args.into_iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn verb(&self) -> &str {
        match self {
            Self::Refresh => "refresh",
            Self::Step => "step",
            Self::StepOver => "step-over",
            Self::Continue => "continue",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::SoftReset => "soft_reset",
            Self::HardReset => "hard_reset",
            Self::GetMemory { .. } | Self::ForceMemoryUpdate => "get_memory",
            Self::AddBreakpoint { .. } => "add_breakpoint",
            Self::RemoveBreakpoint { .. } => "remove_breakpoint",
            Self::KeyEvent { .. } => "key_event",
            Self::Custom { verb, .. } => verb.as_str(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        match self {
            Self::GetMemory { start, len } => vec![start.to_string(), len.to_string()],
            Self::ForceMemoryUpdate => vec!["force_update".to_string()],
            Self::AddBreakpoint { kind, address } => {
                vec![kind.token().to_string(), address.to_string()]
            }
            Self::RemoveBreakpoint { id } => vec![id.to_string()],
            Self::KeyEvent { down, shift, key } => vec![
                flag(*down).to_string(),
                flag(*shift).to_string(),
                key.clone(),
            ],
            Self::Custom { args, .. } => args.clone(),
            _ => Vec::new(),
        }
    }

    /// Text as sent on the wire, with an optional leading path segment.
    pub fn to_wire(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) => format!("{prefix}/{self}"),
            None => self.to_string(),
        }
    }

    /// Read back the `verb[/arg]*` form produced by `Display`.
    pub fn parse(text: &str) -> Result<Self, ProtoError> {
        let invalid = || ProtoError::InvalidCommand(text.to_string());
        let text = text.trim();
        let (verb, rest) = match text.split_once('/') {
            Some((verb, rest)) => (verb, Some(rest)),
            None => (text, None),
        };
        if verb.is_empty() {
            return Err(invalid());
        }

        let simple = match verb {
            "refresh" => Some(Self::Refresh),
            "step" => Some(Self::Step),
            "step-over" => Some(Self::StepOver),
            "continue" => Some(Self::Continue),
            "stop" => Some(Self::Stop),
            "pause" => Some(Self::Pause),
            "soft_reset" => Some(Self::SoftReset),
            "hard_reset" => Some(Self::HardReset),
            _ => None,
        };
        if let Some(cmd) = simple {
            return match rest {
                None => Ok(cmd),
                Some(_) => Err(invalid()),
            };
        }

        match (verb, rest) {
            ("get_memory", Some("force_update")) => Ok(Self::ForceMemoryUpdate),
            ("get_memory", Some(rest)) => {
                let (start, len) = rest.split_once('/').ok_or_else(invalid)?;
                Ok(Self::GetMemory {
                    start: start.parse().map_err(|_| invalid())?,
                    len: len.parse().map_err(|_| invalid())?,
                })
            }
            ("add_breakpoint", Some(rest)) => {
                let (kind, address) = rest.split_once('/').ok_or_else(invalid)?;
                Ok(Self::AddBreakpoint {
                    kind: BreakpointKind::from_token(kind).ok_or_else(invalid)?,
                    address: address.parse().map_err(|_| invalid())?,
                })
            }
            ("remove_breakpoint", Some(id)) => Ok(Self::RemoveBreakpoint {
                id: id.parse().map_err(|_| invalid())?,
            }),
            ("key_event", Some(rest)) => {
                // The key itself may contain '/'.
                let mut parts = rest.splitn(3, '/');
                let down = parse_flag(parts.next()).ok_or_else(invalid)?;
                let shift = parse_flag(parts.next()).ok_or_else(invalid)?;
                let key = parts.next().filter(|k| !k.is_empty()).ok_or_else(invalid)?;
                Ok(Self::KeyEvent {
                    down,
                    shift,
                    key: key.to_string(),
                })
            }
            ("get_memory" | "add_breakpoint" | "remove_breakpoint" | "key_event", None) => {
                Err(invalid())
            }
            (verb, rest) => Ok(Self::Custom {
                verb: verb.to_string(),
                args: rest
                    .map(|r| r.split('/').map(str::to_string).collect())
                    .unwrap_or_default(),
            }),
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn parse_flag(part: Option<&str>) -> Option<bool> {
    match part? {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())?;
        for arg in self.args() {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}

/// Which part of memory a routine refresh asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryMode {
    /// The whole 64 KiB image.
    #[default]
    Full,
    /// Only the text screen.
    VideoWindow,
}

impl MemoryMode {
    pub fn request(self) -> Command {
        match self {
            Self::Full => Command::GetMemory {
                start: 0,
                len: xray_core::ADDRESS_SPACE as u32,
            },
            Self::VideoWindow => Command::GetMemory {
                start: VIDEO_RAM_START,
                len: u32::from(VIDEO_RAM_END - VIDEO_RAM_START) + 1,
            },
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Full => Self::VideoWindow,
            Self::VideoWindow => Self::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_path_form() {
        assert_eq!(Command::Refresh.to_string(), "refresh");
        assert_eq!(Command::StepOver.to_string(), "step-over");
        assert_eq!(
            Command::GetMemory {
                start: 0,
                len: 65536
            }
            .to_string(),
            "get_memory/0/65536"
        );
        assert_eq!(
            Command::AddBreakpoint {
                kind: BreakpointKind::ProgramCounter,
                address: 0x4A20
            }
            .to_string(),
            "add_breakpoint/pc/18976"
        );
        assert_eq!(
            Command::RemoveBreakpoint { id: 3 }.to_string(),
            "remove_breakpoint/3"
        );
        assert_eq!(
            Command::KeyEvent {
                down: true,
                shift: false,
                key: "A".into()
            }
            .to_string(),
            "key_event/1/0/A"
        );
        assert_eq!(
            Command::ForceMemoryUpdate.to_string(),
            "get_memory/force_update"
        );
        assert_eq!(Command::custom("poke", [16384, 65]).to_string(), "poke/16384/65");
    }

    #[test]
    fn wire_prefix() {
        assert_eq!(Command::Step.to_wire(Some("action")), "action/step");
        assert_eq!(Command::Step.to_wire(None), "step");
    }

    #[test]
    fn parses_known_verbs() {
        assert_eq!(Command::parse("continue").unwrap(), Command::Continue);
        assert_eq!(
            Command::parse("get_memory/15360/1024").unwrap(),
            Command::GetMemory {
                start: 15360,
                len: 1024
            }
        );
        assert_eq!(
            Command::parse("add_breakpoint/mem/100").unwrap(),
            Command::AddBreakpoint {
                kind: BreakpointKind::MemoryWatch,
                address: 100
            }
        );
        assert_eq!(
            Command::parse("key_event/0/1//").unwrap(),
            Command::KeyEvent {
                down: false,
                shift: true,
                key: "/".into()
            }
        );
        assert_eq!(
            Command::parse("poke/1/2").unwrap(),
            Command::custom("poke", ["1", "2"])
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        for text in [
            "",
            "step/now",
            "get_memory",
            "get_memory/abc/1",
            "add_breakpoint/xx/1",
            "add_breakpoint/pc/70000",
            "remove_breakpoint",
            "key_event/2/0/a",
            "key_event/1/0/",
        ] {
            assert!(Command::parse(text).is_err(), "{text:?}");
        }
    }

    #[test]
    fn memory_modes() {
        assert_eq!(MemoryMode::Full.request().to_string(), "get_memory/0/65536");
        assert_eq!(
            MemoryMode::VideoWindow.request().to_string(),
            "get_memory/15360/1024"
        );
        assert_eq!(MemoryMode::Full.toggled(), MemoryMode::VideoWindow);
    }
}
