//! Inbound frame classification.
//!
//! Binary frames always carry a memory block: a big-endian start address
//! followed by the raw bytes. Text frames carry a JSON object whose optional
//! `context`, `registers` and `breakpoints` members each update one facet of
//! the mirror.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use xray_core::{Breakpoint, RegisterBundle, SystemContext};

use crate::error::ProtoError;

/// Length of the start-address prefix of a binary frame.
pub const MEMORY_HEADER_LEN: usize = 2;

/// One message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Binary(Bytes),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBlock {
    pub start: u16,
    pub payload: Bytes,
}

impl MemoryBlock {
    pub fn decode(mut data: Bytes) -> Result<Self, ProtoError> {
        if data.len() < MEMORY_HEADER_LEN {
            return Err(ProtoError::TooShort { len: data.len() });
        }
        let start = u16::from_be_bytes([data[0], data[1]]);
        let payload = data.split_off(MEMORY_HEADER_LEN);
        Ok(Self { start, payload })
    }

    pub fn encode(start: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(MEMORY_HEADER_LEN + payload.len());
        out.extend_from_slice(&start.to_be_bytes());
        out.extend_from_slice(payload);
        out
    }
}

/// Text frame body. Absent members leave that facet untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<SystemContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registers: Option<RegisterBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Vec<Breakpoint>>,
}

impl ControlMessage {
    pub fn parse(text: &str) -> Result<Self, ProtoError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ProtoError::NotAnObject);
        }
        Ok(Self::deserialize(value)?)
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_none() && self.registers.is_none() && self.breakpoints.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Memory(MemoryBlock),
    Control(ControlMessage),
}

impl Inbound {
    pub fn decode(frame: Frame) -> Result<Self, ProtoError> {
        match frame {
            Frame::Binary(data) => MemoryBlock::decode(data).map(Self::Memory),
            Frame::Text(text) => ControlMessage::parse(&text).map(Self::Control),
        }
    }
}
