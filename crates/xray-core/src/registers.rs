//! Z80 register file as reported by the target.

use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Bit masks of the Z80 flag register (low byte of AF).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flag: u8 {
        const SIGN = 0x80;
        const ZERO = 0x40;
        const UNDOC5 = 0x20;
        const HALF_CARRY = 0x10;
        const UNDOC3 = 0x08;
        const OVERFLOW = 0x04;
        const SUBTRACT = 0x02;
        const CARRY = 0x01;
    }
}

/// The flag byte split into named bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagBits {
    pub sign: bool,
    pub zero: bool,
    pub undoc5: bool,
    pub half_carry: bool,
    pub undoc3: bool,
    /// Overflow / parity.
    pub overflow: bool,
    pub subtract: bool,
    pub carry: bool,
}

impl FlagBits {
    pub fn decode(f: u8) -> Self {
        let flags = Flag::from_bits_retain(f);
        Self {
            sign: flags.contains(Flag::SIGN),
            zero: flags.contains(Flag::ZERO),
            undoc5: flags.contains(Flag::UNDOC5),
            half_carry: flags.contains(Flag::HALF_CARRY),
            undoc3: flags.contains(Flag::UNDOC3),
            overflow: flags.contains(Flag::OVERFLOW),
            subtract: flags.contains(Flag::SUBTRACT),
            carry: flags.contains(Flag::CARRY),
        }
    }
}

/// A 16-bit register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct RegisterPair(pub u16);

impl RegisterPair {
    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn lo(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }
}

/// Extra CPU state carried next to the register pairs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AuxRegisters {
    #[serde(default)]
    pub i: u8,
    #[serde(default, rename = "r_1")]
    pub r: u8,
    #[serde(default, rename = "r_2")]
    pub r7: u8,
    #[serde(default, rename = "z80_t_state_counter")]
    pub t_states: u64,
    #[serde(default, rename = "z80_clockspeed")]
    pub clock_mhz: f32,
    #[serde(default, rename = "z80_iff1")]
    pub iff1: u8,
    #[serde(default, rename = "z80_iff2")]
    pub iff2: u8,
    #[serde(default, rename = "z80_interrupt_mode")]
    pub interrupt_mode: u8,
}

/// `registers` object of a control frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegisterBundle {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub af_prime: u16,
    pub bc_prime: u16,
    pub de_prime: u16,
    pub hl_prime: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    #[serde(flatten)]
    pub aux: AuxRegisters,
}

/// Decoded register file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Registers {
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub af_alt: RegisterPair,
    pub bc_alt: RegisterPair,
    pub de_alt: RegisterPair,
    pub hl_alt: RegisterPair,
    pub ix: RegisterPair,
    pub iy: RegisterPair,
    pub sp: RegisterPair,
    pub pc: RegisterPair,
    pub aux: AuxRegisters,
}

impl Registers {
    pub fn flags(&self) -> FlagBits {
        FlagBits::decode(self.af.lo())
    }

    pub fn alt_flags(&self) -> FlagBits {
        FlagBits::decode(self.af_alt.lo())
    }
}

impl From<RegisterBundle> for Registers {
    fn from(b: RegisterBundle) -> Self {
        Self {
            af: RegisterPair(b.af),
            bc: RegisterPair(b.bc),
            de: RegisterPair(b.de),
            hl: RegisterPair(b.hl),
            af_alt: RegisterPair(b.af_prime),
            bc_alt: RegisterPair(b.bc_prime),
            de_alt: RegisterPair(b.de_prime),
            hl_alt: RegisterPair(b.hl_prime),
            ix: RegisterPair(b.ix),
            iy: RegisterPair(b.iy),
            sp: RegisterPair(b.sp),
            pc: RegisterPair(b.pc),
            aux: b.aux,
        }
    }
}

/// Current register file plus the PC/SP it replaced.
#[derive(Debug, Clone, Default)]
pub struct RegisterSnapshot {
    current: Arc<Registers>,
    previous_pc: u16,
    previous_sp: u16,
    received: bool,
}

impl RegisterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the whole register file. Returns `true` if any value differs
    /// from the one it replaced.
    pub fn apply(&mut self, bundle: RegisterBundle) -> bool {
        let next = Registers::from(bundle);
        let changed = !self.received || *self.current != next;
        self.previous_pc = self.current.pc.value();
        self.previous_sp = self.current.sp.value();
        self.current = Arc::new(next);
        self.received = true;
        changed
    }

    /// Whether any register update has arrived yet.
    pub fn is_populated(&self) -> bool {
        self.received
    }

    pub fn current(&self) -> &Registers {
        &self.current
    }

    pub fn snapshot(&self) -> Arc<Registers> {
        Arc::clone(&self.current)
    }

    pub fn pc(&self) -> u16 {
        self.current.pc.value()
    }

    pub fn previous_pc(&self) -> u16 {
        self.previous_pc
    }

    pub fn sp(&self) -> u16 {
        self.current.sp.value()
    }

    pub fn previous_sp(&self) -> u16 {
        self.previous_sp
    }

    pub fn flags(&self) -> FlagBits {
        self.current.flags()
    }

    /// `(previous_pc, pc)` once registers have been received.
    pub fn pc_transition(&self) -> Option<(u16, u16)> {
        self.received.then(|| (self.previous_pc, self.pc()))
    }
}
