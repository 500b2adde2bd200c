//! Built-in TRS-80 memory map (Model I / III), largely from trs-80.com.
//!
//! Entry order matters: later, more specific entries refine earlier ones.

use crate::region::{RegionDescriptor, RegionIndex};

/// Start of the 64x16 text screen.
pub const VIDEO_RAM_START: u16 = 0x3C00;
/// Last byte of video RAM (inclusive).
pub const VIDEO_RAM_END: u16 = 0x3FFF;
pub const SCREEN_COLUMNS: usize = 64;
pub const SCREEN_ROWS: usize = 16;

pub fn memory_regions() -> Vec<RegionDescriptor> {
    use RegionDescriptor as R;
    vec![
        R::new(0x3C00..=0x3FFF, &[1, 3], "Video RAM"),
        R::at(0x37E1, &[1], "Disk drive select"),
        R::at(0x37E4, &[1], "Tape drive select: 0=#1 1=#2"),
        R::at(0x37E8, &[1, 3], "Printer Status: 63=On, 143=Off"),
        R::at(0x37E9, &[1, 3], "Printer output"),
        R::at(0x37EC, &[1], "Disk command/status"),
        R::at(0x37ED, &[1], "Disk track select"),
        R::at(0x37EE, &[1], "Disk sector select"),
        R::at(0x37EF, &[1], "Disk data"),
        R::new(0x3800..=0x3840, &[1, 3], "Keyboard matrix"),
        R::new(0x3FCD..=0x3FCE, &[], "End of BASIC Program Pointer (LSB)"),
        R::at(0x4000, &[], "RST 08 (Syntax Check)"),
        R::new(0x4001..=0x4014, &[200], "Jump vectors for RST 8 - RST 56"),
        R::new(0x4003..=0x4005, &[1, 3], "RST 10H (Get Next Character): Jump Vector."),
        R::at(0x4006, &[], "RST 18H (Cp HL)"),
        R::at(0x4009, &[], "RST 20H (Get Current Type) Jump Vector."),
        R::new(0x400C..=0x400E, &[1, 3], "RST 28H (Break Key Vector).  By default"),
        R::at(0x400F, &[3], "RST 30H Jump Vector."),
        R::new(0x4012..=0x4015, &[1, 3], "RST 38H Jump Vector."),
        R::new(
            0x4015..=0x401C,
            &[1, 3],
            "Beginning of the Keyboard Device Control Block (DCB)",
        ),
        R::at(0x4015, &[3], "Tape RAM - Keyboard DCB: Type = 1 = Read Only"),
        R::new(0x4016..=0x4017, &[1], "Two byte keyboard driver vector"),
        R::at(0x4016, &[3], "Two byte keyboard driver vector."),
        R::at(0x4018, &[1, 3], "Keyboard DCB: Right Shift Toggle"),
        R::at(0x4019, &[3], "Caps Lock Toggle.  0=Off (i.e."),
        R::at(0x401A, &[3], "Cursor Blink Count."),
        R::at(0x401B, &[3], "Cursor Blink Status. (0=Off Nz=On)"),
        R::at(0x401C, &[1, 3], "Cursor Blink Switch.  Set to 0 for blink"),
        R::new(
            0x401D..=0x4024,
            &[1, 3],
            "Beggining of Video Display Control Block (DCB).",
        ),
        R::at(0x401D, &[3], "Tape RAM - Video DCB: Type = 7 = Read/write"),
        R::new(0x401E..=0x401F, &[], "Two byte video driver vector"),
        R::at(0x401E, &[3], "Tape RAM - Video DCB: Driver Address (0473h)"),
        R::new(
            0x4020..=0x4021,
            &[1, 3],
            "Cursor Position On Screen. 2 Bytes in LSB/MSB Order",
        ),
        R::at(0x4022, &[], "Cursor (0=on)"),
        R::at(
            0x4022,
            &[3],
            "Cursor On/off Flag (z = Off Nz = Character Undercursor)",
        ),
        R::at(0x4023, &[], "Cursor Character (in ASCII). Defaults: 176."),
        R::at(
            0x4023,
            &[3],
            "Tape RAM - Video DCB: Cursor Character (default 0b0h)",
        ),
        R::at(
            0x4024,
            &[],
            "FLAG : 0 = Space compression; Not 0 = special character.",
        ),
        R::at(0x4024, &[3], "Character Set To Use:  0=Regular"),
        R::at(
            0x4024,
            &[3],
            "Tape RAM - Video DCB: Tabs/special Characters Switch (z = Tabs)",
        ),
    ]
}

/// Index over the full built-in table.
pub fn region_index() -> RegionIndex {
    RegionIndex::build(memory_regions())
}
