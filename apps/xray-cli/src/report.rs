//! Console rendering of session events and mirror state.

use std::fmt::Write;

use xray_client::{ConnectionState, SessionEvent, StateFacets};
use xray_core::{FlagBits, MemoryGrid, Mirror, Registers};
use xray_proto::MemoryMode;

pub fn status(state: ConnectionState, error: Option<&str>) -> String {
    match (state, error) {
        (ConnectionState::Connected, _) => "[connected]".to_string(),
        (_, Some(error)) => format!("[{state:?}] {error}"),
        (_, None) => format!("[{state:?}]"),
    }
}

/// One line per event, or `None` when there is nothing worth printing.
pub fn event(event: &SessionEvent, mirror: &Mirror, mode: MemoryMode) -> Option<String> {
    match event {
        SessionEvent::StatusChanged(_) => None,
        SessionEvent::MemoryUpdated(delta) => Some(format!(
            "memory {:04X}+{}: {} changed{}",
            delta.start,
            delta.len,
            delta.changed,
            changed_preview(mirror)
        )),
        SessionEvent::StateChanged(facets) => {
            let mut lines = Vec::new();
            if facets.contains(StateFacets::CONTEXT) {
                if let Some(ctx) = &mirror.context {
                    let model = ctx
                        .model_type()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("model {}", ctx.model));
                    lines.push(format!("target {} ({model})", ctx.system_name));
                }
            }
            if facets.contains(StateFacets::REGISTERS) {
                lines.push(registers(mirror));
            }
            if facets.contains(StateFacets::BREAKPOINTS) {
                lines.push(breakpoints(mirror));
            }
            if facets.contains(StateFacets::SELECTION) {
                lines.push(selection(mirror));
            }
            if facets.contains(StateFacets::MEMORY_MODE) {
                lines.push(format!("memory mode {mode:?}"));
            }
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
    }
}

/// Full dump for the `show` command.
pub fn mirror(mirror: &Mirror) -> String {
    [registers(mirror), breakpoints(mirror), selection(mirror), screen(mirror)].join("\n")
}

fn changed_preview(mirror: &Mirror) -> String {
    const SHOWN: usize = 8;
    let changed = mirror.memory.changed_addresses();
    if changed.is_empty() {
        return String::new();
    }
    let mut out = String::from(" [");
    for (i, addr) in changed.iter().take(SHOWN).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{addr:04X}={:02X}", mirror.memory.value_at(*addr));
    }
    if changed.len() > SHOWN {
        out.push_str(" ...");
    }
    out.push(']');
    out
}

fn registers(mirror: &Mirror) -> String {
    let snapshot = &mirror.registers;
    if !snapshot.is_populated() {
        return "registers: none yet".to_string();
    }
    let r: &Registers = snapshot.current();
    let grid = MemoryGrid::default();
    let (col, row) = grid.cell_of(snapshot.pc());
    let (prev_col, prev_row) = grid.cell_of(snapshot.previous_pc());
    format!(
        "AF={:04X} BC={:04X} DE={:04X} HL={:04X} IX={:04X} IY={:04X} SP={:04X} PC={:04X} \
         AF'={:04X} BC'={:04X} DE'={:04X} HL'={:04X} I={:02X} R={:02X} \
         flags={} flags'={}\n\
         pc {:04X} -> {:04X} (cell {prev_col},{prev_row} -> {col},{row}){}",
        r.af.value(),
        r.bc.value(),
        r.de.value(),
        r.hl.value(),
        r.ix.value(),
        r.iy.value(),
        r.sp.value(),
        r.pc.value(),
        r.af_alt.value(),
        r.bc_alt.value(),
        r.de_alt.value(),
        r.hl_alt.value(),
        r.aux.i,
        r.aux.r,
        flag_string(r.flags()),
        flag_string(r.alt_flags()),
        snapshot.previous_pc(),
        snapshot.pc(),
        mirror
            .regions
            .region_at(snapshot.pc())
            .map(|region| format!(" in {}", region.description()))
            .unwrap_or_default(),
    )
}

/// `SZ5H3PNC`, with `-` for each clear bit.
fn flag_string(f: FlagBits) -> String {
    [
        (f.sign, 'S'),
        (f.zero, 'Z'),
        (f.undoc5, '5'),
        (f.half_carry, 'H'),
        (f.undoc3, '3'),
        (f.overflow, 'P'),
        (f.subtract, 'N'),
        (f.carry, 'C'),
    ]
    .into_iter()
    .map(|(set, c)| if set { c } else { '-' })
    .collect()
}

fn breakpoints(mirror: &Mirror) -> String {
    let list = mirror.breakpoints.breakpoints();
    if list.is_empty() {
        return "breakpoints: none".to_string();
    }
    let mut out = String::from("breakpoints:");
    for bp in list {
        let _ = write!(out, "\n  #{} {:04X} {}", bp.id, bp.address, bp.kind);
    }
    out
}

fn selection(mirror: &Mirror) -> String {
    let sel = &mirror.selection;
    let mut out = match sel.selected() {
        Some(addr) => format!(
            "selected {addr:04X} = {:02X} ({:?})",
            mirror.memory.value_at(addr),
            mirror.cell_state(addr)
        ),
        None => "selected none".to_string(),
    };
    if let Some(addr) = sel.selected() {
        for bp in mirror.breakpoints.at_address(addr) {
            let _ = write!(out, "; breakpoint #{} {}", bp.id, bp.kind);
        }
    }
    if let Some(region) = sel.selected_region().and_then(|i| mirror.regions.descriptor(i)) {
        let _ = write!(
            out,
            "; region {:04X}-{:04X} {}",
            region.start(),
            region.end(),
            region.description()
        );
    }
    out
}

/// Text screen as 16 lines of 64 characters.
fn screen(mirror: &Mirror) -> String {
    let mut out = String::from("screen:");
    for row in mirror.memory.screen_rows() {
        out.push_str("\n  |");
        out.extend(row.iter().map(|b| match b & 0x7F {
            c @ 0x20..=0x7E => c as char,
            _ => ' ',
        }));
        out.push('|');
    }
    out
}
