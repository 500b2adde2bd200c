//! Protocol session: connection state machine, command encoding and frame
//! routing.
//!
//! The session never awaits. A driver feeds it transport events and client
//! intents and calls [`ProtocolSession::tick`] whenever the timer it returned
//! last time expires.

use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::{debug, info, trace, warn};
use xray_core::{BreakpointKind, Mirror, RegionIndex};
use xray_proto::{Command, ControlMessage, Frame, Inbound, MemoryBlock, MemoryMode};

use crate::{
    config::SessionConfig,
    error::SessionError,
    events::{SessionEvent, StateFacets},
    transport::{ReadyState, Transport, TransportEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// The link failed; reconnection continues as for `Disconnected`.
    Erroring,
}

/// Intents coming from a renderer or the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Send(Command),
    /// `step` followed by a memory request for the current mode.
    Step,
    RequestMemoryUpdate,
    ToggleMemoryMode,
    Hover(Option<u16>),
    Select(Option<u16>),
    SelectRegion(Option<usize>),
    AddBreakpointAtSelection(BreakpointKind),
    Shutdown,
}

pub struct ProtocolSession<T> {
    transport: T,
    config: SessionConfig,
    state: ConnectionState,
    /// Last transport failure, kept until the next successful open.
    last_error: Option<String>,
    memory_mode: MemoryMode,
    mirror: Mirror,
    events: Sender<SessionEvent>,
    shutting_down: bool,
}

impl<T: Transport> ProtocolSession<T> {
    pub fn new(
        transport: T,
        config: SessionConfig,
        regions: RegionIndex,
        events: Sender<SessionEvent>,
    ) -> Self {
        let mirror = Mirror::new(regions, config.breakpoint_equality);
        Self {
            transport,
            memory_mode: config.memory_mode,
            config,
            state: ConnectionState::Disconnected,
            last_error: None,
            mirror,
            events,
            shutting_down: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The failure shown while the link is down, cleared once it reconnects.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn memory_mode(&self) -> MemoryMode {
        self.memory_mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Keep-alive check. Reopens the transport when it is down and returns
    /// the delay until the next tick.
    pub fn tick(&mut self) -> Duration {
        if self.shutting_down {
            return self.config.heartbeat_interval();
        }

        let ready = self.transport.ready_state();
        if ready == ReadyState::Open && self.state == ConnectionState::Connected {
            return self.config.heartbeat_interval();
        }

        if self.state == ConnectionState::Connected {
            warn!(?ready, "transport no longer open");
            self.set_state(ConnectionState::Erroring);
        }

        if ready.is_down() {
            debug!(url = %self.config.url, "opening transport");
            self.transport.open();
            self.set_state(ConnectionState::Connecting);
        }

        self.config.reconnect_interval()
    }

    /// Handle one transport notification.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.handle_opened(),
            TransportEvent::Frame(frame) => {
                if let Err(e) = self.handle_frame(frame) {
                    warn!(error = %e, "dropping frame");
                }
            }
            TransportEvent::Error(message) => {
                warn!(error = %message, "transport error");
                self.last_error = Some(message);
                self.set_state(ConnectionState::Erroring);
            }
            TransportEvent::Closed { reason } => {
                if self.shutting_down {
                    info!("transport closed");
                    self.set_state(ConnectionState::Disconnected);
                    return;
                }
                let reason = reason.unwrap_or_else(|| "connection closed".to_string());
                warn!(%reason, "transport closed unexpectedly");
                self.last_error = Some(reason);
                self.set_state(ConnectionState::Erroring);
            }
        }
    }

    fn handle_opened(&mut self) {
        info!(url = %self.config.url, "connected");
        self.last_error = None;
        self.set_state(ConnectionState::Connected);

        if let Err(e) = self.send_command(&Command::Refresh) {
            warn!(error = %e, "failed to request state");
            return;
        }
        if self.config.request_memory_on_connect {
            if let Err(e) = self.request_memory_update() {
                warn!(error = %e, "failed to request memory");
            }
        }
    }

    /// Decode a frame and route it into the mirror.
    ///
    /// Malformed or out-of-range frames are returned as errors and leave the
    /// mirror as it was.
    pub fn handle_frame(&mut self, frame: Frame) -> Result<(), SessionError> {
        match Inbound::decode(frame)? {
            Inbound::Memory(block) => self.apply_memory(block),
            Inbound::Control(message) => {
                self.apply_control(message);
                Ok(())
            }
        }
    }

    fn apply_memory(&mut self, block: MemoryBlock) -> Result<(), SessionError> {
        let delta = self.mirror.memory.apply_update(block.start, &block.payload)?;
        trace!(
            start = delta.start,
            len = delta.len,
            changed = delta.changed,
            "memory block applied"
        );
        self.emit(SessionEvent::MemoryUpdated(delta));
        Ok(())
    }

    fn apply_control(&mut self, message: ControlMessage) {
        let mut facets = StateFacets::empty();

        if let Some(context) = message.context {
            if self.mirror.set_context(context) {
                facets |= StateFacets::CONTEXT;
            }
        }
        if let Some(bundle) = message.registers {
            // Even identical values move previous PC/SP, so always redraw.
            self.mirror.registers.apply(bundle);
            facets |= StateFacets::REGISTERS;
        }
        if let Some(breakpoints) = message.breakpoints {
            if self.mirror.breakpoints.reconcile(breakpoints) {
                facets |= StateFacets::BREAKPOINTS;
            }
        }

        if !facets.is_empty() {
            self.emit(SessionEvent::StateChanged(facets));
        }
    }

    /// Encode and send one command. Fails with `NotConnected` unless the
    /// transport is open.
    pub fn send_command(&mut self, command: &Command) -> Result<(), SessionError> {
        if self.transport.ready_state() != ReadyState::Open {
            return Err(SessionError::NotConnected);
        }
        let text = command.to_wire(self.config.command_prefix.as_deref());
        trace!(%text, "send");
        self.transport.send(text)?;
        Ok(())
    }

    /// Send an arbitrary verb with its arguments.
    pub fn send_verb(
        &mut self,
        verb: &str,
        args: impl IntoIterator<Item = impl ToString>,
    ) -> Result<(), SessionError> {
        self.send_command(&Command::custom(verb, args))
    }

    /// Ask for the memory window selected by the current mode.
    pub fn request_memory_update(&mut self) -> Result<(), SessionError> {
        self.send_command(&self.memory_mode.request())
    }

    pub fn step(&mut self) -> Result<(), SessionError> {
        self.send_command(&Command::Step)?;
        self.request_memory_update()
    }

    pub fn toggle_memory_mode(&mut self) -> MemoryMode {
        self.memory_mode = self.memory_mode.toggled();
        info!(mode = ?self.memory_mode, "memory mode changed");
        self.emit(SessionEvent::StateChanged(StateFacets::MEMORY_MODE));
        self.memory_mode
    }

    /// Request a breakpoint at the selected address. The registry only
    /// changes once the target confirms it in a later frame.
    pub fn add_breakpoint_at_selection(&mut self, kind: BreakpointKind) -> Result<(), SessionError> {
        let address = self
            .mirror
            .selection
            .selected()
            .ok_or(SessionError::NoSelection)?;
        self.send_command(&Command::AddBreakpoint { kind, address })
    }

    /// Apply a client intent. `Shutdown` closes the transport.
    pub fn dispatch(&mut self, command: ClientCommand) -> Result<(), SessionError> {
        match command {
            ClientCommand::Send(command) => self.send_command(&command),
            ClientCommand::Step => self.step(),
            ClientCommand::RequestMemoryUpdate => self.request_memory_update(),
            ClientCommand::ToggleMemoryMode => {
                self.toggle_memory_mode();
                Ok(())
            }
            ClientCommand::Hover(address) => {
                if self.mirror.selection.hover(address) != address {
                    self.emit(SessionEvent::StateChanged(StateFacets::SELECTION));
                }
                Ok(())
            }
            ClientCommand::Select(address) => {
                if self.mirror.selection.select(address) != address {
                    self.emit(SessionEvent::StateChanged(StateFacets::SELECTION));
                }
                Ok(())
            }
            ClientCommand::SelectRegion(region) => {
                if self.mirror.selection.select_region(region) != region {
                    self.emit(SessionEvent::StateChanged(StateFacets::SELECTION));
                }
                Ok(())
            }
            ClientCommand::AddBreakpointAtSelection(kind) => self.add_breakpoint_at_selection(kind),
            ClientCommand::Shutdown => {
                self.shutdown();
                Ok(())
            }
        }
    }

    /// Close the transport and stop reconnecting.
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        info!("shutting down session");
        self.shutting_down = true;
        self.transport.close();
        if self.transport.ready_state() == ReadyState::Closed {
            self.set_state(ConnectionState::Disconnected);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutting_down
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        debug!(from = ?self.state, to = ?state, "connection state");
        self.state = state;
        self.emit(SessionEvent::StatusChanged(state));
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; the mirror is still readable.
        let _ = self.events.send(event);
    }
}
