//! Events for the `serecho` echo loop state machine.
//!
//! This modules is private and restricted to the
//! [`echo_loop`](crate::echo_loop) scope. The public interface of the state
//! machine is provided by [`echo_loop`](crate::echo_loop).
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use super::session::LoopStats;
use crate::{error::EchoError, utils::LineBuffer};

// =============================================================================
// Crate-Public Interface
// =============================================================================

// KeepIdleEvent ===============================================================

/// Event fired by the `Idle` state when the device has nothing to read, so
/// that the next step polls it again.
#[derive(Debug)]
pub(crate) struct KeepIdleEvent {
    pub stats: LoopStats,
}

// DataAvailableEvent ==========================================================

/// Event fired when the device reports pending input. It triggers the
/// transition to the `Draining` state, handing it the empty line to fill.
#[derive(Debug)]
pub(crate) struct DataAvailableEvent {
    pub stats: LoopStats,
    /// Consumed and moved to the next state.
    pub line: LineBuffer,
}

// LineEchoedEvent =============================================================

/// Event fired once a drained line has been printed and written back to the
/// device. It triggers the transition back to the `Idle` state.
#[derive(Debug)]
pub(crate) struct LineEchoedEvent {
    pub stats: LoopStats,
}

// DoneEvent ===================================================================

/// Event fired when echoing has to stop, either because a shutdown was
/// requested or because the device or the console failed. It triggers a
/// transition to the `Done` state.
#[derive(Debug)]
pub(crate) struct DoneEvent {
    pub stats: LoopStats,
    /// The failure that stopped the loop, `None` for a requested shutdown.
    pub error: Option<EchoError>,
}

// ExitEvent ===================================================================

/// The last event of the echo loop. The event loop terminates and hands back
/// the stats, or the error, to the caller.
#[derive(Debug)]
pub(crate) struct ExitEvent {
    pub stats: LoopStats,
    pub error: Option<EchoError>,
}

// Events enum ==================================================================

/// Events that can be triggered within the echo loop state machine.
#[derive(Debug)]
pub(crate) enum Event {
    KeepIdle(KeepIdleEvent),
    DataAvailable(DataAvailableEvent),
    LineEchoed(LineEchoedEvent),
    Done(DoneEvent),
    Exit(ExitEvent),
}
