//! States for the `serecho` echo loop state machine.
//!
//! This modules is private and restricted to the
//! [`echo_loop`](crate::echo_loop) scope. The public interface of the state
//! machine is provided by [`echo_loop`](crate::echo_loop).
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use std::{io::Write, sync::atomic::Ordering, thread};

use hexplay::HexViewBuilder;
use log::{debug, info, log_enabled, trace, warn, Level::Debug};

use super::events::*;
use super::session::{LoopStats, Session, POLL_INTERVAL};
use crate::{
    error::EchoError,
    utils::{LineBuffer, SerialDevice},
};

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// Trait adding the ability for a state to be `run` after a transition into it.
pub(crate) trait Runnable {
    /// A state implements this method so it can be `run` after the state
    /// machine transitions into it.
    ///
    /// During this call, the state can do any work that needs to be done and
    /// when finished, requests a transition to a `new state` by returning the
    /// appropriate `event`. The `event` is consumed to create the `new state`
    /// using the corresponding [`From`] trait implementation.
    fn run<D: SerialDevice, W: Write>(
        &mut self,
        stats: &LoopStats,
        session: &mut Session<D, W>,
    ) -> Event;
}

// Idle State ==================================================================

/// Waiting for the device to have something to read.
///
/// From the `IdleState`, the state machine can evolve via the following
/// transitions:
///
///  * **[`KeepIdleEvent`] => [`IdleState`]** when nothing is pending, after a
///    short pause,
///  * **[`DataAvailableEvent`] => [`DrainingState`]** as soon as the device
///    reports pending input,
///  * **[`DoneEvent`] => [`DoneState`]** when a shutdown was requested or the
///    device could not be polled.
#[derive(Debug)]
pub(crate) struct IdleState {}
impl Runnable for IdleState {
    fn run<D: SerialDevice, W: Write>(
        &mut self,
        stats: &LoopStats,
        session: &mut Session<D, W>,
    ) -> Event {
        if session.shutdown.load(Ordering::SeqCst) {
            info!("Shutdown requested");
            return Event::Done(DoneEvent {
                stats: *stats,
                error: None,
            });
        }

        match session.device.bytes_available() {
            Ok(0) => {
                thread::sleep(POLL_INTERVAL);
                Event::KeepIdle(KeepIdleEvent { stats: *stats })
            }
            Ok(available) => {
                trace!("Bytes available to read: {}", available);
                Event::DataAvailable(DataAvailableEvent {
                    stats: *stats,
                    line: LineBuffer::with_capacity(session.line_capacity),
                })
            }
            Err(e) => {
                info!("error: {:?}", e.to_string());
                Event::Done(DoneEvent {
                    stats: *stats,
                    error: Some(EchoError::Device(e)),
                })
            }
        }
    }
}

// Draining State ==============================================================

/// Copying the pending bytes into the line, then echoing the line.
///
/// Bytes are read one at a time for as long as the device reports more of
/// them. Once the device runs dry, the line is printed on the console and
/// written back to the device, each followed by a newline.
///
///  * **[`LineEchoedEvent`] => [`IdleState`]** after the line was echoed,
///  * **[`DoneEvent`] => [`DoneState`]** when the device or the console
///    failed.
#[derive(Debug)]
pub(crate) struct DrainingState {
    /// The line being filled. Its capacity bounds how much of a single burst
    /// is kept.
    pub line: LineBuffer,
}
impl Runnable for DrainingState {
    fn run<D: SerialDevice, W: Write>(
        &mut self,
        stats: &LoopStats,
        session: &mut Session<D, W>,
    ) -> Event {
        let failed = |error: EchoError| {
            info!("error: {:?}", error.to_string());
            Event::Done(DoneEvent {
                stats: *stats,
                error: Some(error),
            })
        };

        loop {
            match session.device.bytes_available() {
                Ok(0) => break,
                Ok(_) => match session.device.read_byte() {
                    Ok(byte) => {
                        self.line.push(byte);
                    }
                    Err(e) => return failed(EchoError::Device(e)),
                },
                Err(e) => return failed(EchoError::Device(e)),
            }
        }

        if self.line.dropped() > 0 {
            warn!(
                "line longer than {} bytes, discarded the last {} bytes",
                self.line.capacity(),
                self.line.dropped()
            );
        }

        thread::sleep(POLL_INTERVAL);

        // Dump the received data in a hex table for debugging
        if log_enabled!(Debug) {
            let view = HexViewBuilder::new(self.line.as_bytes())
                .address_offset(0)
                .row_width(16)
                .finish();
            debug!("received:\n{}", view);
        }

        let printed = writeln!(session.console, "{}", self.line.text())
            .and_then(|_| session.console.flush());
        if let Err(e) = printed {
            return failed(EchoError::Console(e));
        }
        if let Err(e) = session.device.write_line(self.line.as_bytes()) {
            return failed(EchoError::Device(e));
        }

        Event::LineEchoed(LineEchoedEvent {
            stats: stats.record(&self.line),
        })
    }
}

// Done State ==================================================================

/// Reached when the echo loop stops, normally or abnormally.
///
/// This state goes into a 2-phase execution. During the initial phase, it runs
/// like any other state to report how the loop ended. It then triggers the
/// [`ExitEvent`] to cause the event loop to terminate.
#[derive(Debug)]
pub(crate) struct DoneState {
    /// The failure that stopped the loop, if any. Handed over to the caller
    /// when the event loop exits.
    pub error: Option<EchoError>,
    /// When `true` instructs the echo loop to exit its event loop.
    pub should_exit: bool,
}
impl Runnable for DoneState {
    fn run<D: SerialDevice, W: Write>(
        &mut self,
        stats: &LoopStats,
        _session: &mut Session<D, W>,
    ) -> Event {
        info!(
            "=> Done with{}errors",
            if self.error.is_some() { " " } else { " no " }
        );
        Event::Exit(ExitEvent {
            stats: *stats,
            error: self.error.take(),
        })
    }
}
