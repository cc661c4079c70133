//! `serecho` echo loop state machine.
//!
//! The loop alternates between waiting for input and draining it. Every
//! drained line is printed on the console and written back to the device. In
//! normal operation it never ends; only a shutdown request or an I/O failure
//! moves it to `Done`.
//!
//! ```text
//!                    START
//!                      |
//!          nothing     v
//!          pending .--------.  shutdown or
//!         .------->|  Idle  |--------------.
//!         |        '--------'  poll error  |
//!         '-----------'  ^  |              |
//!                        |  | data         |
//!                   line |  | available    |
//!                 echoed |  v              v
//!                   .----------.  I/O  .--------.
//!                   | Draining |------>|  Done  |
//!                   '----------' error '--------'
//!                                          |
//!                                          v
//!                                         END
//! ```

use std::{
    io::Write,
    sync::{atomic::AtomicBool, Arc},
};

use super::events::*;
use super::session::{LoopStats, Session};
use super::states::*;
use crate::{
    error::EchoError,
    utils::{SerialDevice, DEFAULT_LINE_CAPACITY},
};

// =============================================================================
// Public Interface
// =============================================================================

/// Echoes everything read from `device` back to it and to `console`.
///
/// The loop owns the device, so the device is released whenever the loop is
/// dropped, whatever the reason it stopped.
pub struct EchoLoop<D: SerialDevice, W: Write> {
    sm: EchoStates,
    session: Session<D, W>,
}
impl<D: SerialDevice, W: Write> EchoLoop<D, W> {
    /// Setting `shutdown` to `true` makes the loop stop the next time it is
    /// idle.
    pub fn new(device: D, console: W, shutdown: Arc<AtomicBool>) -> Self {
        EchoLoop {
            // The state machine naturally starts in the `Idle` state.
            sm: EchoStates::Idle(EchoSM::new()),
            session: Session {
                device,
                console,
                shutdown,
                line_capacity: DEFAULT_LINE_CAPACITY,
            },
        }
    }

    /// Change how many bytes a single line keeps before the rest of the
    /// burst is discarded.
    pub fn with_line_capacity(mut self, capacity: usize) -> Self {
        self.session.line_capacity = capacity;
        self
    }

    /// Run one state of the loop. Returns `Some` once the loop has finished,
    /// with the accumulated stats or the error that stopped it. The loop must
    /// not be stepped any further after that.
    pub fn step(&mut self) -> Option<Result<LoopStats, EchoError>> {
        self.sm = self.sm.step(&mut self.session);
        if let EchoStates::Done(sm) = &mut self.sm {
            if sm.state.should_exit {
                return Some(match sm.state.error.take() {
                    Some(error) => Err(error),
                    None => Ok(sm.stats),
                });
            }
        }
        None
    }

    /// The echo loop runs until the `Done` state is reached and its
    /// `should_exit` flag is set.
    pub fn run(&mut self) -> Result<LoopStats, EchoError> {
        loop {
            if let Some(result) = self.step() {
                return result;
            }
        }
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// The raw state machine. `stats` is shared by all states and travels with
/// the events from one state to the next.
#[derive(Debug)]
struct EchoSM<S: Runnable> {
    stats: LoopStats,
    state: S,
}
impl<S: Runnable> EchoSM<S> {
    fn run<D: SerialDevice, W: Write>(&mut self, session: &mut Session<D, W>) -> Event {
        self.state.run(&self.stats, session)
    }
}

impl EchoSM<IdleState> {
    fn new() -> Self {
        EchoSM {
            stats: LoopStats::default(),
            state: IdleState {},
        }
    }
}

/// An enum wrapper around the states of the echo loop, used for pattern
/// matching during state transitions.
enum EchoStates {
    Idle(EchoSM<IdleState>),
    Draining(EchoSM<DrainingState>),
    Done(EchoSM<DoneState>),
}
impl EchoStates {
    /// The unit of work in the event loop. It runs the current state and
    /// decides the next one from the event it fired.
    fn step<D: SerialDevice, W: Write>(&mut self, session: &mut Session<D, W>) -> Self {
        match self {
            EchoStates::Idle(sm) => {
                let event = sm.run(session);
                match event {
                    Event::KeepIdle(ev) => EchoStates::Idle(ev.into()),
                    Event::DataAvailable(ev) => EchoStates::Draining(ev.into()),
                    Event::Done(ev) => EchoStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            EchoStates::Draining(sm) => {
                let event = sm.run(session);
                match event {
                    Event::LineEchoed(ev) => EchoStates::Idle(ev.into()),
                    Event::Done(ev) => EchoStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            EchoStates::Done(sm) => {
                let event = sm.run(session);
                match event {
                    Event::Exit(ev) => EchoStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// State from Event transitions
// -----------------------------------------------------------------------------

impl From<KeepIdleEvent> for EchoSM<IdleState> {
    fn from(event: KeepIdleEvent) -> EchoSM<IdleState> {
        EchoSM {
            stats: event.stats,
            state: IdleState {},
        }
    }
}
impl From<LineEchoedEvent> for EchoSM<IdleState> {
    fn from(event: LineEchoedEvent) -> EchoSM<IdleState> {
        EchoSM {
            stats: event.stats,
            state: IdleState {},
        }
    }
}

impl From<DataAvailableEvent> for EchoSM<DrainingState> {
    fn from(event: DataAvailableEvent) -> EchoSM<DrainingState> {
        EchoSM {
            stats: event.stats,
            state: DrainingState { line: event.line },
        }
    }
}

impl From<DoneEvent> for EchoSM<DoneState> {
    fn from(event: DoneEvent) -> EchoSM<DoneState> {
        EchoSM {
            stats: event.stats,
            state: DoneState {
                error: event.error,
                should_exit: false,
            },
        }
    }
}
impl From<ExitEvent> for EchoSM<DoneState> {
    fn from(event: ExitEvent) -> EchoSM<DoneState> {
        EchoSM {
            stats: event.stats,
            state: DoneState {
                error: event.error,
                should_exit: true,
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, io, sync::atomic::Ordering};

    use super::*;

    /// A device that reports its queued bytes as available, and records what
    /// is written back to it.
    #[derive(Default)]
    struct SimulatedDevice {
        incoming: VecDeque<u8>,
        written: Vec<u8>,
        broken: bool,
    }
    impl SimulatedDevice {
        fn with_input(input: &[u8]) -> Self {
            SimulatedDevice {
                incoming: input.iter().cloned().collect(),
                ..Default::default()
            }
        }
    }
    impl SerialDevice for SimulatedDevice {
        fn bytes_available(&mut self) -> io::Result<u32> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            Ok(self.incoming.len() as u32)
        }

        fn read_byte(&mut self) -> io::Result<u8> {
            self.incoming
                .pop_front()
                .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
        }

        fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
            self.written.extend_from_slice(line);
            self.written.push(b'\n');
            Ok(())
        }
    }

    fn no_shutdown() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn echoes_one_line() {
        let mut device = SimulatedDevice::with_input(b"hi");
        let mut console = Vec::new();
        {
            let mut echo = EchoLoop::new(&mut device, &mut console, no_shutdown());
            // Idle -> Draining
            assert!(echo.step().is_none());
            // Draining -> Idle
            assert!(echo.step().is_none());
        }
        assert_eq!(console, b"hi\n");
        assert_eq!(device.written, b"hi\n");
        assert!(device.incoming.is_empty());
    }

    #[test]
    fn idle_device_echoes_nothing() {
        let mut device = SimulatedDevice::default();
        let mut console = Vec::new();
        {
            let mut echo = EchoLoop::new(&mut device, &mut console, no_shutdown());
            for _ in 0..5 {
                assert!(echo.step().is_none());
            }
        }
        assert!(console.is_empty());
        assert!(device.written.is_empty());
    }

    #[test]
    fn shutdown_returns_stats() {
        let shutdown = no_shutdown();
        let mut device = SimulatedDevice::with_input(b"hello");
        let mut console = Vec::new();
        let mut echo = EchoLoop::new(&mut device, &mut console, shutdown.clone());
        assert!(echo.step().is_none());
        assert!(echo.step().is_none());

        shutdown.store(true, Ordering::SeqCst);
        let stats = echo.run().unwrap();
        assert_eq!(
            stats,
            LoopStats {
                lines: 1,
                bytes: 5,
                dropped: 0,
            }
        );
    }

    #[test]
    fn shutdown_before_any_input() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let mut device = SimulatedDevice::with_input(b"never read");
        let mut console = Vec::new();
        let stats = EchoLoop::new(&mut device, &mut console, shutdown)
            .run()
            .unwrap();
        assert_eq!(stats, LoopStats::default());
        assert_eq!(device.incoming.len(), 10);
        assert!(console.is_empty());
    }

    #[test]
    fn oversized_burst_is_truncated() {
        let shutdown = no_shutdown();
        let mut device = SimulatedDevice::with_input(b"abcdefgh");
        let mut console = Vec::new();
        {
            let mut echo =
                EchoLoop::new(&mut device, &mut console, shutdown.clone()).with_line_capacity(5);
            assert!(echo.step().is_none());
            assert!(echo.step().is_none());
            shutdown.store(true, Ordering::SeqCst);
            let stats = echo.run().unwrap();
            assert_eq!(stats.bytes, 5);
            assert_eq!(stats.dropped, 3);
        }
        assert_eq!(console, b"abcde\n");
        assert_eq!(device.written, b"abcde\n");
        // The excess was drained from the device, not left for the next line.
        assert!(device.incoming.is_empty());
    }

    #[test]
    fn default_line_capacity() {
        let input = vec![b'x'; DEFAULT_LINE_CAPACITY + 1];
        let mut device = SimulatedDevice::with_input(&input);
        let mut console = Vec::new();
        {
            let mut echo = EchoLoop::new(&mut device, &mut console, no_shutdown());
            assert!(echo.step().is_none());
            assert!(echo.step().is_none());
        }
        assert_eq!(device.written.len(), DEFAULT_LINE_CAPACITY + 1);
        assert_eq!(console.len(), DEFAULT_LINE_CAPACITY + 1);
    }

    #[test]
    fn device_error_stops_the_loop() {
        let mut device = SimulatedDevice {
            broken: true,
            ..Default::default()
        };
        let mut console = Vec::new();
        let result = EchoLoop::new(&mut device, &mut console, no_shutdown()).run();
        match result {
            Err(EchoError::Device(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn console_error_stops_the_loop() {
        struct ClosedConsole;
        impl Write for ClosedConsole {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut device = SimulatedDevice::with_input(b"hi");
        let result = EchoLoop::new(&mut device, ClosedConsole, no_shutdown()).run();
        assert!(matches!(result, Err(EchoError::Console(_))));
        assert!(device.written.is_empty());
    }

    #[test]
    fn lines_are_echoed_in_order() {
        let mut device = SimulatedDevice::with_input(b"one");
        let mut console = Vec::new();
        {
            let mut echo = EchoLoop::new(&mut device, &mut console, no_shutdown());
            assert!(echo.step().is_none());
            assert!(echo.step().is_none());
        }
        device.incoming.extend(b"two".iter());
        {
            let mut echo = EchoLoop::new(&mut device, &mut console, no_shutdown());
            assert!(echo.step().is_none());
            assert!(echo.step().is_none());
        }
        assert_eq!(console, b"one\ntwo\n");
        assert_eq!(device.written, b"one\ntwo\n");
    }
}
