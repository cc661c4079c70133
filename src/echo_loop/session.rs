//! Data shared by all the states of the echo loop.

use std::{
    io::Write,
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

use crate::utils::{LineBuffer, SerialDevice};

/// Pause between draining the device and echoing the line, and between two
/// polls of an idle device.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Counters accumulated while echoing, reported when the loop finishes.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct LoopStats {
    /// Lines echoed back to the device.
    pub lines: u64,
    /// Payload bytes echoed, newlines not included.
    pub bytes: u64,
    /// Bytes received but discarded because a line was full.
    pub dropped: u64,
}
impl LoopStats {
    pub(crate) fn record(mut self, line: &LineBuffer) -> Self {
        self.lines += 1;
        self.bytes += line.len() as u64;
        self.dropped += line.dropped() as u64;
        self
    }
}

/// The resources the echo loop owns for its whole lifetime. Dropping the
/// session releases the device.
pub(crate) struct Session<D: SerialDevice, W: Write> {
    pub device: D,
    pub console: W,
    pub shutdown: Arc<AtomicBool>,
    pub line_capacity: usize,
}
