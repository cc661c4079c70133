//! Helpers to deal with the serial device and the data read from it.

mod device;
mod line_buffer;
mod ports;

pub use device::SerialDevice;
pub use line_buffer::{LineBuffer, DEFAULT_LINE_CAPACITY};
pub use ports::open_and_setup_port;
