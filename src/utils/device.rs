//! The byte-level operations the echo loop needs from a serial device.

use std::io::{self, Read, Write};

use serialport::SerialPort;

/// A serial byte stream that can be polled for pending input.
///
/// Implemented for the ports opened through `serialport`; tests provide their
/// own simulated devices.
pub trait SerialDevice {
    /// Number of bytes that can be read right away without blocking.
    fn bytes_available(&mut self) -> io::Result<u32>;

    /// Read a single byte. Only called after [`bytes_available`] reported
    /// pending input.
    ///
    /// [`bytes_available`]: SerialDevice::bytes_available
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Write `line` followed by a newline, then flush.
    fn write_line(&mut self, line: &[u8]) -> io::Result<()>;
}

impl SerialDevice for Box<dyn SerialPort> {
    fn bytes_available(&mut self) -> io::Result<u32> {
        Ok(self.bytes_to_read()?)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        self.write_all(line)?;
        self.write_all(b"\n")?;
        self.flush()
    }
}

impl<D: SerialDevice + ?Sized> SerialDevice for &mut D {
    fn bytes_available(&mut self) -> io::Result<u32> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        (**self).write_line(line)
    }
}
