//! Errors reported by `serecho`.
//!
//! Every error is fatal. They are propagated as [`EchoError`] up to the single
//! handler in the command line binary, which prints the message and exits with
//! [`EchoError::exit_code`].

use std::io;

use thiserror::Error;

/// All the ways `serecho` can fail.
#[derive(Error, Debug)]
pub enum EchoError {
    /// The command line could not be understood.
    #[error("unrecognized input arg(s)\n{0}")]
    InvalidArguments(String),

    /// The requested baud rate is not one of
    /// [`SUPPORTED_BAUD_RATES`](crate::SUPPORTED_BAUD_RATES).
    #[error("unrecognized baudrate `{0}`")]
    UnsupportedBaudRate(u32),

    /// The serial device does not exist or could not be opened.
    #[error("unable to open serial port `{path}`: {source}")]
    SerialPortUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A value did not fit in its bounded storage.
    #[error("memory error: {0}")]
    MemoryError(String),

    /// Reading from or writing to the serial device failed while echoing.
    #[error("serial device error: {0}")]
    Device(#[source] io::Error),

    /// Writing the echoed line to the console failed.
    #[error("console error: {0}")]
    Console(#[source] io::Error),

    /// The Ctrl+C handler could not be installed.
    #[error("failed to install the Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl EchoError {
    /// The process exit status for this error. All kinds share the same
    /// status and are told apart only by their message.
    pub fn exit_code(&self) -> i32 {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_exit_code() {
        let errors = vec![
            EchoError::InvalidArguments("x".into()),
            EchoError::UnsupportedBaudRate(0),
            EchoError::SerialPortUnavailable {
                path: "/dev/null0".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
            EchoError::MemoryError("x".into()),
            EchoError::Device(io::Error::from(io::ErrorKind::BrokenPipe)),
            EchoError::Console(io::Error::from(io::ErrorKind::BrokenPipe)),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), -1, "{}", err);
        }
    }

    #[test]
    fn port_message_includes_os_error() {
        let err = EchoError::SerialPortUnavailable {
            path: "/dev/ttyXYZ".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/dev/ttyXYZ"));
        assert!(msg.contains("No such file or directory"));
    }
}
