//! Settings of the echo session: which serial device to open and how.
//!
//! Use the [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
//! pattern to set the configurable values, then [`Settings::validate`] them
//! before opening the device.

use std::{fs, io::Write};

pub use serialport::{DataBits, FlowControl, Parity, StopBits};

use crate::error::EchoError;

// =============================================================================
// Public Interface
// =============================================================================

/// The baud rates `serecho` accepts, in symbols-per-second.
pub const SUPPORTED_BAUD_RATES: [u32; 14] = [
    110, 300, 600, 1200, 2400, 4800, 9600, 14400, 19200, 28800, 38400, 56000, 57600, 115_200,
];

/// Baud rate used when none is given on the command line.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// The Raspberry Pi primary UART.
pub const DEFAULT_PORT: &str = "/dev/ttyAMA0";

/// Maximum size of a device path in bytes, terminator included (`PATH_MAX`).
pub const MAX_PATH_LEN: usize = 4096;

/// Groups all settings related to the serial port used by `serecho`.
///
/// Instances are created through the [`SettingsBuilder`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// The port name, usually the device path.
    pub path: String,
    /// The baud rate in symbols-per-second.
    pub baud_rate: u32,
    /// Number of bits used to represent a character sent on the line.
    pub data_bits: DataBits,
    /// The type of signalling to use for controlling data transfer.
    pub flow_control: FlowControl,
    /// The type of parity to use for error checking.
    pub parity: Parity,
    /// Number of bits to use to signal the end of a character.
    pub stop_bits: StopBits,

    /// Restrict creation of `Settings` instances unless through the
    /// `SettingsBuilder`.
    #[doc(hidden)]
    _private_use_builder: (),
}

impl Settings {
    /// Check the baud rate against [`SUPPORTED_BAUD_RATES`], then check that
    /// the device path exists. The first failure is returned.
    pub fn validate(&self) -> Result<(), EchoError> {
        validate_baud_rate(self.baud_rate)?;
        check_port_exists(&self.path)
    }

    /// Tell the user which settings are going to be used.
    pub fn announce<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "Baudrate set to {}.", self.baud_rate)?;
        writeln!(out, "Serial port set to {}.", self.path)
    }
}

/// The builder for the `Settings` values.
///
/// All values are optional and have default values that will be used if not
/// explicitly set.
///
/// **Example**
///
/// ```
/// let settings = serecho::SettingsBuilder::new().path("/dev/ttyS0").finalize();
/// assert_eq!(settings.baud_rate, 9600);
/// ```
pub struct SettingsBuilder {
    settings: Settings,
}
impl SettingsBuilder {
    /// Start building the settings from the defaults: 9600 baud, 8N1, no flow
    /// control, on [`DEFAULT_PORT`].
    pub fn new() -> Self {
        SettingsBuilder {
            settings: Settings {
                path: DEFAULT_PORT.to_owned(),
                baud_rate: DEFAULT_BAUD_RATE,
                data_bits: DataBits::Eight,
                flow_control: FlowControl::None,
                parity: Parity::None,
                stop_bits: StopBits::One,
                _private_use_builder: (),
            },
        }
    }

    /// Set the path to the serial port
    pub fn path<'a>(mut self, path: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.path = path.into().into_owned();
        self
    }

    /// Set the baud rate in symbols-per-second
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.settings.baud_rate = baud_rate;
        self
    }

    /// Set the number of bits used to represent a character sent on the line
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.settings.data_bits = data_bits;
        self
    }

    /// Set the type of signalling to use for controlling data transfer
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.settings.flow_control = flow_control;
        self
    }

    /// Set the type of parity to use for error checking
    pub fn parity(mut self, parity: Parity) -> Self {
        self.settings.parity = parity;
        self
    }

    /// Set the number of bits to use to signal the end of a character
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.settings.stop_bits = stop_bits;
        self
    }

    pub fn finalize(self) -> Settings {
        self.settings
    }
}
impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fails with [`EchoError::UnsupportedBaudRate`] unless `baud_rate` is one of
/// [`SUPPORTED_BAUD_RATES`].
pub fn validate_baud_rate(baud_rate: u32) -> Result<(), EchoError> {
    if SUPPORTED_BAUD_RATES.contains(&baud_rate) {
        Ok(())
    } else {
        Err(EchoError::UnsupportedBaudRate(baud_rate))
    }
}

/// Existence check only. Permissions and the type of the entry are left for
/// the open call to complain about.
pub fn check_port_exists(path: &str) -> Result<(), EchoError> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|source| EchoError::SerialPortUnavailable {
            path: path.to_owned(),
            source,
        })
}

/// Fails with [`EchoError::MemoryError`] when `path` cannot be stored within
/// [`MAX_PATH_LEN`].
pub fn check_path_len(path: &str) -> Result<(), EchoError> {
    if path.len() < MAX_PATH_LEN {
        Ok(())
    } else {
        Err(EchoError::MemoryError(format!(
            "device path is {} bytes long, the limit is {}",
            path.len(),
            MAX_PATH_LEN - 1
        )))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn all_default() {
    let settings = SettingsBuilder::new().finalize();
    assert_eq!(
        settings,
        Settings {
            path: "/dev/ttyAMA0".into(),
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            parity: Parity::None,
            stop_bits: StopBits::One,
            _private_use_builder: (),
        }
    )
}

#[test]
fn path() {
    let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
    assert_eq!(settings.path, "/dev/ttyUSB0");
}

#[test]
fn baud_rate() {
    let settings = SettingsBuilder::new().baud_rate(115_200).finalize();
    assert_eq!(settings.baud_rate, 115_200);
}

#[test]
fn data_bits() {
    let data_bits = DataBits::Seven;
    let settings = SettingsBuilder::new().data_bits(data_bits).finalize();
    assert_eq!(settings.data_bits, data_bits);
}

#[test]
fn flow_control() {
    let flow_control = FlowControl::Hardware;
    let settings = SettingsBuilder::new().flow_control(flow_control).finalize();
    assert_eq!(settings.flow_control, flow_control);
}

#[test]
fn stop_bits() {
    let stop_bits = StopBits::Two;
    let settings = SettingsBuilder::new().stop_bits(stop_bits).finalize();
    assert_eq!(settings.stop_bits, stop_bits);
}

#[test]
fn parity() {
    let parity = Parity::Even;
    let settings = SettingsBuilder::new().parity(parity).finalize();
    assert_eq!(settings.parity, parity);
}

#[test]
fn accepts_every_supported_baud_rate() {
    for rate in SUPPORTED_BAUD_RATES.iter() {
        assert!(validate_baud_rate(*rate).is_ok(), "{} rejected", rate);
    }
}

#[test]
fn rejects_other_baud_rates() {
    for rate in [0, 1, 109, 111, 9601, 14_401, 230_400, 921_600, u32::MAX].iter() {
        match validate_baud_rate(*rate) {
            Err(EchoError::UnsupportedBaudRate(r)) => assert_eq!(r, *rate),
            other => panic!("{} gave {:?}", rate, other),
        }
    }
}

#[test]
fn missing_port() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("ttyNOPE");
    let missing = missing.to_str().unwrap();
    match check_port_exists(missing) {
        Err(EchoError::SerialPortUnavailable { path, source }) => {
            assert_eq!(path, missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn existing_port() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(check_port_exists(file.path().to_str().unwrap()).is_ok());
}

#[test]
fn validate_checks_baud_rate_before_path() {
    let settings = SettingsBuilder::new()
        .baud_rate(12)
        .path("/this/path/does/not/exist")
        .finalize();
    assert!(matches!(
        settings.validate(),
        Err(EchoError::UnsupportedBaudRate(12))
    ));
}

#[test]
fn validate_good_settings() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let settings = SettingsBuilder::new()
        .baud_rate(19_200)
        .path(file.path().to_str().unwrap())
        .finalize();
    assert!(settings.validate().is_ok());
}

#[test]
fn path_length_bound() {
    assert!(check_path_len(&"a".repeat(MAX_PATH_LEN - 1)).is_ok());
    assert!(matches!(
        check_path_len(&"a".repeat(MAX_PATH_LEN)),
        Err(EchoError::MemoryError(_))
    ));
}

#[test]
fn announce() {
    let settings = SettingsBuilder::new().path("/dev/ttyS0").finalize();
    let mut out = Vec::new();
    settings.announce(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Baudrate set to 9600.\nSerial port set to /dev/ttyS0.\n"
    );
}
