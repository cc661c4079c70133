//! Serial port device manipulation.

use std::{io, time::Duration};

use log::{debug, info, warn};
use serialport::SerialPort;

use crate::{error::EchoError, Settings};

/// Bound on a single read. Reads only happen once data is known to be
/// pending, so they should never come close to it.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

//==============================================================================
// Public Interface
//==============================================================================

/// Open the device named in `settings` and configure it with the values in
/// `settings`.
///
/// Any failure is reported as [`EchoError::SerialPortUnavailable`] with the
/// underlying system error.
pub fn open_and_setup_port(settings: &Settings) -> Result<Box<dyn SerialPort>, EchoError> {
    let unavailable = |err: serialport::Error| EchoError::SerialPortUnavailable {
        path: settings.path.clone(),
        source: io::Error::from(err),
    };

    debug!("Opening {}", settings.path);
    let mut port = serialport::new(&settings.path, settings.baud_rate)
        .data_bits(settings.data_bits)
        .stop_bits(settings.stop_bits)
        .parity(settings.parity)
        .flow_control(settings.flow_control)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(unavailable)?;

    // Some drivers ignore part of the configuration given at open time, so
    // apply it again explicitly.
    port.set_baud_rate(settings.baud_rate).map_err(unavailable)?;
    port.set_data_bits(settings.data_bits).map_err(unavailable)?;
    port.set_stop_bits(settings.stop_bits).map_err(unavailable)?;
    port.set_parity(settings.parity).map_err(unavailable)?;
    port.set_flow_control(settings.flow_control).map_err(unavailable)?;

    info!(
        "Connected to {} at {} baud",
        port.name().unwrap_or_else(|| settings.path.clone()),
        settings.baud_rate
    );
    debug!("data_bits    : {:#?}", port.data_bits());
    debug!("stop_bits    : {:#?}", port.stop_bits());
    debug!("parity       : {:#?}", port.parity());
    debug!("flow control : {:#?}", port.flow_control());

    match port.baud_rate() {
        Ok(actual) if actual != settings.baud_rate => warn!(
            "requested {} baud but the device reports {}",
            settings.baud_rate, actual
        ),
        _ => {}
    }

    Ok(port)
}
