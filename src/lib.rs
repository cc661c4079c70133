//! Serecho echoes text received over a serial interface, typically the UART of
//! a Raspberry Pi, back to the same interface and to the local console. It is
//! a handy way to check that the wiring, the baud rate and the device on the
//! other side of the line all work before moving on to a real protocol.
//!
//! The work is split in two steps:
//!
//! * The [`options`] are parsed into [`Settings`], which are then validated:
//!   the baud rate must be one of the [`SUPPORTED_BAUD_RATES`] and the device
//!   path must exist.
//! * The [`EchoLoop`] repeatedly drains whatever the device has received into
//!   a bounded [`LineBuffer`], prints the line and writes it back to the
//!   device.
//!
//! The echo loop is implemented as a state machine in terms of **states** and
//! **transitions** between them:
//!
//! * Can only be in one state at any time.
//! * Each state can have its own associated data if needed.
//! * Data shared by **all** states lives in the state machine itself.
//! * Transitions between states are triggered via typed **events** and only
//!   the transitions for which a `From<Event>` implementation exists are
//!   possible, which is checked at **compile-time**.
//! * Transitioning from one state to another consumes the original state.

mod app;
pub mod echo_loop;
mod error;
pub mod options;
mod settings;
mod utils;

pub use app::run;
pub use echo_loop::{EchoLoop, LoopStats};
pub use error::EchoError;
pub use settings::{
    check_port_exists, validate_baud_rate, Settings, SettingsBuilder, DEFAULT_BAUD_RATE,
    DEFAULT_PORT, MAX_PATH_LEN, SUPPORTED_BAUD_RATES,
};
pub use utils::{open_and_setup_port, LineBuffer, SerialDevice, DEFAULT_LINE_CAPACITY};
