//! `serecho` echo loop.
//!
//! **Example** - Echoing on a serial port until Ctrl+C is pressed:
//! ```no_run
//! use std::sync::{atomic::AtomicBool, Arc};
//!
//! use serecho::{open_and_setup_port, EchoLoop, SettingsBuilder};
//!
//! let settings = SettingsBuilder::new().path("/dev/ttyS0").finalize();
//! let port = open_and_setup_port(&settings)?;
//! let shutdown = Arc::new(AtomicBool::new(false));
//! let stats = EchoLoop::new(port, std::io::stdout(), shutdown).run()?;
//! println!("echoed {} lines", stats.lines);
//! # Ok::<(), serecho::EchoError>(())
//! ```

mod events;
mod session;
mod state_machine;
mod states;

pub use session::{LoopStats, POLL_INTERVAL};
pub use state_machine::EchoLoop;
