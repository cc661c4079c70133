//! The whole `serecho` session, from the command line to the echo loop.

use std::{
    ffi::OsString,
    io::Write,
    sync::{atomic::AtomicBool, Arc},
};

use log::info;

use crate::{
    echo_loop::{EchoLoop, LoopStats},
    error::EchoError,
    options::{self, Command},
    utils::open_and_setup_port,
};

/// Parse `args`, tell the user which settings were resolved, validate them,
/// then echo on the serial port until `shutdown` is raised.
///
/// Everything meant for the user, including the echoed lines, is written to
/// `out`. Returns `None` when only the help was requested.
pub fn run<I, T, W>(
    args: I,
    mut out: W,
    shutdown: Arc<AtomicBool>,
) -> Result<Option<LoopStats>, EchoError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let settings = match options::parse(args)? {
        Command::Help(usage) => {
            writeln!(out, "{}", usage).map_err(EchoError::Console)?;
            return Ok(None);
        }
        Command::Run(settings) => settings,
    };

    settings.announce(&mut out).map_err(EchoError::Console)?;
    settings.validate()?;

    let port = open_and_setup_port(&settings)?;
    let stats = EchoLoop::new(port, &mut out, shutdown).run()?;
    info!(
        "echoed {} lines ({} bytes, {} dropped)",
        stats.lines, stats.bytes, stats.dropped
    );
    Ok(Some(stats))
}
