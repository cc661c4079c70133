//! Serecho command line interface.

use std::{
    io, process,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use console::style;
use log::{debug, LevelFilter};
use simplelog::*;

use serecho::EchoError;

fn main() {
    // stdout carries the echoed data, keep the log on stderr.
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = shutdown.clone();
    let installed = ctrlc::set_handler(move || {
        println!("🛑 received Ctrl+C!");
        handler_flag.store(true, Ordering::SeqCst);
    });

    let result = installed
        .map_err(EchoError::from)
        .and_then(|_| serecho::run(std::env::args_os(), io::stdout(), shutdown));
    if let Err(err) = result {
        die(err);
    }
}

fn die(err: EchoError) -> ! {
    eprintln!("{}: {}", style("ERROR").red(), err);
    debug!("exit code: {}", err.exit_code());
    process::exit(err.exit_code());
}
