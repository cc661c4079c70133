//! Command line options.
//!
//! ```text
//! serecho [-b baudrate] [-p port]
//! ```
//!
//! Parsing only resolves the [`Settings`]; validating them is left to
//! [`Settings::validate`] so that the resolved values can be reported to the
//! user first.

use std::ffi::{OsStr, OsString};

use clap::{crate_name, App, AppSettings::*, Arg, ArgMatches, ErrorKind};
use log::{trace, warn};

use crate::error::EchoError;
use crate::settings::{check_path_len, Settings, SettingsBuilder};

/// What the command line asked for.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    /// Echo on the serial port described by the settings.
    Run(Settings),
    /// Print this usage text and exit successfully.
    Help(String),
}

/// Parse the full argument list, program name included.
///
/// Besides the program name, the command line holds either nothing, a single
/// help flag, or one or two option/value pairs. A repeated pair overrides the
/// earlier one and values may start with a hyphen. Anything else, including
/// a help flag mixed with other arguments, results in
/// [`EchoError::InvalidArguments`].
pub fn parse<I, T>(args: I) -> Result<Command, EchoError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let count = args.len();

    let matches = match app().get_matches_from_safe(args) {
        Ok(matches) => matches,
        Err(err) => {
            return match err.kind {
                ErrorKind::HelpDisplayed if count == 2 => Ok(Command::Help(err.message)),
                ErrorKind::HelpDisplayed => Err(EchoError::InvalidArguments(
                    "help cannot be combined with other arguments".into(),
                )),
                _ => Err(EchoError::InvalidArguments(err.message)),
            }
        }
    };

    trace!("{:#?}", matches);

    match count {
        1 | 3 | 5 => {}
        _ => {
            return Err(EchoError::InvalidArguments(format!(
                "expected -b and/or -p followed by a value, got {} argument(s)",
                count.saturating_sub(1)
            )))
        }
    }

    let mut builder = SettingsBuilder::new();

    if let Some(value) = last_value(&matches, "BAUD_RATE") {
        builder = builder.baud_rate(parse_baud_rate(&value.to_string_lossy()));
    }

    if let Some(value) = last_value(&matches, "PORT") {
        let path = value.to_str().ok_or_else(|| {
            EchoError::InvalidArguments(format!(
                "port `{}` is not valid UTF-8",
                value.to_string_lossy()
            ))
        })?;
        check_path_len(path)?;
        builder = builder.path(path);
    }

    Ok(Command::Run(builder.finalize()))
}

/// Parse a baud rate the way `atoi` does: leading whitespace and sign are
/// accepted, the longest run of digits is used and anything after it is
/// ignored. Input with no leading digits yields `0`, which no supported baud
/// rate matches, so the mistake is caught by the baud rate check instead.
pub fn parse_baud_rate(value: &str) -> u32 {
    let trimmed = value.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(rate) => {
            if digits.len() != value.len() {
                warn!("baud rate `{}` read as {}", value, rate);
            }
            rate
        }
        Err(_) => {
            warn!("baud rate `{}` is not a number", value);
            0
        }
    }
}

fn last_value<'a>(matches: &'a ArgMatches<'_>, name: &str) -> Option<&'a OsStr> {
    matches.values_of_os(name).and_then(|values| values.last())
}

fn app() -> App<'static, 'static> {
    App::new(crate_name!())
        .about("Echoes input sent over a serial connection.")
        .max_term_width(80)
        .setting(DisableVersion)
        .setting(UnifiedHelpMessage)
        .arg(
            Arg::with_name("BAUD_RATE")
                .help("the baudrate of the serial interface")
                .short("b")
                .long("baud-rate")
                .value_name("baudrate")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::with_name("PORT")
                .help("the port for serial communication")
                .short("p")
                .long("port")
                .value_name("port")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true),
        )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Settings {
        match parse(args.iter()) {
            Ok(Command::Run(settings)) => settings,
            other => panic!("{:?} gave {:?}", args, other),
        }
    }

    fn invalid(args: &[&str]) {
        assert!(
            matches!(parse(args.iter()), Err(EchoError::InvalidArguments(_))),
            "{:?} was accepted",
            args
        );
    }

    #[test]
    fn no_arguments_keeps_defaults() {
        assert_eq!(run(&["serecho"]), SettingsBuilder::new().finalize());
    }

    #[test]
    fn short_and_long_help_are_identical() {
        let short = parse(["serecho", "-h"].iter()).unwrap();
        let long = parse(["serecho", "--help"].iter()).unwrap();
        match &short {
            Command::Help(text) => {
                assert!(text.contains("-b"));
                assert!(text.contains("-p"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(short, long);
    }

    #[test]
    fn help_skips_validation() {
        // No device lookup happens before the help text is returned, even when
        // the defaults point to a device that does not exist.
        assert!(matches!(
            parse(["serecho", "--help"].iter()),
            Ok(Command::Help(_))
        ));
    }

    #[test]
    fn baud_rate_only() {
        let settings = run(&["serecho", "-b", "115200"]);
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.path, "/dev/ttyAMA0");
    }

    #[test]
    fn port_only() {
        let settings = run(&["serecho", "-p", "/dev/ttyS0"]);
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.path, "/dev/ttyS0");
    }

    #[test]
    fn order_independent() {
        let a = run(&["serecho", "-b", "19200", "-p", "/dev/ttyUSB0"]);
        let b = run(&["serecho", "-p", "/dev/ttyUSB0", "-b", "19200"]);
        assert_eq!(a, b);
        assert_eq!(a.baud_rate, 19_200);
        assert_eq!(a.path, "/dev/ttyUSB0");
    }

    #[test]
    fn non_numeric_baud_rate_fails_validation_later() {
        let settings = run(&["serecho", "-b", "notanumber"]);
        assert_eq!(settings.baud_rate, 0);
        assert!(matches!(
            settings.validate(),
            Err(EchoError::UnsupportedBaudRate(0))
        ));
    }

    #[test]
    fn baud_rate_numeric_prefix() {
        assert_eq!(parse_baud_rate("9600"), 9600);
        assert_eq!(parse_baud_rate("9600abc"), 9600);
        assert_eq!(parse_baud_rate("  +300"), 300);
        assert_eq!(parse_baud_rate("-300"), 0);
        assert_eq!(parse_baud_rate(""), 0);
        assert_eq!(parse_baud_rate("99999999999"), 0);
    }

    #[test]
    fn rejects_bad_invocations() {
        invalid(&["serecho", "-x"]);
        invalid(&["serecho", "help"]);
        invalid(&["serecho", "-b"]);
        invalid(&["serecho", "-p"]);
        invalid(&["serecho", "-b", "9600", "extra"]);
        invalid(&["serecho", "-b", "9600", "-x", "1"]);
        invalid(&["serecho", "-b9600"]);
        invalid(&["serecho", "-b", "9600", "-p", "/dev/ttyS0", "-b", "300"]);
        invalid(&["serecho", "-V"]);
    }

    #[test]
    fn help_must_stand_alone() {
        invalid(&["serecho", "-b", "9600", "-h"]);
        invalid(&["serecho", "-h", "-p", "/x"]);
        invalid(&["serecho", "--help", "-b", "9600", "-p", "/x"]);
        invalid(&["serecho", "-h", "-h"]);
    }

    #[test]
    fn repeated_pair_keeps_the_last_value() {
        let settings = run(&["serecho", "-b", "9600", "-b", "300"]);
        assert_eq!(settings.baud_rate, 300);
        let settings = run(&["serecho", "-p", "/dev/ttyS0", "-p", "/dev/ttyS1"]);
        assert_eq!(settings.path, "/dev/ttyS1");
    }

    #[test]
    fn values_may_start_with_a_hyphen() {
        let settings = run(&["serecho", "-b", "-300"]);
        assert!(matches!(
            settings.validate(),
            Err(EchoError::UnsupportedBaudRate(_))
        ));

        let settings = run(&["serecho", "-p", "-weird"]);
        assert_eq!(settings.path, "-weird");
        assert!(matches!(
            settings.validate(),
            Err(EchoError::SerialPortUnavailable { .. })
        ));

        let settings = run(&["serecho", "-b", "-h"]);
        assert_eq!(settings.baud_rate, 0);
    }

    #[test]
    fn overlong_port_is_a_memory_error() {
        let path = format!("/dev/{}", "a".repeat(crate::settings::MAX_PATH_LEN));
        assert!(matches!(
            parse(["serecho", "-p", path.as_str()].iter()),
            Err(EchoError::MemoryError(_))
        ));
    }
}
