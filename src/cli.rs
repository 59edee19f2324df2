//! Command-line surface.

use crate::bus::BusType;

use clap::Parser;

use std::path::PathBuf;

/// Output file used when neither `-o` nor the positional FILE is given.
pub const DEFAULT_OUTPUT: &str = "dbus_dump.yaml";

/// Snapshot a D-Bus bus into one YAML document.
#[derive(Debug, Parser)]
#[command(name = "dbusdump", version, about)]
pub struct Cli {
    /// Dump the system bus (default).
    #[arg(short = 's', long = "system")]
    pub system: bool,

    /// Dump the session bus.
    #[arg(short = 'u', long = "session", conflicts_with = "system")]
    pub session: bool,

    /// Output file. Wins over the positional FILE when both are given.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Dump only this service (default: every service on the bus).
    #[arg(value_name = "SERVICE")]
    pub service: Option<String>,

    /// Output file, positional form.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl Cli {
    pub fn bus(&self) -> BusType {
        if self.session {
            BusType::Session
        } else {
            BusType::System
        }
    }

    /// Precedence: `-o` whenever supplied, else the positional FILE, else
    /// `DEFAULT_OUTPUT`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .or_else(|| self.file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse ok")
    }

    #[test]
    fn defaults_to_system_bus_and_default_output() {
        let cli = parse(&["dbusdump"]);
        assert_eq!(cli.bus(), BusType::System);
        assert_eq!(cli.output_path(), PathBuf::from(DEFAULT_OUTPUT));
        assert!(cli.service.is_none());
    }

    #[test]
    fn session_flag_selects_session_bus() {
        let cli = parse(&["dbusdump", "-u"]);
        assert_eq!(cli.bus(), BusType::Session);
    }

    #[test]
    fn bus_flags_conflict() {
        assert!(Cli::try_parse_from(["dbusdump", "-s", "-u"]).is_err());
    }

    #[test]
    fn positionals_are_service_then_file() {
        let cli = parse(&["dbusdump", "org.example.A", "out.yaml"]);
        assert_eq!(cli.service.as_deref(), Some("org.example.A"));
        assert_eq!(cli.output_path(), PathBuf::from("out.yaml"));
    }

    #[test]
    fn output_flag_wins_over_positional_file() {
        let cli = parse(&["dbusdump", "org.example.A", "file.yaml", "-o", "other.yaml"]);
        assert_eq!(cli.service.as_deref(), Some("org.example.A"));
        assert_eq!(cli.output_path(), PathBuf::from("other.yaml"));
    }

    #[test]
    fn missing_output_argument_is_a_parse_error() {
        assert!(Cli::try_parse_from(["dbusdump", "-o"]).is_err());
    }

    #[test]
    fn unknown_flag_is_a_parse_error() {
        assert!(Cli::try_parse_from(["dbusdump", "--bogus"]).is_err());
    }
}
