//! Command-line interface handling for the clash driver.
//!
//! This module provides command-line argument parsing using the `clap`
//! crate. Every option except the two input paths is an optional override
//! of the configuration file.

use crate::config::OutputFormat;
use clap::{Arg, ArgMatches, Command};
use clash_engine::{ClashConvention, IndexKind};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// Path to the first entity set
    pub set_a: PathBuf,
    /// Path to the second entity set
    pub set_b: PathBuf,
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the clash threshold
    pub threshold: Option<f64>,
    /// Optional override for the clash convention
    pub convention: Option<ClashConvention>,
    /// Optional override for the index backend
    pub index: Option<IndexKind>,
    /// Optional override for the output format
    pub format: Option<OutputFormat>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Whether to force a sequential scan
    pub no_parallel: bool,
}

fn command() -> Command {
    Command::new("clash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reports clashing entity pairs between two spatial data sets")
        .arg(
            Arg::new("set-a")
                .value_name("SET_A")
                .help("First entity set (x y z [radius] [label] per line, or a JSON array)")
                .required(true),
        )
        .arg(
            Arg::new("set-b")
                .value_name("SET_B")
                .help("Second entity set")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("clash.toml"),
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .value_name("DISTANCE")
                .help("Clash threshold; negative values require overlap")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("convention")
                .long("convention")
                .value_name("CONVENTION")
                .help("Distance convention")
                .value_parser(["surface", "center"]),
        )
        .arg(
            Arg::new("index")
                .long("index")
                .value_name("BACKEND")
                .help("Spatial index backend")
                .value_parser(["grid", "rtree"]),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["text", "pairs", "json"]),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-parallel")
                .long("no-parallel")
                .help("Scan on the calling thread only")
                .action(clap::ArgAction::SetTrue),
        )
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let path = |id: &str| matches.get_one::<String>(id).map(PathBuf::from).unwrap_or_default();

        Self {
            set_a: path("set-a"),
            set_b: path("set-b"),
            config_path: path("config"),
            threshold: matches.get_one::<f64>("threshold").copied(),
            convention: matches.get_one::<String>("convention").map(|c| match c.as_str() {
                "center" => ClashConvention::CenterToCenter,
                _ => ClashConvention::SurfaceToSurface,
            }),
            index: matches.get_one::<String>("index").map(|i| match i.as_str() {
                "rtree" => IndexKind::RTree,
                _ => IndexKind::Grid,
            }),
            format: matches.get_one::<String>("format").map(|f| match f.as_str() {
                "json" => OutputFormat::Json,
                "pairs" => OutputFormat::Pairs,
                _ => OutputFormat::Text,
            }),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            no_parallel: matches.get_flag("no-parallel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_arguments() {
        let args = CliArgs::try_parse_from(["clash", "a.txt", "b.txt"]).expect("parses");
        assert_eq!(args.set_a, PathBuf::from("a.txt"));
        assert_eq!(args.set_b, PathBuf::from("b.txt"));
        assert_eq!(args.config_path, PathBuf::from("clash.toml"));
        assert_eq!(args.threshold, None);
        assert_eq!(args.convention, None);
        assert!(!args.json_logs);
        assert!(!args.no_parallel);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "clash",
            "a.txt",
            "b.txt",
            "--threshold",
            "-0.25",
            "--convention",
            "center",
            "--index",
            "rtree",
            "-f",
            "json",
            "-l",
            "debug",
            "--json-logs",
            "--no-parallel",
        ])
        .expect("parses");

        assert_eq!(args.threshold, Some(-0.25));
        assert_eq!(args.convention, Some(ClashConvention::CenterToCenter));
        assert_eq!(args.index, Some(IndexKind::RTree));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
        assert!(args.no_parallel);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(CliArgs::try_parse_from(["clash", "a.txt"]).is_err());
        assert!(CliArgs::try_parse_from(["clash", "a", "b", "--threshold", "near"]).is_err());
        assert!(CliArgs::try_parse_from(["clash", "a", "b", "--index", "octree"]).is_err());
    }
}
