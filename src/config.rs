use std::path::PathBuf;

use clap::{crate_version, App, Arg, ArgMatches};

/// Port AWS SDKs send CSM datagrams to unless `AWS_CSM_PORT` says otherwise.
pub const DEFAULT_ADDR: &str = "127.0.0.1:31000";
pub const ADDR_ENV: &str = "CSM_RECEIVER_ADDR";

/// Settings for the `receiver` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// UDP `host:port` to listen on.
    pub addr: String,
    /// CSV destination, stdout when `None`.
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn app<'a, 'b>() -> App<'a, 'b> {
        App::new("receiver")
            .version(crate_version!())
            .about("Receives AWS Client-Side Monitoring events over UDP and writes them as CSV")
            .arg(
                Arg::with_name("addr")
                    .short("a")
                    .long("addr")
                    .value_name("HOST:PORT")
                    .env(ADDR_ENV)
                    .default_value(DEFAULT_ADDR)
                    .help("UDP address to listen on"),
            )
            .arg(
                Arg::with_name("output")
                    .short("o")
                    .long("output")
                    .value_name("FILE")
                    .takes_value(true)
                    .help("Write CSV to FILE instead of stdout"),
            )
    }

    pub fn from_args() -> Config {
        Config::from_matches(&Config::app().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> Config {
        Config {
            addr: matches.value_of("addr").unwrap_or(DEFAULT_ADDR).to_owned(),
            output: matches.value_of_os("output").map(PathBuf::from),
        }
    }
}
