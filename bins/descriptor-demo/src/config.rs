use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{App, Arg, ArgMatches};
use log::LevelFilter;
use vfs::DescriptionRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where to create the resource. A scratch directory is used when unset.
    pub path: Option<PathBuf>,
    pub offset: i64,
    pub max_open_files: usize,
    pub log_level: LevelFilter,
}

pub fn app() -> App<'static, 'static> {
    App::new("descriptor-demo")
        .about("Shows that duplicated descriptors share one open file description")
        .arg(
            Arg::with_name("path")
                .long("path")
                .takes_value(true)
                .help("File to create and open [default: a file in a fresh temporary directory]"),
        )
        .arg(
            Arg::with_name("offset")
                .long("offset")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2")
                .help("Position to seek fd1 to"),
        )
        .arg(
            Arg::with_name("max-open-files")
                .long("max-open-files")
                .takes_value(true)
                .default_value("1024")
                .help("Capacity of the description registry and descriptor table"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log more; repeat for more detail. LOG=<level> also works"),
        )
}

impl Config {
    pub fn from_matches(matches: &ArgMatches<'_>) -> Result<Self> {
        let offset: i64 = matches
            .value_of("offset")
            .unwrap_or("2")
            .parse()
            .context("--offset must be an integer")?;
        let max_open_files = matches
            .value_of("max-open-files")
            .map(str::parse::<usize>)
            .transpose()
            .context("--max-open-files must be a positive integer")?
            .unwrap_or(DescriptionRegistry::DEFAULT_MAX_OPEN_FILES);
        ensure!(max_open_files > 0, "--max-open-files must be a positive integer");
        let base = library::logging::level_from_env().unwrap_or(LevelFilter::Warn);
        let log_level =
            library::logging::level_from_verbosity(base, matches.occurrences_of("verbose"));

        Ok(Self {
            path: matches.value_of_os("path").map(PathBuf::from),
            offset,
            max_open_files,
            log_level,
        })
    }
}
