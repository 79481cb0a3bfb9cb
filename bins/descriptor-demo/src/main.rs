mod config;
mod scenario;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use vfs::{DescriptionRegistry, DescriptorTable, StdFileSystem};

use crate::config::Config;

fn main() -> Result<()> {
    let config = Config::from_matches(&config::app().get_matches())?;
    library::logging::init(config.log_level).context("failed to install logger")?;
    debug!("{:?}", config);

    // Kept alive until the end of main so the scratch file outlives the run.
    let scratch = tempfile::tempdir().context("failed to create a scratch directory")?;
    let path = config
        .path
        .clone()
        .unwrap_or_else(|| scratch.path().join("foo"));

    let registry = Arc::new(DescriptionRegistry::with_capacity(
        Arc::new(StdFileSystem::new()),
        config.max_open_files,
    ));
    let mut table = DescriptorTable::with_capacity(registry, config.max_open_files);

    let report = scenario::run(&mut table, &path, config.offset)?;
    print!("{}", report);
    println!(
        "fd1 and fd2 share a description; fd3 has its own. \
         Offsets are shared by this library's registry, not by the kernel."
    );

    table.close_all().context("failed to close descriptors")?;
    Ok(())
}
