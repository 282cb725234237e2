use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and its contents:
/// - an initial `config.json` with default settings
/// - the `.secrets` directory, with `secret_file` copied into it
/// - an empty starter `payeeFilters.json` to put your filters in
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory,
///   e.g. `$HOME/econostats`
/// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed
///   to talk to the drive. This will be copied from the `secret_file` path to
///   its default location in the data directory.
pub async fn init(home: &Path, secret_file: &Path) -> Result<Out<()>> {
    let _config = Config::create(home, secret_file)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok("Successfully created the econostats directory and config".into())
}
