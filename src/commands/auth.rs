use crate::api::TokenProvider;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;

/// Verifies the stored OAuth token and refreshes it through the refresh-token
/// grant. This never starts an interactive consent flow; when the token file
/// is missing or unusable it fails with instructions instead.
pub async fn auth(config: &Config) -> Result<Out<()>> {
    let mut token_provider = TokenProvider::load(&config.client_secret_path(), &config.token_path())
        .await
        .context(
            "Unable to load the OAuth credential files. \n\n\
            See the README for the one-time token setup.",
        )?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")?;
    Ok(format!("Your OAuth token is valid until {}", token_provider.expiry()).into())
}
