//! OAuth credential and token files plus headless token refresh.
//!
//! `client_secret.json` holds the installed-application credentials from the
//! Google Cloud Console and `token.json` the access/refresh token pair. The
//! only flow the app runs by itself is the refresh-token grant against the
//! token URI; obtaining the first token is a one-time interactive setup step
//! documented in the README.

use crate::api::OAUTH_SCOPES;
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Serializable data plus the path it was loaded from, so it can be saved
/// back after mutation.
#[derive(Debug, Clone)]
struct File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    path: PathBuf,
    data: F,
}

impl<F> File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data: F = utils::deserialize(&path).await?;
        Ok(Self { path, data })
    }

    async fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize data to JSON")?;
        utils::write(&self.path, json).await?;

        // Token material should not be world-readable.
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, Permissions::from_mode(0o600))
                .context("Failed to set file permissions")?;
        }

        Ok(())
    }

    fn data(&self) -> &F {
        &self.data
    }

    fn data_mut(&mut self) -> &mut F {
        &mut self.data
    }
}

/// The structure of the `client_secret.json` file downloaded from the Google
/// Cloud Console. Google wraps desktop-application credentials in an
/// `installed` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SecretFile {
    installed: InstalledCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

/// The saved token material. Scopes are recorded so a token minted for the
/// wrong scopes is rejected up front instead of failing on the first API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct TokenFile {
    scopes: Vec<String>,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenFile {
    fn validate_scopes(&self) -> Result<()> {
        let found: HashSet<&str> = self.scopes.iter().map(|s| s.as_str()).collect();
        for &required in OAUTH_SCOPES {
            if !found.contains(required) {
                bail!("OAuth scope '{required}' is missing.");
            }
        }
        Ok(())
    }

    /// True when the token is expired or expires within the next 5 minutes.
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::minutes(5)
    }

    fn update(
        &mut self,
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at;
        if let Some(refresh_token) = refresh_token {
            self.refresh_token = refresh_token;
        }
    }
}

/// The token endpoint's response to a refresh-token grant.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

/// Loads the credential files and hands out a valid bearer token, refreshing
/// and persisting it when the stored one is expired or about to expire.
pub(crate) struct TokenProvider {
    secret: File<SecretFile>,
    token: File<TokenFile>,
    client: reqwest::Client,
}

impl TokenProvider {
    pub(crate) async fn load(secret_path: &Path, token_path: &Path) -> Result<Self> {
        let secret = File::load(secret_path)
            .await
            .context("Unable to read the OAuth client credentials")?;
        let token: File<TokenFile> = File::load(token_path)
            .await
            .context("Unable to read the OAuth token file")?;
        token.data().validate_scopes()?;
        Ok(Self {
            secret,
            token,
            client: reqwest::Client::new(),
        })
    }

    /// Returns a valid access token, refreshing first when needed.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token.data().is_expired() {
            self.refresh().await?;
        }
        Ok(&self.token.data().access_token)
    }

    /// Exchanges the refresh token for a fresh access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        let installed = &self.secret.data().installed;
        let params = [
            ("client_id", installed.client_id.as_str()),
            ("client_secret", installed.client_secret.as_str()),
            ("refresh_token", self.token.data().refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&installed.token_uri)
            .form(&params)
            .send()
            .await
            .context("The OAuth token endpoint could not be reached")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("Token refresh failed with status {status}: {body}");
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse the token refresh response")?;
        let expires_at = Utc::now() + Duration::seconds(refreshed.expires_in);
        self.token
            .data_mut()
            .update(refreshed.access_token, expires_at, refreshed.refresh_token);
        self.token.save().await?;

        tracing::debug!("Token refreshed, valid until {}", self.expiry());
        Ok(())
    }

    /// When the stored token expires.
    pub(crate) fn expiry(&self) -> DateTime<Utc> {
        self.token.data().expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token_json(scopes: &str, expires_at: &str) -> String {
        format!(
            r#"{{
                "scopes": [{scopes}],
                "access_token": "abc12",
                "refresh_token": "xyz89",
                "expires_at": "{expires_at}"
            }}"#
        )
    }

    #[tokio::test]
    async fn test_token_file_with_required_scope_loads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("token.json");
        let json = token_json(
            r#""https://www.googleapis.com/auth/drive.file""#,
            "2025-01-01T00:00:00Z",
        );
        utils::write(&path, &json).await.unwrap();

        let token: File<TokenFile> = File::load(&path).await.unwrap();
        token.data().validate_scopes().unwrap();
        assert!(token.data().is_expired());
    }

    #[tokio::test]
    async fn test_token_file_missing_scope_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("token.json");
        let json = token_json(
            r#""https://www.googleapis.com/auth/spreadsheets""#,
            "2025-01-01T00:00:00Z",
        );
        utils::write(&path, &json).await.unwrap();

        let token: File<TokenFile> = File::load(&path).await.unwrap();
        let error = token.data().validate_scopes().unwrap_err();
        assert!(error.to_string().contains("drive.file"));
    }

    #[tokio::test]
    async fn test_secret_file_parses_installed_credentials() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("client_secret.json");
        let json = r#"
        {
            "installed": {
                "client_id": "YOUR_CLIENT_ID.apps.googleusercontent.com",
                "client_secret": "YOUR_CLIENT_SECRET",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }
        "#;
        utils::write(&path, json).await.unwrap();

        let secret: File<SecretFile> = File::load(&path).await.unwrap();
        assert_eq!(
            secret.data().installed.token_uri,
            "https://oauth2.googleapis.com/token"
        );
    }

    #[test]
    fn test_token_update_keeps_refresh_token_when_not_reissued() {
        let mut token = TokenFile {
            scopes: vec![],
            access_token: "old".to_string(),
            refresh_token: "keep-me".to_string(),
            expires_at: Utc::now(),
        };
        token.update("new".to_string(), Utc::now() + Duration::hours(1), None);
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token, "keep-me");
        assert!(!token.is_expired());
    }
}
