//! Configuration file handling.
//!
//! The configuration lives at `$ECONOSTATS_HOME/config.json` and holds the
//! names of the objects kept in the drive folder, the layout of the bank's
//! CSV export, and the paths to the authentication files under `.secrets/`.

use crate::import::CsvImportOptions;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "econostats";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";
const PAYEE_FILTERS_JSON: &str = "payeeFilters.json";
const SPREADSHEET_CSV: &str = "recurringTransactions.csv";
const FOLDER_NAME: &str = "EconoStats";
const TRANSACTIONS_JSON: &str = "transactions.json";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$ECONOSTATS_HOME` and from there
/// it loads `$ECONOSTATS_HOME/config.json`. It resolves the paths of the
/// other files the app expects inside the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and its contents:
    /// - an initial `config.json` with default settings
    /// - the `.secrets` directory with `secret_file` copied into it
    /// - an empty starter `payeeFilters.json`
    pub async fn create(dir: impl Into<PathBuf>, secret_file: &Path) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the econostats home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;
        utils::copy(secret_file, secrets.join(CLIENT_SECRET_JSON)).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let filters_path = root.join(PAYEE_FILTERS_JSON);
        if !filters_path.is_file() {
            utils::write(&filters_path, "[]\n").await?;
        }

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
        })
    }

    /// Validates that the home directory, the config file and the secrets
    /// directory exist, then loads the configuration.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Econostats home is missing; run 'econostats init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The drive folder holding the persisted objects.
    pub fn folder_name(&self) -> &str {
        &self.config_file.folder_name
    }

    /// The name of the persisted transaction history object.
    pub fn transactions_object(&self) -> &str {
        &self.config_file.transactions_object
    }

    /// The name of the payee filter object kept in the store.
    pub fn filters_object(&self) -> &str {
        &self.config_file.filters_object
    }

    /// The name of the rendered spreadsheet object kept in the store.
    pub fn spreadsheet_object(&self) -> &str {
        &self.config_file.spreadsheet_object
    }

    /// The layout of the bank's CSV export.
    pub fn csv_import(&self) -> &CsvImportOptions {
        &self.config_file.csv_import
    }

    /// The local payee filter file.
    pub fn payee_filters_path(&self) -> PathBuf {
        self.resolve_path(&self.config_file.payee_filters_path, PAYEE_FILTERS_JSON)
    }

    /// Where the rendered spreadsheet is written locally.
    pub fn spreadsheet_path(&self) -> PathBuf {
        self.resolve_path(&self.config_file.spreadsheet_path, SPREADSHEET_CSV)
    }

    /// The OAuth client credentials file.
    pub fn client_secret_path(&self) -> PathBuf {
        self.secrets.join(CLIENT_SECRET_JSON)
    }

    /// The OAuth token file.
    pub fn token_path(&self) -> PathBuf {
        self.secrets.join(TOKEN_JSON)
    }

    /// Resolves an optional configured path against the home directory,
    /// falling back to `default_name` inside it.
    fn resolve_path(&self, configured: &Option<PathBuf>, default_name: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.root.join(path),
            None => self.root.join(default_name),
        }
    }
}

/// Represents the serialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "econostats",
///   "config_version": 1,
///   "folder_name": "EconoStats",
///   "transactions_object": "transactions.json",
///   "filters_object": "payeeFilters.json",
///   "spreadsheet_object": "recurringTransactions.csv",
///   "csv_import": {
///     "delimiter": ",",
///     "date_format": "%Y-%m-%d",
///     "date_column": 0,
///     "name_column": 1,
///     "amount_column": 2,
///     "has_header": true
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "econostats".
    app_name: String,

    /// Configuration file version.
    config_version: u8,

    /// Name of the drive folder holding the persisted objects.
    folder_name: String,

    /// Name of the transaction history object in the store.
    transactions_object: String,

    /// Name of the payee filter object in the store.
    filters_object: String,

    /// Name of the rendered spreadsheet object in the store.
    spreadsheet_object: String,

    /// Layout of the bank's CSV export.
    #[serde(default)]
    csv_import: CsvImportOptions,

    /// Local payee filter file (relative to the home directory or absolute).
    /// Defaults to `$ECONOSTATS_HOME/payeeFilters.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    payee_filters_path: Option<PathBuf>,

    /// Where to write the rendered spreadsheet (relative to the home
    /// directory or absolute). Defaults to
    /// `$ECONOSTATS_HOME/recurringTransactions.csv`.
    #[serde(skip_serializing_if = "Option::is_none")]
    spreadsheet_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            folder_name: FOLDER_NAME.to_string(),
            transactions_object: TRANSACTIONS_JSON.to_string(),
            filters_object: PAYEE_FILTERS_JSON.to_string(),
            spreadsheet_object: SPREADSHEET_CSV.to_string(),
            csv_import: CsvImportOptions::default(),
            payee_filters_path: None,
            spreadsheet_path: None,
        }
    }
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_then_load() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("econostats");
        let secret = tmp.path().join("downloaded_secret.json");
        utils::write(&secret, "{}").await.unwrap();

        let created = Config::create(&home, &secret).await.unwrap();
        assert!(created.client_secret_path().is_file());
        assert!(created.payee_filters_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.folder_name(), "EconoStats");
        assert_eq!(loaded.transactions_object(), "transactions.json");
        assert_eq!(loaded.filters_object(), "payeeFilters.json");
        assert_eq!(loaded.csv_import().delimiter, ',');
    }

    #[tokio::test]
    async fn test_load_missing_home_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(Config::load(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_config() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("econostats");
        let secret = tmp.path().join("secret.json");
        utils::write(&secret, "{}").await.unwrap();
        let config = Config::create(&home, &secret).await.unwrap();

        let mut file = ConfigFile::default();
        file.app_name = "something-else".to_string();
        file.save(config.config_path()).await.unwrap();

        assert!(Config::load(&home).await.is_err());
    }
}
