//! The object store boundary: search, create, read and update named objects
//! in a cloud drive folder, plus the in-memory double used in test mode.

mod drive;
mod memory;
mod token;

use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) use token::TokenProvider;

/// OAuth scopes required for the files this app creates in the drive.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/drive.file"];

/// The kinds of objects the store distinguishes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Folder,
    File,
}

serde_plain::derive_display_from_serialize!(ObjectKind);
serde_plain::derive_fromstr_from_deserialize!(ObjectKind);

/// The store is expected to hold at most one object per logical name and
/// kind. Finding more than one indicates a corrupted folder layout and is
/// surfaced to the operator rather than silently picking one.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Found more than one {kind} named '{name}' in the store; the folder layout needs manual repair")]
pub struct AmbiguousMatch {
    pub name: String,
    pub kind: ObjectKind,
}

/// Key-by-name object operations against the persisted store.
#[async_trait::async_trait]
pub trait ObjectStore {
    /// Finds the identifier of the object called `name`, or `None` when it
    /// does not exist. Fails with [`AmbiguousMatch`] when more than one
    /// candidate shares the name and kind.
    async fn search(&mut self, name: &str, kind: ObjectKind) -> Result<Option<String>>;

    /// Creates a folder and returns its identifier.
    async fn create_folder(&mut self, name: &str) -> Result<String>;

    /// Creates a file with `content` inside the folder `parent_id` and
    /// returns its identifier.
    async fn create_file(&mut self, name: &str, parent_id: &str, content: &str) -> Result<String>;

    /// Reads the full content of the file `id`.
    async fn read_file(&mut self, id: &str) -> Result<String>;

    /// Replaces the content of the file `id`.
    async fn update_file(&mut self, id: &str, content: &str) -> Result<()>;
}

/// Selects the store implementation. `Test` serves everything from memory so
/// the whole app can run top-to-bottom without Google credentials.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Mode {
    #[default]
    Drive,
    Test,
}

impl Mode {
    /// When `ECONOSTATS_IN_TEST_MODE` is set and non-empty the in-memory
    /// store is used, otherwise Google Drive.
    pub fn from_env() -> Mode {
        match std::env::var("ECONOSTATS_IN_TEST_MODE") {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Drive,
        }
    }
}

/// Creates the `ObjectStore` for `mode`.
pub(crate) async fn store(config: &Config, mode: Mode) -> Result<Box<dyn ObjectStore + Send>> {
    match mode {
        Mode::Drive => {
            let token_provider =
                TokenProvider::load(&config.client_secret_path(), &config.token_path()).await?;
            Ok(Box::new(drive::DriveStore::new(token_provider)))
        }
        Mode::Test => Ok(Box::new(memory::MemoryStore::default())),
    }
}

/// Creates the file `name` in `folder_id`, or replaces its content when it
/// already exists.
pub(crate) async fn put_object(
    store: &mut (dyn ObjectStore + Send),
    name: &str,
    folder_id: &str,
    content: &str,
) -> Result<()> {
    match store.search(name, ObjectKind::File).await? {
        Some(id) => store.update_file(&id, content).await,
        None => store.create_file(name, folder_id, content).await.map(|_| ()),
    }
}
