//! Implements the `ObjectStore` trait against the Google Drive v3 REST API.
//!
//! Files are created in two steps (metadata first, then a media upload of the
//! content) so that create and update share the same upload path.

use crate::api::{AmbiguousMatch, ObjectKind, ObjectStore, TokenProvider};
use crate::Result;
use anyhow::{bail, Context};
use serde::Deserialize;

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const FILE_MIME_TYPE: &str = "text/plain";

const REMOTE_UNREACHABLE: &str = "The remote store could not be reached";

/// The Drive-backed store. Holds a `TokenProvider` and refreshes the access
/// token before each call when needed.
pub(super) struct DriveStore {
    token_provider: TokenProvider,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
}

impl DriveStore {
    pub(super) fn new(token_provider: TokenProvider) -> Self {
        Self {
            token_provider,
            client: reqwest::Client::new(),
        }
    }

    async fn bearer(&mut self) -> Result<String> {
        Ok(self.token_provider.token_with_refresh().await?.to_string())
    }
}

#[async_trait::async_trait]
impl ObjectStore for DriveStore {
    async fn search(&mut self, name: &str, kind: ObjectKind) -> Result<Option<String>> {
        let token = self.bearer().await?;
        let mime_clause = match kind {
            ObjectKind::Folder => format!("mimeType = '{FOLDER_MIME_TYPE}'"),
            ObjectKind::File => format!("mimeType != '{FOLDER_MIME_TYPE}'"),
        };
        let query = format!(
            "name = '{}' and {mime_clause} and trashed = false",
            escape_query_value(name)
        );

        let response = self
            .client
            .get(FILES_URL)
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .bearer_auth(&token)
            .send()
            .await
            .context(REMOTE_UNREACHABLE)?;
        let list: FileList = check(response, "search")
            .await?
            .json()
            .await
            .context("Failed to parse the Drive search response")?;

        let mut ids = list.files.into_iter().map(|f| f.id);
        match (ids.next(), ids.next()) {
            (None, _) => Ok(None),
            (Some(id), None) => Ok(Some(id)),
            (Some(_), Some(_)) => bail!(AmbiguousMatch {
                name: name.to_string(),
                kind,
            }),
        }
    }

    async fn create_folder(&mut self, name: &str) -> Result<String> {
        let token = self.bearer().await?;
        let response = self
            .client
            .post(FILES_URL)
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "name": name,
                "mimeType": FOLDER_MIME_TYPE,
            }))
            .send()
            .await
            .context(REMOTE_UNREACHABLE)?;
        let created: FileRef = check(response, "folder create")
            .await?
            .json()
            .await
            .context("Failed to parse the Drive folder create response")?;
        Ok(created.id)
    }

    async fn create_file(&mut self, name: &str, parent_id: &str, content: &str) -> Result<String> {
        let token = self.bearer().await?;
        let response = self
            .client
            .post(FILES_URL)
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "name": name,
                "parents": [parent_id],
                "mimeType": FILE_MIME_TYPE,
            }))
            .send()
            .await
            .context(REMOTE_UNREACHABLE)?;
        let created: FileRef = check(response, "file create")
            .await?
            .json()
            .await
            .context("Failed to parse the Drive file create response")?;

        self.update_file(&created.id, content).await?;
        Ok(created.id)
    }

    async fn read_file(&mut self, id: &str) -> Result<String> {
        let token = self.bearer().await?;
        let response = self
            .client
            .get(format!("{FILES_URL}/{id}"))
            .query(&[("alt", "media")])
            .bearer_auth(&token)
            .send()
            .await
            .context(REMOTE_UNREACHABLE)?;
        check(response, "file download")
            .await?
            .text()
            .await
            .context("Failed to read the Drive file content")
    }

    async fn update_file(&mut self, id: &str, content: &str) -> Result<()> {
        let token = self.bearer().await?;
        let response = self
            .client
            .patch(format!("{UPLOAD_URL}/{id}"))
            .query(&[("uploadType", "media")])
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, FILE_MIME_TYPE)
            .body(content.to_string())
            .send()
            .await
            .context(REMOTE_UNREACHABLE)?;
        check(response, "file upload").await?;
        Ok(())
    }
}

/// Fails with the status and response body when the API call did not succeed.
async fn check(response: reqwest::Response, doing: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("Drive API {doing} failed with status {status}: {body}");
}

/// Escapes single quotes and backslashes for a Drive query string literal.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_query_value() {
        assert_eq!(escape_query_value("plain"), "plain");
        assert_eq!(escape_query_value("it's"), "it\\'s");
        assert_eq!(escape_query_value("a\\b"), "a\\\\b");
    }
}
