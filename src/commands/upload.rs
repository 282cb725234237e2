//! Pushes local data to the store, replacing whatever is there. This is the
//! explicit-reset counterpart of `generate`, mainly for seeding a fresh drive
//! folder or repairing one. The rendered spreadsheet is not restored; the
//! next `generate` run recreates it.

use crate::api::{self, Mode, ObjectKind};
use crate::commands::Out;
use crate::model::payee_filter;
use crate::{codec, import, utils};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Structured summary of an upload run.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    /// Payee filters pushed to the store.
    pub filters: usize,
    /// Transactions pushed to the store; zero when no export was given.
    pub transactions: usize,
}

/// Uploads the local payee filters, and when `csv_file` is given, replaces
/// the persisted transaction history with the parsed export. No merging
/// happens here; the store afterwards mirrors the local data.
pub async fn upload(
    config: &Config,
    mode: Mode,
    csv_file: Option<&Path>,
) -> Result<Out<UploadSummary>> {
    let mut store = api::store(config, mode).await?;

    let folder_id = match store.search(config.folder_name(), ObjectKind::Folder).await? {
        Some(id) => id,
        None => {
            debug!("Folder {} did not exist, creating it", config.folder_name());
            store.create_folder(config.folder_name()).await?
        }
    };

    // Validate the local filter payload before overwriting the store copy.
    let filters_path = config.payee_filters_path();
    let payload = utils::read(&filters_path)
        .await
        .with_context(|| format!("Unable to read local payee filters at {}", filters_path.display()))?;
    let filters = payee_filter::parse_filters(&payload)?;
    api::put_object(store.as_mut(), config.filters_object(), &folder_id, &payload).await?;

    let transactions = match csv_file {
        Some(path) => {
            let parsed = import::read_transactions(path, config.csv_import())
                .with_context(|| format!("Unable to import the bank export at {}", path.display()))?;
            let encoded = codec::encode(&parsed)?;
            api::put_object(
                store.as_mut(),
                config.transactions_object(),
                &folder_id,
                &encoded,
            )
            .await?;
            parsed.len()
        }
        None => 0,
    };

    let summary = UploadSummary {
        filters: filters.len(),
        transactions,
    };
    let message = match csv_file {
        Some(_) => format!(
            "Uploaded {} payee filters and reset the history to {} transactions",
            summary.filters, summary.transactions
        ),
        None => format!("Uploaded {} payee filters", summary.filters),
    };
    Ok(Out::new(message, summary))
}
