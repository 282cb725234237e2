//! The main run: import a bank export, reconcile it with the persisted
//! history, and regenerate the monthly-by-payee spreadsheet.

use crate::api::{self, Mode, ObjectKind};
use crate::commands::Out;
use crate::model::{payee_filter, PayeeFilter};
use crate::{codec, import, matrix::AggregationMatrix, reconcile, render, utils};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Structured summary of a generate run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateSummary {
    /// Transactions parsed from the bank export.
    pub imported: usize,
    /// Size of the persisted history after reconciliation.
    pub merged: usize,
    /// How many imported transactions were not already on record.
    pub new_entries: usize,
    /// Payee filters applied (local and remote combined).
    pub filters: usize,
    /// Transactions on record that matched no filter and are therefore
    /// excluded from the spreadsheet.
    pub unmatched: usize,
}

/// Runs the whole pipeline once: parse the export, merge it with the stored
/// transaction history, persist the merged history, combine the payee filter
/// sources, build the aggregation matrix and render it locally and into the
/// store. Any failure aborts the run before the spreadsheet is touched.
pub async fn generate(
    config: &Config,
    mode: Mode,
    csv_file: &Path,
) -> Result<Out<GenerateSummary>> {
    let imported = import::read_transactions(csv_file, config.csv_import())
        .with_context(|| format!("Unable to import the bank export at {}", csv_file.display()))?;
    let imported_count = imported.len();
    debug!("Imported {imported_count} transactions from {}", csv_file.display());

    let local_filters = load_local_filters(config).await?;

    let mut store = api::store(config, mode).await?;

    let folder_id = match store.search(config.folder_name(), ObjectKind::Folder).await? {
        Some(id) => id,
        None => {
            debug!("Folder {} did not exist, creating it", config.folder_name());
            store.create_folder(config.folder_name()).await?
        }
    };

    // Reconcile the import with the persisted history and write the merged
    // list back; on a first run the import is persisted as-is.
    let transactions_file = store
        .search(config.transactions_object(), ObjectKind::File)
        .await?;
    let persisted = match &transactions_file {
        Some(id) => Some(codec::decode(&store.read_file(id).await?)?),
        None => None,
    };
    let persisted_count = persisted.as_ref().map_or(0, Vec::len);
    let merged = reconcile::merge_transactions(imported, persisted);
    let encoded = codec::encode(&merged)?;
    match &transactions_file {
        Some(id) => store.update_file(id, &encoded).await?,
        None => {
            store
                .create_file(config.transactions_object(), &folder_id, &encoded)
                .await?;
        }
    }
    let new_entries = merged.len() - persisted_count;
    info!("Persisted {} transactions ({new_entries} new)", merged.len());

    // Combine the local filters with whatever the store holds.
    let remote_filters = match store.search(config.filters_object(), ObjectKind::File).await? {
        Some(id) => payee_filter::parse_filters(&store.read_file(&id).await?)?,
        None => Vec::new(),
    };
    let filters = payee_filter::merge_filters(local_filters, remote_filters);

    let unmatched = merged
        .iter()
        .filter(|t| !filters.iter().any(|f| f.matches(t.name())))
        .count();
    if unmatched > 0 {
        debug!("{unmatched} transactions match no payee filter and are excluded from the spreadsheet");
    }

    let matrix = AggregationMatrix::build(&merged, &filters);
    let rows = render::to_rows(&matrix, &filters);
    let rendered = render::to_csv_string(&rows)?;

    let spreadsheet_path = config.spreadsheet_path();
    utils::write(&spreadsheet_path, &rendered).await?;
    info!("Wrote the spreadsheet to {}", spreadsheet_path.display());

    // Keep a copy of the rendered spreadsheet in the drive folder too.
    api::put_object(
        store.as_mut(),
        config.spreadsheet_object(),
        &folder_id,
        &rendered,
    )
    .await?;

    let summary = GenerateSummary {
        imported: imported_count,
        merged: merged.len(),
        new_entries,
        filters: filters.len(),
        unmatched,
    };
    Ok(Out::new(
        format!(
            "Generated the recurring payments spreadsheet from {} transactions across {} payees",
            summary.merged, summary.filters
        ),
        summary,
    ))
}

async fn load_local_filters(config: &Config) -> Result<Vec<PayeeFilter>> {
    let path = config.payee_filters_path();
    let payload = utils::read(&path)
        .await
        .with_context(|| format!("Unable to read local payee filters at {}", path.display()))?;
    payee_filter::parse_filters(&payload)
}
