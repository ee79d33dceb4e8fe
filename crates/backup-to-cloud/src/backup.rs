//! Running a backup
//!

use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    config::{BackupEntry, Config},
    context::Context,
    payload::UploadPayload,
    planner::{EntryPlan, PlanError, plan_entry},
    reconciler::{Outcome, ReconcileError, reconcile},
    remote::RemoteStore,
};

/// A payload that was uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    /// The entry the payload came from.
    pub entry: String,

    /// The remote write.
    pub outcome: Outcome,
}

/// Upload every entry, in order, stopping at the first error.
///
/// Errors are logged with the entry they happened in before being returned.
pub fn create_backup<S: RemoteStore + ?Sized>(
    config: &Config,
    store: &S,
) -> Result<Vec<Uploaded>, BackupError> {
    let mut uploaded = Vec::new();

    for entry in &config.entries {
        let context = Context::new(&entry.name);

        let Some(payloads) = plan(context, entry)? else {
            continue;
        };

        for payload in payloads {
            let outcome = reconcile(store, &payload)
                .map_err(|source| BackupError::Upload {
                    entry: entry.name.clone(),
                    name: payload.display_name.clone(),
                    source,
                })
                .inspect_err(|error| error!("{context}{error}"))?;

            debug!("{context}'{}' is {}", payload.display_name, outcome.object().id);

            uploaded.push(Uploaded {
                entry: entry.name.clone(),
                outcome,
            });
        }
    }

    Ok(uploaded)
}

/// Plan every entry without reading any content or touching the remote store.
///
/// Returns the number of payloads a backup would upload.
pub fn check_settings(config: &Config) -> Result<usize, BackupError> {
    let mut payload_count = 0;

    for entry in &config.entries {
        let context = Context::new(&entry.name);

        let Some(payloads) = plan(context, entry)? else {
            continue;
        };

        for payload in &payloads {
            debug!(
                "{context}Would upload '{}' ({}) to {}",
                payload.display_name,
                payload.mime_type,
                payload.destination_folder.as_deref().unwrap_or("the root folder")
            );
        }

        payload_count += payloads.len();
    }

    Ok(payload_count)
}

/// Plan an entry, `None` if it is excluded from this run.
fn plan(context: Context<'_>, entry: &BackupEntry) -> Result<Option<Vec<UploadPayload>>, BackupError> {
    match plan_entry(entry) {
        Ok(EntryPlan::Excluded) => {
            info!("Excluding entry {:?}", entry.name);
            Ok(None)
        }

        Ok(EntryPlan::Upload(payloads)) => Ok(Some(payloads)),

        Err(source) => {
            let error = BackupError::Plan {
                entry: entry.name.clone(),
                source,
            };
            error!("{context}{error}");

            Err(error)
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed to plan entry '{entry}': {source}")]
    Plan {
        entry: String,
        #[source]
        source: PlanError,
    },

    #[error("Failed to upload '{name}' of entry '{entry}': {source}")]
    Upload {
        entry: String,
        name: String,
        #[source]
        source: ReconcileError,
    },
}
