//! Turning backup entries into upload payloads.
//!

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    config::{BackupEntry, EntryKind},
    discovery::{archive_root, list_files},
    mime::{ARCHIVE_MIME_TYPE, infer_mime_type},
    payload::{Content, UploadPayload},
};

/// What to do with an entry this run.
#[derive(Debug)]
pub enum EntryPlan {
    /// The entry has no source path, nothing is uploaded.
    Excluded,

    /// Upload each payload, in order.
    Upload(Vec<UploadPayload>),
}

/// Plan the payloads for an entry.
pub fn plan_entry(entry: &BackupEntry) -> Result<EntryPlan, PlanError> {
    let Some(source_path) = &entry.source_path else {
        return Ok(EntryPlan::Excluded);
    };

    let payloads = match entry.kind {
        EntryKind::SingleFile => {
            if !source_path.is_file() {
                return Err(PlanError::FileNotFound(source_path.clone()));
            }

            vec![file_payload(entry, source_path.clone())?]
        }

        EntryKind::MultipleFiles => {
            let files = list_files(source_path, &entry.name_filter);
            if files.is_empty() {
                return Err(PlanError::NoFilesFound {
                    path: source_path.clone(),
                    filter: entry.name_filter.as_str().to_string(),
                });
            }

            if entry.bundle_as_zip {
                vec![archive_payload(entry, source_path, files)?]
            } else {
                files
                    .into_iter()
                    .map(|file| file_payload(entry, file))
                    .collect::<Result<_, _>>()?
            }
        }
    };

    Ok(EntryPlan::Upload(payloads))
}

fn file_payload(entry: &BackupEntry, path: PathBuf) -> Result<UploadPayload, PlanError> {
    let Some(file_name) = path.file_name() else {
        return Err(PlanError::NoFileName(path));
    };

    Ok(UploadPayload {
        display_name: file_name.to_string_lossy().into_owned(),
        mime_type: infer_mime_type(&path),
        destination_folder: entry.destination_folder.clone(),
        content: Content::File(path),
    })
}

fn archive_payload(
    entry: &BackupEntry,
    source_path: &Path,
    files: Vec<PathBuf>,
) -> Result<UploadPayload, PlanError> {
    let Some(archive_name) = &entry.archive_name else {
        return Err(PlanError::MissingArchiveName);
    };

    let Some(root) = archive_root(&files) else {
        return Err(PlanError::NoFilesFound {
            path: source_path.to_path_buf(),
            filter: entry.name_filter.as_str().to_string(),
        });
    };

    Ok(UploadPayload {
        display_name: archive_name.clone(),
        mime_type: ARCHIVE_MIME_TYPE.to_string(),
        destination_folder: entry.destination_folder.clone(),
        content: Content::Archive { root, files },
    })
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("No files found (path={path:?}, filter={filter:?})")]
    NoFilesFound { path: PathBuf, filter: String },

    #[error("File {0:?} does not exist")]
    FileNotFound(PathBuf),

    #[error("Path {0:?} has no file name")]
    NoFileName(PathBuf),

    #[error("Entry is zipped but has no archive name")]
    MissingArchiveName,
}
