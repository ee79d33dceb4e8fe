//! The unit handed to the reconciler.
//!

use std::{
    fs,
    io::{self, ErrorKind},
    path::PathBuf,
};

use thiserror::Error;

use crate::archive::{ArchiveError, build_archive};

/// One file, or one archive of files, ready to upload.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    /// The name of the remote object.
    pub display_name: String,

    /// The MIME type sent with the content.
    pub mime_type: String,

    /// The remote folder, `None` for the remote root.
    pub destination_folder: Option<String>,

    /// Where the bytes come from.
    pub content: Content,
}

/// The source of a payload's bytes, read only when the payload is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A file on disk.
    File(PathBuf),

    /// A zip archive of `files`, entries named relative to `root`.
    Archive {
        /// The common ancestor of `files`.
        root: PathBuf,
        /// The files to archive.
        files: Vec<PathBuf>,
    },
}

impl Content {
    /// Read the content into memory.
    pub fn read(&self) -> Result<Vec<u8>, ContentError> {
        match self {
            Self::File(path) => fs::read(path).map_err(|error| match error.kind() {
                ErrorKind::NotFound => ContentError::FileNotFound(path.clone()),
                _ => ContentError::Read(error, path.clone()),
            }),
            Self::Archive { root, files } => Ok(build_archive(root, files)?),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("Failed to read {1:?}: {0}")]
    Read(#[source] io::Error, PathBuf),

    #[error("Failed to build archive: {0}")]
    Archive(#[from] ArchiveError),
}
