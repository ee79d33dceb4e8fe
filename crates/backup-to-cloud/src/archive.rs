//! In memory zip archives
//!

use std::{
    fs::File,
    io::{self, Cursor, ErrorKind},
    path::{Path, PathBuf},
};

use thiserror::Error;
use zip::{CompressionMethod, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::discovery::posix_path;

/// Zip `files` into memory, each entry named by its path relative to `root`.
pub fn build_archive(root: &Path, files: &[PathBuf]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for path in files {
        let entry_name = match path.strip_prefix(root) {
            Ok(relative) => posix_path(relative),
            Err(_) => return Err(ArchiveError::OutsideRoot(path.clone())),
        };

        let mut file = File::open(path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => ArchiveError::FileNotFound(path.clone()),
            _ => ArchiveError::Io(error, "open file"),
        })?;
        let file_size = file
            .metadata()
            .map_err(|e| ArchiveError::Io(e, "get file metadata"))?
            .len();

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(file_size >= u64::from(u32::MAX));

        writer.start_file(entry_name, options)?;
        io::copy(&mut file, &mut writer).map_err(|e| ArchiveError::Io(e, "write archive entry"))?;
    }

    let cursor = writer.finish()?;

    Ok(cursor.into_inner())
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("File {0:?} is outside of the archive root")]
    OutsideRoot(PathBuf),

    #[error("Failed to {1}: {0}")]
    Io(#[source] io::Error, &'static str),

    #[error("Failed to write archive: {0}")]
    Zip(#[from] ZipError),
}
