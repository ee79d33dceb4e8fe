//! MIME type inference
//!

use std::path::Path;

/// The MIME type used for zip archives and files with an unknown extension.
pub const ARCHIVE_MIME_TYPE: &str = "application/octet-stream";

/// Extensions whose MIME type takes precedence over the common guess.
const EXTRA_MIME_TYPES: &[(&str, &str)] = &[
    ("arj", "application/arj"),
    ("cab", "application/cab"),
    ("xla", "application/vnd.ms-excel"),
    ("pot", "application/vnd.ms-powerpoint"),
    ("mdb", "application/x-msaccess"),
    ("pyc", "application/x-python-code"),
    ("rar", "application/x-rar-compressed"),
    ("db", "application/x-sqlite3"),
    ("sqlite", "application/x-sqlite3"),
    ("yaml", "application/x-yaml"),
    ("yml", "application/x-yaml"),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
    ("bmp", "image/x-ms-bmp"),
    ("csv", "text/csv"),
    ("php", "text/x-php"),
    ("py", "text/x-python"),
];

/// Infer a file's MIME type from its extension.
pub fn infer_mime_type(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_lowercase());

    if let Some(extension) = &extension {
        if let Some((_, mime_type)) = EXTRA_MIME_TYPES
            .iter()
            .find(|(known, _)| *known == extension.as_str())
        {
            return (*mime_type).to_string();
        }
    }

    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(ARCHIVE_MIME_TYPE)
        .to_string()
}
