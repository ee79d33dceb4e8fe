//! The backup entries file
//!

use core::{fmt, str::FromStr};
use std::{
    fs,
    path::{Path, PathBuf},
};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The filter used when an entry doesn't define one, matches every file.
pub const DEFAULT_FILTER: &str = ".";

/// What an entry's root path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The root path is a single file.
    SingleFile,

    /// The root path is a folder, every file below it matching the filter is backed up.
    MultipleFiles,
}

impl EntryKind {
    /// The name of the kind in the entries file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleFile => "single-file",
            Self::MultipleFiles => "multiple-files",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-file" => Ok(Self::SingleFile),
            "multiple-files" => Ok(Self::MultipleFiles),
            _ => Err(format!("invalid entry type '{s}'")),
        }
    }
}

/// A validated backup entry.
#[derive(Debug, Clone)]
pub struct BackupEntry {
    /// The entry's name, only used for logging.
    pub name: String,

    /// What the source path points at.
    pub kind: EntryKind,

    /// The file or folder to back up, `None` if the entry is excluded from this run.
    pub source_path: Option<PathBuf>,

    /// The remote folder to upload into, `None` for the remote root.
    pub destination_folder: Option<String>,

    /// If the discovered files should be uploaded as a single zip archive.
    pub bundle_as_zip: bool,

    /// The name of the zip archive, always present when `bundle_as_zip` is set.
    pub archive_name: Option<String>,

    /// Case insensitive filter applied to the full path of each discovered file.
    pub name_filter: Regex,
}

/// The tool's backup entries, in file order.
#[derive(Debug, Clone)]
pub struct Config {
    /// The backup entries.
    pub entries: Vec<BackupEntry>,
}

impl Config {
    /// Tries to load a config from a toml file.
    pub fn load_toml(file_path: &Path) -> Result<Self, LoadConfigError> {
        if !file_path.exists() {
            return Err(LoadConfigError::NoFile(file_path.to_path_buf()));
        }

        let contents = fs::read_to_string(file_path).map_err(LoadConfigError::Read)?;

        Self::parse(&contents)
    }

    /// Parses and validates the contents of an entries file.
    pub fn parse(contents: &str) -> Result<Self, LoadConfigError> {
        let table: toml::Table = toml::from_str(contents)?;

        let entries = table
            .into_iter()
            .map(|(name, value)| {
                let raw = value
                    .try_into::<RawEntry>()
                    .map_err(|source| LoadConfigError::InvalidEntry {
                        entry: name.clone(),
                        source,
                    })?;

                raw.validate(name)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// An example entries file.
    pub fn example() -> Result<String, toml::ser::Error> {
        let examples = [
            (
                "documents",
                RawEntry {
                    kind: EntryKind::MultipleFiles.as_str().to_string(),
                    root_path: RootPath::Path(PathBuf::from("/home/user/Documents")),
                    cloud_folder_id: Some("<drive folder id>".to_string()),
                    zip: Some(true),
                    zipname: Some("documents.zip".to_string()),
                    filter: Some(r"\.pdf$".to_string()),
                },
            ),
            (
                "database",
                RawEntry {
                    kind: EntryKind::SingleFile.as_str().to_string(),
                    root_path: RootPath::Path(PathBuf::from("/var/backups/app.db")),
                    cloud_folder_id: None,
                    zip: None,
                    zipname: None,
                    filter: None,
                },
            ),
            (
                "disabled",
                RawEntry {
                    kind: EntryKind::SingleFile.as_str().to_string(),
                    root_path: RootPath::Enabled(false),
                    cloud_folder_id: None,
                    zip: None,
                    zipname: None,
                    filter: None,
                },
            ),
        ];

        let mut table = toml::Table::new();
        for (name, entry) in examples {
            table.insert(name.to_string(), toml::Value::try_from(entry)?);
        }

        toml::to_string_pretty(&table)
    }
}

/// TOML has no null, `root-path = false` excludes an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RootPath {
    Path(PathBuf),
    Enabled(bool),
}

/// An entry as written in the entries file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,

    #[serde(alias = "root_path")]
    root_path: RootPath,

    #[serde(alias = "cloud_folder_id", default, skip_serializing_if = "Option::is_none")]
    cloud_folder_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    zipname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
}

impl RawEntry {
    fn validate(self, name: String) -> Result<BackupEntry, LoadConfigError> {
        let kind = match self.kind.parse::<EntryKind>() {
            Ok(kind) => kind,
            Err(_) => {
                return Err(LoadConfigError::InvalidEntryType {
                    entry: name,
                    value: self.kind,
                });
            }
        };

        let source_path = match self.root_path {
            RootPath::Path(path) if path.as_os_str().is_empty() => {
                return Err(LoadConfigError::InvalidRootPath(name));
            }
            RootPath::Path(path) => Some(path),
            RootPath::Enabled(false) => None,
            RootPath::Enabled(true) => return Err(LoadConfigError::InvalidRootPath(name)),
        };

        let bundle_as_zip = self.zip.unwrap_or(false);
        let archive_name = self.zipname.filter(|zipname| !zipname.is_empty());
        if bundle_as_zip && archive_name.is_none() {
            return Err(LoadConfigError::MissingArchiveName(name));
        }

        let filter = self.filter.as_deref().unwrap_or(DEFAULT_FILTER);
        let name_filter = match RegexBuilder::new(filter).case_insensitive(true).build() {
            Ok(regex) => regex,
            Err(source) => return Err(LoadConfigError::InvalidFilter { entry: name, source }),
        };

        Ok(BackupEntry {
            name,
            kind,
            source_path,
            destination_folder: self.cloud_folder_id,
            bundle_as_zip,
            archive_name,
            name_filter,
        })
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("The file {0:?} does not exist.")]
    NoFile(PathBuf),

    #[error("Failed to read the file:\n{0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to deserialize the file:\n{0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("Entry '{entry}' is invalid:\n{source}")]
    InvalidEntry {
        entry: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Entry '{entry}' has an invalid type '{value}' (expected single-file or multiple-files)")]
    InvalidEntryType { entry: String, value: String },

    #[error("Entry '{0}' must set 'root-path' to a path, or to false to exclude it")]
    InvalidRootPath(String),

    #[error("Entry '{0}' must provide 'zipname' if zip=true")]
    MissingArchiveName(String),

    #[error("Entry '{entry}' has an invalid filter:\n{source}")]
    InvalidFilter {
        entry: String,
        #[source]
        source: regex::Error,
    },
}
