//! The cloud store backups are uploaded to.
//!

pub use authorize::{AuthorizeError, authorize};
pub use drive::GoogleDrive;
pub use token::{Token, TokenError, TokenStore};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod authorize;
mod drive;
mod token;

/// An object in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// The store assigned id.
    pub id: String,

    /// The object's name.
    #[serde(default)]
    pub name: String,

    /// The folders the object is in.
    #[serde(default)]
    pub parents: Vec<String>,
}

impl RemoteObject {
    /// The folder the object is in.
    pub fn parent_folder(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// Find objects named exactly `name` in `folder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup<'a> {
    /// The exact object name.
    pub name: &'a str,

    /// The parent folder, `None` leaves the scope to the store.
    pub folder: Option<&'a str>,
}

/// The metadata of an object to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewObject<'a> {
    /// The object's name.
    pub name: &'a str,

    /// The content's MIME type.
    pub mime_type: &'a str,

    /// The parent folder, `None` for the store's root.
    pub parent: Option<&'a str>,
}

/// A store of named objects in folders.
pub trait RemoteStore {
    /// List the objects matching a lookup.
    fn find(&self, lookup: &Lookup<'_>) -> Result<Vec<RemoteObject>, StoreError>;

    /// Create a new object with the given content.
    fn create(&self, object: &NewObject<'_>, content: Vec<u8>) -> Result<RemoteObject, StoreError>;

    /// Replace an existing object's content, keeping its metadata.
    ///
    /// `keep_revision` asks the store to keep the replaced content as a permanent revision.
    fn update(
        &self,
        id: &str,
        mime_type: &str,
        content: Vec<u8>,
        keep_revision: bool,
    ) -> Result<RemoteObject, StoreError>;
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to get an access token: {0}")]
    Token(#[from] TokenError),

    #[error("Failed to {1}: {0}")]
    Request(#[source] reqwest::Error, &'static str),

    #[error("Failed to {action}, the store responded {status}: {body}")]
    Status {
        action: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to serialize object metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}
