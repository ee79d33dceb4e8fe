//! Create or update the remote object for a payload.
//!
//! Each payload resolves to exactly one remote write. The remote store is searched for
//! objects with the payload's name in its folder:
//!
//! - no match: a new object is created.
//! - one match: the match's content is replaced, keeping its id.
//! - several matches: nothing is written, picking one could overwrite the wrong object.
//!

use thiserror::Error;
use tracing::info;

use crate::{
    payload::{ContentError, UploadPayload},
    remote::{Lookup, NewObject, RemoteObject, RemoteStore, StoreError},
};

/// The result of looking up a payload's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No object has the name.
    NotFound,

    /// Exactly one object has the name.
    Found(RemoteObject),

    /// More than one object has the name, holds their ids.
    Ambiguous(Vec<String>),
}

impl Resolution {
    /// Resolve the objects a lookup returned.
    pub fn from_matches(matches: Vec<RemoteObject>) -> Self {
        let mut matches = matches.into_iter();

        match (matches.next(), matches.next()) {
            (None, _) => Self::NotFound,
            (Some(object), None) => Self::Found(object),
            (Some(first), Some(second)) => Self::Ambiguous(
                [first, second]
                    .into_iter()
                    .chain(matches)
                    .map(|object| object.id)
                    .collect(),
            ),
        }
    }
}

/// The write a payload resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new object was created.
    Created(RemoteObject),

    /// A new version of an existing object was saved.
    Updated(RemoteObject),
}

impl Outcome {
    /// The remote object that was written.
    pub fn object(&self) -> &RemoteObject {
        match self {
            Self::Created(object) | Self::Updated(object) => object,
        }
    }
}

/// Upload a payload, creating its remote object or saving a new version of it.
pub fn reconcile<S: RemoteStore + ?Sized>(
    store: &S,
    payload: &UploadPayload,
) -> Result<Outcome, ReconcileError> {
    let content = payload.content.read()?;

    let folder = payload.destination_folder.as_deref();
    let lookup = Lookup {
        name: &payload.display_name,
        folder,
    };

    match Resolution::from_matches(store.find(&lookup)?) {
        Resolution::NotFound => {
            info!("Saving new file: {}", payload.display_name);

            let object = NewObject {
                name: &payload.display_name,
                mime_type: &payload.mime_type,
                parent: folder,
            };

            Ok(Outcome::Created(store.create(&object, content)?))
        }

        Resolution::Found(existing) => {
            info!("Saving new version of {}", payload.display_name);

            let object = store.update(&existing.id, &payload.mime_type, content, false)?;

            Ok(Outcome::Updated(object))
        }

        Resolution::Ambiguous(ids) => Err(ReconcileError::MultipleFiles {
            name: payload.display_name.clone(),
            ids,
        }),
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{0}")]
    Content(#[from] ContentError),

    #[error("Detected more than one file named '{name}' in the target folder {ids:?}")]
    MultipleFiles { name: String, ids: Vec<String> },

    #[error("{0}")]
    Store(#[from] StoreError),
}
