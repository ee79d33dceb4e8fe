//! # common
//!

#![allow(dead_code)]

use core::cell::RefCell;
use std::{fs, path::Path};

use backup_to_cloud::{
    config::Config,
    remote::{Lookup, NewObject, RemoteObject, RemoteStore, StoreError},
};

/// A call made to the mock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find {
        name: String,
        folder: Option<String>,
    },
    Create {
        name: String,
        mime_type: String,
        parent: Option<String>,
    },
    Update {
        id: String,
        mime_type: String,
        keep_revision: bool,
    },
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Find { .. })
    }
}

/// An object held by the mock store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub object: RemoteObject,
    pub mime_type: String,
    pub content: Vec<u8>,
    pub versions: usize,
}

/// An in memory remote store that records every call.
#[derive(Debug, Default)]
pub struct MockStore {
    pub objects: RefCell<Vec<StoredObject>>,
    pub calls: RefCell<Vec<Call>>,
    pub offline: bool,
}

impl MockStore {
    /// A store that fails every request.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Add an existing object to the store.
    pub fn with_object(self, id: &str, name: &str, folder: Option<&str>) -> Self {
        self.objects.borrow_mut().push(StoredObject {
            object: RemoteObject {
                id: id.to_string(),
                name: name.to_string(),
                parents: folder.into_iter().map(str::to_string).collect(),
            },
            mime_type: "application/octet-stream".to_string(),
            content: Vec::new(),
            versions: 1,
        });

        self
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// The create and update calls made so far.
    pub fn writes(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.is_write())
            .cloned()
            .collect()
    }

    /// The objects named `name` in `folder`.
    pub fn named(&self, name: &str, folder: Option<&str>) -> Vec<StoredObject> {
        self.objects
            .borrow()
            .iter()
            .filter(|stored| stored.object.name == name && stored.object.parent_folder() == folder)
            .cloned()
            .collect()
    }

    fn check_online(&self, action: &'static str) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Status {
                action,
                status: 503,
                body: "offline".to_string(),
            });
        }

        Ok(())
    }
}

impl RemoteStore for MockStore {
    fn find(&self, lookup: &Lookup<'_>) -> Result<Vec<RemoteObject>, StoreError> {
        self.calls.borrow_mut().push(Call::Find {
            name: lookup.name.to_string(),
            folder: lookup.folder.map(str::to_string),
        });
        self.check_online("list files")?;

        Ok(self
            .named(lookup.name, lookup.folder)
            .into_iter()
            .map(|stored| stored.object)
            .collect())
    }

    fn create(&self, object: &NewObject<'_>, content: Vec<u8>) -> Result<RemoteObject, StoreError> {
        self.calls.borrow_mut().push(Call::Create {
            name: object.name.to_string(),
            mime_type: object.mime_type.to_string(),
            parent: object.parent.map(str::to_string),
        });
        self.check_online("create file")?;

        let mut objects = self.objects.borrow_mut();
        let created = RemoteObject {
            id: format!("id-{}", objects.len()),
            name: object.name.to_string(),
            parents: object.parent.into_iter().map(str::to_string).collect(),
        };

        objects.push(StoredObject {
            object: created.clone(),
            mime_type: object.mime_type.to_string(),
            content,
            versions: 1,
        });

        Ok(created)
    }

    fn update(
        &self,
        id: &str,
        mime_type: &str,
        content: Vec<u8>,
        keep_revision: bool,
    ) -> Result<RemoteObject, StoreError> {
        self.calls.borrow_mut().push(Call::Update {
            id: id.to_string(),
            mime_type: mime_type.to_string(),
            keep_revision,
        });
        self.check_online("update file")?;

        let mut objects = self.objects.borrow_mut();
        let Some(stored) = objects.iter_mut().find(|stored| stored.object.id == id) else {
            return Err(StoreError::Status {
                action: "update file",
                status: 404,
                body: format!("file {id} not found"),
            });
        };

        stored.content = content;
        stored.mime_type = mime_type.to_string();
        stored.versions += 1;

        Ok(stored.object.clone())
    }
}

/// Write a file, creating its parent folders.
pub fn write_file(root: &Path, relative_path: &str, contents: &str) {
    let path = root.join(relative_path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Parse an entries file that is expected to be valid.
pub fn config(contents: &str) -> Config {
    Config::parse(contents).unwrap()
}

/// A path as a TOML literal string.
pub fn toml_path(path: &Path) -> String {
    format!("'{}'", path.display())
}
