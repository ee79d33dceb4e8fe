//! Google Drive v3 as a remote store.
//!

use std::path::PathBuf;

use chrono::Utc;
use reqwest::{
    blocking::{Client, Response},
    header::CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};

use super::{Lookup, NewObject, RemoteObject, RemoteStore, StoreError, TokenStore};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

/// The fields requested for every returned object.
const OBJECT_FIELDS: &str = "id,name,parents";

/// Drive's alias for the user's root folder.
const ROOT_FOLDER: &str = "root";

/// Google Drive v3 over its REST API.
#[derive(Debug)]
pub struct GoogleDrive {
    client: Client,
    tokens: TokenStore,
}

impl GoogleDrive {
    /// Create a client authenticated by the token file at `token_path`.
    pub fn new(token_path: PathBuf) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(concat!("backup-to-cloud/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Request(e, "build HTTP client"))?;

        let tokens = TokenStore::new(token_path, client.clone());

        Ok(Self { client, tokens })
    }
}

impl RemoteStore for GoogleDrive {
    fn find(&self, lookup: &Lookup<'_>) -> Result<Vec<RemoteObject>, StoreError> {
        let access_token = self.tokens.access_token()?;
        let query = drive_query(lookup);

        let response = self
            .client
            .get(FILES_URL)
            .bearer_auth(access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name,parents)"),
                ("spaces", "drive"),
            ])
            .send()
            .map_err(|e| StoreError::Request(e, "list files"))?;

        let list: FileList = check_status(response, "list files")?
            .json()
            .map_err(|e| StoreError::Request(e, "decode file list"))?;

        Ok(list.files)
    }

    fn create(&self, object: &NewObject<'_>, content: Vec<u8>) -> Result<RemoteObject, StoreError> {
        let access_token = self.tokens.access_token()?;

        let metadata = serde_json::to_vec(&FileMetadata {
            name: object.name,
            mime_type: object.mime_type,
            parents: object.parent.into_iter().collect(),
        })?;

        let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let boundary = multipart_boundary(seed, &content);
        let body = multipart_related(&boundary, &metadata, object.mime_type, &content);

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(access_token)
            .query(&[("uploadType", "multipart"), ("fields", OBJECT_FIELDS)])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .map_err(|e| StoreError::Request(e, "create file"))?;

        check_status(response, "create file")?
            .json()
            .map_err(|e| StoreError::Request(e, "decode created file"))
    }

    fn update(
        &self,
        id: &str,
        mime_type: &str,
        content: Vec<u8>,
        keep_revision: bool,
    ) -> Result<RemoteObject, StoreError> {
        let access_token = self.tokens.access_token()?;

        let keep_revision = if keep_revision { "true" } else { "false" };

        let response = self
            .client
            .patch(format!("{UPLOAD_URL}/{id}"))
            .bearer_auth(access_token)
            .query(&[
                ("uploadType", "media"),
                ("keepRevisionForever", keep_revision),
                ("fields", OBJECT_FIELDS),
            ])
            .header(CONTENT_TYPE, mime_type)
            .body(content)
            .send()
            .map_err(|e| StoreError::Request(e, "update file"))?;

        check_status(response, "update file")?
            .json()
            .map_err(|e| StoreError::Request(e, "decode updated file"))
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteObject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

/// The Drive search query for a lookup, an unset folder searches the root folder.
fn drive_query(lookup: &Lookup<'_>) -> String {
    format!(
        "name = '{}' and '{}' in parents",
        escape_query_value(lookup.name),
        escape_query_value(lookup.folder.unwrap_or(ROOT_FOLDER)),
    )
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', r"\\").replace('\'', r"\'")
}

/// A multipart boundary that does not occur in `content`.
fn multipart_boundary(seed: i64, content: &[u8]) -> String {
    let mut attempt: u64 = 0;

    loop {
        let boundary = format!("backup-to-cloud-{seed}-{attempt}");
        let delimiter = format!("--{boundary}");

        if !content
            .windows(delimiter.len())
            .any(|window| window == delimiter.as_bytes())
        {
            return boundary;
        }

        attempt += 1;
    }
}

/// A `multipart/related` body of the JSON metadata followed by the media.
fn multipart_related(boundary: &str, metadata: &[u8], mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);

    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    body
}

fn check_status(response: Response, action: &'static str) -> Result<Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();

    Err(StoreError::Status {
        action,
        status,
        body,
    })
}
