//! The persisted OAuth token and its refresh.
//!

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Tokens this close to their expiry are refreshed before use.
const EXPIRY_LEEWAY_SECONDS: i64 = 60;

/// A persisted OAuth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The bearer token sent with each request.
    pub access_token: String,

    /// The token used to get a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token expires.
    pub expiry: DateTime<Utc>,

    /// The endpoint to refresh the token at.
    pub token_uri: String,

    /// The OAuth client id.
    pub client_id: String,

    /// The OAuth client secret.
    pub client_secret: String,

    /// The scopes the token was granted.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// A token endpoint's response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl Token {
    /// Create a token from a token endpoint's response.
    pub(crate) fn from_response(
        response: TokenResponse,
        token_uri: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        let mut token = Self {
            access_token: String::new(),
            refresh_token: None,
            expiry: Utc::now(),
            token_uri,
            client_id,
            client_secret,
            scopes: Vec::new(),
        };
        token.apply(response);

        token
    }

    /// Tries to load a token from a json file.
    pub fn load(path: &Path) -> Result<Self, TokenError> {
        if !path.exists() {
            return Err(TokenError::Missing(path.to_path_buf()));
        }

        let contents =
            fs::read_to_string(path).map_err(|e| TokenError::Read(e, path.to_path_buf()))?;
        let token =
            serde_json::from_str(&contents).map_err(|e| TokenError::Deserialize(e, path.to_path_buf()))?;

        Ok(token)
    }

    /// Save the token, replacing the file.
    pub fn save(&self, path: &Path) -> Result<(), TokenError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TokenError::Serialize(e, path.to_path_buf()))?;
        fs::write(path, contents).map_err(|e| TokenError::Write(e, path.to_path_buf()))?;

        Ok(())
    }

    /// Returns if the access token has expired, or is about to.
    pub fn is_expired(&self) -> bool {
        Utc::now() + TimeDelta::seconds(EXPIRY_LEEWAY_SECONDS) >= self.expiry
    }

    /// Exchange the refresh token for a new access token.
    fn refresh(&mut self, client: &Client, path: &Path) -> Result<(), TokenError> {
        let Some(refresh_token) = &self.refresh_token else {
            return Err(TokenError::Invalid(path.to_path_buf()));
        };

        let response = client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .map_err(|e| TokenError::Refresh(e, path.to_path_buf()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(TokenError::RefreshRejected {
                path: path.to_path_buf(),
                status,
                body,
            });
        }

        let response: TokenResponse = response
            .json()
            .map_err(|e| TokenError::Refresh(e, path.to_path_buf()))?;
        self.apply(response);

        Ok(())
    }

    fn apply(&mut self, response: TokenResponse) {
        self.access_token = response.access_token;
        self.expiry = Utc::now() + TimeDelta::seconds(response.expires_in);

        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }

        if let Some(scope) = response.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }
}

/// The process wide token, loaded on first use and refreshed in place.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    client: Client,
    token: Mutex<Option<Token>>,
}

impl TokenStore {
    /// Create a token store backed by the token file at `path`.
    pub fn new(path: PathBuf, client: Client) -> Self {
        Self {
            path,
            client,
            token: Mutex::new(None),
        }
    }

    /// Returns a valid access token, refreshing and saving the token if it has expired.
    pub fn access_token(&self) -> Result<String, TokenError> {
        // Loading and refreshing both happen under the lock so the token file is only
        // ever rewritten by one caller.
        let mut guard = self.token.lock().map_err(|_| TokenError::Poisoned)?;

        let token = match guard.take() {
            Some(token) => token,
            None => Token::load(&self.path)?,
        };
        let token = guard.insert(token);

        if token.is_expired() {
            token.refresh(&self.client, &self.path)?;
            token.save(&self.path)?;
            info!("Token updated (expires {})", token.expiry);
        }

        Ok(token.access_token.clone())
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token file {0:?} doesn't exist, run gen-token")]
    Missing(PathBuf),

    #[error("Failed to read token {1:?}: {0}")]
    Read(#[source] io::Error, PathBuf),

    #[error("Failed to write token {1:?}: {0}")]
    Write(#[source] io::Error, PathBuf),

    #[error("Malformed token {1:?}: {0}")]
    Deserialize(#[source] serde_json::Error, PathBuf),

    #[error("Failed to serialize token {1:?}: {0}")]
    Serialize(#[source] serde_json::Error, PathBuf),

    #[error("Invalid token {0:?}: expired and no refresh token")]
    Invalid(PathBuf),

    #[error("Failed to refresh token {1:?}: {0}")]
    Refresh(#[source] reqwest::Error, PathBuf),

    #[error("Refreshing token {path:?} was rejected ({status}): {body}")]
    RefreshRejected {
        path: PathBuf,
        status: u16,
        body: String,
    },

    #[error("The token lock was poisoned")]
    Poisoned,
}
