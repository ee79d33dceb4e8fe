//! Authorizing the tool against a Google account.
//!
//! Runs the installed-app consent flow with a loopback redirect and saves the
//! resulting token.
//!

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tiny_http::{Response, Server};
use tracing::info;
use url::Url;

use super::token::{Token, TokenError, TokenResponse};

/// Full access to the user's Drive, needed to update files the tool didn't create.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// An OAuth client secrets file, as downloaded from the Google Cloud console.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
}

/// Run the installed app OAuth flow and save the granted token to `token_path`.
///
/// Prints the consent URL, then waits for the browser to be redirected to a loopback
/// listener with the authorization code.
pub fn authorize(credentials_path: &Path, token_path: &Path) -> Result<Token, AuthorizeError> {
    let contents = fs::read_to_string(credentials_path)
        .map_err(|e| AuthorizeError::ReadCredentials(e, credentials_path.to_path_buf()))?;
    let secrets: ClientSecretsFile = serde_json::from_str(&contents)?;
    let Some(secrets) = secrets.installed.or(secrets.web) else {
        return Err(AuthorizeError::NoClient);
    };

    let server = Server::http("127.0.0.1:0").map_err(|e| AuthorizeError::Listen(e.to_string()))?;
    let Some(address) = server.server_addr().to_ip() else {
        return Err(AuthorizeError::Listen("listener has no IP address".to_string()));
    };
    let redirect_uri = format!("http://{address}/");

    let consent_url = Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", DRIVE_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )?;

    info!("Open this URL in a browser to authorize access to Google Drive:\n{consent_url}");

    let code = loop {
        let request = server.recv().map_err(|e| AuthorizeError::Io(e, "receive redirect"))?;

        let url = Url::parse(&redirect_uri)?.join(request.url())?;
        let mut code = None;
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            let _ = request.respond(Response::from_string("Authorization was denied."));
            return Err(AuthorizeError::Denied(error));
        }

        match code {
            Some(code) => {
                request
                    .respond(Response::from_string(
                        "Authorization complete, you may close this window.",
                    ))
                    .map_err(|e| AuthorizeError::Io(e, "respond to redirect"))?;
                break code;
            }
            // Browsers also ask for things like the favicon.
            None => {
                let _ = request.respond(Response::empty(404_u16));
            }
        }
    };

    let response = Client::new()
        .post(&secrets.token_uri)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .map_err(AuthorizeError::Exchange)?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        return Err(AuthorizeError::ExchangeRejected { status, body });
    }

    let response: TokenResponse = response.json().map_err(AuthorizeError::Exchange)?;
    let token = Token::from_response(
        response,
        secrets.token_uri,
        secrets.client_id,
        secrets.client_secret,
    );
    token.save(token_path)?;

    info!("Token saved to {token_path:?} (expires {})", token.expiry);

    Ok(token)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum AuthorizeError {
    #[error("Failed to read credentials {1:?}: {0}")]
    ReadCredentials(#[source] io::Error, PathBuf),

    #[error("Malformed credentials: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Credentials have no 'installed' or 'web' client")]
    NoClient,

    #[error("Failed to start the redirect listener: {0}")]
    Listen(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to {1}: {0}")]
    Io(#[source] io::Error, &'static str),

    #[error("Authorization was denied: {0}")]
    Denied(String),

    #[error("Failed to exchange the authorization code: {0}")]
    Exchange(#[source] reqwest::Error),

    #[error("Exchanging the authorization code was rejected ({status}): {body}")]
    ExchangeRejected { status: u16, body: String },

    #[error("Failed to save token: {0}")]
    Token(#[from] TokenError),
}
