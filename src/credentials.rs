use std::{fs, io, path::Path};

use bitbucket_api::Credentials;
use serde::Deserialize;

use crate::error::CredentialsError;

/// credentials file as written, fields are checked after parsing
#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    username: Option<String>,
    token: Option<String>,
}

/// Read the bitbucket credentials stored at `path`
pub fn load_credentials(path: &Path) -> Result<Credentials, CredentialsError> {
    tracing::debug!("reading credentials from {:?}", path);

    let buf = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CredentialsError::FileMissing {
            path: path.to_path_buf(),
        },
        _ => CredentialsError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let file: CredentialsFile =
        serde_json::from_slice(&buf).map_err(|e| CredentialsError::MalformedJson {
            path: path.to_path_buf(),
            source: e,
        })?;

    let incomplete = |field| CredentialsError::IncompleteCredentials {
        path: path.to_path_buf(),
        field,
    };
    let username = file
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| incomplete("username"))?;
    let token = file
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| incomplete("token"))?;

    Ok(Credentials { username, token })
}
