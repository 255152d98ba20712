use std::{io, path::PathBuf};

use bitbucket_api::ApiError;
use thiserror::Error;

/// shape of the credentials file, repeated in every credentials diagnostic
pub const CREDENTIALS_SHAPE: &str =
    r#"{ "username": "<bitbucket username>", "token": "<app password>" }"#;

/// Any failure that ends a scaffold run
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("could not load {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error("invalid project name {name:?}: {reason}")]
    InvalidProjectName { name: String, reason: &'static str },
    #[error("invalid permission {0:?}, options: read | write | admin")]
    InvalidPermission(String),
    #[error("could not set up the http client: {0}")]
    Client(#[source] ApiError),
    #[error("could not create repository {name:?}: {source}")]
    RemoteCreationFailed {
        name: String,
        #[source]
        source: ApiError,
    },
    #[error("could not update permissions of {group:?} on {name:?}: {source}")]
    PermissionUpdateFailed {
        name: String,
        group: String,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    WorkspaceSetupFailed(#[from] WorkspaceError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl ScaffoldError {
    /// prefix of the diagnostic line printed for this error
    pub fn kind(&self) -> &'static str {
        match self {
            ScaffoldError::Config { .. } => "config",
            ScaffoldError::Credentials(_) => "credentials",
            ScaffoldError::InvalidProjectName { .. } => "project",
            ScaffoldError::InvalidPermission(_) => "permission",
            ScaffoldError::Client(_)
            | ScaffoldError::RemoteCreationFailed { .. }
            | ScaffoldError::PermissionUpdateFailed { .. } => "bitbucket",
            ScaffoldError::WorkspaceSetupFailed(_) => "workspace",
            ScaffoldError::Manifest(_) => "manifest",
        }
    }

    /// one line diagnostic: `<kind>: <message>`
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

/// Failure reading the credentials file
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("{path:?} not found, create it containing {shape}", shape = CREDENTIALS_SHAPE)]
    FileMissing { path: PathBuf },
    #[error("could not read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path:?} is not valid json ({source}), expected {shape}", shape = CREDENTIALS_SHAPE)]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path:?} is missing `{field}`, expected {shape}", shape = CREDENTIALS_SHAPE)]
    IncompleteCredentials { path: PathBuf, field: &'static str },
}

/// Failure creating the local workspace
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("could not run git to {step}: {source}")]
    Spawn {
        step: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("git failed to {step} (exit code {})", display_code(.code))]
    Failed {
        step: &'static str,
        code: Option<i32>,
    },
    #[error("could not {step} in {path:?}: {source}")]
    Io {
        step: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "<terminated by signal>".to_string())
}

/// Failure rewriting the manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{path:?} not found in the workspace")]
    ManifestMissing { path: PathBuf },
    #[error("{path:?} is malformed: {reason}")]
    ManifestMalformed { path: PathBuf, reason: String },
    #[error("could not access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
