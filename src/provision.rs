use std::str::FromStr;

use bitbucket_api::{BitbucketClient, CreateRepository, Permission, StatusCode};
use tracing::instrument;

use crate::{
    config::ScaffoldConfig, credentials::load_credentials, error::ScaffoldError,
    project::ProjectName,
};

/// The repository that was created, its web url becomes the origin remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub url: String,
}

/// Load the credentials and build a client for the configured workspace
pub fn connect(config: &ScaffoldConfig) -> Result<BitbucketClient, ScaffoldError> {
    let credentials = load_credentials(&config.credentials_path)?;
    tracing::debug!("authenticating as {}", credentials.username);

    BitbucketClient::new(&config.api_url, &config.workspace, credentials)
        .map_err(ScaffoldError::Client)
}

/// Create a private git repository called `name` in the configured project
#[instrument(skip_all, fields(name = %name))]
pub async fn provision_repository(
    client: &BitbucketClient,
    config: &ScaffoldConfig,
    name: &ProjectName,
) -> Result<Repository, ScaffoldError> {
    tracing::info!(
        "creating repository {}/{} in project {}",
        client.workspace(),
        name,
        config.project_key
    );

    let link = client
        .create_repository(
            name.as_str(),
            &CreateRepository::private_git(&config.project_key),
        )
        .await
        .map_err(|source| ScaffoldError::RemoteCreationFailed {
            name: name.to_string(),
            source,
        })?;

    tracing::info!("created repository at {}", link.href);
    Ok(Repository { url: link.href })
}

/// Parse a permission level: read, write or admin in any case
pub fn parse_permission(permission: &str) -> Result<Permission, ScaffoldError> {
    Permission::from_str(permission)
        .map_err(|_| ScaffoldError::InvalidPermission(permission.to_string()))
}

/// Grant `group` access to repository `name`.
///
/// `permission` must be one of read, write or admin (any case), but the
/// request always asks for admin.
#[instrument(skip(client))]
pub async fn grant_group_permission(
    client: &BitbucketClient,
    name: &str,
    group: &str,
    permission: &str,
) -> Result<StatusCode, ScaffoldError> {
    let requested = parse_permission(permission)?;
    if requested != Permission::Admin {
        tracing::warn!("{} requested but {} is always granted admin", requested, group);
    }

    let status = client
        .set_group_permission(name, group, Permission::Admin)
        .await
        .map_err(|source| ScaffoldError::PermissionUpdateFailed {
            name: name.to_string(),
            group: group.to_string(),
            source,
        })?;

    tracing::info!("granted {} admin on {} ({})", group, name, status);
    Ok(status)
}
