//! # Bitbucket Api
//!
//! A small async client for the two Bitbucket Cloud endpoints needed to
//! provision a repository:
//!
//! * `POST /repositories/{workspace}/{repo_slug}`
//! * `PUT /repositories/{workspace}/{repo_slug}/permissions-config/groups/{group_slug}`

mod types;

pub use reqwest::StatusCode;
pub use types::*;

use reqwest::{Client, Method, RequestBuilder, Response};
use thiserror::Error;
use tracing::instrument;

/// Public Bitbucket Cloud api root
pub const DEFAULT_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Client scoped to one bitbucket workspace
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    client: Client,
    api_url: String,
    workspace: String,
    credentials: Credentials,
}

impl BitbucketClient {
    /// Create a client for `workspace`. `api_url` is usually [`DEFAULT_API_URL`]
    pub fn new(
        api_url: impl Into<String>,
        workspace: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("bitbucket-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            workspace: workspace.into(),
            credentials,
        })
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/repositories/{}/{}", self.api_url, self.workspace, path);
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.token))
    }

    /// Create repository `slug` and return its web link
    #[instrument(skip(self, body), fields(workspace = %self.workspace))]
    pub async fn create_repository(
        &self,
        slug: &str,
        body: &CreateRepository,
    ) -> Result<Link, ApiError> {
        let res = self.request(Method::POST, slug).json(body).send().await?;
        let res = check_status(res).await?;

        let repo: types::Repository = res.json().await?;
        tracing::debug!(?repo);
        repo.links.html.ok_or_else(|| {
            tracing::error!("repository response has no html link");
            ApiError::MissingUrl
        })
    }

    /// Set the permission `group` holds on repository `slug`. Returns the
    /// response status
    #[instrument(skip(self), fields(workspace = %self.workspace))]
    pub async fn set_group_permission(
        &self,
        slug: &str,
        group: &str,
        permission: Permission,
    ) -> Result<StatusCode, ApiError> {
        let path = format!("{slug}/permissions-config/groups/{group}");
        let res = self
            .request(Method::PUT, &path)
            .json(&PermissionUpdate { permission })
            .send()
            .await?;
        let res = check_status(res).await?;

        Ok(res.status())
    }
}

/// Turn non 2xx responses into [`ApiError::Remote`], using the bitbucket
/// error message when the body has one
async fn check_status(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    tracing::debug!(%status, body = %body);
    let message = serde_json::from_str::<types::ErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    tracing::warn!("bitbucket returned {}: {}", status, message);

    Err(ApiError::Remote { status, message })
}

/// Error talking to bitbucket
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message} ({status})")]
    Remote { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response did not contain a repository link")]
    MissingUrl,
}
