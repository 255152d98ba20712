//! Request and response bodies of the Bitbucket Cloud [repositories api](https://developer.atlassian.com/cloud/bitbucket/rest/api-group-repositories/).
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Account used for basic authentication. `token` is an app password
/// or an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

/// Body of `POST /repositories/{workspace}/{repo_slug}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRepository {
    pub scm: String,
    pub is_private: bool,
    pub project: ProjectKey,
}

impl CreateRepository {
    /// private git repository inside `project_key`
    pub fn private_git(project_key: impl Into<String>) -> Self {
        Self {
            scm: "git".to_string(),
            is_private: true,
            project: ProjectKey {
                key: project_key.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectKey {
    pub key: String,
}

/// The parts of a repository response we care about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Repository {
    #[serde(default)]
    pub links: RepositoryLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct RepositoryLinks {
    #[serde(default)]
    pub html: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Permission level a group can hold on a repository
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Permission {
    Read,
    Write,
    Admin,
}

/// Body of `PUT .../permissions-config/groups/{group_slug}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionUpdate {
    pub permission: Permission,
}

/// Error document bitbucket returns on 4xx and 5xx
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}
