use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{
    config::ScaffoldConfig,
    error::ScaffoldError,
    manifest::customize_manifest,
    project::ProjectName,
    provision::{
        connect, grant_group_permission, parse_permission, provision_repository, Repository,
    },
    workspace::{init_workspace, Vcs},
};

/// Optional steps of a run
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    /// grant the admin group this permission after creating the repository
    pub grant_permission: Option<String>,
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct Scaffolded {
    pub repository: Repository,
    pub workspace_dir: PathBuf,
    pub manifest: Value,
}

/// Create the repository, then the workspace under `root`, then customize
/// its manifest. Options are checked before anything is created and nothing
/// touches the filesystem until the repository exists
pub async fn scaffold<V: Vcs>(
    config: &ScaffoldConfig,
    root: &Path,
    name: &ProjectName,
    vcs: &V,
    options: &ScaffoldOptions,
) -> Result<Scaffolded, ScaffoldError> {
    if let Some(permission) = &options.grant_permission {
        parse_permission(permission)?;
    }

    let client = connect(config)?;
    let repository = provision_repository(&client, config, name).await?;

    if let Some(permission) = &options.grant_permission {
        grant_group_permission(&client, name.as_str(), &config.admin_group, permission).await?;
    }

    let workspace_dir = root.join(name.as_str());
    init_workspace(vcs, &config.template_url, &workspace_dir, &repository.url)?;

    let manifest = customize_manifest(&workspace_dir.join(&config.manifest_file), name)?;

    tracing::info!("project {} ready in {:?}", name, workspace_dir);
    Ok(Scaffolded {
        repository,
        workspace_dir,
        manifest,
    })
}
