use std::{
    fs,
    path::{Path, PathBuf},
};

use argh::FromArgs;
use bitbucket_api::DEFAULT_API_URL;
use serde::Deserialize;

use crate::error::ScaffoldError;

/// default value of `--dir`
pub const DEFAULT_DIR: &str = "figdata";

/// figdata-new: create a bitbucket repository and a local
/// workspace for a new figdata project from the template
#[derive(Debug, Clone, FromArgs)]
pub struct AppArgs {
    /// project directory (kept for compatibility, the workspace is named after the project)
    #[argh(option, short = 'd', default = "DEFAULT_DIR.to_string()")]
    pub dir: String,
    /// project name, skips the interactive prompt
    #[argh(option)]
    pub name: Option<String>,
    /// also grant the admin group access: read | write | admin
    #[argh(option)]
    pub grant_permission: Option<String>,
    /// toml file overriding the built in configuration
    #[argh(option)]
    pub config: Option<PathBuf>,
    /// configure logging example: 'figdata_new=debug,bitbucket_api=debug'
    #[argh(option)]
    pub log_level: Option<String>,
    /// file to log to (defaults to stderr)
    #[argh(option)]
    pub log_file: Option<PathBuf>,
    /// print version and exit
    #[argh(switch)]
    pub version: bool,
}

/// Where the project gets provisioned. Every field can be overridden
/// from the `--config` toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// bitbucket api root
    pub api_url: String,
    /// bitbucket workspace the repository is created in
    pub workspace: String,
    /// key of the bitbucket project the repository belongs to
    pub project_key: String,
    /// group granted access by `--grant-permission`
    pub admin_group: String,
    /// repository cloned as the starting point
    pub template_url: String,
    /// json file holding `username` and `token`
    pub credentials_path: PathBuf,
    /// manifest inside the workspace
    pub manifest_file: PathBuf,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            workspace: "figdata".to_string(),
            project_key: "FIG".to_string(),
            admin_group: "developers".to_string(),
            template_url: "https://bitbucket.org/figdata/figdata-template.git".to_string(),
            credentials_path: PathBuf::from("bitbucket.json"),
            manifest_file: PathBuf::from("package.json"),
        }
    }
}

impl ScaffoldConfig {
    /// Built in configuration, overridden by `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self, ScaffoldError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        tracing::debug!("reading config from {:?}", path);
        let buf = fs::read_to_string(path).map_err(|e| ScaffoldError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&buf).map_err(|e| ScaffoldError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let config = ScaffoldConfig::load(None).unwrap();
        assert_eq!(config, ScaffoldConfig::default());
        assert_eq!(config.api_url, "https://api.bitbucket.org/2.0");
        assert_eq!(config.manifest_file, PathBuf::from("package.json"));
    }

    #[test]
    fn config_file_overrides_some_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workspace = \"acme\"\nproject_key = \"ACME\"").unwrap();

        let config = ScaffoldConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.workspace, "acme");
        assert_eq!(config.project_key, "ACME");
        assert_eq!(config.admin_group, "developers");
    }

    #[test]
    fn bad_config_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workspace = [").unwrap();

        let err = ScaffoldConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ScaffoldError::Config { .. }));
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn dir_defaults_to_figdata() {
        let args = AppArgs::from_args(&["figdata-new"], &["--name", "demo"]).unwrap();
        assert_eq!(args.dir, "figdata");
        assert_eq!(args.name.as_deref(), Some("demo"));
        assert!(args.grant_permission.is_none());

        let args = AppArgs::from_args(&["figdata-new"], &["-d", "elsewhere"]).unwrap();
        assert_eq!(args.dir, "elsewhere");
    }
}
