use std::{fmt, str::FromStr};

use dialoguer::{theme::ColorfulTheme, Input};

use crate::error::ScaffoldError;

/// bitbucket refuses longer repository slugs
const MAX_LEN: usize = 62;

/// Name of the new project. It is the repository slug, the workspace
/// directory and the manifest identifier all at once, so it is limited to
/// characters that are safe in urls, paths and git remotes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProjectName {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ScaffoldError::InvalidProjectName {
            name: s.to_string(),
            reason,
        };

        if s.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if s.len() > MAX_LEN {
            return Err(invalid("name must be at most 62 characters"));
        }
        if s.starts_with(['.', '-']) {
            return Err(invalid("name must not start with '.' or '-'"));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                "only ascii letters, digits, '-', '_' and '.' are allowed",
            ));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ask until a valid name is typed in
pub fn prompt_project_name() -> color_eyre::Result<ProjectName> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("project name")
        .validate_with(|input: &String| -> Result<(), String> {
            ProjectName::from_str(input.trim())
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;

    Ok(name.trim().parse()?)
}
