use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
};

use tracing::instrument;

use crate::error::WorkspaceError;

/// The version control operations needed to turn a template into a workspace
pub trait Vcs {
    /// name of the metadata directory a clone leaves behind
    fn metadata_dir(&self) -> &str;
    /// clone only the latest revision of `source` into `dest`
    fn shallow_clone(&self, source: &str, dest: &Path) -> Result<(), WorkspaceError>;
    /// create an empty repository in `dir`
    fn init(&self, dir: &Path) -> Result<(), WorkspaceError>;
    /// register `url` as remote `name` of the repository in `dir`
    fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<(), WorkspaceError>;
}

/// [`Vcs`] backed by the `git` binary on `PATH`
#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    fn command(&self, dir: Option<&Path>) -> Command {
        let mut cmd = Command::new("git");
        cmd.env("GIT_TERMINAL_PROMPT", "0").stdin(Stdio::null());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn run(&self, step: &'static str, mut cmd: Command) -> Result<(), WorkspaceError> {
        tracing::debug!(?cmd);
        let status = cmd
            .status()
            .map_err(|source| WorkspaceError::Spawn { step, source })?;
        tracing::debug!("git exited with exit code {:?}", status.code());
        if !status.success() {
            tracing::error!("git failed to {}", step);
            return Err(WorkspaceError::Failed {
                step,
                code: status.code(),
            });
        }

        Ok(())
    }
}

impl Vcs for GitCli {
    fn metadata_dir(&self) -> &str {
        ".git"
    }

    fn shallow_clone(&self, source: &str, dest: &Path) -> Result<(), WorkspaceError> {
        let mut cmd = self.command(None);
        cmd.args(["clone", "--depth", "1", "--"]).arg(source).arg(dest);
        self.run("clone the template", cmd)
    }

    fn init(&self, dir: &Path) -> Result<(), WorkspaceError> {
        let mut cmd = self.command(Some(dir));
        cmd.args(["init", "--quiet"]);
        self.run("initialize the repository", cmd)
    }

    fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<(), WorkspaceError> {
        let mut cmd = self.command(Some(dir));
        cmd.args(["remote", "add", "--", name, url]);
        self.run("add the remote", cmd)
    }
}

/// Clone `template_url` into `dir`, drop its history, start a new
/// repository there and point `origin` at `remote_url`.
///
/// Nothing is rolled back when a step fails; `dir` is left as it is.
#[instrument(skip(vcs))]
pub fn init_workspace<V: Vcs>(
    vcs: &V,
    template_url: &str,
    dir: &Path,
    remote_url: &str,
) -> Result<(), WorkspaceError> {
    tracing::info!("cloning template into {:?}", dir);
    vcs.shallow_clone(template_url, dir)?;

    let metadata = dir.join(vcs.metadata_dir());
    tracing::debug!("removing {:?}", metadata);
    fs::remove_dir_all(&metadata).map_err(|source| WorkspaceError::Io {
        step: "remove the template history",
        path: metadata.clone(),
        source,
    })?;

    vcs.init(dir)?;
    vcs.add_remote(dir, "origin", remote_url)?;

    tracing::info!("workspace ready, origin is {}", remote_url);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, path::PathBuf};

    use tempfile::TempDir;

    use super::*;

    /// Records calls and fakes a clone by writing `files` into the destination
    #[derive(Debug, Default)]
    pub(crate) struct RecordingVcs {
        pub files: Vec<(&'static str, String)>,
        pub fail_on: Option<&'static str>,
        pub calls: RefCell<Vec<String>>,
    }

    impl RecordingVcs {
        pub fn with_file(mut self, name: &'static str, contents: impl Into<String>) -> Self {
            self.files.push((name, contents.into()));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn record(&self, step: &'static str, call: String) -> Result<(), WorkspaceError> {
            self.calls.borrow_mut().push(call);
            if self.fail_on == Some(step) {
                return Err(WorkspaceError::Failed {
                    step,
                    code: Some(128),
                });
            }
            Ok(())
        }
    }

    impl Vcs for RecordingVcs {
        fn metadata_dir(&self) -> &str {
            ".git"
        }

        fn shallow_clone(&self, source: &str, dest: &Path) -> Result<(), WorkspaceError> {
            self.record("clone", format!("clone {source} {}", dest.display()))?;
            fs::create_dir_all(dest.join(".git/objects")).unwrap();
            fs::write(dest.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
            for (name, contents) in &self.files {
                fs::write(dest.join(name), contents).unwrap();
            }
            Ok(())
        }

        fn init(&self, dir: &Path) -> Result<(), WorkspaceError> {
            assert!(!dir.join(".git").exists(), "history was not removed");
            self.record("init", format!("init {}", dir.display()))?;
            fs::create_dir(dir.join(".git")).unwrap();
            Ok(())
        }

        fn add_remote(&self, dir: &Path, name: &str, url: &str) -> Result<(), WorkspaceError> {
            self.record("remote", format!("remote {} {name} {url}", dir.display()))
        }
    }

    #[test]
    fn steps_run_in_order() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("demo");
        let vcs = RecordingVcs::default().with_file("README.md", "# template");

        init_workspace(
            &vcs,
            "https://example.com/template.git",
            &dir,
            "https://example.com/demo",
        )
        .unwrap();

        assert_eq!(
            vcs.calls(),
            vec![
                format!("clone https://example.com/template.git {}", dir.display()),
                format!("init {}", dir.display()),
                format!("remote {} origin https://example.com/demo", dir.display()),
            ]
        );
        assert!(dir.join("README.md").exists());
        assert!(!dir.join(".git/HEAD").exists());
    }

    #[test]
    fn failed_clone_stops_early() {
        let root = TempDir::new().unwrap();
        let vcs = RecordingVcs {
            fail_on: Some("clone"),
            ..Default::default()
        };

        let err = init_workspace(&vcs, "t", &root.path().join("demo"), "r").unwrap_err();
        assert!(matches!(err, WorkspaceError::Failed { step: "clone", .. }));
        assert_eq!(vcs.calls().len(), 1);
    }

    #[test]
    fn failed_remote_leaves_directory_behind() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("demo");
        let vcs = RecordingVcs {
            fail_on: Some("remote"),
            ..Default::default()
        }
        .with_file("package.json", "{}");

        assert!(init_workspace(&vcs, "t", &dir, "r").is_err());
        assert!(dir.join("package.json").exists());
        assert!(dir.join(".git").exists());
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=figdata", "-c", "user.email=figdata@example.com"])
            .args(args)
            .current_dir(dir)
            .stdout(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?}");
    }

    #[test]
    fn git_cli_builds_fresh_workspace_from_local_template() {
        if Command::new("git").arg("--version").output().is_err() {
            eprintln!("git not installed, skipping");
            return;
        }

        let root = TempDir::new().unwrap();
        let template = root.path().join("template");
        fs::create_dir(&template).unwrap();
        git(&template, &["init", "--quiet"]);
        fs::write(template.join("package.json"), r#"{ "name": "old" }"#).unwrap();
        git(&template, &["add", "."]);
        git(&template, &["commit", "--quiet", "-m", "template"]);

        let dir: PathBuf = root.path().join("demo");
        let template_url = format!("file://{}", template.display());
        init_workspace(&GitCli, &template_url, &dir, "https://bitbucket.org/figdata/demo")
            .unwrap();

        assert!(dir.join("package.json").exists());
        let remote = Command::new("git")
            .args(["remote", "get-url", "origin"])
            .current_dir(&dir)
            .output()
            .unwrap();
        assert_eq!(
            String::from_utf8_lossy(&remote.stdout).trim(),
            "https://bitbucket.org/figdata/demo"
        );
        // fresh repository has no commits
        let log = Command::new("git")
            .args(["log", "--oneline"])
            .current_dir(&dir)
            .output()
            .unwrap();
        assert!(!log.status.success() || log.stdout.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn git_cli_keeps_non_utf8_destination() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        if Command::new("git").arg("--version").output().is_err() {
            return;
        }

        let root = TempDir::new().unwrap();
        let template = root.path().join("template");
        fs::create_dir(&template).unwrap();
        git(&template, &["init", "--quiet"]);
        fs::write(template.join("package.json"), "{}").unwrap();
        git(&template, &["add", "."]);
        git(&template, &["commit", "--quiet", "-m", "template"]);

        let dir = root.path().join(OsStr::from_bytes(b"demo-\xff"));
        let template_url = format!("file://{}", template.display());
        init_workspace(&GitCli, &template_url, &dir, "https://bitbucket.org/figdata/demo")
            .unwrap();

        assert!(dir.join("package.json").exists());
        assert!(!root.path().join("demo-\u{fffd}").exists());
    }

    #[test]
    fn git_cli_reports_failed_clone() {
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }

        let root = TempDir::new().unwrap();
        let missing = format!("file://{}", root.path().join("missing").display());
        let err = GitCli
            .shallow_clone(&missing, &root.path().join("demo"))
            .unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::Failed {
                step: "clone the template",
                ..
            }
        ));
    }
}
