mod config;
mod credentials;
mod error;
mod manifest;
mod project;
mod provision;
mod scaffold;
mod workspace;

use std::{env, fs::OpenOptions, io, process::ExitCode, sync::Mutex};

use config::{AppArgs, ScaffoldConfig, DEFAULT_DIR};
use error::ScaffoldError;
use scaffold::{scaffold, ScaffoldOptions};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, prelude::*};
use workspace::GitCli;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv().map_err(|_| {
        tracing::debug!("no '.env' file found");
    });
    let args: AppArgs = argh::from_env();

    if args.version {
        println!("figdata-new version: {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let log_writer = match &args.log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => BoxMakeWriter::new(io::stderr),
    };
    tracing_subscriber::registry()
        .with(
            args.log_level
                .as_deref()
                .map(Into::into)
                .unwrap_or_else(|| {
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "figdata_new=INFO,bitbucket_api=INFO".into())
                }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(log_writer))
        .init();

    if args.dir != DEFAULT_DIR {
        tracing::warn!(
            "--dir {} is ignored, the workspace is named after the project",
            args.dir
        );
    }

    let name = match args.name.as_deref() {
        Some(name) => name.parse::<project::ProjectName>(),
        None => Ok(project::prompt_project_name()?),
    };
    let res = match name {
        Ok(name) => run(&args, &name).await,
        Err(e) => Err(e),
    };

    match res {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.diagnostic());
            Ok(ExitCode::from(1))
        }
    }
}

async fn run(args: &AppArgs, name: &project::ProjectName) -> Result<(), ScaffoldError> {
    let config = ScaffoldConfig::load(args.config.as_deref())?;
    tracing::debug!(?config);

    let root = env::current_dir().map_err(|e| ScaffoldError::Config {
        path: ".".into(),
        reason: e.to_string(),
    })?;
    let options = ScaffoldOptions {
        grant_permission: args.grant_permission.clone(),
    };

    let done = scaffold(&config, &root, name, &GitCli, &options).await?;
    tracing::debug!(manifest = %done.manifest);
    println!(
        "created {} at {}\nworkspace: {}",
        name,
        done.repository.url,
        done.workspace_dir.display()
    );

    Ok(())
}
