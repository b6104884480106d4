pub mod cli;
pub mod config;
pub mod engine;
pub mod executor;
pub mod ops;
pub mod verify;
pub mod workflow;

mod error;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

pub use crate::error::StackopsError;
use crate::executor::CommandExecutor;

pub fn init_logging(log_level: cli::LogLevel) -> Result<()> {
    let filter = match log_level {
        cli::LogLevel::Trace => LevelFilter::TRACE,
        cli::LogLevel::Debug => LevelFilter::DEBUG,
        cli::LogLevel::Info => LevelFilter::INFO,
        cli::LogLevel::Warn => LevelFilter::WARN,
        cli::LogLevel::Error => LevelFilter::ERROR,
    };

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(filter).finish(),
    )
    .context("failed to set global default tracing subscriber")
}

pub fn run_backup(opts: &cli::OperationArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let profile = config::load_profile(opts.file.as_path())
        .with_context(|| format!("failed to load profile from {}", opts.file))?;

    let report = workflow::run_backup(&profile, opts.cloud, executor, opts.dry_run)?;

    if !opts.dry_run {
        info!("backup object name: {}", report.backup_object_name);
    }
    Ok(())
}

pub fn run_restore(opts: &cli::OperationArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let profile = config::load_profile(opts.file.as_path())
        .with_context(|| format!("failed to load profile from {}", opts.file))?;

    workflow::run_restore(&profile, opts.cloud, executor, None)?;
    Ok(())
}

pub fn run_backup_restore(
    opts: &cli::OperationArgs,
    executor: Arc<dyn CommandExecutor>,
) -> Result<()> {
    let profile = config::load_profile(opts.file.as_path())
        .with_context(|| format!("failed to load profile from {}", opts.file))?;

    let (backup, _restore) =
        workflow::run_backup_restore(&profile, opts.cloud, executor, opts.dry_run)?;

    if !opts.dry_run {
        info!("restored from backup object: {}", backup.backup_object_name);
    }
    Ok(())
}

pub fn run_validate(opts: &cli::ValidateArgs) -> Result<()> {
    let profile = config::load_profile(opts.file.as_path())?;
    profile.validate().context("profile validation failed")?;
    info!("validation successful:\n{:#?}", profile);
    Ok(())
}
