use std::process;
use std::sync::Arc;

use anyhow::Result;
use tracing::error;

use stackops::executor::RealCommandExecutor;
use stackops::{cli, init_logging, run_backup, run_backup_restore, run_restore, run_validate};

fn main() -> Result<()> {
    let args = cli::parse_args()?;

    let log_level = match &args.command {
        cli::Commands::Backup(opts)
        | cli::Commands::Restore(opts)
        | cli::Commands::BackupRestore(opts) => opts.log_level,
        cli::Commands::Validate(opts) => opts.log_level,
        cli::Commands::Completions(opts) => {
            cli::generate_completions(opts.shell);
            return Ok(());
        }
    };

    init_logging(log_level)?;

    let result = match &args.command {
        cli::Commands::Backup(opts) => {
            let executor = Arc::new(RealCommandExecutor { dry_run: opts.dry_run });
            run_backup(opts, executor)
        }
        cli::Commands::Restore(opts) => {
            let executor = Arc::new(RealCommandExecutor { dry_run: opts.dry_run });
            run_restore(opts, executor)
        }
        cli::Commands::BackupRestore(opts) => {
            let executor = Arc::new(RealCommandExecutor { dry_run: opts.dry_run });
            run_backup_restore(opts, executor)
        }
        cli::Commands::Validate(opts) => run_validate(opts),
        cli::Commands::Completions(_) => unreachable!("handled before logging init"),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }

    Ok(())
}
