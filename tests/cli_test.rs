use camino::Utf8PathBuf;
use clap::Parser;
use stackops::cli::{Cli, Cloud, Commands, LogLevel};

#[test]
fn backup_subcommand_parses_defaults() {
    let cli = Cli::parse_from(["stackops", "backup", "--cloud", "aws"]);

    match cli.command {
        Commands::Backup(opts) => {
            assert_eq!(opts.file, Utf8PathBuf::from("profile.yaml"));
            assert_eq!(opts.cloud, Cloud::Aws);
            assert_eq!(opts.log_level, LogLevel::Info);
            assert!(!opts.dry_run);
        }
        other => panic!("expected backup subcommand, got {:?}", other),
    }
}

#[test]
fn restore_subcommand_parses_explicit_options() {
    let cli = Cli::parse_from([
        "stackops",
        "restore",
        "--file",
        "deploy/profile.yaml",
        "--cloud",
        "gcp",
        "--log-level",
        "debug",
        "--dry-run",
    ]);

    match cli.command {
        Commands::Restore(opts) => {
            assert_eq!(opts.file, Utf8PathBuf::from("deploy/profile.yaml"));
            assert_eq!(opts.cloud, Cloud::Gcp);
            assert_eq!(opts.log_level, LogLevel::Debug);
            assert!(opts.dry_run);
        }
        other => panic!("expected restore subcommand, got {:?}", other),
    }
}

#[test]
fn backup_restore_subcommand_parses() {
    let cli = Cli::parse_from(["stackops", "backup-restore", "--cloud", "aws", "--dry-run"]);

    match cli.command {
        Commands::BackupRestore(opts) => {
            assert_eq!(opts.cloud, Cloud::Aws);
            assert!(opts.dry_run);
        }
        other => panic!("expected backup-restore subcommand, got {:?}", other),
    }
}

#[test]
fn validate_subcommand_parses() {
    let cli = Cli::parse_from(["stackops", "validate", "--file", "profile.yaml"]);

    match cli.command {
        Commands::Validate(opts) => {
            assert_eq!(opts.file, Utf8PathBuf::from("profile.yaml"));
            assert_eq!(opts.log_level, LogLevel::Info);
        }
        other => panic!("expected validate subcommand, got {:?}", other),
    }
}

#[test]
fn operation_subcommands_require_cloud() {
    for subcommand in ["backup", "restore", "backup-restore"] {
        let result = Cli::try_parse_from(["stackops", subcommand]);
        assert!(result.is_err(), "{} parsed without --cloud", subcommand);
    }
}

#[test]
fn unknown_cloud_is_rejected() {
    let result = Cli::try_parse_from(["stackops", "backup", "--cloud", "azure"]);
    assert!(result.is_err());
}

#[test]
fn cloud_displays_lowercase() {
    assert_eq!(Cloud::Aws.to_string(), "aws");
    assert_eq!(Cloud::Gcp.to_string(), "gcp");
}
