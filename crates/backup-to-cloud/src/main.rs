//! # backup-to-cloud
//! Uploads backups to Google Drive. Meant to be run by a task scheduler such as cron.
//!

use std::{fs, process::ExitCode};

use backup_to_cloud::{
    backup::{check_settings, create_backup},
    config::Config,
    discovery::list_files,
    remote::{GoogleDrive, authorize},
    settings::Settings,
};
use clap::Parser;
use cli::{Cli, Command};
use mimalloc::MiMalloc;
use regex::RegexBuilder;
use shared::{Failure, init_logger};
use tracing::{error, info, warn};

mod cli;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::new(cli.root_path, cli.credentials_path) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("Invalid settings: {error}");
            return ExitCode::FAILURE;
        }
    };

    let _logger = match init_logger(&settings.log_directory()) {
        Ok(logger) => logger,
        Err(error) => {
            eprintln!("Could not initialize logger: {error}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::CreateBackup => {
            let config = Config::load_toml(&settings.config_path())
                .or_log_and_panic("Could not load config");
            let drive = GoogleDrive::new(settings.token_path())
                .or_log_and_panic("Could not create Google Drive client");

            // Errors are logged with their entry by the backup.
            let Ok(uploaded) = create_backup(&config, &drive) else {
                return ExitCode::FAILURE;
            };

            info!("Backup complete, {} file(s) uploaded", uploaded.len());
        }

        Command::CheckSettings => {
            let config = match Config::load_toml(&settings.config_path()) {
                Ok(config) => config,
                Err(error) => {
                    error!("Could not load config: {error}");
                    return ExitCode::FAILURE;
                }
            };

            let Ok(payload_count) = check_settings(&config) else {
                return ExitCode::FAILURE;
            };

            info!("settings ok ({payload_count} file(s) would be uploaded)");
        }

        Command::CheckRegex { path, regex } => {
            let filter = match RegexBuilder::new(&regex).case_insensitive(true).build() {
                Ok(filter) => filter,
                Err(error) => {
                    error!("Invalid regex: {error}");
                    return ExitCode::FAILURE;
                }
            };

            for file in list_files(&path, &filter) {
                println!("{}", file.display());
            }
        }

        Command::GenToken => {
            if let Err(error) = authorize(&settings.credentials_path, &settings.token_path()) {
                error!("Could not generate token: {error}");
                return ExitCode::FAILURE;
            }
        }

        Command::Init => {
            let config_path = settings.config_path();
            if config_path.exists() {
                warn!("{config_path:?} already exists");
                return ExitCode::FAILURE;
            }

            let contents = Config::example().or_log_and_panic("Could not serialize config file");
            fs::write(&config_path, contents).or_log_and_panic("Could not create config file");

            info!("Created {config_path:?}");
        }
    }

    ExitCode::SUCCESS
}
