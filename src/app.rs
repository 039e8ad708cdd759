// Declare modules
pub mod cli;
pub mod command;
pub mod config;
pub mod converter;
pub mod errors;
pub mod formatter;
pub mod init;
pub mod models;
pub mod paths;
pub mod reporter;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::Path;
use std::process::ExitCode;

use self::cli::{Cli, Command};
use self::config::{
    combine_options, discover_config_file, load_config, read_config_value, resolve_config,
    user_config_dir, validate_config, ConfigLocation,
};
use self::converter::convert_all;
use self::errors::AppError;
use self::init::{init_config, InitRequest, LinePrompter};
use self::models::{ProcessingOptions, RawCliOptions};

/// Parses arguments, dispatches the subcommand and maps the outcome to an exit code.
pub async fn run() -> ExitCode {
    // Parse Args
    let args = Cli::parse();
    init_logging(args.quiet);

    match dispatch(args).await {
        Ok(code) => code,
        Err(err) => match err.downcast_ref::<AppError>() {
            Some(AppError::UserCancelled) => {
                eprintln!("Init cancelled");
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("❌ Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// `quiet` from a config file is only known after the logger is installed,
/// so it lowers the level afterwards. An explicit `RUST_LOG` still wins.
fn resolved_log_level(options: &ProcessingOptions, rust_log_set: bool) -> Option<log::LevelFilter> {
    (options.quiet && !rust_log_set).then_some(log::LevelFilter::Error)
}

async fn dispatch(args: Cli) -> Result<ExitCode> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;

    match &args.command {
        Some(Command::Init(init_args)) => {
            let request = InitRequest {
                yes: init_args.yes,
                force: init_args.force,
            };
            init(&current_dir, &request)
        }
        Some(Command::ConfigShow { config_file }) => Ok(show_config(config_file.as_deref(), &current_dir)),
        Some(Command::ConfigValidate { config_file }) => {
            Ok(check_config(config_file.as_deref(), &current_dir))
        }
        None => convert(&args, &current_dir).await,
    }
}

async fn convert(args: &Cli, current_dir: &Path) -> Result<ExitCode> {
    let raw = args.raw_options()?;
    let pattern = args
        .input
        .as_deref()
        .ok_or_else(|| AppError::InvalidOptions("missing required argument <INPUT>".into()))?;

    let options = resolve_config(&raw, current_dir)?;
    log::debug!("Resolved options: {:?}", options);
    if let Some(level) = resolved_log_level(&options, env::var_os("RUST_LOG").is_some()) {
        log::set_max_level(level);
    }

    let report = convert_all(pattern, &options, &raw).await?;
    reporter::print_report(&report, &options)?;

    Ok(reporter::exit_code(&report))
}

fn init(current_dir: &Path, request: &InitRequest) -> Result<ExitCode> {
    let mut prompter = LinePrompter::stdio();

    match init_config(current_dir, request, &mut prompter)? {
        Some(path) => {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            println!("✔ Created {}", name);
            println!("Next steps:\n  {} \"src/**/*.mmd\"", command::PROGRAM_NAME);
        }
        None => eprintln!("Init cancelled"),
    }
    Ok(ExitCode::SUCCESS)
}

fn show_config(config_file: Option<&Path>, current_dir: &Path) -> ExitCode {
    let user_dir = user_config_dir();

    let shown = load_config(config_file, current_dir, user_dir.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|loaded| {
            if let Some(source) = &loaded.source {
                log::debug!("Showing config from {}", source.display());
            }
            let merged = combine_options(&RawCliOptions::default(), &loaded.options);
            Ok(serde_json::to_string_pretty(&merged)?)
        });

    match shown {
        Ok(json) => {
            println!("✅ Current configuration:");
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("❌ Error loading config: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn check_config(config_file: Option<&Path>, current_dir: &Path) -> ExitCode {
    let location = match config_file {
        Some(path) => ConfigLocation::explicit(path),
        None => {
            let user_dir = user_config_dir();
            match discover_config_file(current_dir, user_dir.as_deref()) {
                Some(location) => location,
                None => {
                    println!("✅ No config file found; defaults will be used.");
                    return ExitCode::SUCCESS;
                }
            }
        }
    };

    let value = match read_config_value(&location) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("❌ Error loading config: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match validate_config(&value) {
        Ok(_) => {
            println!("✅ Config looks good!");
            ExitCode::SUCCESS
        }
        Err(issues) => {
            eprintln!("❌ Invalid config:");
            for issue in issues {
                eprintln!("  - {}", issue);
            }
            ExitCode::FAILURE
        }
    }
}
