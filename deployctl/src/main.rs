//! deployctl - Entry Point
//!
//! Submits a deploy request built from command line fields (or an
//! interactive form) and polls the deploy service until the build result is
//! available.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use deployctl::app::options::AppOptions;
use deployctl::app::run::{build_client, check_health, run_interactive, run_once};
use deployctl::config::settings::load_settings;
use deployctl::controller::fsm::AttemptState;
use deployctl::errors::ClientError;
use deployctl::filesys::file::File;
use deployctl::form::fields::{FormFields, FIELD_NAMES};
use deployctl::logs::{init_logging, LogLevel};
use deployctl::present::console::ConsolePresenter;
use deployctl::utils::version_info;

use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode version info: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    if cli_args.contains_key("help") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    // Load settings and apply command line overrides
    let settings_file = cli_args.get("config").map(File::new);
    let mut settings = match load_settings(settings_file.as_ref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(base_url) = cli_args.get("base-url") {
        settings.backend.base_url = base_url.clone();
    }
    if let Some(level) = cli_args.get("log-level") {
        match level.parse::<LogLevel>() {
            Ok(level) => settings.log_level = level,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
    let options = AppOptions::from_settings(&settings);

    // Initialize logging; the guard flushes file output on exit
    let _log_guard = match init_logging(options.log.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    if cli_args.contains_key("health") {
        return match check_health(&options).await {
            Ok(health) => {
                match serde_json::to_string_pretty(&health) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Failed to encode health status: {e}"),
                }
                if health.ok {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(e) => {
                error!("Health check failed: {e}");
                eprintln!("Health check failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let fields = match collect_fields(&cli_args).await {
        Ok(fields) => fields,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match build_client(&options) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Unable to create HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let presenter = Arc::new(ConsolePresenter::new());

    info!("Running deployctl against {}", options.backend_base_url);
    let result = if cli_args.contains_key("interactive") {
        let input = BufReader::new(tokio::io::stdin());
        run_interactive(
            client,
            presenter,
            &options,
            fields,
            input,
            await_shutdown_signal(),
        )
        .await
    } else {
        run_once(client, presenter, &options, &fields, await_shutdown_signal()).await
    };

    match result {
        Ok(AttemptState::Error) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("deployctl failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Start from `--fields=<file>` if given, then apply per-field flags
async fn collect_fields(cli_args: &HashMap<String, String>) -> Result<FormFields, ClientError> {
    let mut fields = match cli_args.get("fields") {
        Some(path) => File::new(path).read_json::<FormFields>().await?,
        None => FormFields::default(),
    };

    for name in FIELD_NAMES {
        let flag = name.replace('_', "-");
        if let Some(value) = cli_args.get(&flag).or_else(|| cli_args.get(name)) {
            fields.set(name, value)?;
        }
    }
    if let Some(value) = cli_args.get("wait") {
        fields.set("wait_for_result", value)?;
    }

    Ok(fields)
}

fn print_usage() {
    println!("Usage: deployctl [OPTIONS]");
    println!();
    println!("  --email=<email> --secret=<secret> --task=<task> --round=<n>");
    println!("  --brief=<text> --checks=<json> --attachments=<json>");
    println!("  --evaluation-url=<url> --wait     form fields");
    println!("  --fields=<file>                   load form fields from a JSON file");
    println!("  --interactive                     read commands from stdin");
    println!("  --config=<file>                   settings file");
    println!("  --base-url=<url>                  deploy service base URL");
    println!("  --log-level=<level>               trace, debug, info, warn, error");
    println!("  --health                          check the deploy service and exit");
    println!("  --version                         print version info and exit");
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, shutting down...");
                    }
                    _ = sigint.recv() => {
                        info!("SIGINT received, shutting down...");
                    }
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
