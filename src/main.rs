//! Network Speed Reporter - Main CLI Application
//!
//! Runs one speed test, prints the normalized metrics with an analysis report
//! (or the JSON response with `--json`) and exits with a code reflecting the
//! failure kind.

use clap::Parser;
use network_speed_reporter::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    output::render_result,
    App, PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();

    if cli.env_help {
        print!("{}", EnvManager::display_env_help());
        return;
    }

    match run_application(cli.clone()).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug).report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic; returns the process exit code
async fn run_application(cli: Cli) -> Result<i32> {
    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!("Debug mode enabled");
    }

    let config = load_config(cli.clone())?;
    let warnings = validate_config(&config)?;

    if config.debug {
        eprintln!("\nConfiguration Summary:");
        eprintln!("{}\n", display_config_summary(&config));
    }

    for warning in &warnings {
        eprintln!("{}", warning.format(config.enable_color));
    }

    let app = App::from_config(config.clone())?;

    if config.verbose && !config.json_output {
        eprintln!("Running {} (deadline {}s)...", config.invocation(), config.timeout_seconds);
    }

    let result = app.run_test(cli.context).await;
    println!("{}", render_result(&result, &config)?);

    Ok(result.exit_code())
}

/// Print helpful suggestions for startup errors
fn print_error_suggestions(error: &AppError) {
    if let AppError::Config(message) = error {
        eprintln!();
        eprintln!("Configuration help:");
        if message.contains("GEMINI_API_KEY") {
            eprintln!("  - Set GEMINI_API_KEY in the environment or in a .env file");
        }
        eprintln!("  - Check your .env file format");
        eprintln!("  - Run 'nsr --env-help' to list supported variables and ranges");
    }
}
