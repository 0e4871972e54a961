//! Command-line interface

use clap::{ArgAction, Parser};

/// Network Speed Reporter - runs a speed test and writes a connection report
#[derive(Parser, Debug, Clone)]
#[command(name = "nsr")]
#[command(version, about, long_about = None)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (", env!("GIT_COMMIT"), ", built ", env!("BUILD_TIME"), " for ", env!("TARGET_TRIPLE"), ")"
))]
pub struct Cli {
    /// How the connection is used, e.g. "gaming" or "video calls"
    #[arg(short, long)]
    pub context: Option<String>,

    /// Measurement tool to run (overrides SPEEDTEST_COMMAND)
    #[arg(long, value_name = "PROG")]
    pub command: Option<String>,

    /// Argument for the measurement tool; repeat for several (overrides SPEEDTEST_ARGS)
    #[arg(long = "arg", value_name = "ARG", action = ArgAction::Append, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Measurement deadline in seconds
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Print the JSON response instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// List supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line Overrides:\n");
        if let Some(ref command) = self.command {
            summary.push_str(&format!("  Command: {}\n", command));
        }
        if !self.args.is_empty() {
            summary.push_str(&format!("  Arguments: {}\n", self.args.join(" ")));
        }
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        if let Some(ref context) = self.context {
            summary.push_str(&format!("  Context: {}\n", context));
        }
        summary.push_str(&format!("  JSON output: {}\n", self.json));
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Parse a deadline in whole seconds
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_TIMEOUT_SECS {
                Err(format!(
                    "Duration cannot exceed {} seconds",
                    crate::defaults::MAX_TIMEOUT_SECS
                ))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["nsr"]);
        assert!(cli.context.is_none());
        assert!(cli.command.is_none());
        assert!(cli.args.is_empty());
        assert!(cli.timeout.is_none());
        assert!(!cli.json);
        assert!(!cli.verbose);
        assert!(!cli.debug);
        assert!(!cli.env_help);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "nsr",
            "--context", "Working from home with video calls",
            "--command", "/opt/speedtest/bin/speedtest",
            "--arg", "--json",
            "--arg", "--secure",
            "--timeout", "45",
            "--json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.context.as_deref(), Some("Working from home with video calls"));
        assert_eq!(cli.command.as_deref(), Some("/opt/speedtest/bin/speedtest"));
        assert_eq!(cli.args, vec!["--json", "--secure"]);
        assert_eq!(cli.timeout, Some(45));
        assert!(cli.json);
        assert!(cli.no_color);
        assert!(!cli.use_colors());
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration("1").unwrap(), 1);
        assert_eq!(parse_duration("600").unwrap(), 600);

        assert!(parse_duration("0").is_err());
        assert!(parse_duration("601").is_err());
        assert!(parse_duration("+5").is_err());
        assert!(parse_duration("0x10").is_err());
        assert!(parse_duration("ten").is_err());
    }

    #[test]
    fn test_invalid_timeout_rejected_by_clap() {
        assert!(Cli::try_parse_from(["nsr", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(["nsr", "--command", "fake-speedtest", "--timeout", "5"]);
        let summary = cli.get_config_summary();

        assert!(summary.contains("Command: fake-speedtest"));
        assert!(summary.contains("Timeout: 5s"));
        assert!(!summary.contains("Arguments:"));
    }
}
