//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the complete configuration: defaults, .env, environment, CLI
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref command) = self.cli.command {
            config.command = command.clone();
        }

        if !self.cli.args.is_empty() {
            config.command_args = self.cli.args.clone();
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if !self.cli.use_colors() {
            config.enable_color = false;
        }

        // CLI-only flags
        config.json_output = self.cli.json;
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprint!("{}", self.cli.get_config_summary());
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Measurement: {}", config.invocation()));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Max Concurrent: {}", config.max_concurrent));
    summary.push(format!(
        "Analysis: {} at {} ({}s timeout)",
        config.gemini_model, config.gemini_base_url, config.analysis_timeout_seconds
    ));
    summary.push(format!(
        "API Key: {}",
        if config.gemini_api_key.is_some() { "set" } else { "missing" }
    ));
    summary.push(format!("Default Context: {}", config.default_context));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOCK;
    use clap::Parser;
    use std::env;

    const MANAGED_VARS: &[&str] = &[
        "SPEEDTEST_COMMAND",
        "SPEEDTEST_ARGS",
        "MEASUREMENT_TIMEOUT_SECONDS",
        "MAX_CONCURRENT_MEASUREMENTS",
        "GEMINI_API_KEY",
        "DEFAULT_CONTEXT",
    ];

    fn clear_env() {
        for var in MANAGED_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let cli = Cli::parse_from([
            "nsr", "--command", "fake-speedtest", "--arg", "--simple", "--timeout", "5", "--no-color", "--json",
        ]);
        let config = ConfigParser::new(cli).parse().unwrap();

        assert_eq!(config.command, "fake-speedtest");
        assert_eq!(config.command_args, vec!["--simple"]);
        assert_eq!(config.timeout_seconds, 5);
        assert!(!config.enable_color);
        assert!(config.json_output);
    }

    #[test]
    fn test_env_values_are_merged() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("SPEEDTEST_COMMAND", "speedtest-cli");
        env::set_var("SPEEDTEST_ARGS", "--json  --secure");
        env::set_var("MEASUREMENT_TIMEOUT_SECONDS", "45");
        env::set_var("GEMINI_API_KEY", "from-env");
        env::set_var("DEFAULT_CONTEXT", "Streaming 4K video");

        let config = ConfigParser::new(Cli::parse_from(["nsr"])).parse().unwrap();
        clear_env();

        assert_eq!(config.command, "speedtest-cli");
        assert_eq!(config.command_args, vec!["--json", "--secure"]);
        assert_eq!(config.timeout_seconds, 45);
        assert_eq!(config.gemini_api_key.as_deref(), Some("from-env"));
        assert_eq!(config.default_context, "Streaming 4K video");
    }

    #[test]
    fn test_cli_overrides_env_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("MEASUREMENT_TIMEOUT_SECONDS", "45");
        env::set_var("SPEEDTEST_COMMAND", "speedtest-cli");

        let cli = Cli::parse_from(["nsr", "--timeout", "12", "--command", "other"]);
        let config = ConfigParser::new(cli).parse().unwrap();
        clear_env();

        assert_eq!(config.timeout_seconds, 12);
        assert_eq!(config.command, "other");
    }

    #[test]
    fn test_invalid_env_value_is_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("MAX_CONCURRENT_MEASUREMENTS", "lots");
        let error = ConfigParser::new(Cli::parse_from(["nsr"])).parse().unwrap_err();
        clear_env();

        assert_eq!(error.category(), "CONFIG");
        assert!(error.to_string().contains("MAX_CONCURRENT_MEASUREMENTS"));
    }

    #[test]
    fn test_config_summary_hides_key() {
        let mut config = Config::default();
        config.gemini_api_key = Some("secret-key".to_string());
        let summary = display_config_summary(&config);

        assert!(summary.contains("Measurement: speedtest --json"));
        assert!(summary.contains("API Key: set"));
        assert!(!summary.contains("secret-key"));
    }
}
