//! Config command - View and check Nimbus configuration
//!
//! Provides the `nimbus config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports every error

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use nimbus_core::config::{Config, ValidationError};
use tracing::info;

use super::CommandContext;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
}

/// Outcome of checking a configuration file on disk
#[derive(Debug)]
enum FileCheck {
    Missing,
    Unreadable(String),
    Checked(Vec<ValidationError>),
}

fn check_file(path: &Path) -> FileCheck {
    if !path.exists() {
        return FileCheck::Missing;
    }
    match Config::load(path) {
        Ok(config) => FileCheck::Checked(config.validate()),
        Err(e) => FileCheck::Unreadable(format!("{e:#}")),
    }
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.format.is_json() {
            let json = serde_json::to_value(&ctx.config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
            return Ok(());
        }

        formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
        formatter.info("");
        let yaml = serde_yaml::to_string(&ctx.config)
            .context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            formatter.info(line);
        }
        Ok(())
    }

    fn execute_validate(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let path = &ctx.config_path;
        info!(config_path = %path.display(), "Validating configuration");

        let errors: Vec<String> = match check_file(path) {
            FileCheck::Missing => {
                if ctx.format.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": path.display().to_string(),
                        "errors": ["Configuration file not found. Using defaults."],
                    }));
                } else {
                    formatter.info(&format!("Configuration file not found at {}", path.display()));
                    formatter.info("Using default configuration.");
                }
                return Ok(());
            }
            FileCheck::Unreadable(message) => {
                vec![format!("Failed to parse configuration: {message}")]
            }
            FileCheck::Checked(errors) => errors.iter().map(|e| e.to_string()).collect(),
        };

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": path.display().to_string(),
                "errors": errors,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", path.display()));
            for error in &errors {
                formatter.info(&format!("  {error}"));
            }
        }

        Ok(())
    }
}
