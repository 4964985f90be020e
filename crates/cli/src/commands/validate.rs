//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{LoggingBlueprint, SinkType, DEFAULT_BATCH_SIZE_LIMIT};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    app_name: Option<String>,
    environment: Option<String>,
    min_level: String,
    sinks: Vec<SinkSummary>,
}

#[derive(Serialize)]
struct SinkSummary {
    name: String,
    sink_type: SinkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint_uri: Option<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(summarize(&blueprint)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(blueprint: &LoggingBlueprint) -> ConfigSummary {
    ConfigSummary {
        version: format!("{:?}", blueprint.version),
        app_name: blueprint.app_name.clone(),
        environment: blueprint.environment.clone(),
        min_level: blueprint.min_level.to_string(),
        sinks: blueprint
            .sinks
            .iter()
            .map(|sink| SinkSummary {
                name: sink.name.clone(),
                sink_type: sink.sink_type,
                endpoint_uri: sink.endpoint_uri.clone(),
            })
            .collect(),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &LoggingBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - records will be discarded".to_string());
    }

    for sink in &blueprint.sinks {
        match sink.sink_type {
            SinkType::Simple if sink.batch_size_limit != DEFAULT_BATCH_SIZE_LIMIT => {
                warnings.push(format!(
                    "Sink '{}': batch_size_limit is ignored by simple sinks",
                    sink.name
                ));
            }
            SinkType::Console if sink.endpoint_uri.is_some() => {
                warnings.push(format!(
                    "Sink '{}': endpoint_uri is ignored by console sinks",
                    sink.name
                ));
            }
            _ => {}
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            if let Some(ref app_name) = summary.app_name {
                println!("  App name: {}", app_name);
            }
            if let Some(ref environment) = summary.environment {
                println!("  Environment: {}", environment);
            }
            println!("  Min level: {}", summary.min_level);
            println!("  Sinks: {}", summary.sinks.len());
            for sink in &summary.sinks {
                match sink.endpoint_uri {
                    Some(ref endpoint) => {
                        println!("    - {} ({:?}) -> {}", sink.name, sink.sink_type, endpoint)
                    }
                    None => println!("    - {} ({:?})", sink.name, sink.sink_type),
                }
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
