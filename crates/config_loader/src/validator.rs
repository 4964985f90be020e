//! Config validation
//!
//! Rules:
//! - field constraints declared on the blueprint (`validator` derive)
//! - sink names unique
//! - HTTP sink types carry an http(s) `endpoint_uri`

use std::collections::HashSet;

use ::validator::Validate;
use contracts::{ContractError, LoggingBlueprint};
use tracing::warn;

/// Validate a blueprint, returning the first error found
pub fn validate(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_endpoints(blueprint)?;

    if blueprint.sinks.is_empty() {
        warn!("No sinks configured, log records will be discarded");
    }
    Ok(())
}

fn validate_fields(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("sinks", e.to_string()))
}

fn validate_sink_names(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sink in &blueprint.sinks {
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

fn validate_endpoints(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if !sink.sink_type.requires_endpoint() {
            continue;
        }

        let field = format!("sinks[{idx}].endpoint_uri");
        let Some(uri) = sink.endpoint_uri.as_deref() else {
            return Err(ContractError::config_validation(
                field,
                format!("sink '{}' of type {:?} requires endpoint_uri", sink.name, sink.sink_type),
            ));
        };

        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return Err(ContractError::config_validation(
                field,
                format!("endpoint_uri must use http or https, got '{uri}'"),
            ));
        }
    }
    Ok(())
}
