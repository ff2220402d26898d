//! `fleet-relay validate`: check a partner targets file for errors.
//!
//! Parses and validates the targets file exactly as `run` would, reporting
//! results in either human-readable text or machine-readable JSON format.
//! Credentials never appear in the output.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::validation;
use crate::config::TargetsSource;
use crate::error::FleetError;

pub async fn execute(args: &ValidateArgs) -> Result<(), FleetError> {
    let source = TargetsSource::File(args.targets.clone());
    let label = source.label();
    let specs = source.read_specs().await?;

    let targets = match validation::validate_targets(&specs) {
        Ok(targets) => targets,
        Err(errors) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} {label} has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => {
                    let json_errors: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "target": e.target,
                                "field": e.field,
                                "message": e.message,
                                "suggestion": e.suggestion,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "valid": false,
                            "errors": json_errors,
                        })
                    );
                }
            }
            return Err(FleetError::ConfigValidation { errors });
        }
    };

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&label, &targets)
            );
        }
        ValidateFormat::Json => {
            let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "targets": targets.len(),
                    "names": names,
                })
            );
        }
    }

    Ok(())
}
