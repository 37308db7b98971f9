//! REST Schema CLI
//!
//! Command-line interface for validating, sanitizing and linting request
//! payloads against REST argument schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rest_schema::{
    lint, load_document_auto, sanitize_with, validate_with, FileStatus, SchemaOptions, Severity,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rest-schema")]
#[command(about = "Validate and sanitize request payloads against REST argument schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload against a schema
    Validate {
        /// Payload source: file path, URL, or - for stdin
        payload: String,

        /// Schema source: file path or URL (http:// or https://)
        #[arg(long)]
        schema: String,

        /// Parameter name used in error messages
        #[arg(long, default_value = "value")]
        param: String,

        /// Maximum schema nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Sanitize a payload against a schema and print the coerced value
    Sanitize {
        /// Payload source: file path, URL, or - for stdin
        payload: String,

        /// Schema source: file path or URL (http:// or https://)
        #[arg(long)]
        schema: String,

        /// Parameter name used in error messages
        #[arg(long, default_value = "value")]
        param: String,

        /// Maximum schema nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Lint schema files for errors (syntax, malformed keywords, bad patterns)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            payload,
            schema,
            param,
            max_depth,
            json,
        } => run_validate(&payload, &schema, &param, options(max_depth), json),

        Commands::Sanitize {
            payload,
            schema,
            param,
            max_depth,
            output,
            pretty,
        } => run_sanitize(&payload, &schema, &param, options(max_depth), output, pretty),

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn options(max_depth: Option<usize>) -> SchemaOptions {
    match max_depth {
        Some(depth) => SchemaOptions::new().max_depth(depth),
        None => SchemaOptions::new(),
    }
}

/// Load the payload and schema, reporting failures with the loader's exit code.
fn load_inputs(payload: &str, schema: &str, json_output: bool) -> Result<(Value, Value), u8> {
    let payload = load_document_auto(payload).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;
    let schema = load_document_auto(schema).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;
    Ok((payload, schema))
}

fn run_validate(
    payload_source: &str,
    schema_source: &str,
    param: &str,
    options: SchemaOptions,
    json_output: bool,
) -> Result<(), u8> {
    let (payload, schema) = load_inputs(payload_source, schema_source, json_output)?;

    let report = validate_with(&payload, &schema, param, &options);
    match report.result {
        Ok(()) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": true,
                    "notices": report.notices
                });
                println!("{}", output);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(error) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "error": error,
                    "notices": report.notices
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                eprintln!("  {}", error);
            }
            Err(1)
        }
    }
}

fn run_sanitize(
    payload_source: &str,
    schema_source: &str,
    param: &str,
    options: SchemaOptions,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let (payload, schema) = load_inputs(payload_source, schema_source, false)?;

    let sanitized = sanitize_with(&payload, &schema, param, &options)
        .into_result()
        .map_err(|e| {
            eprintln!("Error: {}", e);
            1u8
        })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&sanitized)
    } else {
        serde_json::to_string(&sanitized)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m\u{2713}\x1b[0m",
                FileStatus::Warning => "\x1b[33m\u{26a0}\x1b[0m",
                FileStatus::Error => "\x1b[31m\u{2717}\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m\u{2713} {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m\u{2717} {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
