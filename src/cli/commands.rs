//! CLI command implementations
//!
//! Each command is a pure function from its arguments to the JSON `data`
//! payload; `run_command` writes the payload (or the error object) to stdout.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::path::PathResolver;
use crate::rules::{AttributeRuleSet, MemoryPresenceVerifier};
use crate::validator::Factory;

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_json_file, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and write its outcome to stdout
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Validate {
            data,
            rules,
            config,
            tables,
        } => validate(&data, &rules, config.as_deref(), tables.as_deref()),
        Command::Resolve {
            data,
            pattern,
            config,
        } => resolve(&data, &pattern, config.as_deref()),
    };

    match result {
        Ok(payload) => write_response(payload),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.apply_logging();
    Ok(config)
}

/// Validate the document at `data_path` against the rule set at `rules_path`
///
/// Output: `{"passed": bool, "failures": {...}, "messages": {...}}`. Failed
/// rules are a normal outcome; only bad input or bad rule declarations are
/// errors.
pub fn validate(
    data_path: &Path,
    rules_path: &Path,
    config_path: Option<&Path>,
    tables_path: Option<&Path>,
) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let data = read_json_file(data_path)?;
    let rules = AttributeRuleSet::from_value(&read_json_file(rules_path)?)?;

    let mut factory = Factory::from_config(&config);
    if let Some(path) = tables_path {
        let tables = MemoryPresenceVerifier::from_value(&read_json_file(path)?)?;
        factory.set_presence_verifier(Arc::new(tables));
    }

    let mut validator = factory.make(data, rules);
    let passed = validator.passes()?;

    Ok(json!({
        "passed": passed,
        "failures": validator.failed().to_value(),
        "messages": validator.messages().to_value(),
    }))
}

/// Resolve `pattern` against the document at `data_path`
///
/// Output: `{"pattern": "...", "found": bool, "value": ...}`.
pub fn resolve(data_path: &Path, pattern: &str, config_path: Option<&Path>) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let data = read_json_file(data_path)?;
    let resolver = PathResolver::new(config.path);

    Ok(json!({
        "pattern": pattern,
        "found": resolver.contains(&data, pattern),
        "value": resolver.resolve(&data, pattern, &Value::Null),
    }))
}
