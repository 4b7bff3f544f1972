//! CLI command implementations
//!
//! `run` loads the input rows into an in-memory source and sends them
//! through a [`Query`] with the requested filters and sort keys.

use std::path::Path;

use serde_json::Value;

use crate::config::Config;
use crate::filter::Pattern;
use crate::query::{MemoryDatabase, Query, ResultSet};
use crate::sort::SortDirection;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_response};

/// SQL label the input rows are registered under
const INPUT_SQL: &str = "SELECT * FROM input";

/// Options for a single `run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub filters: Vec<String>,
    pub fulltext: Vec<String>,
    pub sorts: Vec<String>,
    pub ids: bool,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Run {
            input,
            config,
            filters,
            fulltext,
            sorts,
            ids,
        } => {
            let options = RunOptions {
                filters,
                fulltext,
                sorts,
                ids,
            };
            run_file(&input, config.as_deref(), &options)
        }
    }
}

/// Reads `input`, processes it and writes the response to stdout
pub fn run_file(input: &Path, config_path: Option<&Path>, options: &RunOptions) -> CliResult<()> {
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_logging()?;

    let rows = read_input(input)?;
    let data = process(rows, config, options)?;
    write_response(data)
}

/// Runs `rows` through the pipeline and returns the response payload
pub fn process(rows: Value, config: Config, options: &RunOptions) -> CliResult<Value> {
    let result = ResultSet::from_json(&rows).map_err(CliError::InvalidArgument)?;

    let database = MemoryDatabase::new();
    database.register(INPUT_SQL, result);

    let mut query = Query::new(&database, INPUT_SQL, None)?.with_config(config);

    for filter in &options.filters {
        query.filter(filter, None)?;
    }
    for spec in &options.fulltext {
        query.filter_pattern(parse_fulltext(spec)?);
    }
    for spec in &options.sorts {
        let (column, direction) = parse_sort(spec)?;
        query.sort(column, direction);
    }

    let data = if options.ids {
        serde_json::to_value(query.fetch_ids()?)?
    } else {
        serde_json::to_value(query.fetch_all()?)?
    };

    Ok(data)
}

/// Parses `column:weight:term`; the term may itself contain colons
fn parse_fulltext(spec: &str) -> CliResult<Pattern> {
    let mut parts = spec.splitn(3, ':');
    let (column, weight, term) = match (parts.next(), parts.next(), parts.next()) {
        (Some(column), Some(weight), Some(term)) if !column.trim().is_empty() => {
            (column.trim(), weight.trim(), term.trim())
        }
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "Invalid fulltext '{}': expected column:weight:term",
                spec
            )))
        }
    };

    let weight: f64 = weight.parse().map_err(|_| {
        CliError::InvalidArgument(format!("Invalid fulltext weight '{}' in '{}'", weight, spec))
    })?;

    Ok(Pattern::fulltext(column, term, weight))
}

/// Parses `column` or `column:asc|desc`
fn parse_sort(spec: &str) -> CliResult<(&str, SortDirection)> {
    let (column, direction) = match spec.rsplit_once(':') {
        Some((column, direction)) => (
            column.trim(),
            direction
                .parse::<SortDirection>()
                .map_err(CliError::InvalidArgument)?,
        ),
        None => (spec.trim(), SortDirection::Asc),
    };

    if column.is_empty() {
        return Err(CliError::InvalidArgument(format!("Invalid sort '{}'", spec)));
    }
    Ok((column, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn games() -> Value {
        json!([
            {"id": 1, "title": "Mario Kart", "console": "nintendo"},
            {"id": 2, "title": "Halo", "console": "xbox"},
            {"id": 3, "title": "Zelda", "console": "nintendo"},
        ])
    }

    #[test]
    fn test_parse_fulltext() {
        let p = parse_fulltext("title:30:star: wars").unwrap();
        assert_eq!(p.column(), Some("title"));
        assert_eq!(p.weight(), 30.0);
        assert_eq!(p.value(), "star: wars");

        assert!(parse_fulltext("title:heavy:star").is_err());
        assert!(parse_fulltext("title:1").is_err());
        assert!(parse_fulltext(":1:x").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("id").unwrap(), ("id", SortDirection::Asc));
        assert_eq!(parse_sort("score:desc").unwrap(), ("score", SortDirection::Desc));
        assert!(parse_sort("id:sideways").is_err());
        assert!(parse_sort(":asc").is_err());
    }

    #[test]
    fn test_process_filters_and_sorts() {
        let options = RunOptions {
            filters: vec!["console = nintendo".into()],
            sorts: vec!["id:desc".into()],
            ids: true,
            ..RunOptions::default()
        };
        let data = process(games(), Config::default(), &options).unwrap();
        assert_eq!(data, json!([3, 1]));
    }

    #[test]
    fn test_process_fulltext_rows() {
        let options = RunOptions {
            fulltext: vec!["title:1:halo".into()],
            sorts: vec!["score:desc".into()],
            ..RunOptions::default()
        };
        let data = process(games(), Config::default(), &options).unwrap();
        assert_eq!(data[0]["id"], json!(2));
        assert!(data[0]["score"].as_f64().unwrap() > data[1]["score"].as_f64().unwrap());
        assert!(data[0].get("title_score").is_some());
    }

    #[test]
    fn test_process_reports_pipeline_errors() {
        let options = RunOptions {
            filters: vec!["id ~ 3".into()],
            ..RunOptions::default()
        };
        let err = process(games(), Config::default(), &options).unwrap_err();
        assert_eq!(err.code_str(), "ROWSIFT_UNSUPPORTED_COMPARISON");

        let options = RunOptions {
            filters: vec!["no operator here".into()],
            ..RunOptions::default()
        };
        let err = process(games(), Config::default(), &options).unwrap_err();
        assert_eq!(err.code_str(), "ROWSIFT_INVALID_PATTERN");

        assert!(process(json!({"id": 1}), Config::default(), &RunOptions::default()).is_err());
    }
}
