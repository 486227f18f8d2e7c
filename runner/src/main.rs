//! Quarry command-line runner.
//!
//! Generates a pool of random queries for a schema, executes them
//! against generated sample data, and reports statistics.
//!
//! Usage:
//!   quarry --schema <FILE> --num-queries <N> [OPTIONS]
//!
//! Options:
//!   --schema <FILE>                 Relational schema JSON file (required)
//!   --num-queries <N>               Number of queries to generate (required)
//!   --output <FILE>                 Write rendered queries to a file
//!   --stats <FILE>                  Write statistics JSON to a file
//!   --seed <N>                      Random seed (default: random)
//!   --sample-rows <N>               Sample rows per entity (default: 200)
//!   --selection-probability <P>     Probability of a selection stage
//!   --projection-probability <P>    Probability of a projection stage
//!   --groupby-probability <P>       Probability of a group-by stage
//!   --max-selection-conditions <N>  Conditions per selection cap
//!   --max-projection-columns <N>    Projected columns cap
//!   --max-groupby-columns <N>       Group-by key columns cap
//!   --max-merges <N>                Merges per query cap
//!   --multi-line                    Render queries as statement sequences
//!   --ensure-non-empty              Retry slots until results are non-empty
//!   --no-multi-processing           Build and execute sequentially
//!   --filter <KIND>                 Keep only matching queries:
//!                                   empty | non-empty | has-error | without-error
//!   --sort                          Order queries by complexity, descending
//!   --verbose                       Debug logging

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use quarry_builder::QueryStructure;
use quarry_generator::{GenerateOptions, Generator};
use quarry_pool::QueryFilter;
use quarry_schema::Schema;

#[derive(Debug)]
struct RunConfig {
    schema: PathBuf,
    num_queries: usize,
    output: Option<PathBuf>,
    stats: Option<PathBuf>,
    seed: Option<u64>,
    sample_rows: usize,
    structure: QueryStructure,
    multi_line: bool,
    ensure_non_empty: bool,
    multi_processing: bool,
    filter: Option<QueryFilter>,
    sort: bool,
    verbose: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("run with --help for usage");
            return ExitCode::from(2);
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(if config.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: RunConfig) -> Result<(), String> {
    let schema = Schema::from_file(&config.schema).map_err(|e| e.to_string())?;

    let seed = config.seed.unwrap_or_else(rand::random);

    let spinner = progress("generating sample data");
    let generator =
        Generator::with_config(schema, config.structure, seed, config.sample_rows)
            .map_err(|e| e.to_string())?;
    spinner.finish_and_clear();

    let options = GenerateOptions::default()
        .with_num_queries(config.num_queries)
        .with_multi_line(config.multi_line)
        .with_multi_processing(config.multi_processing)
        .with_ensure_non_empty(config.ensure_non_empty);

    let spinner = progress("generating queries");
    let mut pool = generator.generate(&options).map_err(|e| e.to_string())?;
    spinner.finish_and_clear();

    let spinner = progress("executing queries");
    pool.execute(config.multi_processing);
    spinner.finish_and_clear();

    if let Some(filter) = config.filter {
        pool = pool.filter(filter).map_err(|e| e.to_string())?;
    }

    if config.sort {
        pool.sort();
    }

    println!("Seed: {seed}");
    println!();
    print!("{}", pool.statistics());

    if let Some(path) = &config.output {
        pool.save(path).map_err(|e| e.to_string())?;
        println!();
        println!("Queries written to {}", path.display());
    }

    if let Some(path) = &config.stats {
        pool.save_statistics(path).map_err(|e| e.to_string())?;
        println!("Statistics written to {}", path.display());
    }

    Ok(())
}

fn progress(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message);
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or(ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn parse_args(args: &[String]) -> Result<RunConfig, String> {
    let mut schema = None;
    let mut num_queries = None;
    let mut output = None;
    let mut stats = None;
    let mut seed = None;
    let mut sample_rows = 200usize;
    let mut structure = QueryStructure::default();
    let mut multi_line = false;
    let mut ensure_non_empty = false;
    let mut multi_processing = true;
    let mut filter = None;
    let mut sort = false;
    let mut verbose = false;

    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            "--schema" => schema = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--num-queries" => num_queries = Some(parse(&mut iter, arg)?),
            "--output" => output = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--stats" => stats = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--seed" => seed = Some(parse(&mut iter, arg)?),
            "--sample-rows" => sample_rows = parse(&mut iter, arg)?,
            "--selection-probability" => {
                structure.selection_probability = parse(&mut iter, arg)?
            }
            "--projection-probability" => {
                structure.projection_probability = parse(&mut iter, arg)?
            }
            "--groupby-probability" => {
                structure.groupby_aggregation_probability = parse(&mut iter, arg)?
            }
            "--max-selection-conditions" => {
                structure.max_selection_conditions = parse(&mut iter, arg)?
            }
            "--max-projection-columns" => {
                structure.max_projection_columns = parse(&mut iter, arg)?
            }
            "--max-groupby-columns" => {
                structure.max_groupby_columns = parse(&mut iter, arg)?
            }
            "--max-merges" => structure.max_merges = parse(&mut iter, arg)?,
            "--multi-line" => multi_line = true,
            "--ensure-non-empty" => ensure_non_empty = true,
            "--no-multi-processing" => multi_processing = false,
            "--filter" => {
                filter = Some(
                    value(&mut iter, arg)?
                        .parse::<QueryFilter>()
                        .map_err(|e| e.to_string())?,
                )
            }
            "--sort" => sort = true,
            "--verbose" => verbose = true,
            unknown => return Err(format!("unknown argument: {unknown}")),
        }
    }

    structure.validate().map_err(|e| e.to_string())?;

    Ok(RunConfig {
        schema: schema.ok_or("--schema is required")?,
        num_queries: num_queries.ok_or("--num-queries is required")?,
        output,
        stats,
        seed,
        sample_rows,
        structure,
        multi_line,
        ensure_non_empty,
        multi_processing,
        filter,
        sort,
        verbose,
    })
}

fn value<'a>(
    iter: &mut std::slice::Iter<'a, String>,
    flag: &str,
) -> Result<&'a String, String> {
    iter.next().ok_or_else(|| format!("{flag} needs a value"))
}

fn parse<T: std::str::FromStr>(
    iter: &mut std::slice::Iter<'_, String>,
    flag: &str,
) -> Result<T, String> {
    value(iter, flag)?
        .parse()
        .map_err(|_| format!("invalid value for {flag}"))
}

fn usage() -> &'static str {
    "quarry --schema <FILE> --num-queries <N> [OPTIONS]

Generate a pool of random queries for a relational schema, execute
them against synthetic sample data, and report statistics.

Options:
  --schema <FILE>                 Relational schema JSON file (required)
  --num-queries <N>               Number of queries to generate (required)
  --output <FILE>                 Write rendered queries to a file
  --stats <FILE>                  Write statistics JSON to a file
  --seed <N>                      Random seed (default: random)
  --sample-rows <N>               Sample rows per entity (default: 200)
  --selection-probability <P>     Probability of a selection stage
  --projection-probability <P>    Probability of a projection stage
  --groupby-probability <P>       Probability of a group-by stage
  --max-selection-conditions <N>  Conditions per selection cap
  --max-projection-columns <N>    Projected columns cap
  --max-groupby-columns <N>       Group-by key columns cap
  --max-merges <N>                Merges per query cap
  --multi-line                    Render queries as statement sequences
  --ensure-non-empty              Retry slots until results are non-empty
  --no-multi-processing           Build and execute sequentially
  --filter <KIND>                 empty | non-empty | has-error | without-error
  --sort                          Order queries by complexity, descending
  --verbose                       Debug logging"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_minimal() {
        let config = parse_args(&args(&[
            "--schema",
            "schema.json",
            "--num-queries",
            "100",
        ]))
        .unwrap();

        assert_eq!(config.num_queries, 100);
        assert!(config.multi_processing);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_parse_structure_overrides() {
        let config = parse_args(&args(&[
            "--schema",
            "s.json",
            "--num-queries",
            "5",
            "--selection-probability",
            "1.0",
            "--max-merges",
            "4",
            "--no-multi-processing",
            "--filter",
            "non-empty",
        ]))
        .unwrap();

        assert_eq!(config.structure.selection_probability, 1.0);
        assert_eq!(config.structure.max_merges, 4);
        assert!(!config.multi_processing);
        assert_eq!(config.filter, Some(QueryFilter::NonEmpty));
    }

    #[test]
    fn test_missing_required_flag() {
        let err = parse_args(&args(&["--num-queries", "5"])).unwrap_err();
        assert!(err.contains("--schema"));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let err = parse_args(&args(&[
            "--schema",
            "s.json",
            "--num-queries",
            "5",
            "--selection-probability",
            "1.5",
        ]))
        .unwrap_err();
        assert!(err.contains("selection_probability"));
    }

    #[test]
    fn test_unknown_argument() {
        let err = parse_args(&args(&["--bogus"])).unwrap_err();
        assert!(err.contains("unknown argument"));
    }
}
