//! Lincount CLI
//!
//! Exact counts of non-negative integer solutions of `A x = b`.
//!
//! # Usage
//! ```bash
//! # 4x4 tables with every row and column summing to 3
//! lincount ctab --rows 4 --cols 4 --margin 3 --method all
//!
//! # Larger squares, cut into halves
//! lincount ctab --rows 6 --cols 6 --margin 4 --method sq
//!
//! # Magic-square style sweep over margin levels
//! lincount sweep --rows 5 --cols 5 --max-margin 6
//!
//! # Arbitrary matrix read from a file, one row per line
//! lincount matrix --file coins.txt --rhs 100
//! ```

mod error;
mod input;
mod sweep;

use clap::{Parser, Subcommand, ValueEnum};
use error::{CliError, Result};
use lincount_core::{
    BruteForceCounter, ContingencyTableProblem, CountConfig, CountingProblem, DivideAndConquerCounter,
    GeneralProblem, NonNegativeCounter, SquareTableCounter, ZeroOneCounter, ZeroOneSource,
};
use num_bigint::BigUint;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lincount")]
#[command(about = "Exact counting of non-negative integer solutions of A x = b")]
#[command(version)]
struct Cli {
    /// Log tree and store construction (RUST_LOG overrides the level)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count contingency tables with every row and column summing to the margin
    Ctab {
        /// Table rows
        #[arg(long)]
        rows: usize,

        /// Table columns
        #[arg(long)]
        cols: usize,

        /// Margin level (see `sweep` for non-square tables)
        #[arg(long)]
        margin: i64,

        /// Counting algorithm
        #[arg(long, value_enum, default_value = "dq")]
        method: Method,

        /// Worker threads for the top-level sum (1 runs serially)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Count tables for every margin level from 0 up to a bound
    Sweep {
        /// Table rows
        #[arg(long)]
        rows: usize,

        /// Table columns
        #[arg(long)]
        cols: usize,

        /// Highest margin level (default (n^2-3n+2)/2)
        #[arg(long)]
        max_margin: Option<i64>,

        /// Worker threads for the top-level sum (1 runs serially)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Count solutions for a matrix read from a file
    Matrix {
        /// Whitespace-separated rows, one per line
        #[arg(long)]
        file: PathBuf,

        /// Right-hand side as b1,b2,...
        #[arg(long, allow_hyphen_values = true)]
        rhs: String,

        /// Counting algorithm
        #[arg(long, value_enum, default_value = "dq")]
        method: Method,

        /// Worker threads for the top-level sum (1 runs serially)
        #[arg(long)]
        threads: Option<usize>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Divide-and-conquer solution tree
    Dq,
    /// Even/odd recursion over zero/one counts
    Zo,
    /// Enumeration (small instances only)
    Brute,
    /// Square tables split into halves (`ctab` with rows == cols only)
    Sq,
    /// Every method, checking that they agree
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        init_logging();
    }
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Ctab {
            rows,
            cols,
            margin,
            method,
            threads,
        } => {
            let problem = ContingencyTableProblem::new(rows, cols)?;
            let b = sweep::uniform_margins(rows, cols, margin);
            println!("{}x{} tables with margins {:?}", rows, cols, b);
            let config = config_for(threads);
            let count = match method {
                Method::Sq => None,
                _ => Some(count_with(Arc::new(problem), &b, method, config.clone())?),
            };
            if method == Method::Sq || (method == Method::All && rows == cols) {
                if rows != cols {
                    return Err(CliError::NotSquare { rows, cols });
                }
                let sq = count_square(rows, margin, config)?;
                if let Some(other) = count.filter(|c| *c != sq) {
                    return Err(CliError::Disagreement {
                        rhs: b,
                        detail: format!("Dq = {}, Sq = {}", other, sq),
                    });
                }
            }
        }
        Commands::Sweep {
            rows,
            cols,
            max_margin,
            threads,
        } => {
            let max_level = max_margin.unwrap_or_else(|| sweep::default_max_level(rows, cols));
            sweep::run_sweep(rows, cols, max_level, config_for(threads))?;
        }
        Commands::Matrix {
            file,
            rhs,
            method,
            threads,
        } => {
            let rows = input::read_matrix(&file)?;
            let b = input::parse_rhs(&rhs)?;
            let problem = GeneralProblem::from_rows(&rows)?;
            println!(
                "{}x{} matrix from {}, b = {:?}",
                problem.matrix().rows(),
                problem.matrix().cols(),
                file.display(),
                b
            );
            count_with(Arc::new(problem), &b, method, config_for(threads))?;
        }
    }
    Ok(())
}

fn config_for(threads: Option<usize>) -> CountConfig {
    match threads {
        Some(0 | 1) => CountConfig::serial(),
        Some(n) => CountConfig::parallel(n),
        None => CountConfig::default(),
    }
}

/// Build the requested counters, count `b` with each, and report
fn count_with(
    problem: Arc<dyn CountingProblem>,
    b: &[i64],
    method: Method,
    config: CountConfig,
) -> Result<BigUint> {
    let names: &[Method] = match method {
        Method::All => &[Method::Dq, Method::Zo, Method::Brute],
        _ => std::slice::from_ref(&method),
    };

    let mut results: Vec<(Method, BigUint)> = Vec::new();
    for &m in names {
        let start = Instant::now();
        let counter = build_counter(m, Arc::clone(&problem), config.clone())?;
        let build_ms = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let count = counter.count_non_negative_solutions(b)?;
        let count_ms = start.elapsed().as_secs_f64() * 1000.0;

        println!(
            "  {:<6} {:>24}   build {:>9.2} ms   count {:>9.2} ms   cache {}",
            format!("{:?}", m).to_lowercase(),
            count,
            build_ms,
            count_ms,
            counter.cache_len()
        );
        results.push((m, count));
    }

    let (first_method, first) = results[0].clone();
    if let Some((m, other)) = results.iter().find(|(_, c)| *c != first) {
        return Err(CliError::Disagreement {
            rhs: b.to_vec(),
            detail: format!("{:?} = {}, {:?} = {}", first_method, first, m, other),
        });
    }
    Ok(first)
}

/// `n x n` tables with every line summing to `margin`, by halves
fn count_square(n: usize, margin: i64, config: CountConfig) -> Result<BigUint> {
    let counter = SquareTableCounter::new(config);
    let start = Instant::now();
    let count = counter.count_sq_tables(n, margin)?;
    println!(
        "  {:<6} {:>24}   build {:>9} ms   count {:>9.2} ms   cache {}",
        "sq",
        count,
        "-",
        start.elapsed().as_secs_f64() * 1000.0,
        counter.cache_len()
    );
    Ok(count)
}

fn build_counter(
    method: Method,
    problem: Arc<dyn CountingProblem>,
    config: CountConfig,
) -> Result<Box<dyn NonNegativeCounter>> {
    let counter: Box<dyn NonNegativeCounter> = match method {
        Method::Dq => Box::new(DivideAndConquerCounter::from_shared(problem, false, config)?),
        Method::Zo => Box::new(ZeroOneCounter::from_shared(
            problem,
            ZeroOneSource::DivideAndConquer,
            config,
        )?),
        Method::Brute | Method::All => Box::new(BruteForceCounter::from_shared(problem, false)?),
        Method::Sq => {
            return Err(CliError::NotSquare {
                rows: problem.matrix().rows(),
                cols: problem.matrix().cols(),
            })
        }
    };
    Ok(counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_methods_agree() {
        let problem = Arc::new(ContingencyTableProblem::new(3, 3).unwrap());
        let n = count_with(problem, &[2; 6], Method::All, CountConfig::serial()).unwrap();
        assert_eq!(n, BigUint::from(21u32));
    }

    #[test]
    fn test_coin_matrix() {
        let problem = Arc::new(GeneralProblem::from_rows(&[vec![1, 2, 5]]).unwrap());
        let n = count_with(problem, &[10], Method::Dq, CountConfig::parallel(2)).unwrap();
        assert_eq!(n, BigUint::from(10u32));
    }

    #[test]
    fn test_square_method() {
        assert_eq!(count_square(4, 2, CountConfig::serial()).unwrap(), BigUint::from(282u32));
        let problem = Arc::new(GeneralProblem::from_rows(&[vec![1, 2, 5]]).unwrap());
        assert!(matches!(
            count_with(problem, &[10], Method::Sq, CountConfig::serial()),
            Err(CliError::NotSquare { rows: 1, cols: 3 })
        ));
        assert!(matches!(
            run(Commands::Ctab {
                rows: 2,
                cols: 3,
                margin: 1,
                method: Method::Sq,
                threads: None,
            }),
            Err(CliError::NotSquare { rows: 2, cols: 3 })
        ));
        assert!(run(Commands::Ctab {
            rows: 3,
            cols: 3,
            margin: 2,
            method: Method::All,
            threads: Some(1),
        })
        .is_ok());
    }

    #[test]
    fn test_config_for_threads() {
        assert!(!config_for(Some(1)).parallel);
        assert_eq!(config_for(Some(3)).threads, 3);
        assert!(config_for(None).parallel);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "lincount", "matrix", "--file", "a.txt", "--rhs", "3,4", "--method", "all", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Matrix { method: Method::All, .. }));
    }
}
