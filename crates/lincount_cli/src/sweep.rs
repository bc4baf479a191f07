//! Contingency table sweeps
//!
//! Counts tables with uniform margins for every margin level up to a bound,
//! one row of output per level.

use crate::error::Result;
use lincount_core::{
    ContingencyTableProblem, CountConfig, DivideAndConquerCounter, NonNegativeCounter,
};
use num_bigint::BigUint;
use num_integer::Integer;
use std::time::Instant;

/// One sweep level
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub level: i64,
    pub margins: Vec<i64>,
    pub count: BigUint,
    pub cache_entries: usize,
    pub elapsed_ms: f64,
}

/// Largest level worth sweeping on an `n × n` table by default
pub fn default_max_level(rows: usize, cols: usize) -> i64 {
    let n = rows.max(cols) as i64;
    ((n * n - 3 * n + 2) / 2).max(1)
}

/// Uniform margins at `level`: every row sums to `level * cols / g` and every
/// column to `level * rows / g` with `g = gcd(rows, cols)`, so both totals
/// agree. Square tables get `level` everywhere.
pub fn uniform_margins(rows: usize, cols: usize, level: i64) -> Vec<i64> {
    let g = rows.gcd(&cols) as i64;
    let row_total = level * cols as i64 / g;
    let col_total = level * rows as i64 / g;
    std::iter::repeat(row_total)
        .take(rows)
        .chain(std::iter::repeat(col_total).take(cols))
        .collect()
}

pub fn run_sweep(rows: usize, cols: usize, max_level: i64, config: CountConfig) -> Result<Vec<SweepRow>> {
    let start = Instant::now();
    let counter = DivideAndConquerCounter::with_config(ContingencyTableProblem::new(rows, cols)?, config)?;
    let build_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!("{}x{} contingency tables", rows, cols);
    println!(
        "tree: {} nodes ({} split, {} shared), built in {:.2} ms",
        counter.stats().total_nodes(),
        counter.stats().split_nodes,
        counter.stats().shared_hits,
        build_ms
    );
    println!("\n┌───────┬──────────────────────────┬──────────┬────────────┐");
    println!("│ level │                    count │    cache │    time(ms)│");
    println!("├───────┼──────────────────────────┼──────────┼────────────┤");

    let mut results = Vec::new();
    for level in 0..=max_level {
        let margins = uniform_margins(rows, cols, level);
        let t0 = Instant::now();
        let count = counter.count_non_negative_solutions(&margins)?;
        let row = SweepRow {
            level,
            margins,
            count,
            cache_entries: counter.cache_len(),
            elapsed_ms: t0.elapsed().as_secs_f64() * 1000.0,
        };
        counter.clear_cache();
        println!(
            "│ {:>5} │ {:>24} │ {:>8} │ {:>10.2} │",
            row.level, row.count, row.cache_entries, row.elapsed_ms
        );
        results.push(row);
    }
    println!("└───────┴──────────────────────────┴──────────┴────────────┘");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_margins() {
        assert_eq!(uniform_margins(3, 3, 2), vec![2; 6]);
        // 2 rows of 3t, 3 columns of 2t
        assert_eq!(uniform_margins(2, 3, 1), vec![3, 3, 2, 2, 2]);
        assert_eq!(uniform_margins(2, 4, 1), vec![2, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn test_default_max_level() {
        assert_eq!(default_max_level(1, 1), 1);
        assert_eq!(default_max_level(4, 4), 3);
        assert_eq!(default_max_level(5, 3), 6);
    }

    #[test]
    fn test_sweep_3x3() {
        let rows = run_sweep(3, 3, 3, CountConfig::serial()).unwrap();
        let counts: Vec<u32> = rows.iter().map(|r| u32::try_from(&r.count).unwrap()).collect();
        assert_eq!(counts, vec![1, 6, 21, 55]);
    }
}
