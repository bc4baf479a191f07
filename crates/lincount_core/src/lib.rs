//! Lincount Core Library
//!
//! Exact counting of non-negative integer solutions of `A x = b`.
//!
//! # Overview
//!
//! For a fixed non-negative integer matrix `A` whose solution sets are all
//! finite, this library counts `#{x ∈ ℕⁿ : A x = b}` as an arbitrary
//! precision integer. Two exact algorithms are provided:
//!
//! - an even/odd recursion over a table of 0/1 solution counts
//!   ([`ZeroOneCounter`]),
//! - a divide-and-conquer solution tree that splits the columns, short-cuts
//!   full-column-rank sub-systems and memoizes sub-counts
//!   ([`DivideAndConquerCounter`]),
//!
//! plus a brute-force enumerator used as a reference. [`SquareTableCounter`]
//! counts square contingency tables with uniform margins by cutting them
//! into two halves and summing over the half margins.
//!
//! # Key Components
//!
//! - [`problem`] - the matrix plus admissibility, symmetry and split hints
//! - [`zero_one`] - even/odd counter and its residue-class store
//! - [`divide`] - solution tree builder and counter
//! - [`ctab`] - square tables with uniform margins
//! - [`cache`] - sharded at-most-once memoization
//! - [`sequence`] / [`reduce`] - iteration and (parallel) summation
//! - [`rational`], [`matrix`], [`linalg`], [`simplex`] - exact linear algebra
//! - [`validate`] - matrix preconditions
//!
//! # Example
//!
//! ```ignore
//! use lincount_core::{ContingencyTableProblem, DivideAndConquerCounter, NonNegativeCounter};
//!
//! let counter = DivideAndConquerCounter::new(ContingencyTableProblem::new(4, 4)?)?;
//! let n = counter.count_non_negative_solutions(&[3; 8])?;
//! ```

pub mod brute;
pub mod cache;
pub mod config;
pub mod counter;
pub mod ctab;
pub mod divide;
pub mod error;
pub mod intvec;
pub mod linalg;
pub mod matrix;
pub mod permutation;
pub mod problem;
pub mod rational;
pub mod reduce;
pub mod sequence;
pub mod simplex;
pub mod validate;
pub mod zero_one;

pub use brute::{brute_force_count, BruteForceCounter};
pub use cache::{CacheStats, EvictionPolicy, MemoCache};
pub use config::CountConfig;
pub use counter::NonNegativeCounter;
pub use ctab::SquareTableCounter;
pub use divide::{DivideAndConquerCounter, SolutionTree, TreeStats};
pub use error::{CountError, Result};
pub use intvec::IntVec;
pub use matrix::{IntMat, Matrix};
pub use permutation::Permutation;
pub use problem::{ContingencyTableProblem, CountingProblem, GeneralProblem};
pub use rational::Rational;
pub use reduce::{Reducer, SerialSum, ThreadedSum};
pub use sequence::{BoundedSeq, CubeSeq, OrderedSumSeq, RangeSeq, Sequencer};
pub use zero_one::{ZeroOneCounter, ZeroOneSource, ZeroOneStore};

/// Solution counts are unbounded non-negative integers
pub type Count = num_bigint::BigUint;
