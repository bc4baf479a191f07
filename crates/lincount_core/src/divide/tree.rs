//! Arena-allocated solution tree
//!
//! The builder walks the column set top-down. Every sub-system becomes one
//! of three nodes:
//!
//! - **Terminal**: full column rank, so zero or one solutions.
//! - **RowCanonical**: maps `b` onto a full-row-rank canonical system and
//!   delegates; inconsistent `b` count zero without recursion.
//! - **Split**: the columns are cut in two and the count is a convolution
//!   over the entangled rows (rows both halves touch).
//!
//! Split nodes are keyed by their canonical matrix, so identical
//! sub-systems reached through different paths share one node (and one
//! memo cache). The tree is immutable once built; the split caches are the
//! only shared mutable state.

use super::canon::RowCanon;
use super::terminal::TerminalNode;
use crate::brute;
use crate::cache::{CacheStats, MemoCache};
use crate::config::CountConfig;
use crate::intvec::IntVec;
use crate::matrix::IntMat;
use crate::problem::CountingProblem;
use crate::reduce::{Reducer, SerialSum};
use crate::sequence::{BoundedSeq, RangeSeq, Sequencer};
use num_bigint::BigUint;
use num_traits::Zero;
use rustc_hash::FxHashMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Index of a node in the tree's arena
pub type NodeId = usize;

#[derive(Debug)]
pub(crate) enum Node {
    Terminal(TerminalNode),
    RowCanonical {
        a: IntMat,
        canon: RowCanon,
        inner: NodeId,
    },
    Split(SplitNode),
}

#[derive(Debug)]
pub(crate) struct SplitNode {
    /// canonical, full row rank
    a: IntMat,
    left: NodeId,
    right: NodeId,
    uses_row: [Vec<bool>; 2],
    entangled: Vec<usize>,
    half_row_sums: [Vec<i64>; 2],
    parallel: bool,
    cache: MemoCache,
}

/// Shape of a built tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    pub terminal_nodes: usize,
    pub split_nodes: usize,
    pub row_canonical_nodes: usize,
    /// Sub-systems resolved to an already built split node
    pub shared_hits: usize,
    /// Largest number of entangled rows in any split node
    pub max_entangled: usize,
    /// Seconds spent building
    pub build_time: f64,
}

impl TreeStats {
    pub fn total_nodes(&self) -> usize {
        self.terminal_nodes + self.split_nodes + self.row_canonical_nodes
    }
}

/// Divide-and-conquer decomposition of one matrix
pub struct SolutionTree {
    nodes: Vec<Node>,
    root: NodeId,
    zero_one: bool,
    reducer: Box<dyn Reducer>,
    cross_check: bool,
    stats: TreeStats,
}

impl SolutionTree {
    /// Build the tree for `problem.matrix()`. The matrix must already have
    /// passed validation.
    pub(crate) fn build(problem: &dyn CountingProblem, zero_one: bool, config: &CountConfig) -> Self {
        let start = Instant::now();
        let a = problem.matrix().clone();
        let (m, n) = a.dims();

        let mut builder = Builder {
            problem,
            config,
            zero_one,
            nodes: Vec::new(),
            shared: FxHashMap::default(),
            shared_hits: 0,
        };
        let root = builder.build(a, (0..n).collect(), true);

        let mut stats = TreeStats {
            shared_hits: builder.shared_hits,
            build_time: start.elapsed().as_secs_f64(),
            ..Default::default()
        };
        for node in &builder.nodes {
            match node {
                Node::Terminal(_) => stats.terminal_nodes += 1,
                Node::RowCanonical { .. } => stats.row_canonical_nodes += 1,
                Node::Split(s) => {
                    stats.split_nodes += 1;
                    stats.max_entangled = stats.max_entangled.max(s.entangled.len());
                }
            }
        }

        info!(
            rows = m,
            cols = n,
            zero_one,
            nodes = stats.total_nodes(),
            splits = stats.split_nodes,
            shared = stats.shared_hits,
            max_entangled = stats.max_entangled,
            elapsed = stats.build_time,
            "built solution tree"
        );

        Self {
            nodes: builder.nodes,
            root,
            zero_one,
            reducer: config.top_reducer(),
            cross_check: config.cross_check_enabled(),
            stats,
        }
    }

    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    pub fn is_zero_one(&self) -> bool {
        self.zero_one
    }

    /// Count solutions of the root system for a non-negative `b`
    pub fn count(&self, b: &[i64]) -> BigUint {
        self.count_node(self.root, b)
    }

    /// Cheap emptiness test at the root
    pub fn obviously_empty(&self, b: &[i64]) -> bool {
        self.node_obviously_empty(self.root, b)
    }

    fn count_node(&self, id: NodeId, b: &[i64]) -> BigUint {
        let count = match &self.nodes[id] {
            Node::Terminal(t) => BigUint::from(t.count(b)),
            Node::RowCanonical { canon, inner, .. } => match canon.map(b) {
                Some(b2) => self.count_node(*inner, &b2),
                None => BigUint::zero(),
            },
            Node::Split(s) => s
                .cache
                .get_or_compute(IntVec::from(b), || self.eval_split(s, b)),
        };
        if self.cross_check {
            self.verify(id, b, &count);
        }
        count
    }

    fn node_obviously_empty(&self, id: NodeId, b: &[i64]) -> bool {
        match &self.nodes[id] {
            Node::RowCanonical { canon, .. } => !canon.consistent(b),
            Node::Terminal(_) | Node::Split(_) => false,
        }
    }

    /// `left(b1) * right(b2)`, skipping the right half when the left is empty
    fn product(&self, s: &SplitNode, b1: &[i64], b2: &[i64]) -> BigUint {
        if self.node_obviously_empty(s.left, b1) || self.node_obviously_empty(s.right, b2) {
            return BigUint::zero();
        }
        let left = self.count_node(s.left, b1);
        if left.is_zero() {
            return left;
        }
        let right = self.count_node(s.right, b2);
        left * right
    }

    fn eval_split(&self, s: &SplitNode, b: &[i64]) -> BigUint {
        let m = b.len();
        let mut b1 = vec![0; m];
        let mut b2 = vec![0; m];
        for i in 0..m {
            if s.uses_row[0][i] {
                b1[i] = b[i];
            }
            if s.uses_row[1][i] {
                b2[i] = b[i];
            }
        }

        let e = s.entangled.len();
        if e == 0 {
            return self.product(s, &b1, &b2);
        }

        // range of the left half's share of each entangled row
        let mut lo = vec![0; e];
        let mut hi = vec![0; e];
        for (k, &i) in s.entangled.iter().enumerate() {
            hi[k] = b[i];
            if self.zero_one {
                lo[k] = (b[i] - s.half_row_sums[1][i]).max(0);
                hi[k] = hi[k].min(s.half_row_sums[0][i]);
            }
            if lo[k] > hi[k] {
                return BigUint::zero();
            }
        }

        // outer dimension is the last entangled row; the rest is walked
        // serially inside each term
        let term = |x: &[i64]| -> BigUint {
            let mut lower = lo.clone();
            let mut upper = hi.clone();
            lower[e - 1] = x[0];
            upper[e - 1] = x[0];
            let inner = BoundedSeq::with_iter_dim(lower, upper, e - 1);

            let mut left_b = b1.clone();
            let mut right_b = b2.clone();
            let mut acc = BigUint::zero();
            if let Some(mut c) = inner.first() {
                loop {
                    for (k, &i) in s.entangled.iter().enumerate() {
                        left_b[i] = c[k];
                        right_b[i] = b[i] - c[k];
                    }
                    acc += self.product(s, &left_b, &right_b);
                    if !inner.advance(&mut c) {
                        break;
                    }
                }
            }
            acc
        };

        let outer = RangeSeq::new(lo[e - 1], hi[e - 1] + 1);
        let reducer: &dyn Reducer = if s.parallel {
            self.reducer.as_ref()
        } else {
            &SerialSum
        };
        reducer.reduce(&term, &outer)
    }

    fn node_matrix(&self, id: NodeId) -> &IntMat {
        match &self.nodes[id] {
            Node::Terminal(t) => t.matrix(),
            Node::RowCanonical { a, .. } => a,
            Node::Split(s) => &s.a,
        }
    }

    fn verify(&self, id: NodeId, b: &[i64], count: &BigUint) {
        let expected = brute::enumerate(self.node_matrix(id), b, self.zero_one);
        assert_eq!(
            &expected, count,
            "node {} disagrees with enumeration for b = {:?}",
            id, b
        );
    }

    fn split_nodes(&self) -> impl Iterator<Item = &SplitNode> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Split(s) => Some(s),
            _ => None,
        })
    }

    pub fn cache_len(&self) -> usize {
        self.split_nodes().map(|s| s.cache.len()).sum()
    }

    pub fn clear_cache(&self) {
        for s in self.split_nodes() {
            s.cache.clear();
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.split_nodes()
            .map(|s| s.cache.stats())
            .fold(CacheStats::default(), |acc, s| acc + s)
    }

    fn render(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.nodes[id] {
            Node::Terminal(t) => {
                let (m, n) = t.matrix().dims();
                write!(f, "terminal[{},{}]", m, n)
            }
            Node::RowCanonical { inner, .. } => {
                write!(f, "(")?;
                self.render(*inner, f)?;
                write!(f, ")")
            }
            Node::Split(s) => {
                let (m, n) = s.a.dims();
                write!(f, "split({}\\{},{};", m, s.entangled.len(), n)?;
                self.render(s.left, f)?;
                write!(f, ",")?;
                self.render(s.right, f)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for SolutionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(self.root, f)
    }
}

impl fmt::Debug for SolutionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionTree")
            .field("root", &self.root)
            .field("zero_one", &self.zero_one)
            .field("stats", &self.stats)
            .finish()
    }
}

struct Builder<'a> {
    problem: &'a dyn CountingProblem,
    config: &'a CountConfig,
    zero_one: bool,
    nodes: Vec<Node>,
    /// canonical matrix -> split node
    shared: FxHashMap<IntMat, NodeId>,
    shared_hits: usize,
}

impl Builder<'_> {
    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// `vars` are the original column indices of `a`
    fn build(&mut self, a: IntMat, vars: Vec<usize>, top: bool) -> NodeId {
        if let Some(t) = TerminalNode::try_build(&a, self.zero_one) {
            return self.push(Node::Terminal(t));
        }

        let canon = RowCanon::build(&a);
        let ca = canon.canonical().clone();
        if let Some(t) = TerminalNode::try_build(&ca, self.zero_one) {
            let inner = self.push(Node::Terminal(t));
            return self.push(Node::RowCanonical { a, canon, inner });
        }

        let inner = match self.shared.get(&ca) {
            Some(&id) => {
                self.shared_hits += 1;
                id
            }
            None => {
                let id = self.build_split(ca.clone(), &vars, top);
                self.shared.insert(ca, id);
                id
            }
        };
        self.push(Node::RowCanonical { a, canon, inner })
    }

    fn build_split(&mut self, a: IntMat, vars: &[usize], top: bool) -> NodeId {
        let (m, n) = a.dims();
        debug_assert!(n >= 2, "single columns are always terminal");
        let halves = self.pick_split(vars);

        let mut uses_row = [vec![false; m], vec![false; m]];
        let mut half_row_sums = [vec![0; m], vec![0; m]];
        let mut children = [0; 2];
        for (h, positions) in halves.iter().enumerate() {
            let sub = a.col_restrict(positions);
            for i in 0..m {
                half_row_sums[h][i] = sub.row(i).iter().sum();
                uses_row[h][i] = sub.row(i).iter().any(|&v| v != 0);
            }
            let sub_vars = positions.iter().map(|&p| vars[p]).collect();
            children[h] = self.build(sub, sub_vars, false);
        }

        let entangled: Vec<usize> = (0..m).filter(|&i| uses_row[0][i] && uses_row[1][i]).collect();
        debug!(
            rows = m,
            cols = n,
            entangled = entangled.len(),
            left = halves[0].len(),
            right = halves[1].len(),
            "built split node"
        );

        self.push(Node::Split(SplitNode {
            a,
            left: children[0],
            right: children[1],
            uses_row,
            entangled,
            half_row_sums,
            parallel: top,
            cache: self.config.new_cache(),
        }))
    }

    /// Problem hint if it is a proper bipartition, else first half / second half
    fn pick_split(&self, vars: &[usize]) -> [Vec<usize>; 2] {
        let n = vars.len();
        if let Some((left, right)) = self.problem.split_vars_by_ref(vars) {
            if is_bipartition(&left, &right, n) {
                return [left, right];
            }
        }
        [(0..n / 2).collect(), (n / 2..n).collect()]
    }
}

fn is_bipartition(left: &[usize], right: &[usize], n: usize) -> bool {
    if left.is_empty() || right.is_empty() || left.len() + right.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &p in left.iter().chain(right) {
        if p >= n || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}
