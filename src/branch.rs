use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::{Condvar, Mutex};
use std::thread;

use log::debug;

use crate::config::SolverConfig;
use crate::constraint::Constraint;
use crate::error::SolverError;
use crate::form::LinearForm;
use crate::node::{Node, NodeKind};
use crate::simplex::{OptDir, Simplex, VarRange};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IpStatus {
    Bounded,
    Infeasible,
    Unbounded,
}

impl fmt::Display for IpStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IpStatus::Bounded => write!(f, "Bounded"),
            IpStatus::Infeasible => write!(f, "Infeasible"),
            IpStatus::Unbounded => write!(f, "Unbounded"),
        }
    }
}

/// Outcome of a branch-and-bound run, in the user's optimization sense.
#[derive(Debug, Clone)]
pub struct IpReport {
    pub status: IpStatus,
    pub extremum: f64,
    pub solution: Vec<f64>,
    pub nodes_solved: u64,
}

/// Heap entry: min lower bound first, then insertion order.
struct OpenNode {
    node: Node,
    seq: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // BinaryHeap pops its maximum, so reverse both keys: the smallest bound
    // (oldest node on ties) compares greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .node
            .lower_bound
            .total_cmp(&self.node.lower_bound)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Search state shared by the sequential and parallel drivers. The parallel
/// driver serializes every mutation behind one mutex.
struct Search {
    queue: BinaryHeap<OpenNode>,
    /// Objective value of the incumbent, in min form. Only ever decreases.
    upper_bound: f64,
    solution: Vec<f64>,
    status: IpStatus,
    nodes_solved: u64,
    next_seq: u64,
    in_flight: u32,
}

impl Search {
    fn new(var_count: usize) -> Self {
        Self {
            queue: BinaryHeap::new(),
            upper_bound: f64::INFINITY,
            solution: vec![0.0; var_count],
            status: IpStatus::Infeasible,
            nodes_solved: 0,
            next_seq: 0,
            in_flight: 0,
        }
    }

    /// Decide what a freshly solved node means: new incumbent, open node,
    /// unbounded abort, or pruned.
    fn check(&mut self, node: Node) {
        self.nodes_solved += 1;
        if self.nodes_solved % 256 == 0 {
            debug!(
                "{} nodes solved, {} open, upper bound {}",
                self.nodes_solved,
                self.queue.len(),
                self.upper_bound
            );
        }

        match node.kind {
            NodeKind::IpFeasible if node.lower_bound < self.upper_bound => {
                self.status = IpStatus::Bounded;
                self.upper_bound = node.lower_bound;
                self.solution = node.solution;
            }
            NodeKind::LpFeasible if node.lower_bound < self.upper_bound => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.queue.push(OpenNode { node, seq });
            }
            NodeKind::Unbounded => {
                self.status = IpStatus::Unbounded;
            }
            // Infeasible nodes and bound-pruned nodes are discarded.
            _ => {}
        }
    }
}

/// Best-first branch-and-bound over the two-phase simplex.
#[derive(Debug)]
pub struct BranchAndBound {
    opt_dir: OptDir,
    /// Always kept in min form; a max problem enters negated.
    objective: LinearForm,
    constraints: Vec<Constraint>,
    root_ranges: Vec<VarRange>,
    simplex: Simplex,
    config: SolverConfig,
}

impl BranchAndBound {
    /// Validates the problem up front; a malformed problem never reaches the
    /// search loop.
    pub fn new(
        opt_dir: OptDir,
        objective: LinearForm,
        constraints: Vec<Constraint>,
        var_count: usize,
        config: SolverConfig,
    ) -> Result<Self, SolverError> {
        if objective.is_empty() {
            return Err(SolverError::InvalidInput("empty objective".to_string()));
        }
        if !objective.is_finite() {
            return Err(SolverError::InvalidInput(
                "non-finite objective coefficient".to_string(),
            ));
        }
        if objective.max_var().is_some_and(|v| v >= var_count) {
            return Err(SolverError::InvalidInput(
                "objective references a variable index out of range".to_string(),
            ));
        }
        for con in &constraints {
            if !con.form().is_finite() || !con.rhs().is_finite() {
                return Err(SolverError::InvalidInput(
                    "non-finite constraint coefficient".to_string(),
                ));
            }
            if con.form().max_var().is_some_and(|v| v >= var_count) {
                return Err(SolverError::InvalidInput(
                    "constraint references a variable index out of range".to_string(),
                ));
            }
        }

        let mut objective = objective;
        if opt_dir == OptDir::Max {
            objective.negate();
        }

        Ok(Self {
            opt_dir,
            objective,
            constraints,
            root_ranges: vec![VarRange::default(); var_count],
            simplex: Simplex::new(config),
            config,
        })
    }

    /// Replace the root `[0, inf)` boxes, e.g. to impose variable bounds.
    pub fn with_ranges(mut self, ranges: Vec<VarRange>) -> Result<Self, SolverError> {
        if ranges.len() != self.root_ranges.len() {
            return Err(SolverError::InvalidInput(format!(
                "expected {} variable ranges, got {}",
                self.root_ranges.len(),
                ranges.len()
            )));
        }
        for range in &ranges {
            if !range.lo.is_finite() || range.lo < 0.0 || range.hi.is_nan() {
                return Err(SolverError::InvalidInput(format!(
                    "invalid variable range [{}, {}]",
                    range.lo, range.hi
                )));
            }
        }
        self.root_ranges = ranges;
        Ok(self)
    }

    pub fn solve(&self) -> IpReport {
        if self.config.parallel_search {
            self.solve_parallel()
        } else {
            self.solve_sequential()
        }
    }

    fn solve_sequential(&self) -> IpReport {
        let mut search = Search::new(self.root_ranges.len());
        search.check(self.solve_node(&self.root_ranges));

        while search.status != IpStatus::Unbounded {
            let Some(open) = search.queue.pop() else {
                break;
            };
            search.check(self.solve_node(&open.node.ranges_left));
            search.check(self.solve_node(&open.node.ranges_right));
        }

        self.report(search)
    }

    fn solve_parallel(&self) -> IpReport {
        let mut search = Search::new(self.root_ranges.len());
        search.check(self.solve_node(&self.root_ranges));

        let shared = Mutex::new(search);
        let idle = Condvar::new();
        let workers = thread::available_parallelism().map_or(4, usize::from);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| self.expand_nodes(&shared, &idle));
            }
        });

        let search = shared.into_inner().expect("search mutex never poisons");
        self.report(search)
    }

    /// Worker loop: pop a live node under the lock, solve both child
    /// relaxations outside it, then fold the children back in. A popped node
    /// may have been dominated by a newer incumbent while queued; those are
    /// discarded during the pop.
    fn expand_nodes(&self, shared: &Mutex<Search>, idle: &Condvar) {
        loop {
            let node = {
                let mut search = shared.lock().expect("search mutex never poisons");
                loop {
                    if search.status == IpStatus::Unbounded {
                        return;
                    }
                    let mut picked = None;
                    while let Some(open) = search.queue.pop() {
                        if open.node.lower_bound < search.upper_bound {
                            picked = Some(open.node);
                            break;
                        }
                    }
                    if let Some(node) = picked {
                        search.in_flight += 1;
                        break node;
                    }
                    if search.in_flight == 0 {
                        // Queue drained and nobody can refill it.
                        idle.notify_all();
                        return;
                    }
                    search = idle.wait(search).expect("search mutex never poisons");
                }
            };

            let left = self.solve_node(&node.ranges_left);
            let right = self.solve_node(&node.ranges_right);

            let mut search = shared.lock().expect("search mutex never poisons");
            search.check(left);
            search.check(right);
            search.in_flight -= 1;
            idle.notify_all();
        }
    }

    fn solve_node(&self, ranges: &[VarRange]) -> Node {
        Node::solve(&self.simplex, &self.objective, &self.constraints, ranges)
    }

    fn report(&self, search: Search) -> IpReport {
        let is_min = self.opt_dir == OptDir::Min;
        let extremum = match search.status {
            IpStatus::Unbounded => {
                if is_min {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            _ => search.upper_bound * if is_min { 1.0 } else { -1.0 },
        };

        debug!(
            "search finished: {} after {} nodes",
            search.status, search.nodes_solved
        );

        IpReport {
            status: search.status,
            extremum,
            solution: search.solution,
            nodes_solved: search.nodes_solved,
        }
    }
}
