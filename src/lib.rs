//! Integer linear programming by branch-and-bound over a from-scratch
//! two-phase tableau simplex.
//!
//! The LP layer ([`Simplex`]) solves `min`/`max` problems with `<=`, `=`,
//! `>=` rows and per-variable `[lo, hi]` ranges on a dense tableau,
//! classifying each problem as bounded, unbounded (with a recession
//! direction), or infeasible. The IP layer ([`BranchAndBound`]) runs a
//! best-first search over LP relaxations with incumbent pruning, either
//! sequentially or on a worker pool. [`Program`] is the friendly front:
//! string-named variables, chained constraints, integer assignments out.
//!
//! ```
//! use rilp::{OptDir, Program, Relation};
//!
//! let mut program = Program::new(OptDir::Max, &[(3.0, "x"), (1.0, "y")]).unwrap();
//! program
//!     .add_constraint(&[(4.0, "x"), (2.0, "y")], Relation::Le, 11.0)
//!     .unwrap()
//!     .bound("x", 1, 2)
//!     .unwrap();
//! let solution = program.solve().unwrap();
//! assert_eq!(solution.value("x"), Some(2));
//! assert_eq!(solution.value("y"), Some(1));
//! ```
//!
//! Two acceleration paths exist, both off by default: row-parallel tableau
//! elimination and parallel node expansion. They draw threads from separate
//! pools (rayon and a scoped worker pool sized by hardware parallelism), so
//! enable one or the other unless the machine has cores to spare.

pub mod bimap;
pub mod branch;
pub mod config;
pub mod constraint;
pub mod error;
pub mod fop;
pub mod form;
pub mod node;
pub mod program;
pub mod simplex;
pub mod supply_chain;
pub mod tableau;

pub use bimap::VarBimap;
pub use branch::{BranchAndBound, IpReport, IpStatus};
pub use config::SolverConfig;
pub use constraint::{Constraint, Relation};
pub use error::SolverError;
pub use form::LinearForm;
pub use program::{Program, ProgramSolution};
pub use simplex::{LpResult, LpStatus, OptDir, Simplex, VarRange};
