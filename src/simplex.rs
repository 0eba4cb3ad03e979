use std::fmt;

use log::{debug, trace};

use crate::config::SolverConfig;
use crate::constraint::{Constraint, Relation};
use crate::fop;
use crate::form::LinearForm;
use crate::tableau::Tableau;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptDir {
    Min,
    Max,
}

impl fmt::Display for OptDir {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptDir::Min => write!(f, "Min"),
            OptDir::Max => write!(f, "Max"),
        }
    }
}

/// Closed interval `[lo, hi]` for one variable; `hi` may be infinite.
/// Non-negativity is implicit, so `lo >= 0` always.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VarRange {
    pub lo: f64,
    pub hi: f64,
}

impl Default for VarRange {
    fn default() -> Self {
        Self {
            lo: 0.0,
            hi: f64::INFINITY,
        }
    }
}

impl VarRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LpStatus {
    Bounded,
    Unbounded,
    Infeasible,
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LpStatus::Bounded => write!(f, "Bounded"),
            LpStatus::Unbounded => write!(f, "Unbounded"),
            LpStatus::Infeasible => write!(f, "Infeasible"),
        }
    }
}

/// Outcome of one LP solve.
///
/// `solution` always has one entry per general variable (zeros when
/// infeasible). `direction` is empty unless the problem is unbounded, in
/// which case it is a recession direction along which the objective improves
/// forever. `extremum` is finite when bounded, `±inf` when unbounded, and
/// NaN when infeasible.
#[derive(Debug, Clone)]
pub struct LpResult {
    pub status: LpStatus,
    pub solution: Vec<f64>,
    pub direction: Vec<f64>,
    pub extremum: f64,
}

impl LpResult {
    fn infeasible(var_count: usize) -> Self {
        Self {
            status: LpStatus::Infeasible,
            solution: vec![0.0; var_count],
            direction: Vec::new(),
            extremum: f64::NAN,
        }
    }
}

/// What the pivot loop ended with.
enum Drive {
    Optimal,
    /// No leaving row existed for this entering column.
    Unbounded(usize),
}

/// Two-phase primal simplex over a dense tableau.
#[derive(Debug)]
pub struct Simplex {
    config: SolverConfig,
}

impl Simplex {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve `opt_dir (obj)` subject to `constraints` and per-variable
    /// `ranges`. The number of general variables is `ranges.len()`; every
    /// index in `obj` and `constraints` must be below it.
    pub fn solve(
        &self,
        opt_dir: OptDir,
        obj: &LinearForm,
        constraints: &[Constraint],
        ranges: &[VarRange],
    ) -> LpResult {
        let var_count = ranges.len();
        let is_min = opt_dir == OptDir::Min;

        let mut tbl = self.build_tableau(constraints, ranges);

        if !self.phase_one(&mut tbl, var_count) {
            return LpResult::infeasible(var_count);
        }

        self.phase_two(&mut tbl, obj, is_min);

        match self.drive(&mut tbl) {
            Drive::Optimal => Self::extract_bounded(&tbl, var_count, is_min),
            Drive::Unbounded(enter) => Self::extract_unbounded(&tbl, var_count, is_min, enter),
        }
    }

    /// Normalize rows, expand bounds into rows, and lay out the
    /// `(1 + m) x (n + slacks + 1)` tableau with its starting basis.
    fn build_tableau(&self, constraints: &[Constraint], ranges: &[VarRange]) -> Tableau {
        let var_count = ranges.len();

        let mut rows: Vec<Constraint> = constraints.to_vec();
        for (var, range) in ranges.iter().enumerate() {
            if range.lo > 0.0 {
                rows.push(Constraint::single(var, Relation::Ge, range.lo));
            }
            if range.hi.is_finite() {
                rows.push(Constraint::single(var, Relation::Le, range.hi));
            }
        }
        for row in rows.iter_mut() {
            row.normalize();
        }

        let slack_count = rows.iter().filter(|c| c.has_slack()).count();
        let cols = var_count + slack_count + 1;
        let mut tbl = Tableau::new(1 + rows.len(), cols, self.config.parallel_elimination);

        let mut slack_col = var_count;
        for (idx, con) in rows.iter().enumerate() {
            let i = idx + 1;
            for (var, coef) in con.form().terms() {
                tbl.set(i, var, coef);
            }
            if con.has_slack() {
                tbl.set(i, slack_col, con.slack_coef());
            }
            tbl.set(i, cols - 1, con.rhs());
            if !con.has_artificial() {
                tbl.set_basis(i, slack_col);
            }
            if con.has_slack() {
                slack_col += 1;
            }
        }

        tbl
    }

    /// Drive the artificial basis out. Returns false when the problem is
    /// infeasible. Rows based on an artificial are added into row 0, which
    /// installs the phase-1 objective (sum of artificials) already reduced
    /// over the basis; see the artificial-column note on [`Tableau`].
    fn phase_one(&self, tbl: &mut Tableau, var_count: usize) -> bool {
        if !tbl.has_artificial() {
            return true;
        }

        for i in 1..tbl.rows() {
            if tbl.basis(i).is_none() {
                tbl.add_row_to_row(i, 0, 1.0);
            }
        }

        match self.drive(tbl) {
            // The phase-1 objective is bounded below by zero, so an
            // unbounded drive can only mean the instance is numerically
            // hopeless; report it as infeasible like the basis check would.
            Drive::Unbounded(_) => return false,
            Drive::Optimal => {}
        }

        if tbl.has_artificial() {
            debug!(
                "phase 1 left an artificial basic over {} general vars: infeasible",
                var_count
            );
            return false;
        }

        // Row 0 is all zeros in exact arithmetic at this point; clear the
        // residue so phase 2 starts from a clean slate.
        tbl.zero_row(0);
        true
    }

    /// Install the user objective in row 0 and reduce it over the current
    /// basis so that basic columns price at zero.
    fn phase_two(&self, tbl: &mut Tableau, obj: &LinearForm, is_min: bool) {
        let sign = if is_min { -1.0 } else { 1.0 };
        for (var, coef) in obj.terms() {
            tbl.set(0, var, coef * sign);
        }

        for i in 1..tbl.rows() {
            if let Some(col) = tbl.basis(i) {
                let r0 = tbl.get(0, col);
                if !fop::is_zero(r0) {
                    tbl.add_row_to_row(i, 0, -r0);
                }
            }
        }
    }

    /// Min-simplex pivot loop: smallest-index entering column with a
    /// positive reduced cost (Bland's rule), min-ratio leaving row.
    fn drive(&self, tbl: &mut Tableau) -> Drive {
        let mut pivots = 0usize;
        loop {
            let Some(enter) = Self::entering(tbl) else {
                trace!("optimal after {pivots} pivots");
                return Drive::Optimal;
            };
            let Some(row) = Self::leaving(tbl, enter) else {
                trace!("unbounded on column {enter} after {pivots} pivots");
                return Drive::Unbounded(enter);
            };

            tbl.eliminate(row, enter);
            tbl.set_basis(row, enter);
            pivots += 1;
        }
    }

    fn entering(tbl: &Tableau) -> Option<usize> {
        (0..tbl.cols() - 1).find(|&j| fop::is_pos(tbl.get(0, j)))
    }

    fn leaving(tbl: &Tableau, enter: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 1..tbl.rows() {
            let a = tbl.get(i, enter);
            if fop::is_pos(a) {
                let ratio = tbl.rhs(i) / a;
                if best.map_or(true, |(_, r)| ratio < r) {
                    best = Some((i, ratio));
                }
            }
        }
        best.map(|(i, _)| i)
    }

    /// Read the optimal vertex off the basis. Slack columns are dropped.
    fn extract_bounded(tbl: &Tableau, var_count: usize, is_min: bool) -> LpResult {
        let mut solution = vec![0.0; var_count];
        for i in 1..tbl.rows() {
            if let Some(var) = tbl.basis(i).filter(|&v| v < var_count) {
                solution[var] = tbl.rhs(i);
            }
        }

        LpResult {
            status: LpStatus::Bounded,
            solution,
            direction: Vec::new(),
            extremum: tbl.rhs(0) * if is_min { 1.0 } else { -1.0 },
        }
    }

    /// The current vertex plus a recession direction built from the entering
    /// column that had no leaving row.
    fn extract_unbounded(tbl: &Tableau, var_count: usize, is_min: bool, enter: usize) -> LpResult {
        let sign = if is_min { 1.0 } else { -1.0 };
        let mut solution = vec![0.0; var_count];
        let mut direction = vec![0.0; var_count];
        for i in 1..tbl.rows() {
            if let Some(var) = tbl.basis(i).filter(|&v| v < var_count) {
                solution[var] = tbl.rhs(i);
                direction[var] = tbl.get(i, enter) * sign;
            }
        }

        LpResult {
            status: LpStatus::Unbounded,
            solution,
            direction,
            extremum: if is_min {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            },
        }
    }
}
