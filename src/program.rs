use std::collections::HashMap;
use std::fmt;

use num::ToPrimitive;

use crate::bimap::VarBimap;
use crate::branch::{BranchAndBound, IpStatus};
use crate::config::SolverConfig;
use crate::constraint::{Constraint, Relation};
use crate::error::SolverError;
use crate::form::LinearForm;
use crate::simplex::{OptDir, VarRange};

/// An integer program assembled over string-named variables.
///
/// Names are interned into dense indices on first use; the solver layers
/// below only ever see indices. Variables are non-negative integers with an
/// implicit `[0, inf)` range unless narrowed with [`Program::bound`].
#[derive(Debug, Clone)]
pub struct Program {
    opt_dir: OptDir,
    objective: LinearForm,
    constraints: Vec<Constraint>,
    bounds: HashMap<usize, VarRange>,
    bimap: VarBimap,
    config: SolverConfig,
}

impl Program {
    /// Declare the optimization sense and the objective.
    pub fn new<S: AsRef<str>>(opt_dir: OptDir, terms: &[(f64, S)]) -> Result<Self, SolverError> {
        if terms.is_empty() {
            return Err(SolverError::InvalidInput("empty objective".to_string()));
        }

        let mut bimap = VarBimap::new();
        let mut objective = LinearForm::new();
        for (coef, name) in terms {
            if !coef.is_finite() {
                return Err(SolverError::InvalidInput(format!(
                    "non-finite coefficient for `{}`",
                    name.as_ref()
                )));
            }
            objective.add(*coef, bimap.intern(name.as_ref()));
        }

        Ok(Self {
            opt_dir,
            objective,
            constraints: Vec::new(),
            bounds: HashMap::new(),
            bimap,
            config: SolverConfig::default(),
        })
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Add `terms ~ rhs` (chaining).
    pub fn add_constraint<S: AsRef<str>>(
        &mut self,
        terms: &[(f64, S)],
        relation: Relation,
        rhs: f64,
    ) -> Result<&mut Self, SolverError> {
        if !rhs.is_finite() {
            return Err(SolverError::InvalidInput(
                "non-finite constraint right-hand side".to_string(),
            ));
        }
        let mut form = LinearForm::new();
        for (coef, name) in terms {
            if !coef.is_finite() {
                return Err(SolverError::InvalidInput(format!(
                    "non-finite coefficient for `{}`",
                    name.as_ref()
                )));
            }
            form.add(*coef, self.bimap.intern(name.as_ref()));
        }
        self.constraints.push(Constraint::new(form, relation, rhs));
        Ok(self)
    }

    /// Narrow a variable to `[lo, hi]` (chaining). `hi` may be infinite.
    pub fn bound<S, L, U>(&mut self, name: S, lo: L, hi: U) -> Result<&mut Self, SolverError>
    where
        S: AsRef<str>,
        L: ToPrimitive,
        U: ToPrimitive,
    {
        let lo = lo
            .to_f64()
            .ok_or_else(|| SolverError::InvalidInput("unrepresentable lower bound".to_string()))?;
        let hi = hi
            .to_f64()
            .ok_or_else(|| SolverError::InvalidInput("unrepresentable upper bound".to_string()))?;
        if !lo.is_finite() || lo < 0.0 || hi.is_nan() || hi < lo {
            return Err(SolverError::InvalidInput(format!(
                "invalid bound [{lo}, {hi}] for `{}`",
                name.as_ref()
            )));
        }

        let var = self.bimap.intern(name.as_ref());
        self.bounds.insert(var, VarRange::new(lo, hi));
        Ok(self)
    }

    pub fn var_count(&self) -> usize {
        self.bimap.len()
    }

    /// Run branch-and-bound and map the assignment back to names.
    pub fn solve(&self) -> Result<ProgramSolution, SolverError> {
        let var_count = self.bimap.len();
        let mut ranges = vec![VarRange::default(); var_count];
        for (&var, &range) in &self.bounds {
            ranges[var] = range;
        }

        let report = BranchAndBound::new(
            self.opt_dir,
            self.objective.clone(),
            self.constraints.clone(),
            var_count,
            self.config,
        )?
        .with_ranges(ranges)?
        .solve();

        let assignments = if report.status == IpStatus::Bounded {
            report
                .solution
                .iter()
                .enumerate()
                .map(|(var, &value)| {
                    let name = self
                        .bimap
                        .name_of(var)
                        .expect("solution indices come from the bimap")
                        .to_string();
                    (name, value.round() as i64)
                })
                .collect()
        } else {
            HashMap::new()
        };

        Ok(ProgramSolution {
            status: report.status,
            extremum: report.extremum,
            assignments,
            nodes_solved: report.nodes_solved,
        })
    }
}

/// Integer assignment in the user's optimization sense.
#[derive(Debug, Clone)]
pub struct ProgramSolution {
    pub status: IpStatus,
    pub extremum: f64,
    pub nodes_solved: u64,
    assignments: HashMap<String, i64>,
}

impl ProgramSolution {
    pub fn value(&self, name: &str) -> Option<i64> {
        self.assignments.get(name).copied()
    }

    pub fn assignments(&self) -> &HashMap<String, i64> {
        &self.assignments
    }
}

impl fmt::Display for ProgramSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Type: {}", self.status)?;
        writeln!(f, "Extremum = {:.2}", self.extremum)?;
        let mut names: Vec<&String> = self.assignments.keys().collect();
        names.sort();
        for name in names {
            let value = self.assignments[name];
            if value != 0 {
                writeln!(f, "  {name} = {value}")?;
            }
        }
        write!(f, "Nodes solved: {}", self.nodes_solved)
    }
}
