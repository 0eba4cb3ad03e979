use std::fmt;
use std::str::FromStr;

use crate::error::SolverError;
use crate::form::LinearForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le, // <=
    Eq, // ==
    Ge, // >=
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Relation::Le => write!(f, "\u{2264}"),
            Relation::Eq => write!(f, "="),
            Relation::Ge => write!(f, "\u{2265}"),
        }
    }
}

impl FromStr for Relation {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, SolverError> {
        match s {
            "<=" => Ok(Relation::Le),
            "=" | "==" => Ok(Relation::Eq),
            ">=" => Ok(Relation::Ge),
            other => Err(SolverError::InvalidInput(format!(
                "unknown relation `{other}`"
            ))),
        }
    }
}

/// One row of the problem: `form ~ rhs` with `~` one of `<=`, `=`, `>=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    form: LinearForm,
    relation: Relation,
    rhs: f64,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.form, self.relation, self.rhs)
    }
}

impl Constraint {
    pub fn new(form: LinearForm, relation: Relation, rhs: f64) -> Self {
        Self {
            form,
            relation,
            rhs,
        }
    }

    /// The single-variable row `x_var ~ rhs`. Bound expansion uses this.
    pub fn single(var: usize, relation: Relation, rhs: f64) -> Self {
        Self::new(LinearForm::from_terms(&[(1.0, var)]), relation, rhs)
    }

    pub fn form(&self) -> &LinearForm {
        &self.form
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Restore the `rhs >= 0` invariant: a negative right side negates both
    /// sides and turns `<=` into `>=` and back.
    pub fn normalize(&mut self) {
        if self.rhs >= 0.0 {
            return;
        }
        self.rhs = -self.rhs;
        self.form.negate();
        match self.relation {
            Relation::Le => self.relation = Relation::Ge,
            Relation::Eq => {}
            Relation::Ge => self.relation = Relation::Le,
        }
    }

    /// Inequalities take one slack column each; equalities take none.
    pub fn has_slack(&self) -> bool {
        self.relation != Relation::Eq
    }

    /// `+1` turns `<=` into an equality, `-1` turns `>=` into one.
    pub fn slack_coef(&self) -> f64 {
        match self.relation {
            Relation::Le => 1.0,
            Relation::Ge => -1.0,
            Relation::Eq => 0.0,
        }
    }

    /// `=` and `>=` rows start without a natural basic column.
    pub fn has_artificial(&self) -> bool {
        self.relation != Relation::Le
    }

    /// Whether `x` satisfies the row within `eps`.
    pub fn holds(&self, x: &[f64], eps: f64) -> bool {
        let lhs = self.form.eval(x);
        match self.relation {
            Relation::Le => lhs <= self.rhs + eps,
            Relation::Eq => (lhs - self.rhs).abs() <= eps,
            Relation::Ge => lhs >= self.rhs - eps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_flips_negative_rhs() {
        let mut con = Constraint::new(
            LinearForm::from_terms(&[(2.0, 0), (-5.0, 1)]),
            Relation::Ge,
            -9.0,
        );
        con.normalize();
        assert_eq!(con.rhs(), 9.0);
        assert_eq!(con.relation(), Relation::Le);
        assert_eq!(con.form().get(0), -2.0);
        assert_eq!(con.form().get(1), 5.0);
    }

    #[test]
    fn normalize_keeps_nonnegative_rhs() {
        let mut con = Constraint::single(0, Relation::Le, 4.0);
        let before = con.clone();
        con.normalize();
        assert_eq!(con, before);
    }

    #[test]
    fn slack_and_artificial_classification() {
        let le = Constraint::single(0, Relation::Le, 1.0);
        let eq = Constraint::single(0, Relation::Eq, 1.0);
        let ge = Constraint::single(0, Relation::Ge, 1.0);

        assert!(le.has_slack() && !le.has_artificial());
        assert_eq!(le.slack_coef(), 1.0);

        assert!(!eq.has_slack() && eq.has_artificial());

        assert!(ge.has_slack() && ge.has_artificial());
        assert_eq!(ge.slack_coef(), -1.0);
    }

    #[test]
    fn relation_parsing() {
        assert_eq!("<=".parse::<Relation>().unwrap(), Relation::Le);
        assert_eq!(">=".parse::<Relation>().unwrap(), Relation::Ge);
        assert_eq!("=".parse::<Relation>().unwrap(), Relation::Eq);
        assert!("<".parse::<Relation>().is_err());
    }
}
