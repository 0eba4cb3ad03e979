use crate::constraint::Constraint;
use crate::fop;
use crate::form::LinearForm;
use crate::simplex::{LpStatus, OptDir, Simplex, VarRange};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// LP optimum is integral: an incumbent candidate.
    IpFeasible,
    /// LP optimum is fractional: the node can be branched.
    LpFeasible,
    Infeasible,
    Unbounded,
}

/// One branch-and-bound node: the relaxation outcome plus, when the node is
/// branchable, the two child bound boxes obtained by a floor split on the
/// smallest-index fractional variable.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub solution: Vec<f64>,
    /// LP objective in min form; a lower bound on any integer completion.
    pub lower_bound: f64,
    pub ranges_left: Vec<VarRange>,
    pub ranges_right: Vec<VarRange>,
}

impl Node {
    /// Solve the relaxation over `ranges` and classify. The objective must
    /// already be in min form.
    pub fn solve(
        simplex: &Simplex,
        obj: &LinearForm,
        constraints: &[Constraint],
        ranges: &[VarRange],
    ) -> Self {
        let lp = simplex.solve(OptDir::Min, obj, constraints, ranges);

        let kind = match lp.status {
            LpStatus::Infeasible => NodeKind::Infeasible,
            LpStatus::Unbounded => NodeKind::Unbounded,
            LpStatus::Bounded => match Self::split_var(&lp.solution) {
                None => NodeKind::IpFeasible,
                Some(_) => NodeKind::LpFeasible,
            },
        };

        let (ranges_left, ranges_right) = if kind == NodeKind::LpFeasible {
            let var = Self::split_var(&lp.solution).expect("branchable node has a fractional var");
            let split = lp.solution[var].floor();

            let mut left = ranges.to_vec();
            let mut right = ranges.to_vec();
            left[var].hi = split;
            right[var].lo = split + 1.0;
            (left, right)
        } else {
            (Vec::new(), Vec::new())
        };

        Self {
            kind,
            solution: lp.solution,
            lower_bound: lp.extremum,
            ranges_left,
            ranges_right,
        }
    }

    /// Smallest-index variable whose LP value is fractional, if any.
    fn split_var(solution: &[f64]) -> Option<usize> {
        solution.iter().position(|&x| !fop::is_int(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::constraint::Relation;
    use approx::assert_abs_diff_eq;

    fn simplex() -> Simplex {
        Simplex::new(SolverConfig::sequential())
    }

    #[test]
    fn integral_relaxation_is_ip_feasible() {
        // min x + y  s.t.  x + y >= 3: the vertex (3, 0) is integral.
        let obj = LinearForm::from_terms(&[(1.0, 0), (1.0, 1)]);
        let cons = vec![Constraint::new(
            LinearForm::from_terms(&[(1.0, 0), (1.0, 1)]),
            Relation::Ge,
            3.0,
        )];
        let node = Node::solve(&simplex(), &obj, &cons, &vec![VarRange::default(); 2]);

        assert_eq!(node.kind, NodeKind::IpFeasible);
        assert_abs_diff_eq!(node.lower_bound, 3.0, epsilon = 1e-9);
        assert!(node.ranges_left.is_empty() && node.ranges_right.is_empty());
    }

    #[test]
    fn fractional_relaxation_splits_on_floor() {
        // min -x  s.t.  2x <= 5: optimum x = 2.5, split at floor 2.
        let obj = LinearForm::from_terms(&[(-1.0, 0)]);
        let cons = vec![Constraint::new(
            LinearForm::from_terms(&[(2.0, 0)]),
            Relation::Le,
            5.0,
        )];
        let node = Node::solve(&simplex(), &obj, &cons, &[VarRange::default()]);

        assert_eq!(node.kind, NodeKind::LpFeasible);
        assert_abs_diff_eq!(node.lower_bound, -2.5, epsilon = 1e-9);
        assert_eq!(node.ranges_left[0], VarRange::new(0.0, 2.0));
        assert_eq!(node.ranges_right[0], VarRange::new(3.0, f64::INFINITY));
    }

    #[test]
    fn splitting_at_a_bound_collapses_one_child() {
        // min -x over x in [0, 1/2]: optimum x = 0.5, left child keeps
        // [0, 0], right child gets the empty box [1, 0.5].
        let obj = LinearForm::from_terms(&[(-1.0, 0)]);
        let node = Node::solve(&simplex(), &obj, &[], &[VarRange::new(0.0, 0.5)]);

        assert_eq!(node.kind, NodeKind::LpFeasible);
        let right = Node::solve(&simplex(), &obj, &[], &node.ranges_right);
        assert_eq!(right.kind, NodeKind::Infeasible);

        let left = Node::solve(&simplex(), &obj, &[], &node.ranges_left);
        assert_eq!(left.kind, NodeKind::IpFeasible);
        assert_abs_diff_eq!(left.lower_bound, 0.0);
    }

    #[test]
    fn unbounded_relaxation_is_flagged() {
        let obj = LinearForm::from_terms(&[(-1.0, 0)]);
        let node = Node::solve(&simplex(), &obj, &[], &[VarRange::default()]);
        assert_eq!(node.kind, NodeKind::Unbounded);
    }
}
