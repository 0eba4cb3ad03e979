use approx::assert_abs_diff_eq;
use rilp::{
    BranchAndBound, Constraint, IpStatus, LinearForm, OptDir, Program, Relation, SolverConfig,
    SolverError, VarRange,
};

fn con(terms: &[(f64, usize)], relation: Relation, rhs: f64) -> Constraint {
    Constraint::new(LinearForm::from_terms(terms), relation, rhs)
}

// max 3x + y  s.t.  4x + 2y <= 11, x >= 2, y >= 2: the bounds alone force
// 4*2 + 2*2 = 12 > 11.
#[test]
fn bounds_can_cut_away_every_integer_point() {
    let mut program = Program::new(OptDir::Max, &[(3.0, "x"), (1.0, "y")]).unwrap();
    program
        .add_constraint(&[(4.0, "x"), (2.0, "y")], Relation::Le, 11.0)
        .unwrap()
        .bound("x", 2, f64::INFINITY)
        .unwrap()
        .bound("y", 2, f64::INFINITY)
        .unwrap();

    let solution = program.solve().unwrap();
    assert_eq!(solution.status, IpStatus::Infeasible);
    assert!(solution.assignments().is_empty());
}

// max 3x + y  s.t.  4x + 2y <= 11, x in [1, 2]: the relaxation peaks at
// (2, 1.5) = 7.5 and branching on y lands on (2, 1) = 7.
#[test]
fn branching_rounds_a_fractional_relaxation() {
    let mut program = Program::new(OptDir::Max, &[(3.0, "x"), (1.0, "y")]).unwrap();
    program
        .add_constraint(&[(4.0, "x"), (2.0, "y")], Relation::Le, 11.0)
        .unwrap()
        .bound("x", 1, 2)
        .unwrap();

    let solution = program.solve().unwrap();
    assert_eq!(solution.status, IpStatus::Bounded);
    assert_abs_diff_eq!(solution.extremum, 7.0, epsilon = 1e-6);
    assert_eq!(solution.value("x"), Some(2));
    assert_eq!(solution.value("y"), Some(1));
}

// min x + y  s.t.  x + y >= 3: the relaxation vertex (3, 0) is already
// integral, so the answer comes from the root alone.
#[test]
fn integral_relaxation_skips_branching() {
    let mut program = Program::new(OptDir::Min, &[(1.0, "x"), (1.0, "y")]).unwrap();
    program
        .add_constraint(&[(1.0, "x"), (1.0, "y")], Relation::Ge, 3.0)
        .unwrap();

    let solution = program.solve().unwrap();
    assert_eq!(solution.status, IpStatus::Bounded);
    assert_abs_diff_eq!(solution.extremum, 3.0, epsilon = 1e-6);
    assert_eq!(solution.nodes_solved, 1);
}

#[test]
fn unbounded_integer_program_aborts() {
    let mut program = Program::new(OptDir::Max, &[(1.0, "x")]).unwrap();
    program
        .add_constraint(&[(1.0, "x"), (-1.0, "y")], Relation::Le, 1.0)
        .unwrap();

    let solution = program.solve().unwrap();
    assert_eq!(solution.status, IpStatus::Unbounded);
    assert_eq!(solution.extremum, f64::INFINITY);
}

#[test]
fn negating_the_objective_flips_the_extremum() {
    let cons = vec![
        con(&[(7.0, 0), (5.0, 1)], Relation::Le, 31.0),
        con(&[(2.0, 0), (9.0, 1)], Relation::Le, 29.0),
    ];
    let obj = LinearForm::from_terms(&[(6.0, 0), (5.0, 1)]);

    let max = BranchAndBound::new(
        OptDir::Max,
        obj.clone(),
        cons.clone(),
        2,
        SolverConfig::sequential(),
    )
    .unwrap()
    .solve();
    let min = BranchAndBound::new(OptDir::Min, -obj, cons, 2, SolverConfig::sequential())
        .unwrap()
        .solve();

    assert_eq!(max.status, IpStatus::Bounded);
    assert_eq!(min.status, IpStatus::Bounded);
    assert_abs_diff_eq!(max.extremum, -min.extremum, epsilon = 1e-6);
    for (a, b) in max.solution.iter().zip(&min.solution) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

// The integer optimum respects every row and bound, and is integral within
// tolerance.
#[test]
fn incumbents_satisfy_the_whole_problem() {
    let cons = vec![
        con(&[(7.0, 0), (5.0, 1), (4.0, 2)], Relation::Le, 31.0),
        con(&[(2.0, 0), (9.0, 1), (3.0, 2)], Relation::Le, 29.0),
        con(&[(1.0, 0), (1.0, 1), (1.0, 2)], Relation::Ge, 2.0),
    ];
    let ranges = vec![
        VarRange::new(0.0, 3.0),
        VarRange::new(0.0, f64::INFINITY),
        VarRange::new(1.0, 5.0),
    ];

    let report = BranchAndBound::new(
        OptDir::Max,
        LinearForm::from_terms(&[(6.0, 0), (5.0, 1), (4.0, 2)]),
        cons.clone(),
        3,
        SolverConfig::sequential(),
    )
    .unwrap()
    .with_ranges(ranges.clone())
    .unwrap()
    .solve();

    assert_eq!(report.status, IpStatus::Bounded);
    for c in &cons {
        assert!(c.holds(&report.solution, 1e-6));
    }
    for (value, range) in report.solution.iter().zip(&ranges) {
        assert!(*value >= range.lo - 1e-6);
        assert!(*value <= range.hi + 1e-6);
        assert!((value - value.round()).abs() <= 1e-4);
    }
}

#[test]
fn sequential_and_parallel_search_agree() {
    let instances: Vec<(Vec<(f64, usize)>, Vec<Constraint>)> = vec![
        (
            vec![(6.0, 0), (5.0, 1), (4.0, 2)],
            vec![
                con(&[(7.0, 0), (5.0, 1), (4.0, 2)], Relation::Le, 31.0),
                con(&[(2.0, 0), (9.0, 1), (3.0, 2)], Relation::Le, 29.0),
            ],
        ),
        (
            vec![(3.0, 0), (4.0, 1), (2.0, 2)],
            vec![
                con(&[(2.0, 0), (3.0, 1), (1.0, 2)], Relation::Le, 13.0),
                con(&[(1.0, 0), (2.0, 1), (3.0, 2)], Relation::Le, 11.0),
            ],
        ),
        (
            vec![(5.0, 0), (7.0, 1)],
            vec![
                con(&[(3.0, 0), (4.0, 1)], Relation::Le, 19.0),
                con(&[(4.0, 0), (3.0, 1)], Relation::Ge, 6.0),
            ],
        ),
    ];

    for (obj, cons) in instances {
        let var_count = 1 + obj.iter().map(|&(_, v)| v).max().unwrap();

        let sequential = BranchAndBound::new(
            OptDir::Max,
            LinearForm::from_terms(&obj),
            cons.clone(),
            var_count,
            SolverConfig::sequential(),
        )
        .unwrap()
        .solve();

        let parallel = BranchAndBound::new(
            OptDir::Max,
            LinearForm::from_terms(&obj),
            cons,
            var_count,
            SolverConfig {
                parallel_search: true,
                parallel_elimination: false,
            },
        )
        .unwrap()
        .solve();

        assert_eq!(sequential.status, parallel.status);
        assert_abs_diff_eq!(sequential.extremum, parallel.extremum, epsilon = 1e-6);
    }
}

#[test]
fn malformed_problems_fail_before_solving() {
    let empty: [(f64, &str); 0] = [];
    assert!(matches!(
        Program::new(OptDir::Max, &empty),
        Err(SolverError::InvalidInput(_))
    ));

    assert!(matches!(
        "=>".parse::<Relation>(),
        Err(SolverError::InvalidInput(_))
    ));

    let mut program = Program::new(OptDir::Max, &[(1.0, "x")]).unwrap();
    assert!(program
        .add_constraint(&[(f64::NAN, "x")], Relation::Le, 1.0)
        .is_err());
}
