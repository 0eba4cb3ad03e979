/// Execution knobs, threaded through the solver constructors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Run tableau elimination row-parallel instead of scalar.
    pub parallel_elimination: bool,
    /// Expand branch-and-bound nodes on a worker pool instead of in order.
    pub parallel_search: bool,
}

impl SolverConfig {
    /// Scalar elimination, sequential node expansion.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Both acceleration paths on. The elimination pool and the node pool
    /// share one process-wide thread budget; see the crate docs before
    /// combining them on small machines.
    pub fn parallel() -> Self {
        Self {
            parallel_elimination: true,
            parallel_search: true,
        }
    }
}
