//! The work-list–driven fixpoint solvers.
//!
//! Two engines live here:
//!
//! - [`InterProceduralSolver`] runs a pure forward or pure backward analysis
//!   (the direction is a constant of the client's
//!   [`InterProceduralAnalysis`](crate::framework::InterProceduralAnalysis)
//!   implementation);
//! - [`BidirectionalSolver`] runs a coupled forward/backward analysis by
//!   alternating whole directional passes over a shared context set.
//!
//! Both drive the same nested fixpoint: a per-node fixpoint inside each
//! context, and a per-context fixpoint across a call graph discovered lazily as
//! call sites resolve. A solver instance is the unit of global mutable state —
//! context store, transition table and global work-list are its fields, tied to
//! one analysis execution.

mod bidirectional;
mod interprocedural;

pub use bidirectional::BidirectionalSolver;
pub use interprocedural::InterProceduralSolver;

/// Default step cap: roughly "something is wrong" territory for any domain a
/// single-threaded run is expected to finish.
const DEFAULT_STEP_LIMIT: u64 = 10_000_000;

/// Tuning knobs of a solver run.
///
/// # Example
///
/// ```rust
/// use interflow::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_reclamation()
///     .with_step_limit(100_000);
/// assert!(config.free_results_on_the_fly);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Release the value tables of stabilized contexts whose callee closure has
    /// no pending work. Bounds peak memory on large programs; never changes the
    /// computed summaries.
    pub free_results_on_the_fly: bool,
    /// Abort with [`Error::IterationLimit`](crate::Error::IterationLimit) after
    /// this many node-processing steps. `None` disables the heuristic entirely
    /// — only safe for domains with a proven finite height.
    pub max_steps: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            free_results_on_the_fly: false,
            max_steps: Some(DEFAULT_STEP_LIMIT),
        }
    }
}

impl SolverConfig {
    /// Enables on-the-fly memory reclamation.
    #[must_use]
    pub const fn with_reclamation(mut self) -> Self {
        self.free_results_on_the_fly = true;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub const fn with_step_limit(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Disables the iteration cap.
    #[must_use]
    pub const fn without_step_limit(mut self) -> Self {
        self.max_steps = None;
        self
    }
}
