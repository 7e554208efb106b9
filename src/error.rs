use thiserror::Error;

use crate::{cfg::NodeId, context::ContextId};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure mode of an analysis run is represented as a distinct variant so that drivers
/// can react appropriately. All variants indicate a *signaled* failure: the solver never
/// silently truncates or corrupts a result. Partially analyzed contexts are not an error at
/// all — they are reported as a diagnostic on the returned
/// [`DataFlowSolution`](crate::solution::DataFlowSolution).
///
/// # Error Categories
///
/// ## Client contract violations
/// - [`Error::UnresolvedEntryPoint`] - An entry point has no boundary value
/// - [`Error::InconsistentContextLookup`] - The client's value equality is broken
/// - [`Error::IterationLimit`] - The termination heuristic tripped
///
/// ## Program model misuse
/// - [`Error::NodeOutOfBounds`] - An edge references a node the graph does not have
/// - [`Error::EmptyGraph`] - A method's control flow graph has no nodes
///
/// ## Internal scheduling guards
/// - [`Error::ContextReclaimed`] - A reclaimed context's value tables were touched again
#[derive(Error, Debug)]
pub enum Error {
    /// A program entry point has no defined boundary value.
    ///
    /// Raised before any context is seeded: the run aborts without producing a
    /// solution. The client's `boundary_value` returned `None` for a method that
    /// the program representation listed as an entry point.
    #[error("entry point `{method}` has no boundary value")]
    UnresolvedEntryPoint {
        /// Debug rendering of the offending entry-point method.
        method: String,
    },

    /// A context lookup by (method, boundary value) matched more than one context.
    ///
    /// The context store guarantees at most one context per (method, boundary value)
    /// key, so multiple matches mean the abstract value's equality implementation is
    /// not a consistent structural equality. Fatal: the fixpoint cannot be trusted.
    #[error("context lookup for `{method}` matched {matches} contexts with equal boundary values")]
    InconsistentContextLookup {
        /// Debug rendering of the method whose contexts were searched.
        method: String,
        /// How many contexts matched the lookup key.
        matches: usize,
    },

    /// The configured iteration cap was exceeded.
    ///
    /// The framework cannot prove termination for a client domain; this cap is the
    /// heuristic backstop against infinite-height lattices or non-monotone flow
    /// functions. The run is aborted and reported as incomplete rather than
    /// silently truncated. See [`SolverConfig`](crate::solver::SolverConfig).
    #[error("iteration limit of {0} steps exceeded; the analysis domain may not terminate")]
    IterationLimit(u64),

    /// An edge endpoint is outside the graph's node range.
    #[error("node {node} is out of bounds for a graph with {node_count} nodes")]
    NodeOutOfBounds {
        /// The offending node.
        node: NodeId,
        /// Number of nodes in the graph.
        node_count: usize,
    },

    /// A method's control flow graph has no nodes.
    ///
    /// Every analyzable method must have at least one node; a context over an
    /// empty graph could never stabilize.
    #[error("control flow graph of `{method}` has no nodes")]
    EmptyGraph {
        /// Debug rendering of the method with the empty graph.
        method: String,
    },

    /// A reclaimed context's value tables were accessed again.
    ///
    /// On-the-fly reclamation releases the tables of contexts that can no longer
    /// be reactivated. If this error surfaces, a context that was still needed got
    /// reclaimed — a work-list scheduling bug, not a recoverable condition.
    #[error("context {0} has been reclaimed; its value tables are no longer available")]
    ContextReclaimed(ContextId),
}

/// Result type alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;
