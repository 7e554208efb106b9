//! # interflow Prelude
//!
//! Convenient re-exports of the types and traits nearly every client of the
//! library touches: the analysis capability traits, the solvers, and the
//! solution surface.
//!
//! ```rust
//! use interflow::prelude::*;
//! ```

/// The error type for all interflow operations.
pub use crate::Error;

/// The result type used throughout interflow.
pub use crate::Result;

/// Node identifiers within a method's control flow graph.
pub use crate::cfg::NodeId;

/// Per-method control flow graphs.
pub use crate::cfg::ControlFlowGraph;

/// The abstract value contract.
pub use crate::lattice::MeetSemiLattice;

/// Paired forward/backward values for bidirectional analyses.
pub use crate::lattice::Paired;

/// The program model capability.
pub use crate::program::ProgramRepresentation;

/// Analysis direction selector.
pub use crate::framework::Direction;

/// The unidirectional client analysis trait.
pub use crate::framework::InterProceduralAnalysis;

/// The coupled forward/backward client analysis trait.
pub use crate::framework::BidirectionalAnalysis;

/// One analyzed (method, boundary value) clone.
pub use crate::context::Context;

/// Context identifiers.
pub use crate::context::ContextId;

/// The unidirectional fixpoint solver.
pub use crate::solver::InterProceduralSolver;

/// The coupled forward/backward fixpoint solver.
pub use crate::solver::BidirectionalSolver;

/// Solver tuning knobs.
pub use crate::solver::SolverConfig;

/// The read-only result projection.
pub use crate::solution::DataFlowSolution;
