#![deny(missing_docs)]

//! # interflow
//!
//! A framework for **context-sensitive inter-procedural data flow analysis**:
//! given a program's control flow graphs and entry points, it computes, for every
//! distinguishable calling context of every reachable method, the data flow value
//! before and after every node, to a fixpoint — with the call graph discovered
//! on the fly as call sites resolve.
//!
//! Clients plug in an abstract value type (a [`MeetSemiLattice`]) and four kinds
//! of flow functions; the framework supplies the work-list iteration, context
//! (clone) management, call-graph transition bookkeeping, and optional on-the-fly
//! memory reclamation.
//!
//! ## Features
//!
//! - **Value-based context sensitivity** - One context per (method, boundary
//!   value) pair, shared between all call sites producing the same entry value
//! - **Demand-driven call graph** - Contexts are synthesized lazily as call
//!   targets resolve; recursion closes through summary reactivation
//! - **Forward, backward and bidirectional** - One engine covers both pure
//!   directions; a coupled alternating-pass solver handles analyses whose
//!   directions feed each other
//! - **Pluggable program model** - The framework never parses programs; any
//!   representation implementing [`ProgramRepresentation`] works
//! - **Bounded memory** - Optional reclamation of stabilized contexts that can
//!   no longer be reactivated
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use interflow::prelude::*;
//!
//! // A client analysis: lattice + flow functions.
//! struct ConstantPropagation;
//!
//! impl InterProceduralAnalysis<MyProgram> for ConstantPropagation {
//!     type Value = ConstMap;
//!     const DIRECTION: Direction = Direction::Forward;
//!     // boundary_value / normal_flow / call_entry_flow / call_exit_flow /
//!     // call_local_flow ...
//! }
//!
//! let solution = InterProceduralSolver::new(&program, ConstantPropagation).solve()?;
//! for &ctx in solution.contexts_of(&main_method) {
//!     println!("exit value: {:?}", solution.exit_value(ctx));
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`program`] - The [`ProgramRepresentation`] capability the solver consumes
//! - [`lattice`] - The [`MeetSemiLattice`] value contract and the [`Paired`]
//!   combinator for bidirectional domains
//! - [`framework`] - The client analysis traits and [`Direction`]
//! - [`cfg`] - Per-method control flow graphs over dense [`NodeId`]s
//! - [`context`] - [`Context`] clones, their value tables and work-lists
//! - [`store`] - The context arena with value-keyed lookup
//! - [`transitions`] - Call-site/context transition bookkeeping
//! - [`solver`] - The fixpoint engines and [`SolverConfig`]
//! - [`solution`] - The read-only [`DataFlowSolution`] projection
//!
//! ## Termination
//!
//! The framework guarantees a fixpoint only for monotone flow functions over
//! finite-height lattices; it cannot verify either property. A configurable
//! step cap ([`SolverConfig::max_steps`]) turns runaway domains into
//! [`Error::IterationLimit`] instead of a hang.

pub mod cfg;
pub mod context;
pub mod framework;
pub mod lattice;
pub mod prelude;
pub mod program;
pub mod solution;
pub mod solver;
pub mod store;
pub mod transitions;

mod error;

pub use cfg::{ControlFlowGraph, NodeId};
pub use context::{CallSite, Context, ContextFlags, ContextId};
pub use error::{Error, Result};
pub use framework::{BidirectionalAnalysis, Direction, InterProceduralAnalysis};
pub use lattice::{MeetSemiLattice, Paired};
pub use program::ProgramRepresentation;
pub use solution::DataFlowSolution;
pub use solver::{BidirectionalSolver, InterProceduralSolver, SolverConfig};
pub use store::ContextStore;
pub use transitions::ContextTransitions;
