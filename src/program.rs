//! The program representation capability.
//!
//! The solver never parses or loads programs and never resolves virtual dispatch
//! itself. Everything it needs to know about the analyzed program comes through
//! the [`ProgramRepresentation`] trait: which methods are entry points, what each
//! method's control flow graph looks like, which nodes are calls, and what a call
//! may dispatch to. A front-end over bytecode, an IR, or a hand-built test
//! fixture all plug in the same way.

use std::{fmt::Debug, hash::Hash};

use crate::{
    cfg::{ControlFlowGraph, NodeId},
    Result,
};

/// A client-supplied view of the program under analysis.
///
/// The solver queries this capability lazily: control flow graphs are requested
/// the first time a context is created for a method, and call targets are
/// resolved every time a call node is processed (so a representation backed by a
/// refining call graph may return more targets over time, though most return a
/// fixed set).
///
/// # Type Parameters
///
/// * `Method` - The client's method handle. Cheap to clone; hashing and equality
///   identify a method uniquely.
pub trait ProgramRepresentation {
    /// The client's method identifier type.
    type Method: Clone + Eq + Hash + Debug;

    /// Returns the program's entry-point methods.
    ///
    /// Each entry point is seeded with one context holding the analysis's
    /// boundary value for it.
    fn entry_points(&self) -> Vec<Self::Method>;

    /// Builds the control flow graph of a method.
    ///
    /// Called at most once per method per analysis run; the result is cached and
    /// shared between all contexts of the method.
    ///
    /// # Errors
    ///
    /// Implementations may fail for methods they cannot provide a body for; the
    /// error aborts the run.
    fn control_flow_graph(&self, method: &Self::Method) -> Result<ControlFlowGraph>;

    /// Returns `true` if the node is a call site in the given method.
    fn is_call(&self, method: &Self::Method, node: NodeId) -> bool;

    /// Resolves the possible targets of a call node.
    ///
    /// An empty result marks a *phantom* call: a call whose callee is unknown or
    /// deliberately not modeled. The solver treats phantom calls as opaque
    /// pass-throughs via the call-local flow function and creates no context for
    /// them.
    fn resolve_targets(&self, method: &Self::Method, node: NodeId) -> Vec<Self::Method>;
}
