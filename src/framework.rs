//! Client analysis capability traits.
//!
//! A concrete analysis plugs into the solver by implementing one of two traits:
//!
//! - [`InterProceduralAnalysis`] for a pure forward or pure backward problem,
//!   selected by the associated [`Direction`] constant;
//! - [`BidirectionalAnalysis`] for a coupled pair of forward and backward
//!   problems whose flow functions may read each other's values.
//!
//! Either way the client supplies the abstract domain (via
//! [`MeetSemiLattice`](crate::lattice::MeetSemiLattice)), a boundary value per
//! entry point, and the four kinds of flow functions; the solver owns iteration,
//! context management, call-graph discovery, and memory reclamation.
//!
//! # Flow function kinds
//!
//! - **normal**: one non-call node, input to output.
//! - **call-entry**: value transfer from a call site into a callee; its result is
//!   the callee's boundary value and therefore the context key.
//! - **call-exit**: value transfer from a stabilized callee summary back to the
//!   call site.
//! - **call-local**: call-site-local value transfer independent of the callee
//!   (locals not involved in the call). This is also the sole effect applied for
//!   phantom calls and for calls whose targets have not stabilized yet.
//!
//! All flow functions must treat their inputs as immutable and return freshly
//! owned values; mutating an input in place would alias values stored at other
//! nodes.

use crate::{
    cfg::NodeId,
    context::Context,
    lattice::{MeetSemiLattice, Paired},
    program::ProgramRepresentation,
};

/// Direction of data flow analysis.
///
/// The direction determines which CFG edges a value propagates along, where the
/// boundary value applies (heads forward, tails backward), and which nodes form
/// the context summary (tails forward, heads backward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Information flows forward, from method entry to exit.
    ///
    /// Examples: reaching definitions, constant propagation, points-to analysis.
    Forward,

    /// Information flows backward, from method exit to entry.
    ///
    /// Examples: live variables, very busy expressions.
    Backward,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Dense index for per-direction storage.
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Forward => 0,
            Self::Backward => 1,
        }
    }
}

/// A context-sensitive inter-procedural analysis in a single direction.
///
/// Implementations describe *what* one instruction or call boundary does to an
/// abstract value; the [`InterProceduralSolver`](crate::solver::InterProceduralSolver)
/// supplies the fixpoint iteration over lazily discovered calling contexts.
///
/// For `DIRECTION == Direction::Backward` every signature keeps its meaning with
/// edges reversed: "input" is the value after the node in program order, the
/// boundary value applies at CFG tails, and the context summary (the "exit
/// value") is the stabilized value at method entry.
///
/// # Example
///
/// ```rust,ignore
/// struct SignAnalysis;
///
/// impl InterProceduralAnalysis<MyProgram> for SignAnalysis {
///     type Value = SignMap;
///     const DIRECTION: Direction = Direction::Forward;
///
///     fn boundary_value(&self, entry: &MethodRef) -> Option<SignMap> {
///         Some(SignMap::all_unknown(entry))
///     }
///
///     fn normal_flow(&self, ctx: &Context<MethodRef, SignMap>, node: NodeId, input: &SignMap) -> SignMap {
///         // transfer one statement
///     }
///     // ... call_entry_flow / call_exit_flow / call_local_flow
/// }
/// ```
pub trait InterProceduralAnalysis<P: ProgramRepresentation> {
    /// The abstract value domain of this analysis.
    type Value: MeetSemiLattice;

    /// The direction of this analysis.
    const DIRECTION: Direction;

    /// Returns the boundary value assumed at an entry-point method.
    ///
    /// Returning `None` signals that the entry point has no defined boundary
    /// value; the run aborts with
    /// [`Error::UnresolvedEntryPoint`](crate::Error::UnresolvedEntryPoint)
    /// before anything is seeded.
    fn boundary_value(&self, entry: &P::Method) -> Option<Self::Value>;

    /// Transfers a value across a non-call node.
    fn normal_flow(
        &self,
        context: &Context<P::Method, Self::Value>,
        node: NodeId,
        input: &Self::Value,
    ) -> Self::Value;

    /// Transfers a value from a call site into a callee.
    ///
    /// The result becomes the callee's boundary value, and thereby the key under
    /// which a target context is found or created.
    fn call_entry_flow(
        &self,
        context: &Context<P::Method, Self::Value>,
        target: &P::Method,
        node: NodeId,
        input: &Self::Value,
    ) -> Self::Value;

    /// Transfers a stabilized callee summary back to the call site.
    ///
    /// `exit_value` is the target context's summary: the meet over its tail
    /// outputs (forward) or head outputs (backward).
    fn call_exit_flow(
        &self,
        context: &Context<P::Method, Self::Value>,
        target: &P::Method,
        node: NodeId,
        exit_value: &Self::Value,
    ) -> Self::Value;

    /// Transfers call-site-local information across a call node.
    ///
    /// Applied alone for phantom calls and for calls none of whose targets have
    /// stabilized; combined (via meet) with the call-exit results otherwise.
    fn call_local_flow(
        &self,
        context: &Context<P::Method, Self::Value>,
        node: NodeId,
        input: &Self::Value,
    ) -> Self::Value;
}

/// A coupled forward/backward context-sensitive inter-procedural analysis.
///
/// Both directions run over the same context set; per-node values are
/// [`Paired`], and each direction's flow functions receive the other direction's
/// most recently computed component at the node's after-point as an auxiliary
/// input (Gauss-Seidel coupling). Convergence requires the client's functions to
/// be monotone in both arguments.
///
/// A context is keyed by the *forward* component of its entry value together
/// with the *backward* component of its exit value: forward information enters a
/// method at its entry while backward information enters at its exit. Both
/// call-entry flow functions therefore return a full [`Paired`] key.
pub trait BidirectionalAnalysis<P: ProgramRepresentation> {
    /// The forward abstract value domain.
    type Forward: MeetSemiLattice;
    /// The backward abstract value domain.
    type Backward: MeetSemiLattice;

    /// Returns the forward boundary value at an entry-point method, or `None`
    /// if the entry point has no defined boundary value.
    fn forward_boundary_value(&self, entry: &P::Method) -> Option<Self::Forward>;

    /// Returns the backward boundary value at an entry-point method (the value
    /// assumed at its exit), or `None` if undefined.
    fn backward_boundary_value(&self, entry: &P::Method) -> Option<Self::Backward>;

    /// Transfers a forward value across a non-call node.
    ///
    /// `backward` is the backward component most recently computed at this
    /// node's after-point.
    fn forward_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        node: NodeId,
        input: &Self::Forward,
        backward: &Self::Backward,
    ) -> Self::Forward;

    /// Transfers a backward value across a non-call node.
    ///
    /// `forward` is the forward component most recently computed at this node's
    /// after-point.
    fn backward_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        node: NodeId,
        input: &Self::Backward,
        forward: &Self::Forward,
    ) -> Self::Backward;

    /// Computes the paired context key for a callee from a call site processed
    /// in the forward direction.
    ///
    /// The forward component is the callee's forward boundary value; the
    /// backward component is the value assumed at the callee's exit.
    fn forward_call_entry_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        target: &P::Method,
        node: NodeId,
        input: &Self::Forward,
        backward: &Self::Backward,
    ) -> Paired<Self::Forward, Self::Backward>;

    /// Computes the paired context key for a callee from a call site processed
    /// in the backward direction.
    fn backward_call_entry_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        target: &P::Method,
        node: NodeId,
        input: &Self::Backward,
        forward: &Self::Forward,
    ) -> Paired<Self::Forward, Self::Backward>;

    /// Transfers a forward-stable callee's exit summary back to the call site.
    ///
    /// Receives both components of the callee's exit value; returns the forward
    /// value after the call.
    fn forward_call_exit_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        target: &P::Method,
        node: NodeId,
        exit_value: &Self::Forward,
        exit_backward: &Self::Backward,
    ) -> Self::Forward;

    /// Transfers a backward-stable callee's entry summary back to the call site.
    ///
    /// Receives both components of the callee's entry value (the backward
    /// summary lives at the callee's entry); returns the backward value before
    /// the call.
    fn backward_call_exit_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        target: &P::Method,
        node: NodeId,
        summary: &Self::Backward,
        summary_forward: &Self::Forward,
    ) -> Self::Backward;

    /// Transfers call-site-local forward information across a call node.
    fn forward_call_local_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        node: NodeId,
        input: &Self::Forward,
        backward: &Self::Backward,
    ) -> Self::Forward;

    /// Transfers call-site-local backward information across a call node.
    fn backward_call_local_flow(
        &self,
        context: &Context<P::Method, Paired<Self::Forward, Self::Backward>>,
        node: NodeId,
        input: &Self::Backward,
        forward: &Self::Forward,
    ) -> Self::Backward;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Forward.opposite(), Direction::Backward);
        assert_eq!(Direction::Backward.opposite(), Direction::Forward);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Forward.to_string(), "forward");
        assert_eq!(Direction::Backward.to_string(), "backward");
    }
}
