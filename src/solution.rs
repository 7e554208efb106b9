//! Read-only projection of a finished analysis.
//!
//! Once a solver run terminates, its context store is frozen into a
//! [`DataFlowSolution`]: per-(context, node) values, per-context summaries, the
//! full method/context index, and the partial-analysis diagnostic. The
//! projection is sufficient to reconstruct a meet-over-all-valid-paths result
//! per method — either per individual context or merged across every context of
//! a method via the [`merged_value_before`](DataFlowSolution::merged_value_before)
//! family.

use std::{collections::HashMap, hash::Hash};

use crate::{
    cfg::NodeId,
    context::{Context, ContextId},
    lattice::MeetSemiLattice,
};

/// The stabilized values of one analysis run.
///
/// Values of contexts released by on-the-fly reclamation are absent
/// (accessors return `None`); their entry/exit summaries remain available.
#[derive(Debug)]
pub struct DataFlowSolution<M, A> {
    contexts: Vec<Context<M, A>>,
    by_method: HashMap<M, Vec<ContextId>>,
    partial: Vec<ContextId>,
}

impl<M, A> DataFlowSolution<M, A> {
    pub(crate) fn new(
        contexts: Vec<Context<M, A>>,
        by_method: HashMap<M, Vec<ContextId>>,
        partial: Vec<ContextId>,
    ) -> Self {
        Self {
            contexts,
            by_method,
            partial,
        }
    }

    /// Returns a context by id.
    #[must_use]
    pub fn context(&self, id: ContextId) -> Option<&Context<M, A>> {
        self.contexts.get(id.index())
    }

    /// Iterates over all contexts in creation order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context<M, A>> {
        self.contexts.iter()
    }

    /// Returns the total number of contexts the run created.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Returns contexts whose analyzed flag never latched by run completion.
    ///
    /// A non-empty result signals a scheduling anomaly (see the error-handling
    /// notes on [`Error::ContextReclaimed`](crate::Error::ContextReclaimed)) or
    /// a method whose graph has no summary nodes; the values of the affected
    /// contexts are whatever had been computed when the work-list drained.
    #[must_use]
    pub fn partially_analyzed(&self) -> &[ContextId] {
        &self.partial
    }

    /// Returns the stabilized value before a node, if the context still holds
    /// its tables.
    #[must_use]
    pub fn value_before(&self, context: ContextId, node: NodeId) -> Option<&A> {
        self.context(context)?.value_before(node)
    }

    /// Returns the stabilized value after a node, if the context still holds
    /// its tables.
    #[must_use]
    pub fn value_after(&self, context: ContextId, node: NodeId) -> Option<&A> {
        self.context(context)?.value_after(node)
    }

    /// Returns a context's boundary value.
    #[must_use]
    pub fn entry_value(&self, context: ContextId) -> Option<&A> {
        self.context(context).map(Context::entry_value)
    }

    /// Returns a context's exit summary.
    #[must_use]
    pub fn exit_value(&self, context: ContextId) -> Option<&A> {
        self.context(context).map(Context::exit_value)
    }
}

impl<M, A> DataFlowSolution<M, A>
where
    M: Eq + Hash,
{
    /// Returns the ids of every context of a method, in creation order.
    #[must_use]
    pub fn contexts_of(&self, method: &M) -> &[ContextId] {
        self.by_method.get(method).map_or(&[], Vec::as_slice)
    }

    /// Iterates over all analyzed methods.
    pub fn methods(&self) -> impl Iterator<Item = &M> {
        self.by_method.keys()
    }
}

impl<M, A> DataFlowSolution<M, A>
where
    M: Eq + Hash,
    A: MeetSemiLattice,
{
    /// The meet-over-valid-paths value before a node, merged across every
    /// context of the method that still holds its tables.
    ///
    /// Returns `None` for unknown methods and when no surviving context has a
    /// value at the node.
    #[must_use]
    pub fn merged_value_before(&self, method: &M, node: NodeId) -> Option<A> {
        self.merged(method, node, Context::value_before)
    }

    /// The meet-over-valid-paths value after a node, merged across every
    /// context of the method that still holds its tables.
    #[must_use]
    pub fn merged_value_after(&self, method: &M, node: NodeId) -> Option<A> {
        self.merged(method, node, Context::value_after)
    }

    fn merged(
        &self,
        method: &M,
        node: NodeId,
        read: impl Fn(&Context<M, A>, NodeId) -> Option<&A>,
    ) -> Option<A> {
        let mut merged: Option<A> = None;
        for &id in self.contexts_of(method) {
            if let Some(value) = read(&self.contexts[id.index()], node) {
                merged = Some(match merged {
                    None => value.clone(),
                    Some(acc) => acc.meet(value),
                });
            }
        }
        merged
    }
}
