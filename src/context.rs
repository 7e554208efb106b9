//! Analysis contexts: per-(method, boundary value) clones of a method.
//!
//! Context sensitivity means a method is analyzed once per distinguishable
//! boundary value flowing into it. A [`Context`] is one such clone: it owns the
//! per-node before/after value tables, the node work-lists that schedule its
//! re-computation, its exit summary, and its lifecycle flags. Contexts are
//! identified by [`ContextId`] — a dense arena index assigned by the
//! [`ContextStore`](crate::store::ContextStore) — and refer to each other only
//! through ids, never owning references, so call-graph cycles cost nothing.

use std::{collections::BTreeSet, fmt, sync::Arc};

use bitflags::bitflags;

use crate::{
    cfg::{ControlFlowGraph, NodeId},
    framework::Direction,
    lattice::MeetSemiLattice,
    Error, Result,
};

/// A strongly-typed identifier for analysis contexts.
///
/// Ids are assigned sequentially in creation order, so their ordering doubles
/// as a "newest first" priority for the global work-list.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(pub(crate) usize);

impl ContextId {
    /// Creates a new `ContextId` from a raw index value.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        ContextId(index)
    }

    /// Returns the raw index value of this context identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({})", self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// A call site: a call node within a particular calling context.
///
/// Call sites key the call-graph transition table. Two sites are the same site
/// exactly when both the calling context and the node coincide; many sites may
/// map to the same target context (that sharing is the point of value-based
/// context sensitivity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallSite {
    /// The calling context.
    pub context: ContextId,
    /// The call node within the calling context's method.
    pub node: NodeId,
}

impl CallSite {
    /// Creates a new call site.
    #[must_use]
    pub const fn new(context: ContextId, node: NodeId) -> Self {
        Self { context, node }
    }
}

bitflags! {
    /// Lifecycle flags of a context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ContextFlags: u8 {
        /// The forward sentinel has run at least once: the exit value's forward
        /// component is a sound (monotonically accumulated) summary. Sticky.
        const FORWARD_SUMMARIZED = 1;
        /// The backward sentinel has run at least once. Sticky.
        const BACKWARD_SUMMARIZED = 1 << 1;
        /// The context is currently fully analyzed: summarized with no pending
        /// work. Cleared whenever a node is re-enqueued, re-set when the
        /// context restabilizes.
        const ANALYZED = 1 << 2;
        /// The context's value tables have been released by on-the-fly
        /// reclamation. Entry/exit values and flags survive.
        const RECLAIMED = 1 << 3;
    }
}

/// An entry popped off a context's node work-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkItem {
    /// An ordinary CFG node pending (re)computation.
    Node(NodeId),
    /// The synthetic end-of-method marker: compute the exit value and notify
    /// callers. Always ordered after every real node.
    Sentinel,
}

/// A deduplicating ordered set of pending nodes plus the end-of-method sentinel.
#[derive(Debug, Default)]
pub(crate) struct NodeWorklist {
    nodes: BTreeSet<NodeId>,
    sentinel: bool,
}

impl NodeWorklist {
    pub(crate) fn insert(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    pub(crate) fn insert_sentinel(&mut self) {
        self.sentinel = true;
    }

    /// Pops the next item: nodes in flow order first, the sentinel last.
    pub(crate) fn pop(&mut self, direction: Direction) -> Option<WorkItem> {
        let node = match direction {
            Direction::Forward => self.nodes.pop_first(),
            Direction::Backward => self.nodes.pop_last(),
        };
        if let Some(node) = node {
            return Some(WorkItem::Node(node));
        }
        if self.sentinel {
            self.sentinel = false;
            return Some(WorkItem::Sentinel);
        }
        None
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty() && !self.sentinel
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.sentinel = false;
    }
}

/// Per-node before/after value tables. Released as a unit by reclamation.
#[derive(Debug)]
struct ValueTables<A> {
    before: Vec<A>,
    after: Vec<A>,
}

/// One analyzed clone of a method for one boundary value.
///
/// A context owns everything private to its fixpoint: the value before and
/// after every node of its method's control flow graph, one node work-list per
/// direction, its entry (boundary) value and exit (summary) value, and its
/// lifecycle flags. It is mutated only by the solver run that created it.
///
/// For a forward analysis the entry value is the value at method entry and the
/// exit value summarizes the tails; for a backward analysis the entry value is
/// the boundary at the tails and the exit value summarizes the heads. For a
/// bidirectional analysis the value type is
/// [`Paired`](crate::lattice::Paired) and the conventions combine: the entry
/// value holds (forward boundary, backward summary) and the exit value holds
/// (forward summary, backward boundary).
#[derive(Debug)]
pub struct Context<M, A> {
    id: ContextId,
    method: M,
    cfg: Arc<ControlFlowGraph>,
    entry_value: A,
    exit_value: A,
    tables: Option<ValueTables<A>>,
    work: [NodeWorklist; 2],
    flags: ContextFlags,
}

impl<M, A: MeetSemiLattice> Context<M, A> {
    /// Creates a context with all per-node values at top and empty work-lists.
    pub(crate) fn new(
        id: ContextId,
        method: M,
        cfg: Arc<ControlFlowGraph>,
        entry_value: A,
        exit_value: A,
    ) -> Self {
        let node_count = cfg.node_count();
        Self {
            id,
            method,
            cfg,
            entry_value,
            exit_value,
            tables: Some(ValueTables {
                before: vec![A::top(); node_count],
                after: vec![A::top(); node_count],
            }),
            work: [NodeWorklist::default(), NodeWorklist::default()],
            flags: ContextFlags::empty(),
        }
    }
}

impl<M, A> Context<M, A> {
    /// Returns this context's identifier.
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Returns the method this context is a clone of.
    #[must_use]
    pub fn method(&self) -> &M {
        &self.method
    }

    /// Returns the method's control flow graph.
    #[must_use]
    pub fn cfg(&self) -> &ControlFlowGraph {
        &self.cfg
    }

    pub(crate) fn cfg_arc(&self) -> Arc<ControlFlowGraph> {
        Arc::clone(&self.cfg)
    }

    /// Returns the boundary value this context was created for.
    #[must_use]
    pub fn entry_value(&self) -> &A {
        &self.entry_value
    }

    /// Returns the context's summary value as seen by callers.
    ///
    /// Only meaningful once the context has stabilized in the relevant
    /// direction; before that it is whatever it was initialized to (top).
    #[must_use]
    pub fn exit_value(&self) -> &A {
        &self.exit_value
    }

    /// Returns the current lifecycle flags.
    #[must_use]
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    /// Returns `true` once this context has been fully analyzed and not
    /// reactivated since.
    #[must_use]
    pub fn is_analyzed(&self) -> bool {
        self.flags.contains(ContextFlags::ANALYZED)
    }

    /// Returns `true` if this direction's sentinel has run at least once, i.e.
    /// the corresponding summary component is a sound approximation callers
    /// may consume.
    #[must_use]
    pub fn is_summarized(&self, direction: Direction) -> bool {
        self.flags.contains(Self::summarized_flag(direction))
    }

    const fn summarized_flag(direction: Direction) -> ContextFlags {
        match direction {
            Direction::Forward => ContextFlags::FORWARD_SUMMARIZED,
            Direction::Backward => ContextFlags::BACKWARD_SUMMARIZED,
        }
    }

    /// Returns `true` if this context's value tables were released by
    /// on-the-fly reclamation.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.flags.contains(ContextFlags::RECLAIMED)
    }

    /// Returns the value before the node in program order, if the tables are
    /// still held and the node is in range.
    #[must_use]
    pub fn value_before(&self, node: NodeId) -> Option<&A> {
        self.tables.as_ref()?.before.get(node.index())
    }

    /// Returns the value after the node in program order, if the tables are
    /// still held and the node is in range.
    #[must_use]
    pub fn value_after(&self, node: NodeId) -> Option<&A> {
        self.tables.as_ref()?.after.get(node.index())
    }

    pub(crate) fn before_ref(&self, node: NodeId) -> Result<&A> {
        self.value_before(node).ok_or(Error::ContextReclaimed(self.id))
    }

    pub(crate) fn after_ref(&self, node: NodeId) -> Result<&A> {
        self.value_after(node).ok_or(Error::ContextReclaimed(self.id))
    }

    pub(crate) fn set_before(&mut self, node: NodeId, value: A) -> Result<()> {
        let tables = self.tables.as_mut().ok_or(Error::ContextReclaimed(self.id))?;
        tables.before[node.index()] = value;
        Ok(())
    }

    pub(crate) fn set_after(&mut self, node: NodeId, value: A) -> Result<()> {
        let tables = self.tables.as_mut().ok_or(Error::ContextReclaimed(self.id))?;
        tables.after[node.index()] = value;
        Ok(())
    }

    /// The value flowing *out of* the node for the given direction: after in
    /// program order for forward, before for backward.
    pub(crate) fn output_ref(&self, direction: Direction, node: NodeId) -> Result<&A> {
        match direction {
            Direction::Forward => self.after_ref(node),
            Direction::Backward => self.before_ref(node),
        }
    }

    pub(crate) fn set_input(&mut self, direction: Direction, node: NodeId, value: A) -> Result<()> {
        match direction {
            Direction::Forward => self.set_before(node, value),
            Direction::Backward => self.set_after(node, value),
        }
    }

    pub(crate) fn set_output(&mut self, direction: Direction, node: NodeId, value: A) -> Result<()> {
        match direction {
            Direction::Forward => self.set_after(node, value),
            Direction::Backward => self.set_before(node, value),
        }
    }

    pub(crate) fn set_entry_value(&mut self, value: A) {
        self.entry_value = value;
    }

    pub(crate) fn set_exit_value(&mut self, value: A) {
        self.exit_value = value;
    }

    /// Queues a node for (re)computation in the given direction.
    ///
    /// Re-enqueueing un-stabilizes the context: the analyzed flag is cleared
    /// until the context restabilizes. The sticky summarized flags survive —
    /// the existing summary remains a sound approximation for callers while
    /// the context is re-driven.
    pub(crate) fn enqueue(&mut self, direction: Direction, node: NodeId) {
        self.work[direction.index()].insert(node);
        self.flags.remove(ContextFlags::ANALYZED);
    }

    /// Queues the end-of-method sentinel for the given direction (idempotent).
    pub(crate) fn enqueue_sentinel(&mut self, direction: Direction) {
        self.work[direction.index()].insert_sentinel();
    }

    /// Queues every node of the method, in order. Used once at creation.
    pub(crate) fn seed_worklist(&mut self, direction: Direction) {
        for node in self.cfg.node_ids() {
            self.work[direction.index()].insert(node);
        }
    }

    pub(crate) fn pop_work(&mut self, direction: Direction) -> Option<WorkItem> {
        self.work[direction.index()].pop(direction)
    }

    /// Returns `true` if the direction's node work-list (sentinel included) is
    /// empty.
    #[must_use]
    pub fn worklist_is_empty(&self, direction: Direction) -> bool {
        self.work[direction.index()].is_empty()
    }

    pub(crate) fn mark_summarized(&mut self, direction: Direction) {
        self.flags.insert(Self::summarized_flag(direction));
    }

    pub(crate) fn mark_analyzed(&mut self) {
        self.flags.insert(ContextFlags::ANALYZED);
    }

    /// Releases the value tables and work-lists; entry/exit values, the method
    /// and the flags survive so callers can still consume the summary.
    pub(crate) fn release(&mut self) {
        self.tables = None;
        self.work[0].clear();
        self.work[1].clear();
        self.flags.insert(ContextFlags::RECLAIMED);
    }
}
