//! Per-method control flow graphs.
//!
//! The solver is generic over the client's program representation, but it needs a
//! concrete graph shape to drive node work-lists: numbered nodes with predecessor
//! and successor adjacency. [`ControlFlowGraph`] is that shape. The program
//! representation builds one graph per method (see
//! [`ProgramRepresentation::control_flow_graph`](crate::program::ProgramRepresentation::control_flow_graph));
//! the context store caches and shares it between all contexts of that method.
//!
//! Nodes are identified by [`NodeId`], a dense 0-based index. Clients map their own
//! instruction or statement representation onto node indices and interpret them in
//! their flow functions.

use std::{fmt, sync::OnceLock};

use crate::{framework::Direction, Error, Result};

/// A strongly-typed identifier for nodes within a method's control flow graph.
///
/// `NodeId` wraps a `usize` index, providing type safety to prevent accidental
/// mixing of node indices with other integer values. Node indices are dense and
/// 0-based within one method's graph; they carry no meaning across methods.
///
/// `NodeId` is [`Copy`], [`Ord`] and [`Hash`], so it can key ordered work-lists
/// and index per-node value tables directly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new `NodeId` from a raw index value.
    ///
    /// # Arguments
    ///
    /// * `index` - The raw node index (0-based)
    ///
    /// # Returns
    ///
    /// A new `NodeId` wrapping the provided index.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw index value of this node identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The control flow graph of a single method.
///
/// A `ControlFlowGraph` is a plain directed graph over [`NodeId`]s with
/// predecessor and successor adjacency, plus the derived *head* (no predecessors)
/// and *tail* (no successors) sets that anchor boundary values and summary
/// computation.
///
/// # Construction
///
/// ```rust
/// use interflow::cfg::{ControlFlowGraph, NodeId};
///
/// // A diamond: 0 -> {1, 2} -> 3
/// let mut cfg = ControlFlowGraph::new(4);
/// cfg.add_edge(NodeId::new(0), NodeId::new(1))?;
/// cfg.add_edge(NodeId::new(0), NodeId::new(2))?;
/// cfg.add_edge(NodeId::new(1), NodeId::new(3))?;
/// cfg.add_edge(NodeId::new(2), NodeId::new(3))?;
///
/// assert_eq!(cfg.heads(), &[NodeId::new(0)]);
/// assert_eq!(cfg.tails(), &[NodeId::new(3)]);
/// # Ok::<(), interflow::Error>(())
/// ```
///
/// # Mutation
///
/// Add all edges before querying [`heads`](Self::heads) or [`tails`](Self::tails)
/// or handing the graph to a solver: those sets are computed once on first access
/// and cached. The solver treats the graph as immutable.
#[derive(Debug)]
pub struct ControlFlowGraph {
    /// Predecessor adjacency, indexed by node.
    preds: Vec<Vec<NodeId>>,
    /// Successor adjacency, indexed by node.
    succs: Vec<Vec<NodeId>>,
    /// Lazily computed nodes with no predecessors.
    heads: OnceLock<Vec<NodeId>>,
    /// Lazily computed nodes with no successors.
    tails: OnceLock<Vec<NodeId>>,
}

impl ControlFlowGraph {
    /// Creates a graph with `node_count` nodes and no edges.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            preds: vec![Vec::new(); node_count],
            succs: vec![Vec::new(); node_count],
            heads: OnceLock::new(),
            tails: OnceLock::new(),
        }
    }

    /// Returns the number of nodes in this graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.succs.len()
    }

    /// Iterates over all node identifiers in index order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count()).map(NodeId::new)
    }

    /// Adds a directed control flow edge.
    ///
    /// Duplicate edges are ignored.
    ///
    /// # Arguments
    ///
    /// * `from` - The source node
    /// * `to` - The target node
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeOutOfBounds`] if either endpoint is not a node of
    /// this graph.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        let count = self.node_count();
        for node in [from, to] {
            if node.index() >= count {
                return Err(Error::NodeOutOfBounds {
                    node,
                    node_count: count,
                });
            }
        }
        if !self.succs[from.index()].contains(&to) {
            self.succs[from.index()].push(to);
            self.preds[to.index()].push(from);
        }
        Ok(())
    }

    /// Returns the predecessors of a node.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a node of this graph.
    #[must_use]
    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        &self.preds[node.index()]
    }

    /// Returns the successors of a node.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a node of this graph.
    #[must_use]
    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        &self.succs[node.index()]
    }

    /// Returns the head nodes: nodes with no predecessors.
    ///
    /// For a forward analysis these are the nodes that receive the context's
    /// boundary value. Computed on first access and cached.
    #[must_use]
    pub fn heads(&self) -> &[NodeId] {
        self.heads
            .get_or_init(|| self.node_ids().filter(|n| self.is_head(*n)).collect())
    }

    /// Returns the tail nodes: nodes with no successors.
    ///
    /// For a forward analysis the exit value is the meet over the tails' OUT
    /// values. Computed on first access and cached.
    #[must_use]
    pub fn tails(&self) -> &[NodeId] {
        self.tails
            .get_or_init(|| self.node_ids().filter(|n| self.is_tail(*n)).collect())
    }

    /// Returns `true` if the node has no predecessors.
    #[must_use]
    pub fn is_head(&self, node: NodeId) -> bool {
        self.preds[node.index()].is_empty()
    }

    /// Returns `true` if the node has no successors.
    #[must_use]
    pub fn is_tail(&self, node: NodeId) -> bool {
        self.succs[node.index()].is_empty()
    }

    /// Returns the nodes a value flows *from* in the given direction.
    ///
    /// Forward analysis pulls a node's input from its CFG predecessors; backward
    /// analysis pulls it from its CFG successors.
    #[must_use]
    pub fn flow_predecessors(&self, direction: Direction, node: NodeId) -> &[NodeId] {
        match direction {
            Direction::Forward => self.predecessors(node),
            Direction::Backward => self.successors(node),
        }
    }

    /// Returns the nodes a value flows *to* in the given direction.
    #[must_use]
    pub fn flow_successors(&self, direction: Direction, node: NodeId) -> &[NodeId] {
        match direction {
            Direction::Forward => self.successors(node),
            Direction::Backward => self.predecessors(node),
        }
    }

    /// Returns the nodes whose stabilized outputs form the context summary.
    ///
    /// Tails for a forward analysis, heads for a backward analysis.
    #[must_use]
    pub fn summary_nodes(&self, direction: Direction) -> &[NodeId] {
        match direction {
            Direction::Forward => self.tails(),
            Direction::Backward => self.heads(),
        }
    }

    /// Returns `true` if processing this node must (re)queue the end-of-method
    /// sentinel for the given direction.
    #[must_use]
    pub fn is_summary_source(&self, direction: Direction, node: NodeId) -> bool {
        match direction {
            Direction::Forward => self.is_tail(node),
            Direction::Backward => self.is_head(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> ControlFlowGraph {
        let mut cfg = ControlFlowGraph::new(4);
        cfg.add_edge(NodeId::new(0), NodeId::new(1)).unwrap();
        cfg.add_edge(NodeId::new(0), NodeId::new(2)).unwrap();
        cfg.add_edge(NodeId::new(1), NodeId::new(3)).unwrap();
        cfg.add_edge(NodeId::new(2), NodeId::new(3)).unwrap();
        cfg
    }

    #[test]
    fn test_adjacency() {
        let cfg = diamond();
        assert_eq!(cfg.node_count(), 4);
        assert_eq!(cfg.successors(NodeId::new(0)), &[NodeId::new(1), NodeId::new(2)]);
        assert_eq!(cfg.predecessors(NodeId::new(3)), &[NodeId::new(1), NodeId::new(2)]);
        assert!(cfg.predecessors(NodeId::new(0)).is_empty());
    }

    #[test]
    fn test_heads_and_tails() {
        let cfg = diamond();
        assert_eq!(cfg.heads(), &[NodeId::new(0)]);
        assert_eq!(cfg.tails(), &[NodeId::new(3)]);
        assert!(cfg.is_head(NodeId::new(0)));
        assert!(!cfg.is_head(NodeId::new(1)));
        assert!(cfg.is_tail(NodeId::new(3)));
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let mut cfg = ControlFlowGraph::new(2);
        cfg.add_edge(NodeId::new(0), NodeId::new(1)).unwrap();
        cfg.add_edge(NodeId::new(0), NodeId::new(1)).unwrap();
        assert_eq!(cfg.successors(NodeId::new(0)).len(), 1);
        assert_eq!(cfg.predecessors(NodeId::new(1)).len(), 1);
    }

    #[test]
    fn test_out_of_bounds_edge() {
        let mut cfg = ControlFlowGraph::new(2);
        let result = cfg.add_edge(NodeId::new(0), NodeId::new(5));
        assert!(matches!(result, Err(Error::NodeOutOfBounds { .. })));
    }

    #[test]
    fn test_direction_views() {
        let cfg = diamond();
        assert_eq!(
            cfg.flow_predecessors(Direction::Forward, NodeId::new(3)),
            cfg.predecessors(NodeId::new(3))
        );
        assert_eq!(
            cfg.flow_predecessors(Direction::Backward, NodeId::new(0)),
            cfg.successors(NodeId::new(0))
        );
        assert_eq!(cfg.summary_nodes(Direction::Forward), &[NodeId::new(3)]);
        assert_eq!(cfg.summary_nodes(Direction::Backward), &[NodeId::new(0)]);
        assert!(cfg.is_summary_source(Direction::Forward, NodeId::new(3)));
        assert!(cfg.is_summary_source(Direction::Backward, NodeId::new(0)));
    }

    #[test]
    fn test_fully_cyclic_graph_has_no_summary_nodes() {
        let mut cfg = ControlFlowGraph::new(2);
        cfg.add_edge(NodeId::new(0), NodeId::new(1)).unwrap();
        cfg.add_edge(NodeId::new(1), NodeId::new(0)).unwrap();
        assert!(cfg.heads().is_empty());
        assert!(cfg.tails().is_empty());
    }
}
