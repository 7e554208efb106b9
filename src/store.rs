//! The context store: arena and value-keyed index of all contexts in a run.
//!
//! Contexts live in a flat arena indexed by [`ContextId`]; a per-method index
//! supports the value-based lookup that decides whether a call site reuses an
//! existing context or synthesizes a new one. The store also caches each
//! method's control flow graph so every context of a method shares one
//! [`Arc`]'d graph.

use std::{collections::HashMap, fmt::Debug, hash::Hash, sync::Arc};

use crate::{
    cfg::ControlFlowGraph,
    context::{Context, ContextId},
    lattice::MeetSemiLattice,
    program::ProgramRepresentation,
    Error, Result,
};

/// Arena and index of every context created during one analysis run.
///
/// The store is one of the three pieces of global mutable solver state (with
/// the transition table and the global work-list); all of them live inside a
/// solver object whose lifetime is a single analysis execution.
#[derive(Debug)]
pub struct ContextStore<M, A> {
    contexts: Vec<Context<M, A>>,
    by_method: HashMap<M, Vec<ContextId>>,
    cfg_cache: HashMap<M, Arc<ControlFlowGraph>>,
}

impl<M, A> Default for ContextStore<M, A> {
    fn default() -> Self {
        Self {
            contexts: Vec::new(),
            by_method: HashMap::new(),
            cfg_cache: HashMap::new(),
        }
    }
}

impl<M, A> ContextStore<M, A>
where
    M: Clone + Eq + Hash + Debug,
    A: MeetSemiLattice,
{
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached control flow graph of a method, building it through
    /// the program representation on first request.
    ///
    /// # Errors
    ///
    /// Propagates the program representation's failure, or returns
    /// [`Error::EmptyGraph`] for a graph with no nodes.
    pub fn control_flow_graph<P>(
        &mut self,
        program: &P,
        method: &M,
    ) -> Result<Arc<ControlFlowGraph>>
    where
        P: ProgramRepresentation<Method = M>,
    {
        if let Some(cfg) = self.cfg_cache.get(method) {
            return Ok(Arc::clone(cfg));
        }
        let cfg = program.control_flow_graph(method)?;
        if cfg.node_count() == 0 {
            return Err(Error::EmptyGraph {
                method: format!("{method:?}"),
            });
        }
        let cfg = Arc::new(cfg);
        self.cfg_cache.insert(method.clone(), Arc::clone(&cfg));
        Ok(cfg)
    }

    /// Creates a context and registers it in the per-method index.
    ///
    /// The caller is responsible for having checked that no context with an
    /// equal key already exists (see [`lookup`](Self::lookup)).
    pub(crate) fn create(
        &mut self,
        method: M,
        cfg: Arc<ControlFlowGraph>,
        entry_value: A,
        exit_value: A,
    ) -> ContextId {
        let id = ContextId::new(self.contexts.len());
        self.by_method.entry(method.clone()).or_default().push(id);
        self.contexts
            .push(Context::new(id, method, cfg, entry_value, exit_value));
        id
    }

    /// Looks up the unique context of `method` matching a key predicate.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no context matches, `Ok(Some(id))` for exactly one
    /// match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentContextLookup`] when more than one context
    /// matches — the client's value equality is not a consistent structural
    /// equality.
    pub fn lookup<F>(&self, method: &M, key: F) -> Result<Option<ContextId>>
    where
        F: Fn(&Context<M, A>) -> bool,
    {
        let Some(ids) = self.by_method.get(method) else {
            return Ok(None);
        };
        let mut found = None;
        let mut matches = 0usize;
        for &id in ids {
            if key(&self.contexts[id.index()]) {
                matches += 1;
                found = Some(id);
            }
        }
        if matches > 1 {
            return Err(Error::InconsistentContextLookup {
                method: format!("{method:?}"),
                matches,
            });
        }
        Ok(found)
    }
}

impl<M, A> ContextStore<M, A> {
    /// Returns a context by id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not issued by this store.
    #[must_use]
    pub fn get(&self, id: ContextId) -> &Context<M, A> {
        &self.contexts[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: ContextId) -> &mut Context<M, A> {
        &mut self.contexts[id.index()]
    }

    /// Returns the number of contexts created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns `true` if no context has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Iterates over all contexts in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Context<M, A>> {
        self.contexts.iter()
    }

    /// Returns the ids of all contexts of a method, in creation order.
    #[must_use]
    pub fn ids_for(&self, method: &M) -> &[ContextId]
    where
        M: Eq + Hash,
    {
        self.by_method.get(method).map_or(&[], Vec::as_slice)
    }

    /// Decomposes the store into the pieces the solution projection keeps.
    pub(crate) fn into_parts(self) -> (Vec<Context<M, A>>, HashMap<M, Vec<ContextId>>) {
        (self.contexts, self.by_method)
    }
}
