//! The coupled forward/backward fixpoint engine.
//!
//! Some analyses are inherently bidirectional: each direction's flow functions
//! consume the other direction's currently best-known value at the same node
//! (liveness-guided pointer analysis is the classic case). This solver runs
//! both problems over one shared context set by alternating *whole* directional
//! passes — a Gauss-Seidel coupling, not a joint-lattice fixpoint — until
//! neither direction produces new work.
//!
//! Per-node values are [`Paired`]; a forward pass updates only forward
//! components while reading backward components as auxiliary inputs, and vice
//! versa. A changed component queues its same-direction flow-successors, and
//! additionally re-queues the node itself in the coupled direction whenever a
//! value the coupled transfer reads as auxiliary input has moved.
//!
//! Context identity combines both directions: forward information enters a
//! method at its entry, backward information at its exit, so a context is
//! keyed by (method, entry forward component, exit backward component). The
//! complementary components hold the computed summaries — the exit value's
//! forward component and the entry value's backward component — and each is
//! written only by its own direction's sentinel, keeping the key stable.
//!
//! A context is fully analyzed (doubly stable) once both directions have
//! summarized it and both node work-lists are empty; caller reactivation or a
//! coupled change regresses it to pending until it restabilizes.

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::{
    cfg::NodeId,
    context::{CallSite, ContextId, WorkItem},
    framework::{BidirectionalAnalysis, Direction},
    lattice::Paired,
    program::ProgramRepresentation,
    solution::DataFlowSolution,
    solver::SolverConfig,
    store::ContextStore,
    transitions::ContextTransitions,
    Error, MeetSemiLattice, Result,
};

/// Shorthand for the paired per-node value of a bidirectional analysis.
type Value<P, A> = Paired<
    <A as BidirectionalAnalysis<P>>::Forward,
    <A as BidirectionalAnalysis<P>>::Backward,
>;

/// Work-list–driven solver for a coupled forward/backward context-sensitive
/// inter-procedural analysis.
///
/// Like [`InterProceduralSolver`](crate::solver::InterProceduralSolver), one
/// instance is one analysis execution, consumed by [`solve`](Self::solve); the
/// returned solution carries [`Paired`] values.
pub struct BidirectionalSolver<'p, P, A>
where
    P: ProgramRepresentation,
    A: BidirectionalAnalysis<P>,
{
    program: &'p P,
    analysis: A,
    config: SolverConfig,
    store: ContextStore<P::Method, Value<P, A>>,
    transitions: ContextTransitions,
    /// Pending contexts across both directions; persistent between passes.
    worklist: BTreeSet<ContextId>,
    /// Contexts seeded for program entry points, re-checked between passes.
    entry_contexts: Vec<ContextId>,
    steps: u64,
}

impl<'p, P, A> BidirectionalSolver<'p, P, A>
where
    P: ProgramRepresentation,
    A: BidirectionalAnalysis<P>,
{
    /// Creates a solver with the default configuration.
    #[must_use]
    pub fn new(program: &'p P, analysis: A) -> Self {
        Self::with_config(program, analysis, SolverConfig::default())
    }

    /// Creates a solver with an explicit configuration.
    #[must_use]
    pub fn with_config(program: &'p P, analysis: A, config: SolverConfig) -> Self {
        Self {
            program,
            analysis,
            config,
            store: ContextStore::new(),
            transitions: ContextTransitions::new(),
            worklist: BTreeSet::new(),
            entry_contexts: Vec::new(),
            steps: 0,
        }
    }

    /// Runs both directions to a simultaneous fixpoint and returns the
    /// solution over paired values.
    ///
    /// # Errors
    ///
    /// As for [`InterProceduralSolver::solve`](crate::solver::InterProceduralSolver::solve);
    /// either direction's boundary value being undefined for an entry point is
    /// an [`Error::UnresolvedEntryPoint`].
    pub fn solve(mut self) -> Result<DataFlowSolution<P::Method, Value<P, A>>> {
        for method in self.program.entry_points() {
            let forward = self
                .analysis
                .forward_boundary_value(&method)
                .ok_or_else(|| Error::UnresolvedEntryPoint {
                    method: format!("{method:?}"),
                })?;
            let backward = self
                .analysis
                .backward_boundary_value(&method)
                .ok_or_else(|| Error::UnresolvedEntryPoint {
                    method: format!("{method:?}"),
                })?;
            // Entry contexts are created eagerly; the pass loop below picks
            // them up. No pass set exists yet, hence the throwaway.
            let mut no_pass = BTreeSet::new();
            let id = self.context_for(&method, Paired::new(forward, backward), &mut no_pass)?;
            self.entry_contexts.push(id);
        }

        loop {
            self.reseed_entry_points();
            if self.worklist.is_empty() {
                break;
            }
            let forward_steps = self.run_pass(Direction::Forward)?;

            self.reseed_entry_points();
            if self.worklist.is_empty() {
                break;
            }
            let backward_steps = self.run_pass(Direction::Backward)?;

            if forward_steps == 0 && backward_steps == 0 {
                // Pending contexts with no drivable work in either direction;
                // they surface below as partially analyzed.
                break;
            }
        }

        let partial: Vec<ContextId> = self
            .store
            .iter()
            .filter(|c| !c.is_analyzed())
            .map(|c| c.id())
            .collect();
        for &id in &partial {
            warn!(context = %id, method = ?self.store.get(id).method(), "only partially analyzed");
        }

        let (contexts, by_method) = self.store.into_parts();
        Ok(DataFlowSolution::new(contexts, by_method, partial))
    }

    /// Re-queues entry contexts that still have drivable work.
    ///
    /// Under the persistent global work-list this is usually a no-op; it is
    /// the outer loop's safeguard that the termination check ("both directions
    /// idle after re-seeding") sees every entry context.
    fn reseed_entry_points(&mut self) {
        for index in 0..self.entry_contexts.len() {
            let id = self.entry_contexts[index];
            let ctx = self.store.get(id);
            if !ctx.is_analyzed()
                && (!ctx.worklist_is_empty(Direction::Forward)
                    || !ctx.worklist_is_empty(Direction::Backward))
            {
                self.worklist.insert(id);
            }
        }
    }

    /// Drains one direction across every pending context.
    ///
    /// Returns the number of work items processed. Contexts leave the global
    /// work-list only when both directions are idle; a context holding only
    /// other-direction work survives for the next pass.
    fn run_pass(&mut self, direction: Direction) -> Result<u64> {
        let mut pass: BTreeSet<ContextId> = self.worklist.clone();
        let mut processed = 0u64;

        while let Some(&id) = pass.last() {
            let Some(item) = self.store.get_mut(id).pop_work(direction) else {
                pass.remove(&id);
                self.retire(id);
                continue;
            };
            self.bump_step()?;
            processed += 1;
            match (direction, item) {
                (Direction::Forward, WorkItem::Node(node)) => {
                    self.process_node_forward(id, node, &mut pass)?;
                }
                (Direction::Forward, WorkItem::Sentinel) => {
                    self.process_sentinel_forward(id, &mut pass)?;
                }
                (Direction::Backward, WorkItem::Node(node)) => {
                    self.process_node_backward(id, node, &mut pass)?;
                }
                (Direction::Backward, WorkItem::Sentinel) => {
                    self.process_sentinel_backward(id, &mut pass)?;
                }
            }
        }
        Ok(processed)
    }

    /// Takes a context off the global work-list once both directions are idle,
    /// latching the analyzed flag when both summaries exist.
    fn retire(&mut self, id: ContextId) {
        let ctx = self.store.get_mut(id);
        if !ctx.worklist_is_empty(Direction::Forward)
            || !ctx.worklist_is_empty(Direction::Backward)
        {
            return;
        }
        if ctx.is_summarized(Direction::Forward)
            && ctx.is_summarized(Direction::Backward)
            && !ctx.is_analyzed()
        {
            ctx.mark_analyzed();
            debug!(context = %id, "context doubly stable");
        }
        self.worklist.remove(&id);
    }

    fn bump_step(&mut self) -> Result<()> {
        self.steps += 1;
        if let Some(limit) = self.config.max_steps {
            if self.steps > limit {
                return Err(Error::IterationLimit(limit));
            }
        }
        Ok(())
    }

    /// Finds the context keyed by (method, forward entry, backward exit),
    /// creating and scheduling it on a miss.
    fn context_for(
        &mut self,
        method: &P::Method,
        key: Value<P, A>,
        pass: &mut BTreeSet<ContextId>,
    ) -> Result<ContextId> {
        let found = self.store.lookup(method, |c| {
            c.entry_value().forward == key.forward && c.exit_value().backward == key.backward
        })?;
        if let Some(id) = found {
            return Ok(id);
        }

        let cfg = self.store.control_flow_graph(self.program, method)?;
        let entry = Paired::new(key.forward, A::Backward::top());
        let exit = Paired::new(A::Forward::top(), key.backward);
        let id = self.store.create(method.clone(), cfg, entry, exit);
        {
            let ctx = self.store.get_mut(id);
            ctx.seed_worklist(Direction::Forward);
            ctx.seed_worklist(Direction::Backward);
        }
        self.worklist.insert(id);
        pass.insert(id);
        debug!(context = %id, method = ?self.store.get(id).method(), "new context");
        Ok(id)
    }

    /// Wakes every recorded caller of `id` in the direction whose summary
    /// component just changed (the other component of each summary is the
    /// context key and never moves).
    fn notify_callers(&mut self, id: ContextId, direction: Direction, pass: &mut BTreeSet<ContextId>) {
        let callers: Vec<CallSite> = self
            .transitions
            .callers_of(id)
            .map(|sites| sites.iter().copied().collect())
            .unwrap_or_default();
        for site in callers {
            self.store.get_mut(site.context).enqueue(direction, site.node);
            self.worklist.insert(site.context);
            pass.insert(site.context);
        }
    }

    /// Releases the tables of this context's callee closure if none of it can
    /// be reactivated anymore.
    fn try_reclaim(&mut self, id: ContextId) {
        let closure = self.transitions.callee_closure(id);
        if closure.iter().any(|c| self.worklist.contains(c)) {
            return;
        }
        for callee in closure {
            let ctx = self.store.get_mut(callee);
            if !ctx.is_released() {
                ctx.release();
                trace!(context = %callee, "released value tables");
            }
        }
    }

    fn process_node_forward(
        &mut self,
        id: ContextId,
        node: NodeId,
        pass: &mut BTreeSet<ContextId>,
    ) -> Result<()> {
        let cfg = self.store.get(id).cfg_arc();

        let forward_in = {
            let ctx = self.store.get(id);
            let preds = cfg.predecessors(node);
            if preds.is_empty() {
                ctx.entry_value().forward.clone()
            } else {
                let mut value = A::Forward::top();
                for &pred in preds {
                    value = value.meet(&ctx.after_ref(pred)?.forward);
                }
                value
            }
        };
        {
            let ctx = self.store.get_mut(id);
            let backward = ctx.before_ref(node)?.backward.clone();
            ctx.set_before(node, Paired::new(forward_in.clone(), backward))?;
        }

        let previous = self.store.get(id).after_ref(node)?.clone();
        // The coupled direction's value at the after-point, held fixed for
        // this computation.
        let aux_backward = previous.backward.clone();
        let method = self.store.get(id).method().clone();

        let output = if self.program.is_call(&method, node) {
            let targets = self.program.resolve_targets(&method, node);
            if targets.is_empty() {
                self.analysis.forward_call_local_flow(
                    self.store.get(id),
                    node,
                    &forward_in,
                    &aux_backward,
                )
            } else {
                let mut accumulated = A::Forward::top();
                let mut hit = false;
                for target in targets {
                    let key = self.analysis.forward_call_entry_flow(
                        self.store.get(id),
                        &target,
                        node,
                        &forward_in,
                        &aux_backward,
                    );
                    let target_id = self.context_for(&target, key, pass)?;
                    self.transitions.record(CallSite::new(id, node), target_id);

                    let target_ctx = self.store.get(target_id);
                    if target_ctx.is_summarized(Direction::Forward) {
                        hit = true;
                        let exit = target_ctx.exit_value().clone();
                        trace!(caller = %id, callee = %target_id, node = %node, "forward summary hit");
                        let returned = self.analysis.forward_call_exit_flow(
                            self.store.get(id),
                            &target,
                            node,
                            &exit.forward,
                            &exit.backward,
                        );
                        accumulated = accumulated.meet(&returned);
                    }
                }
                let local = self.analysis.forward_call_local_flow(
                    self.store.get(id),
                    node,
                    &forward_in,
                    &aux_backward,
                );
                if hit {
                    accumulated.meet(&local)
                } else {
                    local
                }
            }
        } else {
            self.analysis
                .forward_flow(self.store.get(id), node, &forward_in, &aux_backward)
        };

        let output = output.meet(&previous.forward);
        let changed = output != previous.forward;
        self.store
            .get_mut(id)
            .set_after(node, Paired::new(output, previous.backward))?;

        if changed {
            for &succ in cfg.successors(node) {
                self.store.get_mut(id).enqueue(Direction::Forward, succ);
            }
            // The backward transfer at this node reads the forward after-point
            // as its auxiliary input; that read is now stale.
            self.store.get_mut(id).enqueue(Direction::Backward, node);
        }
        if cfg.is_tail(node) {
            self.store.get_mut(id).enqueue_sentinel(Direction::Forward);
        }
        Ok(())
    }

    fn process_node_backward(
        &mut self,
        id: ContextId,
        node: NodeId,
        pass: &mut BTreeSet<ContextId>,
    ) -> Result<()> {
        let cfg = self.store.get(id).cfg_arc();

        let backward_in = {
            let ctx = self.store.get(id);
            let succs = cfg.successors(node);
            if succs.is_empty() {
                ctx.exit_value().backward.clone()
            } else {
                let mut value = A::Backward::top();
                for &succ in succs {
                    value = value.meet(&ctx.before_ref(succ)?.backward);
                }
                value
            }
        };
        let input_changed = {
            let ctx = self.store.get_mut(id);
            let previous_in = ctx.after_ref(node)?.clone();
            let changed = previous_in.backward != backward_in;
            ctx.set_after(node, Paired::new(previous_in.forward, backward_in.clone()))?;
            changed
        };

        let previous = self.store.get(id).before_ref(node)?.clone();
        let aux_forward = self.store.get(id).after_ref(node)?.forward.clone();
        let method = self.store.get(id).method().clone();

        let output = if self.program.is_call(&method, node) {
            let targets = self.program.resolve_targets(&method, node);
            if targets.is_empty() {
                self.analysis.backward_call_local_flow(
                    self.store.get(id),
                    node,
                    &backward_in,
                    &aux_forward,
                )
            } else {
                let mut accumulated = A::Backward::top();
                let mut hit = false;
                for target in targets {
                    let key = self.analysis.backward_call_entry_flow(
                        self.store.get(id),
                        &target,
                        node,
                        &backward_in,
                        &aux_forward,
                    );
                    let target_id = self.context_for(&target, key, pass)?;
                    self.transitions.record(CallSite::new(id, node), target_id);

                    let target_ctx = self.store.get(target_id);
                    if target_ctx.is_summarized(Direction::Backward) {
                        hit = true;
                        // The backward summary lives at the callee's entry.
                        let summary = target_ctx.entry_value().clone();
                        trace!(caller = %id, callee = %target_id, node = %node, "backward summary hit");
                        let returned = self.analysis.backward_call_exit_flow(
                            self.store.get(id),
                            &target,
                            node,
                            &summary.backward,
                            &summary.forward,
                        );
                        accumulated = accumulated.meet(&returned);
                    }
                }
                let local = self.analysis.backward_call_local_flow(
                    self.store.get(id),
                    node,
                    &backward_in,
                    &aux_forward,
                );
                if hit {
                    accumulated.meet(&local)
                } else {
                    local
                }
            }
        } else {
            self.analysis
                .backward_flow(self.store.get(id), node, &backward_in, &aux_forward)
        };

        let output = output.meet(&previous.backward);
        let changed = output != previous.backward;
        self.store
            .get_mut(id)
            .set_before(node, Paired::new(previous.forward, output))?;

        if changed {
            for &pred in cfg.predecessors(node) {
                self.store.get_mut(id).enqueue(Direction::Backward, pred);
            }
        }
        if input_changed {
            // The forward transfer at this node reads the backward after-point
            // as its auxiliary input; that read is now stale.
            self.store.get_mut(id).enqueue(Direction::Forward, node);
        }
        if cfg.is_head(node) {
            self.store.get_mut(id).enqueue_sentinel(Direction::Backward);
        }
        Ok(())
    }

    /// Forward sentinel: merge the tails into the exit value's forward
    /// component. The backward component is the context key and stays intact.
    fn process_sentinel_forward(
        &mut self,
        id: ContextId,
        pass: &mut BTreeSet<ContextId>,
    ) -> Result<()> {
        let cfg = self.store.get(id).cfg_arc();
        let merged = {
            let ctx = self.store.get(id);
            let mut value = A::Forward::top();
            for &tail in cfg.tails() {
                value = value.meet(&ctx.after_ref(tail)?.forward);
            }
            value
        };
        let summary_news = {
            let ctx = self.store.get_mut(id);
            let news =
                !ctx.is_summarized(Direction::Forward) || ctx.exit_value().forward != merged;
            let backward = ctx.exit_value().backward.clone();
            ctx.set_exit_value(Paired::new(merged, backward));
            ctx.mark_summarized(Direction::Forward);
            news
        };
        debug!(context = %id, direction = %Direction::Forward, "context stabilized");
        if summary_news {
            self.notify_callers(id, Direction::Forward, pass);
        }
        if self.config.free_results_on_the_fly {
            self.try_reclaim(id);
        }
        Ok(())
    }

    /// Backward sentinel: merge the heads into the entry value's backward
    /// component. The forward component is the context key and stays intact.
    fn process_sentinel_backward(
        &mut self,
        id: ContextId,
        pass: &mut BTreeSet<ContextId>,
    ) -> Result<()> {
        let cfg = self.store.get(id).cfg_arc();
        let merged = {
            let ctx = self.store.get(id);
            let mut value = A::Backward::top();
            for &head in cfg.heads() {
                value = value.meet(&ctx.before_ref(head)?.backward);
            }
            value
        };
        let summary_news = {
            let ctx = self.store.get_mut(id);
            let news =
                !ctx.is_summarized(Direction::Backward) || ctx.entry_value().backward != merged;
            let forward = ctx.entry_value().forward.clone();
            ctx.set_entry_value(Paired::new(forward, merged));
            ctx.mark_summarized(Direction::Backward);
            news
        };
        debug!(context = %id, direction = %Direction::Backward, "context stabilized");
        if summary_news {
            self.notify_callers(id, Direction::Backward, pass);
        }
        if self.config.free_results_on_the_fly {
            self.try_reclaim(id);
        }
        Ok(())
    }
}
