//! The unidirectional (forward or backward) fixpoint engine.
//!
//! # Algorithm
//!
//! The solver seeds one context per program entry point, then drains a global
//! context work-list; draining a context drains its local node work-list:
//!
//! 1. Pop a node from the newest pending context. Compute its input: the meet
//!    of its flow-predecessors' outputs, or the context's boundary value if it
//!    has none.
//! 2. Dispatch on node kind: normal flow for non-call nodes; for call nodes,
//!    resolve targets, find or synthesize a target context per
//!    (target, entry value) key, and either consume stabilized summaries
//!    (meeting call-exit results with the call-local effect) or fall back to
//!    the call-local effect alone until a summary exists.
//! 3. Meet the new output with the previous one (forced monotone
//!    accumulation), and on change queue the flow-successors. Processing a
//!    summary-source node queues the end-of-method sentinel.
//! 4. The sentinel computes the context's exit value, marks it analyzed, and
//!    re-queues every recorded caller — the only mechanism by which callee
//!    information travels back up the discovered call graph, and precisely the
//!    mechanism that closes recursive cycles.
//!
//! Newly synthesized contexts land on the global work-list and are processed
//! newest-first, giving the traversal a depth-first bias that speeds
//! convergence without being required for correctness.

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::{
    cfg::NodeId,
    context::{CallSite, ContextId, WorkItem},
    framework::InterProceduralAnalysis,
    program::ProgramRepresentation,
    solution::DataFlowSolution,
    solver::SolverConfig,
    store::ContextStore,
    transitions::ContextTransitions,
    Error, MeetSemiLattice, Result,
};

/// Work-list–driven solver for a single-direction context-sensitive
/// inter-procedural analysis.
///
/// One instance corresponds to one analysis execution: it owns the context
/// store, the call-graph transition table and the global work-list, and is
/// consumed by [`solve`](Self::solve).
///
/// # Example
///
/// ```rust,ignore
/// use interflow::solver::{InterProceduralSolver, SolverConfig};
///
/// let solver = InterProceduralSolver::new(&program, ConstantAnalysis::new());
/// let solution = solver.solve()?;
/// for &ctx in solution.contexts_of(&main_method) {
///     println!("exit: {:?}", solution.exit_value(ctx));
/// }
/// ```
pub struct InterProceduralSolver<'p, P, A>
where
    P: ProgramRepresentation,
    A: InterProceduralAnalysis<P>,
{
    program: &'p P,
    analysis: A,
    config: SolverConfig,
    store: ContextStore<P::Method, A::Value>,
    transitions: ContextTransitions,
    /// Pending contexts; popped from the back, i.e. newest id first.
    worklist: BTreeSet<ContextId>,
    steps: u64,
}

impl<'p, P, A> InterProceduralSolver<'p, P, A>
where
    P: ProgramRepresentation,
    A: InterProceduralAnalysis<P>,
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
            steps: 0,
        }
    }

    /// Runs the analysis to a fixpoint and returns the solution.
    ///
    /// # Errors
    ///
    /// - [`Error::UnresolvedEntryPoint`] if an entry point has no boundary value
    /// - [`Error::InconsistentContextLookup`] on a broken value equality
    /// - [`Error::IterationLimit`] if the configured step cap is exceeded
    /// - any error from the program representation while building a CFG
    ///
    /// Client flow-function panics are not caught and abort the run.
    pub fn solve(mut self) -> Result<DataFlowSolution<P::Method, A::Value>> {
        for method in self.program.entry_points() {
            let boundary =
                self.analysis
                    .boundary_value(&method)
                    .ok_or_else(|| Error::UnresolvedEntryPoint {
                        method: format!("{method:?}"),
                    })?;
            self.context_for(&method, boundary)?;
        }

        while let Some(&id) = self.worklist.last() {
            let Some(item) = self.store.get_mut(id).pop_work(A::DIRECTION) else {
                self.retire(id);
                continue;
            };
            self.bump_step()?;
            match item {
                WorkItem::Node(node) => self.process_node(id, node)?,
                WorkItem::Sentinel => self.process_sentinel(id)?,
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

    /// Synthesizes a context for `(method, boundary value)` and schedules it.
    fn init_context(&mut self, method: P::Method, boundary: A::Value) -> Result<ContextId> {
        let cfg = self.store.control_flow_graph(self.program, &method)?;
        let id = self
            .store
            .create(method, cfg, boundary, A::Value::top());
        self.store.get_mut(id).seed_worklist(A::DIRECTION);
        self.worklist.insert(id);
        debug!(context = %id, method = ?self.store.get(id).method(), "new context");
        Ok(id)
    }

    /// Finds the context keyed by `(method, entry value)`, creating it on a
    /// miss.
    fn context_for(&mut self, method: &P::Method, entry: A::Value) -> Result<ContextId> {
        if let Some(id) = self.store.lookup(method, |c| c.entry_value() == &entry)? {
            return Ok(id);
        }
        self.init_context(method.clone(), entry)
    }

    /// A context's node work-list drained: drop it from the global work-list.
    ///
    /// A context re-driven by a caller but whose summary inputs did not change
    /// restabilizes here without its sentinel re-running.
    fn retire(&mut self, id: ContextId) {
        let ctx = self.store.get_mut(id);
        if ctx.is_summarized(A::DIRECTION) && !ctx.is_analyzed() {
            ctx.mark_analyzed();
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

    /// One per-node step of the fixpoint.
    fn process_node(&mut self, id: ContextId, node: NodeId) -> Result<()> {
        let direction = A::DIRECTION;
        let cfg = self.store.get(id).cfg_arc();

        // Input: meet over flow-predecessor outputs, else the boundary value.
        let input = {
            let ctx = self.store.get(id);
            let sources = cfg.flow_predecessors(direction, node);
            if sources.is_empty() {
                ctx.entry_value().clone()
            } else {
                let mut value = A::Value::top();
                for &source in sources {
                    value = value.meet(ctx.output_ref(direction, source)?);
                }
                value
            }
        };
        self.store
            .get_mut(id)
            .set_input(direction, node, input.clone())?;

        let previous = self.store.get(id).output_ref(direction, node)?.clone();
        let method = self.store.get(id).method().clone();

        let output = if self.program.is_call(&method, node) {
            let targets = self.program.resolve_targets(&method, node);
            if targets.is_empty() {
                // Phantom call: an opaque pass-through.
                self.analysis
                    .call_local_flow(self.store.get(id), node, &input)
            } else {
                self.process_call(id, node, &input, targets)?
            }
        } else {
            self.analysis.normal_flow(self.store.get(id), node, &input)
        };

        // Forced monotone accumulation: the stored output never regresses,
        // even for imperfectly monotone client functions.
        let output = output.meet(&previous);
        let changed = output != previous;
        self.store.get_mut(id).set_output(direction, node, output)?;

        if changed {
            for &succ in cfg.flow_successors(direction, node) {
                self.store.get_mut(id).enqueue(direction, succ);
            }
        }
        if cfg.is_summary_source(direction, node) {
            self.store.get_mut(id).enqueue_sentinel(direction);
        }
        Ok(())
    }

    /// Call-node dispatch: resolve targets, consume or defer their summaries.
    fn process_call(
        &mut self,
        id: ContextId,
        node: NodeId,
        input: &A::Value,
        targets: Vec<P::Method>,
    ) -> Result<A::Value> {
        let direction = A::DIRECTION;
        let mut accumulated = A::Value::top();
        let mut hit = false;

        for target in targets {
            let entry =
                self.analysis
                    .call_entry_flow(self.store.get(id), &target, node, input);
            let target_id = self.context_for(&target, entry)?;
            self.transitions.record(CallSite::new(id, node), target_id);

            let target_ctx = self.store.get(target_id);
            if target_ctx.is_summarized(direction) {
                hit = true;
                let exit = target_ctx.exit_value().clone();
                trace!(caller = %id, callee = %target_id, node = %node, "summary hit");
                let returned =
                    self.analysis
                        .call_exit_flow(self.store.get(id), &target, node, &exit);
                accumulated = accumulated.meet(&returned);
            }
        }

        let local = self
            .analysis
            .call_local_flow(self.store.get(id), node, input);
        // With no stabilized target yet, the call's effect is deferred: the
        // local component alone stands in until a callee summary arrives and
        // reactivates this node.
        Ok(if hit { accumulated.meet(&local) } else { local })
    }

    /// End-of-method sentinel: summarize, publish, and wake the callers.
    fn process_sentinel(&mut self, id: ContextId) -> Result<()> {
        let direction = A::DIRECTION;
        let cfg = self.store.get(id).cfg_arc();

        let exit = {
            let ctx = self.store.get(id);
            let mut value = A::Value::top();
            for &node in cfg.summary_nodes(direction) {
                value = value.meet(ctx.output_ref(direction, node)?);
            }
            value
        };

        let summary_news = {
            let ctx = self.store.get_mut(id);
            let news = !ctx.is_summarized(direction) || ctx.exit_value() != &exit;
            ctx.set_exit_value(exit);
            ctx.mark_summarized(direction);
            ctx.mark_analyzed();
            news
        };
        debug!(context = %id, "context stabilized");

        // Callers are woken only when the summary actually carries news: a
        // first-ever summary or a changed exit value. Re-notifying on an
        // unchanged summary would ping-pong forever through recursive cycles
        // whose call nodes are tails.
        if summary_news {
            let callers: Vec<CallSite> = self
                .transitions
                .callers_of(id)
                .map(|sites| sites.iter().copied().collect())
                .unwrap_or_default();
            for site in callers {
                self.store.get_mut(site.context).enqueue(direction, site.node);
                self.worklist.insert(site.context);
            }
        }

        if self.config.free_results_on_the_fly {
            self.try_reclaim(id);
        }
        Ok(())
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::ControlFlowGraph,
        context::Context,
        framework::Direction,
    };
    use std::collections::{BTreeSet, HashMap};

    /// A hand-built program representation for solver tests.
    #[derive(Default)]
    struct TestProgram {
        entries: Vec<&'static str>,
        cfgs: HashMap<&'static str, (usize, Vec<(usize, usize)>)>,
        calls: HashMap<(&'static str, usize), Vec<&'static str>>,
    }

    impl TestProgram {
        fn entry(mut self, method: &'static str) -> Self {
            self.entries.push(method);
            self
        }

        fn method(mut self, name: &'static str, nodes: usize, edges: &[(usize, usize)]) -> Self {
            self.cfgs.insert(name, (nodes, edges.to_vec()));
            self
        }

        fn call(mut self, method: &'static str, node: usize, targets: &[&'static str]) -> Self {
            self.calls.insert((method, node), targets.to_vec());
            self
        }
    }

    impl ProgramRepresentation for TestProgram {
        type Method = &'static str;

        fn entry_points(&self) -> Vec<&'static str> {
            self.entries.clone()
        }

        fn control_flow_graph(&self, method: &&'static str) -> Result<ControlFlowGraph> {
            let (nodes, edges) = &self.cfgs[method];
            let mut cfg = ControlFlowGraph::new(*nodes);
            for &(from, to) in edges {
                cfg.add_edge(NodeId::new(from), NodeId::new(to))?;
            }
            Ok(cfg)
        }

        fn is_call(&self, method: &&'static str, node: NodeId) -> bool {
            self.calls.contains_key(&(*method, node.index()))
        }

        fn resolve_targets(&self, method: &&'static str, node: NodeId) -> Vec<&'static str> {
            self.calls
                .get(&(*method, node.index()))
                .cloned()
                .unwrap_or_default()
        }
    }

    /// The flat two-element lattice.
    #[derive(Debug, Clone, PartialEq)]
    enum Reach {
        Top,
        Bottom,
    }

    impl MeetSemiLattice for Reach {
        fn top() -> Self {
            Reach::Top
        }
        fn meet(&self, other: &Self) -> Self {
            match (self, other) {
                (Reach::Top, Reach::Top) => Reach::Top,
                _ => Reach::Bottom,
            }
        }
    }

    /// Pass-through flow functions over [`Reach`].
    struct PassThrough;

    impl InterProceduralAnalysis<TestProgram> for PassThrough {
        type Value = Reach;
        const DIRECTION: Direction = Direction::Forward;

        fn boundary_value(&self, _entry: &&'static str) -> Option<Reach> {
            Some(Reach::Bottom)
        }
        fn normal_flow(&self, _c: &Context<&'static str, Reach>, _n: NodeId, input: &Reach) -> Reach {
            input.clone()
        }
        fn call_entry_flow(
            &self,
            _c: &Context<&'static str, Reach>,
            _t: &&'static str,
            _n: NodeId,
            input: &Reach,
        ) -> Reach {
            input.clone()
        }
        fn call_exit_flow(
            &self,
            _c: &Context<&'static str, Reach>,
            _t: &&'static str,
            _n: NodeId,
            exit: &Reach,
        ) -> Reach {
            exit.clone()
        }
        fn call_local_flow(&self, _c: &Context<&'static str, Reach>, _n: NodeId, input: &Reach) -> Reach {
            input.clone()
        }
    }

    #[test]
    fn test_recursion_converges_to_least_fixpoint() {
        // A directly self-recursive method: call node -> return node.
        let program = TestProgram::default()
            .entry("r")
            .method("r", 2, &[(0, 1)])
            .call("r", 0, &["r"]);

        let solver = InterProceduralSolver::new(&program, PassThrough);
        let solution = solver.solve().unwrap();

        // The recursive call maps back onto the same (method, boundary) key:
        // exactly one context, fully analyzed, with the manually computed
        // least fixpoint as its exit value.
        assert_eq!(solution.context_count(), 1);
        let ctx = solution.contexts_of(&"r")[0];
        assert!(solution.context(ctx).unwrap().is_analyzed());
        assert_eq!(solution.exit_value(ctx), Some(&Reach::Bottom));
        assert!(solution.partially_analyzed().is_empty());
    }

    /// Union-of-tags lattice for observing which flow functions ran.
    #[derive(Debug, Clone, PartialEq)]
    struct Tags(BTreeSet<u32>);

    impl MeetSemiLattice for Tags {
        fn top() -> Self {
            Tags(BTreeSet::new())
        }
        fn meet(&self, other: &Self) -> Self {
            Tags(self.0.union(&other.0).copied().collect())
        }
    }

    /// Tags every flow kind with a distinct marker.
    struct Tagging;

    impl Tagging {
        fn with(input: &Tags, tag: u32) -> Tags {
            let mut set = input.0.clone();
            set.insert(tag);
            Tags(set)
        }
    }

    impl InterProceduralAnalysis<TestProgram> for Tagging {
        type Value = Tags;
        const DIRECTION: Direction = Direction::Forward;

        fn boundary_value(&self, _entry: &&'static str) -> Option<Tags> {
            Some(Tags::top())
        }
        fn normal_flow(&self, _c: &Context<&'static str, Tags>, _n: NodeId, input: &Tags) -> Tags {
            Tagging::with(input, 1)
        }
        fn call_entry_flow(
            &self,
            _c: &Context<&'static str, Tags>,
            _t: &&'static str,
            _n: NodeId,
            input: &Tags,
        ) -> Tags {
            Tagging::with(input, 2)
        }
        fn call_exit_flow(
            &self,
            _c: &Context<&'static str, Tags>,
            _t: &&'static str,
            _n: NodeId,
            exit: &Tags,
        ) -> Tags {
            Tagging::with(exit, 3)
        }
        fn call_local_flow(&self, _c: &Context<&'static str, Tags>, _n: NodeId, input: &Tags) -> Tags {
            Tagging::with(input, 4)
        }
    }

    #[test]
    fn test_phantom_call_applies_call_local_only() {
        let program = TestProgram::default()
            .entry("main")
            .method("main", 2, &[(0, 1)])
            .call("main", 0, &[]); // unresolved callee

        let solver = InterProceduralSolver::new(&program, Tagging);
        let solution = solver.solve().unwrap();

        // No context synthesized for the phantom callee.
        assert_eq!(solution.context_count(), 1);
        let ctx = solution.contexts_of(&"main")[0];
        // OUT of the call node is exactly the call-local effect.
        assert_eq!(
            solution.value_after(ctx, NodeId::new(0)),
            Some(&Tags([4].into_iter().collect()))
        );
        // No call-entry/call-exit tag anywhere in the caller.
        let out = solution.value_after(ctx, NodeId::new(1)).unwrap();
        assert!(!out.0.contains(&2));
        assert!(!out.0.contains(&3));
    }

    #[test]
    fn test_resolved_call_combines_exit_and_local() {
        let program = TestProgram::default()
            .entry("main")
            .method("main", 2, &[(0, 1)])
            .method("callee", 1, &[])
            .call("main", 0, &["callee"]);

        let solver = InterProceduralSolver::new(&program, Tagging);
        let solution = solver.solve().unwrap();

        assert_eq!(solution.context_count(), 2);
        let main = solution.contexts_of(&"main")[0];
        let out = solution.value_after(main, NodeId::new(0)).unwrap();
        // Call-exit applied to the callee summary, met with call-local.
        assert!(out.0.contains(&3));
        assert!(out.0.contains(&4));
    }

    struct NoBoundary;

    impl InterProceduralAnalysis<TestProgram> for NoBoundary {
        type Value = Reach;
        const DIRECTION: Direction = Direction::Forward;

        fn boundary_value(&self, _entry: &&'static str) -> Option<Reach> {
            None
        }
        fn normal_flow(&self, _c: &Context<&'static str, Reach>, _n: NodeId, i: &Reach) -> Reach {
            i.clone()
        }
        fn call_entry_flow(
            &self,
            _c: &Context<&'static str, Reach>,
            _t: &&'static str,
            _n: NodeId,
            i: &Reach,
        ) -> Reach {
            i.clone()
        }
        fn call_exit_flow(
            &self,
            _c: &Context<&'static str, Reach>,
            _t: &&'static str,
            _n: NodeId,
            e: &Reach,
        ) -> Reach {
            e.clone()
        }
        fn call_local_flow(&self, _c: &Context<&'static str, Reach>, _n: NodeId, i: &Reach) -> Reach {
            i.clone()
        }
    }

    #[test]
    fn test_unresolved_entry_point_aborts_before_seeding() {
        let program = TestProgram::default().entry("main").method("main", 1, &[]);
        let solver = InterProceduralSolver::new(&program, NoBoundary);
        assert!(matches!(
            solver.solve(),
            Err(Error::UnresolvedEntryPoint { .. })
        ));
    }

    /// An infinite-height domain: a counter whose meet is max.
    #[derive(Debug, Clone, PartialEq)]
    struct Counter(u64);

    impl MeetSemiLattice for Counter {
        fn top() -> Self {
            Counter(0)
        }
        fn meet(&self, other: &Self) -> Self {
            Counter(self.0.max(other.0))
        }
    }

    struct Diverging;

    impl InterProceduralAnalysis<TestProgram> for Diverging {
        type Value = Counter;
        const DIRECTION: Direction = Direction::Forward;

        fn boundary_value(&self, _entry: &&'static str) -> Option<Counter> {
            Some(Counter(0))
        }
        fn normal_flow(&self, _c: &Context<&'static str, Counter>, _n: NodeId, i: &Counter) -> Counter {
            Counter(i.0 + 1)
        }
        fn call_entry_flow(
            &self,
            _c: &Context<&'static str, Counter>,
            _t: &&'static str,
            _n: NodeId,
            i: &Counter,
        ) -> Counter {
            i.clone()
        }
        fn call_exit_flow(
            &self,
            _c: &Context<&'static str, Counter>,
            _t: &&'static str,
            _n: NodeId,
            e: &Counter,
        ) -> Counter {
            e.clone()
        }
        fn call_local_flow(&self, _c: &Context<&'static str, Counter>, _n: NodeId, i: &Counter) -> Counter {
            i.clone()
        }
    }

    #[test]
    fn test_iteration_cap_flags_non_terminating_domain() {
        // A pure cycle: values grow without bound, no head or tail exists.
        let program = TestProgram::default()
            .entry("spin")
            .method("spin", 2, &[(0, 1), (1, 0)]);

        let solver = InterProceduralSolver::with_config(
            &program,
            Diverging,
            SolverConfig::default().with_step_limit(1_000),
        );
        assert!(matches!(solver.solve(), Err(Error::IterationLimit(1_000))));
    }

    /// Backward pass-through carrying a set from the exit boundary.
    struct BackwardCarry;

    impl InterProceduralAnalysis<TestProgram> for BackwardCarry {
        type Value = Tags;
        const DIRECTION: Direction = Direction::Backward;

        fn boundary_value(&self, _entry: &&'static str) -> Option<Tags> {
            Some(Tags([7].into_iter().collect()))
        }
        fn normal_flow(&self, _c: &Context<&'static str, Tags>, _n: NodeId, input: &Tags) -> Tags {
            input.clone()
        }
        fn call_entry_flow(
            &self,
            _c: &Context<&'static str, Tags>,
            _t: &&'static str,
            _n: NodeId,
            input: &Tags,
        ) -> Tags {
            input.clone()
        }
        fn call_exit_flow(
            &self,
            _c: &Context<&'static str, Tags>,
            _t: &&'static str,
            _n: NodeId,
            exit: &Tags,
        ) -> Tags {
            exit.clone()
        }
        fn call_local_flow(&self, _c: &Context<&'static str, Tags>, _n: NodeId, input: &Tags) -> Tags {
            input.clone()
        }
    }

    /// Deliberately non-monotone call-local flow: forgets its input and
    /// returns a fresh tag per invocation.
    struct Forgetful {
        calls: std::cell::Cell<u32>,
    }

    impl InterProceduralAnalysis<TestProgram> for Forgetful {
        type Value = Tags;
        const DIRECTION: Direction = Direction::Forward;

        fn boundary_value(&self, _entry: &&'static str) -> Option<Tags> {
            Some(Tags::top())
        }
        fn normal_flow(&self, _c: &Context<&'static str, Tags>, _n: NodeId, input: &Tags) -> Tags {
            input.clone()
        }
        fn call_entry_flow(
            &self,
            _c: &Context<&'static str, Tags>,
            _t: &&'static str,
            _n: NodeId,
            input: &Tags,
        ) -> Tags {
            input.clone()
        }
        fn call_exit_flow(
            &self,
            _c: &Context<&'static str, Tags>,
            _t: &&'static str,
            _n: NodeId,
            _exit: &Tags,
        ) -> Tags {
            Tags([100].into_iter().collect())
        }
        fn call_local_flow(&self, _c: &Context<&'static str, Tags>, _n: NodeId, _input: &Tags) -> Tags {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            Tags([call].into_iter().collect())
        }
    }

    #[test]
    fn test_forced_meet_accumulates_non_monotone_outputs() {
        // The call node is processed once before the callee stabilizes and
        // once after; the call-local function returns a *different* value the
        // second time. The forced meet keeps the first output instead of
        // letting the stored value regress.
        let program = TestProgram::default()
            .entry("main")
            .method("main", 2, &[(0, 1)])
            .method("leaf", 1, &[])
            .call("main", 0, &["leaf"]);

        let analysis = Forgetful {
            calls: std::cell::Cell::new(0),
        };
        let solution = InterProceduralSolver::new(&program, analysis)
            .solve()
            .unwrap();

        let main = solution.contexts_of(&"main")[0];
        let out = solution.value_after(main, NodeId::new(0)).unwrap();
        // First-round tag survives alongside the later ones.
        assert!(out.0.contains(&1), "first output regressed: {out:?}");
        assert!(out.0.contains(&2));
        assert!(out.0.contains(&100));
    }

    #[test]
    fn test_tailless_method_reported_as_partial() {
        // A fully cyclic graph never queues its sentinel: the values converge
        // but the context can never be summarized.
        let program = TestProgram::default()
            .entry("spin")
            .method("spin", 2, &[(0, 1), (1, 0)]);

        let solver = InterProceduralSolver::new(&program, PassThrough);
        let solution = solver.solve().unwrap();

        let ctx = solution.contexts_of(&"spin")[0];
        assert!(!solution.context(ctx).unwrap().is_analyzed());
        assert_eq!(solution.partially_analyzed(), &[ctx]);
    }

    #[test]
    fn test_backward_boundary_at_tails_summary_at_heads() {
        let program = TestProgram::default()
            .entry("m")
            .method("m", 3, &[(0, 1), (1, 2)]);

        let solver = InterProceduralSolver::new(&program, BackwardCarry);
        let solution = solver.solve().unwrap();

        let ctx = solution.contexts_of(&"m")[0];
        let expected = Tags([7].into_iter().collect());
        // Boundary applied at the tail's after-point, carried to the head.
        assert_eq!(solution.value_after(ctx, NodeId::new(2)), Some(&expected));
        assert_eq!(solution.value_before(ctx, NodeId::new(0)), Some(&expected));
        // Backward summary: the meet over head outputs.
        assert_eq!(solution.exit_value(ctx), Some(&expected));
        assert!(solution.context(ctx).unwrap().is_analyzed());
    }
}
