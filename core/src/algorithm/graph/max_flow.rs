//! Dinic maximum flow over a residual edge arena
//!
//! Each phase runs a breadth-first level assignment from the source over
//! residual-positive edges, then saturates the resulting level graph with a
//! blocking flow. The blocking flow is found by repeated depth-first searches
//! that resume every node at its current arc and prune nodes whose arcs are
//! exhausted, so the scanning work of one phase is O(E) plus O(V) per
//! augmenting path. The source-to-sink distance strictly grows between
//! phases, which bounds the phase count by V (and by O(sqrt(E)) on
//! unit-capacity networks).
//!
//! The search keeps its path on an explicit edge stack instead of the call
//! stack, so arbitrarily long level graphs cannot exhaust the thread stack.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info, trace, warn};
use serde::{Serialize, Deserialize};

use crate::algorithm::config::SolverConfig;
use crate::algorithm::state::PhaseState;
use crate::algorithm::traits::{
    check_node, Algorithm, AlgorithmComplexity, AlgorithmError, AlgorithmMetrics,
    AlgorithmParameter, AlgorithmProfiler, AlgorithmResult, Capacity, EdgeId, Flow, NodeId,
};
use crate::data_structures::graph::FlowNetwork;
use crate::execution::control::{CancellationToken, PhaseGate, Termination};
use crate::execution::tracer::{ExecutionTracer, PhaseRecord};

/// Minimum cut read from the final level assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinCut {
    /// Nodes still reachable from the source in the residual network
    pub source_side: Vec<NodeId>,
    /// Forward edges leaving the source side, all saturated
    pub cut_edges: Vec<EdgeId>,
    /// Sum of `cut_edges` capacities; equals the maximum flow
    pub capacity: Capacity,
}

/// Maximum flow result with detailed flow information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxFlowResult {
    /// Flow value; maximum when `termination` is [`Termination::Optimal`]
    pub max_flow: Flow,
    /// Flow on each user edge, in insertion order
    pub edge_flows: Vec<Flow>,
    /// Present only for optimal solves
    pub min_cut: Option<MinCut>,
    pub termination: Termination,
    pub metrics: AlgorithmMetrics,
    pub trace: Option<ExecutionTracer>,
}

/// Dinic blocking-flow solver.
///
/// Owns its phase-local level and arc arrays; one instance may be reused for
/// any number of networks, but a network is exclusively borrowed while it is
/// being solved.
#[derive(Debug, Clone, Default)]
pub struct DinicSolver {
    config: SolverConfig,
    phase: PhaseState,
    /// Edges of the partial augmenting path, source first
    path: Vec<EdgeId>,
    profiler: AlgorithmProfiler,
}

impl DinicSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> AlgorithmResult<Self> {
        config.validate()?;
        Ok(Self { config, ..Self::default() })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Computes a maximum flow from `source` to `sink`.
    ///
    /// Existing flow on `network` is discarded first, so repeated solves of an
    /// unmodified network return the same value.
    pub fn solve(&mut self, network: &mut FlowNetwork, source: NodeId, sink: NodeId) -> AlgorithmResult<MaxFlowResult> {
        self.solve_with_cancel(network, source, sink, None)
    }

    /// Like [`DinicSolver::solve`], polling `cancel` between phases
    pub fn solve_with_cancel(
        &mut self,
        network: &mut FlowNetwork,
        source: NodeId,
        sink: NodeId,
        cancel: Option<&CancellationToken>,
    ) -> AlgorithmResult<MaxFlowResult> {
        self.run_phases(network, source, sink, cancel, |_| {})
    }

    /// Phase loop behind the public entry points; `on_phase` sees each
    /// completed phase before the next cancellation check.
    fn run_phases<F>(
        &mut self,
        network: &mut FlowNetwork,
        source: NodeId,
        sink: NodeId,
        cancel: Option<&CancellationToken>,
        mut on_phase: F,
    ) -> AlgorithmResult<MaxFlowResult>
    where
        F: FnMut(&PhaseRecord),
    {
        check_node("source", source, network.node_count())?;
        check_node("sink", sink, network.node_count())?;
        if source == sink {
            return Err(AlgorithmError::SourceIsSink(source));
        }

        network.reset_flow();
        self.phase.resize(network.node_count());
        self.profiler.start();

        let gate = PhaseGate::new(self.config.max_phases, cancel);
        let mut tracer = self.config.record_trace.then(|| ExecutionTracer::new(self.name()));
        let mut total: Flow = 0;
        let mut phase = 0;

        let termination = loop {
            if !self.assign_levels(network, source, sink) {
                break Termination::Optimal;
            }
            if let Some(stop) = gate.check(phase) {
                break stop;
            }

            let target_level = self.phase.level(sink);
            let dead_ends_before = self.profiler.get_metrics().dead_ends;
            self.phase.reset_arcs();
            self.profiler.record_phase();

            let mut gained: Flow = 0;
            let mut augmentations = 0;
            loop {
                let pushed = self.augment(network, source, sink, Flow::MAX);
                if pushed == 0 {
                    break;
                }
                gained += pushed;
                augmentations += 1;
                self.profiler.record_augmentation();
            }
            total += gained;

            let dead_ends = self.profiler.get_metrics().dead_ends - dead_ends_before;
            debug!(
                "Dinic phase {}: sink level {}, {} augmenting paths, +{} flow, {} dead ends",
                phase, target_level, augmentations, gained, dead_ends
            );
            let record = PhaseRecord { phase, target_level, augmentations, gained, dead_ends };
            on_phase(&record);
            if let Some(tracer) = tracer.as_mut() {
                tracer.record_phase(record);
            }
            phase += 1;
        };

        self.profiler.stop();
        if let Some(tracer) = tracer.as_mut() {
            tracer.finish(termination);
        }
        let metrics = self.profiler.get_metrics().clone();

        let min_cut = if termination.is_optimal() {
            info!(
                "Dinic max flow {} -> {}: {} in {} phases ({:?})",
                source, sink, total, metrics.phases, metrics.execution_time
            );
            Some(self.extract_min_cut(network))
        } else {
            warn!(
                "Dinic solve {} -> {} stopped early ({:?}) after {} phases with flow {}",
                source, sink, termination, metrics.phases, total
            );
            None
        };

        Ok(MaxFlowResult {
            max_flow: total,
            edge_flows: network.forward_edges().map(|(_, _, edge)| edge.flow).collect(),
            min_cut,
            termination,
            metrics,
            trace: tracer,
        })
    }

    /// BFS from the source over residual-positive edges.
    ///
    /// Nodes at the sink's depth or deeper are never expanded: they cannot lie
    /// on a shortest augmenting path. Returns whether the sink was reached.
    fn assign_levels(&mut self, network: &FlowNetwork, source: NodeId, sink: NodeId) -> bool {
        self.phase.begin_level_pass();
        self.phase.discover(source, 0);
        let mut labelled = 1;

        while let Some(node) = self.phase.next_queued() {
            let level = self.phase.level(node);
            if self.phase.is_reached(sink) && level >= self.phase.level(sink) {
                // FIFO order: everything still queued is at least as deep
                break;
            }
            for &id in network.adjacency(node) {
                let edge = network.edge(id);
                if edge.residual_capacity() > 0 && !self.phase.is_reached(edge.to) {
                    self.phase.discover(edge.to, level + 1);
                    labelled += 1;
                }
            }
        }

        self.profiler.record_labelled(labelled);
        self.phase.is_reached(sink)
    }

    /// One depth-first search of the level graph, pushing at most `limit`.
    ///
    /// Returns the amount pushed; zero means the phase's blocking flow is
    /// complete.
    fn augment(&mut self, network: &mut FlowNetwork, source: NodeId, sink: NodeId, limit: Flow) -> Flow {
        self.path.clear();
        let mut node = source;

        loop {
            if node == sink {
                let pushed = self
                    .path
                    .iter()
                    .map(|&id| network.edge(id).residual_capacity())
                    .fold(limit, Flow::min);
                for &id in &self.path {
                    network.push(id, pushed);
                }
                trace!("augmented {} along {} edges", pushed, self.path.len());
                return pushed;
            }

            match self.next_admissible(network, node) {
                Some(id) => {
                    self.path.push(id);
                    node = network.edge(id).to;
                }
                None => {
                    self.phase.mark_dead_end(node);
                    self.profiler.record_dead_end();
                    trace!("node {} is a dead end", node);
                    match self.path.pop() {
                        Some(id) => {
                            node = network.tail(id);
                            self.phase.advance_arc(node);
                        }
                        None => return 0,
                    }
                }
            }
        }
    }

    /// First edge at or after `node`'s current arc that climbs one level with
    /// residual capacity left. Skipped edges are passed for good.
    fn next_admissible(&mut self, network: &FlowNetwork, node: NodeId) -> Option<EdgeId> {
        let adjacency = network.adjacency(node);
        while let Some(&id) = adjacency.get(self.phase.arc(node)) {
            self.profiler.record_arc_scan();
            let edge = network.edge(id);
            if edge.residual_capacity() > 0 && self.phase.is_next_level(node, edge.to) {
                return Some(id);
            }
            self.phase.advance_arc(node);
        }
        None
    }

    /// Reads the cut induced by the final, sink-unreachable level pass
    fn extract_min_cut(&self, network: &FlowNetwork) -> MinCut {
        let source_side: Vec<NodeId> = self.phase.reached_nodes().collect();
        let mut cut_edges = Vec::new();
        let mut capacity: Capacity = 0;
        for (id, from, edge) in network.forward_edges() {
            if self.phase.is_reached(from) && !self.phase.is_reached(edge.to) {
                cut_edges.push(id);
                capacity += edge.capacity;
            }
        }
        MinCut { source_side, cut_edges, capacity }
    }
}

impl Algorithm for DinicSolver {
    fn name(&self) -> &'static str {
        "Dinic"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> &'static str {
        "Dinic maximum flow: BFS level graphs saturated by blocking flows found with current-arc, dead-end-pruned DFS."
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time_complexity: "O(V^2 E)",
            space_complexity: "O(V + E)",
            phase_bound: "O(V); O(sqrt(E)) with unit capacities",
            work_per_phase: "O(E) scanning plus O(V) per augmenting path",
        }
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        self.config.parameters()
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> AlgorithmResult<()> {
        self.config.set(name, value)
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        self.config.get(name)
    }

    fn metrics(&self) -> &AlgorithmMetrics {
        self.profiler.get_metrics()
    }
}

/// Maximum flow value from `source` to `sink` with a default solver
pub fn max_flow(network: &mut FlowNetwork, source: NodeId, sink: NodeId) -> AlgorithmResult<Flow> {
    DinicSolver::new()
        .solve(network, source, sink)
        .map(|result| result.max_flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::correctness::{verify_flow, verify_min_cut};
    use proptest::prelude::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn clrs_network() -> FlowNetwork {
        FlowNetwork::from_edges(
            6,
            [
                (0, 1, 16),
                (0, 2, 13),
                (1, 2, 10),
                (1, 3, 12),
                (2, 1, 4),
                (2, 4, 14),
                (3, 2, 9),
                (3, 5, 20),
                (4, 3, 7),
                (4, 5, 4),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_clrs_network_max_flow() {
        init_logging();
        let mut network = clrs_network();
        let result = DinicSolver::new().solve(&mut network, 0, 5).unwrap();

        assert_eq!(result.max_flow, 23);
        assert_eq!(result.termination, Termination::Optimal);
        assert_eq!(result.edge_flows.len(), 10);
        verify_flow(&network, 0, 5, result.max_flow).unwrap();
    }

    #[test]
    fn test_clrs_min_cut() {
        let mut network = clrs_network();
        let result = DinicSolver::new().solve(&mut network, 0, 5).unwrap();
        let cut = result.min_cut.expect("optimal solve carries a cut");

        assert_eq!(cut.source_side, vec![0, 1, 2, 4]);
        assert_eq!(cut.capacity, 23);
        let cut_pairs: Vec<_> = cut
            .cut_edges
            .iter()
            .map(|&id| (network.tail(id), network.edge(id).to))
            .collect();
        assert_eq!(cut_pairs, vec![(1, 3), (4, 3), (4, 5)]);
        verify_min_cut(&network, 0, 5, &cut, result.max_flow).unwrap();
    }

    #[test]
    fn test_empty_network_terminates_without_phases() {
        let mut network = FlowNetwork::new(4);
        let mut solver = DinicSolver::with_config(SolverConfig { record_trace: true, ..Default::default() }).unwrap();
        let result = solver.solve(&mut network, 0, 3).unwrap();

        assert_eq!(result.max_flow, 0);
        assert_eq!(result.termination, Termination::Optimal);
        assert_eq!(result.metrics.phases, 0);
        assert_eq!(result.metrics.nodes_labelled, 1);
        assert!(result.trace.unwrap().phases().is_empty());
        assert_eq!(result.min_cut.unwrap().source_side, vec![0]);
    }

    #[test]
    fn test_source_without_outgoing_edges() {
        let mut network = FlowNetwork::from_edges(3, [(1, 2, 5), (2, 0, 5)]).unwrap();
        assert_eq!(max_flow(&mut network, 0, 2).unwrap(), 0);
    }

    #[test]
    fn test_sink_unreachable() {
        let mut network = FlowNetwork::from_edges(4, [(0, 1, 10), (2, 3, 5)]).unwrap();
        assert_eq!(max_flow(&mut network, 0, 3).unwrap(), 0);
    }

    #[test]
    fn test_zero_capacity_edges_carry_nothing() {
        let mut network = FlowNetwork::from_edges(3, [(0, 1, 0), (1, 2, 9)]).unwrap();
        assert_eq!(max_flow(&mut network, 0, 2).unwrap(), 0);
    }

    #[test]
    fn test_invalid_terminals_rejected() {
        let mut network = clrs_network();
        let mut solver = DinicSolver::new();
        assert_eq!(
            solver.solve(&mut network, 6, 5).unwrap_err(),
            AlgorithmError::NodeOutOfRange { role: "source", node: 6, bound: 6 }
        );
        assert_eq!(
            solver.solve(&mut network, 0, 9).unwrap_err(),
            AlgorithmError::NodeOutOfRange { role: "sink", node: 9, bound: 6 }
        );
        assert_eq!(solver.solve(&mut network, 2, 2).unwrap_err(), AlgorithmError::SourceIsSink(2));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mut network = clrs_network();
        let mut solver = DinicSolver::new();
        let first = solver.solve(&mut network, 0, 5).unwrap();
        let second = solver.solve(&mut network, 0, 5).unwrap();

        assert_eq!(first.max_flow, second.max_flow);
        assert_eq!(first.edge_flows, second.edge_flows);
        assert_eq!(first.metrics.phases, second.metrics.phases);
    }

    #[test]
    fn test_parallel_and_self_loop_edges() {
        let mut network = FlowNetwork::from_edges(3, [(0, 1, 3), (0, 1, 4), (1, 1, 50), (1, 2, 10)]).unwrap();
        let result = DinicSolver::new().solve(&mut network, 0, 2).unwrap();
        assert_eq!(result.max_flow, 7);
        assert_eq!(result.edge_flows[2], 0);
    }

    #[test]
    fn test_dead_end_pruning_counts() {
        // 0 -> 2 -> 4 reaches the sink's level but 4 has nowhere to go
        let mut network = FlowNetwork::from_edges(5, [(0, 1, 1), (1, 3, 1), (0, 2, 1), (2, 4, 1)]).unwrap();
        let result = DinicSolver::new().solve(&mut network, 0, 3).unwrap();

        assert_eq!(result.max_flow, 1);
        assert_eq!(result.metrics.phases, 1);
        assert_eq!(result.metrics.augmentations, 1);
        // 4, then 2, then the exhausted source
        assert_eq!(result.metrics.dead_ends, 3);
    }

    #[test]
    fn test_phase_limit_leaves_feasible_flow() {
        let mut network = clrs_network();
        let mut solver = DinicSolver::new();
        solver.set_parameter("max_phases", "1").unwrap();
        let result = solver.solve(&mut network, 0, 5).unwrap();

        // First level graph only admits 0-1-3-5 (12) and 0-2-4-5 (4)
        assert_eq!(result.termination, Termination::PhaseLimit);
        assert_eq!(result.max_flow, 16);
        assert!(result.min_cut.is_none());
        verify_flow(&network, 0, 5, 16).unwrap();
    }

    #[test]
    fn test_cancelled_before_first_phase() {
        let mut network = clrs_network();
        let token = CancellationToken::new();
        token.cancel();
        let result = DinicSolver::new()
            .solve_with_cancel(&mut network, 0, 5, Some(&token))
            .unwrap();

        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.max_flow, 0);
        assert_eq!(result.metrics.phases, 0);
    }

    #[test]
    fn test_cancelled_after_first_phase_keeps_partial_flow() {
        let mut network = clrs_network();
        let token = CancellationToken::new();
        let mut seen = Vec::new();
        let result = DinicSolver::new()
            .run_phases(&mut network, 0, 5, Some(&token), |record| {
                seen.push(record.gained);
                token.cancel();
            })
            .unwrap();

        assert_eq!(seen, vec![16]);
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.max_flow, 16);
        assert_eq!(result.metrics.phases, 1);
        assert!(result.min_cut.is_none());
        verify_flow(&network, 0, 5, 16).unwrap();
    }

    #[test]
    fn test_trace_matches_result() {
        let mut network = clrs_network();
        let mut solver = DinicSolver::new();
        solver.set_parameter("record_trace", "true").unwrap();
        let result = solver.solve(&mut network, 0, 5).unwrap();
        let trace = result.trace.unwrap();

        assert_eq!(trace.algorithm(), "Dinic");
        assert_eq!(trace.total_gained(), 23);
        assert_eq!(trace.phases().len(), result.metrics.phases);
        assert_eq!(trace.phases()[0].target_level, 3);
        assert_eq!(trace.phases()[0].gained, 16);
        assert_eq!(trace.termination(), Some(Termination::Optimal));
        // Source-to-sink distance strictly increases between phases
        assert!(trace.phases().windows(2).all(|w| w[0].target_level < w[1].target_level));
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let n = 200_000;
        let mut network = FlowNetwork::new(n);
        for node in 0..n - 1 {
            network.add_edge(node, node + 1, 2).unwrap();
        }
        assert_eq!(max_flow(&mut network, 0, n - 1).unwrap(), 2);
    }

    #[test]
    fn test_decomposition_sums_to_value() {
        let mut network = clrs_network();
        let result = DinicSolver::new().solve(&mut network, 0, 5).unwrap();
        let paths = network.decompose_paths(0, 5).unwrap();

        assert_eq!(paths.iter().map(|p| p.amount).sum::<Flow>(), result.max_flow);
        for path in &paths {
            assert_eq!(path.nodes.first(), Some(&0));
            assert_eq!(path.nodes.last(), Some(&5));
            assert_eq!(path.edges.len() + 1, path.nodes.len());
        }
    }

    #[test]
    fn test_algorithm_surface() {
        let mut solver = DinicSolver::new();
        assert_eq!(solver.name(), "Dinic");
        assert_eq!(solver.category(), "max_flow");
        assert_eq!(solver.complexity().space_complexity, "O(V + E)");
        assert_eq!(solver.get_parameter("max_phases").as_deref(), Some("none"));
        assert!(solver.set_parameter("max_phases", "0").is_err());
        assert!(solver.set_parameter("global_relabel_frequency", "5").is_err());
        assert_eq!(solver.parameters().len(), 2);
    }

    /// Minimum over every s-t cut, by enumeration
    fn brute_force_min_cut(n: usize, edges: &[(usize, usize, i64)], source: usize, sink: usize) -> i64 {
        (0u32..1 << n)
            .filter(|mask| mask & (1 << source) != 0 && mask & (1 << sink) == 0)
            .map(|mask| {
                edges
                    .iter()
                    .filter(|&&(u, v, _)| mask & (1 << u) != 0 && mask & (1 << v) == 0)
                    .map(|&(_, _, c)| c)
                    .sum::<i64>()
            })
            .min()
            .unwrap_or(0)
    }

    fn arb_network() -> impl Strategy<Value = (usize, Vec<(usize, usize, i64)>)> {
        (2usize..8).prop_flat_map(|n| {
            let edge = (0..n, 0..n, 0i64..12);
            (Just(n), prop::collection::vec(edge, 0..24))
        })
    }

    proptest! {
        #[test]
        fn prop_max_flow_equals_min_cut((n, edges) in arb_network()) {
            let mut network = FlowNetwork::from_edges(n, edges.iter().copied()).unwrap();
            let sink = n - 1;
            let result = DinicSolver::new().solve(&mut network, 0, sink).unwrap();

            prop_assert_eq!(result.max_flow, brute_force_min_cut(n, &edges, 0, sink));
            prop_assert!(verify_flow(&network, 0, sink, result.max_flow).is_ok());
            let cut = result.min_cut.unwrap();
            prop_assert!(verify_min_cut(&network, 0, sink, &cut, result.max_flow).is_ok());
        }

        #[test]
        fn prop_phase_limited_flow_is_feasible((n, edges) in arb_network(), limit in 1usize..3) {
            let mut network = FlowNetwork::from_edges(n, edges.iter().copied()).unwrap();
            let config = SolverConfig { max_phases: Some(limit), record_trace: false };
            let result = DinicSolver::with_config(config).unwrap().solve(&mut network, 0, n - 1).unwrap();

            prop_assert!(result.metrics.phases <= limit);
            prop_assert!(verify_flow(&network, 0, n - 1, result.max_flow).is_ok());
        }
    }
}
