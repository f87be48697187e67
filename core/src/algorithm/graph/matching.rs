//! Hopcroft-Karp maximum bipartite matching
//!
//! Same phase skeleton as the flow solver, specialised to alternating paths:
//! the level assigner seeds every free left node at distance zero and
//! alternates unmatched left-to-right arcs with matched right-to-left steps,
//! stopping at the first layer that touches a free right node. The search
//! then tries each free left node once, walking only arcs that climb one
//! level and flipping the matching along any alternating path it completes.
//!
//! A maximal set of shortest augmenting paths per phase bounds the phase
//! count by O(sqrt(V)), for O(E sqrt(V)) in total.
//!
//! Supplying an arc between two left nodes is a caller error; the graph type
//! keeps the two sides in separate index spaces so it cannot be expressed.

use log::{debug, info, trace, warn};
use serde::{Serialize, Deserialize};

use crate::algorithm::config::SolverConfig;
use crate::algorithm::state::{PhaseState, UNREACHED};
use crate::algorithm::traits::{
    Algorithm, AlgorithmComplexity, AlgorithmMetrics, AlgorithmParameter, AlgorithmProfiler,
    AlgorithmResult, Flow, NodeId,
};
use crate::data_structures::graph::BipartiteGraph;
use crate::execution::control::{CancellationToken, PhaseGate, Termination};
use crate::execution::tracer::{ExecutionTracer, PhaseRecord};

/// Partner of a node that has none
const UNMATCHED: NodeId = usize::MAX;

/// Minimum vertex cover derived from a maximum matching (König)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexCover {
    pub left: Vec<NodeId>,
    pub right: Vec<NodeId>,
}

impl VertexCover {
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Matching result with both partner arrays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingResult {
    /// Number of matched pairs
    pub size: usize,
    /// `(left, right)` pairs in left-node order
    pub pairs: Vec<(NodeId, NodeId)>,
    pub pair_left: Vec<Option<NodeId>>,
    pub pair_right: Vec<Option<NodeId>>,
    /// Present only for optimal solves
    pub vertex_cover: Option<VertexCover>,
    pub termination: Termination,
    pub metrics: AlgorithmMetrics,
    pub trace: Option<ExecutionTracer>,
}

/// Outcome of probing one arc during the search
enum Step {
    /// The arc ends at a free right node one level above
    Free,
    /// The arc leads, through a matched right node, to this left node
    Descend(NodeId),
}

/// Hopcroft-Karp solver owning the matching arrays and phase-local state
#[derive(Debug, Clone, Default)]
pub struct HopcroftKarpSolver {
    config: SolverConfig,
    /// Levels and current arcs over left nodes
    phase: PhaseState,
    /// Level of the virtual target "any free right node"
    free_level: usize,
    pair_left: Vec<NodeId>,
    pair_right: Vec<NodeId>,
    /// Left nodes of the partial alternating path, root first
    stack: Vec<NodeId>,
    profiler: AlgorithmProfiler,
}

impl HopcroftKarpSolver {
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

    /// Computes a maximum matching of `graph`, starting from the empty one
    pub fn solve(&mut self, graph: &BipartiteGraph) -> MatchingResult {
        self.solve_with_cancel(graph, None)
    }

    /// Like [`HopcroftKarpSolver::solve`], polling `cancel` between phases
    pub fn solve_with_cancel(&mut self, graph: &BipartiteGraph, cancel: Option<&CancellationToken>) -> MatchingResult {
        self.run_phases(graph, cancel, |_| {})
    }

    /// Phase loop behind the public entry points; `on_phase` sees each
    /// completed phase before the next cancellation check.
    fn run_phases<F>(&mut self, graph: &BipartiteGraph, cancel: Option<&CancellationToken>, mut on_phase: F) -> MatchingResult
    where
        F: FnMut(&PhaseRecord),
    {
        self.reset(graph);
        self.profiler.start();

        let gate = PhaseGate::new(self.config.max_phases, cancel);
        let mut tracer = self.config.record_trace.then(|| ExecutionTracer::new(self.name()));
        let mut size = 0usize;
        let mut phase = 0;

        let termination = loop {
            if !self.assign_levels(graph) {
                break Termination::Optimal;
            }
            if let Some(stop) = gate.check(phase) {
                break stop;
            }

            let target_level = self.free_level;
            let dead_ends_before = self.profiler.get_metrics().dead_ends;
            self.phase.reset_arcs();
            self.profiler.record_phase();

            let mut gained = 0usize;
            for root in 0..graph.left_count() {
                if self.pair_left[root] == UNMATCHED && self.augment_from(graph, root) {
                    gained += 1;
                    self.profiler.record_augmentation();
                }
            }
            size += gained;

            let dead_ends = self.profiler.get_metrics().dead_ends - dead_ends_before;
            debug!(
                "Hopcroft-Karp phase {}: free level {}, +{} pairs, {} dead ends",
                phase, target_level, gained, dead_ends
            );
            let record = PhaseRecord {
                phase,
                target_level,
                augmentations: gained,
                gained: gained as Flow,
                dead_ends,
            };
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

        let vertex_cover = if termination.is_optimal() {
            info!(
                "Hopcroft-Karp matching of size {} on {}x{} nodes in {} phases ({:?})",
                size,
                graph.left_count(),
                graph.right_count(),
                metrics.phases,
                metrics.execution_time
            );
            Some(self.extract_vertex_cover(graph))
        } else {
            warn!(
                "Hopcroft-Karp stopped early ({:?}) after {} phases with {} pairs",
                termination, metrics.phases, size
            );
            None
        };

        MatchingResult {
            size,
            pairs: self.pairs().collect(),
            pair_left: Self::partners(&self.pair_left),
            pair_right: Self::partners(&self.pair_right),
            vertex_cover,
            termination,
            metrics,
            trace: tracer,
        }
    }

    fn reset(&mut self, graph: &BipartiteGraph) {
        self.phase.resize(graph.left_count());
        self.free_level = UNREACHED;
        self.pair_left.clear();
        self.pair_left.resize(graph.left_count(), UNMATCHED);
        self.pair_right.clear();
        self.pair_right.resize(graph.right_count(), UNMATCHED);
        self.stack.clear();
    }

    /// Alternating BFS from all free left nodes.
    ///
    /// Returns whether some free right node is reachable; left nodes at or
    /// beyond the free right nodes' level are not expanded.
    fn assign_levels(&mut self, graph: &BipartiteGraph) -> bool {
        self.phase.begin_level_pass();
        self.free_level = UNREACHED;
        let mut labelled = 0;

        for left in 0..graph.left_count() {
            if self.pair_left[left] == UNMATCHED {
                self.phase.discover(left, 0);
                labelled += 1;
            }
        }

        while let Some(left) = self.phase.next_queued() {
            let level = self.phase.level(left);
            if level >= self.free_level {
                break;
            }
            for &right in graph.neighbors(left) {
                match self.pair_right[right] {
                    UNMATCHED => {
                        if self.free_level == UNREACHED {
                            self.free_level = level + 1;
                        }
                    }
                    mate => {
                        if !self.phase.is_reached(mate) {
                            self.phase.discover(mate, level + 1);
                            labelled += 1;
                        }
                    }
                }
            }
        }

        self.profiler.record_labelled(labelled);
        self.free_level != UNREACHED
    }

    /// Searches one alternating path from the free left node `root` and
    /// flips the matching along it on success.
    fn augment_from(&mut self, graph: &BipartiteGraph, root: NodeId) -> bool {
        self.stack.clear();
        self.stack.push(root);

        while let Some(&left) = self.stack.last() {
            match self.next_admissible(graph, left) {
                Some(Step::Free) => {
                    self.flip_path(graph);
                    trace!("augmenting path of length {} from left {}", 2 * self.stack.len() - 1, root);
                    return true;
                }
                Some(Step::Descend(mate)) => self.stack.push(mate),
                None => {
                    self.phase.mark_dead_end(left);
                    self.profiler.record_dead_end();
                    trace!("left {} is a dead end", left);
                    self.stack.pop();
                    if let Some(&parent) = self.stack.last() {
                        self.phase.advance_arc(parent);
                    }
                }
            }
        }
        false
    }

    /// Probes arcs of `left` from its current arc onward. The arc of the
    /// returned step stays current so the flip can read it back.
    fn next_admissible(&mut self, graph: &BipartiteGraph, left: NodeId) -> Option<Step> {
        let neighbors = graph.neighbors(left);
        let level = self.phase.level(left);
        while let Some(&right) = neighbors.get(self.phase.arc(left)) {
            self.profiler.record_arc_scan();
            match self.pair_right[right] {
                UNMATCHED if level != UNREACHED && self.free_level == level + 1 => {
                    return Some(Step::Free);
                }
                UNMATCHED => {}
                mate => {
                    if self.phase.is_next_level(left, mate) {
                        return Some(Step::Descend(mate));
                    }
                }
            }
            self.phase.advance_arc(left);
        }
        None
    }

    /// Matches every stacked left node to the right node under its arc
    fn flip_path(&mut self, graph: &BipartiteGraph) {
        for &left in &self.stack {
            let right = graph.neighbors(left)[self.phase.arc(left)];
            self.pair_left[left] = right;
            self.pair_right[right] = left;
        }
    }

    fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pair_left
            .iter()
            .enumerate()
            .filter(|(_, &right)| right != UNMATCHED)
            .map(|(left, &right)| (left, right))
    }

    fn partners(pairs: &[NodeId]) -> Vec<Option<NodeId>> {
        pairs
            .iter()
            .map(|&mate| (mate != UNMATCHED).then_some(mate))
            .collect()
    }

    /// König's construction from the final, free-node-unreachable BFS:
    /// unreached left nodes plus right nodes adjacent to reached left nodes
    fn extract_vertex_cover(&self, graph: &BipartiteGraph) -> VertexCover {
        let mut right_reached = vec![false; graph.right_count()];
        for left in self.phase.reached_nodes() {
            for &right in graph.neighbors(left) {
                right_reached[right] = true;
            }
        }
        VertexCover {
            left: (0..graph.left_count())
                .filter(|&left| !self.phase.is_reached(left))
                .collect(),
            right: (0..graph.right_count())
                .filter(|&right| right_reached[right])
                .collect(),
        }
    }
}

impl Algorithm for HopcroftKarpSolver {
    fn name(&self) -> &'static str {
        "Hopcroft-Karp"
    }

    fn category(&self) -> &'static str {
        "matching"
    }

    fn description(&self) -> &'static str {
        "Hopcroft-Karp maximum bipartite matching: alternating BFS layers followed by vertex-disjoint shortest augmenting paths per phase."
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time_complexity: "O(E sqrt(V))",
            space_complexity: "O(V + E)",
            phase_bound: "O(sqrt(V))",
            work_per_phase: "O(E)",
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

/// Maximum matching of `graph` with a default solver
pub fn maximum_matching(graph: &BipartiteGraph) -> MatchingResult {
    HopcroftKarpSolver::new().solve(graph)
}
