//! Phase-local search state shared by the layered solvers
//!
//! Both Dinic and Hopcroft-Karp run the same two-step phase: a breadth-first
//! pass assigns every node a level, then depth-first searches walk only edges
//! that climb exactly one level. The searches resume each node's scan at its
//! current arc, which only moves forward during a phase, and a node whose arcs
//! are exhausted has its level cleared so no later search enters it again.
//!
//! [`PhaseState`] owns the `level` and `arc` arrays plus the BFS queue. Every
//! solver owns its own instance, so independent solves never share it.

use std::collections::VecDeque;

use crate::algorithm::traits::NodeId;

/// Level of a node not reached by the current level assignment
pub const UNREACHED: usize = usize::MAX;

/// Levels, current arcs and the BFS work queue for one phase
#[derive(Debug, Clone, Default)]
pub struct PhaseState {
    level: Vec<usize>,
    arc: Vec<usize>,
    queue: VecDeque<NodeId>,
}

impl PhaseState {
    pub fn new(node_count: usize) -> Self {
        Self {
            level: vec![UNREACHED; node_count],
            arc: vec![0; node_count],
            queue: VecDeque::with_capacity(node_count),
        }
    }

    /// Resizes for a graph of `node_count` nodes and forgets all labels
    pub fn resize(&mut self, node_count: usize) {
        self.level.clear();
        self.level.resize(node_count, UNREACHED);
        self.arc.clear();
        self.arc.resize(node_count, 0);
        self.queue.clear();
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.level.len()
    }

    /// Clears every level and empties the queue before a BFS pass
    pub fn begin_level_pass(&mut self) {
        self.level.fill(UNREACHED);
        self.queue.clear();
    }

    /// Labels `node` and enqueues it
    #[inline]
    pub fn discover(&mut self, node: NodeId, level: usize) {
        self.level[node] = level;
        self.queue.push_back(node);
    }

    #[inline]
    pub fn next_queued(&mut self) -> Option<NodeId> {
        self.queue.pop_front()
    }

    #[inline]
    pub fn level(&self, node: NodeId) -> usize {
        self.level[node]
    }

    #[inline]
    pub fn is_reached(&self, node: NodeId) -> bool {
        self.level[node] != UNREACHED
    }

    /// True when `to` sits exactly one level above `from` in the level graph
    #[inline]
    pub fn is_next_level(&self, from: NodeId, to: NodeId) -> bool {
        let from_level = self.level[from];
        from_level != UNREACHED && self.level[to] == from_level + 1
    }

    /// Rewinds every current arc; called once per phase, never within one
    pub fn reset_arcs(&mut self) {
        self.arc.fill(0);
    }

    #[inline]
    pub fn arc(&self, node: NodeId) -> usize {
        self.arc[node]
    }

    #[inline]
    pub fn advance_arc(&mut self, node: NodeId) {
        self.arc[node] += 1;
    }

    /// Removes `node` from the level graph for the rest of the phase
    #[inline]
    pub fn mark_dead_end(&mut self, node: NodeId) {
        self.level[node] = UNREACHED;
    }

    /// Nodes holding a level after the most recent pass
    pub fn reached_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.level
            .iter()
            .enumerate()
            .filter(|(_, &level)| level != UNREACHED)
            .map(|(node, _)| node)
    }
}
