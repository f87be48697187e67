//! Graph representations consumed by the layered solvers
//!
//! [`FlowNetwork`] is a residual edge arena: every user edge is stored as a
//! forward edge followed immediately by its capacity-zero back-edge, and each
//! records the other's arena index. Adjacency lists hold arena indices, so the
//! reverse of any edge is one array lookup and the whole structure is plain
//! integers that can be shared read-only once a solve has finished.
//!
//! [`BipartiteGraph`] stores only left-to-right arcs. Alternating-path search
//! consults the matching arrays instead of residual capacities, so no reverse
//! arcs are needed.
//!
//! Both builders are append-only and validate every insertion.

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{
    check_node, AlgorithmError, AlgorithmResult, Capacity, EdgeId, Flow, NodeId,
};

/// Flow edge representation with residual capacity tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Target vertex
    pub to: NodeId,
    /// Original edge capacity; zero for back-edges
    pub capacity: Capacity,
    /// Current flow; back-edges always carry the negated flow of their pair
    pub flow: Flow,
    /// Arena index of the paired edge
    pub reverse: EdgeId,
}

impl FlowEdge {
    /// Remaining pushable flow
    #[inline]
    pub fn residual_capacity(&self) -> Capacity {
        self.capacity - self.flow
    }
}

/// One source-to-sink path of a flow decomposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPath {
    /// Path vertices, source first and sink last
    pub nodes: Vec<NodeId>,
    /// Forward edge ids, `nodes.len() - 1` of them
    pub edges: Vec<EdgeId>,
    /// Flow carried along the path
    pub amount: Flow,
}

/// Flow network with a flat residual edge arena
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowNetwork {
    node_count: usize,
    adjacency: Vec<Vec<EdgeId>>,
    edges: Vec<FlowEdge>,
    /// Sum of all forward capacities; bounds every flow value
    total_capacity: Capacity,
}

impl FlowNetwork {
    /// Create new flow network with specified vertex count
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            adjacency: vec![Vec::new(); node_count],
            edges: Vec::new(),
            total_capacity: 0,
        }
    }

    /// Builds a network from `(from, to, capacity)` triples
    pub fn from_edges<I>(node_count: usize, edges: I) -> AlgorithmResult<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId, Capacity)>,
    {
        let mut network = Self::new(node_count);
        for (from, to, capacity) in edges {
            network.add_edge(from, to, capacity)?;
        }
        Ok(network)
    }

    /// Adds a forward edge and its capacity-zero back-edge.
    ///
    /// Returns the forward edge's arena id. Fails on out-of-range endpoints,
    /// negative capacity, or when the running capacity total would overflow.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: Capacity) -> AlgorithmResult<EdgeId> {
        check_node("from", from, self.node_count)?;
        check_node("to", to, self.node_count)?;
        if capacity < 0 {
            return Err(AlgorithmError::NegativeCapacity { from, to, capacity });
        }
        let total_capacity = self
            .total_capacity
            .checked_add(capacity)
            .ok_or(AlgorithmError::CapacityOverflow { from, to })?;

        let forward = self.edges.len();
        let backward = forward + 1;

        self.edges.push(FlowEdge { to, capacity, flow: 0, reverse: backward });
        self.edges.push(FlowEdge { to: from, capacity: 0, flow: 0, reverse: forward });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(backward);
        self.total_capacity = total_capacity;

        Ok(forward)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of user edges (back-edges not counted)
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    #[inline]
    pub fn total_capacity(&self) -> Capacity {
        self.total_capacity
    }

    /// Arena entry for `id`, forward or back-edge
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &FlowEdge {
        &self.edges[id]
    }

    /// Flow on an edge returned by [`FlowNetwork::add_edge`]
    #[inline]
    pub fn edge_flow(&self, id: EdgeId) -> Flow {
        self.edges[id].flow
    }

    /// Tail vertex of `id`, read through its paired edge
    #[inline]
    pub fn tail(&self, id: EdgeId) -> NodeId {
        self.edges[self.edges[id].reverse].to
    }

    /// Forward edges carry even arena ids
    #[inline]
    pub fn is_forward(id: EdgeId) -> bool {
        id % 2 == 0
    }

    /// Outgoing arena ids of `node`, forward and back-edges in insertion order
    #[inline]
    pub fn adjacency(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node]
    }

    /// User edges as `(id, from, edge)` in insertion order
    pub fn forward_edges(&self) -> impl Iterator<Item = (EdgeId, NodeId, &FlowEdge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .step_by(2)
            .map(move |(id, edge)| (id, self.tail(id), edge))
    }

    /// Flow leaving `node` minus flow entering it
    pub fn net_outflow(&self, node: NodeId) -> Flow {
        self.adjacency[node].iter().map(|&id| self.edges[id].flow).sum()
    }

    /// Zeroes every flow; the adjacency structure is untouched
    pub fn reset_flow(&mut self) {
        for edge in &mut self.edges {
            edge.flow = 0;
        }
    }

    /// Pushes `amount` along `id` and takes it back from the paired edge
    #[inline]
    pub(crate) fn push(&mut self, id: EdgeId, amount: Flow) {
        let reverse = self.edges[id].reverse;
        self.edges[id].flow += amount;
        self.edges[reverse].flow -= amount;
    }

    /// Splits the current flow into source-to-sink paths.
    ///
    /// Flow cycles met during the walk are cancelled and not reported, so the
    /// amounts sum to the net outflow of `source`. The network itself is not
    /// modified.
    pub fn decompose_paths(&self, source: NodeId, sink: NodeId) -> AlgorithmResult<Vec<FlowPath>> {
        const OFF_PATH: usize = usize::MAX;

        check_node("source", source, self.node_count)?;
        check_node("sink", sink, self.node_count)?;
        if source == sink {
            return Err(AlgorithmError::SourceIsSink(source));
        }

        let mut remaining: Vec<Flow> = self
            .edges
            .iter()
            .enumerate()
            .map(|(id, edge)| if Self::is_forward(id) { edge.flow.max(0) } else { 0 })
            .collect();
        let mut cursor = vec![0usize; self.node_count];
        let mut on_path = vec![OFF_PATH; self.node_count];
        let mut paths = Vec::new();

        loop {
            let mut nodes = vec![source];
            let mut path_edges: Vec<EdgeId> = Vec::new();
            on_path[source] = 0;
            let mut current = source;

            while current != sink {
                let adjacency = &self.adjacency[current];
                while cursor[current] < adjacency.len() && remaining[adjacency[cursor[current]]] == 0 {
                    cursor[current] += 1;
                }
                let Some(&id) = adjacency.get(cursor[current]) else {
                    break;
                };
                let next = self.edges[id].to;

                if on_path[next] == OFF_PATH {
                    on_path[next] = nodes.len();
                    nodes.push(next);
                    path_edges.push(id);
                } else {
                    // Closing a cycle: cancel its bottleneck and rewind to `next`
                    let start = on_path[next];
                    let cycle_min = path_edges[start..]
                        .iter()
                        .map(|&e| remaining[e])
                        .fold(remaining[id], Flow::min);
                    remaining[id] -= cycle_min;
                    for &e in &path_edges[start..] {
                        remaining[e] -= cycle_min;
                    }
                    for &node in &nodes[start + 1..] {
                        on_path[node] = OFF_PATH;
                    }
                    nodes.truncate(start + 1);
                    path_edges.truncate(start);
                }
                current = next;
            }

            for &node in &nodes {
                on_path[node] = OFF_PATH;
            }
            if current != sink {
                break;
            }

            let amount = path_edges
                .iter()
                .map(|&e| remaining[e])
                .min()
                .unwrap_or(0);
            for &e in &path_edges {
                remaining[e] -= amount;
            }
            paths.push(FlowPath { nodes, edges: path_edges, amount });
        }

        Ok(paths)
    }
}

/// Directed bipartite adjacency from left nodes to right nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BipartiteGraph {
    left_count: usize,
    right_count: usize,
    adjacency: Vec<Vec<NodeId>>,
    edge_count: usize,
}

impl BipartiteGraph {
    pub fn new(left_count: usize, right_count: usize) -> Self {
        Self {
            left_count,
            right_count,
            adjacency: vec![Vec::new(); left_count],
            edge_count: 0,
        }
    }

    /// Builds a graph from `(left, right)` pairs
    pub fn from_edges<I>(left_count: usize, right_count: usize, edges: I) -> AlgorithmResult<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = Self::new(left_count, right_count);
        for (left, right) in edges {
            graph.add_edge(left, right)?;
        }
        Ok(graph)
    }

    /// Appends the arc `left -> right`. Duplicate arcs are kept.
    pub fn add_edge(&mut self, left: NodeId, right: NodeId) -> AlgorithmResult<()> {
        check_node("left", left, self.left_count)?;
        check_node("right", right, self.right_count)?;
        self.adjacency[left].push(right);
        self.edge_count += 1;
        Ok(())
    }

    #[inline]
    pub fn left_count(&self) -> usize {
        self.left_count
    }

    #[inline]
    pub fn right_count(&self) -> usize {
        self.right_count
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn neighbors(&self, left: NodeId) -> &[NodeId] {
        &self.adjacency[left]
    }

    pub fn has_edge(&self, left: NodeId, right: NodeId) -> bool {
        left < self.left_count && self.adjacency[left].contains(&right)
    }
}
