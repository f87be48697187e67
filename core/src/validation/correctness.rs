//! Correctness certificates for solve results
//!
//! Each check recomputes a property of the output from the graph alone, so a
//! result can be validated independently of the solver that produced it:
//! capacity bounds and conservation for flows, the max-flow/min-cut equality,
//! injectivity of matchings and König's cover equality.

use thiserror::Error;

use crate::algorithm::graph::matching::{MatchingResult, VertexCover};
use crate::algorithm::graph::max_flow::MinCut;
use crate::algorithm::traits::{Capacity, EdgeId, Flow, NodeId};
use crate::data_structures::graph::{BipartiteGraph, FlowNetwork};

/// A violated certificate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("edge {edge} carries {flow}, outside [0, {capacity}]")]
    CapacityViolated { edge: EdgeId, flow: Flow, capacity: Capacity },

    #[error("edge {edge} and its reverse carry {flow} and {reverse_flow}")]
    ReverseMismatch { edge: EdgeId, flow: Flow, reverse_flow: Flow },

    #[error("node {node} has net outflow {net}")]
    ConservationViolated { node: NodeId, net: Flow },

    #[error("source emits {actual} but value {expected} was reported")]
    ValueMismatch { expected: Flow, actual: Flow },

    #[error("cut {reason}")]
    InvalidCut { reason: String },

    #[error("cut capacity {capacity} differs from flow value {value}")]
    CutMismatch { capacity: Capacity, value: Flow },

    #[error("pair ({left}, {right}) is not an edge of the graph")]
    MissingEdge { left: NodeId, right: NodeId },

    #[error("{side} node {node} is matched more than once")]
    NotInjective { side: &'static str, node: NodeId },

    #[error("partner arrays disagree with the pair list at {side} node {node}")]
    PartnerMismatch { side: &'static str, node: NodeId },

    #[error("{side} partner array holds {partnered} partners for {pairs} pairs")]
    PartnerCountMismatch { side: &'static str, partnered: usize, pairs: usize },

    #[error("matching reports size {reported} but lists {pairs} pairs")]
    SizeMismatch { reported: usize, pairs: usize },

    #[error("matching size {size} exceeds min(|L|, |R|) = {bound}")]
    MatchingTooLarge { size: usize, bound: usize },

    #[error("cover {reason}")]
    InvalidCover { reason: String },

    #[error("edge ({left}, {right}) is not covered")]
    Uncovered { left: NodeId, right: NodeId },

    #[error("cover has {cover} nodes but the matching has {matching} pairs")]
    CoverSizeMismatch { cover: usize, matching: usize },
}

pub type VerificationResult = Result<(), VerificationError>;

/// Checks capacity bounds, pair antisymmetry, conservation at every node
/// other than `source` and `sink`, and that `source` emits `value`
pub fn verify_flow(network: &FlowNetwork, source: NodeId, sink: NodeId, value: Flow) -> VerificationResult {
    for (id, _, edge) in network.forward_edges() {
        if edge.flow < 0 || edge.flow > edge.capacity {
            return Err(VerificationError::CapacityViolated {
                edge: id,
                flow: edge.flow,
                capacity: edge.capacity,
            });
        }
        let reverse_flow = network.edge(edge.reverse).flow;
        if reverse_flow != -edge.flow {
            return Err(VerificationError::ReverseMismatch { edge: id, flow: edge.flow, reverse_flow });
        }
    }

    for node in (0..network.node_count()).filter(|&n| n != source && n != sink) {
        let net = network.net_outflow(node);
        if net != 0 {
            return Err(VerificationError::ConservationViolated { node, net });
        }
    }

    let actual = network.net_outflow(source);
    if actual != value {
        return Err(VerificationError::ValueMismatch { expected: value, actual });
    }
    Ok(())
}

/// Checks that `cut` separates `source` from `sink`, lists exactly the edges
/// leaving its source side, and that its capacity equals `value`
pub fn verify_min_cut(network: &FlowNetwork, source: NodeId, sink: NodeId, cut: &MinCut, value: Flow) -> VerificationResult {
    let mut source_side = vec![false; network.node_count()];
    for &node in &cut.source_side {
        if node >= network.node_count() {
            return Err(VerificationError::InvalidCut { reason: format!("names unknown node {node}") });
        }
        source_side[node] = true;
    }
    if !source_side[source] || source_side[sink] {
        return Err(VerificationError::InvalidCut {
            reason: "does not separate source from sink".to_owned(),
        });
    }

    let crossing: Vec<EdgeId> = network
        .forward_edges()
        .filter(|&(_, from, edge)| source_side[from] && !source_side[edge.to])
        .map(|(id, _, _)| id)
        .collect();
    if crossing != cut.cut_edges {
        return Err(VerificationError::InvalidCut {
            reason: "edge list differs from the edges leaving the source side".to_owned(),
        });
    }

    let capacity: Capacity = crossing.iter().map(|&id| network.edge(id).capacity).sum();
    if capacity != cut.capacity || capacity != value {
        return Err(VerificationError::CutMismatch { capacity, value });
    }
    Ok(())
}

/// Checks that every pair is a graph edge, no node is used twice, the partner
/// arrays agree with the pair list, and the size is within bounds
pub fn verify_matching(graph: &BipartiteGraph, result: &MatchingResult) -> VerificationResult {
    let bound = graph.left_count().min(graph.right_count());
    if result.size > bound {
        return Err(VerificationError::MatchingTooLarge { size: result.size, bound });
    }

    let mut left_used = vec![false; graph.left_count()];
    let mut right_used = vec![false; graph.right_count()];
    for &(left, right) in &result.pairs {
        if !graph.has_edge(left, right) {
            return Err(VerificationError::MissingEdge { left, right });
        }
        if std::mem::replace(&mut left_used[left], true) {
            return Err(VerificationError::NotInjective { side: "left", node: left });
        }
        if std::mem::replace(&mut right_used[right], true) {
            return Err(VerificationError::NotInjective { side: "right", node: right });
        }
        if result.pair_left.get(left) != Some(&Some(right)) {
            return Err(VerificationError::PartnerMismatch { side: "left", node: left });
        }
        if result.pair_right.get(right) != Some(&Some(left)) {
            return Err(VerificationError::PartnerMismatch { side: "right", node: right });
        }
    }

    let pairs = result.pairs.len();
    for (side, partners) in [("left", &result.pair_left), ("right", &result.pair_right)] {
        let partnered = partners.iter().flatten().count();
        if partnered != pairs {
            return Err(VerificationError::PartnerCountMismatch { side, partnered, pairs });
        }
    }
    if result.size != pairs {
        return Err(VerificationError::SizeMismatch { reported: result.size, pairs });
    }
    Ok(())
}

/// Checks that `cover` is a set of distinct graph nodes touching every edge
/// and that it has `matching_size` nodes
pub fn verify_vertex_cover(graph: &BipartiteGraph, cover: &VertexCover, matching_size: usize) -> VerificationResult {
    let left_in = cover_members("left", &cover.left, graph.left_count())?;
    let right_in = cover_members("right", &cover.right, graph.right_count())?;

    for left in 0..graph.left_count() {
        for &right in graph.neighbors(left) {
            if !left_in[left] && !right_in[right] {
                return Err(VerificationError::Uncovered { left, right });
            }
        }
    }
    if cover.len() != matching_size {
        return Err(VerificationError::CoverSizeMismatch { cover: cover.len(), matching: matching_size });
    }
    Ok(())
}

/// Membership flags for one side of a cover; unknown or repeated ids are errors
fn cover_members(side: &str, nodes: &[NodeId], bound: usize) -> Result<Vec<bool>, VerificationError> {
    let mut member = vec![false; bound];
    for &node in nodes {
        let Some(slot) = member.get_mut(node) else {
            return Err(VerificationError::InvalidCover { reason: format!("names unknown {side} node {node}") });
        };
        if std::mem::replace(slot, true) {
            return Err(VerificationError::InvalidCover { reason: format!("lists {side} node {node} twice") });
        }
    }
    Ok(member)
}
