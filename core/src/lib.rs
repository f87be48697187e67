//! CHRONOS flow core
//!
//! Layered augmenting-path engine shared by Dinic maximum flow and
//! Hopcroft-Karp maximum bipartite matching. Both solvers alternate a
//! breadth-first level pass with a blocking search restricted to arcs that
//! climb exactly one level, until the target is unreachable.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod execution;
pub mod optimization;
pub mod validation;

pub use algorithm::config::SolverConfig;
pub use algorithm::graph::matching::{maximum_matching, HopcroftKarpSolver, MatchingResult, VertexCover};
pub use algorithm::graph::max_flow::{max_flow, DinicSolver, MaxFlowResult, MinCut};
pub use algorithm::traits::{
    Algorithm, AlgorithmError, AlgorithmMetrics, AlgorithmResult, Capacity, EdgeId, Flow, NodeId,
};
pub use data_structures::graph::{BipartiteGraph, FlowEdge, FlowNetwork, FlowPath};
pub use execution::control::{CancellationToken, Termination};
pub use execution::tracer::{ExecutionTracer, PhaseRecord};
