//! Batch solving on the rayon thread pool
//!
//! A single solve is sequential: every phase depends on the flow or matching
//! left by the previous one. Independent instances share nothing, so a batch
//! fans out one solver per worker thread and collects results in input order.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;
use rayon::prelude::*;

use crate::algorithm::config::SolverConfig;
use crate::algorithm::graph::matching::{HopcroftKarpSolver, MatchingResult};
use crate::algorithm::graph::max_flow::{DinicSolver, MaxFlowResult};
use crate::algorithm::traits::{AlgorithmResult, NodeId};
use crate::data_structures::graph::{BipartiteGraph, FlowNetwork};

/// One max-flow instance of a batch
#[derive(Debug, Clone)]
pub struct FlowInstance {
    pub network: FlowNetwork,
    pub source: NodeId,
    pub sink: NodeId,
}

/// Solves every instance, cloning one configured [`DinicSolver`] per worker.
///
/// Results line up with `instances`; a failing instance does not stop the
/// others. Each network is left holding its computed flow.
pub fn solve_max_flow_batch(
    instances: &mut [FlowInstance],
    config: &SolverConfig,
) -> AlgorithmResult<Vec<AlgorithmResult<MaxFlowResult>>> {
    let template = DinicSolver::with_config(config.clone())?;
    debug!("solving {} flow networks on {} threads", instances.len(), rayon::current_num_threads());

    Ok(instances
        .par_iter_mut()
        .map_init(
            || template.clone(),
            |solver, instance| solver.solve(&mut instance.network, instance.source, instance.sink),
        )
        .collect())
}

/// Solves every graph with one [`HopcroftKarpSolver`] per worker, in input order
pub fn solve_matching_batch(
    graphs: &[BipartiteGraph],
    config: &SolverConfig,
) -> AlgorithmResult<Vec<MatchingResult>> {
    let template = HopcroftKarpSolver::with_config(config.clone())?;
    debug!("matching {} bipartite graphs on {} threads", graphs.len(), rayon::current_num_threads());

    Ok(graphs
        .par_iter()
        .map_init(|| template.clone(), |solver, graph| solver.solve(graph))
        .collect())
}
