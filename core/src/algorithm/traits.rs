//! Core algorithm trait definitions for the CHRONOS flow engine
//!
//! This module establishes the shared surface of the layered augmenting-path
//! solvers: identifiers, the error taxonomy, the string-keyed parameter
//! interface and the execution metrics every solve reports.
//!
//! # Key Design Principles
//! - Inputs are validated where they enter (edge insertion, solve entry)
//! - A validated solve never fails at runtime
//! - Metrics are owned by the solver instance, never global

use std::fmt::Debug;
use std::time::{Duration, Instant};
use serde::{Serialize, Deserialize};

/// Node identifier, an index in `[0, node_count)`
pub type NodeId = usize;

/// Index of an edge in a flow network's edge arena
pub type EdgeId = usize;

/// Edge capacity. Signed so that negative input is representable and rejected
pub type Capacity = i64;

/// Flow amount; totals accumulate in the same 64-bit width
pub type Flow = i64;

/// Comprehensive error types for algorithm operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    #[error("{role} node {node} out of range (bound {bound})")]
    NodeOutOfRange {
        role: &'static str,
        node: NodeId,
        bound: usize,
    },

    #[error("negative capacity {capacity} on edge {from} -> {to}")]
    NegativeCapacity {
        from: NodeId,
        to: NodeId,
        capacity: Capacity,
    },

    #[error("total capacity overflows 64 bits when adding edge {from} -> {to}")]
    CapacityOverflow { from: NodeId, to: NodeId },

    #[error("source and sink are the same node: {0}")]
    SourceIsSink(NodeId),

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AlgorithmError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// Checks `node < bound`, naming the offending role on failure
#[inline]
pub(crate) fn check_node(role: &'static str, node: NodeId, bound: usize) -> AlgorithmResult<()> {
    if node < bound {
        Ok(())
    } else {
        Err(AlgorithmError::NodeOutOfRange { role, node, bound })
    }
}

/// Algorithm parameter with strongly typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Integer,
    Boolean,
}

/// Algorithm complexity information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmComplexity {
    pub time_complexity: &'static str,
    pub space_complexity: &'static str,
    pub phase_bound: &'static str,
    pub work_per_phase: &'static str,
}

/// Counters collected over one solve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmMetrics {
    /// Phases whose level assignment reached the target
    pub phases: usize,
    /// Successful augmenting-path searches
    pub augmentations: usize,
    /// Nodes pruned as dead ends
    pub dead_ends: usize,
    /// Adjacency entries examined by the searches
    pub arcs_scanned: usize,
    /// Nodes labelled by the level assigner, summed over all passes
    pub nodes_labelled: usize,
    pub execution_time: Duration,
}

/// Main algorithm trait shared by the flow and matching solvers
///
/// # Invariants
/// - State isolation between runs: every solve starts from a reset graph
/// - Deterministic behavior for given inputs
pub trait Algorithm: Debug + Send + Sync {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g. max_flow, matching)
    fn category(&self) -> &'static str;

    /// Returns the algorithm's description with complexity guarantees
    fn description(&self) -> &'static str;

    /// Returns the algorithm's asymptotic complexity in Big-O notation
    fn complexity(&self) -> AlgorithmComplexity;

    /// Returns supported parameters with their current values
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> AlgorithmResult<()>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;

    /// Metrics of the most recent solve
    fn metrics(&self) -> &AlgorithmMetrics;
}

/// Performance profiling for one solve
#[derive(Debug, Clone, Default)]
pub struct AlgorithmProfiler {
    metrics: AlgorithmMetrics,
    start_time: Option<Instant>,
}

impl AlgorithmProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.metrics = AlgorithmMetrics::default();
        self.start_time = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.metrics.execution_time = start.elapsed();
        }
    }

    #[inline]
    pub fn record_phase(&mut self) {
        self.metrics.phases += 1;
    }

    #[inline]
    pub fn record_augmentation(&mut self) {
        self.metrics.augmentations += 1;
    }

    #[inline]
    pub fn record_dead_end(&mut self) {
        self.metrics.dead_ends += 1;
    }

    #[inline]
    pub fn record_arc_scan(&mut self) {
        self.metrics.arcs_scanned += 1;
    }

    #[inline]
    pub fn record_labelled(&mut self, count: usize) {
        self.metrics.nodes_labelled += count;
    }

    pub fn get_metrics(&self) -> &AlgorithmMetrics {
        &self.metrics
    }
}

/// Parses a `max_phases` parameter value: a positive integer or `none`
pub(crate) fn parse_max_phases(value: &str) -> AlgorithmResult<Option<usize>> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match value.parse::<usize>() {
        Ok(0) => Err(AlgorithmError::invalid_parameter("max_phases", "must be positive")),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(AlgorithmError::invalid_parameter(
            "max_phases",
            "must be a positive integer or 'none'",
        )),
    }
}

pub(crate) fn parse_bool(name: &str, value: &str) -> AlgorithmResult<bool> {
    value
        .parse::<bool>()
        .map_err(|_| AlgorithmError::invalid_parameter(name, "must be 'true' or 'false'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_node_bounds() {
        assert!(check_node("source", 3, 4).is_ok());
        assert_eq!(
            check_node("sink", 4, 4),
            Err(AlgorithmError::NodeOutOfRange { role: "sink", node: 4, bound: 4 })
        );
    }

    #[test]
    fn test_parse_max_phases() {
        assert_eq!(parse_max_phases("none"), Ok(None));
        assert_eq!(parse_max_phases("NONE"), Ok(None));
        assert_eq!(parse_max_phases("7"), Ok(Some(7)));
        assert!(parse_max_phases("0").is_err());
        assert!(parse_max_phases("-1").is_err());
        assert!(parse_max_phases("seven").is_err());
    }

    #[test]
    fn test_profiler_counts_and_resets() {
        let mut profiler = AlgorithmProfiler::new();
        profiler.start();
        profiler.record_phase();
        profiler.record_augmentation();
        profiler.record_augmentation();
        profiler.record_dead_end();
        profiler.stop();

        let metrics = profiler.get_metrics();
        assert_eq!(metrics.phases, 1);
        assert_eq!(metrics.augmentations, 2);
        assert_eq!(metrics.dead_ends, 1);

        profiler.start();
        assert_eq!(profiler.get_metrics().augmentations, 0);
    }

    #[test]
    fn test_error_messages() {
        let err = AlgorithmError::NegativeCapacity { from: 1, to: 2, capacity: -5 };
        assert_eq!(err.to_string(), "negative capacity -5 on edge 1 -> 2");
        let err = AlgorithmError::invalid_parameter("max_phases", "must be positive");
        assert_eq!(err.to_string(), "Invalid parameter: max_phases - must be positive");
    }
}
