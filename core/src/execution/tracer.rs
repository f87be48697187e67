//! Per-phase execution tracing
//!
//! When tracing is enabled the orchestrators append one [`PhaseRecord`] per
//! completed phase. The trace is attached to the solve result and can be
//! exported as JSON for the visualization front end.

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::Flow;
use crate::execution::control::Termination;

/// Summary of one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// Zero-based phase index
    pub phase: usize,
    /// Level of the target in this phase's level graph
    pub target_level: usize,
    /// Successful searches in this phase
    pub augmentations: usize,
    /// Flow pushed (max flow) or pairs added (matching) in this phase
    pub gained: Flow,
    /// Nodes pruned as dead ends in this phase
    pub dead_ends: usize,
}

/// Ordered record of a solve's phases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTracer {
    algorithm: String,
    phases: Vec<PhaseRecord>,
    termination: Option<Termination>,
}

impl ExecutionTracer {
    pub fn new(algorithm: &str) -> Self {
        Self {
            algorithm: algorithm.to_owned(),
            phases: Vec::new(),
            termination: None,
        }
    }

    pub fn record_phase(&mut self, record: PhaseRecord) {
        self.phases.push(record);
    }

    pub fn finish(&mut self, termination: Termination) {
        self.termination = Some(termination);
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn phases(&self) -> &[PhaseRecord] {
        &self.phases
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Sum of `gained` over all recorded phases
    pub fn total_gained(&self) -> Flow {
        self.phases.iter().map(|p| p.gained).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_accumulates_and_exports() {
        let mut tracer = ExecutionTracer::new("Dinic");
        tracer.record_phase(PhaseRecord {
            phase: 0,
            target_level: 2,
            augmentations: 2,
            gained: 7,
            dead_ends: 0,
        });
        tracer.record_phase(PhaseRecord {
            phase: 1,
            target_level: 4,
            augmentations: 1,
            gained: 3,
            dead_ends: 2,
        });
        tracer.finish(Termination::Optimal);

        assert_eq!(tracer.phases().len(), 2);
        assert_eq!(tracer.total_gained(), 10);
        assert_eq!(tracer.termination(), Some(Termination::Optimal));

        let json = tracer.to_json().unwrap();
        let restored: ExecutionTracer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, tracer);
        assert!(json.contains("\"algorithm\":\"Dinic\""));
    }
}
