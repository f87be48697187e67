//! Solver configuration
//!
//! The same settings are reachable two ways: as a serde document (usually
//! JSON shipped with a workload) and through the string-keyed
//! [`Algorithm::set_parameter`](crate::algorithm::traits::Algorithm::set_parameter)
//! interface.

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{
    parse_bool, parse_max_phases, AlgorithmError, AlgorithmParameter, AlgorithmResult,
    ParameterType,
};

/// Settings shared by the layered solvers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Stop after this many phases even if the target is still reachable
    pub max_phases: Option<usize>,
    /// Attach a per-phase trace to the result
    pub record_trace: bool,
}

impl SolverConfig {
    pub fn from_json(json: &str) -> AlgorithmResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AlgorithmError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> AlgorithmResult<String> {
        serde_json::to_string(self).map_err(|e| AlgorithmError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> AlgorithmResult<()> {
        if self.max_phases == Some(0) {
            return Err(AlgorithmError::InvalidConfig("max_phases must be positive".into()));
        }
        Ok(())
    }

    pub(crate) fn set(&mut self, name: &str, value: &str) -> AlgorithmResult<()> {
        match name {
            "max_phases" => self.max_phases = parse_max_phases(value)?,
            "record_trace" => self.record_trace = parse_bool(name, value)?,
            _ => {
                return Err(AlgorithmError::invalid_parameter(name, "unknown parameter"));
            }
        }
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<String> {
        match name {
            "max_phases" => Some(
                self.max_phases
                    .map_or_else(|| "none".to_owned(), |n| n.to_string()),
            ),
            "record_trace" => Some(self.record_trace.to_string()),
            _ => None,
        }
    }

    pub(crate) fn parameters(&self) -> Vec<AlgorithmParameter> {
        [("max_phases", ParameterType::Integer), ("record_trace", ParameterType::Boolean)]
            .into_iter()
            .filter_map(|(name, value_type)| {
                self.get(name).map(|value| AlgorithmParameter {
                    name: name.to_owned(),
                    value,
                    value_type,
                })
            })
            .collect()
    }
}
