//! Cooperative solve control
//!
//! A solve can be stopped from another thread through a
//! [`CancellationToken`]. The orchestrators poll it only between phases, so a
//! cancelled solve always stops with a feasible flow or a valid matching.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Serialize, Deserialize};

/// Shared cancellation flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Why a solve stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The level assigner could not reach the target: the result is maximum
    Optimal,
    /// The token was cancelled between two phases
    Cancelled,
    /// The configured phase limit was reached first
    PhaseLimit,
}

impl Termination {
    #[inline]
    pub fn is_optimal(self) -> bool {
        self == Termination::Optimal
    }
}

/// Decides, between phases, whether the orchestrator may start another one
#[derive(Debug)]
pub(crate) struct PhaseGate<'a> {
    max_phases: Option<usize>,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> PhaseGate<'a> {
    pub(crate) fn new(max_phases: Option<usize>, cancel: Option<&'a CancellationToken>) -> Self {
        Self { max_phases, cancel }
    }

    /// `None` when another phase may run, otherwise the reason to stop
    pub(crate) fn check(&self, phases_done: usize) -> Option<Termination> {
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Some(Termination::Cancelled);
        }
        match self.max_phases {
            Some(limit) if phases_done >= limit => Some(Termination::PhaseLimit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_gate_prefers_cancellation() {
        let token = CancellationToken::new();
        let gate = PhaseGate::new(Some(2), Some(&token));
        assert_eq!(gate.check(0), None);
        assert_eq!(gate.check(2), Some(Termination::PhaseLimit));

        token.cancel();
        assert_eq!(gate.check(0), Some(Termination::Cancelled));
        assert_eq!(gate.check(5), Some(Termination::Cancelled));
    }

    #[test]
    fn test_unbounded_gate_never_stops() {
        let gate = PhaseGate::new(None, None);
        assert_eq!(gate.check(usize::MAX), None);
    }
}
