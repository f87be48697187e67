//! Layered augmenting-path solvers

pub mod max_flow;
pub mod matching;

pub use self::max_flow::{DinicSolver, MaxFlowResult, MinCut};
pub use self::matching::{HopcroftKarpSolver, MatchingResult, VertexCover};
