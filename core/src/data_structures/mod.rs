//! Graph storage for the solvers

pub mod graph;
