//! Parallel execution of independent solves

pub mod parallel;
