//! Run control and tracing shared by both solvers

pub mod control;
pub mod tracer;
