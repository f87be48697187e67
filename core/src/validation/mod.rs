//! Independent checks of solver output

pub mod correctness;
