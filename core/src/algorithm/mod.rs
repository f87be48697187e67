//! CHRONOS algorithm framework: solver traits, configuration, phase state
//! and the layered solvers themselves
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod traits;
pub mod config;
pub mod state;
pub mod graph;

pub use self::traits::*;
pub use self::graph::*;
