// mod.rs - Network engine, validation loop and pipeline module

pub mod edge_filter;
pub mod engine;
pub mod memory;
pub mod orchestrator;

pub use edge_filter::{EdgeFilterConfig, EdgeFilterMode, EdgeValidationLoop, LoopOutcome, LoopState};
pub use engine::{
    DegreeDirection, EdgeSource, EdgeVisibility, FilterSide, NetworkCounts, NetworkEngine, Triangle,
};
pub use memory::MemoryNetwork;
pub use orchestrator::{build_network, ContaminantMode, RunSettings};
