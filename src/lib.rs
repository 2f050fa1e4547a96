// lib.rs - hivnet library root

//! # hivnet - Molecular transmission network builder
//!
//! This library assembles a molecular-epidemiology transmission network from
//! pairwise genetic-distance data, attaches clinical metadata, and validates
//! network edges with sequence-alignment-based triangle tests before reporting
//! cluster and degree-distribution statistics.
//!
//! ## Features
//!
//! - **Clinical reconciliation**: legacy 14-column CSV and structured JSON
//!   clinical records, with EDI date correction
//! - **Flexible id parsing**: AEH, LANL, plain and user-pattern conventions
//! - **Edge validation**: iterative, budget-bounded, convergence-driven
//!   sequence support filtering with transactional visibility
//! - **Screening**: contaminant clusters, lab strains, inclusion lists
//! - **Reports**: snapshot summary (text or JSON), degree-distribution table,
//!   year-by-year network evolution
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use hivnet::prelude::*;
//!
//! let mut network = MemoryNetwork::new(false);
//! let settings = RunSettings {
//!     input: Some("distances.csv".into()),
//!     uds: None,
//!     threshold: Some(0.015),
//!     format: IdFormat::Plain,
//!     clinical_json: None,
//!     clinical_legacy: None,
//!     attributes: None,
//!     resistance: None,
//!     exclude_year: None,
//!     contaminants: None,
//!     contaminant_ids: None,
//!     inclusion_ids: None,
//!     edge_filter: None,
//!     multiple_edges: false,
//! };
//! build_network(&mut network, &settings)?;
//! let summary = network_summary(&mut network, false)?;
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod data;
pub mod net;
pub mod output;
pub mod report;
pub mod stats;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, OpenOutputs};
    pub use crate::data::{
        import_attributes, import_edi_json, import_edi_legacy, ClinicalRecord, FastaIdScanner,
        IdFormat,
    };
    pub use crate::net::{
        build_network, EdgeFilterConfig, EdgeFilterMode, EdgeValidationLoop, MemoryNetwork,
        NetworkEngine, RunSettings,
    };
    pub use crate::report::{network_evolution, network_summary, write_degree_table};
    pub use crate::stats::{DegreeFit, SupportStats};
}

// Re-export main types at the root level for convenience
pub use net::{build_network, MemoryNetwork, NetworkEngine, RunSettings};
pub use report::{network_evolution, network_summary};
pub use stats::{DegreeFit, SupportStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!("hivnet v{} - Molecular transmission network builder", VERSION)
}
