// orchestrator.rs - Pipeline sequencing against the network engine

use crate::data::attributes::{import_attributes, import_resistance};
use crate::data::clinical::{import_edi_json, import_edi_legacy};
use crate::data::formats::IdFormat;
use crate::net::edge_filter::{EdgeFilterConfig, EdgeValidationLoop};
use crate::net::engine::{EdgeSource, NetworkEngine};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

/// What to do with sequences clustering with known contaminants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContaminantMode {
    Report,
    Remove,
}

impl FromStr for ContaminantMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "report" => Ok(ContaminantMode::Report),
            "remove" => Ok(ContaminantMode::Remove),
            other => Err(format!(
                "'{}' is not a valid contaminant screening mode (must be 'report' or 'remove')",
                other
            )),
        }
    }
}

/// Explicit run configuration, constructed once at startup and passed to every
/// pipeline stage
#[derive(Debug)]
pub struct RunSettings {
    /// Distance CSV; stdin when absent
    pub input: Option<PathBuf>,
    pub uds: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub format: IdFormat,
    pub clinical_json: Option<PathBuf>,
    pub clinical_legacy: Option<PathBuf>,
    pub attributes: Option<PathBuf>,
    pub resistance: Option<PathBuf>,
    pub exclude_year: Option<i32>,
    pub contaminants: Option<ContaminantMode>,
    pub contaminant_ids: Option<HashSet<String>>,
    pub inclusion_ids: Option<HashSet<String>>,
    pub edge_filter: Option<EdgeFilterConfig>,
    pub multiple_edges: bool,
}

fn open_input(path: &Option<PathBuf>) -> Result<Box<dyn Read>, String> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("Failed to open '{}' for reading: {}", path.display(), e))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

/// Build, annotate, screen and validate the transmission network
pub fn build_network<E: NetworkEngine>(network: &mut E, settings: &RunSettings) -> Result<(), String> {
    // Base edge set
    let mut reader = open_input(&settings.input)?;
    let stats = network.import_edges(
        reader.as_mut(),
        &settings.format,
        settings.threshold,
        EdgeSource::Bulk,
    )?;
    drop(reader);
    println!(
        "🧬 Read {} distance rows: {} edges on {} nodes",
        stats.rows, stats.edges, stats.nodes
    );

    if settings.uds.is_some() {
        let mut reader = open_input(&settings.uds)?;
        let stats = network.import_edges(
            reader.as_mut(),
            &settings.format,
            settings.threshold,
            EdgeSource::Uds,
        )?;
        println!(
            "🧬 Merged {} UDS rows: {} new edges, {} new nodes",
            stats.rows, stats.edges, stats.nodes
        );
    }

    // Clinical metadata: structured JSON preferred, legacy CSV fallback
    let clinical = if let Some(path) = &settings.clinical_json {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open '{}' for reading: {}", path.display(), e))?;
        Some(import_edi_json(file)?)
    } else if let Some(path) = &settings.clinical_legacy {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open '{}' for reading: {}", path.display(), e))?;
        Some(import_edi_legacy(file)?)
    } else {
        None
    };

    if let Some(clinical) = clinical {
        let attach = network.attach_clinical(&clinical);
        eprintln!(
            "📅 Added EDI information to {} (of {}) nodes",
            attach.with_edi,
            network.node_count()
        );
        eprintln!(
            "📅 Added stage information to {} (of {}) nodes",
            attach.with_stage,
            network.node_count()
        );
    }

    if let Some(path) = &settings.attributes {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open '{}' for reading: {}", path.display(), e))?;
        import_attributes(file, network)?.report("attribute");
    }

    if let Some(path) = &settings.resistance {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open '{}' for reading: {}", path.display(), e))?;
        import_resistance(file, network)?.report("resistance");
    }

    // Sequences isolated early enough to be lab strains
    if let Some(year) = settings.exclude_year {
        let marked = network.mark_nodes_sampled_by(year, "problematic");
        eprintln!("⚠️  Marked {} nodes sampled in or before {} as problematic", marked, year);
    }

    // Contaminant screening
    if let (Some(mode), Some(ids)) = (settings.contaminants, &settings.contaminant_ids) {
        let marked = network.mark_clusters_containing(ids, "problematic");
        eprintln!("⚠️  Marked {} nodes as being in the contaminant clusters", marked);
        if mode == ContaminantMode::Remove {
            let pruned = network.prune_edges_touching_attribute("problematic");
            eprintln!("✂️  Contaminant linkage filtering removed {} edges", pruned);
        }
    }

    if let Some(ids) = &settings.inclusion_ids {
        let included = network.restrict_to_clusters_containing(ids);
        eprintln!("📋 Included {} edges after applying node list filtering", included);
    }

    if let Some(config) = &settings.edge_filter {
        let outcome = EdgeValidationLoop::new(config.clone()).run(network)?;
        eprintln!(
            "🔎 Edge filtering examined {} triangles, found {} poorly supported edges, and marked {} edges for removal",
            outcome.totals.triangles,
            outcome.totals.unsupported_edges,
            outcome.totals.removed_edges
        );
        if outcome.pruned > 0 {
            eprintln!("✂️  Edge filtering removed {} edges", outcome.pruned);
        }
    }

    Ok(())
}
