// engine.rs - Collaborator interface to the graph/statistics engine

use crate::data::clinical::ClinicalRecord;
use crate::data::formats::IdFormat;
use crate::stats::{DegreeFit, SupportStats};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

/// Provenance tag for a merged edge set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSource {
    Bulk,
    Uds,
}

impl std::fmt::Display for EdgeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeSource::Bulk => write!(f, "BULK"),
            EdgeSource::Uds => write!(f, "UDS"),
        }
    }
}

/// Filter polarity: keep only matching edges, or drop matching edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSide {
    Keep,
    Drop,
}

/// Which degree to fit a distribution to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeDirection {
    /// Full contact degree; unresolved edges count toward both endpoints
    Total,
    /// Out-degree over edges with a resolved transmission direction
    Out,
}

/// Counts returned after merging an edge CSV
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportStats {
    pub rows: usize,
    pub edges: usize,
    pub nodes: usize,
}

/// Nodes annotated while attaching clinical records
#[derive(Debug, Clone, Copy, Default)]
pub struct ClinicalAttachStats {
    pub with_edi: usize,
    pub with_stage: usize,
}

/// Current node/edge/sequence census of the visible network
#[derive(Debug, Clone, Default)]
pub struct NetworkCounts {
    pub nodes: usize,
    pub edges: usize,
    pub total_sequences: usize,
    /// (subject id, follow-up days) for subjects with multiple samples
    pub multiple_dates: Vec<(String, i64)>,
    pub stages: BTreeMap<String, usize>,
}

/// Directed-edge census with reasons direction could not be resolved
#[derive(Debug, Clone, Default)]
pub struct DirectionSummary {
    pub directed: usize,
    pub unresolved: BTreeMap<String, usize>,
}

/// A triangle of mutually linked edges, by engine edge index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub edges: [usize; 3],
}

/// Saved per-edge visibility, restorable bit-for-bit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeVisibility(pub Vec<bool>);

/// The graph/statistics engine the pipeline composes and drives
///
/// The orchestration core owns none of the graph state; every structural query
/// and mutation goes through this interface.
pub trait NetworkEngine {
    /// Merge an `ID1,ID2,distance` CSV into the network under a source tag
    fn import_edges(
        &mut self,
        reader: &mut dyn Read,
        format: &IdFormat,
        threshold: Option<f64>,
        source: EdgeSource,
    ) -> Result<ImportStats, String>;

    fn node_count(&self) -> usize;
    fn has_node(&self, id: &str) -> bool;

    /// Attach clinical records by subject id; returns annotation counts
    fn attach_clinical(&mut self, records: &HashMap<String, ClinicalRecord>) -> ClinicalAttachStats;

    /// Attach a free-form attribute to a node; false when the id is unknown
    fn add_node_attribute(&mut self, id: &str, attribute: &str) -> bool;

    /// Mark nodes whose earliest sample date falls in or before `year`
    fn mark_nodes_sampled_by(&mut self, year: i32, attribute: &str) -> usize;

    // --- visibility filters ---

    fn clear_filters(&mut self);
    fn apply_date_filter(&mut self, year: i32, clear: bool);
    fn apply_distance_filter(&mut self, threshold: f64, clear: bool);
    fn apply_attribute_filter(&mut self, attribute: &str, side: FilterSide, clear: bool);
    fn apply_id_filter(&mut self, ids: &HashSet<String>, side: FilterSide, clear: bool);

    /// Tag every member of clusters containing any of `ids`; returns nodes marked
    fn mark_clusters_containing(&mut self, ids: &HashSet<String>, attribute: &str) -> usize;

    /// Hide edges outside clusters containing any of `ids`; returns edges kept
    fn restrict_to_clusters_containing(&mut self, ids: &HashSet<String>) -> usize;

    // --- clusters and statistics ---

    fn compute_clusters(&mut self, keep_singletons: bool);
    fn retrieve_clusters(&self) -> Vec<Vec<String>>;
    fn get_edge_node_count(&self) -> NetworkCounts;
    fn direction_summary(&self) -> DirectionSummary;
    fn fit_degree_distribution(&self, direction: DegreeDirection) -> Result<DegreeFit, String>;

    // --- edge-support validation ---

    /// Visible edges, one per node pair (shortest when duplicates exist)
    fn reduce_edge_set(&self) -> Vec<usize>;

    /// Enumerate up to `maximum` triangles formed by the given edges
    fn find_triangles(&self, edges: &[usize], maximum: usize) -> Vec<Triangle>;

    /// Run the sequence-based support test over the triangles
    fn test_edge_support(
        &mut self,
        alignment: &Path,
        triangles: &[Triangle],
    ) -> Result<SupportStats, String>;

    /// Every id referenced by the distance/edge data
    fn sequence_ids_for_validation(&self) -> Vec<String>;

    fn edge_has_support(&self, edge: usize) -> bool;
    fn unsupported_edges(&self) -> Vec<(String, String)>;

    fn get_edge_visibility(&self) -> EdgeVisibility;
    fn set_edge_visibility(&mut self, snapshot: &EdgeVisibility);

    /// Hide all edges lacking support; returns the number hidden
    fn prune_unsupported_edges(&mut self) -> usize;

    /// Hide visible edges touching a node carrying `attribute`; returns hidden
    fn prune_edges_touching_attribute(&mut self, attribute: &str) -> usize;

    // --- output accessors ---

    /// Visible degree per node id
    fn node_degrees(&self) -> Vec<(String, usize)>;

    /// Visible edges as (id, id, distance, source)
    fn visible_edges(&self) -> Vec<(String, String, f64, EdgeSource)>;

    /// Per-node cluster assignment from the last clustering
    fn cluster_assignments(&self) -> Vec<(String, Option<usize>)>;
}
