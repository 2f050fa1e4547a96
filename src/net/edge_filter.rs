// edge_filter.rs - Iterative sequence-based edge validation loop

use crate::data::idlist::FastaIdScanner;
use crate::net::engine::{FilterSide, NetworkEngine};
use crate::stats::SupportStats;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

/// Hard cap on validation passes; a safety bound, not a correctness guarantee
pub const MAX_PASSES: usize = 64;

/// Default per-pass triangle budget
pub const DEFAULT_TRIANGLE_BUDGET: usize = 1 << 16;

/// What to do with edges that lack support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFilterMode {
    /// Flag unsupported edges, leave committed visibility untouched
    Report,
    /// Physically detach unsupported edges after the loop
    Remove,
}

impl FromStr for EdgeFilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "report" => Ok(EdgeFilterMode::Report),
            "remove" => Ok(EdgeFilterMode::Remove),
            other => Err(format!(
                "'{}' is not a valid edge filtering mode (must be 'report' or 'remove')",
                other
            )),
        }
    }
}

/// Validated edge-filtering configuration
#[derive(Debug, Clone)]
pub struct EdgeFilterConfig {
    pub mode: EdgeFilterMode,
    pub alignment: PathBuf,
    pub triangle_budget: usize,
    pub inclusion: Option<HashSet<String>>,
}

impl EdgeFilterConfig {
    /// Combine the two jointly-required options
    ///
    /// Both absent disables edge filtering; exactly one present is a
    /// configuration error.
    pub fn from_options(
        mode: Option<EdgeFilterMode>,
        alignment: Option<PathBuf>,
        triangle_budget: usize,
        inclusion: Option<HashSet<String>>,
    ) -> Result<Option<Self>, String> {
        match (mode, alignment) {
            (None, None) => Ok(None),
            (Some(mode), Some(alignment)) => Ok(Some(Self {
                mode,
                alignment,
                triangle_budget,
                inclusion,
            })),
            _ => Err(
                "Both an edge filtering mode and an alignment file are needed for edge filtering"
                    .to_string(),
            ),
        }
    }
}

/// Loop phases; `Aborted` is reachable only from the precondition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    PreconditionCheck,
    Scanning,
    Testing,
    Converged,
    Capped,
    Aborted,
}

/// Aggregated result of a validation run
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub state: LoopState,
    pub passes: usize,
    pub totals: SupportStats,
    pub pruned: usize,
}

/// Budget-bounded, convergence-driven edge-support filter
///
/// Repeatedly enumerates triangles over the active edge set, tests their
/// sequence support, and shrinks the set until a pass removes nothing or the
/// pass cap is reached. Exploratory filtering stays private to the loop: the
/// committed visibility is snapshotted before the first pass and restored
/// unconditionally afterwards; only an explicit `remove`-mode prune commits.
pub struct EdgeValidationLoop {
    config: EdgeFilterConfig,
    state: LoopState,
    pass: usize,
    active: Vec<usize>,
    totals: SupportStats,
}

impl EdgeValidationLoop {
    pub fn new(config: EdgeFilterConfig) -> Self {
        Self {
            config,
            state: LoopState::PreconditionCheck,
            pass: 0,
            active: Vec::new(),
            totals: SupportStats::default(),
        }
    }

    pub fn run<E: NetworkEngine>(mut self, network: &mut E) -> Result<LoopOutcome, String> {
        // No mutation happens before the id coverage check passes
        let alignment_ids = FastaIdScanner::new(&self.config.alignment).scan_ids()?;
        let mut missing: Vec<String> = network
            .sequence_ids_for_validation()
            .into_iter()
            .filter(|id| !alignment_ids.contains(id))
            .collect();
        if !missing.is_empty() {
            missing.sort();
            self.state = LoopState::Aborted;
            return Err(format!(
                "Sequence ids referenced in input do not appear in the alignment. Missing ids: {}",
                missing.join(", ")
            ));
        }

        let snapshot = network.get_edge_visibility();

        // Exploratory exclusions, never committed
        network.apply_attribute_filter("problematic", FilterSide::Drop, false);
        if let Some(inclusion) = &self.config.inclusion {
            network.apply_id_filter(inclusion, FilterSide::Keep, false);
        }
        self.active = network.reduce_edge_set();
        self.state = LoopState::Scanning;

        let result = self.iterate(network);

        // The snapshot is restored on every path out of the loop
        network.set_edge_visibility(&snapshot);
        result?;

        let pruned = if self.config.mode == EdgeFilterMode::Remove {
            network.prune_unsupported_edges()
        } else {
            0
        };

        Ok(LoopOutcome {
            state: self.state,
            passes: self.pass,
            totals: self.totals,
            pruned,
        })
    }

    fn iterate<E: NetworkEngine>(&mut self, network: &mut E) -> Result<(), String> {
        loop {
            self.state = match self.state {
                LoopState::Scanning => {
                    if self.pass >= MAX_PASSES {
                        LoopState::Capped
                    } else {
                        LoopState::Testing
                    }
                }

                LoopState::Testing => {
                    let budget = (self.pass + 1) * self.config.triangle_budget;
                    let triangles = network.find_triangles(&self.active, budget);
                    if triangles.is_empty() {
                        LoopState::Converged
                    } else {
                        let stats =
                            network.test_edge_support(&self.config.alignment, &triangles)?;
                        self.totals.accumulate(&stats);
                        eprintln!(
                            "🔎 Edge filtering pass {} examined {} triangles, found {} poorly supported edges, and marked {} edges for removal",
                            self.pass, stats.triangles, stats.unsupported_edges, stats.removed_edges
                        );
                        if stats.removed_edges == 0 {
                            LoopState::Converged
                        } else {
                            // Shrinking the active set changes the local
                            // triangle population; the next pass searches wider
                            self.active.retain(|&edge| network.edge_has_support(edge));
                            self.pass += 1;
                            LoopState::Scanning
                        }
                    }
                }

                LoopState::Converged | LoopState::Capped => return Ok(()),

                LoopState::PreconditionCheck | LoopState::Aborted => {
                    unreachable!("loop body starts in Scanning")
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::formats::IdFormat;
    use crate::net::engine::{
        ClinicalAttachStats, DegreeDirection, DirectionSummary, EdgeSource, EdgeVisibility,
        ImportStats, NetworkCounts, Triangle,
    };
    use crate::net::memory::tests::{network_from_csv, scripted_network};
    use crate::stats::DegreeFit;
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::{Read, Write};
    use std::path::{Path, PathBuf};

    const SQUARE_CSV: &str =
        "ID1,ID2,Distance\nA,B,0.01\nB,C,0.02\nA,C,0.03\nC,D,0.04\nB,D,0.05\nA,D,0.06\n";

    fn alignment_with(name: &str, ids: &[&str]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "hivnet-loop-{}-{}.fa",
            std::process::id(),
            name
        ));
        let mut file = File::create(&path).unwrap();
        for id in ids {
            writeln!(file, ">{}\nACGT", id).unwrap();
        }
        path
    }

    fn config(mode: EdgeFilterMode, alignment: &Path) -> EdgeFilterConfig {
        EdgeFilterConfig {
            mode,
            alignment: alignment.to_path_buf(),
            triangle_budget: DEFAULT_TRIANGLE_BUDGET,
            inclusion: None,
        }
    }

    #[test]
    fn test_joint_option_requirement() {
        assert!(EdgeFilterConfig::from_options(None, None, 1, None).unwrap().is_none());
        assert!(EdgeFilterConfig::from_options(
            Some(EdgeFilterMode::Report),
            Some(PathBuf::from("aln.fa")),
            1,
            None
        )
        .unwrap()
        .is_some());
        assert!(EdgeFilterConfig::from_options(Some(EdgeFilterMode::Report), None, 1, None).is_err());
        assert!(EdgeFilterConfig::from_options(None, Some(PathBuf::from("aln.fa")), 1, None).is_err());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("report".parse::<EdgeFilterMode>().unwrap(), EdgeFilterMode::Report);
        assert_eq!("remove".parse::<EdgeFilterMode>().unwrap(), EdgeFilterMode::Remove);
        assert!("purge".parse::<EdgeFilterMode>().is_err());
    }

    #[test]
    fn test_missing_alignment_ids_abort_before_mutation() {
        let mut network = network_from_csv(SQUARE_CSV, false);
        let alignment = alignment_with("missing", &["A", "B"]);
        let before = network.get_edge_visibility();

        let result = EdgeValidationLoop::new(config(EdgeFilterMode::Remove, &alignment))
            .run(&mut network);
        let error = result.unwrap_err();
        assert!(error.contains("C, D"));
        assert_eq!(network.get_edge_visibility(), before);
        assert_eq!(network.get_edge_node_count().edges, 6);
        std::fs::remove_file(alignment).ok();
    }

    #[test]
    fn test_report_mode_restores_visibility_bit_for_bit() {
        let mut network = scripted_network(SQUARE_CSV, vec![vec![("A", "C"), ("B", "D")]]);
        let alignment = alignment_with("report", &["A", "B", "C", "D"]);
        let before = network.get_edge_visibility();

        let outcome = EdgeValidationLoop::new(config(EdgeFilterMode::Report, &alignment))
            .run(&mut network)
            .unwrap();

        assert_eq!(network.get_edge_visibility(), before);
        assert_eq!(outcome.pruned, 0);
        assert!(outcome.totals.removed_edges > 0);
        // Flags survive for caller enumeration
        assert!(!network.unsupported_edges().is_empty());
        std::fs::remove_file(alignment).ok();
    }

    #[test]
    fn test_remove_mode_converges_and_prunes() {
        let mut network = scripted_network(SQUARE_CSV, vec![vec![("A", "C")]]);
        let alignment = alignment_with("remove", &["A", "B", "C", "D"]);

        let outcome = EdgeValidationLoop::new(config(EdgeFilterMode::Remove, &alignment))
            .run(&mut network)
            .unwrap();

        assert_eq!(outcome.state, LoopState::Converged);
        // Pass 0 removes one edge, pass 1 removes nothing
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.totals.removed_edges, 1);
        assert_eq!(outcome.pruned, 1);
        assert_eq!(network.get_edge_node_count().edges, 5);
        std::fs::remove_file(alignment).ok();
    }

    #[test]
    fn test_second_run_on_remove_output_is_a_no_op() {
        let mut network = scripted_network(SQUARE_CSV, vec![vec![("A", "C")]]);
        let alignment = alignment_with("rerun", &["A", "B", "C", "D"]);

        EdgeValidationLoop::new(config(EdgeFilterMode::Remove, &alignment))
            .run(&mut network)
            .unwrap();
        let edges_after_first = network.get_edge_node_count().edges;

        // Scripted passes are exhausted: every remaining edge keeps support
        let outcome = EdgeValidationLoop::new(config(EdgeFilterMode::Remove, &alignment))
            .run(&mut network)
            .unwrap();
        assert_eq!(outcome.state, LoopState::Converged);
        assert_eq!(outcome.totals.removed_edges, 0);
        assert_eq!(outcome.pruned, 0);
        assert_eq!(network.get_edge_node_count().edges, edges_after_first);
        std::fs::remove_file(alignment).ok();
    }

    #[test]
    fn test_empty_active_set_converges_immediately() {
        let mut network = network_from_csv("ID1,ID2,Distance\nA,B,0.01\n", false);
        let alignment = alignment_with("empty", &["A", "B"]);

        // A single edge forms no triangles
        let outcome = EdgeValidationLoop::new(config(EdgeFilterMode::Report, &alignment))
            .run(&mut network)
            .unwrap();
        assert_eq!(outcome.state, LoopState::Converged);
        assert_eq!(outcome.passes, 0);
        assert_eq!(outcome.totals, SupportStats::default());
        std::fs::remove_file(alignment).ok();
    }

    #[test]
    fn test_problematic_exclusion_is_not_committed() {
        let mut network = scripted_network(SQUARE_CSV, vec![]);
        network.add_node_attribute("D", "problematic");
        let alignment = alignment_with("problematic", &["A", "B", "C", "D"]);
        let before = network.get_edge_visibility();

        let outcome = EdgeValidationLoop::new(config(EdgeFilterMode::Report, &alignment))
            .run(&mut network)
            .unwrap();

        // Only the A-B-C triangle was eligible for testing
        assert_eq!(outcome.totals.triangles, 1);
        assert_eq!(network.get_edge_visibility(), before);
        std::fs::remove_file(alignment).ok();
    }

    /// Engine stub whose tester always reports one more removal, to exercise
    /// the pass cap; the loop's shrink step never sees support change
    struct NeverConverges {
        visibility: Vec<bool>,
    }

    impl NetworkEngine for NeverConverges {
        fn import_edges(
            &mut self,
            _: &mut dyn Read,
            _: &IdFormat,
            _: Option<f64>,
            _: EdgeSource,
        ) -> Result<ImportStats, String> {
            unimplemented!()
        }
        fn node_count(&self) -> usize {
            unimplemented!()
        }
        fn has_node(&self, _: &str) -> bool {
            unimplemented!()
        }
        fn attach_clinical(
            &mut self,
            _: &HashMap<String, crate::data::clinical::ClinicalRecord>,
        ) -> ClinicalAttachStats {
            unimplemented!()
        }
        fn add_node_attribute(&mut self, _: &str, _: &str) -> bool {
            unimplemented!()
        }
        fn mark_nodes_sampled_by(&mut self, _: i32, _: &str) -> usize {
            unimplemented!()
        }
        fn clear_filters(&mut self) {}
        fn apply_date_filter(&mut self, _: i32, _: bool) {
            unimplemented!()
        }
        fn apply_distance_filter(&mut self, _: f64, _: bool) {
            unimplemented!()
        }
        fn apply_attribute_filter(&mut self, _: &str, _: FilterSide, _: bool) {}
        fn apply_id_filter(&mut self, _: &std::collections::HashSet<String>, _: FilterSide, _: bool) {}
        fn mark_clusters_containing(
            &mut self,
            _: &std::collections::HashSet<String>,
            _: &str,
        ) -> usize {
            unimplemented!()
        }
        fn restrict_to_clusters_containing(&mut self, _: &std::collections::HashSet<String>) -> usize {
            unimplemented!()
        }
        fn compute_clusters(&mut self, _: bool) {
            unimplemented!()
        }
        fn retrieve_clusters(&self) -> Vec<Vec<String>> {
            unimplemented!()
        }
        fn get_edge_node_count(&self) -> NetworkCounts {
            unimplemented!()
        }
        fn direction_summary(&self) -> DirectionSummary {
            unimplemented!()
        }
        fn fit_degree_distribution(&self, _: DegreeDirection) -> Result<DegreeFit, String> {
            unimplemented!()
        }
        fn reduce_edge_set(&self) -> Vec<usize> {
            vec![0, 1, 2]
        }
        fn find_triangles(&self, _: &[usize], maximum: usize) -> Vec<Triangle> {
            assert!(maximum > 0);
            vec![Triangle { edges: [0, 1, 2] }]
        }
        fn test_edge_support(
            &mut self,
            _: &Path,
            triangles: &[Triangle],
        ) -> Result<SupportStats, String> {
            Ok(SupportStats {
                triangles: triangles.len(),
                unsupported_edges: 1,
                removed_edges: 1,
            })
        }
        fn sequence_ids_for_validation(&self) -> Vec<String> {
            Vec::new()
        }
        fn edge_has_support(&self, _: usize) -> bool {
            true
        }
        fn unsupported_edges(&self) -> Vec<(String, String)> {
            Vec::new()
        }
        fn get_edge_visibility(&self) -> EdgeVisibility {
            EdgeVisibility(self.visibility.clone())
        }
        fn set_edge_visibility(&mut self, snapshot: &EdgeVisibility) {
            self.visibility = snapshot.0.clone();
        }
        fn prune_unsupported_edges(&mut self) -> usize {
            0
        }
        fn prune_edges_touching_attribute(&mut self, _: &str) -> usize {
            unimplemented!()
        }
        fn node_degrees(&self) -> Vec<(String, usize)> {
            unimplemented!()
        }
        fn visible_edges(&self) -> Vec<(String, String, f64, EdgeSource)> {
            unimplemented!()
        }
        fn cluster_assignments(&self) -> Vec<(String, Option<usize>)> {
            unimplemented!()
        }
    }

    #[test]
    fn test_pass_cap_is_enforced() {
        let alignment = alignment_with("cap", &["X"]);
        let mut network = NeverConverges {
            visibility: vec![true; 3],
        };

        let mut cfg = config(EdgeFilterMode::Report, &alignment);
        cfg.triangle_budget = 7;
        let outcome = EdgeValidationLoop::new(cfg).run(&mut network).unwrap();

        assert_eq!(outcome.state, LoopState::Capped);
        assert_eq!(outcome.passes, MAX_PASSES);
        assert_eq!(outcome.totals.removed_edges, MAX_PASSES);
        assert_eq!(outcome.totals.triangles, MAX_PASSES);
        std::fs::remove_file(alignment).ok();
    }
}
