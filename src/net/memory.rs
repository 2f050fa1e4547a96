// memory.rs - In-memory reference implementation of the network engine

use crate::data::clinical::ClinicalRecord;
use crate::data::formats::IdFormat;
use crate::net::engine::*;
use crate::stats::{
    AlignmentSupportTester, DegreeFit, SequenceTriangle, SupportStats, SupportTester,
};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
struct MemoryNode {
    id: String,
    dates: Vec<NaiveDate>,
    attributes: HashSet<String>,
    clinical: Option<ClinicalRecord>,
    cluster: Option<usize>,
}

impl MemoryNode {
    fn new(id: String) -> Self {
        Self {
            id,
            dates: Vec::new(),
            attributes: HashSet::new(),
            clinical: None,
            cluster: None,
        }
    }

    fn record_date(&mut self, date: Option<NaiveDate>) {
        if let Some(date) = date {
            if !self.dates.contains(&date) {
                self.dates.push(date);
            }
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryEdge {
    a: usize,
    b: usize,
    distance: f64,
    source: EdgeSource,
    date: Option<NaiveDate>,
    visible: bool,
    supported: bool,
}

/// Reference engine: plain adjacency storage, union-find clustering, bounded
/// triangle enumeration, and a pluggable sequence support tester
pub struct MemoryNetwork {
    nodes: Vec<MemoryNode>,
    index: HashMap<String, usize>,
    edges: Vec<MemoryEdge>,
    pair_index: HashMap<(usize, usize), usize>,
    multiple_edges: bool,
    clusters: Vec<Vec<usize>>,
    tester: Box<dyn SupportTester>,
}

impl MemoryNetwork {
    pub fn new(multiple_edges: bool) -> Self {
        Self::with_tester(multiple_edges, Box::new(AlignmentSupportTester::new()))
    }

    pub fn with_tester(multiple_edges: bool, tester: Box<dyn SupportTester>) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            pair_index: HashMap::new(),
            multiple_edges,
            clusters: Vec::new(),
            tester,
        }
    }

    fn intern_node(&mut self, id: &str) -> usize {
        if let Some(&index) = self.index.get(id) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(MemoryNode::new(id.to_string()));
        self.index.insert(id.to_string(), index);
        index
    }

    fn ordered_pair(a: usize, b: usize) -> (usize, usize) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn visible_components(&self) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..self.nodes.len()).collect();

        fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for edge in self.edges.iter().filter(|e| e.visible) {
            let ra = find(&mut parent, edge.a);
            let rb = find(&mut parent, edge.b);
            if ra != rb {
                parent[ra.max(rb)] = ra.min(rb);
            }
        }

        let mut components: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for node in 0..self.nodes.len() {
            let root = find(&mut parent, node);
            components.entry(root).or_default().push(node);
        }
        components.into_values().collect()
    }

    fn node_has_attribute(&self, node: usize, attribute: &str) -> bool {
        self.nodes[node].attributes.contains(attribute)
    }

    fn degree_histogram(&self, direction: DegreeDirection) -> Vec<usize> {
        let mut degree = vec![0usize; self.nodes.len()];
        for edge in self.edges.iter().filter(|e| e.visible) {
            match direction {
                DegreeDirection::Total => {
                    degree[edge.a] += 1;
                    degree[edge.b] += 1;
                }
                DegreeDirection::Out => {
                    if let Some(source) = self.edge_direction(edge) {
                        degree[source] += 1;
                    }
                }
            }
        }

        let maximum = degree.iter().copied().max().unwrap_or(0);
        let mut histogram = vec![0usize; maximum];
        for &d in &degree {
            if d > 0 {
                histogram[d - 1] += 1;
            }
        }
        histogram
    }

    /// Transmission source of an edge, when EDI dates can order the endpoints
    fn edge_direction(&self, edge: &MemoryEdge) -> Option<usize> {
        let edi_a = self.nodes[edge.a].clinical.as_ref()?.edi?;
        let edi_b = self.nodes[edge.b].clinical.as_ref()?.edi?;
        match edi_a.cmp(&edi_b) {
            std::cmp::Ordering::Less => Some(edge.a),
            std::cmp::Ordering::Greater => Some(edge.b),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn unresolved_reason(&self, edge: &MemoryEdge) -> &'static str {
        let has_edi = |n: usize| {
            self.nodes[n]
                .clinical
                .as_ref()
                .map(|c| c.edi.is_some())
                .unwrap_or(false)
        };
        if !has_edi(edge.a) || !has_edi(edge.b) {
            "missing clinical data"
        } else {
            "indistinguishable infection dates"
        }
    }
}

impl NetworkEngine for MemoryNetwork {
    fn import_edges(
        &mut self,
        reader: &mut dyn Read,
        format: &IdFormat,
        threshold: Option<f64>,
        source: EdgeSource,
    ) -> Result<ImportStats, String> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut stats = ImportStats::default();
        let nodes_before = self.nodes.len();

        for (row_num, row) in csv_reader.records().enumerate() {
            let row =
                row.map_err(|e| format!("Failed to read distance CSV row {}: {}", row_num + 2, e))?;
            if row.len() < 3 {
                return Err(format!(
                    "Distance CSV row {} has {} columns, expected ID1,ID2,distance",
                    row_num + 2,
                    row.len()
                ));
            }

            let first = format.parse(row.get(0).unwrap_or(""))?;
            let second = format.parse(row.get(1).unwrap_or(""))?;
            let distance: f64 = row
                .get(2)
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|_| {
                    format!(
                        "Invalid distance '{}' at distance CSV row {}",
                        row.get(2).unwrap_or(""),
                        row_num + 2
                    )
                })?;

            stats.rows += 1;

            if let Some(threshold) = threshold {
                if distance >= threshold {
                    continue;
                }
            }

            let a = self.intern_node(&first.id);
            let b = self.intern_node(&second.id);
            self.nodes[a].record_date(first.sample_date);
            self.nodes[b].record_date(second.sample_date);
            if a == b {
                continue;
            }

            let date = match (first.sample_date, second.sample_date) {
                (Some(x), Some(y)) => Some(x.max(y)),
                _ => None,
            };

            let pair = Self::ordered_pair(a, b);
            match self.pair_index.get(&pair) {
                Some(&existing) if !self.multiple_edges => {
                    if distance < self.edges[existing].distance {
                        self.edges[existing].distance = distance;
                        self.edges[existing].source = source;
                        self.edges[existing].date = date;
                    }
                }
                _ => {
                    let index = self.edges.len();
                    self.edges.push(MemoryEdge {
                        a: pair.0,
                        b: pair.1,
                        distance,
                        source,
                        date,
                        visible: true,
                        supported: true,
                    });
                    self.pair_index.entry(pair).or_insert(index);
                    stats.edges += 1;
                }
            }
        }

        stats.nodes = self.nodes.len() - nodes_before;
        Ok(stats)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn attach_clinical(&mut self, records: &HashMap<String, ClinicalRecord>) -> ClinicalAttachStats {
        let mut stats = ClinicalAttachStats::default();
        for node in &mut self.nodes {
            if let Some(record) = records.get(&node.id) {
                if record.edi.is_some() {
                    stats.with_edi += 1;
                }
                if record.stage.is_some() {
                    stats.with_stage += 1;
                }
                node.clinical = Some(record.clone());
            }
        }
        stats
    }

    fn add_node_attribute(&mut self, id: &str, attribute: &str) -> bool {
        match self.index.get(id) {
            Some(&index) => {
                self.nodes[index].attributes.insert(attribute.to_string());
                true
            }
            None => false,
        }
    }

    fn mark_nodes_sampled_by(&mut self, year: i32, attribute: &str) -> usize {
        let mut marked = 0;
        for node in &mut self.nodes {
            if node.dates.iter().any(|d| d.year() <= year) {
                node.attributes.insert(attribute.to_string());
                marked += 1;
            }
        }
        marked
    }

    fn clear_filters(&mut self) {
        for edge in &mut self.edges {
            edge.visible = true;
        }
    }

    fn apply_date_filter(&mut self, year: i32, clear: bool) {
        if clear {
            self.clear_filters();
        }
        // Edges without sample dates cannot be placed in time and are excluded
        for edge in &mut self.edges {
            match edge.date {
                Some(date) if date.year() <= year => {}
                _ => edge.visible = false,
            }
        }
    }

    fn apply_distance_filter(&mut self, threshold: f64, clear: bool) {
        if clear {
            self.clear_filters();
        }
        for edge in &mut self.edges {
            if edge.distance >= threshold {
                edge.visible = false;
            }
        }
    }

    fn apply_attribute_filter(&mut self, attribute: &str, side: FilterSide, clear: bool) {
        if clear {
            self.clear_filters();
        }
        for index in 0..self.edges.len() {
            let touches = self.node_has_attribute(self.edges[index].a, attribute)
                || self.node_has_attribute(self.edges[index].b, attribute);
            let hide = match side {
                FilterSide::Keep => !touches,
                FilterSide::Drop => touches,
            };
            if hide {
                self.edges[index].visible = false;
            }
        }
    }

    fn apply_id_filter(&mut self, ids: &HashSet<String>, side: FilterSide, clear: bool) {
        if clear {
            self.clear_filters();
        }
        for index in 0..self.edges.len() {
            let a = &self.nodes[self.edges[index].a].id;
            let b = &self.nodes[self.edges[index].b].id;
            let hide = match side {
                FilterSide::Keep => !(ids.contains(a) && ids.contains(b)),
                FilterSide::Drop => ids.contains(a) || ids.contains(b),
            };
            if hide {
                self.edges[index].visible = false;
            }
        }
    }

    fn mark_clusters_containing(&mut self, ids: &HashSet<String>, attribute: &str) -> usize {
        let mut marked = HashSet::new();
        for component in self.visible_components() {
            if component.len() < 2 {
                continue;
            }
            if component.iter().any(|&n| ids.contains(&self.nodes[n].id)) {
                for &n in &component {
                    marked.insert(n);
                }
            }
        }
        for &n in &marked {
            self.nodes[n].attributes.insert(attribute.to_string());
        }
        marked.len()
    }

    fn restrict_to_clusters_containing(&mut self, ids: &HashSet<String>) -> usize {
        let mut kept = HashSet::new();
        for component in self.visible_components() {
            if component.iter().any(|&n| ids.contains(&self.nodes[n].id)) {
                kept.extend(component);
            }
        }
        for edge in &mut self.edges {
            if edge.visible && !(kept.contains(&edge.a) && kept.contains(&edge.b)) {
                edge.visible = false;
            }
        }
        self.edges.iter().filter(|e| e.visible).count()
    }

    fn compute_clusters(&mut self, keep_singletons: bool) {
        self.clusters = self
            .visible_components()
            .into_iter()
            .filter(|c| keep_singletons || c.len() >= 2)
            .collect();

        for node in &mut self.nodes {
            node.cluster = None;
        }
        for (cluster_id, members) in self.clusters.iter().enumerate() {
            for &n in members {
                self.nodes[n].cluster = Some(cluster_id);
            }
        }
    }

    fn retrieve_clusters(&self) -> Vec<Vec<String>> {
        self.clusters
            .iter()
            .map(|members| members.iter().map(|&n| self.nodes[n].id.clone()).collect())
            .collect()
    }

    fn get_edge_node_count(&self) -> NetworkCounts {
        let mut touched = HashSet::new();
        let mut edges = 0;
        for edge in self.edges.iter().filter(|e| e.visible) {
            edges += 1;
            touched.insert(edge.a);
            touched.insert(edge.b);
        }

        let mut counts = NetworkCounts {
            nodes: touched.len(),
            edges,
            ..NetworkCounts::default()
        };

        let mut touched: Vec<usize> = touched.into_iter().collect();
        touched.sort();
        for &n in &touched {
            let node = &self.nodes[n];
            counts.total_sequences += node.dates.len().max(1);
            if node.dates.len() > 1 {
                let earliest = node.dates.iter().min().expect("nonempty");
                let latest = node.dates.iter().max().expect("nonempty");
                counts
                    .multiple_dates
                    .push((node.id.clone(), (*latest - *earliest).num_days()));
            }
            if let Some(stage) = node.clinical.as_ref().and_then(|c| c.stage.as_ref()) {
                *counts.stages.entry(stage.to_string()).or_insert(0) += 1;
            }
        }

        counts
    }

    fn direction_summary(&self) -> DirectionSummary {
        let mut summary = DirectionSummary::default();
        for edge in self.edges.iter().filter(|e| e.visible) {
            if self.edge_direction(edge).is_some() {
                summary.directed += 1;
            } else {
                *summary
                    .unresolved
                    .entry(self.unresolved_reason(edge).to_string())
                    .or_insert(0) += 1;
            }
        }
        summary
    }

    fn fit_degree_distribution(&self, direction: DegreeDirection) -> Result<DegreeFit, String> {
        Ok(DegreeFit::from_histogram(self.degree_histogram(direction)))
    }

    fn reduce_edge_set(&self) -> Vec<usize> {
        let mut best: HashMap<(usize, usize), usize> = HashMap::new();
        for (index, edge) in self.edges.iter().enumerate().filter(|(_, e)| e.visible) {
            let pair = (edge.a, edge.b);
            match best.get(&pair) {
                Some(&current) if self.edges[current].distance <= edge.distance => {}
                _ => {
                    best.insert(pair, index);
                }
            }
        }
        let mut reduced: Vec<usize> = best.into_values().collect();
        reduced.sort();
        reduced
    }

    fn find_triangles(&self, edges: &[usize], maximum: usize) -> Vec<Triangle> {
        let mut pair_edges: HashMap<(usize, usize), usize> = HashMap::new();
        let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
        for &index in edges {
            let edge = &self.edges[index];
            pair_edges.insert((edge.a, edge.b), index);
            adjacency.entry(edge.a).or_default().push(edge.b);
            adjacency.entry(edge.b).or_default().push(edge.a);
        }
        for neighbors in adjacency.values_mut() {
            neighbors.sort();
            neighbors.dedup();
        }

        let mut triangles = Vec::new();
        'outer: for &index in edges {
            let edge = &self.edges[index];
            let (a, b) = (edge.a, edge.b);
            let Some(neighbors) = adjacency.get(&a) else { continue };
            // Canonical a < b < c keeps each triangle enumerated once
            for &c in neighbors.iter().filter(|&&c| c > b) {
                let Some(&edge_bc) = pair_edges.get(&Self::ordered_pair(b, c)) else {
                    continue;
                };
                let Some(&edge_ca) = pair_edges.get(&Self::ordered_pair(c, a)) else {
                    continue;
                };
                triangles.push(Triangle {
                    edges: [index, edge_bc, edge_ca],
                });
                if triangles.len() >= maximum {
                    break 'outer;
                }
            }
        }
        triangles
    }

    fn test_edge_support(
        &mut self,
        alignment: &Path,
        triangles: &[Triangle],
    ) -> Result<SupportStats, String> {
        // The triangle edges are (a,b), (b,c), (c,a); resolve nodes from the
        // shared endpoints of consecutive sides
        let mut resolved = Vec::with_capacity(triangles.len());
        for triangle in triangles {
            let [e_ab, e_bc, e_ca] = triangle.edges;
            let (ab, bc, ca) = (&self.edges[e_ab], &self.edges[e_bc], &self.edges[e_ca]);
            let b = if ab.a == bc.a || ab.a == bc.b { ab.a } else { ab.b };
            let a = if ab.a == b { ab.b } else { ab.a };
            let c = if bc.a == b { bc.b } else { bc.a };
            resolved.push(SequenceTriangle {
                ids: [
                    self.nodes[a].id.clone(),
                    self.nodes[b].id.clone(),
                    self.nodes[c].id.clone(),
                ],
                distances: [ab.distance, bc.distance, ca.distance],
            });
        }

        let verdicts = self.tester.test(alignment, &resolved)?;

        let mut flagged = HashSet::new();
        for (triangle, verdict) in triangles.iter().zip(&verdicts) {
            for side in 0..3 {
                if verdict.unsupported[side] {
                    flagged.insert(triangle.edges[side]);
                }
            }
        }

        let mut removed = 0;
        for &index in &flagged {
            if self.edges[index].supported {
                self.edges[index].supported = false;
                removed += 1;
            }
        }

        Ok(SupportStats {
            triangles: triangles.len(),
            unsupported_edges: flagged.len(),
            removed_edges: removed,
        })
    }

    fn sequence_ids_for_validation(&self) -> Vec<String> {
        let mut referenced = HashSet::new();
        for edge in &self.edges {
            referenced.insert(edge.a);
            referenced.insert(edge.b);
        }
        let mut ids: Vec<String> = referenced
            .into_iter()
            .map(|n| self.nodes[n].id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn edge_has_support(&self, edge: usize) -> bool {
        self.edges[edge].supported
    }

    fn unsupported_edges(&self) -> Vec<(String, String)> {
        self.edges
            .iter()
            .filter(|e| !e.supported)
            .map(|e| (self.nodes[e.a].id.clone(), self.nodes[e.b].id.clone()))
            .collect()
    }

    fn get_edge_visibility(&self) -> EdgeVisibility {
        EdgeVisibility(self.edges.iter().map(|e| e.visible).collect())
    }

    fn set_edge_visibility(&mut self, snapshot: &EdgeVisibility) {
        for (edge, &visible) in self.edges.iter_mut().zip(&snapshot.0) {
            edge.visible = visible;
        }
    }

    fn prune_unsupported_edges(&mut self) -> usize {
        let mut pruned = 0;
        for edge in &mut self.edges {
            if edge.visible && !edge.supported {
                edge.visible = false;
                pruned += 1;
            }
        }
        pruned
    }

    fn prune_edges_touching_attribute(&mut self, attribute: &str) -> usize {
        let mut pruned = 0;
        for index in 0..self.edges.len() {
            if !self.edges[index].visible {
                continue;
            }
            if self.node_has_attribute(self.edges[index].a, attribute)
                || self.node_has_attribute(self.edges[index].b, attribute)
            {
                self.edges[index].visible = false;
                pruned += 1;
            }
        }
        pruned
    }

    fn node_degrees(&self) -> Vec<(String, usize)> {
        let mut degree = vec![0usize; self.nodes.len()];
        for edge in self.edges.iter().filter(|e| e.visible) {
            degree[edge.a] += 1;
            degree[edge.b] += 1;
        }
        let mut degrees: Vec<(String, usize)> = self
            .nodes
            .iter()
            .zip(degree)
            .map(|(node, d)| (node.id.clone(), d))
            .collect();
        degrees.sort();
        degrees
    }

    fn visible_edges(&self) -> Vec<(String, String, f64, EdgeSource)> {
        self.edges
            .iter()
            .filter(|e| e.visible)
            .map(|e| {
                (
                    self.nodes[e.a].id.clone(),
                    self.nodes[e.b].id.clone(),
                    e.distance,
                    e.source,
                )
            })
            .collect()
    }

    fn cluster_assignments(&self) -> Vec<(String, Option<usize>)> {
        let mut assignments: Vec<(String, Option<usize>)> = self
            .nodes
            .iter()
            .map(|node| (node.id.clone(), node.cluster))
            .collect();
        assignments.sort();
        assignments
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::stats::support::ScriptedTester;

    pub(crate) fn network_from_csv(csv: &str, multiple_edges: bool) -> MemoryNetwork {
        let mut network = MemoryNetwork::new(multiple_edges);
        network
            .import_edges(&mut csv.as_bytes(), &IdFormat::Plain, None, EdgeSource::Bulk)
            .unwrap();
        network
    }

    pub(crate) fn scripted_network(csv: &str, passes: Vec<Vec<(&str, &str)>>) -> MemoryNetwork {
        let mut network =
            MemoryNetwork::with_tester(false, Box::new(ScriptedTester::new(passes)));
        network
            .import_edges(&mut csv.as_bytes(), &IdFormat::Plain, None, EdgeSource::Bulk)
            .unwrap();
        network
    }

    const TRIANGLE_CSV: &str = "ID1,ID2,Distance\nA,B,0.01\nB,C,0.02\nA,C,0.03\nC,D,0.04\n";

    #[test]
    fn test_import_keeps_shortest_duplicate_edge() {
        let network = network_from_csv("ID1,ID2,Distance\nA,B,0.05\nB,A,0.01\n", false);
        assert_eq!(network.edges.len(), 1);
        assert_eq!(network.edges[0].distance, 0.01);

        let network = network_from_csv("ID1,ID2,Distance\nA,B,0.05\nB,A,0.01\n", true);
        assert_eq!(network.edges.len(), 2);
    }

    #[test]
    fn test_import_threshold_is_strict() {
        let mut network = MemoryNetwork::new(false);
        let stats = network
            .import_edges(
                &mut "ID1,ID2,Distance\nA,B,0.01\nB,C,0.02\n".as_bytes(),
                &IdFormat::Plain,
                Some(0.02),
                EdgeSource::Bulk,
            )
            .unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.edges, 1);
    }

    #[test]
    fn test_import_rejects_malformed_rows() {
        let mut network = MemoryNetwork::new(false);
        assert!(network
            .import_edges(
                &mut "ID1,ID2,Distance\nA,B\n".as_bytes(),
                &IdFormat::Plain,
                None,
                EdgeSource::Bulk
            )
            .is_err());
        assert!(network
            .import_edges(
                &mut "ID1,ID2,Distance\nA,B,xyz\n".as_bytes(),
                &IdFormat::Plain,
                None,
                EdgeSource::Bulk
            )
            .is_err());
    }

    #[test]
    fn test_clusters_and_singletons() {
        let mut network = network_from_csv("ID1,ID2,Distance\nA,B,0.01\nC,D,0.02\nD,E,0.01\n", false);
        network.intern_node("LONER");

        network.compute_clusters(false);
        let clusters = network.retrieve_clusters();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.iter().map(|c| c.len()).max(), Some(3));

        network.compute_clusters(true);
        assert_eq!(network.retrieve_clusters().len(), 3);
    }

    #[test]
    fn test_visibility_snapshot_roundtrip() {
        let mut network = network_from_csv(TRIANGLE_CSV, false);
        let snapshot = network.get_edge_visibility();

        network.apply_distance_filter(0.025, false);
        assert_ne!(network.get_edge_visibility(), snapshot);

        network.set_edge_visibility(&snapshot);
        assert_eq!(network.get_edge_visibility(), snapshot);
    }

    #[test]
    fn test_triangle_enumeration_is_bounded() {
        let network = network_from_csv(TRIANGLE_CSV, false);
        let edges = network.reduce_edge_set();

        let triangles = network.find_triangles(&edges, 10);
        assert_eq!(triangles.len(), 1);

        assert!(network.find_triangles(&edges, 0).is_empty());

        // Dropping one side of the triangle removes it
        let without_ab: Vec<usize> = edges.iter().copied().skip(1).collect();
        assert!(network.find_triangles(&without_ab, 10).is_empty());
    }

    #[test]
    fn test_support_testing_marks_and_prunes() {
        let mut network = scripted_network(TRIANGLE_CSV, vec![vec![("A", "C")]]);
        let edges = network.reduce_edge_set();
        let triangles = network.find_triangles(&edges, 10);

        let stats = network
            .test_edge_support(Path::new("unused.fa"), &triangles)
            .unwrap();
        assert_eq!(stats.triangles, 1);
        assert_eq!(stats.unsupported_edges, 1);
        assert_eq!(stats.removed_edges, 1);

        assert_eq!(network.unsupported_edges(), vec![("A".to_string(), "C".to_string())]);
        assert_eq!(network.prune_unsupported_edges(), 1);
        assert_eq!(network.get_edge_node_count().edges, 3);

        // Re-flagging an already unsupported edge is not a new removal
        let mut network = scripted_network(TRIANGLE_CSV, vec![vec![("A", "C")], vec![("A", "C")]]);
        let triangles = network.find_triangles(&network.reduce_edge_set(), 10);
        network.test_edge_support(Path::new("unused.fa"), &triangles).unwrap();
        let stats = network
            .test_edge_support(Path::new("unused.fa"), &triangles)
            .unwrap();
        assert_eq!(stats.unsupported_edges, 1);
        assert_eq!(stats.removed_edges, 0);
    }

    #[test]
    fn test_attribute_and_id_filters() {
        let mut network = network_from_csv(TRIANGLE_CSV, false);
        assert!(network.add_node_attribute("D", "problematic"));
        assert!(!network.add_node_attribute("NOPE", "problematic"));

        network.apply_attribute_filter("problematic", FilterSide::Drop, true);
        assert_eq!(network.get_edge_node_count().edges, 3);

        let keep: HashSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        network.apply_id_filter(&keep, FilterSide::Keep, true);
        assert_eq!(network.get_edge_node_count().edges, 1);

        network.apply_id_filter(&keep, FilterSide::Drop, true);
        assert_eq!(network.get_edge_node_count().edges, 1);
    }

    #[test]
    fn test_date_filter_uses_edge_dates() {
        let csv = "ID1,ID2,Distance\nP1|01012004,P2|01012006,0.01\nP2|01012006,P3|01012010,0.02\n";
        let mut network = MemoryNetwork::new(false);
        network
            .import_edges(&mut csv.as_bytes(), &IdFormat::Aeh, None, EdgeSource::Bulk)
            .unwrap();

        network.apply_date_filter(2007, true);
        assert_eq!(network.get_edge_node_count().edges, 1);
        network.apply_date_filter(2010, true);
        assert_eq!(network.get_edge_node_count().edges, 2);
        network.apply_date_filter(2003, true);
        assert_eq!(network.get_edge_node_count().edges, 0);
    }

    #[test]
    fn test_contaminant_screening() {
        let mut network = network_from_csv(TRIANGLE_CSV, false);
        let contaminants: HashSet<String> = ["D"].iter().map(|s| s.to_string()).collect();

        let marked = network.mark_clusters_containing(&contaminants, "problematic");
        // The whole component A-B-C-D clusters with the contaminant
        assert_eq!(marked, 4);
        assert_eq!(network.prune_edges_touching_attribute("problematic"), 4);
        assert_eq!(network.get_edge_node_count().edges, 0);
    }

    #[test]
    fn test_cluster_membership_restriction() {
        let mut network =
            network_from_csv("ID1,ID2,Distance\nA,B,0.01\nC,D,0.02\n", false);
        let wanted: HashSet<String> = ["A"].iter().map(|s| s.to_string()).collect();
        let kept = network.restrict_to_clusters_containing(&wanted);
        assert_eq!(kept, 1);
        assert_eq!(network.get_edge_node_count().nodes, 2);
    }

    #[test]
    fn test_multiple_sample_followup() {
        let csv = "ID1,ID2,Distance\nP1|01012004,P2|01012006,0.01\nP1|06012004,P3|01012010,0.02\n";
        let mut network = MemoryNetwork::new(false);
        network
            .import_edges(&mut csv.as_bytes(), &IdFormat::Aeh, None, EdgeSource::Bulk)
            .unwrap();

        let counts = network.get_edge_node_count();
        assert_eq!(counts.nodes, 3);
        assert_eq!(counts.total_sequences, 4);
        assert_eq!(counts.multiple_dates.len(), 1);
        let (id, days) = &counts.multiple_dates[0];
        assert_eq!(id, "P1");
        assert_eq!(*days, 152);
    }

    #[test]
    fn test_direction_from_edi_dates() {
        use crate::data::clinical::{ClinicalRecord, DiseaseStage};

        let mut network = network_from_csv("ID1,ID2,Distance\nA,B,0.01\nB,C,0.02\n", false);
        let mut records = HashMap::new();
        let record = |edi: Option<&str>| ClinicalRecord {
            edi: edi.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            stage: Some(DiseaseStage::Chronic),
            ..ClinicalRecord::default()
        };
        records.insert("A".to_string(), record(Some("2004-01-01")));
        records.insert("B".to_string(), record(Some("2006-01-01")));
        records.insert("C".to_string(), record(None));

        let stats = network.attach_clinical(&records);
        assert_eq!(stats.with_edi, 2);
        assert_eq!(stats.with_stage, 3);

        let summary = network.direction_summary();
        assert_eq!(summary.directed, 1);
        assert_eq!(summary.unresolved["missing clinical data"], 1);
    }
}
