// mod.rs - Graph and CSV output writers

use crate::net::engine::{EdgeSource, NetworkEngine};
use std::io::Write;

/// Write the visible network as a GraphViz graph
///
/// UDS-sourced edges render dashed.
pub fn write_dot<E: NetworkEngine, W: Write>(network: &E, out: &mut W) -> Result<(), String> {
    writeln!(out, "graph transmission_network {{").map_err(|e| format!("Write error: {}", e))?;
    writeln!(out, "  node [shape=circle];").map_err(|e| format!("Write error: {}", e))?;

    for (id, _) in network.node_degrees() {
        writeln!(out, "  \"{}\";", id).map_err(|e| format!("Write error: {}", e))?;
    }

    for (a, b, distance, source) in network.visible_edges() {
        let style = match source {
            EdgeSource::Bulk => "solid",
            EdgeSource::Uds => "dashed",
        };
        writeln!(
            out,
            "  \"{}\" -- \"{}\" [label=\"{:.4}\", style={}];",
            a, b, distance, style
        )
        .map_err(|e| format!("Write error: {}", e))?;
    }

    writeln!(out, "}}").map_err(|e| format!("Write error: {}", e))?;
    Ok(())
}

/// Write per-sequence cluster assignments; unclustered nodes report NA
pub fn write_cluster_csv<E: NetworkEngine, W: Write>(network: &E, out: &mut W) -> Result<(), String> {
    writeln!(out, "SequenceID,ClusterID").map_err(|e| format!("Write error: {}", e))?;
    for (id, cluster) in network.cluster_assignments() {
        let cluster = cluster
            .map(|c| c.to_string())
            .unwrap_or_else(|| "NA".to_string());
        writeln!(out, "{},{}", id, cluster).map_err(|e| format!("Write error: {}", e))?;
    }
    Ok(())
}

/// Write visible degree centralities per node
pub fn write_centrality_csv<E: NetworkEngine, W: Write>(
    network: &E,
    out: &mut W,
) -> Result<(), String> {
    writeln!(out, "SequenceID,Degree").map_err(|e| format!("Write error: {}", e))?;
    for (id, degree) in network.node_degrees() {
        writeln!(out, "{},{}", id, degree).map_err(|e| format!("Write error: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::formats::IdFormat;
    use crate::net::engine::NetworkEngine;
    use crate::net::memory::MemoryNetwork;

    fn network() -> MemoryNetwork {
        let csv = "ID1,ID2,Distance\nA,B,0.01\nB,C,0.02\n";
        let mut network = MemoryNetwork::new(false);
        network
            .import_edges(&mut csv.as_bytes(), &IdFormat::Plain, None, EdgeSource::Bulk)
            .unwrap();
        network
    }

    #[test]
    fn test_dot_output() {
        let network = network();
        let mut out = Vec::new();
        write_dot(&network, &mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert!(dot.starts_with("graph transmission_network {"));
        assert!(dot.contains("\"A\" -- \"B\" [label=\"0.0100\", style=solid];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_cluster_csv() {
        let mut network = network();
        network.compute_clusters(false);
        let mut out = Vec::new();
        write_cluster_csv(&network, &mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.starts_with("SequenceID,ClusterID"));
        assert!(csv.contains("A,0"));
        assert!(csv.contains("C,0"));
    }

    #[test]
    fn test_centrality_csv() {
        let network = network();
        let mut out = Vec::new();
        write_centrality_csv(&network, &mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.contains("B,2"));
        assert!(csv.contains("A,1"));
    }
}
