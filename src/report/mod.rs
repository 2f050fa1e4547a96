// mod.rs - Network reporting: snapshot summary, degree table, evolution

use crate::net::engine::{DegreeDirection, NetworkEngine};
use crate::stats::{DegreeFit, WARING};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Year range of the longitudinal view, inclusive-exclusive
pub const EVOLUTION_YEARS: std::ops::Range<i32> = 2000..2013;

/// Five-number-ish description of an integer sample
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VectorSummary {
    pub count: usize,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub median: f64,
}

pub fn describe_vector(values: &[i64]) -> Option<VectorSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let count = sorted.len();
    let median = if count % 2 == 1 {
        sorted[count / 2] as f64
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) as f64 / 2.0
    };
    Some(VectorSummary {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean: sorted.iter().sum::<i64>() as f64 / count as f64,
        median,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryCounts {
    #[serde(rename = "Edges")]
    pub edges: usize,
    #[serde(rename = "Nodes")]
    pub nodes: usize,
    #[serde(rename = "Sequences used to make links")]
    pub sequences: usize,
    #[serde(rename = "Clusters")]
    pub clusters: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultipleSamples {
    #[serde(rename = "Subjects with")]
    pub subjects: usize,
    #[serde(rename = "Followup, days")]
    pub followup: Option<VectorSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectedEdges {
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Reasons for unresolved directions")]
    pub reasons: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DegreeSummary {
    #[serde(rename = "Distribution")]
    pub distribution: Vec<usize>,
    #[serde(rename = "Model")]
    pub model: String,
    pub rho: f64,
    #[serde(rename = "rho CI")]
    pub rho_ci: (f64, f64),
    pub fitted: Option<Vec<f64>>,
}

/// Snapshot view over the current (possibly filtered) network
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    #[serde(rename = "Network Summary")]
    pub counts: SummaryCounts,
    #[serde(rename = "Multiple sequences")]
    pub multiple_samples: MultipleSamples,
    #[serde(rename = "Cluster sizes")]
    pub cluster_sizes: Vec<usize>,
    #[serde(rename = "HIV Stages")]
    pub stages: BTreeMap<String, usize>,
    #[serde(rename = "Directed Edges")]
    pub directed: DirectedEdges,
    #[serde(rename = "Degrees")]
    pub degrees: DegreeSummary,
    #[serde(skip)]
    pub fit: DegreeFit,
}

/// Assemble the snapshot summary, recomputing clusters and the degree fit
pub fn network_summary<E: NetworkEngine>(
    network: &mut E,
    keep_singletons: bool,
) -> Result<NetworkSummary, String> {
    let counts = network.get_edge_node_count();

    network.compute_clusters(keep_singletons);
    let cluster_sizes: Vec<usize> = network
        .retrieve_clusters()
        .iter()
        .map(|c| c.len())
        .collect();

    let directed = network.direction_summary();
    let fit = network.fit_degree_distribution(DegreeDirection::Total)?;
    let best = fit.best_fit().clone();

    let followup: Vec<i64> = counts.multiple_dates.iter().map(|(_, days)| *days).collect();

    Ok(NetworkSummary {
        counts: SummaryCounts {
            edges: counts.edges,
            nodes: counts.nodes,
            sequences: counts.total_sequences,
            clusters: cluster_sizes.len(),
        },
        multiple_samples: MultipleSamples {
            subjects: counts.multiple_dates.len(),
            followup: describe_vector(&followup),
        },
        cluster_sizes,
        stages: counts.stages,
        directed: DirectedEdges {
            count: directed.directed,
            reasons: directed.unresolved,
        },
        degrees: DegreeSummary {
            distribution: fit.degrees.clone(),
            model: fit.best.clone(),
            rho: fit.best_rho(),
            rho_ci: fit.best_rho_ci(),
            fitted: best.fitted,
        },
        fit,
    })
}

/// Human-readable rendering of the snapshot, on stderr like all diagnostics
pub fn write_summary_text(summary: &NetworkSummary) {
    eprintln!("{} edges on {} nodes", summary.counts.edges, summary.counts.nodes);
    eprintln!("Found {} clusters", summary.counts.clusters);
    eprintln!(
        "Maximum cluster size = {} nodes",
        summary.cluster_sizes.iter().copied().max().unwrap_or(0)
    );
    for (stage, count) in &summary.stages {
        eprintln!("{} : {}", stage, count);
    }
    eprintln!("{} directed edges", summary.directed.count);
    for (reason, count) in &summary.directed.reasons {
        eprintln!("  unresolved ({}) : {}", reason, count);
    }
    let (lo, hi) = summary.degrees.rho_ci;
    eprintln!(
        "Best distribution is '{}' with rho = {:.4} [{:.4} - {:.4}]",
        summary.degrees.model, summary.degrees.rho, lo, hi
    );
}

fn format_stat(value: Option<f64>, width: usize, precision: usize) -> String {
    match value {
        Some(v) => format!("{:>width$.precision$}", v, width = width, precision = precision),
        None => "N/A".to_string(),
    }
}

/// Tab-separated degree table plus one fit-quality line per candidate model
///
/// The cumulative observed and predicted columns each approach 1.0 at the
/// final degree bucket.
pub fn write_degree_table<W: Write>(fit: &DegreeFit, out: &mut W) -> Result<(), String> {
    writeln!(out, "degree\trawcount\trawpred\tcount\tpred\tccount\tcpred")
        .map_err(|e| format!("Write error: {}", e))?;

    let total: f64 = fit.degrees.iter().sum::<usize>() as f64;
    let fitted = fit
        .model(WARING)
        .and_then(|m| m.fitted.clone())
        .unwrap_or_else(|| vec![0.0; fit.degrees.len()]);

    let mut cumulative_observed = 0.0;
    let mut cumulative_predicted = 0.0;
    for (k, &count) in fit.degrees.iter().enumerate() {
        let observed = count as f64 / total;
        let predicted = fitted.get(k).copied().unwrap_or(0.0);
        cumulative_observed += observed;
        cumulative_predicted += predicted;
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            k + 1,
            count,
            predicted * total,
            observed,
            predicted,
            cumulative_observed,
            cumulative_predicted
        )
        .map_err(|e| format!("Write error: {}", e))?;
    }

    for (name, model) in &fit.models {
        writeln!(
            out,
            "{} : rho = {}, BIC = {}, p = {}",
            name,
            format_stat(model.rho, 5, 2),
            format_stat(model.bic, 7, 2),
            format_stat(model.p_value, 4, 2)
        )
        .map_err(|e| format!("Write error: {}", e))?;
    }

    Ok(())
}

/// One row of the longitudinal view
#[derive(Debug, Clone)]
pub struct EvolutionRow {
    pub year: i32,
    pub nodes: usize,
    pub edges: usize,
    pub sequences: usize,
    pub clusters: usize,
    pub max_cluster: usize,
    pub rho: Option<f64>,
    pub rho_ci: Option<(f64, f64)>,
}

/// Year-by-year network evolution under a cumulative date filter
///
/// Each year reapplies the filters from scratch, reclusters, and refits the
/// degree distribution. Callers are responsible for clearing filters once done.
pub fn network_evolution<E: NetworkEngine>(
    network: &mut E,
    distance: Option<f64>,
    outdegree: bool,
    mut store_fitted: Option<&mut BTreeMap<i32, Vec<f64>>>,
) -> Result<Vec<EvolutionRow>, String> {
    let mut rows = Vec::new();

    for year in EVOLUTION_YEARS {
        network.clear_filters();
        network.apply_date_filter(year, true);
        if let Some(distance) = distance {
            network.apply_distance_filter(distance, false);
        }

        let counts = network.get_edge_node_count();
        network.compute_clusters(false);
        let clusters = network.retrieve_clusters();

        let direction = if outdegree {
            DegreeDirection::Out
        } else {
            DegreeDirection::Total
        };
        let fit = network.fit_degree_distribution(direction)?;

        if let Some(store) = store_fitted.as_deref_mut() {
            if let Some(fitted) = fit.model(WARING).and_then(|m| m.fitted.clone()) {
                store.insert(year, fitted);
            }
        }

        let waring = fit.model(WARING);
        rows.push(EvolutionRow {
            year,
            nodes: counts.nodes,
            edges: counts.edges,
            sequences: counts.total_sequences,
            clusters: clusters.len(),
            max_cluster: clusters.iter().map(|c| c.len()).max().unwrap_or(0),
            rho: waring.and_then(|m| m.rho),
            rho_ci: waring.and_then(|m| m.rho_ci),
        });
    }

    Ok(rows)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "NA".to_string())
}

pub fn write_evolution<W: Write>(rows: &[EvolutionRow], out: &mut W) -> Result<(), String> {
    writeln!(out, "Year,Nodes,Edges,Sequences,Clusters,MaxCluster,rho,rho_lower,rho_upper")
        .map_err(|e| format!("Write error: {}", e))?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            row.year,
            row.nodes,
            row.edges,
            row.sequences,
            row.clusters,
            row.max_cluster,
            format_optional(row.rho),
            format_optional(row.rho_ci.map(|ci| ci.0)),
            format_optional(row.rho_ci.map(|ci| ci.1))
        )
        .map_err(|e| format!("Write error: {}", e))?;
    }
    Ok(())
}
