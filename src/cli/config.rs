// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub input: Option<String>,
    pub uds: Option<String>,
    pub dot: Option<String>,
    pub cluster: Option<String>,
    pub centralities: Option<String>,
    pub evolution: Option<String>,

    // Network construction
    pub threshold: Option<f64>,
    pub format: Option<String>,
    pub parser: Option<String>,
    pub multiple_edges: Option<bool>,

    // Clinical and attribute data
    pub edi: Option<String>,
    pub old_edi: Option<String>,
    pub attributes: Option<String>,
    pub resistance: Option<String>,

    // Screening
    pub exclude: Option<String>,
    pub contaminants: Option<String>,
    pub contaminant_file: Option<String>,
    pub filter: Option<String>,

    // Edge validation
    pub sequences: Option<String>,
    pub edge_filtering: Option<String>,
    pub triangles: Option<usize>,

    // Reporting
    pub json: Option<bool>,
    pub singletons: Option<bool>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# hivnet.toml - Configuration file for hivnet
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Input CSV file with inferred genetic links (ID1,ID2,distance)
input = "/path/to/distances.csv"

# Input CSV file with UDS data, merged under a separate tag
# uds = "/path/to/uds.csv"

# Output DOT file for GraphViz
# dot = "network.dot"

# Output CSV file with cluster assignments for each sequence
# cluster = "clusters.csv"

# Output CSV file with node centralities
# centralities = "centralities.csv"

# Output CSV file with the year-by-year network evolution
# evolution = "evolution.csv"

# =============================================================================
# NETWORK CONSTRUCTION
# =============================================================================

# Only count edges where the distance is less than this threshold
threshold = 0.015

# Sequence ID format: AEH, LANL, regexp, plain
format = "AEH"

# Pattern for format = "regexp"; the first capture group is the id
# parser = "^(\\w+)-"

# Permit multiple edges to link the same pair of nodes
multiple_edges = false

# =============================================================================
# CLINICAL AND ATTRIBUTE DATA
# =============================================================================

# A JSON file with clinical information (preferred)
# edi = "clinical.json"

# A CSV file with legacy EDI dates (14 columns)
# old_edi = "clinical.csv"

# A CSV file with optional node attributes (header + id,value rows)
# attributes = "attributes.csv"

# A JSON file with resistance annotation by sequence
# resistance = "resistance.json"

# =============================================================================
# SCREENING
# =============================================================================

# Mark sequences isolated in or before this year as lab strains
# exclude = "1984"

# Contaminant screening mode: report, remove (requires contaminant_file)
# contaminants = "remove"

# Ids of contaminant sequences
# contaminant_file = "contaminants.txt"

# Only return clusters with ids listed by this file
# filter = "wanted_ids.txt"

# =============================================================================
# EDGE VALIDATION
# =============================================================================

# The MSA with sequences which were used to make the distance file
# sequences = "alignment.fa"

# Edge filtering mode: report, remove (requires sequences)
# edge_filtering = "remove"

# Maximum number of triangles to consider in each filtering pass
triangles = 65536

# =============================================================================
# REPORTING
# =============================================================================

# Output the network report as a JSON object
json = false

# Include singletons in the network report
singletons = false
"#
        .to_string()
    }
}
