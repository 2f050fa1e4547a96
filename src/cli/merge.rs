// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.input.is_none() {
            self.input = config.input;
        }
        if self.uds.is_none() {
            self.uds = config.uds;
        }
        if self.dot.is_none() {
            self.dot = config.dot;
        }
        if self.cluster.is_none() {
            self.cluster = config.cluster;
        }
        if self.centralities.is_none() {
            self.centralities = config.centralities;
        }
        if self.evolution.is_none() {
            self.evolution = config.evolution;
        }

        // Network construction (only override defaults, not explicit CLI values)
        if self.threshold.is_none() {
            self.threshold = config.threshold;
        }
        if self.format == "AEH" && config.format.is_some() {
            self.format = config.format.unwrap();
        }
        if self.parser.is_none() {
            self.parser = config.parser;
        }
        if !self.multiple_edges && config.multiple_edges.unwrap_or(false) {
            self.multiple_edges = true;
        }

        // Clinical and attribute data
        if self.edi.is_none() {
            self.edi = config.edi;
        }
        if self.old_edi.is_none() {
            self.old_edi = config.old_edi;
        }
        if self.attributes.is_none() {
            self.attributes = config.attributes;
        }
        if self.resistance.is_none() {
            self.resistance = config.resistance;
        }

        // Screening
        if self.exclude.is_none() {
            self.exclude = config.exclude;
        }
        if self.contaminants.is_none() {
            self.contaminants = config.contaminants;
        }
        if self.contaminant_file.is_none() {
            self.contaminant_file = config.contaminant_file;
        }
        if self.filter.is_none() {
            self.filter = config.filter;
        }

        // Edge validation
        if self.sequences.is_none() {
            self.sequences = config.sequences;
        }
        if self.edge_filtering.is_none() {
            self.edge_filtering = config.edge_filtering;
        }
        if self.triangles == 65536 && config.triangles.is_some() {
            self.triangles = config.triangles.unwrap();
        }

        // Reporting flags (CLI flags take precedence)
        if !self.json && config.json.unwrap_or(false) {
            self.json = true;
        }
        if !self.singletons && config.singletons.unwrap_or(false) {
            self.singletons = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
