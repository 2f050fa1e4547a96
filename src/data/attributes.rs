// attributes.rs - Per-node attribute import

use crate::net::engine::NetworkEngine;
use std::collections::BTreeSet;
use std::io::Read;

/// Outcome of an attribute import: matched counts plus every unmatched id
#[derive(Debug, Clone, Default)]
pub struct AttributeImport {
    pub assigned: usize,
    pub total: usize,
    pub unmatched: BTreeSet<String>,
}

impl AttributeImport {
    fn record<E: NetworkEngine>(&mut self, network: &mut E, id: &str, value: &str) {
        self.total += 1;
        if network.add_node_attribute(id, value) {
            self.assigned += 1;
        } else {
            self.unmatched.insert(id.to_string());
        }
    }

    pub fn report(&self, what: &str) {
        if self.assigned > 0 {
            println!("📋 Loaded {} information for {}/{} nodes", what, self.assigned, self.total);
        }
        if !self.unmatched.is_empty() {
            let unmatched: Vec<&str> = self.unmatched.iter().map(|s| s.as_str()).collect();
            eprintln!("⚠️  Unassigned {} ids: {}", what, unmatched.join(", "));
        }
    }
}

/// Attach attributes from a header + (id, value) CSV to matching nodes
///
/// Unmatched entries are reported, never fatal. Repeated imports accumulate
/// attributes on a node.
pub fn import_attributes<R: Read, E: NetworkEngine>(
    reader: R,
    network: &mut E,
) -> Result<AttributeImport, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut import = AttributeImport::default();
    for (row_num, row) in csv_reader.records().enumerate() {
        let row =
            row.map_err(|e| format!("Failed to read attribute CSV row {}: {}", row_num + 2, e))?;
        let id = row.get(0).unwrap_or("").trim();
        let value = row
            .get(1)
            .ok_or_else(|| format!("Attribute CSV row {} is missing a value column", row_num + 2))?
            .trim();
        if id.is_empty() {
            continue;
        }
        import.record(network, id, value);
    }

    Ok(import)
}

/// Attach resistance annotations from an id -> annotation JSON mapping
pub fn import_resistance<R: Read, E: NetworkEngine>(
    reader: R,
    network: &mut E,
) -> Result<AttributeImport, String> {
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_reader(reader)
        .map_err(|e| format!("Failed to parse resistance JSON: {}", e))?;

    let mut import = AttributeImport::default();
    for (id, value) in raw {
        let rendered = match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        import.record(network, &id, &rendered);
    }

    Ok(import)
}
