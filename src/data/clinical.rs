// clinical.rs - Clinical metadata import and EDI date reconciliation

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;

const LEGACY_DATE_FORMAT: &str = "%m/%d/%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const LEGACY_COLUMNS: usize = 14;

/// Disease stage at sampling time
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiseaseStage {
    Acute,
    Early,
    Chronic,
    Other(String),
}

impl DiseaseStage {
    pub fn parse(text: &str) -> Self {
        match text {
            "Acute" => DiseaseStage::Acute,
            "Early" => DiseaseStage::Early,
            "Chronic" => DiseaseStage::Chronic,
            other => DiseaseStage::Other(other.to_string()),
        }
    }
}

impl Default for DiseaseStage {
    fn default() -> Self {
        DiseaseStage::Chronic
    }
}

impl fmt::Display for DiseaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiseaseStage::Acute => write!(f, "Acute"),
            DiseaseStage::Early => write!(f, "Early"),
            DiseaseStage::Chronic => write!(f, "Chronic"),
            DiseaseStage::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Per-subject clinical information, attached to a node once and immutable after
#[derive(Debug, Clone, Default)]
pub struct ClinicalRecord {
    pub genotype_date: Option<NaiveDate>,
    pub drug_start_date: Option<NaiveDate>,
    pub stage: Option<DiseaseStage>,
    pub edi: Option<NaiveDate>,
    pub viral_load: Option<i64>,
    pub arv_naive: bool,
    pub vl_history: Vec<(NaiveDateTime, f64)>,
    pub arv_start: Option<NaiveDate>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Import legacy 14-column clinical records
///
/// Consumed columns: [0] fallback id, [1] preferred id (hyphens stripped),
/// [2] genotype date, [3] ARV-naive marker, [4] drug start date, [5] disease
/// stage, [6] EDI date, [8] viral load. When the EDI date falls after the
/// genotype date, the EDI month/day is re-anchored to the genotype year; records
/// where even the re-anchored date is after the genotype date are dropped.
pub fn import_edi_legacy<R: Read>(reader: R) -> Result<HashMap<String, ClinicalRecord>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = csv_reader
        .headers()
        .map_err(|e| format!("Failed to read clinical CSV header: {}", e))?;
    if header.len() != LEGACY_COLUMNS {
        return Err(format!(
            "Expected a .csv file with {} columns as input, found {}",
            LEGACY_COLUMNS,
            header.len()
        ));
    }

    let mut records = HashMap::new();

    for (row_num, row) in csv_reader.records().enumerate() {
        let row = row.map_err(|e| format!("Failed to read clinical CSV row {}: {}", row_num + 2, e))?;
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let id = if !field(1).is_empty() {
            field(1).replace('-', "")
        } else {
            field(0).to_string()
        };

        let genotype_date = parse_optional_date(field(2), row_num)?;
        let drug_start_date = parse_optional_date(field(4), row_num)?;
        let mut edi = parse_optional_date(field(6), row_num)?;

        let stage = if field(5).is_empty() {
            DiseaseStage::default()
        } else {
            DiseaseStage::parse(field(5))
        };

        let arv_naive = field(3) == "ARV Naive";

        if let (Some(geno), Some(edi_date)) = (genotype_date, edi) {
            if edi_date > geno {
                // Re-anchor the EDI month/day to the genotype year
                let corrected = NaiveDate::from_ymd_opt(geno.year(), edi_date.month(), edi_date.day());
                match corrected {
                    Some(candidate) if candidate <= geno => edi = Some(candidate),
                    _ => {
                        eprintln!(
                            "⚠️  Dropping clinical record '{}': EDI {} is irreconcilable with genotype date {}",
                            id, edi_date, geno
                        );
                        continue;
                    }
                }
            }
        }

        let viral_load = if field(8).is_empty() {
            None
        } else {
            Some(field(8).parse::<i64>().map_err(|_| {
                format!("Invalid viral load '{}' at clinical CSV row {}", field(8), row_num + 2)
            })?)
        };

        records.insert(
            id,
            ClinicalRecord {
                genotype_date,
                drug_start_date,
                stage: Some(stage),
                edi,
                viral_load,
                arv_naive,
                ..ClinicalRecord::default()
            },
        );
    }

    Ok(records)
}

fn parse_optional_date(field: &str, row_num: usize) -> Result<Option<NaiveDate>, String> {
    if field.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(field, LEGACY_DATE_FORMAT)
        .map(Some)
        .map_err(|_| format!("Invalid date '{}' at clinical CSV row {}", field, row_num + 2))
}

/// Import structured clinical records: id -> {EDI, VL, ARV, ...}
///
/// Recognized keys are typed (`EDI`/`ARV` as ISO dates, `VL` as ordered
/// [date, value] pairs widened to date-times); every other key is carried
/// through unchanged. Dates are taken as given, no reconciliation applies.
pub fn import_edi_json<R: Read>(reader: R) -> Result<HashMap<String, ClinicalRecord>, String> {
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_reader(reader)
        .map_err(|e| format!("Failed to parse clinical JSON: {}", e))?;

    let mut records = HashMap::new();

    for (id, value) in raw {
        let object = value
            .as_object()
            .ok_or_else(|| format!("Clinical JSON entry '{}' is not an object", id))?;

        let mut record = ClinicalRecord::default();

        for (key, value) in object {
            match key.as_str() {
                "EDI" => record.edi = Some(parse_iso_date(value, &id, "EDI")?),
                "ARV" => record.arv_start = Some(parse_iso_date(value, &id, "ARV")?),
                "VL" => {
                    let pairs = value
                        .as_array()
                        .ok_or_else(|| format!("VL for '{}' must be a list of [date, value] pairs", id))?;
                    for pair in pairs {
                        let pair = pair
                            .as_array()
                            .filter(|p| p.len() == 2)
                            .ok_or_else(|| format!("Malformed VL entry for '{}'", id))?;
                        let date = parse_iso_date(&pair[0], &id, "VL")?;
                        let timestamp = date
                            .and_hms_opt(0, 0, 0)
                            .ok_or_else(|| format!("Invalid VL date for '{}'", id))?;
                        let level = pair[1]
                            .as_f64()
                            .ok_or_else(|| format!("Non-numeric VL value for '{}'", id))?;
                        record.vl_history.push((timestamp, level));
                    }
                }
                other => {
                    record.extra.insert(other.to_string(), value.clone());
                }
            }
        }

        records.insert(id, record);
    }

    Ok(records)
}

fn parse_iso_date(value: &serde_json::Value, id: &str, key: &str) -> Result<NaiveDate, String> {
    let text = value
        .as_str()
        .ok_or_else(|| format!("{} for '{}' must be a date string", key, id))?;
    NaiveDate::parse_from_str(text, ISO_DATE_FORMAT)
        .map_err(|_| format!("Invalid {} date '{}' for '{}'", key, text, id))
}
