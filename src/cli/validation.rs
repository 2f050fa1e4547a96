// validation.rs - Input validation utilities

use crate::cli::args::Args;
use crate::data::formats::IdFormat;
use crate::data::idlist::load_sequence_ids;
use crate::net::edge_filter::{EdgeFilterConfig, EdgeFilterMode};
use crate::net::orchestrator::{ContaminantMode, RunSettings};
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Output handles, opened eagerly at configuration time
///
/// Held for the lifetime of the run and released on every exit path, including
/// aborts before any processing.
pub struct OpenOutputs {
    pub dot: Option<BufWriter<File>>,
    pub cluster: Option<BufWriter<File>>,
    pub centralities: Option<BufWriter<File>>,
    pub evolution: Option<BufWriter<File>>,
}

fn probe_readable(path: &str) -> Result<PathBuf, String> {
    File::open(path).map_err(|e| format!("Failed to open '{}' for reading: {}", path, e))?;
    Ok(PathBuf::from(path))
}

fn open_writable(path: &Option<String>) -> Result<Option<BufWriter<File>>, String> {
    match path {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        format!("Failed to create parent directory '{}': {}", parent.display(), e)
                    })?;
                }
            }
            let file = File::create(path)
                .map_err(|e| format!("Failed to open '{}' for writing: {}", path, e))?;
            Ok(Some(BufWriter::new(file)))
        }
        None => Ok(None),
    }
}

/// Validate all command line arguments
///
/// Every configuration error aborts here, before any processing starts.
pub fn validate_args(args: &Args) -> Result<(RunSettings, OpenOutputs), String> {
    // Jointly-required option pairs
    if args.contaminants.is_some() != args.contaminant_file.is_some() {
        return Err(
            "Two arguments (--contaminants and --contaminant-file) are needed for contaminant screening"
                .to_string(),
        );
    }
    if args.edge_filtering.is_some() != args.sequences.is_some() {
        return Err(
            "Two arguments (--edge-filtering and --sequences) are needed for edge filtering"
                .to_string(),
        );
    }

    let format = IdFormat::from_name(&args.format, args.parser.as_deref())?;

    let exclude_year = match &args.exclude {
        Some(text) => {
            let year: i32 = text
                .parse()
                .map_err(|_| format!("Invalid contaminant threshold year '{}'", text))?;
            if NaiveDate::from_ymd_opt(year, 12, 31).is_none() {
                return Err(format!("Invalid contaminant threshold year '{}'", text));
            }
            Some(year)
        }
        None => None,
    };

    if let Some(threshold) = args.threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(format!("Invalid distance threshold {}", threshold));
        }
    }

    // Readability probes for every input-side file
    let input = args.input.as_deref().map(probe_readable).transpose()?;
    let uds = args.uds.as_deref().map(probe_readable).transpose()?;
    let clinical_json = args.edi.as_deref().map(probe_readable).transpose()?;
    let clinical_legacy = args.old_edi.as_deref().map(probe_readable).transpose()?;
    let attributes = args.attributes.as_deref().map(probe_readable).transpose()?;
    let resistance = args.resistance.as_deref().map(probe_readable).transpose()?;
    let sequences = args.sequences.as_deref().map(probe_readable).transpose()?;

    let contaminant_ids = args
        .contaminant_file
        .as_deref()
        .map(|path| load_sequence_ids(Path::new(path)))
        .transpose()?;
    let inclusion_ids = args
        .filter
        .as_deref()
        .map(|path| load_sequence_ids(Path::new(path)))
        .transpose()?;

    let contaminants = args
        .contaminants
        .as_deref()
        .map(|mode| mode.parse::<ContaminantMode>())
        .transpose()?;
    let edge_filter_mode = args
        .edge_filtering
        .as_deref()
        .map(|mode| mode.parse::<EdgeFilterMode>())
        .transpose()?;

    if args.triangles == 0 {
        return Err("The per-pass triangle budget must be positive".to_string());
    }

    let edge_filter = EdgeFilterConfig::from_options(
        edge_filter_mode,
        sequences,
        args.triangles,
        inclusion_ids.clone(),
    )?;

    let outputs = OpenOutputs {
        dot: open_writable(&args.dot)?,
        cluster: open_writable(&args.cluster)?,
        centralities: open_writable(&args.centralities)?,
        evolution: open_writable(&args.evolution)?,
    };

    let settings = RunSettings {
        input,
        uds,
        threshold: args.threshold,
        format,
        clinical_json,
        clinical_legacy,
        attributes,
        resistance,
        exclude_year,
        contaminants,
        contaminant_ids,
        inclusion_ids,
        edge_filter,
        multiple_edges: args.multiple_edges,
    };

    Ok((settings, outputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_args() -> Args {
        Args {
            input: None,
            uds: None,
            dot: None,
            cluster: None,
            threshold: None,
            edi: None,
            old_edi: None,
            format: "plain".to_string(),
            parser: None,
            exclude: None,
            resistance: None,
            attributes: None,
            json: false,
            singletons: false,
            filter: None,
            sequences: None,
            edge_filtering: None,
            centralities: None,
            triangles: 65536,
            contaminants: None,
            contaminant_file: None,
            multiple_edges: false,
            evolution: None,
            config: None,
            generate_config: false,
        }
    }

    fn fixture(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("hivnet-cli-{}-{}", std::process::id(), name));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_unpaired_contaminant_options_fail() {
        let mut args = base_args();
        args.contaminants = Some("remove".to_string());
        assert!(validate_args(&args).is_err());

        let mut args = base_args();
        args.contaminant_file = Some(fixture("cont.txt", "BAD1\n"));
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_unpaired_edge_filtering_options_fail() {
        let mut args = base_args();
        args.edge_filtering = Some("remove".to_string());
        assert!(validate_args(&args).is_err());

        let mut args = base_args();
        args.sequences = Some(fixture("aln.fa", ">A\nACGT\n"));
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_invalid_year_and_modes_fail() {
        let mut args = base_args();
        args.exclude = Some("not-a-year".to_string());
        assert!(validate_args(&args).is_err());

        let mut args = base_args();
        args.contaminants = Some("purge".to_string());
        args.contaminant_file = Some(fixture("cont2.txt", "BAD1\n"));
        assert!(validate_args(&args).is_err());

        let mut args = base_args();
        args.threshold = Some(-0.1);
        assert!(validate_args(&args).is_err());

        let mut args = base_args();
        args.triangles = 0;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_unreadable_input_fails_fast() {
        let mut args = base_args();
        args.input = Some("/nonexistent/distances.csv".to_string());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_complete_configuration() {
        let mut args = base_args();
        args.input = Some(fixture("dist.csv", "ID1,ID2,Distance\nA,B,0.01\n"));
        args.sequences = Some(fixture("aln2.fa", ">A\nACGT\n>B\nACGT\n"));
        args.edge_filtering = Some("report".to_string());
        args.exclude = Some("1984".to_string());
        args.threshold = Some(0.015);

        let (settings, _outputs) = validate_args(&args).unwrap();
        assert_eq!(settings.exclude_year, Some(1984));
        assert_eq!(settings.threshold, Some(0.015));
        let edge_filter = settings.edge_filter.unwrap();
        assert_eq!(edge_filter.mode, EdgeFilterMode::Report);
        assert_eq!(edge_filter.triangle_budget, 65536);
    }
}
