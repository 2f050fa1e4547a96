// main.rs - CLI entry point

use hivnet::cli::Config;
use hivnet::output::{write_centrality_csv, write_cluster_csv, write_dot};
use hivnet::prelude::*;
use hivnet::report::{write_evolution, write_summary_text};
use std::io::Write;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    println!("🧬 hivnet v{}", env!("CARGO_PKG_VERSION"));

    // All configuration errors abort here, before any processing
    let (settings, mut outputs) = validate_args(&args)?;

    let mut network = MemoryNetwork::new(settings.multiple_edges);
    build_network(&mut network, &settings)?;

    // Snapshot report; clusters are computed here
    let summary = network_summary(&mut network, args.singletons)?;
    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        println!("{}", json);
    } else {
        write_summary_text(&summary);
        let mut stdout = std::io::stdout();
        write_degree_table(&summary.fit, &mut stdout)?;
    }

    if let Some(writer) = outputs.cluster.as_mut() {
        write_cluster_csv(&network, writer)?;
        writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        println!("✅ Cluster assignments written to: {}", args.cluster.as_deref().unwrap_or(""));
    }

    if let Some(writer) = outputs.centralities.as_mut() {
        write_centrality_csv(&network, writer)?;
        writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        println!("✅ Centralities written to: {}", args.centralities.as_deref().unwrap_or(""));
    }

    if let Some(writer) = outputs.dot.as_mut() {
        write_dot(&network, writer)?;
        writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        println!("✅ Network graph written to: {}", args.dot.as_deref().unwrap_or(""));
    }

    // The longitudinal view reapplies filters year by year, so it runs last
    if let Some(writer) = outputs.evolution.as_mut() {
        let rows = network_evolution(&mut network, settings.threshold, false, None)?;
        write_evolution(&rows, writer)?;
        writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        network.clear_filters();
        println!("✅ Network evolution written to: {}", args.evolution.as_deref().unwrap_or(""));
    }

    Ok(())
}
