// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// hivnet - Transmission network builder with sequence-based edge validation
pub struct Args {
    /// input CSV file with inferred genetic links (or stdin if omitted); three columns: ID1,ID2,distance
    #[argh(option, short = 'i')]
    pub input: Option<String>,

    /// input CSV file with UDS data; three columns: ID1,ID2,distance
    #[argh(option, short = 'u')]
    pub uds: Option<String>,

    /// output DOT file for GraphViz
    #[argh(option, short = 'd')]
    pub dot: Option<String>,

    /// output a CSV file with cluster assignments for each sequence
    #[argh(option, short = 'c')]
    pub cluster: Option<String>,

    /// only count edges where the distance is less than this threshold
    #[argh(option, short = 't')]
    pub threshold: Option<f64>,

    /// a JSON file with clinical information
    #[argh(option, short = 'e')]
    pub edi: Option<String>,

    /// a CSV file with legacy EDI dates
    #[argh(option, short = 'z')]
    pub old_edi: Option<String>,

    /// sequence ID format: AEH (ID | sample_date | other fields), LANL (subtype_country_id_year), regexp (first capture group is the ID), or plain (default: AEH)
    #[argh(option, short = 'f', default = "String::from(\"AEH\")")]
    pub format: String,

    /// the reg.exp pattern to split up sequence ids; only used if format is regexp
    #[argh(option, short = 'p')]
    pub parser: Option<String>,

    /// mark sequences isolated in or before this year as likely reference/lab strains
    #[argh(option, short = 'x')]
    pub exclude: Option<String>,

    /// load a JSON file with resistance annotation by sequence
    #[argh(option, short = 'r')]
    pub resistance: Option<String>,

    /// load a CSV file with optional node attributes
    #[argh(option, short = 'a')]
    pub attributes: Option<String>,

    /// output the network report as a JSON object
    #[argh(switch, short = 'j')]
    pub json: bool,

    /// include singletons in the network report
    #[argh(switch, short = 'o')]
    pub singletons: bool,

    /// only return clusters with ids listed by a newline separated supplied file
    #[argh(option, short = 'k')]
    pub filter: Option<String>,

    /// the MSA with sequences which were used to make the distance file
    #[argh(option, short = 's')]
    pub sequences: Option<String>,

    /// compute edge support with sequence-based triangle tests and either 'report' or 'remove' poorly supported edges (requires --sequences)
    #[argh(option, short = 'n')]
    pub edge_filtering: Option<String>,

    /// output a CSV file with node centralities
    #[argh(option, short = 'y')]
    pub centralities: Option<String>,

    /// maximum number of triangles to consider in each filtering pass (default: 65536)
    #[argh(option, short = 'g', default = "65536")]
    pub triangles: usize,

    /// screen for contaminants by 'report'-ing or 'remove'-ing sequences that cluster with any of the contaminant ids (requires --contaminant-file)
    #[argh(option, short = 'C')]
    pub contaminants: Option<String>,

    /// ids of contaminant sequences
    #[argh(option, short = 'F')]
    pub contaminant_file: Option<String>,

    /// permit multiple edges (e.g. different dates) to link the same pair of nodes (default: keep the shortest)
    #[argh(switch, short = 'M')]
    pub multiple_edges: bool,

    /// output a CSV file with the year-by-year network evolution
    #[argh(option)]
    pub evolution: Option<String>,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
