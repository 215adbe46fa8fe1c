use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "safersnap")]
#[command(about = "Extracts carrier registry records from the public SAFER snapshot lookup")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/safersnap.toml
    #[arg(long)]
    pub init: bool,

    /// Single MC number to look up (repeatable)
    #[arg(short, long = "mc", value_name = "MC")]
    pub mc_numbers: Vec<String>,

    /// First MC number of a sequential range scan
    #[arg(short = 's', long, value_name = "MC")]
    pub start: Option<u64>,

    /// How many consecutive MC numbers to scan (with --start)
    #[arg(short = 'n', long, default_value = "10")]
    pub count: u64,

    /// Batch input file of MC numbers (.csv or .json)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<String>,

    /// Fetch directly instead of through the proxy chain
    /// (no fallback: use only from a privileged network context)
    #[arg(long)]
    pub direct: bool,

    /// Skip carrier records (keep brokers only)
    #[arg(long)]
    pub no_carriers: bool,

    /// Skip broker records (keep carriers only)
    #[arg(long)]
    pub no_brokers: bool,

    /// Keep only records with active operating authority
    #[arg(long)]
    pub only_authorized: bool,

    /// Delay between snapshot requests in milliseconds (overrides config)
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Run insurance enrichment on the extracted records
    #[arg(long)]
    pub enrich: bool,

    /// Account identifier for the insurance access check (overrides config)
    #[arg(long, value_name = "ACCOUNT")]
    pub account: Option<String>,

    /// Output format: 'csv' (default) or 'json'
    #[arg(short = 'f', long, default_value = "csv")]
    pub output_format: String,

    /// Output filename (extension will be set based on format if not provided)
    #[arg(short, long, default_value = "carrier_records")]
    pub output: String,

    /// Output directory for the results file (defaults to current directory)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Verbose logging (use -v for per-MC results, -vv for debug detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Export execution logs to a file (specify file path)
    #[arg(long)]
    pub log_file: Option<String>,
}
