// Allow dead code for functions that are part of the API surface but not used in all code paths
#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod batch;
mod carrier;
mod classification;
mod cli;
mod config;
mod document;
mod email;
mod enrichment;
mod export;
mod fetch;
mod fields;
mod insurance;
mod logger;
mod scan;
mod snapshot;
mod store;

use cli::Cli;
use config::{AppConfig, ConfigError};
use enrichment::{BatchState, EnrichmentOrchestrator, LogSeverity};
use fetch::{FetchMode, ResilientFetcher};
use insurance::SearchCarriersClient;
use logger::{ScrapeLogger, VerbosityLevel};
use scan::ScanOptions;
use snapshot::SnapshotScraper;
use store::RecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.init {
        let path = AppConfig::create_default_config()?;
        println!("Created default configuration at {}", path.display());
        return Ok(());
    }

    let config = load_config()?;

    let verbosity = VerbosityLevel::from_verbose_count(cli.verbose);
    let logger = match &cli.log_file {
        Some(path) => ScrapeLogger::with_log_file(verbosity, path.clone()),
        None => ScrapeLogger::new(verbosity),
    };

    let mode = if cli.direct {
        FetchMode::Direct
    } else {
        FetchMode::ProxyChain
    };

    let delay_ms = cli.delay_ms.unwrap_or(config.scrape.request_delay_ms);
    let options = ScanOptions {
        start_point: cli.start.unwrap_or(0),
        record_count: cli.count,
        include_carriers: !cli.no_carriers,
        include_brokers: !cli.no_brokers,
        only_authorized: cli.only_authorized,
        mode,
        request_delay: Duration::from_millis(delay_ms),
    };

    let fetcher = ResilientFetcher::new(&config)?;
    let scraper = SnapshotScraper::new(fetcher, config.endpoints.clone());

    let explicit_mcs = gather_explicit_mc_numbers(&cli)?;
    if explicit_mcs.is_empty() && cli.start.is_none() {
        bail!(
            "Nothing to scrape. Provide --mc, --input, or --start/--count.\n\
             Run with --help for usage."
        );
    }

    let mut store = RecordStore::new();

    if !explicit_mcs.is_empty() {
        logger.info(&format!("Scraping {} MC numbers", explicit_mcs.len()));
        let records = scan::run_list(&scraper, &explicit_mcs, &options, &logger).await;
        store.merge_new(records);
    }

    if cli.start.is_some() {
        logger.info(&format!(
            "Scanning MC range {}..{}",
            options.start_point,
            options.start_point + options.record_count
        ));
        let records = scan::run_scan(&scraper, &options, &logger).await;
        store.merge_new(records);
    }

    let enriched = if cli.enrich && !store.is_empty() {
        run_enrichment(&cli, &config, &mut store, &logger).await?
    } else {
        false
    };

    let output_path = resolve_output_path(&cli)?;
    let output_display = output_path.to_string_lossy().to_string();

    match cli.output_format.to_lowercase().as_str() {
        "csv" => {
            if enriched {
                export::export_csv_with_insurance(store.records(), &output_display)?;
            } else {
                export::export_csv(store.records(), &output_display)?;
            }
        }
        "json" => export::export_json(store.records(), &output_display)?,
        other => bail!("Unsupported output format: {} (expected 'csv' or 'json')", other),
    }
    logger.log_export_success(&output_display);

    if logger.is_log_export_enabled() {
        if let Err(e) = logger.export_logs() {
            logger.error(&format!("Failed to export logs: {}", e));
        }
    }

    logger.print_final_summary();
    export::print_run_summary(store.records());

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "safersnap=warn",
        1 => "safersnap=info",
        _ => "safersnap=debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> Result<AppConfig> {
    match AppConfig::load() {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(path)) => {
            eprintln!("Configuration file not found at {}", path.display());
            match AppConfig::prompt_create_config()? {
                Some(created) => {
                    println!("Created default configuration at {}", created.display());
                    AppConfig::load().context("Failed to load newly created configuration")
                }
                None => bail!(
                    "No configuration available. Run `safersnap --init` to create one."
                ),
            }
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn gather_explicit_mc_numbers(cli: &Cli) -> Result<Vec<String>> {
    let mut mc_numbers = Vec::new();

    if let Some(input) = &cli.input {
        let entries = batch::parse_mc_file(Path::new(input))?;
        if entries.is_empty() {
            bail!("Input file contains no usable MC numbers: {}", input);
        }
        mc_numbers.extend(entries.into_iter().map(|e| e.mc));
    }

    for mc in &cli.mc_numbers {
        let mc = mc.trim();
        if !batch::is_valid_mc_number(mc) {
            bail!("Invalid MC number: {}", mc);
        }
        mc_numbers.push(mc.to_string());
    }

    // Preserve first-seen order while dropping duplicates
    let mut seen = std::collections::HashSet::new();
    mc_numbers.retain(|mc| seen.insert(mc.clone()));

    Ok(mc_numbers)
}

async fn run_enrichment(
    cli: &Cli,
    config: &AppConfig,
    store: &mut RecordStore,
    logger: &ScrapeLogger,
) -> Result<bool> {
    let account = cli
        .account
        .clone()
        .unwrap_or_else(|| config.scrape.insurance_account.clone());
    if account.is_empty() {
        bail!("Insurance enrichment requires an account (--account or scrape.insurance_account)");
    }

    let client = SearchCarriersClient::new(
        &config.scrape.insurance_api_base,
        &config.http.user_agent,
        config.http.request_timeout_secs,
    )?;

    logger.log_enrichment_start(store.len());
    let orchestrator = EnrichmentOrchestrator::new(&client, &client, account);
    let run = orchestrator.run(store.records()).await;

    for entry in &run.log {
        match entry.severity {
            LogSeverity::Info => logger.info(&entry.message),
            LogSeverity::Warn => logger.warn(&entry.message),
            LogSeverity::Error => logger.error(&entry.message),
        }
    }

    match run.state {
        BatchState::Completed => {
            store.apply_updates(&run.records);
            logger.log_enrichment_complete(run.discovered_policy_count);
            Ok(true)
        }
        _ => {
            logger.warn("Enrichment did not complete; exporting un-enriched records");
            Ok(false)
        }
    }
}

fn resolve_output_path(cli: &Cli) -> Result<PathBuf> {
    let extension = match cli.output_format.to_lowercase().as_str() {
        "json" => "json",
        _ => "csv",
    };

    let mut filename = cli.output.clone();
    if Path::new(&filename).extension().is_none() {
        filename = format!("{}.{}", filename, extension);
    }

    let dir = match &cli.output_dir {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            if !dir.is_dir() {
                bail!("Output directory does not exist: {}", dir.display());
            }
            dir
        }
        None => PathBuf::from("."),
    };

    Ok(dir.join(filename))
}
