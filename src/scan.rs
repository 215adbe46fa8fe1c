//! Sequential MC-range scanning
//!
//! Walks a numeric MC range one snapshot at a time, applying entity-type and
//! authority-status filters to each extracted record. Requests are spaced by
//! a configurable delay; individual failures skip the MC number and the scan
//! continues. Exactly one request is in flight at any moment - the upstream
//! source rate-limits aggressively.

use crate::carrier::CarrierRecord;
use crate::fetch::FetchMode;
use crate::logger::ScrapeLogger;
use crate::snapshot::SnapshotScraper;
use std::time::Duration;
use tracing::debug;

/// Options for one range scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// First MC number to query
    pub start_point: u64,
    /// How many consecutive MC numbers to query
    pub record_count: u64,
    pub include_carriers: bool,
    pub include_brokers: bool,
    /// Keep only records whose authority status reads as authorized
    pub only_authorized: bool,
    pub mode: FetchMode,
    /// Pause between consecutive snapshot requests
    pub request_delay: Duration,
}

/// Decide whether an extracted record passes the scan filters.
pub fn passes_filters(record: &CarrierRecord, options: &ScanOptions) -> bool {
    let is_broker = record.entity_type.to_uppercase().contains("BROKER");
    if is_broker && !options.include_brokers {
        return false;
    }
    if !is_broker && !options.include_carriers {
        return false;
    }

    if options.only_authorized {
        let status = record.status.to_uppercase();
        if status.contains("NOT AUTHORIZED") || !status.contains("AUTHORIZED") {
            return false;
        }
    }

    true
}

/// Scrape `record_count` MC numbers starting at `start_point`, strictly one
/// at a time. Returns the records that passed the filters.
pub async fn run_scan(
    scraper: &SnapshotScraper,
    options: &ScanOptions,
    logger: &ScrapeLogger,
) -> Vec<CarrierRecord> {
    let mc_numbers: Vec<String> = (0..options.record_count)
        .map(|offset| (options.start_point + offset).to_string())
        .collect();
    run_list(scraper, &mc_numbers, options, logger).await
}

/// Scrape an explicit MC-number list, strictly one at a time, applying the
/// same filters and request spacing as a range scan.
pub async fn run_list(
    scraper: &SnapshotScraper,
    mc_numbers: &[String],
    options: &ScanOptions,
    logger: &ScrapeLogger,
) -> Vec<CarrierRecord> {
    let mut collected = Vec::new();

    logger.start_progress(mc_numbers.len() as u64).await;

    for (i, mc_number) in mc_numbers.iter().enumerate() {
        logger.update_progress(&format!("MC {}", mc_number)).await;

        match scraper.scrape_carrier(mc_number, options.mode).await {
            Ok(record) => {
                if passes_filters(&record, options) {
                    logger.log_scrape_success(mc_number, &record.legal_name);
                    if !record.email.is_empty() {
                        logger.record_email_found();
                    }
                    collected.push(record);
                } else {
                    debug!("MC {} filtered out ({})", mc_number, record.entity_type);
                    logger.log_scrape_filtered(mc_number);
                }
            }
            Err(e) => {
                logger.log_scrape_failed(mc_number, &e.to_string());
            }
        }

        logger.advance_progress(1).await;

        // Space out requests; skip the pause after the last one.
        if i + 1 < mc_numbers.len() && !options.request_delay.is_zero() {
            tokio::time::sleep(options.request_delay).await;
        }
    }

    logger
        .finish_progress(&format!("Scan complete: {} records extracted", collected.len()))
        .await;

    collected
}
