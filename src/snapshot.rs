//! Per-carrier snapshot extraction pipeline
//!
//! Fetch the snapshot page for one MC number, reject pages without the
//! expected content anchor, and assemble the immutable carrier record from
//! the field, classification, and email extractors. Either a full record
//! comes back or the extraction fails as a whole - no partial records.

use crate::carrier::CarrierRecord;
use crate::classification::{
    extract_classifications, CARGO_CARRIED, CARRIER_OPERATION, OPERATION_CLASSIFICATION,
};
use crate::config::EndpointsConfig;
use crate::document::DocumentIndex;
use crate::email;
use crate::fetch::{FetchError, FetchMode, ResilientFetcher};
use crate::fields::{CatalogField, FieldExtractor};
use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Snapshot fetch failed: {0}")]
    Network(#[from] FetchError),

    #[error("Fetched page is not a carrier snapshot (content anchor missing)")]
    MissingAnchor,
}

/// Scrapes carrier snapshots from the regulatory lookup service.
pub struct SnapshotScraper {
    fetcher: ResilientFetcher,
    endpoints: EndpointsConfig,
}

impl SnapshotScraper {
    pub fn new(fetcher: ResilientFetcher, endpoints: EndpointsConfig) -> Self {
        Self { fetcher, endpoints }
    }

    pub fn fetcher(&self) -> &ResilientFetcher {
        &self.fetcher
    }

    /// Extract one carrier record by MC number. The returned record's
    /// `mc_number` always equals the input; a page without the content
    /// anchor fails the extraction outright.
    pub async fn scrape_carrier(
        &self,
        mc_number: &str,
        mode: FetchMode,
    ) -> Result<CarrierRecord, ScrapeError> {
        let url = self.endpoints.snapshot_url_for(mc_number);
        debug!("Scraping snapshot for MC {}: {}", mc_number, url);

        let html = self.fetcher.fetch(&url, mode).await?;

        // The parsed tree stays inside this call; only the finished record
        // crosses the await below.
        let mut record = extract_record(mc_number, &html)?;

        // Email lives on the registration page, keyed by DOT number. An
        // unextracted DOT number skips the lookup silently: email stays
        // blank rather than sentinel-filled.
        if record.dot_number != "UNKNOWN" {
            record.email =
                email::lookup_email(&self.fetcher, &self.endpoints, &record.dot_number, mode).await;
        }

        info!("Extracted MC {} ({})", mc_number, record.legal_name);
        Ok(record)
    }
}

/// Build a record from a fetched snapshot body. Pure parsing: no network.
fn extract_record(mc_number: &str, html: &str) -> Result<CarrierRecord, ScrapeError> {
    let index = DocumentIndex::parse(html);

    if !index.has_anchor() {
        return Err(ScrapeError::MissingAnchor);
    }

    let fields = FieldExtractor::new(&index);

    let date_scraped = index
        .crawl_date()
        .unwrap_or_else(|| Local::now().format("%m/%d/%Y").to_string());

    Ok(CarrierRecord {
        mc_number: mc_number.to_string(),
        dot_number: fields.extract(CatalogField::DotNumber),
        legal_name: fields.extract(CatalogField::LegalName),
        dba_name: fields.extract(CatalogField::DbaName),
        entity_type: fields.extract(CatalogField::EntityType),
        status: fields.extract(CatalogField::OperatingAuthorityStatus),
        email: String::new(),
        phone: fields.extract(CatalogField::Phone),
        power_units: fields.extract(CatalogField::PowerUnits),
        drivers: fields.extract(CatalogField::Drivers),
        physical_address: fields.extract(CatalogField::PhysicalAddress),
        mailing_address: fields.extract(CatalogField::MailingAddress),
        date_scraped,
        mcs150_date: fields.extract(CatalogField::Mcs150Date),
        mcs150_mileage: fields.extract(CatalogField::Mcs150Mileage),
        operation_classification: extract_classifications(&index, OPERATION_CLASSIFICATION),
        carrier_operation: extract_classifications(&index, CARRIER_OPERATION),
        cargo_carried: extract_classifications(&index, CARGO_CARRIED),
        out_of_service_date: fields.extract(CatalogField::OutOfServiceDate),
        state_carrier_id: fields.extract(CatalogField::StateCarrierId),
        duns_number: fields.extract(CatalogField::DunsNumber),
        insurance_policies: None,
    })
}
