// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod batch;
pub mod carrier;
pub mod classification;
pub mod cli;
pub mod config;
pub mod document;
pub mod email;
pub mod enrichment;
pub mod export;
pub mod fetch;
pub mod fields;
pub mod insurance;
pub mod logger;
pub mod scan;
pub mod snapshot;
pub mod store;

pub use carrier::{CarrierRecord, InsurancePolicy};
pub use enrichment::{BatchRun, BatchState, EnrichmentOrchestrator};
pub use fetch::{FetchMode, ResilientFetcher};
pub use snapshot::{ScrapeError, SnapshotScraper};
