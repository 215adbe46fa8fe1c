//! Batch insurance enrichment
//!
//! Walks an already-extracted record collection and attaches insurance
//! policies per record, one lookup in flight at a time. The whole batch is
//! gated by an upfront access check; one record's failure never aborts the
//! rest. All outcome reporting flows through the returned `BatchRun` - no
//! error ever escapes to the caller.

use crate::carrier::CarrierRecord;
use crate::insurance::{AccessCheck, InsuranceLookup};
use chrono::Local;
use tracing::{debug, warn};

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Authorizing,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Warn,
    Error,
}

/// One timestamped line in the batch log stream.
#[derive(Debug, Clone)]
pub struct BatchLogEntry {
    pub timestamp: String,
    pub severity: LogSeverity,
    pub message: String,
}

/// Transient state of one enrichment run, handed to the caller at batch end.
///
/// `progress_percent` and `discovered_policy_count` are monotonic; `records`
/// is copy-on-write per item (unprocessed items keep their prior state).
#[derive(Debug)]
pub struct BatchRun {
    pub state: BatchState,
    pub records: Vec<CarrierRecord>,
    pub log: Vec<BatchLogEntry>,
    pub progress_percent: u8,
    pub discovered_policy_count: usize,
}

impl BatchRun {
    fn new(records: Vec<CarrierRecord>) -> Self {
        Self {
            state: BatchState::Idle,
            records,
            log: Vec::new(),
            progress_percent: 0,
            discovered_policy_count: 0,
        }
    }

    fn log(&mut self, severity: LogSeverity, message: String) {
        self.log.push(BatchLogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            severity,
            message,
        });
    }
}

/// Sequential batch enrichment over injected collaborators.
pub struct EnrichmentOrchestrator<'a, A, I> {
    access: &'a A,
    insurance: &'a I,
    account: String,
}

impl<'a, A: AccessCheck, I: InsuranceLookup> EnrichmentOrchestrator<'a, A, I> {
    pub fn new(access: &'a A, insurance: &'a I, account: impl Into<String>) -> Self {
        Self {
            access,
            insurance,
            account: account.into(),
        }
    }

    /// Run the batch to completion. Items are processed strictly one at a
    /// time; a failed lookup logs a warning and moves on.
    pub async fn run(&self, records: &[CarrierRecord]) -> BatchRun {
        let mut run = BatchRun::new(records.to_vec());

        if run.records.is_empty() {
            run.log(
                LogSeverity::Error,
                "No carriers in collection. Scrape some carriers first.".to_string(),
            );
            return run;
        }

        run.state = BatchState::Authorizing;
        run.log(LogSeverity::Info, "Verifying API access...".to_string());

        let granted = match self.access.check_access(&self.account).await {
            Ok(decision) => decision.granted,
            Err(e) => {
                debug!("Access check failed: {}", e);
                false
            }
        };

        if !granted {
            run.log(LogSeverity::Error, "API access denied.".to_string());
            run.state = BatchState::Aborted;
            return run;
        }

        run.state = BatchState::Running;
        let total = run.records.len();
        run.log(
            LogSeverity::Info,
            format!("Authorized. Starting verification for {} carriers...", total),
        );

        let mut completed = 0usize;
        for i in 0..total {
            let record = run.records[i].clone();
            run.log(
                LogSeverity::Info,
                format!("Fetching policies for DOT# {}...", record.dot_number),
            );

            match self.insurance.lookup_insurance(&record.dot_number).await {
                Ok(policies) => {
                    let found = policies.len();
                    run.discovered_policy_count += found;
                    run.records[i] = record.with_policies(policies);
                    run.log(
                        LogSeverity::Info,
                        format!("MC {}: found {} policies.", record.mc_number, found),
                    );
                }
                Err(e) => {
                    warn!("Insurance lookup failed for MC {}: {}", record.mc_number, e);
                    run.log(
                        LogSeverity::Warn,
                        format!("Error fetching policies for MC {}", record.mc_number),
                    );
                }
            }

            completed += 1;
            run.progress_percent = ((completed as f64 / total as f64) * 100.0).round() as u8;
        }

        run.state = BatchState::Completed;
        run.log(
            LogSeverity::Info,
            "Batch process completed successfully.".to_string(),
        );
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::InsurancePolicy;
    use crate::insurance::AccessDecision;
    use anyhow::{anyhow, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticAccess {
        granted: bool,
    }

    impl AccessCheck for StaticAccess {
        async fn check_access(&self, _account: &str) -> Result<AccessDecision> {
            Ok(AccessDecision {
                granted: self.granted,
            })
        }
    }

    struct CountingLookup {
        calls: AtomicUsize,
        fail_for_dot: Option<String>,
    }

    impl CountingLookup {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_for_dot: None,
            }
        }

        fn failing_for(dot: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_for_dot: Some(dot.to_string()),
            }
        }
    }

    impl InsuranceLookup for CountingLookup {
        async fn lookup_insurance(&self, dot_number: &str) -> Result<Vec<InsurancePolicy>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for_dot.as_deref() == Some(dot_number) {
                return Err(anyhow!("upstream rejected DOT# {}", dot_number));
            }
            Ok(vec![policy("PROGRESSIVE", "P-100")])
        }
    }

    fn policy(carrier: &str, number: &str) -> InsurancePolicy {
        InsurancePolicy {
            carrier: carrier.to_string(),
            policy_number: number.to_string(),
            effective_date: "01/01/2024".to_string(),
            coverage_amount: "1000000".to_string(),
            policy_type: "BIPD".to_string(),
            policy_class: "Primary".to_string(),
        }
    }

    fn record(mc: &str, dot: &str) -> CarrierRecord {
        CarrierRecord {
            mc_number: mc.to_string(),
            dot_number: dot.to_string(),
            legal_name: "NOT FOUND".to_string(),
            dba_name: "NOT FOUND".to_string(),
            entity_type: "N/A".to_string(),
            status: "N/A".to_string(),
            email: String::new(),
            phone: "N/A".to_string(),
            power_units: "0".to_string(),
            drivers: "0".to_string(),
            physical_address: "N/A".to_string(),
            mailing_address: "N/A".to_string(),
            date_scraped: "01/01/2024".to_string(),
            mcs150_date: "N/A".to_string(),
            mcs150_mileage: "N/A".to_string(),
            operation_classification: Vec::new(),
            carrier_operation: Vec::new(),
            cargo_carried: Vec::new(),
            out_of_service_date: "N/A".to_string(),
            state_carrier_id: "N/A".to_string(),
            duns_number: "N/A".to_string(),
            insurance_policies: None,
        }
    }

    #[tokio::test]
    async fn test_empty_input_refused_without_transition() {
        let access = StaticAccess { granted: true };
        let lookup = CountingLookup::new();
        let orchestrator = EnrichmentOrchestrator::new(&access, &lookup, "acct");

        let run = orchestrator.run(&[]).await;

        assert_eq!(run.state, BatchState::Idle);
        assert_eq!(run.log.len(), 1);
        assert_eq!(run.log[0].severity, LogSeverity::Error);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clean_batch_enriches_all_records() {
        let access = StaticAccess { granted: true };
        let lookup = CountingLookup::new();
        let orchestrator = EnrichmentOrchestrator::new(&access, &lookup, "acct");
        let input = vec![record("100001", "2000001"), record("100002", "2000002"), record("100003", "2000003")];

        let run = orchestrator.run(&input).await;

        assert_eq!(run.state, BatchState::Completed);
        assert_eq!(run.progress_percent, 100);
        assert!(run.records.iter().all(CarrierRecord::is_enriched));
        assert_eq!(run.discovered_policy_count, 3);
        // start, per-item lines, completion
        assert!(run.log.len() >= input.len() + 2);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_partial_failure_continues_batch() {
        let access = StaticAccess { granted: true };
        let lookup = CountingLookup::failing_for("2000002");
        let orchestrator = EnrichmentOrchestrator::new(&access, &lookup, "acct");
        let input = vec![record("100001", "2000001"), record("100002", "2000002"), record("100003", "2000003")];

        let run = orchestrator.run(&input).await;

        assert_eq!(run.state, BatchState::Completed);
        assert!(run.records[0].is_enriched());
        assert!(!run.records[1].is_enriched());
        assert_eq!(run.records[1], input[1]);
        assert!(run.records[2].is_enriched());

        let warnings: Vec<_> = run
            .log
            .iter()
            .filter(|entry| entry.severity == LogSeverity::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("100002"));
    }

    #[tokio::test]
    async fn test_access_denied_aborts_before_any_lookup() {
        let access = StaticAccess { granted: false };
        let lookup = CountingLookup::new();
        let orchestrator = EnrichmentOrchestrator::new(&access, &lookup, "acct");
        let input = vec![record("100001", "2000001"), record("100002", "2000002")];

        let run = orchestrator.run(&input).await;

        assert_eq!(run.state, BatchState::Aborted);
        assert_eq!(run.records, input);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert_eq!(run.progress_percent, 0);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let access = StaticAccess { granted: true };
        let lookup = CountingLookup::new();
        let orchestrator = EnrichmentOrchestrator::new(&access, &lookup, "acct");
        let input: Vec<_> = (0..7)
            .map(|i| record(&format!("10000{}", i), &format!("20000{}", i)))
            .collect();

        let run = orchestrator.run(&input).await;

        assert_eq!(run.state, BatchState::Completed);
        assert_eq!(run.progress_percent, 100);
        assert_eq!(run.discovered_policy_count, 7);
    }
}
