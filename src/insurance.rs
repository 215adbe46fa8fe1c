//! Insurance collaborator seams
//!
//! The batch enrichment pipeline only depends on these two traits. The
//! bundled `SearchCarriersClient` satisfies the call contract against the
//! configured insurance service; tests substitute their own implementations.

use crate::carrier::InsurancePolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Outcome of an account access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub granted: bool,
}

/// Verifies that an account may run insurance lookups.
pub trait AccessCheck {
    fn check_access(
        &self,
        account: &str,
    ) -> impl Future<Output = Result<AccessDecision>> + Send;
}

/// Looks up the insurance policies filed for one carrier, keyed by DOT number.
pub trait InsuranceLookup {
    fn lookup_insurance(
        &self,
        dot_number: &str,
    ) -> impl Future<Output = Result<Vec<InsurancePolicy>>> + Send;
}

#[derive(Deserialize)]
struct AccessResponse {
    status: i64,
}

#[derive(Deserialize)]
struct PolicyResponse {
    #[serde(default)]
    policies: Vec<InsurancePolicy>,
}

/// HTTP client for the insurance lookup service.
#[derive(Debug, Clone)]
pub struct SearchCarriersClient {
    client: reqwest::Client,
    base_url: String,
}

impl SearchCarriersClient {
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent.to_string())
            .build()
            .context("Failed to build insurance client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl AccessCheck for SearchCarriersClient {
    async fn check_access(&self, account: &str) -> Result<AccessDecision> {
        let url = format!("{}/api/v1/access", self.base_url);
        debug!("Checking insurance access for account {}", account);

        let response = self
            .client
            .get(&url)
            .query(&[("account", account)])
            .send()
            .await
            .context("Access check request failed")?;

        if !response.status().is_success() {
            return Ok(AccessDecision { granted: false });
        }

        let body: AccessResponse = response
            .json()
            .await
            .context("Access check response decode failed")?;

        Ok(AccessDecision {
            granted: body.status == 1,
        })
    }
}

impl InsuranceLookup for SearchCarriersClient {
    async fn lookup_insurance(&self, dot_number: &str) -> Result<Vec<InsurancePolicy>> {
        let url = format!("{}/api/v1/carriers/{}/insurance", self.base_url, dot_number);
        debug!("Fetching insurance policies for DOT# {}", dot_number);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Insurance lookup failed for DOT# {}", dot_number))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Insurance lookup for DOT# {} returned status {}",
                dot_number,
                response.status()
            );
        }

        let body: PolicyResponse = response
            .json()
            .await
            .context("Insurance response decode failed")?;

        Ok(body.policies)
    }
}
