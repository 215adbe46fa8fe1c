use serde::{Deserialize, Serialize};

/// One extracted carrier-registry snapshot, keyed by MC number.
///
/// Every scalar field is a plain string: absent fields are filled with the
/// documented default sentinel at extraction time, never left null. The
/// classification lists preserve document order and may be empty.
///
/// `mc_number` is the stable identity of a record. Enrichment produces a new
/// record value with the same `mc_number` and `insurance_policies` populated;
/// it never mutates an existing record in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierRecord {
    pub mc_number: String,
    pub dot_number: String,
    pub legal_name: String,
    pub dba_name: String,
    pub entity_type: String,
    pub status: String,
    pub email: String,
    pub phone: String,
    pub power_units: String,
    pub drivers: String,
    pub physical_address: String,
    pub mailing_address: String,
    pub date_scraped: String,
    pub mcs150_date: String,
    pub mcs150_mileage: String,
    pub operation_classification: Vec<String>,
    pub carrier_operation: Vec<String>,
    pub cargo_carried: Vec<String>,
    pub out_of_service_date: String,
    pub state_carrier_id: String,
    pub duns_number: String,
    /// Absent until enrichment has run for this record; presence is the
    /// enrichment-completed flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_policies: Option<Vec<InsurancePolicy>>,
}

impl CarrierRecord {
    /// Copy-on-write enrichment: same identity, policies attached.
    pub fn with_policies(&self, policies: Vec<InsurancePolicy>) -> Self {
        Self {
            insurance_policies: Some(policies),
            ..self.clone()
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.insurance_policies.is_some()
    }
}

/// A single insurance policy attached to a carrier record. Has no identity of
/// its own; it lives and dies with the owning record's policy list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub carrier: String,
    pub policy_number: String,
    pub effective_date: String,
    /// Numeric string, e.g. "1000000".
    pub coverage_amount: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(rename = "class")]
    pub policy_class: String,
}
