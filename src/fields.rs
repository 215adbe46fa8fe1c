//! Snapshot field extraction
//!
//! A fixed catalog of labeled carrier attributes is pulled out of the parsed
//! page. The structured label -> sibling-cell lookup is the primary strategy;
//! a label-to-next-known-label regex capture over the flattened page text is
//! the degraded fallback for markup variance. The fallback must never become
//! the normal path: its boundaries break if the upstream field order changes.

use crate::document::{normalize_text, DocumentIndex};
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

static STATUS_DISCLAIMER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)(\*Please Note|Please Note|For Licensing).*$").unwrap());

/// Sentinel used when a catalog label is absent from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Identifier-like fields
    Unknown,
    /// Name fields
    NotFound,
    /// Count-like fields
    Zero,
    /// Everything else
    NotAvailable,
}

impl FieldDefault {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldDefault::Unknown => "UNKNOWN",
            FieldDefault::NotFound => "NOT FOUND",
            FieldDefault::Zero => "0",
            FieldDefault::NotAvailable => "N/A",
        }
    }
}

/// The catalog of recognized snapshot labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogField {
    LegalName,
    DbaName,
    EntityType,
    OperatingAuthorityStatus,
    PhysicalAddress,
    Phone,
    MailingAddress,
    DotNumber,
    StateCarrierId,
    PowerUnits,
    Drivers,
    Mcs150Date,
    Mcs150Mileage,
    OutOfServiceDate,
    DunsNumber,
}

impl CatalogField {
    /// The label as it appears on the snapshot page (without trailing colon).
    pub fn label(self) -> &'static str {
        match self {
            CatalogField::LegalName => "Legal Name",
            CatalogField::DbaName => "DBA Name",
            CatalogField::EntityType => "Entity Type",
            CatalogField::OperatingAuthorityStatus => "Operating Authority Status",
            CatalogField::PhysicalAddress => "Physical Address",
            CatalogField::Phone => "Phone",
            CatalogField::MailingAddress => "Mailing Address",
            CatalogField::DotNumber => "USDOT Number",
            CatalogField::StateCarrierId => "State Carrier ID Number",
            CatalogField::PowerUnits => "Power Units",
            CatalogField::Drivers => "Drivers",
            CatalogField::Mcs150Date => "MCS-150 Form Date",
            CatalogField::Mcs150Mileage => "MCS-150 Mileage (Year)",
            CatalogField::OutOfServiceDate => "Out of Service Date",
            CatalogField::DunsNumber => "DUNS Number",
        }
    }

    /// Regex fragment bounding this field's value in the flattened corpus:
    /// the next label known to follow it in the upstream page order.
    fn fallback_boundary(self) -> &'static str {
        match self {
            CatalogField::LegalName => "DBA",
            CatalogField::DbaName => "Physical Address",
            CatalogField::EntityType => "Operating Authority Status",
            CatalogField::OperatingAuthorityStatus => "Out of Service Date",
            CatalogField::PhysicalAddress => "Phone",
            CatalogField::Phone => "Mailing Address",
            CatalogField::MailingAddress => "USDOT",
            CatalogField::DotNumber => "State Carrier ID Number",
            CatalogField::StateCarrierId => "MC/MX/FF Number",
            CatalogField::PowerUnits => "Drivers",
            CatalogField::Drivers => "MCS-150 Form Date",
            CatalogField::Mcs150Date => "MCS",
            CatalogField::Mcs150Mileage => "(?:Operation Classification|$)",
            CatalogField::OutOfServiceDate => "Legal Name",
            CatalogField::DunsNumber => "Power Units",
        }
    }

    pub fn default_value(self) -> FieldDefault {
        match self {
            CatalogField::DotNumber => FieldDefault::Unknown,
            CatalogField::LegalName | CatalogField::DbaName => FieldDefault::NotFound,
            CatalogField::PowerUnits | CatalogField::Drivers => FieldDefault::Zero,
            _ => FieldDefault::NotAvailable,
        }
    }
}

/// Extracts catalog fields from one snapshot page. The flattened-text corpus
/// is built lazily, only if some structured lookup comes back empty.
pub struct FieldExtractor<'a> {
    index: &'a DocumentIndex,
    corpus: OnceCell<String>,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(index: &'a DocumentIndex) -> Self {
        Self {
            index,
            corpus: OnceCell::new(),
        }
    }

    /// Extract one catalog field, applying its cleanup rule and default.
    pub fn extract(&self, field: CatalogField) -> String {
        let mut value = self.index.find_by_sibling_label(field.label());

        if value.is_empty() {
            value = self.extract_from_corpus(field);
        }

        let value = cleanup(field, &value);
        if value.is_empty() {
            field.default_value().as_str().to_string()
        } else {
            value
        }
    }

    fn extract_from_corpus(&self, field: CatalogField) -> String {
        let corpus = self.corpus.get_or_init(|| self.index.flattened_text());
        if corpus.is_empty() {
            return String::new();
        }

        let pattern = format!(
            "(?i){}:(.*?){}",
            regex::escape(field.label()),
            field.fallback_boundary()
        );
        // The pattern is assembled from compile-time catalog constants.
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => return String::new(),
        };

        re.captures(corpus)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }
}

/// Per-field cleanup applied after lookup, regardless of strategy.
fn cleanup(field: CatalogField, value: &str) -> String {
    match field {
        CatalogField::OperatingAuthorityStatus => {
            let truncated = STATUS_DISCLAIMER_RE.replace(value, "");
            normalize_text(&truncated)
        }
        CatalogField::Mcs150Mileage => {
            normalize_text(value).replace("Operation Classification:", "").trim().to_string()
        }
        _ => normalize_text(value),
    }
}
