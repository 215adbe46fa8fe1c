//! Classification checkbox-table extraction

use crate::document::DocumentIndex;

/// The three marker-table categories present on a snapshot page.
pub const OPERATION_CLASSIFICATION: &str = "Operation Classification";
pub const CARRIER_OPERATION: &str = "Carrier Operation";
pub const CARGO_CARRIED: &str = "Cargo Carried";

/// Labels checked with an "X" in the named category table, in document
/// order, without deduplication. Missing table yields an empty list.
pub fn extract_classifications(index: &DocumentIndex, category: &str) -> Vec<String> {
    index.find_marker_table(category)
}
