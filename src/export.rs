use crate::carrier::CarrierRecord;
use anyhow::Result;
use chrono::Utc;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

/// Fixed compatibility header order consumed by downstream spreadsheets.
const CSV_HEADERS: [&str; 21] = [
    "Date",
    "MC",
    "Email",
    "Entity Type",
    "Operating Authority Status",
    "Out of Service Date",
    "Legal_Name",
    "DBA Name",
    "Physical Address",
    "Phone",
    "Mailing Address",
    "USDOT Number",
    "State Carrier ID Number",
    "Power Units",
    "Drivers",
    "DUNS Number",
    "MCS-150 Form Date",
    "MCS-150 Mileage (Year)",
    "Operation Classification",
    "Carrier Operation",
    "Cargo Carried",
];

/// Extra column appended by the enrichment export variant.
const INSURANCE_HEADER: &str = "Insurance Policies";

/// Render records as CSV text. Every value is double-quoted (internal quotes
/// doubled, empty values render as `""`); classification lists are joined
/// with `", "`. With `include_insurance`, a trailing column summarizes each
/// record's policies as `carrier:policyNumber` pairs joined with `" | "`.
pub fn render_csv(records: &[CarrierRecord], include_insurance: bool) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    let mut headers: Vec<&str> = CSV_HEADERS.to_vec();
    if include_insurance {
        headers.push(INSURANCE_HEADER);
    }
    wtr.write_record(&headers)?;

    for record in records {
        let mut row = vec![
            record.date_scraped.clone(),
            record.mc_number.clone(),
            record.email.clone(),
            record.entity_type.clone(),
            record.status.clone(),
            record.out_of_service_date.clone(),
            record.legal_name.clone(),
            record.dba_name.clone(),
            record.physical_address.clone(),
            record.phone.clone(),
            record.mailing_address.clone(),
            record.dot_number.clone(),
            record.state_carrier_id.clone(),
            record.power_units.clone(),
            record.drivers.clone(),
            record.duns_number.clone(),
            record.mcs150_date.clone(),
            record.mcs150_mileage.clone(),
            record.operation_classification.join(", "),
            record.carrier_operation.join(", "),
            record.cargo_carried.join(", "),
        ];
        if include_insurance {
            row.push(policy_summary(record));
        }
        wtr.write_record(&row)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

fn policy_summary(record: &CarrierRecord) -> String {
    record
        .insurance_policies
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|p| format!("{}:{}", p.carrier, p.policy_number))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn export_csv(records: &[CarrierRecord], output_path: &str) -> Result<()> {
    debug!("Exporting {} records to CSV: {}", records.len(), output_path);

    let content = render_csv(records, false)?;
    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;

    info!("Successfully exported {} records to CSV: {}", records.len(), output_path);
    Ok(())
}

pub fn export_csv_with_insurance(records: &[CarrierRecord], output_path: &str) -> Result<()> {
    debug!(
        "Exporting {} records (with insurance) to CSV: {}",
        records.len(),
        output_path
    );

    let content = render_csv(records, true)?;
    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;

    info!("Successfully exported {} records to CSV: {}", records.len(), output_path);
    Ok(())
}

#[derive(serde::Serialize)]
struct JsonExport<'a> {
    summary: ExportSummary,
    records: &'a [CarrierRecord],
}

#[derive(serde::Serialize)]
struct ExportSummary {
    total_records: usize,
    enriched_records: usize,
    total_policies: usize,
    generated_at: String,
}

pub fn export_json(records: &[CarrierRecord], output_path: &str) -> Result<()> {
    debug!("Exporting {} records to JSON: {}", records.len(), output_path);

    let json_output = JsonExport {
        summary: ExportSummary {
            total_records: records.len(),
            enriched_records: records.iter().filter(|r| r.is_enriched()).count(),
            total_policies: records
                .iter()
                .filter_map(|r| r.insurance_policies.as_ref())
                .map(|p| p.len())
                .sum(),
            generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        },
        records,
    };

    let json_string = serde_json::to_string_pretty(&json_output)?;

    let mut file = File::create(output_path)?;
    file.write_all(json_string.as_bytes())?;

    info!("Successfully exported {} records to JSON: {}", records.len(), output_path);
    Ok(())
}

pub fn print_run_summary(records: &[CarrierRecord]) {
    if records.is_empty() {
        println!("No carrier records extracted.");
        return;
    }

    let with_email = records.iter().filter(|r| !r.email.is_empty()).count();
    let enriched = records.iter().filter(|r| r.is_enriched()).count();
    let total_policies: usize = records
        .iter()
        .filter_map(|r| r.insurance_policies.as_ref())
        .map(|p| p.len())
        .sum();

    println!("\n=== Extraction Summary ===");
    println!("Carrier records: {}", records.len());
    println!("Records with email: {}", with_email);
    if enriched > 0 {
        println!("Records enriched: {}", enriched);
        println!("Insurance policies found: {}", total_policies);
    }
    println!("==========================\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::InsurancePolicy;

    fn record() -> CarrierRecord {
        CarrierRecord {
            mc_number: "515038".to_string(),
            dot_number: "1515151".to_string(),
            legal_name: "ACME \"THE BEST\" TRUCKING".to_string(),
            dba_name: String::new(),
            entity_type: "CARRIER".to_string(),
            status: "AUTHORIZED FOR Property".to_string(),
            email: "ops@acme.example".to_string(),
            phone: "(555) 123-4567".to_string(),
            power_units: "12".to_string(),
            drivers: "14".to_string(),
            physical_address: "100 Main St, Chicago, IL".to_string(),
            mailing_address: "PO Box 7, Chicago, IL".to_string(),
            date_scraped: "01/15/2024".to_string(),
            mcs150_date: "01/01/2023".to_string(),
            mcs150_mileage: "250,000 (2022)".to_string(),
            operation_classification: vec!["Auth. For Hire".to_string(), "Exempt For Hire".to_string()],
            carrier_operation: vec!["Interstate".to_string()],
            cargo_carried: vec!["General Freight".to_string()],
            out_of_service_date: "N/A".to_string(),
            state_carrier_id: "N/A".to_string(),
            duns_number: "N/A".to_string(),
            insurance_policies: None,
        }
    }

    #[test]
    fn test_every_value_is_quoted() {
        let csv = render_csv(&[record()], false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);

        assert!(lines[0].starts_with("\"Date\",\"MC\",\"Email\""));
        assert!(lines[1].contains("\"515038\""));
        // Empty DBA renders as an empty quoted string
        assert!(lines[1].contains(",\"\","));
        // Internal quotes are doubled
        assert!(lines[1].contains("\"ACME \"\"THE BEST\"\" TRUCKING\""));
        // Classification lists joined with ", "
        assert!(lines[1].contains("\"Auth. For Hire, Exempt For Hire\""));
    }

    #[test]
    fn test_insurance_variant_appends_policy_column() {
        let enriched = record().with_policies(vec![
            InsurancePolicy {
                carrier: "PROGRESSIVE".to_string(),
                policy_number: "P-100".to_string(),
                effective_date: "01/01/2024".to_string(),
                coverage_amount: "1000000".to_string(),
                policy_type: "BIPD".to_string(),
                policy_class: "Primary".to_string(),
            },
            InsurancePolicy {
                carrier: "GEICO".to_string(),
                policy_number: "G-7".to_string(),
                effective_date: "02/01/2024".to_string(),
                coverage_amount: "750000".to_string(),
                policy_type: "Cargo".to_string(),
                policy_class: "Excess".to_string(),
            },
        ]);

        let csv = render_csv(&[enriched, record()], true).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].ends_with("\"Insurance Policies\""));
        assert!(lines[1].ends_with("\"PROGRESSIVE:P-100 | GEICO:G-7\""));
        // Un-enriched record renders the column empty
        assert!(lines[2].ends_with("\"\""));
    }

    #[test]
    fn test_header_order_is_stable() {
        let csv = render_csv(&[], false).unwrap();
        assert_eq!(
            csv.trim_end(),
            "\"Date\",\"MC\",\"Email\",\"Entity Type\",\"Operating Authority Status\",\
             \"Out of Service Date\",\"Legal_Name\",\"DBA Name\",\"Physical Address\",\
             \"Phone\",\"Mailing Address\",\"USDOT Number\",\"State Carrier ID Number\",\
             \"Power Units\",\"Drivers\",\"DUNS Number\",\"MCS-150 Form Date\",\
             \"MCS-150 Mileage (Year)\",\"Operation Classification\",\"Carrier Operation\",\
             \"Cargo Carried\""
        );
    }
}
