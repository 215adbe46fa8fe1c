//! Batch input files for scraping multiple MC numbers
//!
//! Supports:
//! - CSV files with one MC number per line or an "mc" column
//! - JSON files with an array of MC-number strings or objects with an "mc" field
//! - Error resilience (invalid entries are skipped, not fatal)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Represents one MC-number entry from a batch input file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McEntry {
    /// The MC number to look up
    pub mc: String,
    /// Optional label/identifier for the entry (e.g., company name)
    #[serde(default)]
    pub label: Option<String>,
}

impl McEntry {
    pub fn new(mc: impl Into<String>) -> Self {
        Self {
            mc: mc.into(),
            label: None,
        }
    }
}

/// Input format for batch MC files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse an MC-number list from a file (auto-detects format from extension)
pub fn parse_mc_file(path: &Path) -> Result<Vec<McEntry>> {
    let format = InputFormat::from_path(path).context(format!(
        "Cannot determine input format from file extension. Expected .csv or .json: {}",
        path.display()
    ))?;

    let content = fs::read_to_string(path)
        .context(format!("Failed to read input file: {}", path.display()))?;

    match format {
        InputFormat::Csv => parse_csv_mc_numbers(&content),
        InputFormat::Json => parse_json_mc_numbers(&content),
    }
}

/// Parse MC numbers from CSV content
///
/// Supports two formats:
/// 1. One MC number per line (no header)
/// 2. CSV with an "mc" column header (and optional "label" column)
pub fn parse_csv_mc_numbers(content: &str) -> Result<Vec<McEntry>> {
    let mut entries = Vec::new();
    let lines: Vec<&str> = content.lines().collect();

    if lines.is_empty() {
        return Ok(entries);
    }

    let has_header = lines[0].to_lowercase().contains("mc");

    if has_header {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers().context("Failed to read CSV headers")?.clone();

        let mc_idx = headers
            .iter()
            .position(|h| h.to_lowercase() == "mc")
            .context("CSV must have an 'mc' column when using headers")?;
        let label_idx = headers.iter().position(|h| h.to_lowercase() == "label");

        for result in reader.records() {
            let record = result.context("Failed to parse CSV record")?;

            let mc = record
                .get(mc_idx)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            if let Some(mc) = mc {
                if !is_valid_mc_number(&mc) {
                    continue;
                }

                let label = label_idx
                    .and_then(|idx| record.get(idx))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());

                entries.push(McEntry { mc, label });
            }
        }
    } else {
        for line in lines {
            let mc = line.split(',').next().unwrap_or(line).trim();

            if mc.is_empty() || mc.starts_with('#') {
                continue;
            }
            if !is_valid_mc_number(mc) {
                continue;
            }

            entries.push(McEntry::new(mc));
        }
    }

    Ok(entries)
}

/// Parse MC numbers from JSON content
///
/// Supports three formats:
/// 1. Array of strings: ["515038", "515039"]
/// 2. Array of objects with an "mc" field: [{"mc": "515038"}]
/// 3. Object with an "mc_numbers" array: {"mc_numbers": ["515038"]}
pub fn parse_json_mc_numbers(content: &str) -> Result<Vec<McEntry>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("Failed to parse JSON content")?;

    let entries = match &value {
        serde_json::Value::Array(arr) => parse_json_array(arr),

        serde_json::Value::Object(obj) => {
            if let Some(serde_json::Value::Array(arr)) = obj.get("mc_numbers") {
                parse_json_array(arr)
            } else {
                bail!("JSON object must have an 'mc_numbers' array field");
            }
        }

        _ => bail!("JSON must be an array of MC numbers or an object with 'mc_numbers' field"),
    };

    Ok(entries)
}

fn parse_json_array(arr: &[serde_json::Value]) -> Vec<McEntry> {
    let mut entries = Vec::new();

    for item in arr {
        match item {
            serde_json::Value::String(mc) => {
                let mc = mc.trim();
                if is_valid_mc_number(mc) {
                    entries.push(McEntry::new(mc));
                }
            }
            serde_json::Value::Number(mc) => {
                let mc = mc.to_string();
                if is_valid_mc_number(&mc) {
                    entries.push(McEntry::new(mc));
                }
            }
            serde_json::Value::Object(obj) => {
                if let Some(serde_json::Value::String(mc)) = obj.get("mc") {
                    let mc = mc.trim();
                    if is_valid_mc_number(mc) {
                        let label = obj
                            .get("label")
                            .and_then(|v| v.as_str())
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty());

                        entries.push(McEntry {
                            mc: mc.to_string(),
                            label,
                        });
                    }
                }
            }
            _ => {
                // Skip invalid entries
            }
        }
    }

    entries
}

/// Basic MC-number validation: all digits, with an optional "MC-" prefix.
pub fn is_valid_mc_number(mc: &str) -> bool {
    let digits = mc.strip_prefix("MC-").or_else(|| mc.strip_prefix("MC")).unwrap_or(mc);

    !digits.is_empty() && digits.len() <= 8 && digits.chars().all(|c| c.is_ascii_digit())
}
