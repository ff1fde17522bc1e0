use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::{ClientMetricRecord, ProjectField, ProjectRecord};
use crate::normalize::{int_or_zero, to_fixed};

pub const CLIENT_METRIC_COLUMNS: [&str; 4] = [
    "Client Name",
    "Reticula Completed Calls",
    "Inex One Expected Calls",
    "Inex One Completed Calls",
];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("No data found in CSV file.")]
    NoRows,
    #[error("Error parsing CSV file: {0}")]
    Parse(#[from] csv::Error),
    #[error("Error reading file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

pub fn read_input(path: &Path) -> Result<String, IngestError> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses project rows. Either every row is accepted or none is.
pub fn ingest_projects(
    input: &str,
    options: &IngestOptions,
) -> Result<Vec<ProjectRecord>, IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(input.as_bytes());

    let required: Vec<&str> = ProjectField::ALL.iter().map(|field| field.column()).collect();
    check_columns(reader.headers()?, &required)?;

    let records: Vec<ProjectRecord> = deserialize_rows(&mut reader)?;
    if records.is_empty() {
        return Err(IngestError::NoRows);
    }

    info!(rows = records.len(), "ingested project records");
    Ok(records)
}

/// Parses client call-metric rows and synthesizes each row's Rate. A `Rate`
/// column in the input is ignored.
pub fn ingest_client_metrics(
    input: &str,
    options: &IngestOptions,
) -> Result<Vec<ClientMetricRecord>, IngestError> {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct CsvRow {
        #[serde(rename = "Client Name")]
        client_name: String,
        #[serde(rename = "Reticula Completed Calls")]
        reticula_completed: String,
        #[serde(rename = "Inex One Expected Calls")]
        inex_one_expected: String,
        #[serde(rename = "Inex One Completed Calls")]
        inex_one_completed: String,
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(input.as_bytes());

    check_columns(reader.headers()?, &CLIENT_METRIC_COLUMNS)?;

    let mut records = Vec::new();
    let mut defaulted = 0usize;
    for row in deserialize_rows::<CsvRow>(&mut reader)? {
        if [&row.reticula_completed, &row.inex_one_expected, &row.inex_one_completed]
            .iter()
            .any(|value| value.is_empty())
        {
            defaulted += 1;
        }
        let rate = synthesize_rate(&row.reticula_completed, &row.inex_one_completed);
        records.push(ClientMetricRecord {
            client_name: row.client_name,
            reticula_completed: or_zero(row.reticula_completed),
            inex_one_expected: or_zero(row.inex_one_expected),
            inex_one_completed: or_zero(row.inex_one_completed),
            rate,
        });
    }

    if records.is_empty() {
        return Err(IngestError::NoRows);
    }

    if defaulted > 0 {
        warn!(rows = defaulted, "empty call counts defaulted to 0");
    }
    info!(rows = records.len(), "ingested client metric records");
    Ok(records)
}

/// `100 / (inex_one_completed / reticula_completed)` when both counts are
/// positive, otherwise 0; always two decimals.
pub fn synthesize_rate(reticula_completed: &str, inex_one_completed: &str) -> String {
    let reticula = int_or_zero(reticula_completed);
    let inex_one = int_or_zero(inex_one_completed);

    let rate = if reticula > 0 && inex_one > 0 {
        100.0 / (inex_one as f64 / reticula as f64)
    } else {
        0.0
    };

    to_fixed(rate, 2)
}

/// Short rows are padded with empty fields up to the header width before
/// they are deserialized.
fn deserialize_rows<T: DeserializeOwned>(
    reader: &mut Reader<&[u8]>,
) -> Result<Vec<T>, IngestError> {
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        let mut record = result?;
        while record.len() < headers.len() {
            record.push_field("");
        }
        rows.push(record.deserialize(Some(&headers))?);
    }
    Ok(rows)
}

fn check_columns(headers: &StringRecord, required: &[&str]) -> Result<(), IngestError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        debug!(?missing, "rejecting upload");
        Err(IngestError::MissingColumns(missing))
    }
}

fn or_zero(value: String) -> String {
    if value.is_empty() {
        "0".to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_HEADER: &str = "Project Name,Project Start Date,Project Geoscope,Project Industry,Project Manager,Project Associates,Project Demand,Client Name,Project Type,Expert Name,Expert Final Terms State,Expert Final Interaction State,Expert Final Outreach/Followup Number,Event Executor Associate,Event Type,Event Date";

    #[test]
    fn rate_matches_reference_values() {
        assert_eq!(synthesize_rate("50", "25"), "200.00");
        assert_eq!(synthesize_rate("10", "5"), "200.00");
        assert_eq!(synthesize_rate("3", "9"), "33.33");
        assert_eq!(synthesize_rate("1", "800"), "0.13");
        assert_eq!(synthesize_rate("0", "25"), "0.00");
        assert_eq!(synthesize_rate("50", "0"), "0.00");
        assert_eq!(synthesize_rate("", "abc"), "0.00");
    }

    #[test]
    fn client_metrics_ignore_input_rate_column() {
        let input = "Client Name,Reticula Completed Calls,Inex One Expected Calls,Inex One Completed Calls,Rate\n\
                     Acme,10,20,5,999\n\
                     Globex,,4,\n";
        let records = ingest_client_metrics(input, &IngestOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rate, "200.00");
        assert_eq!(records[1].reticula_completed, "0");
        assert_eq!(records[1].inex_one_completed, "0");
        assert_eq!(records[1].rate, "0.00");
    }

    #[test]
    fn missing_columns_are_named() {
        let input = "Client Name,Inex One Completed Calls\nAcme,5\n";
        let err = ingest_client_metrics(input, &IngestOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required columns: Reticula Completed Calls, Inex One Expected Calls"
        );
    }

    #[test]
    fn header_only_upload_is_rejected() {
        let err = ingest_projects(&format!("{PROJECT_HEADER}\n"), &IngestOptions::default())
            .unwrap_err();
        assert!(matches!(err, IngestError::NoRows));
    }

    #[test]
    fn project_rows_keep_raw_strings() {
        let input = format!(
            "{PROJECT_HEADER},Extra\n\
             Alpha,2024-01-05,EMEA,Energy,Dana,Lee,High,Acme,Inex.One,Dr. Who,Signed,Completed,2,Sam,Call Completed,2024-01-09,ignored\n\
             Beta,,,,,,,,,,,,,,,\n"
        );
        let records = ingest_projects(&input, &IngestOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].project_type, "Inex.One");
        assert_eq!(records[0].followup_number, "2");
        assert_eq!(records[1].project_name, "Beta");
        assert_eq!(records[1].client_name, "");
    }

    #[test]
    fn tab_delimited_input_is_supported() {
        let input = "Client Name\tReticula Completed Calls\tInex One Expected Calls\tInex One Completed Calls\n\
                     Acme\t50\t30\t25\n";
        let options = IngestOptions { delimiter: b'\t' };
        let records = ingest_client_metrics(input, &options).unwrap();
        assert_eq!(records[0].rate, "200.00");
    }
}
