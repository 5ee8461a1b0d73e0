//! CSV loaders for the incident table and the population extract.
//!
//! Acquisition (downloads, caching) happens elsewhere; these functions
//! read local files or any [`Read`] implementation.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use accident_risk_geography_models::PopulationSheet;
use accident_risk_incident_models::{REQUIRED_COLUMNS, RawIncident};
use accident_risk_ingest_models::LoadOptions;

use crate::IngestError;
use crate::progress::ProgressCallback;

/// How often (in records) the progress callback is advanced while reading.
const PROGRESS_STRIDE: u64 = 10_000;

/// Verifies that every required incident column is present in `headers`.
///
/// # Errors
///
/// Returns [`IngestError::MissingField`] naming the first absent column.
pub fn check_required_columns(headers: &csv::StringRecord) -> Result<(), IngestError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(IngestError::MissingField {
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Decodes a record as UTF-8, replacing invalid bytes with U+FFFD.
///
/// Returns whether any field needed replacing.
fn decode_lossy(record: csv::ByteRecord) -> (csv::StringRecord, bool) {
    match csv::StringRecord::from_byte_record(record) {
        Ok(record) => (record, false),
        Err(err) => (
            err.into_byte_record()
                .iter()
                .map(String::from_utf8_lossy)
                .collect(),
            true,
        ),
    }
}

/// Reads raw incident rows from CSV.
///
/// The header is validated before any row is read, so a structurally
/// wrong file fails without partial output. Invalid UTF-8 inside a record
/// does not fail the load: the bytes are replaced and the row is kept, so
/// an affected field that the cleaner needs drops the row there.
///
/// # Errors
///
/// Returns [`IngestError`] if the header is missing a required column or
/// the CSV is malformed.
pub fn read_incidents<R: Read>(
    reader: R,
    options: &LoadOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<RawIncident>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let (headers, _) = decode_lossy(reader.byte_headers()?.clone());
    check_required_columns(&headers)?;

    let mut incidents = Vec::new();
    let mut replaced = 0_u64;
    let mut record = csv::ByteRecord::new();
    loop {
        if let Some(limit) = options.limit
            && incidents.len() as u64 >= limit
        {
            log::info!("Reached limit of {limit} incident records, stopping CSV parse");
            break;
        }
        if !reader.read_byte_record(&mut record)? {
            break;
        }

        let (decoded, lossy) = decode_lossy(std::mem::take(&mut record));
        if lossy {
            replaced += 1;
        }
        incidents.push(decoded.deserialize::<RawIncident>(Some(&headers))?);

        let count = incidents.len() as u64;
        if count % PROGRESS_STRIDE == 0 {
            progress.inc(PROGRESS_STRIDE);
        }
    }

    if replaced > 0 {
        log::info!("Replaced invalid UTF-8 in {replaced} incident records");
    }
    progress.finish(format!("read {} incident records", incidents.len()));
    log::info!("Read {} incident records", incidents.len());
    Ok(incidents)
}

/// Opens and reads an incident CSV file.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be opened or read.
pub fn read_incidents_file(
    path: &Path,
    options: &LoadOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<RawIncident>, IngestError> {
    log::info!("Loading incidents from {}", path.display());
    read_incidents(File::open(path)?, options, progress)
}

/// Reads a population extract exported from a spreadsheet.
///
/// Discards `options.skip_rows` caption lines, takes the next line as the
/// column labels and every remaining line as a row of string cells. Short
/// rows are padded with empty cells to the label width.
///
/// # Errors
///
/// Returns [`IngestError`] if the CSV is malformed or no label line
/// remains after skipping.
pub fn read_population_sheet<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<PopulationSheet, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut lines = reader.records().skip(options.skip_rows);

    let columns: Vec<String> = match lines.next() {
        Some(record) => record?.iter().map(|c| c.trim().to_string()).collect(),
        None => {
            return Err(IngestError::NoHeader {
                skipped: options.skip_rows,
            });
        }
    };

    let limit = options
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

    let mut rows = Vec::new();
    for record in lines.take(limit) {
        let mut row: Vec<String> = record?.iter().map(str::to_string).collect();
        if row.len() < columns.len() {
            row.resize(columns.len(), String::new());
        }
        rows.push(row);
    }

    log::info!(
        "Read population extract: {} columns, {} rows",
        columns.len(),
        rows.len()
    );
    Ok(PopulationSheet { columns, rows })
}

/// Opens and reads a population extract CSV file.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be opened or read.
pub fn read_population_file(
    path: &Path,
    options: &LoadOptions,
) -> Result<PopulationSheet, IngestError> {
    log::info!("Loading population extract from {}", path.display());
    read_population_sheet(File::open(path)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_progress;

    const HEADER: &str = "ID,Source,Severity,Start_Time,End_Time,Start_Lat,Start_Lng,Distance(mi),County,State,Temperature(F),Visibility(mi),Precipitation(in)";

    #[test]
    fn reads_incidents_ignoring_extra_columns() {
        let csv = format!(
            "{HEADER}\nA-1,Source2,3,2016-02-08 05:46:00,2016-02-08 11:00:00,39.86,-84.05,0.01,Montgomery,OH,36.9,10.0,0.02\n"
        );
        let rows = read_incidents(csv.as_bytes(), &LoadOptions::default(), &null_progress())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id.as_deref(), Some("A-1"));
        assert_eq!(rows[0].distance_mi.as_deref(), Some("0.01"));
        assert_eq!(rows[0].state.as_deref(), Some("OH"));
    }

    #[test]
    fn empty_cells_read_as_none() {
        let csv = format!("{HEADER}\nA-1,Source2,3,2016-02-08 05:46:00,,39.86,-84.05,0.01,,OH,,10.0,\n");
        let rows = read_incidents(csv.as_bytes(), &LoadOptions::default(), &null_progress())
            .unwrap();
        assert_eq!(rows[0].end_time, None);
        assert_eq!(rows[0].county, None);
        assert_eq!(rows[0].precipitation_in, None);
    }

    #[test]
    fn missing_required_column_is_structural_error() {
        let csv = "ID,Severity,Start_Time\nA-1,2,2016-02-08 05:46:00\n";
        let err = read_incidents(csv.as_bytes(), &LoadOptions::default(), &null_progress())
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingField { column } if column == "End_Time"));
    }

    #[test]
    fn honors_record_limit() {
        let row = "A-1,S,2,2016-02-08 05:46:00,2016-02-08 06:46:00,1,1,0,C,OH,1,1,0";
        let csv = format!("{HEADER}\n{row}\n{row}\n{row}\n");
        let options = LoadOptions {
            limit: Some(2),
            ..LoadOptions::default()
        };
        let rows = read_incidents(csv.as_bytes(), &options, &null_progress()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn zero_limit_reads_nothing() {
        let row = "A-1,S,2,2016-02-08 05:46:00,2016-02-08 06:46:00,1,1,0,C,OH,1,1,0";
        let csv = format!("{HEADER}\n{row}\n");
        let options = LoadOptions {
            limit: Some(0),
            ..LoadOptions::default()
        };
        let rows = read_incidents(csv.as_bytes(), &options, &null_progress()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn invalid_utf8_keeps_the_row() {
        let header = "ID,Description,Severity,Start_Time,End_Time,Start_Lat,Start_Lng,Distance(mi),County,State,Temperature(F),Visibility(mi),Precipitation(in)";
        let tail = b",2,2016-02-08 05:46:00,2016-02-08 06:46:00,1,1,0,C,OH,1,1,0\n";
        let mut csv = format!("{header}\n").into_bytes();
        let rows: [(&str, &[u8]); 3] = [("A-1", b"ok"), ("A-2", b"caf\xe9"), ("A-3", b"ok")];
        for (id, description) in rows {
            csv.extend_from_slice(id.as_bytes());
            csv.push(b',');
            csv.extend_from_slice(description);
            csv.extend_from_slice(tail);
        }

        let rows = read_incidents(csv.as_slice(), &LoadOptions::default(), &null_progress())
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].id.as_deref(), Some("A-2"));
        assert_eq!(rows[1].state.as_deref(), Some("OH"));
    }

    #[test]
    fn reads_population_sheet_after_captions() {
        let csv = "Table 1\nSource: Census\nGeography,18 to 24 years,Unnamed\n\
                   County,Number,\"Change, 2010 to 2020\"\n\
                   caption,,\n\
                   \"Autauga County, Alabama\",\"4,123\",12\n\
                   short\n";
        let options = LoadOptions {
            skip_rows: 2,
            ..LoadOptions::default()
        };
        let sheet = read_population_sheet(csv.as_bytes(), &options).unwrap();
        assert_eq!(sheet.columns, vec!["Geography", "18 to 24 years", "Unnamed"]);
        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(sheet.cell(0, 2), Some("Change, 2010 to 2020"));
        assert_eq!(sheet.cell(2, 1), Some("4,123"));
        assert_eq!(sheet.rows[3].len(), 3);
    }

    #[test]
    fn population_sheet_without_label_line_is_error() {
        let options = LoadOptions {
            skip_rows: 5,
            ..LoadOptions::default()
        };
        let err = read_population_sheet("a\nb\n".as_bytes(), &options).unwrap_err();
        assert!(matches!(err, IngestError::NoHeader { skipped: 5 }));
    }

    #[test]
    fn population_limit_counts_rows_after_labels() {
        let csv = "State,County\nOhio,Adams\nOhio,Allen\nOhio,Clark\n";
        let read = |limit| {
            let options = LoadOptions {
                limit: Some(limit),
                ..LoadOptions::default()
            };
            read_population_sheet(csv.as_bytes(), &options).unwrap()
        };
        let none = read(0);
        assert_eq!(none.columns, vec!["State", "County"]);
        assert!(none.rows.is_empty());
        assert_eq!(read(2).rows.len(), 2);
    }
}
