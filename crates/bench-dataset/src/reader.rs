//! Typed CSV reading.

use crate::error::DatasetError;
use bench_core::{ColumnDef, ColumnKind, Dataset, DatasetSchema, Record, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a timestamp cell.
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]`, RFC 3339
/// (converted to UTC) and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Load a dataset from a CSV file with a header row.
pub fn load_csv(
    path: &Path,
    name: impl Into<String>,
    schema: DatasetSchema,
) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_csv(file, &path.display().to_string(), &schema)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(Dataset::new(name, schema, records))
}

/// Read typed records from any CSV source with a header row.
///
/// Only the schema's columns are kept; extra columns are ignored.
pub fn read_csv<R: Read>(
    reader: R,
    source_name: &str,
    schema: &DatasetSchema,
) -> Result<Vec<Record>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| DatasetError::Csv {
            source_name: source_name.to_string(),
            source,
        })?
        .clone();

    // Position of each schema column in the file
    let positions = schema
        .columns
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|h| h == column.name)
                .ok_or_else(|| DatasetError::MissingColumn {
                    source_name: source_name.to_string(),
                    column: column.name.clone(),
                })
        })
        .collect::<Result<Vec<usize>, DatasetError>>()?;
    debug!("Column positions in {}: {:?}", source_name, positions);

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|source| DatasetError::Csv {
            source_name: source_name.to_string(),
            source,
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let mut record = Record::new();
        for (column, position) in schema.columns.iter().zip(&positions) {
            let raw = row.get(*position).unwrap_or("");
            let value = parse_cell(raw, column).map_err(|expected| DatasetError::InvalidValue {
                source_name: source_name.to_string(),
                line,
                column: column.name.clone(),
                value: raw.to_string(),
                expected,
            })?;
            record.set(column.name.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

fn parse_cell(raw: &str, column: &ColumnDef) -> Result<Value, &'static str> {
    if raw.is_empty() {
        return match column.kind {
            _ if column.nullable => Ok(Value::Null),
            ColumnKind::Text => Ok(Value::Text(String::new())),
            ColumnKind::Int => Err("an integer"),
            ColumnKind::Float => Err("a number"),
            ColumnKind::Timestamp => Err("a timestamp"),
        };
    }

    match column.kind {
        ColumnKind::Int => raw
            .parse::<i64>()
            .or_else(|_| parse_integral_float(raw))
            .map(Value::Int)
            .map_err(|_| "an integer"),
        ColumnKind::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| "a number"),
        ColumnKind::Text => Ok(Value::Text(raw.to_string())),
        ColumnKind::Timestamp => parse_timestamp(raw)
            .map(Value::Timestamp)
            .ok_or("a timestamp"),
    }
}

/// Accept `12.0` for integer columns, as spreadsheet exports often write them.
fn parse_integral_float(raw: &str) -> Result<i64, ()> {
    let value: f64 = raw.parse().map_err(|_| ())?;
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn schema() -> DatasetSchema {
        DatasetSchema::new(
            vec![
                ColumnDef::new("LoanID", ColumnKind::Int),
                ColumnDef::new("LoanDate", ColumnKind::Timestamp),
                ColumnDef::new("ReturnDate", ColumnKind::Timestamp).nullable(),
                ColumnDef::new("Note", ColumnKind::Text),
            ],
            "LoanID",
        )
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2023-05-17 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-17T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-17T11:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-05-17").map(|ts| ts.hour()),
            Some(0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_read_csv_typed_rows() {
        let data = "\
Extra,LoanID,LoanDate,ReturnDate,Note
x,1,2023-01-01 10:00:00,2023-01-10 10:00:00,first
y,2,2023-01-02,,second
";
        let records = read_csv(data.as_bytes(), "loans.csv", &schema()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("LoanID"), Some(&Value::Int(1)));
        assert!(records[0].get("ReturnDate").unwrap().as_timestamp().is_some());
        assert_eq!(records[1].get("ReturnDate"), Some(&Value::Null));
        assert_eq!(records[1].get("Note"), Some(&Value::Text("second".into())));
        assert!(records[0].get("Extra").is_none());
        // Schema order, not file order
        let names: Vec<&str> = records[0].fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["LoanID", "LoanDate", "ReturnDate", "Note"]);
    }

    #[test]
    fn test_read_csv_accepts_integral_floats() {
        let data = "LoanID,LoanDate,ReturnDate,Note\n3.0,2023-01-01,,n\n";
        let records = read_csv(data.as_bytes(), "loans.csv", &schema()).unwrap();
        assert_eq!(records[0].get("LoanID"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_read_csv_missing_column() {
        let data = "LoanID,LoanDate\n1,2023-01-01\n";
        let err = read_csv(data.as_bytes(), "loans.csv", &schema()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { ref column, .. } if column == "ReturnDate"
        ));
    }

    #[test]
    fn test_read_csv_invalid_value_reports_line() {
        let data = "LoanID,LoanDate,ReturnDate,Note\n1,2023-01-01,,a\nabc,2023-01-01,,b\n";
        let err = read_csv(data.as_bytes(), "loans.csv", &schema()).unwrap_err();
        match err {
            DatasetError::InvalidValue {
                line, column, value, ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "LoanID");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_non_nullable_timestamp_is_rejected() {
        let data = "LoanID,LoanDate,ReturnDate,Note\n1,,,a\n";
        let err = read_csv(data.as_bytes(), "loans.csv", &schema()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidValue { expected: "a timestamp", .. }));
    }
}
