//! CSV ingest.
//!
//! This module turns a numeric CSV into the in-memory inputs of the library:
//! a `Dataset` plus target vector for stepwise selection, or a single series
//! for the variance-ratio test.
//!
//! Design goals:
//! - **Strict schema** for the requested columns (clear errors + exit code 2)
//! - **Row-level validation**: a row with a missing, unparsable or non-finite
//!   value in any used column is skipped and reported (listwise deletion)
//! - **Deterministic behavior**: row order and column order are preserved
//! - **Separation of concerns**: no statistics here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::domain::Dataset;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output for stepwise selection.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub target: Vec<f64>,
    pub target_name: String,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Ingest output for a single numeric column.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub column: String,
    pub values: Vec<f64>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load `target` and the candidate features from a CSV file.
///
/// With `features = None` every column except the target is a candidate, in
/// header order.
pub fn load_dataset(path: &Path, target: &str, features: Option<&[String]>) -> Result<LoadedDataset, AppError> {
    let file = open(path)?;
    read_dataset(file, target, features)
}

/// Load a single numeric column from a CSV file.
pub fn load_series(path: &Path, column: &str) -> Result<LoadedSeries, AppError> {
    let file = open(path)?;
    read_series(file, column)
}

pub fn read_dataset<R: Read>(reader: R, target: &str, features: Option<&[String]>) -> Result<LoadedDataset, AppError> {
    let mut reader = csv_reader(reader);
    let headers = read_headers(&mut reader)?;
    let header_map = build_header_map(&headers)?;

    let target_idx = column_index(&header_map, target)?;
    let feature_names: Vec<String> = match features {
        Some(list) => list.to_vec(),
        None => headers
            .iter()
            .map(normalize_header_name)
            .filter(|name| name != target)
            .collect(),
    };
    if feature_names.is_empty() {
        return Err(AppError::new(2, "No feature columns to select from."));
    }
    if feature_names.iter().any(|name| name == target) {
        return Err(AppError::new(
            2,
            format!("Target column `{target}` cannot also be a feature."),
        ));
    }
    let feature_idx = feature_names
        .iter()
        .map(|name| column_index(&header_map, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut used = Vec::with_capacity(feature_idx.len() + 1);
    used.push((target, target_idx));
    used.extend(feature_names.iter().map(String::as_str).zip(feature_idx));

    let (rows, row_errors, rows_read) = read_rows(&mut reader, &used)?;

    let mut target_values = Vec::with_capacity(rows.len());
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); feature_names.len()];
    for row in rows {
        target_values.push(row[0]);
        for (column, value) in columns.iter_mut().zip(&row[1..]) {
            column.push(*value);
        }
    }

    let dataset = Dataset::new(feature_names.into_iter().zip(columns).collect())?;

    Ok(LoadedDataset {
        dataset,
        target: target_values,
        target_name: target.to_string(),
        row_errors,
        rows_read,
    })
}

pub fn read_series<R: Read>(reader: R, column: &str) -> Result<LoadedSeries, AppError> {
    let mut reader = csv_reader(reader);
    let headers = read_headers(&mut reader)?;
    let header_map = build_header_map(&headers)?;
    let idx = column_index(&header_map, column)?;

    let (rows, row_errors, rows_read) = read_rows(&mut reader, &[(column, idx)])?;

    Ok(LoadedSeries {
        column: column.to_string(),
        values: rows.into_iter().map(|row| row[0]).collect(),
        row_errors,
        rows_read,
    })
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<StringRecord, AppError> {
    reader
        .headers()
        .map(StringRecord::clone)
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))
}

fn build_header_map(headers: &StringRecord) -> Result<HashMap<String, usize>, AppError> {
    let mut map = HashMap::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let name = normalize_header_name(name);
        if map.insert(name.clone(), idx).is_some() {
            return Err(AppError::new(2, format!("Duplicate CSV column: `{name}`")));
        }
    }
    Ok(map)
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Column names are otherwise kept as written (case included)
    // because they become feature names in the report.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn column_index(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
}

/// Parse the `used` columns of every record.
///
/// Returns the parsed rows (values in `used` order), the skipped rows, and the
/// number of records read.
fn read_rows<R: Read>(
    reader: &mut csv::Reader<R>,
    used: &[(&str, usize)],
) -> Result<(Vec<Vec<f64>>, Vec<RowError>, usize), AppError> {
    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, used));
        match parsed {
            Ok(row) => rows.push(row),
            Err(message) => {
                warn!(line, %message, "skipping CSV row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "No valid rows remain after parsing."));
    }
    Ok((rows, row_errors, rows_read))
}

fn parse_row(record: &StringRecord, used: &[(&str, usize)]) -> Result<Vec<f64>, String> {
    used.iter()
        .map(|&(name, idx)| {
            let raw = record
                .get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("Missing value: `{name}`"))?;
            let value = raw
                .parse::<f64>()
                .map_err(|_| format!("Invalid number in `{name}`: '{raw}'"))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(format!("Non-finite value in `{name}`: '{raw}'"))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{feff}y, x1 ,x2\n1.0,2.0,3.0\n2.0,,4.0\n3.0,4.0,abc\n4.0,5.0,6.0\n5.0,inf,1.0\n6.0,7.0,8.0\n";

    #[test]
    fn dataset_skips_bad_rows_and_keeps_order() {
        let loaded = read_dataset(CSV.as_bytes(), "y", None).unwrap();
        assert_eq!(loaded.rows_read, 6);
        assert_eq!(loaded.target, vec![1.0, 4.0, 6.0]);
        assert_eq!(loaded.dataset.names(), &["x1", "x2"]);
        assert_eq!(loaded.dataset.column("x1"), Some(&[2.0, 5.0, 7.0][..]));

        let lines: Vec<usize> = loaded.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 6]);
        assert!(loaded.row_errors[1].message.contains("x2"));
    }

    #[test]
    fn explicit_feature_list_limits_used_columns() {
        // The bad x1 values no longer matter once x1 is not requested.
        let features = vec!["x2".to_string()];
        let loaded = read_dataset(CSV.as_bytes(), "y", Some(&features)).unwrap();
        assert_eq!(loaded.dataset.names(), &["x2"]);
        assert_eq!(loaded.target, vec![1.0, 2.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn missing_columns_are_schema_errors() {
        let err = read_dataset(CSV.as_bytes(), "nope", None).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let features = vec!["x9".to_string()];
        let err = read_dataset(CSV.as_bytes(), "y", Some(&features)).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let features = vec!["y".to_string()];
        let err = read_dataset(CSV.as_bytes(), "y", Some(&features)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_usable_rows_is_exit_code_3() {
        let err = read_dataset("y,x\na,b\n".as_bytes(), "y", None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = read_series("a,a\n1,2\n".as_bytes(), "a").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn series_reads_one_column() {
        let loaded = read_series(CSV.as_bytes(), "x2").unwrap();
        assert_eq!(loaded.values, vec![3.0, 4.0, 6.0, 1.0, 8.0]);
        assert_eq!(loaded.row_errors.len(), 1);
        assert_eq!(loaded.column, "x2");
    }
}
