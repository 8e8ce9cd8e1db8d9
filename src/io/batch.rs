//! Batch CSV input and output.
//!
//! Design goals:
//! - **Strict header** (every form field must have a column, exit code 2)
//! - **Row-level errors** (a bad row is reported, never aborts the batch)
//! - **Stable output order** (rows come out in input order)

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{PredictionResult, Tool};
use crate::error::{AppError, EXIT_INPUT};
use crate::form::{CAR_FIELDS, FormState, LOAN_FIELDS};

/// One input row, as raw form text.
#[derive(Debug, Clone)]
pub struct BatchRow {
    /// 1-based line number in the input file.
    pub line: usize,
    pub form: FormState,
}

/// A row-level error encountered while reading.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BatchInput {
    pub rows: Vec<BatchRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Scored row, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub line: usize,
    pub result: Result<PredictionResult, String>,
}

pub fn fields_for(tool: Tool) -> &'static [crate::form::Field] {
    match tool {
        Tool::Loan => &LOAN_FIELDS,
        Tool::Car => &CAR_FIELDS,
    }
}

pub fn read_batch_csv(path: &Path, tool: Tool) -> Result<BatchInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_batch(file, tool)
}

pub fn read_batch<R: std::io::Read>(reader: R, tool: Tool) -> Result<BatchInput, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let fields = fields_for(tool);
    let missing: Vec<&str> = fields
        .iter()
        .map(|f| f.key())
        .filter(|key| !header_map.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("CSV is missing column(s) for {}: {}", tool.display_name(), missing.join(", ")),
        ));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let mut form = FormState::new(fields);
        for (i, field) in fields.iter().enumerate() {
            let text = header_map
                .get(field.key())
                .and_then(|&col| record.get(col))
                .unwrap_or("");
            form.set_at(i, text);
        }
        rows.push(BatchRow { line, form });
    }

    Ok(BatchInput {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

const LOAN_COLUMNS: [&str; 5] = [
    "line",
    "predicted_class",
    "probability_approved",
    "probability_default",
    "error",
];
const CAR_COLUMNS: [&str; 5] = ["line", "predicted_price", "price_low", "price_high", "error"];

/// Write outcomes as CSV. Failed rows keep their line and carry the message.
pub fn write_batch<W: Write>(writer: W, tool: Tool, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    let io_err = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write batch CSV: {e}"));

    let header = match tool {
        Tool::Loan => LOAN_COLUMNS,
        Tool::Car => CAR_COLUMNS,
    };
    out.write_record(header).map_err(io_err)?;

    for outcome in outcomes {
        let line = outcome.line.to_string();
        let record: [String; 5] = match &outcome.result {
            Ok(PredictionResult::Classification(p)) => [
                line,
                p.predicted_class.as_str().to_string(),
                format!("{:.6}", p.probability_approved),
                format!("{:.6}", p.probability_default),
                String::new(),
            ],
            Ok(PredictionResult::Regression(p)) => {
                let (lo, hi) = p.price_range();
                [
                    line,
                    format!("{:.2}", p.predicted_price),
                    format!("{lo:.2}"),
                    format!("{hi:.2}"),
                    String::new(),
                ]
            }
            Err(message) => [line, String::new(), String::new(), String::new(), message.clone()],
        };
        out.write_record(&record).map_err(io_err)?;
    }
    out.flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush batch CSV: {e}")))?;
    Ok(())
}

pub fn write_batch_csv(path: &Path, tool: Tool, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create batch CSV '{}': {e}", path.display()),
        )
    })?;
    write_batch(file, tool, outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CarPrediction, LoanClass, LoanPrediction};

    const CAR_CSV: &str = "\u{feff}Name,fuel,transmission,owner,engine,max_power,mileage,seats,km_driven,age,seller_type\n\
        Honda,Petrol,Manual,First Owner,1200,90,18.5,5,40000,4,Dealer\n\
        Honda,Petrol,Manual,First Owner,,90,18.5,5,40000,4,Dealer\n";

    #[test]
    fn reads_rows_and_normalizes_headers() {
        let input = read_batch(CAR_CSV.as_bytes(), Tool::Car).unwrap();
        assert_eq!(input.rows_read, 2);
        assert_eq!(input.rows.len(), 2);
        assert_eq!(input.rows[0].line, 2);
        assert_eq!(input.rows[0].form.text("name"), "Honda");
        assert_eq!(input.rows[1].form.text("engine"), "");
    }

    #[test]
    fn missing_columns_fail_up_front() {
        let err = read_batch("name,fuel\nHonda,Petrol\n".as_bytes(), Tool::Car).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.to_string().contains("engine"));
    }

    #[test]
    fn failed_rows_keep_their_line() {
        let outcomes = vec![
            BatchOutcome {
                line: 2,
                result: Ok(PredictionResult::Regression(CarPrediction {
                    predicted_price: 100_000.0,
                })),
            },
            BatchOutcome {
                line: 3,
                result: Err("Invalid input: Engine Capacity (CC) is required".to_string()),
            },
        ];
        let mut buf = Vec::new();
        write_batch(&mut buf, Tool::Car, &outcomes).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "line,predicted_price,price_low,price_high,error");
        assert_eq!(lines[1], "2,100000.00,90000.00,110000.00,");
        assert!(lines[2].starts_with("3,,,,"));
    }

    #[test]
    fn loan_class_uses_machine_labels() {
        let outcomes = vec![BatchOutcome {
            line: 2,
            result: Ok(PredictionResult::Classification(LoanPrediction {
                predicted_class: LoanClass::NotApproved,
                probability_approved: 0.25,
                probability_default: 0.75,
            })),
        }];
        let mut buf = Vec::new();
        write_batch(&mut buf, Tool::Loan, &outcomes).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1), Some("2,not_approved,0.250000,0.750000,"));
    }
}
