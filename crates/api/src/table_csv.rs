// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV export and import for custom tables.
//!
//! Export writes one header line of column names followed by one line per
//! row. Import is two-phase: [`preview_table_csv`] parses and validates
//! every line without writing anything, and [`import_table_csv`] creates
//! the rows only when every line is valid.

use csv::StringRecord;
use serde::Serialize;
use serde_json::{Number, Value};
use staffdesk_domain::{
    Capability, ColumnDefinition, ColumnType, DatabaseRow, DatabaseTable, Record, RecordId,
    validate_row_values,
};
use staffdesk_persistence::EntityStore;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::auth::CurrentUser;
use crate::custom_databases::{authorized_table, rows_of};
use crate::error::ApiError;

/// Status of a CSV line after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvRowStatus {
    Valid,
    Invalid,
}

/// One CSV line after parsing against the table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRowResult {
    /// 1-based line number, not counting the header.
    pub row_number: usize,
    /// The values that parsed, keyed by column name.
    pub values: BTreeMap<String, Value>,
    pub status: CsvRowStatus,
    pub errors: Vec<String>,
}

/// Result of validating a CSV document against a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvPreviewResult {
    pub table_id: RecordId,
    pub rows: Vec<CsvRowResult>,
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// Result of a completed CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CsvImportResult {
    pub table_id: RecordId,
    pub imported: usize,
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Renders a stored value as a CSV cell.
fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Exports a table as CSV text.
///
/// # Errors
///
/// Returns `Forbidden` without `view` on the owning database.
pub fn export_table_csv<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
) -> Result<String, ApiError> {
    let (_, table) = authorized_table(store, user, table_id, Capability::View)?;
    let rows: Vec<Record<DatabaseRow>> = rows_of(store, table_id)?;

    let write_error = |e: csv::Error| ApiError::Internal {
        message: format!("Failed to write CSV: {e}"),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(write_error)?;

    for row in &rows {
        writer
            .write_record(
                table
                    .columns
                    .iter()
                    .map(|c| render_cell(row.values.get(&c.name))),
            )
            .map_err(write_error)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("Failed to flush CSV: {e}"),
    })?;

    debug!(table_id, rows = rows.len(), "Exported custom table");

    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV output is not UTF-8: {e}"),
    })
}

/// Maps each column to the position of its header.
///
/// Every header must name a column and every required column must have a
/// header. Header matching ignores case and surrounding whitespace.
fn map_headers<'t>(
    headers: &StringRecord,
    table: &'t DatabaseTable,
) -> Result<Vec<(&'t ColumnDefinition, usize)>, ApiError> {
    let positions: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let unknown: Vec<&str> = headers
        .iter()
        .filter(|header| {
            let normalized: String = normalize_header(header);
            !table
                .columns
                .iter()
                .any(|c| normalize_header(&c.name) == normalized)
        })
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::invalid_input(
            "csv",
            format!("Unknown columns: {}", unknown.join(", ")),
        ));
    }

    let missing: Vec<&str> = table
        .columns
        .iter()
        .filter(|c| c.required && !positions.contains_key(&normalize_header(&c.name)))
        .map(|c| c.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::invalid_input(
            "csv",
            format!("Missing required columns: {}", missing.join(", ")),
        ));
    }

    Ok(table
        .columns
        .iter()
        .filter_map(|c| {
            positions
                .get(&normalize_header(&c.name))
                .map(|&idx| (c, idx))
        })
        .collect())
}

/// Converts one cell to the JSON value its column stores.
fn parse_cell(column: &ColumnDefinition, raw: &str) -> Result<Value, String> {
    match column.column_type {
        ColumnType::Text => Ok(Value::String(raw.to_string())),
        ColumnType::Number => raw.parse::<i64>().map(Value::from).or_else(|_| {
            raw.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("{}: '{raw}' is not a number", column.name))
        }),
        ColumnType::Boolean => match raw.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(format!("{}: '{raw}' is not true or false", column.name)),
        },
        ColumnType::Date => {
            let value: Value = Value::String(raw.to_string());
            if column.column_type.accepts(&value) {
                Ok(value)
            } else {
                Err(format!("{}: '{raw}' is not a YYYY-MM-DD date", column.name))
            }
        }
    }
}

fn parse_line(
    row_number: usize,
    record: &StringRecord,
    columns: &[(&ColumnDefinition, usize)],
    table_id: RecordId,
    table: &DatabaseTable,
) -> CsvRowResult {
    let mut values: BTreeMap<String, Value> = BTreeMap::new();
    let mut errors: Vec<String> = Vec::new();

    for (column, idx) in columns {
        let raw: &str = record.get(*idx).map_or("", str::trim);
        if raw.is_empty() {
            continue;
        }
        match parse_cell(column, raw) {
            Ok(value) => {
                values.insert(column.name.clone(), value);
            }
            Err(message) => errors.push(message),
        }
    }

    if errors.is_empty() {
        let candidate: DatabaseRow = DatabaseRow {
            table_id,
            values: values.clone(),
        };
        if let Err(e) = validate_row_values(&candidate, table) {
            errors.push(e.to_string());
        }
    }

    CsvRowResult {
        row_number,
        values,
        status: if errors.is_empty() {
            CsvRowStatus::Valid
        } else {
            CsvRowStatus::Invalid
        },
        errors,
    }
}

fn preview(
    table_id: RecordId,
    table: &DatabaseTable,
    csv_content: &str,
) -> Result<CsvPreviewResult, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::invalid_input("csv", format!("Failed to read headers: {e}")))?
        .clone();
    let columns: Vec<(&ColumnDefinition, usize)> = map_headers(&headers, table)?;

    let mut rows: Vec<CsvRowResult> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record: StringRecord = record.map_err(|e| {
            ApiError::invalid_input("csv", format!("Failed to parse line {}: {e}", idx + 1))
        })?;
        rows.push(parse_line(idx + 1, &record, &columns, table_id, table));
    }

    let valid_count: usize = rows
        .iter()
        .filter(|r| r.status == CsvRowStatus::Valid)
        .count();

    Ok(CsvPreviewResult {
        table_id,
        total_rows: rows.len(),
        invalid_count: rows.len() - valid_count,
        valid_count,
        rows,
    })
}

/// Parses and validates CSV text against a table without writing.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the owning database and
/// `InvalidInput` if the headers do not match the table or the text is
/// not CSV. Problems with individual lines are reported per line.
pub fn preview_table_csv<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
    csv_content: &str,
) -> Result<CsvPreviewResult, ApiError> {
    let (_, table) = authorized_table(store, user, table_id, Capability::Edit)?;
    preview(table_id, &table, csv_content)
}

/// Creates one row per CSV line.
///
/// Nothing is written unless every line is valid.
///
/// # Errors
///
/// Returns `ValidationFailure` if any line is invalid, plus the errors of
/// [`preview_table_csv`].
pub fn import_table_csv<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
    csv_content: &str,
) -> Result<CsvImportResult, ApiError> {
    let (_, table) = authorized_table(store, user, table_id, Capability::Edit)?;
    let result: CsvPreviewResult = preview(table_id, &table, csv_content)?;

    if result.invalid_count > 0 {
        let first: String = result
            .rows
            .iter()
            .find(|r| r.status == CsvRowStatus::Invalid)
            .map(|r| format!("line {}: {}", r.row_number, r.errors.join("; ")))
            .unwrap_or_default();
        return Err(ApiError::ValidationFailure {
            message: format!(
                "{} of {} lines are invalid, nothing was imported ({first})",
                result.invalid_count, result.total_rows
            ),
        });
    }

    for row in result.rows {
        store.create(&DatabaseRow {
            table_id,
            values: row.values,
        })?;
    }

    info!(table_id, imported = result.total_rows, "Imported CSV into custom table");

    Ok(CsvImportResult {
        table_id,
        imported: result.total_rows,
    })
}
