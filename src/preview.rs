//! Client-side preview of a picked file.
//!
//! Delimited text (CSV/TSV) is parsed here; workbooks (xlsx, xls, ods) are
//! read through calamine, first sheet only. Anything else comes back as
//! [`PreviewError::Unsupported`], which callers treat exactly like a malformed
//! file: the preview is skipped and the upload goes ahead.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};

use crate::model::{Cell, TableSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("file is not valid UTF-8")]
    Encoding,
    #[error("file has no rows")]
    Empty,
    #[error("unterminated quote starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("could not read file: {0}")]
    Io(String),
    #[error("could not read workbook: {0}")]
    Workbook(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewFormat {
    Delimited(char),
    Workbook,
}

/// How `path` is previewed, chosen by extension.
pub fn format_for(path: &Path) -> Result<PreviewFormat, PreviewError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(PreviewFormat::Delimited(',')),
        "tsv" | "tab" => Ok(PreviewFormat::Delimited('\t')),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(PreviewFormat::Workbook),
        other => Err(PreviewError::Unsupported(if other.is_empty() {
            "(no extension)".to_string()
        } else {
            other.to_string()
        })),
    }
}

/// Parse `bytes` as a picked file at `path` into a local preview snapshot.
pub fn parse_preview(path: &Path, bytes: &[u8]) -> Result<TableSnapshot, PreviewError> {
    match format_for(path)? {
        PreviewFormat::Delimited(delimiter) => parse_text(bytes, delimiter),
        PreviewFormat::Workbook => parse_workbook(bytes),
    }
}

fn parse_text(bytes: &[u8], delimiter: char) -> Result<TableSnapshot, PreviewError> {
    let text = std::str::from_utf8(bytes).map_err(|_| PreviewError::Encoding)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = parse_delimited(text, delimiter)?
        .into_iter()
        .filter(|r| r.iter().any(|f| !f.trim().is_empty()));

    let headers = records.next().ok_or(PreviewError::Empty)?;
    let headers = headers.into_iter().map(Cell::Text).collect();
    let rows = records
        .map(|r| r.into_iter().map(field_to_cell).collect())
        .collect();
    Ok(TableSnapshot::local_preview(headers, rows))
}

/// First sheet of a workbook: row one is the header, the rest are data rows.
fn parse_workbook(bytes: &[u8]) -> Result<TableSnapshot, PreviewError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PreviewError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(PreviewError::Empty)?
        .map_err(|e| PreviewError::Workbook(e.to_string()))?;

    let mut records = range
        .rows()
        .filter(|r| r.iter().any(|d| !matches!(d, Data::Empty)));

    let headers = records.next().ok_or(PreviewError::Empty)?;
    let headers = headers.iter().map(|d| Cell::Text(d.to_string())).collect();
    let rows = records
        .map(|r| r.iter().map(data_to_cell).collect())
        .collect();
    Ok(TableSnapshot::local_preview(headers, rows))
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(n) if n.is_finite() => Cell::Number(*n),
        other => Cell::Text(other.to_string()),
    }
}

fn field_to_cell(field: String) -> Cell {
    let trimmed = field.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && !trimmed.is_empty() => Cell::Number(n),
        _ => Cell::Text(field),
    }
}

fn parse_delimited(input: &str, delimiter: char) -> Result<Vec<Vec<String>>, PreviewError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                c => field.push(c),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            c => field.push(c),
        }
    }

    if in_quotes {
        return Err(PreviewError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
#[path = "tests/preview_tests.rs"]
mod tests;
