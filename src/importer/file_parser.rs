// ==========================================
// Catalog import - source file parsing
// ==========================================
// Stage 0 of the pipeline: a byte buffer in, ordered raw rows out.
// Supported: spreadsheet (.xlsx/.xls via calamine) and delimited text
// (.csv via csv). A malformed source is the only batch-fatal condition.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// One source row: column name -> cell value, both trimmed. Column names
/// are never assumed fixed; the field mapper owns the alias handling.
pub type RawRow = HashMap<String, String>;

// ==========================================
// SourceFormat
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    Delimited,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "xlsx" | "xls" => Ok(SourceFormat::Spreadsheet),
            "csv" => Ok(SourceFormat::Delimited),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Parser interface (stage 0).
pub trait SourceParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>>;
}

/// Parse a source buffer with the parser matching its format.
pub fn parse_source(bytes: &[u8], format: SourceFormat) -> ImportResult<Vec<RawRow>> {
    match format {
        SourceFormat::Spreadsheet => SpreadsheetParser.parse(bytes),
        SourceFormat::Delimited => DelimitedParser.parse(bytes),
    }
}

fn rows_from_cells<I, S>(headers: &[String], cells: I) -> Option<RawRow>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    let mut row_map = RawRow::new();
    for (col_idx, value) in cells.into_iter().enumerate() {
        if let Some(header) = headers.get(col_idx) {
            row_map.insert(header.clone(), value.to_string().trim().to_string());
        }
    }
    // Fully blank rows are skipped.
    if row_map.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row_map)
    }
}

// ==========================================
// Spreadsheet parser (calamine)
// ==========================================
pub struct SpreadsheetParser;

impl SpreadsheetParser {
    /// Pick the worksheet holding the data: a sheet whose name mentions the
    /// product template wins, otherwise the first sheet.
    fn pick_sheet(sheet_names: &[String]) -> Option<String> {
        sheet_names
            .iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("plantilla") || lower.contains("productos")
            })
            .or_else(|| sheet_names.first())
            .cloned()
    }
}

impl SourceParser for SpreadsheetParser {
    fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let cursor = Cursor::new(bytes);
        let mut workbook: Xlsx<_> = Xlsx::new(cursor)
            .map_err(|e| ImportError::SpreadsheetParse(e.to_string()))?;

        let sheet_name = Self::pick_sheet(&workbook.sheet_names())
            .ok_or_else(|| ImportError::SpreadsheetParse("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::SpreadsheetParse(e.to_string()))?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::SpreadsheetParse("sheet has no header row".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        Ok(rows
            .filter_map(|data_row| rows_from_cells(&headers, data_row.iter()))
            .collect())
    }
}

// ==========================================
// Delimited-text parser (csv)
// ==========================================
pub struct DelimitedParser;

impl SourceParser for DelimitedParser {
    fn parse(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // tolerate ragged rows
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_matches('"').to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row) = rows_from_cells(&headers, record.iter()) {
                records.push(row);
            }
        }
        Ok(records)
    }
}

/// Read a file and parse it, detecting the format from the extension.
pub fn parse_file<P: AsRef<Path>>(path: P) -> ImportResult<Vec<RawRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    parse_source(&bytes, format)
}
