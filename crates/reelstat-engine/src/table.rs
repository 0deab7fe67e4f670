//! Flat string table exchanged with the acquisition actor and the dashboard.
//!
//! Cells are kept as strings so unknown input columns pass through the
//! pipeline byte-for-byte. Reads are all-or-nothing and writes go through a
//! temp file that is renamed over the destination only after a full flush.

use std::io::Write;
use std::path::Path;

use reelstat_core::posts::columns;
use serde_json::{Map, Value};

use crate::error::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table, padding short rows with empty cells and truncating long ones.
    #[must_use]
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of the first column called `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All cells of one column, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownColumn`] if the table has no such column.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, EngineError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| EngineError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    #[must_use]
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Overwrite column `name` in place, or append it if absent.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not have exactly one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        assert_eq!(
            values.len(),
            self.rows.len(),
            "column '{name}' must have one value per row"
        );
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}

/// Parse a numeric cell. Empty, unparsable and non-finite cells are missing.
#[must_use]
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn format_for(path: &Path) -> Result<Format, EngineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(Format::Csv),
        Some("json") => Ok(Format::Json),
        _ => Err(EngineError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Read a whole table from a `.csv` or `.json` file.
///
/// # Errors
///
/// Returns [`EngineError`] if the file cannot be read, is empty, has an
/// unsupported extension, or does not parse.
pub fn read_table(path: &Path) -> Result<Table, EngineError> {
    let shown = path.display().to_string();
    let format = format_for(path)?;

    let bytes = std::fs::read(path).map_err(|source| EngineError::Read {
        path: shown.clone(),
        source,
    })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(EngineError::EmptyInput { path: shown });
    }

    let table = match format {
        Format::Csv => parse_csv(&bytes, &shown)?,
        Format::Json => parse_json(&bytes, &shown)?,
    };

    tracing::debug!(
        path = %shown,
        rows = table.len(),
        columns = table.headers().len(),
        "table loaded"
    );

    Ok(table)
}

fn parse_csv(bytes: &[u8], path: &str) -> Result<Table, EngineError> {
    let csv_err = |source: csv::Error| EngineError::Csv {
        path: path.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(EngineError::EmptyInput {
            path: path.to_string(),
        });
    }

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

fn parse_json(bytes: &[u8], path: &str) -> Result<Table, EngineError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| EngineError::Json {
        path: path.to_string(),
        source,
    })?;

    let Value::Array(items) = value else {
        return Err(EngineError::JsonShape {
            path: path.to_string(),
            reason: "top-level value is not an array".to_string(),
        });
    };

    let mut objects: Vec<Map<String, Value>> = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => objects.push(map),
            other => {
                return Err(EngineError::JsonShape {
                    path: path.to_string(),
                    reason: format!("item {i} is {}, not an object", json_kind(&other)),
                })
            }
        }
    }

    // An empty export carries no keys; give it the raw schema so it still
    // enriches to a header-only table.
    if objects.is_empty() {
        return Ok(Table::new(
            columns::REQUIRED.iter().map(|c| (*c).to_string()).collect(),
        ));
    }

    // Union of keys in first-seen order so sparse items still line up.
    let mut headers: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = Table::new(headers);
    for obj in &objects {
        let row = table
            .headers()
            .iter()
            .map(|h| obj.get(h).map(json_cell).unwrap_or_default())
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested @ (Value::Array(_) | Value::Object(_)) => nested.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Write `table` to `path` atomically.
///
/// The table is serialized into a temp file in the destination directory,
/// synced, and renamed over `path`. If anything fails the temp file is
/// removed on drop and `path` is left as it was.
///
/// # Errors
///
/// Returns [`EngineError`] if the extension is unsupported or any write,
/// sync or rename fails.
pub fn write_table(path: &Path, table: &Table) -> Result<(), EngineError> {
    let shown = path.display().to_string();
    let format = format_for(path)?;

    let write_err = |source: std::io::Error| EngineError::Write {
        path: shown.clone(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;

    match format {
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            let csv_err = |source: csv::Error| EngineError::Csv {
                path: shown.clone(),
                source,
            };
            writer.write_record(table.headers()).map_err(csv_err)?;
            for row in table.rows() {
                writer.write_record(row).map_err(csv_err)?;
            }
            writer.flush().map_err(write_err)?;
        }
        Format::Json => {
            let items: Vec<Value> = table
                .rows()
                .iter()
                .map(|row| {
                    let obj: Map<String, Value> = table
                        .headers()
                        .iter()
                        .zip(row)
                        .map(|(h, cell)| {
                            let v = if cell.is_empty() {
                                Value::Null
                            } else {
                                Value::String(cell.clone())
                            };
                            (h.clone(), v)
                        })
                        .collect();
                    Value::Object(obj)
                })
                .collect();
            serde_json::to_writer_pretty(tmp.as_file_mut(), &items).map_err(|source| {
                EngineError::Json {
                    path: shown.clone(),
                    source,
                }
            })?;
            tmp.as_file_mut().flush().map_err(write_err)?;
        }
    }

    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
