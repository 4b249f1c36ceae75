//! Dataset access: CSV parsing, TTL caching and column-filtered views.
//!
//! The backing file is a run-off extract; its schema is known but opaque
//! to the rest of the pipeline, which only relies on the client and
//! product columns plus the report projection below.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::info;

use crate::error::{ReportingError, Result};

/// Client-name column. Rows with an empty value here never become
/// matching candidates.
pub const CLIENT_COLUMN: &str = "Empresa";
/// Product column; optional in some extracts.
pub const PRODUCT_COLUMN: &str = "Producto";
/// Section name used in the cache key when none is given.
pub const DEFAULT_SECTION: &str = "DETALLE";
/// Columns projected into report artifacts, in presentation order.
pub const REPORT_COLUMNS: &[&str] = &[
    "Empresa",
    "Fecha Venc.Cuota",
    "Producto",
    "Capital",
    "Capital L/P",
    "Capital Divisa",
    "Fecha Vencimiento",
    "weekmonth",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Number(value) => write!(f, "{}", value),
            Cell::Empty => Ok(()),
        }
    }
}

/// A named-column table. Rows are padded to the column count on insert.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rows whose text cell in `column` equals `value` exactly. A missing
    /// column matches nothing.
    pub fn filter_eq(&self, column: &str, value: &str) -> Table {
        let mut out = Table::new(self.columns.clone());
        if let Some(idx) = self.column_index(column) {
            for row in &self.rows {
                if row.get(idx).and_then(Cell::as_text) == Some(value) {
                    out.rows.push(row.clone());
                }
            }
        }
        out
    }

    /// Projection onto `wanted`, skipping columns the table does not have.
    pub fn project(&self, wanted: &[&str]) -> Table {
        let indices: Vec<usize> = wanted
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table { columns, rows }
    }

    /// Distinct non-empty text values of `column` in first-seen order, or
    /// `None` when the column does not exist.
    pub fn distinct_text(&self, column: &str) -> Option<Vec<String>> {
        let idx = self.column_index(column)?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if let Some(text) = row[idx].as_text() {
                if seen.insert(text.to_string()) {
                    out.push(text.to_string());
                }
            }
        }
        Some(out)
    }

    pub fn from_csv_path(path: &Path) -> Result<Table> {
        if !path.exists() {
            return Err(ReportingError::DataSource(format!(
                "Archivo no encontrado: {}",
                path.display()
            )));
        }
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| ReportingError::DataSource(format!("{}: {}", path.display(), e)))?;
        let columns = reader
            .headers()
            .map_err(|e| ReportingError::DataSource(format!("{}: {}", path.display(), e)))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut table = Table::new(columns);
        for record in reader.records() {
            let record = record
                .map_err(|e| ReportingError::DataSource(format!("{}: {}", path.display(), e)))?;
            table.push_row(record.iter().map(parse_cell).collect());
        }
        Ok(table)
    }
}

fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Cell::Empty
    } else if let Ok(value) = trimmed.parse::<f64>() {
        Cell::Number(value)
    } else {
        Cell::Text(trimmed.to_string())
    }
}

struct CacheEntry {
    loaded_at: Instant,
    table: Arc<Table>,
}

/// TTL cache of parsed tables, keyed by (path, section).
///
/// Concurrent readers share the same `Arc<Table>`. Racing misses may both
/// parse the file; the last insert wins.
pub struct TableCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn get_or_load<F>(&self, key: &str, load: F) -> Result<Arc<Table>>
    where
        F: FnOnce() -> Result<Table>,
    {
        let cached = self
            .entries
            .get(key)
            .and_then(|entry| (entry.loaded_at.elapsed() < self.ttl).then(|| Arc::clone(&entry.table)));
        if let Some(table) = cached {
            return Ok(table);
        }

        let table = Arc::new(load()?);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                loaded_at: Instant::now(),
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }
}

/// Cached, column-filtered views over the backing dataset file.
pub struct DatasetAccessor {
    path: PathBuf,
    section: String,
    cache: Arc<TableCache>,
}

impl DatasetAccessor {
    pub fn new(path: impl Into<PathBuf>, cache: Arc<TableCache>) -> Self {
        Self {
            path: path.into(),
            section: DEFAULT_SECTION.to_string(),
            cache,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    fn cache_key(&self) -> String {
        format!("{}::{}", self.path.display(), self.section)
    }

    pub fn dataset(&self) -> Result<Arc<Table>> {
        self.cache.get_or_load(&self.cache_key(), || {
            info!("Parsing dataset {} ({})", self.path.display(), self.section);
            Table::from_csv_path(&self.path)
        })
    }

    /// All distinct non-empty client names, first-seen order.
    pub fn client_list(&self) -> Result<Vec<String>> {
        let table = self.dataset()?;
        table
            .distinct_text(CLIENT_COLUMN)
            .ok_or_else(|| ReportingError::MissingColumn(CLIENT_COLUMN.to_string()))
    }

    /// Rows matching the given exact filters, projected onto the report
    /// columns. The product filter is a no-op when the column is absent.
    pub fn filtered_rows(&self, client: Option<&str>, product: Option<&str>) -> Result<Table> {
        let table = self.dataset()?;
        let mut view = (*table).clone();
        if let Some(client) = client {
            view = view.filter_eq(CLIENT_COLUMN, client);
        }
        if let Some(product) = product {
            if view.column_index(PRODUCT_COLUMN).is_some() {
                view = view.filter_eq(PRODUCT_COLUMN, product);
            }
        }
        Ok(view.project(REPORT_COLUMNS))
    }
}
