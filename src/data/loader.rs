use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use chrono::{NaiveTime, Timelike};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, SalesDataset, Transaction};

/// Worksheet the sales table lives on.
const SHEET_NAME: &str = "Sales";
/// Banner rows above the header row.
const SKIP_ROWS: u32 = 3;
/// Absolute sheet columns B..R, 0-based inclusive.
const FIRST_COL: u32 = 1;
const LAST_COL: u32 = 17;
/// Row cap, applied to every source format.
const MAX_ROWS: usize = 1000;

const COL_CITY: &str = "City";
const COL_CUSTOMER_TYPE: &str = "Customer_type";
const COL_GENDER: &str = "Gender";
const COL_PRODUCT_LINE: &str = "Product line";
const COL_TOTAL: &str = "Total";
const COL_RATING: &str = "Rating";
const COL_TIME: &str = "Time";

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Fatal load failures: bad source, bad shape, or a malformed row.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("workbook has no sheet named {0:?}")]
    SheetNotFound(String),
    #[error("required column {0:?} not found")]
    MissingColumn(&'static str),
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSON root is not an array of records")]
    JsonRoot,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A malformed cell. The whole load fails rather than dropping the row, so
/// bad data is never silently lost.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("row {row}: {column} is empty")]
    Missing { row: usize, column: &'static str },
    #[error("row {row}: {column} value {value:?} is not text")]
    Text {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: {column} value {value:?} is not a number")]
    Number {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: Time value {value:?} does not match HH:MM:SS")]
    Time { row: usize, value: String },
    #[error("row {row}: expected a JSON object")]
    Object { row: usize },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` – workbook with a `Sales` sheet, columns B:R,
///   three banner rows above the header (the reference export layout)
/// * `.csv`  – header row with the same column names
/// * `.json` – `[{ "City": ..., "Total": ..., ...}, ...]`
pub fn load_file(path: &Path) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => load_excel(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

fn load_excel(path: &Path) -> Result<SalesDataset, LoadError> {
    let mut workbook = open_workbook_auto(path)?;

    if !workbook.sheet_names().iter().any(|s| s == SHEET_NAME) {
        return Err(LoadError::SheetNotFound(SHEET_NAME.to_string()));
    }
    let range = workbook.worksheet_range(SHEET_NAME)?;

    dataset_from_sheet(&range)
}

/// Parse the fixed window of a worksheet: header on the row after the banner,
/// data rows below it, columns B..R only.
fn dataset_from_sheet(range: &Range<Data>) -> Result<SalesDataset, LoadError> {
    // Header: (column name, absolute sheet column), in sheet order.
    let mut headers: Vec<(String, u32)> = Vec::new();
    for col in FIRST_COL..=LAST_COL {
        if let Some(cell) = range.get_value((SKIP_ROWS, col)) {
            if let Some(name) = cell.as_string() {
                let name = name.trim().to_string();
                if !name.is_empty() {
                    headers.push((name, col));
                }
            }
        }
    }

    let column = |name: &'static str| -> Result<u32, LoadError> {
        headers
            .iter()
            .find(|(h, _)| h.as_str() == name)
            .map(|(_, col)| *col)
            .ok_or(LoadError::MissingColumn(name))
    };

    let city_col = column(COL_CITY)?;
    let customer_type_col = column(COL_CUSTOMER_TYPE)?;
    let gender_col = column(COL_GENDER)?;
    let product_line_col = column(COL_PRODUCT_LINE)?;
    let total_col = column(COL_TOTAL)?;
    let rating_col = column(COL_RATING)?;
    let time_col = column(COL_TIME)?;
    let typed_cols = [
        city_col,
        customer_type_col,
        gender_col,
        product_line_col,
        total_col,
        rating_col,
        time_col,
    ];

    let end_row = range.end().map(|(row, _)| row).unwrap_or(0);
    let mut transactions = Vec::new();

    for row in (SKIP_ROWS + 1)..=end_row {
        if transactions.len() == MAX_ROWS {
            break;
        }
        let cell = |col: u32| range.get_value((row, col));
        if headers
            .iter()
            .all(|&(_, col)| matches!(cell(col), None | Some(Data::Empty)))
        {
            continue;
        }
        // 1-based sheet row for error messages.
        let row_no = (row + 1) as usize;

        let time = time_cell(cell(time_col), row_no)?;
        let mut extra = BTreeMap::new();
        for (name, col) in &headers {
            if !typed_cols.contains(col) {
                extra.insert(name.clone(), cell_value(cell(*col)));
            }
        }

        transactions.push(Transaction {
            city: text_cell(cell(city_col), row_no, COL_CITY)?,
            customer_type: text_cell(cell(customer_type_col), row_no, COL_CUSTOMER_TYPE)?,
            gender: text_cell(cell(gender_col), row_no, COL_GENDER)?,
            product_line: text_cell(cell(product_line_col), row_no, COL_PRODUCT_LINE)?,
            total: number_cell(cell(total_col), row_no, COL_TOTAL)?,
            rating: number_cell(cell(rating_col), row_no, COL_RATING)?,
            time,
            hour: hour_of(time),
            extra,
        });
    }

    Ok(SalesDataset::from_transactions(transactions))
}

// -- Excel cell helpers --

fn text_cell(cell: Option<&Data>, row: usize, column: &'static str) -> Result<String, ParseError> {
    match cell {
        None | Some(Data::Empty) => Err(ParseError::Missing { row, column }),
        Some(Data::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Err(ParseError::Missing { row, column })
            } else {
                Ok(s.to_string())
            }
        }
        Some(other) => Err(ParseError::Text {
            row,
            column,
            value: other.to_string(),
        }),
    }
}

fn number_cell(cell: Option<&Data>, row: usize, column: &'static str) -> Result<f64, ParseError> {
    match cell {
        None | Some(Data::Empty) => Err(ParseError::Missing { row, column }),
        Some(data) => data.as_f64().ok_or_else(|| ParseError::Number {
            row,
            column,
            value: data.to_string(),
        }),
    }
}

/// Accept either a text cell matching HH:MM:SS or a native Excel time cell.
fn time_cell(cell: Option<&Data>, row: usize) -> Result<NaiveTime, ParseError> {
    let data = match cell {
        None | Some(Data::Empty) => {
            return Err(ParseError::Missing {
                row,
                column: COL_TIME,
            });
        }
        Some(data) => data,
    };
    if let Some(s) = data.get_string() {
        return parse_time_of_day(s, row);
    }
    data.as_time().ok_or_else(|| ParseError::Time {
        row,
        value: data.to_string(),
    })
}

fn cell_value(cell: Option<&Data>) -> CellValue {
    match cell {
        None | Some(Data::Empty) => CellValue::Null,
        Some(Data::String(s)) => CellValue::String(s.clone()),
        Some(Data::Int(i)) => CellValue::Integer(*i),
        Some(Data::Float(f)) => CellValue::Float(*f),
        Some(Data::Bool(b)) => CellValue::Bool(*b),
        Some(Data::DateTime(dt)) => match dt.as_datetime() {
            Some(d) => CellValue::Date(d.to_string()),
            None => CellValue::Null,
        },
        Some(Data::DateTimeIso(s)) => CellValue::Date(s.clone()),
        Some(Data::DurationIso(s)) => CellValue::String(s.clone()),
        Some(Data::Error(e)) => CellValue::String(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Shared parsing
// ---------------------------------------------------------------------------

/// Strict HH:MM:SS parse, matching the format the source sheet uses.
fn parse_time_of_day(s: &str, row: usize) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S").map_err(|_| ParseError::Time {
        row,
        value: s.to_string(),
    })
}

fn hour_of(time: NaiveTime) -> u8 {
    time.hour() as u8
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the same column names as the workbook sheet.
fn load_csv(path: &Path) -> Result<SalesDataset, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &'static str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };

    let city_idx = column(COL_CITY)?;
    let customer_type_idx = column(COL_CUSTOMER_TYPE)?;
    let gender_idx = column(COL_GENDER)?;
    let product_line_idx = column(COL_PRODUCT_LINE)?;
    let total_idx = column(COL_TOTAL)?;
    let rating_idx = column(COL_RATING)?;
    let time_idx = column(COL_TIME)?;
    let typed_idx = [
        city_idx,
        customer_type_idx,
        gender_idx,
        product_line_idx,
        total_idx,
        rating_idx,
        time_idx,
    ];

    let mut transactions = Vec::new();

    for (i, result) in reader.records().enumerate() {
        if transactions.len() == MAX_ROWS {
            break;
        }
        let record = result?;
        // 1-based line number, counting the header line.
        let row = i + 2;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let text = |idx: usize, column: &'static str| -> Result<String, ParseError> {
            let s = field(idx);
            if s.is_empty() {
                Err(ParseError::Missing { row, column })
            } else {
                Ok(s.to_string())
            }
        };
        let number = |idx: usize, column: &'static str| -> Result<f64, ParseError> {
            let s = field(idx);
            s.parse::<f64>().map_err(|_| ParseError::Number {
                row,
                column,
                value: s.to_string(),
            })
        };

        let time = parse_time_of_day(field(time_idx), row)?;
        let mut extra = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            if !typed_idx.contains(&idx) && idx < headers.len() {
                extra.insert(headers[idx].clone(), guess_cell_value(value.trim()));
            }
        }

        transactions.push(Transaction {
            city: text(city_idx, COL_CITY)?,
            customer_type: text(customer_type_idx, COL_CUSTOMER_TYPE)?,
            gender: text(gender_idx, COL_GENDER)?,
            product_line: text(product_line_idx, COL_PRODUCT_LINE)?,
            total: number(total_idx, COL_TOTAL)?,
            rating: number(rating_idx, COL_RATING)?,
            time,
            hour: hour_of(time),
            extra,
        });
    }

    Ok(SalesDataset::from_transactions(transactions))
}

fn guess_cell_value(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`).
fn load_json(path: &Path) -> Result<SalesDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let records = root.as_array().ok_or(LoadError::JsonRoot)?;

    let mut transactions = Vec::with_capacity(records.len().min(MAX_ROWS));

    for (row, record) in records.iter().enumerate() {
        if transactions.len() == MAX_ROWS {
            break;
        }
        let obj = record.as_object().ok_or(ParseError::Object { row })?;

        let text = |column: &'static str| -> Result<String, LoadError> {
            match obj.get(column) {
                None => Err(LoadError::MissingColumn(column)),
                Some(JsonValue::String(s)) if !s.trim().is_empty() => {
                    Ok(s.trim().to_string())
                }
                Some(JsonValue::Null) | Some(JsonValue::String(_)) => {
                    Err(ParseError::Missing { row, column }.into())
                }
                Some(other) => Err(ParseError::Text {
                    row,
                    column,
                    value: other.to_string(),
                }
                .into()),
            }
        };
        let number = |column: &'static str| -> Result<f64, LoadError> {
            let val = obj.get(column).ok_or(LoadError::MissingColumn(column))?;
            val.as_f64().ok_or_else(|| {
                ParseError::Number {
                    row,
                    column,
                    value: val.to_string(),
                }
                .into()
            })
        };

        let time = parse_time_of_day(&text(COL_TIME)?, row)?;
        let mut extra = BTreeMap::new();
        for (key, val) in obj {
            let is_typed = [
                COL_CITY,
                COL_CUSTOMER_TYPE,
                COL_GENDER,
                COL_PRODUCT_LINE,
                COL_TOTAL,
                COL_RATING,
                COL_TIME,
            ]
            .contains(&key.as_str());
            if !is_typed {
                extra.insert(key.clone(), json_to_cell(val));
            }
        }

        transactions.push(Transaction {
            city: text(COL_CITY)?,
            customer_type: text(COL_CUSTOMER_TYPE)?,
            gender: text(COL_GENDER)?,
            product_line: text(COL_PRODUCT_LINE)?,
            total: number(COL_TOTAL)?,
            rating: number(COL_RATING)?,
            time,
            hour: hour_of(time),
            extra,
        });
    }

    Ok(SalesDataset::from_transactions(transactions))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// DatasetCache – explicit, injectable load cache
// ---------------------------------------------------------------------------

/// Caches loaded tables keyed by canonical source path, so repeated opens of
/// the same file within a process never re-read the source.
///
/// Invalidation policy: explicit only (`invalidate` / `clear`).  The cache
/// never watches the file for changes; a table, once loaded, is immutable and
/// shared by reference for the rest of the process.  Failed loads are not
/// cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<SalesDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<SalesDataset>, LoadError> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(dataset) = self.entries.get(&key) {
            log::debug!("cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_file(path)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop the cached table for one source file.
    pub fn invalidate(&mut self, path: &Path) {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key);
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
