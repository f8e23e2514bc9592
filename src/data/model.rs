use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveTime;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a passthrough column
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell for the columns the dashboard carries
/// but does not compute on (invoice id, branch, payment, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction – one row of the sales sheet
// ---------------------------------------------------------------------------

/// A single retail transaction (one row of the source sheet).
#[derive(Debug, Clone)]
pub struct Transaction {
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub product_line: String,
    /// Transaction amount in US dollars.
    pub total: f64,
    /// Customer satisfaction score.
    pub rating: f64,
    /// Wall-clock time of the sale.
    pub time: NaiveTime,
    /// Hour of day (0–23), extracted from `time` at load.
    pub hour: u8,
    /// Remaining sheet columns: column name → value.
    pub extra: BTreeMap<String, CellValue>,
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed distinct-value indexes.
///
/// Built once by the loader and never mutated; filtering produces index
/// subsets into `transactions`.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// All transactions (rows), in sheet order.
    pub transactions: Vec<Transaction>,
    /// Distinct cities observed in the data.
    pub cities: BTreeSet<String>,
    /// Distinct customer types (Member / Normal in the reference data).
    pub customer_types: BTreeSet<String>,
    /// Distinct genders.
    pub genders: BTreeSet<String>,
    /// Distinct product lines.
    pub product_lines: BTreeSet<String>,
    /// Ordered names of the passthrough columns (excludes the typed fields).
    pub extra_columns: Vec<String>,
}

impl SalesDataset {
    /// Build the distinct-value indexes from the loaded rows.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut cities = BTreeSet::new();
        let mut customer_types = BTreeSet::new();
        let mut genders = BTreeSet::new();
        let mut product_lines = BTreeSet::new();
        let mut extra_columns_set: BTreeSet<String> = BTreeSet::new();

        for tx in &transactions {
            cities.insert(tx.city.clone());
            customer_types.insert(tx.customer_type.clone());
            genders.insert(tx.gender.clone());
            product_lines.insert(tx.product_line.clone());
            for col in tx.extra.keys() {
                extra_columns_set.insert(col.clone());
            }
        }

        SalesDataset {
            transactions,
            cities,
            customer_types,
            genders,
            product_lines,
            extra_columns: extra_columns_set.into_iter().collect(),
        }
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Total number of columns (typed fields plus passthrough columns).
    pub fn column_count(&self) -> usize {
        7 + self.extra_columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(city: &str, customer_type: &str, gender: &str, line: &str) -> Transaction {
        Transaction {
            city: city.to_string(),
            customer_type: customer_type.to_string(),
            gender: gender.to_string(),
            product_line: line.to_string(),
            total: 10.0,
            rating: 7.0,
            time: NaiveTime::from_hms_opt(13, 23, 0).unwrap(),
            hour: 13,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn distinct_indexes_are_built_and_sorted() {
        let mut a = tx("Yangon", "Member", "Female", "Health and beauty");
        a.extra
            .insert("Payment".to_string(), CellValue::String("Cash".into()));
        let b = tx("Mandalay", "Normal", "Male", "Sports and travel");
        let c = tx("Yangon", "Normal", "Female", "Health and beauty");

        let ds = SalesDataset::from_transactions(vec![a, b, c]);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.cities.iter().collect::<Vec<_>>(), ["Mandalay", "Yangon"]);
        assert_eq!(
            ds.customer_types.iter().collect::<Vec<_>>(),
            ["Member", "Normal"]
        );
        assert_eq!(ds.genders.iter().collect::<Vec<_>>(), ["Female", "Male"]);
        assert_eq!(ds.extra_columns, ["Payment"]);
        assert_eq!(ds.column_count(), 8);
    }

    #[test]
    fn empty_dataset_is_well_formed() {
        let ds = SalesDataset::from_transactions(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.cities.is_empty());
        assert_eq!(ds.column_count(), 7);
    }
}
