use std::collections::BTreeSet;

use super::model::{SalesDataset, Transaction};

// ---------------------------------------------------------------------------
// Filter dimensions: the three categorical columns users can filter on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    City,
    CustomerType,
    Gender,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::City, Dimension::CustomerType, Dimension::Gender];

    /// Widget label.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::City => "City",
            Dimension::CustomerType => "Customer type",
            Dimension::Gender => "Gender",
        }
    }

    /// Distinct values observed in the data for this dimension.
    pub fn distinct(self, dataset: &SalesDataset) -> &BTreeSet<String> {
        match self {
            Dimension::City => &dataset.cities,
            Dimension::CustomerType => &dataset.customer_types,
            Dimension::Gender => &dataset.genders,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSelection: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state.
///
/// A row passes when its value for every dimension is in the corresponding
/// set, so an empty set selects nothing.  "No filter applied" is expressed by
/// selecting all observed distinct values (see [`FilterSelection::all`]) —
/// that is the UI default, mirroring multi-select widgets that start fully
/// checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub cities: BTreeSet<String>,
    pub customer_types: BTreeSet<String>,
    pub genders: BTreeSet<String>,
}

impl FilterSelection {
    /// Select every distinct value of every dimension (no effective filter).
    pub fn all(dataset: &SalesDataset) -> Self {
        FilterSelection {
            cities: dataset.cities.clone(),
            customer_types: dataset.customer_types.clone(),
            genders: dataset.genders.clone(),
        }
    }

    pub fn selected(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::City => &self.cities,
            Dimension::CustomerType => &self.customer_types,
            Dimension::Gender => &self.genders,
        }
    }

    pub fn selected_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::City => &mut self.cities,
            Dimension::CustomerType => &mut self.customer_types,
            Dimension::Gender => &mut self.genders,
        }
    }

    /// Conjunction of the three membership predicates.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.cities.contains(&tx.city)
            && self.customer_types.contains(&tx.customer_type)
            && self.genders.contains(&tx.gender)
    }
}

/// Return indices of transactions passing all three filters, preserving the
/// original row order.  Pure: the dataset is never mutated.
pub fn filtered_indices(dataset: &SalesDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| selection.matches(tx))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveTime;

    use super::*;
    use crate::data::model::Transaction;

    fn tx(city: &str, customer_type: &str, gender: &str) -> Transaction {
        Transaction {
            city: city.to_string(),
            customer_type: customer_type.to_string(),
            gender: gender.to_string(),
            product_line: "Health and beauty".to_string(),
            total: 10.0,
            rating: 7.0,
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            hour: 12,
            extra: BTreeMap::new(),
        }
    }

    fn dataset() -> SalesDataset {
        SalesDataset::from_transactions(vec![
            tx("Yangon", "Member", "Female"),
            tx("Naypyitaw", "Normal", "Male"),
            tx("Mandalay", "Member", "Male"),
            tx("Yangon", "Normal", "Female"),
        ])
    }

    #[test]
    fn every_result_row_passes_all_three_predicates() {
        let ds = dataset();
        let mut selection = FilterSelection::all(&ds);
        selection.cities = ["Yangon".to_string()].into();
        selection.genders = ["Female".to_string()].into();

        let indices = filtered_indices(&ds, &selection);
        assert!(!indices.is_empty());
        for &i in &indices {
            assert!(selection.matches(&ds.transactions[i]));
        }
        assert_eq!(indices, [0, 3]);
    }

    #[test]
    fn all_distinct_values_selected_returns_the_full_table() {
        let ds = dataset();
        let selection = FilterSelection::all(&ds);
        assert_eq!(filtered_indices(&ds, &selection), [0, 1, 2, 3]);
    }

    #[test]
    fn empty_selection_set_yields_no_rows() {
        let ds = dataset();
        let mut selection = FilterSelection::all(&ds);
        selection.customer_types.clear();
        assert!(filtered_indices(&ds, &selection).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = dataset();
        let mut selection = FilterSelection::all(&ds);
        selection.cities = ["Mandalay".to_string(), "Yangon".to_string()].into();

        let once = filtered_indices(&ds, &selection);
        let survivors: Vec<Transaction> = once
            .iter()
            .map(|&i| ds.transactions[i].clone())
            .collect();
        let refiltered = SalesDataset::from_transactions(survivors);
        let twice = filtered_indices(&refiltered, &selection);

        assert_eq!(twice.len(), once.len());
        for (j, &i) in once.iter().enumerate() {
            assert_eq!(refiltered.transactions[j].city, ds.transactions[i].city);
        }
    }

    #[test]
    fn row_order_is_preserved() {
        let ds = dataset();
        let mut selection = FilterSelection::all(&ds);
        selection.genders = ["Male".to_string()].into();
        assert_eq!(filtered_indices(&ds, &selection), [1, 2]);
    }
}
