use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{filtered_indices, FilterSelection};
use super::model::SalesDataset;

// ---------------------------------------------------------------------------
// KPI summary
// ---------------------------------------------------------------------------

/// Headline figures for the filtered table.  All fields are total over an
/// empty input: sums collapse to zero, means to `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    /// Sum of `Total`, truncated to whole dollars.
    pub total_sales: i64,
    /// Mean rating rounded to one decimal, `None` when no rows matched.
    pub average_rating: Option<f64>,
    /// One star per point of the rounded average rating.
    pub star_rating: String,
    /// Mean of `Total` rounded to cents, `None` when no rows matched.
    pub avg_sale_per_transaction: Option<f64>,
}

/// Compute the KPI summary over the given row subset.
pub fn kpis(dataset: &SalesDataset, indices: &[usize]) -> Kpis {
    let sum_total: f64 = indices
        .iter()
        .map(|&i| dataset.transactions[i].total)
        .sum();
    let total_sales = sum_total.trunc() as i64;

    if indices.is_empty() {
        return Kpis {
            total_sales,
            average_rating: None,
            star_rating: String::new(),
            avg_sale_per_transaction: None,
        };
    }

    let n = indices.len() as f64;
    let sum_rating: f64 = indices
        .iter()
        .map(|&i| dataset.transactions[i].rating)
        .sum();
    let average_rating = round_to(sum_rating / n, 1);

    Kpis {
        total_sales,
        average_rating: Some(average_rating),
        star_rating: "★".repeat(average_rating.round().max(0.0) as usize),
        avg_sale_per_transaction: Some(round_to(sum_total / n, 2)),
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

/// Total sales of one product line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLineSales {
    pub product_line: String,
    pub total: f64,
}

/// Group the row subset by product line and sum `Total`, sorted ascending by
/// total (ties keep product-line name order).  Drives the horizontal bars.
pub fn sales_by_product_line(dataset: &SalesDataset, indices: &[usize]) -> Vec<ProductLineSales> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for &i in indices {
        let tx = &dataset.transactions[i];
        *sums.entry(tx.product_line.as_str()).or_insert(0.0) += tx.total;
    }
    let mut groups: Vec<ProductLineSales> = sums
        .into_iter()
        .map(|(product_line, total)| ProductLineSales {
            product_line: product_line.to_string(),
            total,
        })
        .collect();
    groups.sort_by(|a, b| a.total.total_cmp(&b.total));
    groups
}

/// Total sales of one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySales {
    pub hour: u8,
    pub total: f64,
}

/// Group the row subset by hour (0–23) and sum `Total`, ordered by hour.
/// Hours with no matching transactions are omitted rather than zero-filled,
/// matching the group-by semantics of the source data.  Drives the vertical
/// bars.
pub fn sales_by_hour(dataset: &SalesDataset, indices: &[usize]) -> Vec<HourlySales> {
    let mut sums: BTreeMap<u8, f64> = BTreeMap::new();
    for &i in indices {
        let tx = &dataset.transactions[i];
        *sums.entry(tx.hour).or_insert(0.0) += tx.total;
    }
    sums.into_iter()
        .map(|(hour, total)| HourlySales { hour, total })
        .collect()
}

// ---------------------------------------------------------------------------
// DashboardView – the pure view model
// ---------------------------------------------------------------------------

/// Everything the presentation layer renders, derived from the table and the
/// current selection in one pure pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub matched_rows: usize,
    pub kpis: Kpis,
    pub by_product_line: Vec<ProductLineSales>,
    pub by_hour: Vec<HourlySales>,
}

/// Filter then aggregate.  Re-run in full on every interaction; there is no
/// intermediate state to invalidate.
pub fn build_view(dataset: &SalesDataset, selection: &FilterSelection) -> DashboardView {
    let indices = filtered_indices(dataset, selection);
    DashboardView {
        matched_rows: indices.len(),
        kpis: kpis(dataset, &indices),
        by_product_line: sales_by_product_line(dataset, &indices),
        by_hour: sales_by_hour(dataset, &indices),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveTime;

    use super::*;
    use crate::data::model::Transaction;

    fn tx(line: &str, total: f64, rating: f64, time: &str) -> Transaction {
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap();
        Transaction {
            city: "Yangon".to_string(),
            customer_type: "Member".to_string(),
            gender: "Female".to_string(),
            product_line: line.to_string(),
            total,
            rating,
            time,
            hour: chrono::Timelike::hour(&time) as u8,
            extra: BTreeMap::new(),
        }
    }

    fn all_indices(ds: &SalesDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn single_member_row_matches_the_reference_figures() {
        let ds = SalesDataset::from_transactions(vec![tx(
            "Health and beauty",
            100.0,
            8.0,
            "13:23:00",
        )]);
        let selection = FilterSelection::all(&ds);
        let view = build_view(&ds, &selection);

        assert_eq!(view.matched_rows, 1);
        assert_eq!(view.kpis.total_sales, 100);
        assert_eq!(view.kpis.average_rating, Some(8.0));
        assert_eq!(view.kpis.star_rating.chars().count(), 8);
        assert_eq!(view.kpis.avg_sale_per_transaction, Some(100.0));
        assert_eq!(view.by_hour, [HourlySales { hour: 13, total: 100.0 }]);
    }

    #[test]
    fn total_sales_is_truncated_not_rounded() {
        let ds = SalesDataset::from_transactions(vec![
            tx("Health and beauty", 10.7, 7.0, "10:00:00"),
            tx("Health and beauty", 10.6, 7.0, "11:00:00"),
        ]);
        let k = kpis(&ds, &all_indices(&ds));
        assert_eq!(k.total_sales, 21);
    }

    #[test]
    fn averages_are_rounded_to_their_display_precision() {
        let ds = SalesDataset::from_transactions(vec![
            tx("Health and beauty", 10.0, 6.0, "10:00:00"),
            tx("Health and beauty", 11.0, 7.0, "11:00:00"),
            tx("Health and beauty", 13.0, 7.0, "12:00:00"),
        ]);
        let k = kpis(&ds, &all_indices(&ds));
        // mean rating 6.666… → 6.7; mean sale 11.333… → 11.33
        assert_eq!(k.average_rating, Some(6.7));
        assert_eq!(k.avg_sale_per_transaction, Some(11.33));
        assert_eq!(k.star_rating.chars().count(), 7);
    }

    #[test]
    fn empty_subset_degrades_to_safe_defaults() {
        let ds = SalesDataset::from_transactions(vec![tx(
            "Health and beauty",
            100.0,
            8.0,
            "13:23:00",
        )]);
        let k = kpis(&ds, &[]);
        assert_eq!(k.total_sales, 0);
        assert_eq!(k.average_rating, None);
        assert_eq!(k.avg_sale_per_transaction, None);
        assert_eq!(k.star_rating, "");
        assert!(sales_by_product_line(&ds, &[]).is_empty());
        assert!(sales_by_hour(&ds, &[]).is_empty());
    }

    #[test]
    fn product_lines_are_sorted_ascending_by_total() {
        let ds = SalesDataset::from_transactions(vec![
            tx("Sports and travel", 50.0, 7.0, "10:00:00"),
            tx("Health and beauty", 20.0, 7.0, "11:00:00"),
            tx("Electronic accessories", 35.0, 7.0, "12:00:00"),
            tx("Health and beauty", 10.0, 7.0, "13:00:00"),
        ]);
        let groups = sales_by_product_line(&ds, &all_indices(&ds));
        let names: Vec<&str> = groups.iter().map(|g| g.product_line.as_str()).collect();
        assert_eq!(
            names,
            ["Health and beauty", "Electronic accessories", "Sports and travel"]
        );
        assert_eq!(groups[0].total, 30.0);
    }

    #[test]
    fn group_totals_cross_check_against_the_flat_sum() {
        let ds = SalesDataset::from_transactions(vec![
            tx("Sports and travel", 50.25, 7.0, "10:00:00"),
            tx("Health and beauty", 20.5, 7.0, "10:30:00"),
            tx("Electronic accessories", 35.125, 7.0, "12:00:00"),
            tx("Health and beauty", 10.0, 7.0, "19:00:00"),
        ]);
        let indices = all_indices(&ds);
        let flat: f64 = indices.iter().map(|&i| ds.transactions[i].total).sum();

        let by_line: f64 = sales_by_product_line(&ds, &indices)
            .iter()
            .map(|g| g.total)
            .sum();
        let by_hour: f64 = sales_by_hour(&ds, &indices).iter().map(|g| g.total).sum();

        assert!((flat - by_line).abs() < 1e-9);
        assert!((flat - by_hour).abs() < 1e-9);
    }

    #[test]
    fn absent_hours_are_omitted() {
        let ds = SalesDataset::from_transactions(vec![
            tx("Health and beauty", 10.0, 7.0, "10:15:00"),
            tx("Health and beauty", 12.0, 7.0, "10:45:00"),
            tx("Health and beauty", 20.0, 7.0, "19:00:00"),
        ]);
        let hours = sales_by_hour(&ds, &all_indices(&ds));
        assert_eq!(
            hours,
            [
                HourlySales { hour: 10, total: 22.0 },
                HourlySales { hour: 19, total: 20.0 },
            ]
        );
    }

    #[test]
    fn view_reflects_the_selection() {
        let ds = SalesDataset::from_transactions(vec![
            tx("Health and beauty", 100.0, 8.0, "13:23:00"),
            {
                let mut other = tx("Sports and travel", 40.0, 4.0, "15:00:00");
                other.city = "Mandalay".to_string();
                other
            },
        ]);
        let mut selection = FilterSelection::all(&ds);
        selection.cities = ["Yangon".to_string()].into();

        let view = build_view(&ds, &selection);
        assert_eq!(view.matched_rows, 1);
        assert_eq!(view.kpis.total_sales, 100);
        assert_eq!(view.by_product_line.len(), 1);
        assert_eq!(view.by_product_line[0].product_line, "Health and beauty");
    }
}
