/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse source → SalesDataset (cached per path)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<Transaction>, distinct-value indexes
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  membership predicates → row indices
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ aggregate   │  KPIs + grouped sums → DashboardView
///   └────────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
