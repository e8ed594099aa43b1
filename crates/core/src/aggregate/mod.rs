//! Read-only views derived from a record snapshot.
//!
//! Every function borrows the snapshot and builds fresh values; nothing here mutates
//! the records or a previously returned result.

pub mod select;
pub mod series;
pub mod summary;

pub use select::{distinct_values, resolve_choice, SelectOption};
pub use series::{series_for_part, supplier_key, PriceSeries, SeriesPoint};
pub use summary::{part_overview, supplier_summary_for_part, PartOverview, SupplierSummary};

use std::collections::HashSet;

/// Deduplicates while keeping the first occurrence of each value.
pub(crate) fn first_occurrences<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}
