use crate::aggregate::first_occurrences;
use crate::domain::Record;
use crate::time::format::latest_date_label;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One supplier's line in a part's comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierSummary {
    pub supplier: String,
    pub latest_price: f64,
    pub latest_timestamp: DateTime<Utc>,
    /// `DD/MM/YYYY`
    pub latest_date: String,
    pub mean_price: f64,
    pub observations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartOverview {
    pub part: String,
    pub suppliers: Vec<SupplierSummary>,
}

struct SupplierGroup<'a> {
    latest: &'a Record,
    total: f64,
    count: usize,
}

impl SupplierGroup<'_> {
    fn into_summary(self) -> SupplierSummary {
        SupplierSummary {
            supplier: self.latest.supplier.clone(),
            latest_price: self.latest.price,
            latest_timestamp: self.latest.timestamp,
            latest_date: latest_date_label(self.latest.timestamp),
            mean_price: self.total / self.count as f64,
            observations: self.count,
        }
    }
}

/// Latest and mean price per supplier for `part` (exact match).
///
/// Suppliers are listed in order of their most recent observation, newest first.
/// Equal timestamps keep input order, so the first record in the input wins the
/// "latest" slot.
pub fn supplier_summary_for_part(records: &[Record], part: &str) -> Vec<SupplierSummary> {
    let mut selected: Vec<&Record> = records.iter().filter(|r| r.part == part).collect();
    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut groups: Vec<SupplierGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in selected {
        match index.get(record.supplier.as_str()).copied() {
            Some(i) => {
                groups[i].total += record.price;
                groups[i].count += 1;
            }
            None => {
                index.insert(&record.supplier, groups.len());
                groups.push(SupplierGroup {
                    latest: record,
                    total: record.price,
                    count: 1,
                });
            }
        }
    }

    groups.into_iter().map(SupplierGroup::into_summary).collect()
}

/// One comparison table per distinct part, in order of first appearance.
pub fn part_overview(records: &[Record]) -> Vec<PartOverview> {
    first_occurrences(records.iter().map(|r| r.part.as_str()))
        .into_iter()
        .map(|part| PartOverview {
            part: part.to_string(),
            suppliers: supplier_summary_for_part(records, part),
        })
        .collect()
}
