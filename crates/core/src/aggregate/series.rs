use crate::domain::Record;
use crate::time::format::bucket_date;
use crate::time::window::in_window;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

// X-axis key of every series point; supplier keys never take this name.
const DATE_KEY: &str = "date";

/// One chart x-position. Serializes flat: `{"date": "2026-01-05", "maurice": 41.2}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    #[serde(flatten)]
    pub prices: BTreeMap<String, f64>,
}

/// Line-chart input. `labels[i]` is the display name for `ykeys[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceSeries {
    pub series: Vec<SeriesPoint>,
    pub ykeys: Vec<String>,
    pub labels: Vec<String>,
}

/// Normalized supplier name: lowercased with every whitespace run removed, not just
/// the first one and not collapsed to a single space, so "Les Halles" and
/// "les  halles" land on the same key.
pub fn supplier_key(supplier: &str) -> String {
    supplier
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Daily price points for `part` over the `range_days` days before `now`.
///
/// Several observations from the same supplier on the same day collapse to the last
/// one in time order. Suppliers whose names differ only by case or whitespace share a
/// key and are drawn as one line, labelled with the first spelling seen. A supplier
/// whose key would be `date` is charted as `date_1` (or the next free `date_<n>`).
pub fn series_for_part(
    records: &[Record],
    part: &str,
    range_days: u32,
    now: DateTime<Utc>,
) -> PriceSeries {
    let mut selected: Vec<&Record> = records
        .iter()
        .filter(|r| r.part == part && in_window(r.timestamp, now, range_days))
        .collect();
    selected.sort_by_key(|r| r.timestamp);

    let taken: HashSet<String> = selected.iter().map(|r| supplier_key(&r.supplier)).collect();
    let date_alias = taken.contains(DATE_KEY).then(|| free_date_alias(&taken));

    let mut out = PriceSeries::default();
    let mut seen_keys = HashSet::new();
    for record in selected {
        let date = bucket_date(record.timestamp);
        let key = match supplier_key(&record.supplier) {
            key if key == DATE_KEY => date_alias.clone().unwrap_or(key),
            key => key,
        };

        // Sorted input keeps each day's records contiguous.
        if out.series.last().map_or(true, |p| p.date != date) {
            out.series.push(SeriesPoint {
                date,
                prices: BTreeMap::new(),
            });
        }
        if let Some(point) = out.series.last_mut() {
            point.prices.insert(key.clone(), record.price);
        }

        if seen_keys.insert(key.clone()) {
            out.ykeys.push(key);
            out.labels.push(record.supplier.clone());
        }
    }

    out
}

fn free_date_alias(taken: &HashSet<String>) -> String {
    (1u64..)
        .map(|n| format!("{DATE_KEY}_{n}"))
        .find(|key| !taken.contains(key))
        .unwrap_or_default()
}
