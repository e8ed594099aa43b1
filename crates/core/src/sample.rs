//! Synthetic fixture data for manual testing.

use crate::backup::write_csv;
use crate::domain::NewRecord;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Header used by fixture files; matches legacy backups.
pub const SAMPLE_HEADER: [&str; 4] = ["fournisseur", "piece", "price", "timestamp"];

#[derive(Debug, Clone, Copy)]
pub struct CatalogueEntry {
    pub supplier: &'static str,
    pub part: &'static str,
    pub base_price: f64,
}

const fn entry(supplier: &'static str, part: &'static str, base_price: f64) -> CatalogueEntry {
    CatalogueEntry {
        supplier,
        part,
        base_price,
    }
}

pub const DEFAULT_CATALOGUE: [CatalogueEntry; 5] = [
    entry("Maurice", "Langue", 40.0),
    entry("Maurice", "Abats", 30.0),
    entry("Maurice", "Tournedos", 20.0),
    entry("Samuel", "Langue", 40.0),
    entry("Marrcel", "Langue", 40.0),
];

#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub until: DateTime<Utc>,
    pub step: Duration,
    pub seed: u64,
}

impl SampleOptions {
    pub fn until(until: DateTime<Utc>) -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2012, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(until),
            until,
            step: Duration::weeks(1),
            seed: 0,
        }
    }
}

/// One observation per catalogue entry per step, from `start` up to `until`.
pub fn generate_sample(
    catalogue: &[CatalogueEntry],
    opts: &SampleOptions,
) -> anyhow::Result<Vec<NewRecord>> {
    anyhow::ensure!(
        opts.step > Duration::zero(),
        "sample step must be positive (got {})",
        opts.step
    );

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut out = Vec::new();
    for entry in catalogue {
        let mut timestamp = opts.start;
        while timestamp < opts.until {
            out.push(NewRecord {
                supplier: entry.supplier.to_string(),
                part: entry.part.to_string(),
                price: sample_price(&mut rng, entry.base_price),
                timestamp,
            });
            timestamp += opts.step;
        }
    }

    tracing::debug!(rows = out.len(), seed = opts.seed, "generated sample records");
    Ok(out)
}

/// Base price plus up to ~32.75 of noise, truncated to cents.
fn sample_price<R: Rng>(rng: &mut R, base_price: f64) -> f64 {
    let noise = f64::from(rng.random_range(0..1000u32)) / 30.5;
    ((noise + base_price) * 100.0).floor() / 100.0
}

/// Fixture CSV: legacy header, epoch-second timestamps, newline after every row.
pub fn sample_csv(records: &[NewRecord]) -> anyhow::Result<String> {
    let rows = records.iter().map(|r| {
        [
            r.supplier.clone(),
            r.part.clone(),
            r.price.to_string(),
            r.timestamp.timestamp().to_string(),
        ]
    });
    write_csv(SAMPLE_HEADER, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::import_csv;

    fn four_weeks(seed: u64) -> SampleOptions {
        SampleOptions {
            seed,
            ..SampleOptions::until(Utc.with_ymd_and_hms(2012, 1, 29, 0, 0, 0).unwrap())
        }
    }

    #[test]
    fn one_row_per_entry_per_week() {
        let records = generate_sample(&DEFAULT_CATALOGUE, &four_weeks(1)).unwrap();
        assert_eq!(records.len(), 5 * 4);

        let first_week: Vec<_> = records.iter().take(4).map(|r| r.timestamp).collect();
        assert_eq!(
            first_week,
            [
                Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2012, 1, 8, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2012, 1, 15, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2012, 1, 22, 0, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn prices_stay_near_base_with_cent_precision() {
        let records = generate_sample(&DEFAULT_CATALOGUE, &four_weeks(7)).unwrap();
        for (record, entry) in records.iter().zip(DEFAULT_CATALOGUE.iter().flat_map(|e| [e; 4])) {
            assert!(record.price >= entry.base_price, "{record:?}");
            assert!(record.price < entry.base_price + 33.0, "{record:?}");
            let cents = record.price * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6, "{record:?}");
        }
    }

    #[test]
    fn same_seed_same_data() {
        let a = generate_sample(&DEFAULT_CATALOGUE, &four_weeks(42)).unwrap();
        let b = generate_sample(&DEFAULT_CATALOGUE, &four_weeks(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_positive_step() {
        let opts = SampleOptions {
            step: Duration::zero(),
            ..four_weeks(1)
        };
        assert!(generate_sample(&DEFAULT_CATALOGUE, &opts).is_err());
    }

    #[test]
    fn fixture_csv_imports_back() {
        let records = generate_sample(&DEFAULT_CATALOGUE, &four_weeks(3)).unwrap();
        let csv = sample_csv(&records).unwrap();
        assert!(csv.starts_with("fournisseur,piece,price,timestamp\nMaurice,Langue,"));
        assert!(csv.ends_with('\n'));

        let back = import_csv(&csv).unwrap();
        assert_eq!(back, records);
    }
}
