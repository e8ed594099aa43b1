pub mod aggregate;
pub mod backup;
pub mod domain;
pub mod sample;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    pub const DEFAULT_DATA_DIR: &str = ".partprice";
    pub const DEFAULT_NAMESPACE: &str = "part-prices";
    pub const DEFAULT_CHART_RANGE_DAYS: u32 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub data_dir: Option<PathBuf>,
        pub namespace: Option<String>,
        pub chart_range_days: Option<u32>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let chart_range_days = match std::env::var("PARTPRICE_CHART_RANGE_DAYS") {
                Ok(s) => Some(
                    s.trim()
                        .parse::<u32>()
                        .with_context(|| format!("PARTPRICE_CHART_RANGE_DAYS is not a day count: {s}"))?,
                ),
                Err(_) => None,
            };

            Ok(Self {
                data_dir: std::env::var("PARTPRICE_DATA_DIR")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
                namespace: std::env::var("PARTPRICE_NAMESPACE")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                chart_range_days,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn data_dir(&self) -> PathBuf {
            self.data_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
        }

        pub fn namespace(&self) -> &str {
            self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
        }

        pub fn chart_range_days(&self) -> u32 {
            self.chart_range_days.unwrap_or(DEFAULT_CHART_RANGE_DAYS)
        }
    }

}
