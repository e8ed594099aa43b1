use crate::render::{self, Output};
use crate::{Args, Command};
use anyhow::Context;
use chrono::Utc;
use partprice_core::aggregate::{self, resolve_choice};
use partprice_core::backup;
use partprice_core::config::Settings;
use partprice_core::domain::{NewRecord, RecordField};
use partprice_core::sample::{self, SampleOptions, DEFAULT_CATALOGUE};
use partprice_core::storage::{JsonFileStorage, RecordStore};
use partprice_core::time::window::resolve_now;
use serde_json::json;
use std::path::Path;

pub fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let now = resolve_now(args.now.as_deref(), Utc::now())?;
    let output = if args.json { Output::Json } else { Output::Table };
    let data_dir = args.data_dir.unwrap_or_else(|| settings.data_dir());
    let namespace = args
        .namespace
        .unwrap_or_else(|| settings.namespace().to_string());
    let open = || open_store(&data_dir, &namespace);

    match args.command {
        Command::Add {
            supplier,
            part,
            price,
        } => {
            let mut store = open()?;
            let suppliers = aggregate::distinct_values(store.records(), RecordField::Supplier);
            let parts = aggregate::distinct_values(store.records(), RecordField::Part);
            let new = NewRecord::parse(
                &resolve_choice(&suppliers, &supplier),
                &resolve_choice(&parts, &part),
                &price,
                now,
            )?;
            let record = store.create(new)?;
            render::records(std::slice::from_ref(&record), output)
        }
        Command::List => {
            let mut store = open()?;
            render::records(store.fetch_all()?, output)
        }
        Command::Summary { part } => {
            let store = open()?;
            let suppliers = aggregate::supplier_summary_for_part(store.records(), &part);
            render::summary(&part, &suppliers, output)
        }
        Command::Overview => {
            let store = open()?;
            render::overview(&aggregate::part_overview(store.records()), output)
        }
        Command::Options { field } => {
            let field = field.parse::<RecordField>()?;
            let store = open()?;
            render::options(&aggregate::distinct_values(store.records(), field), output)
        }
        Command::Series { part, range_days } => {
            let store = open()?;
            let range_days = range_days.unwrap_or_else(|| settings.chart_range_days());
            let series = aggregate::series_for_part(store.records(), &part, range_days, now);
            tracing::debug!(%part, range_days, points = series.series.len(), "built price series");
            render::series(&series, output)
        }
        Command::Export { output: path } => {
            let store = open()?;
            let csv = backup::to_csv(store.records())?;
            match path {
                Some(path) => {
                    write_file(&path, &format!("{csv}\n"))?;
                    tracing::info!(path = %path.display(), rows = store.len(), "exported CSV backup");
                    render::message(
                        output,
                        format!("exported {} records to {}", store.len(), path.display()),
                        json!({ "exported": store.len(), "path": path.display().to_string() }),
                    )
                }
                None => {
                    println!("{csv}");
                    Ok(())
                }
            }
        }
        Command::Import { path } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let incoming = backup::import_csv(&backup::decode_csv_bytes(&bytes))?;
            let mut store = open()?;
            let replaced = store.len();
            let imported = store.replace_all(incoming)?;
            render::message(
                output,
                format!("imported {imported} records (replaced {replaced})"),
                json!({ "imported": imported, "replaced": replaced }),
            )
        }
        Command::Clear => {
            let mut store = open()?;
            let removed = store.destroy_all()?;
            render::message(
                output,
                format!("removed {removed} records"),
                json!({ "removed": removed }),
            )
        }
        Command::Sample {
            output: path,
            seed,
            start,
            import,
        } => {
            let mut opts = SampleOptions::until(now);
            opts.seed = seed;
            if let Some(start) = start.as_deref() {
                opts.start = resolve_now(Some(start), now)?;
            }
            let records = sample::generate_sample(&DEFAULT_CATALOGUE, &opts)?;
            let csv = sample::sample_csv(&records)?;

            match &path {
                Some(path) => write_file(path, &csv)?,
                None if !import => print!("{csv}"),
                None => {}
            }

            if import {
                let count = open()?.replace_all(records)?;
                return render::message(
                    output,
                    format!("loaded {count} sample records"),
                    json!({
                        "imported": count,
                        "path": path.as_ref().map(|p| p.display().to_string()),
                    }),
                );
            }
            Ok(())
        }
    }
}

fn open_store(data_dir: &Path, namespace: &str) -> anyhow::Result<RecordStore<JsonFileStorage>> {
    let storage = JsonFileStorage::open(data_dir)?;
    let mut store = RecordStore::open(storage, namespace)?;
    store.subscribe(|event| tracing::debug!(?event, "record store changed"));
    Ok(store)
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
