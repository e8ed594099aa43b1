use partprice_core::aggregate::{PartOverview, PriceSeries, SelectOption, SupplierSummary};
use partprice_core::domain::Record;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Table,
    Json,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn message(output: Output, text: String, value: Value) -> anyhow::Result<()> {
    match output {
        Output::Json => print_json(&value),
        Output::Table => {
            println!("{text}");
            Ok(())
        }
    }
}

pub fn records(records: &[Record], output: Output) -> anyhow::Result<()> {
    if output == Output::Json {
        return print_json(records);
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                r.supplier.clone(),
                r.part.clone(),
                price(r.price),
                r.id.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&["timestamp", "supplier", "part", "price", "id"], &rows)
    );
    Ok(())
}

pub fn summary(part: &str, suppliers: &[SupplierSummary], output: Output) -> anyhow::Result<()> {
    if output == Output::Json {
        return print_json(suppliers);
    }
    print_summary_table(part, suppliers);
    Ok(())
}

pub fn overview(parts: &[PartOverview], output: Output) -> anyhow::Result<()> {
    if output == Output::Json {
        return print_json(parts);
    }
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        print_summary_table(&part.part, &part.suppliers);
    }
    Ok(())
}

fn print_summary_table(part: &str, suppliers: &[SupplierSummary]) {
    let rows: Vec<Vec<String>> = suppliers
        .iter()
        .map(|s| {
            vec![
                s.supplier.clone(),
                price(s.latest_price),
                s.latest_date.clone(),
                price(s.mean_price),
                s.observations.to_string(),
            ]
        })
        .collect();
    println!("{part}");
    println!(
        "{}",
        table(&["supplier", "latest", "date", "mean", "count"], &rows)
    );
}

pub fn options(options: &[SelectOption], output: Output) -> anyhow::Result<()> {
    if output == Output::Json {
        return print_json(options);
    }
    let rows: Vec<Vec<String>> = options
        .iter()
        .map(|o| vec![o.index.to_string(), o.value.clone()])
        .collect();
    println!("{}", table(&["index", "value"], &rows));
    Ok(())
}

pub fn series(series: &PriceSeries, output: Output) -> anyhow::Result<()> {
    if output == Output::Json {
        return print_json(series);
    }

    let mut headers = vec!["date"];
    headers.extend(series.labels.iter().map(String::as_str));
    let rows: Vec<Vec<String>> = series
        .series
        .iter()
        .map(|point| {
            std::iter::once(point.date.clone())
                .chain(series.ykeys.iter().map(|key| {
                    point
                        .prices
                        .get(key)
                        .map_or_else(|| "-".to_string(), |p| price(*p))
                }))
                .collect()
        })
        .collect();
    println!("{}", table(&headers, &rows));
    Ok(())
}

fn price(value: f64) -> String {
    format!("{value:.2}")
}

/// Left-aligned text, right-aligned numbers, two spaces between columns.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    let header_line = format_row(headers.iter().copied(), &widths);
    let mut lines = vec![header_line.clone(), "-".repeat(header_line.chars().count())];
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| {
            if looks_numeric(cell) {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn looks_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}
