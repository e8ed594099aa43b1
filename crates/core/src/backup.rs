//! CSV backup and import.
//!
//! Export writes epoch milliseconds (decimal seconds for the few years around 1970,
//! see [`epoch_field`]); import accepts seconds or milliseconds, so a backup re-imports
//! unchanged and fixtures written with epoch seconds still load.

use crate::domain::record::{non_empty, parse_price};
use crate::domain::{NewRecord, Record, ValidationError};
use crate::time::format::{epoch_field, parse_epoch_field};
use anyhow::Context;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

pub const CSV_HEADER: [&str; 4] = ["supplier", "part", "price", "timestamp"];

/// Serializes the store in order. An empty store still yields the header line.
pub fn to_csv(records: &[Record]) -> anyhow::Result<String> {
    let rows = records.iter().map(|r| {
        [
            r.supplier.clone(),
            r.part.clone(),
            r.price.to_string(),
            epoch_field(r.timestamp),
        ]
    });

    let mut text = write_csv(CSV_HEADER, rows)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Writes a header and rows, each followed by `\n`. Fields are quoted only when needed.
pub(crate) fn write_csv<I>(header: [&str; 4], rows: I) -> anyhow::Result<String>
where
    I: IntoIterator<Item = [String; 4]>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .context("write CSV header failed")?;
    for (idx, row) in rows.into_iter().enumerate() {
        writer
            .write_record(&row)
            .with_context(|| format!("write CSV row {} failed", idx + 1))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush CSV writer failed: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Parses a backup into records ready for [`crate::storage::RecordStore::replace_all`].
///
/// All-or-nothing: the first bad row aborts the import. Blank input yields no records.
pub fn import_csv(text: &str) -> Result<Vec<NewRecord>, ValidationError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header = reader.headers().map_err(|e| malformed_csv(&e))?.clone();
    let columns = ColumnMap::from_header(&header)?;

    let mut out = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| malformed_csv(&e))?;
        let line = row.position().map_or(0, |p| p.line());
        let record = columns
            .parse_row(&row)
            .map_err(|e| ValidationError::MalformedRow {
                line,
                reason: e.to_string(),
            })?;
        out.push(record);
    }

    tracing::debug!(rows = out.len(), "parsed CSV import");
    Ok(out)
}

/// Reads uploaded bytes as UTF-8, falling back to Windows-1252 for spreadsheet
/// exports that are not UTF-8.
pub fn decode_csv_bytes(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            tracing::warn!(
                valid_up_to = err.valid_up_to(),
                "CSV input is not UTF-8; decoding as Windows-1252"
            );
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}

fn malformed_csv(err: &csv::Error) -> ValidationError {
    ValidationError::MalformedRow {
        line: err.position().map_or(0, |p| p.line()),
        reason: err.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Supplier,
    Part,
    Price,
    Timestamp,
}

impl Column {
    // Legacy backups use the French names for supplier and part.
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "supplier" | "fournisseur" => Some(Column::Supplier),
            "part" | "piece" => Some(Column::Part),
            "price" => Some(Column::Price),
            "timestamp" => Some(Column::Timestamp),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Column::Supplier => "supplier",
            Column::Part => "part",
            Column::Price => "price",
            Column::Timestamp => "timestamp",
        }
    }
}

#[derive(Debug)]
struct ColumnMap {
    supplier: usize,
    part: usize,
    price: usize,
    timestamp: usize,
}

impl ColumnMap {
    fn from_header(header: &csv::StringRecord) -> Result<Self, ValidationError> {
        let mut slots: [Option<usize>; 4] = [None; 4];
        for (idx, name) in header.iter().enumerate() {
            let column = Column::parse(name).ok_or_else(|| ValidationError::UnknownColumn {
                column: name.to_string(),
            })?;
            let slot = &mut slots[column as usize];
            if slot.is_some() {
                return Err(ValidationError::DuplicateColumn {
                    column: column.name(),
                });
            }
            *slot = Some(idx);
        }

        let require = |column: Column| {
            slots[column as usize].ok_or(ValidationError::MissingColumn {
                column: column.name(),
            })
        };

        Ok(Self {
            supplier: require(Column::Supplier)?,
            part: require(Column::Part)?,
            price: require(Column::Price)?,
            timestamp: require(Column::Timestamp)?,
        })
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Result<NewRecord, ValidationError> {
        let field = |idx: usize| row.get(idx).unwrap_or("");

        let raw_ts = field(self.timestamp);
        let timestamp =
            parse_epoch_field(raw_ts).ok_or_else(|| ValidationError::InvalidTimestamp {
                input: raw_ts.to_string(),
            })?;

        Ok(NewRecord {
            supplier: non_empty("supplier", field(self.supplier))?,
            part: non_empty("part", field(self.part))?,
            price: parse_price(field(self.price))?,
            timestamp,
        })
    }
}
