use crate::domain::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A stored supplier price observation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    pub id: Uuid,
    pub supplier: String,
    pub part: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// A record before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub supplier: String,
    pub part: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl NewRecord {
    /// Validates raw form input. Supplier and part are trimmed; the price must parse
    /// as a finite number.
    pub fn parse(
        supplier: &str,
        part: &str,
        price: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            supplier: non_empty("supplier", supplier)?,
            part: non_empty("part", part)?,
            price: parse_price(price)?,
            timestamp,
        })
    }

    pub fn into_record(self, id: Uuid) -> Record {
        Record {
            id,
            supplier: self.supplier,
            part: self.part,
            price: self.price,
            timestamp: self.timestamp,
        }
    }
}

pub fn parse_price(input: &str) -> Result<f64, ValidationError> {
    match input.trim().parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(ValidationError::InvalidPrice {
            input: input.to_string(),
        }),
    }
}

pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(value.to_string())
}

/// Text fields the pickers can offer distinct values for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Supplier,
    Part,
}

impl RecordField {
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Supplier => "supplier",
            RecordField::Part => "part",
        }
    }

    pub fn value_of(self, record: &Record) -> &str {
        match self {
            RecordField::Supplier => &record.supplier,
            RecordField::Part => &record.part,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordField {
    type Err = ValidationError;

    // Legacy exports use the French column names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supplier" | "fournisseur" => Ok(RecordField::Supplier),
            "part" | "piece" => Ok(RecordField::Part),
            _ => Err(ValidationError::UnknownField {
                name: s.to_string(),
            }),
        }
    }
}
