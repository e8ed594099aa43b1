use crate::aggregate::first_occurrences;
use crate::domain::{Record, RecordField};
use serde::Serialize;

/// A picker entry. `index` is dense (0..n-1) and serves as the selection key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub index: usize,
    pub value: String,
}

pub fn distinct_values(records: &[Record], field: RecordField) -> Vec<SelectOption> {
    first_occurrences(records.iter().map(|r| field.value_of(r)))
        .into_iter()
        .enumerate()
        .map(|(index, value)| SelectOption {
            index,
            value: value.to_string(),
        })
        .collect()
}

/// Turns picker input into a field value: an existing value verbatim, else an option
/// index, else new free text.
pub fn resolve_choice(options: &[SelectOption], input: &str) -> String {
    let input = input.trim();
    if let Some(option) = options.iter().find(|o| o.value == input) {
        return option.value.clone();
    }

    input
        .parse::<usize>()
        .ok()
        .and_then(|index| options.get(index))
        .map(|o| o.value.clone())
        .unwrap_or_else(|| input.to_string())
}
