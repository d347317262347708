//! Column statistics and exact JSON number rendering.

use rust_decimal::{Decimal, MathematicalOps};
use serde_json::{Map, Number, Value};

use crate::timestamp;

const NDIGITS: u32 = 3;

/// Summary statistics for one numeric column.
///
/// Variance and standard deviation use population semantics. Every figure
/// is rounded to three decimal places; `range` is taken from the rounded
/// endpoints so the three values stay mutually consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub units: &'static str,
    pub min: Decimal,
    pub max: Decimal,
    pub range: Decimal,
    pub mean: Decimal,
    pub stddev: Decimal,
    pub variance: Decimal,
}

impl Statistics {
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("units".to_string(), Value::String(self.units.to_string()));
        map.insert("min".to_string(), decimal_number(self.min));
        map.insert("max".to_string(), decimal_number(self.max));
        map.insert("range".to_string(), decimal_number(self.range));
        map.insert("mean".to_string(), decimal_number(self.mean));
        map.insert("stddev".to_string(), decimal_number(self.stddev));
        map.insert("variance".to_string(), decimal_number(self.variance));
        map
    }
}

/// Compute statistics over `values`; `None` for an empty column.
pub fn statistics(units: &'static str, values: &[Decimal]) -> Option<Statistics> {
    let (first, rest) = values.split_first()?;
    let mut min = *first;
    let mut max = *first;
    for value in rest.iter().copied() {
        min = min.min(value);
        max = max.max(value);
    }
    let count = Decimal::from(values.len());
    let mean = values.iter().copied().sum::<Decimal>() / count;
    let variance = values
        .iter()
        .copied()
        .map(|value| (value - mean) * (value - mean))
        .sum::<Decimal>()
        / count;
    let stddev = variance.sqrt().unwrap_or_default();
    let min = round(min);
    let max = round(max);
    Some(Statistics {
        units,
        min,
        max,
        range: max - min,
        mean: round(mean),
        stddev: round(stddev),
        variance: round(variance),
    })
}

fn round(value: Decimal) -> Decimal {
    value.round_dp(NDIGITS).normalize()
}

/// Render a decimal as an exact JSON number.
pub fn decimal_number(value: Decimal) -> Value {
    let text = value.normalize().to_string();
    match serde_json::from_str::<Number>(&text) {
        Ok(number) => Value::Number(number),
        Err(_) => Value::String(text),
    }
}

/// Render a window-start timestamp for analysis output: an ISO 8601 string
/// when the value denotes a recent absolute time, a raw decimal otherwise.
pub fn timestamp_value(value: Decimal) -> Value {
    match timestamp::to_iso_recent(value) {
        Some(iso) => Value::String(iso),
        None => decimal_number(value),
    }
}
