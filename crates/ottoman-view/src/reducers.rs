//! Built-in aggregate reducers.
//!
//! Pure functions over a list of values. They back the `_count`, `_sum` and
//! `_stats` shorthand reducers and are registered as `count`, `sum`, `min`,
//! `max`, `sumsqr` and `stats` inside scripted reduce functions.

use serde_json::{Map, Value};

use crate::error::ReduceError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    fn add(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => match a.checked_add(b) {
                Some(n) => Numeric::Int(n),
                None => Numeric::Float(a as f64 + b as f64),
            },
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn square(self) -> Numeric {
        match self {
            Numeric::Int(i) => match i.checked_mul(i) {
                Some(n) => Numeric::Int(n),
                None => Numeric::Float((i as f64) * (i as f64)),
            },
            Numeric::Float(f) => Numeric::Float(f * f),
        }
    }

    fn less_than(self, other: Numeric) -> bool {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a < b,
            (a, b) => a.as_f64() < b.as_f64(),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Numeric::Int(i) => Value::from(i),
            Numeric::Float(f) => Value::from(f),
        }
    }
}

fn numeric(values: &[Value]) -> Result<Vec<Numeric>, ReduceError> {
    values
        .iter()
        .enumerate()
        .map(|(position, value)| {
            let Value::Number(n) = value else {
                return Err(ReduceError::NotNumeric { position });
            };
            Ok(match n.as_i64() {
                Some(i) => Numeric::Int(i),
                None => Numeric::Float(n.as_f64().unwrap_or(f64::NAN)),
            })
        })
        .collect()
}

/// The first value no other value beats under `better`.
fn extreme(
    values: &[Value],
    better: fn(Numeric, Numeric) -> bool,
) -> Result<Option<Value>, ReduceError> {
    let nums = numeric(values)?;
    let mut best: Option<usize> = None;
    for (i, n) in nums.iter().enumerate() {
        if best.is_none_or(|b| better(*n, nums[b])) {
            best = Some(i);
        }
    }
    Ok(best.map(|i| values[i].clone()))
}

pub fn count(values: &[Value]) -> Value {
    Value::from(values.len())
}

/// Arithmetic sum; `0` for no values. Integer while every input is an
/// integer and nothing overflows.
pub fn sum(values: &[Value]) -> Result<Value, ReduceError> {
    let total = numeric(values)?
        .into_iter()
        .fold(Numeric::Int(0), Numeric::add);
    Ok(total.into_value())
}

/// Smallest value, or `None` when there are none.
pub fn min(values: &[Value]) -> Result<Option<Value>, ReduceError> {
    extreme(values, Numeric::less_than)
}

/// Largest value, or `None` when there are none.
pub fn max(values: &[Value]) -> Result<Option<Value>, ReduceError> {
    extreme(values, |a, b| b.less_than(a))
}

pub fn sumsqr(values: &[Value]) -> Result<Value, ReduceError> {
    let total = numeric(values)?
        .into_iter()
        .map(Numeric::square)
        .fold(Numeric::Int(0), Numeric::add);
    Ok(total.into_value())
}

/// `{sum, count, min, max, sumsqr}`, the shape of the `_stats` reducer.
pub fn stats(values: &[Value]) -> Result<Value, ReduceError> {
    let mut out = Map::new();
    out.insert("sum".into(), sum(values)?);
    out.insert("count".into(), count(values));
    out.insert("min".into(), min(values)?.unwrap_or_default());
    out.insert("max".into(), max(values)?.unwrap_or_default());
    out.insert("sumsqr".into(), sumsqr(values)?);
    Ok(Value::Object(out))
}

// ── Shorthand reducers ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinReducer {
    Count,
    Sum,
    Stats,
}

impl BuiltinReducer {
    /// Look up a shorthand reducer by its source text, e.g. `"_sum"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "_count" => Some(Self::Count),
            "_sum" => Some(Self::Sum),
            "_stats" => Some(Self::Stats),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "_count",
            Self::Sum => "_sum",
            Self::Stats => "_stats",
        }
    }

    pub fn reduce(self, values: &[Value]) -> Result<Value, ReduceError> {
        match self {
            Self::Count => Ok(count(values)),
            Self::Sum => sum(values),
            Self::Stats => stats(values),
        }
    }
}

// ── Script helpers ────────────────────────────────────────────

pub(crate) type Helper = fn(&[Value]) -> Result<Value, ReduceError>;

fn count_helper(values: &[Value]) -> Result<Value, ReduceError> {
    Ok(count(values))
}

fn min_helper(values: &[Value]) -> Result<Value, ReduceError> {
    Ok(min(values)?.unwrap_or_default())
}

fn max_helper(values: &[Value]) -> Result<Value, ReduceError> {
    Ok(max(values)?.unwrap_or_default())
}

/// Functions visible to scripted reduce code, by global name.
pub(crate) const HELPERS: &[(&str, Helper)] = &[
    ("count", count_helper),
    ("sum", sum),
    ("min", min_helper),
    ("max", max_helper),
    ("sumsqr", sumsqr),
    ("stats", stats),
];
