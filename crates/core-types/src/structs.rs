use crate::enums::Horizon;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A stock ticker. Case and validity are not checked.
pub type Symbol = String;

/// One flat row of named fields, as returned by the market-data service.
pub type Record = Map<String, Value>;

/// A table of flat records keyed by symbol.
///
/// Each symbol appears exactly once. Rows produced by the flattener also carry
/// the symbol as an explicit `symbol` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatTable {
    rows: BTreeMap<Symbol, Record>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row, returning the row previously stored under `symbol`.
    pub fn insert(&mut self, symbol: Symbol, record: Record) -> Option<Record> {
        self.rows.insert(symbol, record)
    }

    pub fn get(&self, symbol: &str) -> Option<&Record> {
        self.rows.get(symbol)
    }

    /// Looks up a single cell. `None` if the row or the field is absent.
    pub fn value(&self, symbol: &str, field: &str) -> Option<&Value> {
        self.rows.get(symbol).and_then(|row| row.get(field))
    }

    /// Reads a cell as a float. Numeric strings are accepted; nulls, other
    /// types and non-finite parses are reported as missing.
    pub fn number(&self, symbol: &str, field: &str) -> Option<f64> {
        match self.value(symbol, field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// The union of all field names across rows, sorted.
    pub fn columns(&self) -> BTreeSet<String> {
        self.rows
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.rows.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Record)> {
        self.rows.iter()
    }
}

impl Extend<(Symbol, Record)> for StatTable {
    fn extend<I: IntoIterator<Item = (Symbol, Record)>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl FromIterator<(Symbol, Record)> for StatTable {
    fn from_iter<I: IntoIterator<Item = (Symbol, Record)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for StatTable {
    type Item = (Symbol, Record);
    type IntoIter = std::collections::btree_map::IntoIter<Symbol, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Percent changes over the four horizons for one symbol, each change's
/// percentile rank among its peers, and the mean of those ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumRecord {
    pub symbol: Symbol,

    #[serde(rename = "month1ChangePercent")]
    pub month1_change_percent: Option<f64>,
    #[serde(rename = "month3ChangePercent")]
    pub month3_change_percent: Option<f64>,
    #[serde(rename = "month6ChangePercent")]
    pub month6_change_percent: Option<f64>,
    #[serde(rename = "year1ChangePercent")]
    pub year1_change_percent: Option<f64>,

    #[serde(rename = "month1ChangePercent_tile")]
    pub month1_percentile: Option<f64>,
    #[serde(rename = "month3ChangePercent_tile")]
    pub month3_percentile: Option<f64>,
    #[serde(rename = "month6ChangePercent_tile")]
    pub month6_percentile: Option<f64>,
    #[serde(rename = "year1ChangePercent_tile")]
    pub year1_percentile: Option<f64>,

    /// Mean of the present percentiles; `None` when every percentile is missing.
    #[serde(rename = "avgPercentile")]
    pub avg_percentile: Option<f64>,
}

impl MomentumRecord {
    /// A record with no data for any horizon.
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            month1_change_percent: None,
            month3_change_percent: None,
            month6_change_percent: None,
            year1_change_percent: None,
            month1_percentile: None,
            month3_percentile: None,
            month6_percentile: None,
            year1_percentile: None,
            avg_percentile: None,
        }
    }

    pub fn change(&self, horizon: Horizon) -> Option<f64> {
        match horizon {
            Horizon::Month1 => self.month1_change_percent,
            Horizon::Month3 => self.month3_change_percent,
            Horizon::Month6 => self.month6_change_percent,
            Horizon::Year1 => self.year1_change_percent,
        }
    }

    pub fn set_change(&mut self, horizon: Horizon, value: Option<f64>) {
        match horizon {
            Horizon::Month1 => self.month1_change_percent = value,
            Horizon::Month3 => self.month3_change_percent = value,
            Horizon::Month6 => self.month6_change_percent = value,
            Horizon::Year1 => self.year1_change_percent = value,
        }
    }

    pub fn percentile(&self, horizon: Horizon) -> Option<f64> {
        match horizon {
            Horizon::Month1 => self.month1_percentile,
            Horizon::Month3 => self.month3_percentile,
            Horizon::Month6 => self.month6_percentile,
            Horizon::Year1 => self.year1_percentile,
        }
    }

    pub fn set_percentile(&mut self, horizon: Horizon, value: Option<f64>) {
        match horizon {
            Horizon::Month1 => self.month1_percentile = value,
            Horizon::Month3 => self.month3_percentile = value,
            Horizon::Month6 => self.month6_percentile = value,
            Horizon::Year1 => self.year1_percentile = value,
        }
    }
}

/// A sector supported by the market-data service, from `GET /stable/ref-data/sectors`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
}
