use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use core_types::{Horizon, MomentumRecord, Record, Sector, StatTable};
use serde_json::Value;

const MISSING: &str = "-";

/// Columns shown for each data set when the user asks for neither `--fields` nor `--all`.
pub const STATS_FIELDS: &[&str] = &[
    "companyName",
    "price",
    "marketcap",
    "peRatio",
    "week52high",
    "week52low",
    "month1ChangePercent",
    "year1ChangePercent",
];
pub const ADVANCED_STATS_FIELDS: &[&str] = &[
    "companyName",
    "debtToEquity",
    "profitMargin",
    "priceToBook",
    "priceToSales",
    "revenue",
    "EBITDA",
];
pub const INFO_FIELDS: &[&str] = &[
    "companyName",
    "exchange",
    "industry",
    "sector",
    "country",
    "employees",
];
pub const PEERS_FIELDS: &[&str] = &["peers"];

/// Works out which columns to show, in order, besides the symbol.
///
/// `--all` shows every column present in the table. Otherwise the requested
/// fields are used, or `defaults` when none were requested.
pub fn select_fields(
    table: &StatTable,
    requested: &[String],
    all: bool,
    defaults: &[&str],
) -> Vec<String> {
    let candidates: Vec<String> = if all {
        table.columns().into_iter().collect()
    } else if requested.is_empty() {
        defaults.iter().map(|f| f.to_string()).collect()
    } else {
        requested.iter().map(|f| f.trim().to_string()).collect()
    };

    let mut fields: Vec<String> = Vec::with_capacity(candidates.len());
    for field in candidates {
        if field.is_empty() || field == analyzer::SYMBOL_FIELD || fields.contains(&field) {
            continue;
        }
        fields.push(field);
    }
    fields
}

/// Keeps only `fields` (and the symbol) in every row.
pub fn project(table: &StatTable, fields: &[String]) -> StatTable {
    table
        .iter()
        .map(|(symbol, row)| {
            let mut projected = Record::new();
            projected.insert(
                analyzer::SYMBOL_FIELD.to_string(),
                Value::String(symbol.clone()),
            );
            for field in fields {
                if let Some(value) = row.get(field) {
                    projected.insert(field.clone(), value.clone());
                }
            }
            (symbol.clone(), projected)
        })
        .collect()
}

/// One row per symbol, one column per field. Absent values print as `-`.
pub fn stat_table(table: &StatTable, fields: &[String]) -> Table {
    let mut out = new_table();

    let mut header = vec![Cell::new("Symbol")];
    header.extend(fields.iter().map(Cell::new));
    out.set_header(header);

    for (symbol, row) in table.iter() {
        let mut cells = vec![Cell::new(symbol)];
        cells.extend(fields.iter().map(|field| {
            let value = row.get(field);
            let cell = Cell::new(format_value(value));
            match value {
                Some(Value::Number(_)) => cell.set_alignment(CellAlignment::Right),
                _ => cell,
            }
        }));
        out.add_row(cells);
    }
    out
}

/// The momentum leaderboard: rank, symbol, change and percentile per horizon, average.
pub fn momentum_table(records: &[MomentumRecord]) -> Table {
    let mut out = new_table();

    let mut header = vec![Cell::new("#"), Cell::new("Symbol")];
    for horizon in Horizon::ALL {
        header.push(Cell::new(format!("{} chg", horizon.label())));
        header.push(Cell::new(format!("{} pct", horizon.label())));
    }
    header.push(Cell::new("Avg pct"));
    out.set_header(header);

    for (idx, record) in records.iter().enumerate() {
        let mut cells = vec![Cell::new(idx + 1), Cell::new(&record.symbol)];
        for horizon in Horizon::ALL {
            cells.push(right(format_change(record.change(horizon))));
            cells.push(right(format_percentile(record.percentile(horizon))));
        }
        cells.push(right(format_percentile(record.avg_percentile)));
        out.add_row(cells);
    }
    out
}

pub fn sector_table(sectors: &[Sector]) -> Table {
    let mut out = new_table();
    out.set_header(vec!["Sector"]);
    for sector in sectors {
        out.add_row(vec![sector.name.as_str()]);
    }
    out
}

/// Renders a JSON value for a table cell: strings unquoted, lists joined.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) if items.is_empty() => MISSING.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| format_value(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Percent changes arrive as fractions; `0.0523` prints as `5.23%`.
fn format_change(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn format_percentile(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.3}"))
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}
