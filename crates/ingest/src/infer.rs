//! Per-column type inference.
//!
//! A column is typed once, from every cell in it, so all documents produced
//! by one upload agree on the type of each field.

use document::Value;

/// Inferred storage type of one CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell present and an integer.
    Int,
    /// Every present cell numeric; missing cells become NaN.
    Float,
    /// Every present cell a boolean literal; missing cells become NaN.
    Bool,
    /// Anything else; missing cells become NaN.
    Text,
}

/// Infer the kind of a column from its cells; `None` marks a missing cell.
pub fn infer_column<'a, I>(cells: I) -> ColumnKind
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut any_missing = false;
    let mut all_int = true;
    let mut all_float = true;
    let mut all_bool = true;

    for cell in cells {
        let Some(cell) = cell else {
            any_missing = true;
            continue;
        };
        let trimmed = cell.trim();
        if all_int && trimmed.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && trimmed.parse::<f64>().is_err() {
            all_float = false;
        }
        if all_bool && parse_bool(trimmed).is_none() {
            all_bool = false;
        }
        if !all_float && !all_bool {
            return ColumnKind::Text;
        }
    }

    match (all_int, all_float, all_bool, any_missing) {
        (true, _, _, false) => ColumnKind::Int,
        (_, true, _, _) => ColumnKind::Float,
        (_, _, true, _) => ColumnKind::Bool,
        _ => ColumnKind::Text,
    }
}

/// Convert one cell to a value of the column's kind.
///
/// Cells were checked by [`infer_column`], so the parse fallbacks only run
/// for missing cells.
pub fn convert_cell(kind: ColumnKind, cell: Option<&str>) -> Value {
    let Some(cell) = cell else {
        return Value::Float(f64::NAN);
    };
    let trimmed = cell.trim();
    match kind {
        ColumnKind::Int => trimmed
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Float(f64::NAN)),
        ColumnKind::Float => Value::Float(trimmed.parse::<f64>().unwrap_or(f64::NAN)),
        ColumnKind::Bool => parse_bool(trimmed)
            .map(Value::Bool)
            .unwrap_or(Value::Float(f64::NAN)),
        ColumnKind::Text => Value::String(cell.to_string()),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}
