//! Output frame for the merged table.
//!
//! Identifiers become Int64, numerics Float64 and categoricals their display
//! labels. The derived cigarette count is Int64.

use ess_model::{CellValue, ColumnKind};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use crate::error::Result;
use crate::merge::{ColumnOrigin, DerivedColumn, MergedColumn, MergedTable};

/// Build a typed DataFrame with one row per unit, in table order.
pub fn to_dataframe(table: &MergedTable) -> Result<DataFrame> {
    let columns: Vec<Column> = table
        .columns
        .iter()
        .map(|column| build_column(table, column))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn build_column(table: &MergedTable, column: &MergedColumn) -> Column {
    let name = column.name();
    let cells = table.units.iter().map(|unit| table.cell(unit, column));
    let series = match (column.origin, column.meta.kind) {
        (ColumnOrigin::Derived(DerivedColumn::CigarettesPerDay), _) => {
            let values: Vec<Option<i64>> =
                cells.map(|cell| cell.as_number().map(|v| v as i64)).collect();
            Series::new(name.into(), values)
        }
        (_, ColumnKind::Identifier) => {
            let values: Vec<Option<i64>> = cells.map(|cell| cell.as_id()).collect();
            Series::new(name.into(), values)
        }
        (_, ColumnKind::Numeric) => {
            let values: Vec<Option<f64>> = cells.map(|cell| cell.as_number()).collect();
            Series::new(name.into(), values)
        }
        (_, ColumnKind::Categorical) => {
            let values: Vec<Option<String>> = cells
                .map(|cell| match cell {
                    CellValue::Category(category) => Some(category.label),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
    };
    series.into_column()
}
