use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::socho::io_common::Table;
use crate::socho::*;

/// Reads the given worksheet, or the first one of the workbook.
pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> SochoResult<Table> {
    debug!(
        "read_xlsx_table: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let wrange = match worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu { path })?
    .context(OpeningExcelSnafu { path })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let mut cells: Vec<String> = Vec::with_capacity(row.len());
        for cell in row.iter() {
            cells.push(read_cell(cell, path, idx + 1)?);
        }
        rows.push(cells);
    }
    Table::from_rows(path, rows)
}

fn read_cell(cell: &DataType, path: &str, lineno: usize) -> SochoResult<String> {
    match cell {
        DataType::String(s) => Ok(s.trim().to_string()),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => whatever!(
            "{}, line {}: could not understand cell {:?}",
            path,
            lineno,
            cell
        ),
    }
}
