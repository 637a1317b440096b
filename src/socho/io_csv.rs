// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::socho::io_common::Table;
use crate::socho::*;

pub fn read_csv_table(path: &str, separator: u8) -> SochoResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(separator)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for line_r in rdr.into_records() {
        let line = line_r.context(CsvLineParseSnafu { path })?;
        debug!("read_csv_table: lineno: {:?} row: {:?}", rows.len() + 1, line);
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    Table::from_rows(path, rows)
}
