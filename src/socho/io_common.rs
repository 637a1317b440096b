use log::debug;
use snafu::prelude::*;

use crate::socho::*;

/// A table of mayors x voters, as read from a file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    pub path: String,
    pub voters: Vec<String>,
    pub labels: Vec<String>,
    // cells[r][v]: the cell of mayor r for voter v.
    pub cells: Vec<Vec<String>>,
    // The line of each row in the file, starting at 1.
    pub linenos: Vec<usize>,
}

impl Table {
    /// Assembles the table from the raw rows of a file, the header first.
    ///
    /// The rows are labelled when they have one more field than the header,
    /// or when the first field of the header is empty. Otherwise the mayors
    /// are labelled by their position, starting at 0. Empty rows are skipped.
    pub fn from_rows(path: &str, rows: Vec<Vec<String>>) -> SochoResult<Table> {
        let mut iter = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| (idx + 1, row))
            .filter(|(_, row)| row.iter().any(|c| !c.is_empty()));
        let (_, header) = iter.next().context(EmptyTableSnafu { path })?;
        let data: Vec<(usize, Vec<String>)> = iter.collect();
        let first_len = match data.first() {
            Some((_, row)) => row.len(),
            None => return EmptyTableSnafu { path }.fail(),
        };

        let header_has_corner = header.first().map(|c| c.is_empty()).unwrap_or(false);
        let (labelled, voters) = if first_len == header.len() + 1 {
            (true, header)
        } else if header_has_corner && first_len == header.len() {
            (true, header[1..].to_vec())
        } else {
            (false, header)
        };
        let expected = voters.len() + labelled as usize;
        debug!(
            "from_rows: {}: {} voters, labelled rows: {}",
            path,
            voters.len(),
            labelled
        );

        let mut labels: Vec<String> = Vec::with_capacity(data.len());
        let mut cells: Vec<Vec<String>> = Vec::with_capacity(data.len());
        let mut linenos: Vec<usize> = Vec::with_capacity(data.len());
        for (idx, (lineno, mut row)) in data.into_iter().enumerate() {
            if row.len() != expected {
                return RowLengthSnafu {
                    path,
                    lineno,
                    expected,
                    found: row.len(),
                }
                .fail();
            }
            if labelled {
                labels.push(row.remove(0));
            } else {
                labels.push(idx.to_string());
            }
            cells.push(row);
            linenos.push(lineno);
        }
        Ok(Table {
            path: path.to_string(),
            voters,
            labels,
            cells,
            linenos,
        })
    }

    /// The numeric cells, transposed: one row per voter, one score per mayor.
    pub fn scores_by_voter(&self) -> SochoResult<Vec<Vec<f64>>> {
        let mut res: Vec<Vec<f64>> = vec![Vec::with_capacity(self.cells.len()); self.voters.len()];
        for (row, lineno) in self.cells.iter().zip(self.linenos.iter()) {
            for (v, cell) in row.iter().enumerate() {
                let score = cell
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .context(ParsingScoreSnafu {
                        path: self.path.as_str(),
                        lineno: *lineno,
                        content: cell.as_str(),
                    })?;
                res[v].push(score);
            }
        }
        Ok(res)
    }

    /// The cells, transposed: one row per voter.
    pub fn cells_by_voter(&self) -> Vec<Vec<String>> {
        let mut res: Vec<Vec<String>> =
            vec![Vec::with_capacity(self.cells.len()); self.voters.len()];
        for row in self.cells.iter() {
            for (v, cell) in row.iter().enumerate() {
                res[v].push(cell.trim().to_string());
            }
        }
        res
    }
}
