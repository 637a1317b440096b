use std::cmp::Ordering;
use std::fmt::Display;
use std::fs;

use log::{debug, info, warn};
use snafu::prelude::*;
use text_diff::print_diff;

use crate::socho::*;

/// One line of a ranking file: `"label" score`, or `"label"` for the
/// winners of an election rule.
#[derive(PartialEq, Debug, Clone)]
pub struct OutputLine {
    pub label: String,
    pub score: Option<f64>,
}

impl Display for OutputLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.score {
            Some(s) => write!(f, "\"{}\" {}", self.label, format_score(s)),
            None => write!(f, "\"{}\"", self.label),
        }
    }
}

// Integral scores are written without a decimal part.
fn format_score(s: f64) -> String {
    if s.is_finite() && s.fract() == 0.0 && s.abs() < 1e15 {
        format!("{}", s as i64)
    } else {
        format!("{}", s)
    }
}

/// Sorts by decreasing score, then by label.
pub fn sort_lines(lines: &mut [OutputLine]) {
    lines.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
}

fn render(lines: &[OutputLine]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}

pub fn write_output(path: &str, lines: &[OutputLine]) -> SochoResult<()> {
    let contents = render(lines);
    if path == "stdout" {
        print!("{}", contents);
        return Ok(());
    }
    info!("write_output: writing {} lines to {}", lines.len(), path);
    fs::write(path, contents).context(WritingOutputSnafu { path })
}

/// Reads a reference ranking. The lines keep their order in the file.
pub fn read_reference(path: &str) -> SochoResult<Vec<OutputLine>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let mut res: Vec<OutputLine> = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = parse_line(line).context(ParsingReferenceSnafu {
            path,
            lineno: idx + 1,
            content: line,
        })?;
        res.push(parsed);
    }
    debug!("read_reference: {} lines read from {}", res.len(), path);
    Ok(res)
}

// The label is either quoted or runs up to the first space.
fn parse_line(line: &str) -> Option<OutputLine> {
    let (label, rest) = match line.strip_prefix('"') {
        Some(quoted) => {
            let end = quoted.find('"')?;
            (&quoted[..end], &quoted[end + 1..])
        }
        None => match line.split_once(' ') {
            Some((l, r)) => (l, r),
            None => (line, ""),
        },
    };
    let rest = rest.trim();
    let score = if rest.is_empty() {
        None
    } else {
        Some(rest.parse::<f64>().ok()?)
    };
    Some(OutputLine {
        label: label.to_string(),
        score,
    })
}

/// Compares the labels of the computed ranking with the reference, position by
/// position, once the reference is sorted by decreasing score.
pub fn compare_with_reference(path: &str, computed: &[OutputLine]) -> SochoResult<()> {
    println!("Comparing with {}...", path);
    let mut reference = read_reference(path)?;
    // Stable: equal scores keep the order of the file.
    reference.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let total = reference.len();
    let mut errors: usize = 0;
    for (idx, expected) in reference.iter().enumerate() {
        let found = computed
            .get(idx)
            .map(|l| format!("\"{}\"", l.label))
            .unwrap_or_else(|| "(nothing)".to_string());
        let expected_label = format!("\"{}\"", expected.label);
        if found != expected_label {
            warn!("{} should be {} in line {}", found, expected_label, idx + 1);
            errors += 1;
        }
    }
    println!("{} errors of {}.", errors, total);

    if errors > 0 {
        print_diff(render(&reference).as_str(), render(computed).as_str(), "\n");
        return ReferenceMismatchSnafu { errors, total }.fail();
    }
    Ok(())
}
