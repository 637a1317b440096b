mod config_reader;
mod io_common;
mod io_csv;
mod io_output;
mod io_xlsx;

use log::{info, warn};

use snafu::{prelude::*, Snafu};

use social_choice::builder::Builder;
use social_choice::*;

use crate::args::Args;
use crate::socho::config_reader::*;
use crate::socho::io_common::Table;
use crate::socho::io_output::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SochoError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening the CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading the CSV file {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet to read"))]
    EmptyExcel { path: String },
    #[snafu(display("The table {path} has no data"))]
    EmptyTable { path: String },
    #[snafu(display("{path}, line {lineno}: expected {expected} fields but found {found}"))]
    RowLength {
        path: String,
        lineno: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("{path}, line {lineno}: could not read a score from {content:?}"))]
    ParsingScore {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("{path}, line {lineno}: could not parse {content:?}"))]
    ParsingReference {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("{source}"))]
    SocialChoice { source: SocialChoiceError },
    #[snafu(display("{errors} errors of {total} when comparing with the reference"))]
    ReferenceMismatch { errors: usize, total: usize },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SochoResult<T> = Result<T, SochoError>;

/// Reads the tables, applies the social choice function and writes the
/// result. Compares the result with the reference when one is given.
pub fn run(args: &Args) -> SochoResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => SochoConfig::default(),
    };
    let settings = Settings::resolve(args, &config)?;
    info!("run: settings: {:?}", settings);

    let table = read_table(&args.input, &settings)?;
    info!(
        "run: read {} mayors and {} voters from {}",
        table.labels.len(),
        table.voters.len(),
        args.input
    );

    let lines = match (settings.rule, &args.predictions) {
        (Rule::Scoring(ScoringRule::Plurality), Some(predictions_path)) => {
            let predictions = read_table(predictions_path, &settings)?;
            classify_lines(&table, &predictions)?
        }
        (rule, predictions) => {
            if let Some(p) = predictions {
                warn!(
                    "run: ignoring the predictions in {}: they are only used with plurality",
                    p
                );
            }
            let profile = build_profile(&table, &settings)?;
            apply_rule(&profile, rule, &settings, &table.labels)?
        }
    };

    write_output(&settings.output, &lines)?;

    if let Some(reference_path) = &args.compare {
        compare_with_reference(reference_path, &lines)?;
    }
    Ok(())
}

fn read_table(path: &str, settings: &Settings) -> SochoResult<Table> {
    match settings.input_type {
        InputType::Csv => io_csv::read_csv_table(path, settings.separator),
        InputType::Xlsx => {
            io_xlsx::read_xlsx_table(path, settings.excel_worksheet_name.as_deref())
        }
    }
}

fn build_profile(table: &Table, settings: &Settings) -> SochoResult<Profile> {
    let mut builder = Builder::new(&settings.limits)
        .context(SocialChoiceSnafu {})?
        .mayors(&table.labels)
        .context(SocialChoiceSnafu {})?;
    for scores in table.scores_by_voter()? {
        builder.add_scores(&scores).context(SocialChoiceSnafu {})?;
    }
    builder.build().context(SocialChoiceSnafu {})
}

fn apply_rule(
    profile: &Profile,
    rule: Rule,
    settings: &Settings,
    labels: &[String],
) -> SochoResult<Vec<OutputLine>> {
    let label = |m: &MayorId| -> SochoResult<String> {
        match labels.get(m.0 as usize) {
            Some(l) => Ok(l.clone()),
            None => whatever!("no label for mayor {}", m),
        }
    };
    match rule {
        Rule::Scoring(r) => {
            let ranking = profile.rank(r).context(SocialChoiceSnafu {})?;
            let mut lines: Vec<OutputLine> = Vec::with_capacity(ranking.len());
            for (m, score) in ranking.iter() {
                lines.push(OutputLine {
                    label: label(m)?,
                    score: Some(*score),
                });
            }
            sort_lines(&mut lines);
            Ok(lines)
        }
        Rule::Election(r) => {
            let winners = profile
                .elect(r, settings.seats)
                .context(SocialChoiceSnafu {})?;
            info!("apply_rule: {} winners: {:?}", r.name(), winners);
            winners
                .iter()
                .map(|m| {
                    Ok(OutputLine {
                        label: label(m)?,
                        score: None,
                    })
                })
                .collect()
        }
    }
}

// Both tables are instances x voters. The vote runs on their transposes.
fn classify_lines(probabilities: &Table, predictions: &Table) -> SochoResult<Vec<OutputLine>> {
    if probabilities.labels.len() != predictions.labels.len()
        || probabilities.voters.len() != predictions.voters.len()
    {
        whatever!(
            "the predictions in {} ({} x {}) do not match the probabilities in {} ({} x {})",
            predictions.path,
            predictions.labels.len(),
            predictions.voters.len(),
            probabilities.path,
            probabilities.labels.len(),
            probabilities.voters.len()
        );
    }
    let scores = classify(&predictions.cells_by_voter(), &probabilities.scores_by_voter()?)
        .context(SocialChoiceSnafu {})?;
    let mut lines: Vec<OutputLine> = Vec::with_capacity(scores.len());
    for (instance, score) in scores {
        lines.push(OutputLine {
            label: probabilities.labels[instance].clone(),
            score: Some(score),
        });
    }
    sort_lines(&mut lines);
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const SCORES: &str = "v1,v2,v3\nA,0.2,0.3,0.5\nB,0.7,0.9,0.5\nC,0.1,0.2,0.9\n";

    fn args(dir: &Path, input: &str, function: &str) -> Args {
        let input_path = dir.join("input.csv");
        fs::write(&input_path, input).unwrap();
        Args {
            input: input_path.display().to_string(),
            sep: Some(",".to_string()),
            function: Some(function.to_string()),
            output: Some(dir.join("output.txt").display().to_string()),
            ..Default::default()
        }
    }

    fn output(dir: &Path) -> String {
        fs::read_to_string(dir.join("output.txt")).unwrap()
    }

    #[test]
    fn borda_ranking() {
        let dir = tempfile::tempdir().unwrap();
        run(&args(dir.path(), SCORES, "borda")).unwrap();
        assert_eq!(output(dir.path()), "\"B\" 4\n\"A\" 3\n\"C\" 2\n");
    }

    #[test]
    fn copeland_ranking() {
        let dir = tempfile::tempdir().unwrap();
        run(&args(dir.path(), SCORES, "copeland")).unwrap();
        assert_eq!(output(dir.path()), "\"B\" 2\n\"A\" 0\n\"C\" -2\n");
    }

    #[test]
    fn unlabelled_rows_and_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path(), "v1\tv2\n1\t2\n3\t1\n", "plurality");
        a.sep = Some("\\t".to_string());
        run(&a).unwrap();
        // One first place each: ties are sorted by label.
        assert_eq!(output(dir.path()), "\"0\" 1\n\"1\" 1\n");
    }

    #[test]
    fn stv_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"function": "stv", "separator": ",", "seats": 2}"#,
        )
        .unwrap();
        let mut a = args(dir.path(), SCORES, "unused");
        a.function = None;
        a.sep = None;
        a.config = Some(config_path.display().to_string());
        run(&a).unwrap();
        assert_eq!(output(dir.path()), "\"B\"\n\"C\"\n");
    }

    #[test]
    fn borda_from_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let a = Args {
            input: format!("{}/testdata/votes.xlsx", env!("CARGO_MANIFEST_DIR")),
            function: Some("borda".to_string()),
            input_type: Some("xlsx".to_string()),
            excel_worksheet_name: Some("votes".to_string()),
            output: Some(dir.path().join("output.txt").display().to_string()),
            ..Default::default()
        };
        run(&a).unwrap();
        assert_eq!(output(dir.path()), "\"B\" 4\n\"A\" 3\n\"C\" 2\n");
    }

    #[test]
    fn classify_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let predictions_path = dir.path().join("predictions.csv");
        fs::write(
            &predictions_path,
            "v1,v2,v3\nx,cat,cat,dog\ny,dog,cat,dog\n",
        )
        .unwrap();
        let mut a = args(
            dir.path(),
            "v1,v2,v3\nx,0.5,0.75,0.25\ny,0.25,0.75,0.5\n",
            "plurality",
        );
        a.predictions = Some(predictions_path.display().to_string());
        run(&a).unwrap();
        assert_eq!(output(dir.path()), "\"x\" 0.625\n\"y\" 0.375\n");
    }

    #[test]
    fn compare_with_reference_file() {
        let dir = tempfile::tempdir().unwrap();
        let reference_path = dir.path().join("reference.txt");
        let mut a = args(dir.path(), SCORES, "borda");
        a.compare = Some(reference_path.display().to_string());

        fs::write(&reference_path, "\"A\" 3\n\"C\" 2\n\"B\" 4\n").unwrap();
        run(&a).unwrap();

        fs::write(&reference_path, "\"B\" 4\n\"C\" 3\n\"A\" 2\n").unwrap();
        assert!(matches!(
            run(&a),
            Err(SochoError::ReferenceMismatch {
                errors: 2,
                total: 3
            })
        ));
    }

    #[test]
    fn bad_score() {
        let dir = tempfile::tempdir().unwrap();
        let res = run(&args(dir.path(), "v1,v2\nA,1,2\nB,abc,3\n", "borda"));
        assert!(matches!(
            res,
            Err(SochoError::ParsingScore { lineno: 3, .. })
        ));
    }

    #[test]
    fn unknown_function() {
        let dir = tempfile::tempdir().unwrap();
        let res = run(&args(dir.path(), SCORES, "majority_judgment"));
        assert!(matches!(
            res,
            Err(SochoError::SocialChoice {
                source: SocialChoiceError::UnknownRule { .. }
            })
        ));
    }

    #[test]
    fn kemeny_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path(), SCORES, "kemeny_young");
        a.max_kemeny_mayors = Some(2);
        assert!(matches!(
            run(&a),
            Err(SochoError::SocialChoice {
                source: SocialChoiceError::ScaleLimitExceeded { .. }
            })
        ));
        a.max_kemeny_mayors = None;
        run(&a).unwrap();
        assert_eq!(output(dir.path()), "\"B\" 3\n\"A\" 2\n\"C\" 1\n");
    }
}
