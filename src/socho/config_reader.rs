use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use social_choice::{Rule, RuleLimits};

use crate::args::Args;
use crate::socho::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct LimitsConfig {
    #[serde(rename = "kemenyYoungMaxMayors")]
    pub kemeny_young_max_mayors: Option<usize>,
    #[serde(rename = "schulzeMaxMayors")]
    pub schulze_max_mayors: Option<usize>,
}

/// The content of the JSON configuration file. Every key is optional.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SochoConfig {
    pub function: Option<String>,
    pub separator: Option<String>,
    pub seats: Option<usize>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub limits: Option<LimitsConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

/// The options of a run, once the command line and the configuration file
/// have been merged.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub rule: Rule,
    pub separator: u8,
    pub seats: usize,
    pub input_type: InputType,
    pub excel_worksheet_name: Option<String>,
    pub limits: RuleLimits,
    pub output: String,
}

pub const DEFAULT_OUTPUT: &str = "test_output.txt";

pub fn read_config(path: &str) -> SochoResult<SochoConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: SochoConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

impl Settings {
    /// Command line options take precedence over the configuration file.
    pub fn resolve(args: &Args, config: &SochoConfig) -> SochoResult<Settings> {
        let function = match args.function.as_ref().or(config.function.as_ref()) {
            Some(f) => f,
            None => whatever!("no social choice function given, use --function"),
        };
        let rule = Rule::from_name(function).context(SocialChoiceSnafu {})?;

        let separator = match args.sep.as_ref().or(config.separator.as_ref()) {
            Some(s) => parse_separator(s)?,
            None => b'\t',
        };

        let input_type = match args
            .input_type
            .as_deref()
            .or(config.input_type.as_deref())
        {
            None | Some("csv") => InputType::Csv,
            Some("xlsx") => InputType::Xlsx,
            Some(x) => whatever!("unknown input type {:?}, expected csv or xlsx", x),
        };

        let limits_config = config.limits.clone().unwrap_or_default();
        let limits = RuleLimits {
            kemeny_young_max_mayors: args
                .max_kemeny_mayors
                .or(limits_config.kemeny_young_max_mayors)
                .unwrap_or(RuleLimits::DEFAULT_LIMITS.kemeny_young_max_mayors),
            schulze_max_mayors: args
                .max_schulze_mayors
                .or(limits_config.schulze_max_mayors)
                .unwrap_or(RuleLimits::DEFAULT_LIMITS.schulze_max_mayors),
        };

        Ok(Settings {
            rule,
            separator,
            seats: args.seats.or(config.seats).unwrap_or(1),
            input_type,
            excel_worksheet_name: args
                .excel_worksheet_name
                .clone()
                .or_else(|| config.excel_worksheet_name.clone()),
            limits,
            output: args
                .output
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
        })
    }
}

// Accepts a single ASCII character, or an escaped tab.
fn parse_separator(s: &str) -> SochoResult<u8> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => whatever!("the separator must be a single character, got {:?}", s),
    }
}
