use clap::Parser;

/// This is a rank aggregation program based on social choice functions.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The table of scores: one row per mayor, one column per voter. The first row
    /// holds the names of the voters.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path, optional) The classes predicted by each voter, in the same layout as the input.
    /// Only used with the plurality function, the input then holds the probabilities of the
    /// predictions.
    #[clap(short, long, value_parser)]
    pub predictions: Option<String>,

    /// (default tab) The field separator of the input files, for example ',' or '\t'.
    #[clap(short, long, value_parser)]
    pub sep: Option<String>,

    /// The social choice function: borda, dowdall, copeland, symmetric_borda, simpson,
    /// plurality, schulze, kemeny_young, condorcet, stv, baldwin, nanson, sequential_majority
    /// or raynaud. It may also be given in the configuration file.
    #[clap(short, long, value_parser)]
    pub function: Option<String>,

    /// (file path or 'stdout', default test_output.txt) Where to write the ranking.
    #[clap(short, long, value_parser)]
    pub output: Option<String>,

    /// (file path, optional) A reference ranking. If provided, socho checks that the computed
    /// ranking matches it.
    #[clap(short, long, value_parser)]
    pub compare: Option<String>,

    /// (file path, optional) A configuration file in JSON. The command line options take
    /// precedence over its content.
    #[clap(long, value_parser)]
    pub config: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, the name of the worksheet to use. The first worksheet is used
    /// otherwise.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 1) The number of seats to fill with the stv function.
    #[clap(long, value_parser)]
    pub seats: Option<usize>,

    /// (default 8) The largest number of mayors accepted by kemeny_young.
    #[clap(long, value_parser)]
    pub max_kemeny_mayors: Option<usize>,

    /// (default 20) The largest number of mayors accepted by schulze.
    #[clap(long, value_parser)]
    pub max_schulze_mayors: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
