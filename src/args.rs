use clap::Parser;

/// This is a cleaning and summarization program for survey feedback.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path or empty) The survey export to process, in CSV or Excel (xlsx) format.
    /// If not provided, nothing is processed.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default: inferred from the file extension) The type of the input: 'csv' or 'xlsx'.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, optional) A configuration file in JSON format. The options passed on the command
    /// line take precedence over the ones in the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory path, 'stdout' or empty) Where to write the cleaned file. Defaults to the
    /// output directory of the configuration, or the current directory.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary table will be written in JSON format
    /// to the given location.
    #[clap(long, value_parser)]
    pub summary_out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, feedscrub will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (list of values or not specified) The markers that identify the feedback columns. A column is
    /// a feedback column if its name contains one of the markers.
    #[clap(long, value_parser)]
    pub markers: Option<Vec<String>>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 5) The number of rows displayed for the original and the cleaned data.
    #[clap(long, value_parser)]
    pub sample_rows: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
