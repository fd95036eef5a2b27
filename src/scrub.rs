mod config_reader;
mod io_csv;
mod io_xlsx;
mod report;

use log::{debug, info, warn};

use feedback_scrub::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::scrub::config_reader::*;

#[derive(Debug, Snafu)]
pub enum SessionError {
    #[snafu(display("Error opening file {path}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Failed to process {path}"))]
    Pipeline { source: ScrubError, path: String },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type SessionResult<T> = Result<T, SessionError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum InputType {
    Csv,
    Xlsx,
}

fn input_type(path: &str, explicit: &Option<String>) -> SessionResult<InputType> {
    match explicit.as_deref() {
        Some("csv") => Ok(InputType::Csv),
        Some("xlsx") => Ok(InputType::Xlsx),
        Some(x) => {
            whatever!("Unknown input type {:?}, expected 'csv' or 'xlsx'", x)
        }
        None => {
            let is_xlsx = Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("xlsx"))
                .unwrap_or(false);
            Ok(if is_xlsx {
                InputType::Xlsx
            } else {
                InputType::Csv
            })
        }
    }
}

fn read_survey_table(path: &str, settings: &Settings) -> SessionResult<Table> {
    info!("Attempting to read survey file {:?}", path);
    match input_type(path, &settings.input_type)? {
        InputType::Csv => io_csv::read_csv_table(path, &settings.rules),
        InputType::Xlsx => io_xlsx::read_excel_table(
            path,
            settings.excel_worksheet_name.as_deref(),
            &settings.rules,
        ),
    }
}

fn write_download(download: &Download, output: &Option<String>) -> SessionResult<()> {
    match output.as_deref() {
        Some("stdout") => {
            // The export already ends with a line break.
            print!("{}", String::from_utf8_lossy(&download.data));
        }
        _ => {
            let dir: PathBuf = output.clone().unwrap_or_else(|| ".".to_string()).into();
            let p = dir.join(&download.file_name);
            let p2 = p.as_path().display().to_string();
            fs::write(&p, &download.data).context(WritingOutputSnafu { path: p2.clone() })?;
            info!(
                "Wrote {} ({}, {} bytes)",
                p2,
                download.content_type,
                download.data.len()
            );
            println!("Cleaned data written to {}", p2);
        }
    }
    Ok(())
}

fn write_summary(pretty_js: &str, out: &str) -> SessionResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
        info!("Wrote summary to {}", out);
    }
    Ok(())
}

/// Compares the computed summary with a reference summary stored in JSON.
fn check_reference(pretty_js_summary: &str, reference_path: &str) -> SessionResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_summary, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

/// Processes one survey file from start to end.
///
/// A file that cannot be read stops the session before anything is displayed or written.
pub fn run_session(args: &Args) -> SessionResult<()> {
    let config = match &args.config {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    let settings = resolve_settings(args, config.as_ref())?;
    debug!("settings: {:?}", settings);

    let input_path = match &args.input {
        Some(p) => p.clone(),
        None => {
            info!("No input file provided, nothing to process");
            return Ok(());
        }
    };

    let table = read_survey_table(&input_path, &settings)?;
    let processed =
        process_table(table, &settings.rules).context(PipelineSnafu { path: &input_path })?;

    if let Err(e) = processed.check_feedback_columns() {
        warn!("{}", e);
        eprintln!("Warning: {}", e);
    }

    print!("{}", report::format_report(&processed, settings.sample_rows));

    let download = processed
        .export()
        .context(PipelineSnafu { path: &input_path })?;
    write_download(&download, &settings.output_directory)?;

    let summary_js = report::summary_to_json(&processed.summary, processed.cleaned.num_rows());
    let pretty_js_summary = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    if let Some(out) = &args.summary_out {
        write_summary(&pretty_js_summary, out)?;
    }
    if let Some(reference_path) = &args.reference {
        check_reference(&pretty_js_summary, reference_path)?;
    }

    Ok(())
}
