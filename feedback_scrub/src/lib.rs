/*!
Cleaning and tabulation of survey feedback.

A survey export is a table in which some columns hold free-text answers. This crate
normalizes the table, assigns one of four sentiment categories (support, oppose,
neutral or no response) to every answer of the feedback columns and counts the
categories per question.

```
use feedback_scrub::{process_csv, Category, ScrubRules};

let input = "Name,Do you support the plan?\nAda,I SUPPORT it\nBob,Seems fine\n,\n";
let survey = process_csv(input.as_bytes(), &ScrubRules::default())?;

let counts = survey
    .summary
    .get("Do you support the plan? (Categorized)")
    .unwrap();
assert_eq!(counts.get(Category::Support), 1);
assert_eq!(counts.get(Category::Neutral), 1);
assert_eq!(survey.cleaned.num_rows(), 2);
# Ok::<(), feedback_scrub::ScrubError>(())
```
*/

mod classifier;
mod config;
mod csv_format;

use log::{debug, info, warn};
use std::io::Read;

pub use crate::classifier::*;
pub use crate::config::*;
pub use crate::csv_format::*;

/// The name under which the cleaned table is offered for download.
pub const CLEANED_FILE_NAME: &str = "cleaned_feedback_report.csv";

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Normalizes a table: rows without any content are dropped and all the text is
/// lower-cased. Values and empty cells are left untouched.
///
/// Cleaning an already cleaned table returns the same table.
pub fn clean(table: &Table) -> Table {
    let mut res = table.clone();
    let before = res.num_rows();
    res.rows_mut()
        .retain(|row| !row.iter().all(|c| c.is_empty()));
    for row in res.rows_mut().iter_mut() {
        for cell in row.iter_mut() {
            if let Cell::Text(s) = cell {
                *s = s.to_lowercase();
            }
        }
    }
    debug!(
        "clean: dropped {} empty rows out of {}",
        before - res.num_rows(),
        before
    );
    res
}

/// The feedback columns, in table order.
///
/// Columns produced by a previous categorization (carrying the categorized suffix)
/// are never selected. With an empty suffix this check is skipped.
pub fn select_feedback_columns(columns: &[String], rules: &ScrubRules) -> Vec<String> {
    let suffix = rules.categorized_suffix.as_str();
    columns
        .iter()
        .filter(|name| suffix.is_empty() || !name.ends_with(suffix))
        .filter(|name| {
            rules
                .feedback_markers
                .iter()
                .any(|m| name.contains(m.as_str()))
        })
        .cloned()
        .collect()
}

/// Adds one categorized column per feedback column and returns their names, in the
/// order of the feedback columns.
///
/// A categorized column that already exists is overwritten in place (with an empty
/// suffix, this replaces the feedback column itself). The labels are stored as values,
/// so that cleaning the table again leaves them untouched.
pub fn categorize_columns(
    table: &mut Table,
    feedback_columns: &[String],
    rules: &ScrubRules,
) -> ScrubResult<Vec<String>> {
    let mut res: Vec<String> = Vec::new();
    for col in feedback_columns {
        let cells = match table.column(col) {
            Some(cells) => cells,
            None => {
                warn!("categorize_columns: column {:?} not found, skipping", col);
                continue;
            }
        };
        let values: Vec<Cell> = cells
            .into_iter()
            .map(|c| Cell::Value(categorize_cell(c).label().to_string()))
            .collect();
        let name = format!("{}{}", col, rules.categorized_suffix);
        debug!("categorize_columns: {:?} -> {:?}", col, name);
        table.put_column(&name, values)?;
        res.push(name);
    }
    Ok(res)
}

/// Counts the categories of each categorized column.
///
/// Labels are read regardless of case. Cells that do not hold a category label are
/// counted as `NoResponse`, so that every row of the table is counted exactly once
/// per column.
pub fn summarize(table: &Table, categorized_columns: &[String]) -> Summary {
    let mut rows: Vec<SummaryRow> = Vec::new();
    for col in categorized_columns {
        let mut counts = CategoryCounts::default();
        if let Some(cells) = table.column(col) {
            for cell in cells {
                let c = Category::from_label(cell.as_str()).unwrap_or(Category::NoResponse);
                counts.add(c);
            }
        }
        rows.push(SummaryRow {
            column: col.clone(),
            counts,
        });
    }
    Summary { rows }
}

/// The outcome of processing one survey table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProcessedSurvey {
    pub original: Table,
    /// The cleaned table, including the categorized columns.
    pub cleaned: Table,
    pub feedback_columns: Vec<String>,
    pub categorized_columns: Vec<String>,
    pub summary: Summary,
    markers: Vec<String>,
}

impl ProcessedSurvey {
    /// Fails with `EmptyResult` if no column was selected for categorization.
    /// The rest of the processing is still valid: the summary is simply empty.
    pub fn check_feedback_columns(&self) -> ScrubResult<()> {
        if self.feedback_columns.is_empty() {
            return EmptyResultSnafu {
                markers: self.markers.clone(),
            }
            .fail();
        }
        Ok(())
    }

    /// The cleaned table serialized as CSV: original columns first, then the
    /// categorized columns.
    pub fn export(&self) -> ScrubResult<Download> {
        Ok(Download {
            file_name: CLEANED_FILE_NAME.to_string(),
            content_type: CSV_CONTENT_TYPE,
            data: export_csv(&self.cleaned)?,
        })
    }
}

/// Runs the cleaning, categorization and summary steps on a loaded table.
pub fn process_table(table: Table, rules: &ScrubRules) -> ScrubResult<ProcessedSurvey> {
    info!(
        "Processing table with {} rows and {} columns",
        table.num_rows(),
        table.columns().len()
    );
    let mut cleaned = clean(&table);
    let feedback_columns = select_feedback_columns(cleaned.columns(), rules);
    info!("Feedback columns: {:?}", feedback_columns);
    let categorized_columns = categorize_columns(&mut cleaned, &feedback_columns, rules)?;
    let summary = summarize(&cleaned, &categorized_columns);
    for row in summary.rows.iter() {
        debug!("Summary of {}: {:?}", row.column, row.counts);
    }
    Ok(ProcessedSurvey {
        original: table,
        cleaned,
        feedback_columns,
        categorized_columns,
        summary,
        markers: rules.feedback_markers.clone(),
    })
}

/// Loads a CSV stream and processes it.
///
/// If the stream is not valid CSV, the error is returned and nothing else is computed.
pub fn process_csv<R: Read>(reader: R, rules: &ScrubRules) -> ScrubResult<ProcessedSurvey> {
    let table = load_csv(reader, &rules.missing_value_markers)?;
    process_table(table, rules)
}
