// Primitives for reading CSV files.

use std::fs::File;

use crate::scrub::*;

pub fn read_csv_table(path: &str, rules: &ScrubRules) -> SessionResult<Table> {
    let f = File::open(path).context(OpeningInputSnafu { path })?;
    let table = load_csv(f, &rules.missing_value_markers).context(PipelineSnafu { path })?;
    debug!(
        "read_csv_table: {}: {} rows, columns: {:?}",
        path,
        table.num_rows(),
        table.columns()
    );
    Ok(table)
}
