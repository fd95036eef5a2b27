// Reading and writing survey tables in the CSV format.

use log::debug;
use snafu::prelude::*;
use std::io::Read;

use crate::config::*;

/// Reads a table from a CSV stream. The first record is the header.
///
/// Empty lines are skipped. A record shorter than the header is padded with missing
/// values; a record longer than the header is an error.
/// Columns are typed as a whole, see `ColumnKind`.
pub fn load_csv<R: Read>(reader: R, missing_value_markers: &[String]) -> ScrubResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = rdr
        .headers()
        .context(FormatSnafu {})?
        .iter()
        .map(|s| s.to_string())
        .collect();
    ensure!(!header.is_empty(), MissingHeaderSnafu {});
    debug!("load_csv: header: {:?}", header);

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for (idx, record_r) in rdr.records().enumerate() {
        let record = record_r.context(FormatSnafu {})?;
        ensure!(
            record.len() <= header.len(),
            RaggedRowSnafu {
                lineno: record.position().map(|p| p.line() as usize).unwrap_or(idx + 2),
                expected: header.len(),
                found: record.len(),
            }
        );
        if record.len() < header.len() {
            debug!(
                "load_csv: record {} has {} fields, padding to {}",
                idx + 1,
                record.len(),
                header.len()
            );
        }
        records.push(record);
    }

    let kinds: Vec<ColumnKind> = (0..header.len())
        .map(|col| {
            ColumnKind::infer(
                records.iter().filter_map(|r| r.get(col)),
                missing_value_markers,
            )
        })
        .collect();
    debug!("load_csv: column kinds: {:?}", kinds);

    let rows: Vec<Vec<Cell>> = records
        .iter()
        .map(|r| {
            kinds
                .iter()
                .enumerate()
                .map(|(col, kind)| match r.get(col) {
                    Some(field) => Cell::from_field(field, missing_value_markers, *kind),
                    None => Cell::Empty,
                })
                .collect()
        })
        .collect();
    debug!("load_csv: read {} rows", rows.len());
    Table::from_header(&header, rows)
}

/// Writes a table as CSV, header first, columns in table order.
pub fn export_csv(table: &Table) -> ScrubResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        wtr.write_record(table.columns()).context(ExportSnafu {})?;
        for row in table.rows() {
            wtr.write_record(row.iter().map(|c| c.as_str()))
                .context(ExportSnafu {})?;
        }
        wtr.flush().context(ExportIoSnafu {})?;
    }
    Ok(buf)
}
