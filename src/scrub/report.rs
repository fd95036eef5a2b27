// Text rendering of the processed survey: sample rows, summary table and bar charts.

use crate::scrub::*;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

const MAX_CELL_WIDTH: usize = 30;
const BAR_WIDTH: u64 = 40;

pub fn format_report(processed: &ProcessedSurvey, sample_rows: usize) -> String {
    let mut out = String::new();
    out.push_str("Original Data\n");
    out.push_str(&format_table(&processed.original.head(sample_rows)));
    out.push('\n');
    out.push_str("Cleaned Data\n");
    out.push_str(&format_table(&processed.cleaned.head(sample_rows)));
    out.push('\n');
    out.push_str("Summary\n");
    out.push_str(&format_summary(&processed.summary));
    for row in processed.summary.rows.iter() {
        out.push('\n');
        out.push_str(&format_bar_chart(row));
    }
    out
}

fn display_cell(s: &str) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() > MAX_CELL_WIDTH {
        let mut short: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
        short.push_str("...");
        short
    } else {
        flat
    }
}

/// Aligned text rendering of a table, header first.
pub fn format_table(table: &Table) -> String {
    let header: Vec<String> = table.columns().iter().map(|c| display_cell(c)).collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|c| display_cell(c.as_str())).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows.iter() {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        padded.join(" | ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line(&header));
    out.push('\n');
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&sep.join("-+-"));
    out.push('\n');
    for row in rows.iter() {
        out.push_str(&format_line(row));
        out.push('\n');
    }
    out
}

pub fn format_summary(summary: &Summary) -> String {
    let mut columns = vec!["Question".to_string()];
    columns.extend(Category::ALL.iter().map(|c| c.label().to_string()));
    let rows: Vec<Vec<Cell>> = summary
        .rows
        .iter()
        .map(|r| {
            let mut row = vec![Cell::Text(r.column.clone())];
            row.extend(r.counts.iter().map(|(_, n)| Cell::Value(n.to_string())));
            row
        })
        .collect();
    match Table::new(columns, rows) {
        Ok(t) => format_table(&t),
        // Rows are built with one cell per column.
        Err(e) => format!("{}\n", e),
    }
}

/// A horizontal bar chart of the counts of one question, in chart order.
pub fn format_bar_chart(row: &SummaryRow) -> String {
    let max = Category::CHART_ORDER
        .iter()
        .map(|c| row.counts.get(*c))
        .max()
        .unwrap_or(0);
    let label_width = Category::ALL
        .iter()
        .map(|c| c.label().len() + c.color().len() + 3)
        .max()
        .unwrap_or(0);

    let mut out = format!("Summary of {}\nNumber of Responses\n", row.column);
    for c in Category::CHART_ORDER {
        let n = row.counts.get(c);
        let len = if max == 0 {
            0
        } else {
            // Non-zero counts always get a visible bar.
            (n * BAR_WIDTH / max).max(if n > 0 { 1 } else { 0 })
        };
        let tag = format!("{} [{}]", c.label(), c.color());
        out.push_str(&format!(
            "{:<width$} {} {}\n",
            tag,
            "#".repeat(len as usize),
            n,
            width = label_width
        ));
    }
    out
}

/// The summary in JSON, along with the number of rows of the cleaned table.
pub fn summary_to_json(summary: &Summary, num_rows: usize) -> JSValue {
    let rows: Vec<JSValue> = summary
        .rows
        .iter()
        .map(|r| {
            let mut counts: JSMap<String, JSValue> = JSMap::new();
            for (c, n) in r.counts.iter() {
                counts.insert(c.label().to_string(), json!(n));
            }
            json!({"column": r.column, "counts": counts})
        })
        .collect();
    json!({"summary": rows, "rows": num_rows})
}
