// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::scrub::*;

/// Reads a survey table from a worksheet. The first row is the header.
///
/// If no worksheet name is given, the first worksheet is used.
pub fn read_excel_table(
    path: &str,
    worksheet_name: Option<&str>,
    rules: &ScrubRules,
) -> SessionResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(row) => row.iter().map(header_name).collect(),
        None => return Err(ScrubError::MissingHeader {}).context(PipelineSnafu { path }),
    };
    debug!("read_excel_table: header: {:?}", header);

    let rows: Vec<Vec<Cell>> = iter
        .map(|row| {
            row.iter()
                .map(|c| read_cell(c, &rules.missing_value_markers))
                .collect()
        })
        .collect();
    debug!("read_excel_table: read {} rows", rows.len());
    Table::from_header(&header, rows).context(PipelineSnafu { path })
}

fn header_name(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        c => read_cell(c, &[]).as_str().to_string(),
    }
}

fn read_cell(cell: &DataType, missing_value_markers: &[String]) -> Cell {
    match cell {
        DataType::String(s) => Cell::from_text(s, missing_value_markers),
        DataType::Empty => Cell::Empty,
        DataType::Int(i) => Cell::Value(i.to_string()),
        DataType::Float(f) => Cell::Value(f.to_string()),
        DataType::Bool(b) => Cell::Value(b.to_string()),
        // Serial date, as stored in the workbook.
        DataType::DateTime(f) => Cell::Value(f.to_string()),
        DataType::Error(e) => {
            warn!("read_cell: error cell {:?} read as missing", e);
            Cell::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_typed() {
        let m = ScrubRules::default().missing_value_markers;
        assert_eq!(
            read_cell(&DataType::String("I Support".to_string()), &m),
            Cell::Text("I Support".to_string())
        );
        assert_eq!(
            read_cell(&DataType::String("N/A".to_string()), &m),
            Cell::Empty
        );
        // A number stored as text stays text.
        assert_eq!(
            read_cell(&DataType::String("12".to_string()), &m),
            Cell::Text("12".to_string())
        );
        assert_eq!(read_cell(&DataType::Int(3), &m), Cell::Value("3".to_string()));
        assert_eq!(
            read_cell(&DataType::Float(2.5), &m),
            Cell::Value("2.5".to_string())
        );
        assert_eq!(
            read_cell(&DataType::Bool(true), &m),
            Cell::Value("true".to_string())
        );
        assert_eq!(read_cell(&DataType::Empty, &m), Cell::Empty);
    }

    #[test]
    fn header_names() {
        assert_eq!(header_name(&DataType::String("Age".to_string())), "Age");
        assert_eq!(header_name(&DataType::Int(2021)), "2021");
        assert_eq!(header_name(&DataType::Empty), "");
    }

    #[test]
    fn missing_workbook() {
        let res = read_excel_table("/nonexistent/survey.xlsx", None, &ScrubRules::default());
        assert!(matches!(res, Err(SessionError::OpeningExcel { .. })));
    }

    fn fixture() -> String {
        format!("{}/tests/data/survey.xlsx", env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn first_worksheet_by_default() {
        let t = read_excel_table(&fixture(), None, &ScrubRules::default()).unwrap();
        assert_eq!(
            t.columns(),
            &["Respondent", "Age", "Do you support the plan?", "Section 2 Comments"]
        );
        assert_eq!(t.num_rows(), 2);
        assert_eq!(
            t.rows()[0],
            vec![
                Cell::Text("Ann".to_string()),
                Cell::Value("34".to_string()),
                Cell::Text("I SUPPORT it".to_string()),
                Cell::Empty
            ]
        );
        assert_eq!(t.rows()[1][3], Cell::Text("seems fine".to_string()));
    }

    #[test]
    fn worksheet_by_name() {
        let t = read_excel_table(&fixture(), Some("Archive"), &ScrubRules::default()).unwrap();
        assert_eq!(t.columns(), &["Section 1"]);
        assert_eq!(
            t.column("Section 1").unwrap(),
            vec![
                &Cell::Text("beneficial".to_string()),
                &Cell::Value("true".to_string())
            ]
        );
        let named = read_excel_table(&fixture(), Some("Responses"), &ScrubRules::default())
            .unwrap();
        assert_eq!(named.num_rows(), 2);
    }

    #[test]
    fn unknown_worksheet() {
        let res = read_excel_table(&fixture(), Some("Form9"), &ScrubRules::default());
        assert!(matches!(res, Err(SessionError::MissingWorksheet { .. })));
    }
}
