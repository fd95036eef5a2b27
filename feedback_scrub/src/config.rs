// ********* Input data structures ***********

use snafu::prelude::*;
use std::fmt::Display;

/// The content of a single cell in a survey table.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Cell {
    /// A missing value: an empty field or one of the missing-value markers.
    Empty,
    /// Free text typed by a respondent.
    Text(String),
    /// A literal that is not free text (number, boolean, spreadsheet date, category
    /// label). It is carried verbatim and never normalized.
    Value(String),
}

/// How the fields of a column read from a text file are interpreted.
///
/// A column is typed as a whole: it holds values only if all of its non-missing fields
/// are numbers, or all of them are boolean literals. Any other column is text, so a
/// `TRUE` or a `12` typed among free-text answers stays text.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnKind {
    Values,
    Text,
}

impl ColumnKind {
    pub fn infer<'a, I>(fields: I, missing_markers: &[String]) -> ColumnKind
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut all_numbers = true;
        let mut all_booleans = true;
        for field in fields {
            if is_missing(field, missing_markers) {
                continue;
            }
            all_numbers &= field.parse::<f64>().is_ok();
            all_booleans &= BOOLEAN_LITERALS.contains(&field);
            if !all_numbers && !all_booleans {
                return ColumnKind::Text;
            }
        }
        ColumnKind::Values
    }
}

fn is_missing(field: &str, missing_markers: &[String]) -> bool {
    field.is_empty() || missing_markers.iter().any(|m| m == field)
}

impl Cell {
    /// Interprets a raw field read from a text file, given the kind of its column.
    /// Missing-value markers become empty cells.
    pub fn from_field(field: &str, missing_markers: &[String], kind: ColumnKind) -> Cell {
        if is_missing(field, missing_markers) {
            Cell::Empty
        } else {
            match kind {
                ColumnKind::Values => Cell::Value(field.to_string()),
                ColumnKind::Text => Cell::Text(field.to_string()),
            }
        }
    }

    /// Interprets a cell that is already known to hold text (for example a string
    /// cell from a workbook). Only the missing-value markers are checked.
    pub fn from_text(s: &str, missing_markers: &[String]) -> Cell {
        if is_missing(s, missing_markers) {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The serialized form of the cell. Missing values are written as empty fields.
    pub fn as_str(&self) -> &str {
        match self {
            Cell::Empty => "",
            Cell::Text(s) | Cell::Value(s) => s.as_str(),
        }
    }
}

const BOOLEAN_LITERALS: [&str; 6] = ["true", "false", "True", "False", "TRUE", "FALSE"];

/// A table of survey responses: named columns and rows of cells.
///
/// Invariant: every row has exactly one cell per column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> ScrubResult<Table> {
        for (idx, row) in rows.iter().enumerate() {
            ensure!(
                row.len() == columns.len(),
                RaggedRowSnafu {
                    lineno: idx + 2,
                    expected: columns.len(),
                    found: row.len(),
                }
            );
        }
        Ok(Table { columns, rows })
    }

    /// Builds a table from the header row of an input file.
    ///
    /// Blank names become `Unnamed: <index>` and repeated names get a `.1`, `.2`, ...
    /// suffix, so that every column can be addressed by name.
    pub fn from_header(header: &[String], rows: Vec<Vec<Cell>>) -> ScrubResult<Table> {
        Table::new(normalize_header(header), rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// A copy of the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Cell>> {
        &mut self.rows
    }

    /// Sets the content of a column, appending the column if it does not exist yet.
    /// `values` must hold one cell per row.
    pub(crate) fn put_column(&mut self, name: &str, values: Vec<Cell>) -> ScrubResult<()> {
        ensure!(
            values.len() == self.rows.len(),
            ColumnLengthSnafu {
                column: name,
                expected: self.rows.len(),
                found: values.len(),
            }
        );
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        Ok(())
    }
}

fn normalize_header(header: &[String]) -> Vec<String> {
    let mut res: Vec<String> = Vec::with_capacity(header.len());
    for (idx, name) in header.iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name.clone()
        };
        let mut candidate = base.clone();
        let mut k = 1;
        while res.contains(&candidate) {
            candidate = format!("{}.{}", base, k);
            k += 1;
        }
        res.push(candidate);
    }
    res
}

// ******** Output data structures *********

/// The sentiment expressed by a single response.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Category {
    Support,
    Oppose,
    Neutral,
    NoResponse,
}

impl Category {
    /// All the categories, in the order used by the summary table.
    pub const ALL: [Category; 4] = [
        Category::Support,
        Category::Oppose,
        Category::Neutral,
        Category::NoResponse,
    ];

    /// The order of the bars in a chart. Colors are assigned along this order.
    pub const CHART_ORDER: [Category; 4] = [
        Category::NoResponse,
        Category::Support,
        Category::Oppose,
        Category::Neutral,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Support => "Support",
            Category::Oppose => "Oppose",
            Category::Neutral => "Neutral",
            Category::NoResponse => "No Response",
        }
    }

    /// Reads a category label. The case is ignored, so labels that went through a
    /// lower-casing step are still recognized.
    pub fn from_label(s: &str) -> Option<Category> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s))
    }

    /// The color of the bar of this category in the charts.
    pub fn color(&self) -> &'static str {
        match self {
            Category::NoResponse => "gray",
            Category::Support => "yellow",
            Category::Oppose => "red",
            Category::Neutral => "green",
        }
    }

    fn index(&self) -> usize {
        match self {
            Category::Support => 0,
            Category::Oppose => 1,
            Category::Neutral => 2,
            Category::NoResponse => 3,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Number of responses for each category. All the categories are always present.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct CategoryCounts([u64; 4]);

impl CategoryCounts {
    pub fn get(&self, c: Category) -> u64 {
        self.0[c.index()]
    }

    pub fn add(&mut self, c: Category) {
        self.0[c.index()] += 1;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// The counts in summary order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.iter().map(|c| (*c, self.get(*c)))
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryRow {
    /// The name of the categorized column.
    pub column: String,
    pub counts: CategoryCounts,
}

/// Per-column counts of each category, in the order the columns were categorized.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&CategoryCounts> {
        self.rows
            .iter()
            .find(|r| r.column == column)
            .map(|r| &r.counts)
    }
}

/// The cleaned table, ready to be handed to the user as a file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

/// Errors that prevent the pipeline from completing successfully.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ScrubError {
    #[snafu(display("Input is not a valid CSV file"))]
    Format { source: csv::Error },
    #[snafu(display("Input has no header row"))]
    MissingHeader {},
    #[snafu(display("Row {lineno} has {found} cells, expected {expected}"))]
    RaggedRow {
        lineno: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Column {column} has {found} cells, expected {expected}"))]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
    #[snafu(display("No feedback column matches the markers {markers:?}"))]
    EmptyResult { markers: Vec<String> },
    #[snafu(display("Failed to serialize the cleaned table"))]
    Export { source: csv::Error },
    #[snafu(display("Failed to write the cleaned table"))]
    ExportIo { source: std::io::Error },
}

pub type ScrubResult<T> = Result<T, ScrubError>;

// ********* Configuration **********

/// The rules that decide which columns are feedback and how the results are named.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScrubRules {
    /// A column is a feedback column if its name contains one of these markers.
    /// The match is case-sensitive.
    pub feedback_markers: Vec<String>,
    /// Appended to the name of a feedback column to name its categorized column.
    pub categorized_suffix: String,
    /// Fields equal to one of these are read as missing values.
    pub missing_value_markers: Vec<String>,
}

impl ScrubRules {
    pub const DEFAULT_FEEDBACK_MARKERS: [&'static str; 2] = ["Do you support", "Section"];

    pub const DEFAULT_CATEGORIZED_SUFFIX: &'static str = " (Categorized)";

    pub const DEFAULT_MISSING_VALUE_MARKERS: [&'static str; 19] = [
        "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
        "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ];
}

impl Default for ScrubRules {
    fn default() -> Self {
        ScrubRules {
            feedback_markers: ScrubRules::DEFAULT_FEEDBACK_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            categorized_suffix: ScrubRules::DEFAULT_CATEGORIZED_SUFFIX.to_string(),
            missing_value_markers: ScrubRules::DEFAULT_MISSING_VALUE_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        ScrubRules::default().missing_value_markers
    }

    fn kind(fields: &[&str]) -> ColumnKind {
        ColumnKind::infer(fields.iter().copied(), &markers())
    }

    #[test]
    fn columns_are_typed_as_a_whole() {
        assert_eq!(kind(&["42", "-3.5", "", "N/A"]), ColumnKind::Values);
        assert_eq!(kind(&["TRUE", "false", "NA"]), ColumnKind::Values);
        assert_eq!(kind(&["", "N/A"]), ColumnKind::Values);
        assert_eq!(kind(&["TRUE", "i support"]), ColumnKind::Text);
        assert_eq!(kind(&["12", "twelve"]), ColumnKind::Text);
        // Numbers mixed with booleans are neither.
        assert_eq!(kind(&["1", "true"]), ColumnKind::Text);
    }

    #[test]
    fn fields_are_typed() {
        let m = markers();
        assert_eq!(Cell::from_field("", &m, ColumnKind::Text), Cell::Empty);
        assert_eq!(Cell::from_field("N/A", &m, ColumnKind::Values), Cell::Empty);
        assert_eq!(
            Cell::from_field("42", &m, ColumnKind::Values),
            Cell::Value("42".to_string())
        );
        assert_eq!(
            Cell::from_field("TRUE", &m, ColumnKind::Text),
            Cell::Text("TRUE".to_string())
        );
        assert_eq!(
            Cell::from_field(" ", &m, ColumnKind::Text),
            Cell::Text(" ".to_string())
        );
    }

    #[test]
    fn header_is_normalized() {
        let header: Vec<String> = ["a", "", "a", "a", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let t = Table::from_header(&header, vec![]).unwrap();
        assert_eq!(t.columns(), &["a", "Unnamed: 1", "a.1", "a.2", "b"]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let res = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Empty, Cell::Empty], vec![Cell::Empty]],
        );
        assert!(matches!(
            res,
            Err(ScrubError::RaggedRow {
                lineno: 3,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn put_column_appends_then_overwrites() {
        let mut t = Table::new(
            vec!["q".to_string()],
            vec![vec![Cell::Empty], vec![Cell::Empty]],
        )
        .unwrap();
        t.put_column("d", vec![Cell::Text("x".to_string()), Cell::Empty])
            .unwrap();
        t.put_column("d", vec![Cell::Empty, Cell::Text("y".to_string())])
            .unwrap();
        assert_eq!(t.columns(), &["q", "d"]);
        assert_eq!(
            t.column("d").unwrap(),
            vec![&Cell::Empty, &Cell::Text("y".to_string())]
        );
    }

    #[test]
    fn put_column_checks_length() {
        let mut t = Table::new(vec!["q".to_string()], vec![vec![Cell::Empty]]).unwrap();
        let res = t.put_column("d", vec![]);
        assert!(matches!(
            res,
            Err(ScrubError::ColumnLength {
                expected: 1,
                found: 0,
                ..
            })
        ));
        assert_eq!(t.columns(), &["q"]);
    }

    #[test]
    fn chart_colors_follow_chart_order() {
        let colors: Vec<&str> = Category::CHART_ORDER.iter().map(|c| c.color()).collect();
        assert_eq!(colors, vec!["gray", "yellow", "red", "green"]);
    }

    #[test]
    fn labels_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
        assert_eq!(Category::from_label("support"), Some(Category::Support));
        assert_eq!(Category::from_label("no response"), Some(Category::NoResponse));
        assert_eq!(Category::from_label("supportive"), None);
    }

    #[test]
    fn counts_always_hold_all_categories() {
        let mut counts = CategoryCounts::default();
        counts.add(Category::Oppose);
        counts.add(Category::Oppose);
        let all: Vec<(Category, u64)> = counts.iter().collect();
        assert_eq!(
            all,
            vec![
                (Category::Support, 0),
                (Category::Oppose, 2),
                (Category::Neutral, 0),
                (Category::NoResponse, 0),
            ]
        );
        assert_eq!(counts.total(), 2);
    }
}
