use crate::config::*;

// Evaluated in order, the first rule with a matching keyword wins.
// A response mentioning both "support" and "oppose" is therefore counted as support.
const RULES: [(Category, &[&str]); 3] = [
    (Category::Support, &["support", "beneficial"]),
    (Category::Oppose, &["oppose", "detrimental"]),
    (Category::Neutral, &["neutral", "fine"]),
];

/// Assigns a category to a single cell.
///
/// Only text cells can express a sentiment: empty cells and values are always
/// `NoResponse`. Matching is done on substrings and is case-sensitive; the text is
/// expected to be lower-cased by the cleaning step.
pub fn categorize_cell(cell: &Cell) -> Category {
    match cell {
        Cell::Text(s) => categorize_text(s),
        Cell::Empty | Cell::Value(_) => Category::NoResponse,
    }
}

pub fn categorize_text(text: &str) -> Category {
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(c, _)| *c)
        .unwrap_or(Category::NoResponse)
}
