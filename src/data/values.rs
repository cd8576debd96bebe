//! Raw cell values and numeric normalization.

use serde::{Deserialize, Serialize};

/// A raw cell as delivered by a source-fetch collaborator, before any
/// normalization. Spreadsheet backends map their native cell types onto
/// these three cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Textual form of the cell, trimmed. Numbers render the way the
    /// spreadsheet shows them (integral floats without a decimal point),
    /// which matters for code columns stored as numeric cells.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

/// Normalize a raw cell into a numeric value.
///
/// Empty cells are `None`. Numbers pass through unchanged. Strings get a
/// comma decimal separator replaced with a period before parsing; anything
/// that still fails to parse is `None`, never an error — one malformed cell
/// must not abort an otherwise valid load.
pub fn normalize_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.replace(',', ".").parse::<f64>().ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_are_none() {
        assert_eq!(normalize_value(&Cell::Empty), None);
        assert_eq!(normalize_value(&Cell::Text(String::new())), None);
        assert_eq!(normalize_value(&Cell::Text("   ".into())), None);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(normalize_value(&Cell::Number(3.5)), Some(3.5));
        assert_eq!(normalize_value(&Cell::Number(0.0)), Some(0.0));
    }

    #[test]
    fn comma_decimal_separator_is_accepted() {
        assert_eq!(normalize_value(&Cell::Text("1,5".into())), Some(1.5));
        assert_eq!(normalize_value(&Cell::Text("4,0".into())), Some(4.0));
        assert_eq!(normalize_value(&Cell::Text("2.25".into())), Some(2.25));
    }

    #[test]
    fn unparseable_text_is_none() {
        assert_eq!(normalize_value(&Cell::Text("n/a".into())), None);
        assert_eq!(normalize_value(&Cell::Text("Testville".into())), None);
    }

    #[test]
    fn numeric_codes_render_without_decimal_point() {
        assert_eq!(Cell::Number(355030.0).as_text(), "355030");
        assert_eq!(Cell::Number(3.5).as_text(), "3.5");
    }
}
