//! Tabular-to-dataset normalization.
//!
//! A raw sheet arrives as row-major cells with the first row as headers.
//! Two normalization schemas exist:
//!
//! - **Fixed** (disease sheets): columns 0/1/2 are municipality code, SUS
//!   code, and name; date columns are detected among the headers and map
//!   positionally onto the cells from column 3 onward.
//! - **Heuristic** (socio-environmental sheets): code and name columns are
//!   located by header pattern matching, everything from the first
//!   unclaimed column onward is a date column, and missing names are
//!   recovered by scanning the row for plausible text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::columns;
use crate::data::values::{normalize_value, Cell};
use crate::error::{DashResult, DashboardError};

/// Which normalization schema a source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Disease rate sheets with fixed code/SUS-code/name leading columns.
    Disease,
    /// Socio-environmental sheets with heuristically located columns.
    Socio,
}

/// One municipality row. `values` runs parallel to the owning dataset's
/// `date_columns`, so every municipality shares the same columns by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Municipality {
    pub code: String,
    /// Secondary health-system code; only disease sheets carry one.
    pub sus_code: String,
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Municipality {
    /// Display label: "Name (code)", or just the code when the name is
    /// missing.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.code.clone()
        } else {
            format!("{} ({})", self.name, self.code)
        }
    }

    /// Case-insensitive substring search over name, plus plain substring
    /// search over the code.
    pub fn matches_search(&self, term_lower: &str) -> bool {
        self.name.to_lowercase().contains(term_lower) || self.code.contains(term_lower)
    }
}

/// The parsed content of one source sheet: ordered date columns plus every
/// municipality row, in source order.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub date_columns: Vec<String>,
    pub municipalities: Vec<Municipality>,
}

impl Dataset {
    pub fn from_rows(key: &str, schema: SchemaKind, rows: &[Vec<Cell>]) -> DashResult<Self> {
        match schema {
            SchemaKind::Disease => Self::from_fixed_rows(key, rows),
            SchemaKind::Socio => Self::from_heuristic_rows(key, rows),
        }
    }

    /// Fixed schema: code, SUS code, and name in columns 0/1/2; data cells
    /// map 1:1 onto the detected date headers starting at column 3.
    pub fn from_fixed_rows(key: &str, rows: &[Vec<Cell>]) -> DashResult<Self> {
        let headers = header_texts(key, rows)?;

        let date_columns: Vec<String> = headers
            .iter()
            .filter(|h| columns::is_fixed_date_header(h))
            .cloned()
            .collect();

        let mut municipalities = Vec::new();
        for row in &rows[1..] {
            // Rows without the three leading columns carry no usable data.
            if row.len() < 3 {
                continue;
            }
            let values = (0..date_columns.len())
                .map(|idx| row.get(3 + idx).and_then(normalize_value))
                .collect();
            municipalities.push(Municipality {
                code: row[0].as_text(),
                sus_code: row[1].as_text(),
                name: row[2].as_text(),
                values,
            });
        }

        debug!(
            key,
            date_columns = date_columns.len(),
            municipalities = municipalities.len(),
            "normalized fixed-schema sheet"
        );
        Ok(Dataset {
            date_columns,
            municipalities,
        })
    }

    /// Heuristic schema: locate code/name columns by header pattern, treat
    /// every header from the first unclaimed index onward as a date column,
    /// and recover missing names by scanning the row.
    pub fn from_heuristic_rows(key: &str, rows: &[Vec<Cell>]) -> DashResult<Self> {
        let headers = header_texts(key, rows)?;

        let code_col = columns::find_code_column(&headers);
        let name_col = columns::find_name_column(&headers);

        let mut start_col = 0;
        for k in 0..headers.len() {
            if Some(k) != code_col && Some(k) != name_col {
                start_col = k;
                break;
            }
        }
        if start_col == 0 {
            // Unverified heuristic carried over from the original sheets:
            // without a detected code/name column, assume two leading
            // metadata columns rather than misreading column 0 as data.
            // TODO: confirm against a fixture whose data really starts at 0.
            start_col = 2;
        }

        debug!(key, ?code_col, ?name_col, start_col, "classified socio-sheet columns");

        let date_columns: Vec<String> = headers.get(start_col..).unwrap_or(&[]).to_vec();

        let mut municipalities = Vec::new();
        for row in &rows[1..] {
            let code = cell_text_at(row, code_col);
            let mut name = cell_text_at(row, name_col);

            // The name column may be missing, empty, or duplicate the code;
            // look for any other cell that plausibly holds a name.
            if name.is_empty() || name == code {
                for (c, cell) in row.iter().enumerate() {
                    if Some(c) == code_col {
                        continue;
                    }
                    let s = cell.as_text();
                    if is_plausible_name(&s, &code) {
                        name = s;
                        break;
                    }
                }
            }
            if name.is_empty() {
                if let Some(cell) = row.first() {
                    let cand = cell.as_text();
                    if is_plausible_name(&cand, &code) {
                        name = cand;
                    }
                }
            }

            if code.is_empty() && name.is_empty() {
                continue;
            }

            let values = (0..date_columns.len())
                .map(|j| row.get(start_col + j).and_then(normalize_value))
                .collect();
            municipalities.push(Municipality {
                code,
                sus_code: String::new(),
                name,
                values,
            });
        }

        debug!(
            key,
            date_columns = date_columns.len(),
            municipalities = municipalities.len(),
            "normalized heuristic-schema sheet"
        );
        Ok(Dataset {
            date_columns,
            municipalities,
        })
    }

    pub fn municipality_by_code(&self, code: &str) -> Option<&Municipality> {
        self.municipalities.iter().find(|m| m.code == code)
    }

    /// Municipalities sorted by name (case-insensitive), the order the
    /// selection list presents them in.
    pub fn sorted_municipalities(&self) -> Vec<&Municipality> {
        let mut out: Vec<&Municipality> = self.municipalities.iter().collect();
        out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        out
    }

    /// Substring search over municipality names and codes; an empty term
    /// returns everything, sorted.
    pub fn search(&self, term: &str) -> Vec<&Municipality> {
        let term = term.to_lowercase();
        if term.is_empty() {
            return self.sorted_municipalities();
        }
        self.sorted_municipalities()
            .into_iter()
            .filter(|m| m.matches_search(&term))
            .collect()
    }
}

fn header_texts(key: &str, rows: &[Vec<Cell>]) -> DashResult<Vec<String>> {
    let headers = rows
        .first()
        .ok_or_else(|| DashboardError::EmptySource(key.to_string()))?;
    Ok(headers.iter().map(Cell::as_text).collect())
}

fn cell_text_at(row: &[Cell], col: Option<usize>) -> String {
    col.and_then(|c| row.get(c))
        .map(Cell::as_text)
        .unwrap_or_default()
}

/// A plausible municipality name contains at least one letter, is longer
/// than two characters, and differs from the code.
fn is_plausible_name(s: &str, code: &str) -> bool {
    s.chars().any(|c| c.is_alphabetic()) && s.chars().count() > 2 && s != code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    #[test]
    fn fixed_schema_maps_date_cells_positionally() {
        let rows = vec![
            text_row(&["COD", "SUS", "NOME", "2000/Jan", "2000/Fev"]),
            text_row(&["1234", "5", "Testville", "3,5", "4,0"]),
        ];
        let ds = Dataset::from_fixed_rows("tuberculose", &rows).unwrap();
        assert_eq!(ds.date_columns, vec!["2000/Jan", "2000/Fev"]);
        assert_eq!(ds.municipalities.len(), 1);
        let m = &ds.municipalities[0];
        assert_eq!(m.code, "1234");
        assert_eq!(m.sus_code, "5");
        assert_eq!(m.name, "Testville");
        assert_eq!(m.values, vec![Some(3.5), Some(4.0)]);
    }

    #[test]
    fn fixed_schema_skips_short_rows_and_keeps_missing_cells_null() {
        let rows = vec![
            text_row(&["COD", "SUS", "NOME", "2000/Jan", "2000/Fev"]),
            text_row(&["1", "2"]),
            text_row(&["9", "8", "Shorttown", "1,0"]),
        ];
        let ds = Dataset::from_fixed_rows("hepatite", &rows).unwrap();
        assert_eq!(ds.municipalities.len(), 1);
        assert_eq!(ds.municipalities[0].values, vec![Some(1.0), None]);
    }

    #[test]
    fn fixed_schema_unparseable_cells_become_null_not_errors() {
        let rows = vec![
            text_row(&["COD", "SUS", "NOME", "2000/Jan"]),
            text_row(&["1", "2", "Town", "n/a"]),
        ];
        let ds = Dataset::from_fixed_rows("hiv", &rows).unwrap();
        assert_eq!(ds.municipalities[0].values, vec![None]);
    }

    #[test]
    fn empty_sheet_is_a_distinct_error() {
        let err = Dataset::from_fixed_rows("sifilis", &[]).unwrap_err();
        assert!(matches!(err, DashboardError::EmptySource(_)));
    }

    #[test]
    fn heuristic_schema_detects_code_and_name_columns() {
        let rows = vec![
            text_row(&["CD_MUN", "NOME_MUN", "2000", "2001"]),
            text_row(&["355030", "São Paulo", "10,5", "11,0"]),
        ];
        let ds = Dataset::from_heuristic_rows("populacao", &rows).unwrap();
        assert_eq!(ds.date_columns, vec!["2000", "2001"]);
        let m = &ds.municipalities[0];
        assert_eq!(m.code, "355030");
        assert_eq!(m.name, "São Paulo");
        assert_eq!(m.values, vec![Some(10.5), Some(11.0)]);
    }

    #[test]
    fn heuristic_schema_falls_back_to_start_col_two_without_metadata_headers() {
        // No code/name headers at all: the first two columns are assumed to
        // be metadata and everything from index 2 on is data.
        let rows = vec![
            text_row(&["A", "B", "01-1999", "02-1999"]),
            text_row(&["777", "Plaintown", "1,5", "2,5"]),
        ];
        let ds = Dataset::from_heuristic_rows("umidade", &rows).unwrap();
        assert_eq!(ds.date_columns, vec!["01-1999", "02-1999"]);
        let m = &ds.municipalities[0];
        assert_eq!(m.values, vec![Some(1.5), Some(2.5)]);
        // No code column detected, but the row scan recovers the name.
        assert_eq!(m.code, "");
        assert_eq!(m.name, "Plaintown");
    }

    #[test]
    fn heuristic_schema_recovers_name_from_another_column() {
        // The detected name column duplicates the code; the scan finds the
        // real name elsewhere in the row.
        let rows = vec![
            text_row(&["CD_MUN", "MUN", "EXTRA", "2000"]),
            text_row(&["350010", "350010", "Adamantina", "7,0"]),
        ];
        let ds = Dataset::from_heuristic_rows("urbanizacao", &rows).unwrap();
        let m = &ds.municipalities[0];
        assert_eq!(m.code, "350010");
        assert_eq!(m.name, "Adamantina");
    }

    #[test]
    fn heuristic_schema_drops_rows_with_neither_code_nor_name() {
        let rows = vec![
            text_row(&["CD_MUN", "NOME_MUN", "2000"]),
            text_row(&["", "", "5,0"]),
            text_row(&["350020", "Adolfo", "6,0"]),
        ];
        let ds = Dataset::from_heuristic_rows("precipitacao", &rows).unwrap();
        assert_eq!(ds.municipalities.len(), 1);
        assert_eq!(ds.municipalities[0].name, "Adolfo");
    }

    #[test]
    fn numeric_code_cells_render_as_integers() {
        let rows = vec![
            vec![
                Cell::Text("CD_MUN".into()),
                Cell::Text("NOME_MUN".into()),
                Cell::Text("2000".into()),
            ],
            vec![
                Cell::Number(355030.0),
                Cell::Text("São Paulo".into()),
                Cell::Number(12.25),
            ],
        ];
        let ds = Dataset::from_heuristic_rows("densidade", &rows).unwrap();
        assert_eq!(ds.municipalities[0].code, "355030");
        assert_eq!(ds.municipalities[0].values, vec![Some(12.25)]);
    }

    #[test]
    fn search_matches_name_and_code() {
        let rows = vec![
            text_row(&["CD_MUN", "NOME_MUN", "2000"]),
            text_row(&["355030", "São Paulo", "1,0"]),
            text_row(&["350010", "Adamantina", "2,0"]),
        ];
        let ds = Dataset::from_heuristic_rows("populacao", &rows).unwrap();
        assert_eq!(ds.search("paulo").len(), 1);
        assert_eq!(ds.search("3500").len(), 1);
        assert_eq!(ds.search("").len(), 2);
        // Sorted by name: Adamantina before São Paulo.
        assert_eq!(ds.sorted_municipalities()[0].name, "Adamantina");
    }

    #[test]
    fn labels_fall_back_to_the_code() {
        let with_name = Municipality {
            code: "1".into(),
            sus_code: String::new(),
            name: "Town".into(),
            values: vec![],
        };
        let without_name = Municipality {
            code: "2".into(),
            sus_code: String::new(),
            name: String::new(),
            values: vec![],
        };
        assert_eq!(with_name.label(), "Town (1)");
        assert_eq!(without_name.label(), "2");
    }
}
