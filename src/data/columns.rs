//! Header classification: which column holds the municipality code, which
//! holds the name, and which headers are date columns.
//!
//! Detection is an ordered list of named rules so the precedence of each
//! heuristic stays visible and individually testable. Rules are matched
//! per header, scanning headers left to right; the first header matching
//! any rule of a role wins that role.

use once_cell::sync::Lazy;
use regex::Regex;

/// Role a header can play in a heuristic-schema sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    MunicipalityCode,
    MunicipalityName,
}

struct RoleRule {
    name: &'static str,
    pattern: Lazy<Regex>,
}

macro_rules! rule {
    ($name:literal, $re:literal) => {
        RoleRule {
            name: $name,
            pattern: Lazy::new(|| Regex::new($re).unwrap()),
        }
    };
}

/// Code-column rules, in precedence order ("CD_MUN", "CD MUN", "CD_M", ...).
static CODE_RULES: [RoleRule; 2] = [
    rule!("cd-mun", r"(?i)cd[_\s]*mun"),
    rule!("cd-m", r"(?i)cd[_\s]*m\b"),
];

/// Name-column rules, in precedence order ("MUN", "MUNICIPIO", "NOME", and
/// any word starting with MUN as a last resort).
static NAME_RULES: [RoleRule; 4] = [
    rule!("mun-word", r"(?i)\bMUN\b"),
    rule!("municipio", r"(?i)MUNICIPIO"),
    rule!("nome", r"(?i)NOME"),
    rule!("mun-prefix", r"(?i)\bMUN\w*"),
];

fn find_column(headers: &[String], rules: &[RoleRule]) -> Option<usize> {
    headers
        .iter()
        .position(|h| rules.iter().any(|r| r.pattern.is_match(h)))
}

/// Index of the municipality-code column, if any header matches a code rule.
pub fn find_code_column(headers: &[String]) -> Option<usize> {
    find_column(headers, &CODE_RULES)
}

/// Index of the municipality-name column, if any header matches a name rule.
/// Independent of code detection; a header like "CD_MUNICIPIO" can win both
/// roles, and the caller treats it as a single non-date column.
pub fn find_name_column(headers: &[String]) -> Option<usize> {
    find_column(headers, &NAME_RULES)
}

/// Name of the first rule a header matches for the given role, for
/// diagnostics.
pub fn matching_rule(header: &str, role: ColumnRole) -> Option<&'static str> {
    let rules: &[RoleRule] = match role {
        ColumnRole::MunicipalityCode => &CODE_RULES,
        ColumnRole::MunicipalityName => &NAME_RULES,
    };
    rules
        .iter()
        .find(|r| r.pattern.is_match(header))
        .map(|r| r.name)
}

/// Fixed-schema date-column test: a header is a date column when it contains
/// a slash, is exactly four digits, or contains a dash.
pub fn is_fixed_date_header(header: &str) -> bool {
    header.contains('/')
        || (header.len() == 4 && header.bytes().all(|b| b.is_ascii_digit()))
        || header.contains('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(hs: &[&str]) -> Vec<String> {
        hs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn code_column_variants() {
        assert_eq!(find_code_column(&headers(&["CD_MUN", "NOME", "2000"])), Some(0));
        assert_eq!(find_code_column(&headers(&["NOME", "cd mun", "2000"])), Some(1));
        assert_eq!(find_code_column(&headers(&["CD_M", "NOME"])), Some(0));
        assert_eq!(find_code_column(&headers(&["NOME", "2000"])), None);
    }

    #[test]
    fn name_column_variants() {
        assert_eq!(find_name_column(&headers(&["CD_MUN", "NOME_MUN", "2000"])), Some(1));
        assert_eq!(find_name_column(&headers(&["CD", "Municipio", "2000"])), Some(1));
        assert_eq!(find_name_column(&headers(&["CD", "MUN"])), Some(1));
        assert_eq!(find_name_column(&headers(&["A", "B", "2000"])), None);
    }

    #[test]
    fn first_matching_header_wins() {
        // Header-major precedence: the earlier header wins even if a later
        // header matches an earlier rule.
        assert_eq!(
            find_name_column(&headers(&["MUNICIPIO", "NOME", "2000"])),
            Some(0)
        );
    }

    #[test]
    fn rule_names_are_reported_in_order() {
        assert_eq!(
            matching_rule("CD_MUN", ColumnRole::MunicipalityCode),
            Some("cd-mun")
        );
        assert_eq!(
            matching_rule("CD_M", ColumnRole::MunicipalityCode),
            Some("cd-m")
        );
        assert_eq!(
            matching_rule("NOME_MUN", ColumnRole::MunicipalityName),
            Some("nome")
        );
    }

    #[test]
    fn fixed_date_headers() {
        assert!(is_fixed_date_header("2000/Jan"));
        assert!(is_fixed_date_header("2004"));
        assert!(is_fixed_date_header("01-1999."));
        assert!(!is_fixed_date_header("NOME"));
        assert!(!is_fixed_date_header("20045"));
    }
}
