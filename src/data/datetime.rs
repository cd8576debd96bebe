//! Column-header date parsing.
//!
//! Spreadsheet sources encode dates in column headers in several mutually
//! inconsistent ways ("2000/Jan", "2004", "01-1999.", "DS_POP_07", "PREFIX_99").
//! `parse_header_date` tries a fixed list of rules in priority order and
//! returns `None` when nothing matches, so callers can skip non-date columns
//! without aborting a load.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Two-digit coded suffixes (e.g. "DS_POP_07") are offsets from this year.
pub const CODED_YEAR_OFFSET: i32 = 2000;

/// Portuguese month abbreviations as they appear in the source headers.
/// Lookup is case-sensitive, with a first-three-letters fallback for longer
/// spellings ("Janeiro" resolves via "Jan").
const MONTH_ABBREVS: [(&str, u32); 12] = [
    ("Jan", 1),
    ("Fev", 2),
    ("Mar", 3),
    ("Abr", 4),
    ("Mai", 5),
    ("Jun", 6),
    ("Jul", 7),
    ("Ago", 8),
    ("Set", 9),
    ("Out", 10),
    ("Nov", 11),
    ("Dez", 12),
];

static CODED_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)DS[_-]?(?:POP[_-]?)?(\d{2})$").unwrap());

static NUMERIC_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2,4})$").unwrap());

/// A calendar month, always normalized to the first day of the month.
///
/// Derived ordering is year-major, which is exactly the chronological order
/// needed for sorting and range filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthDate {
    pub year: i32,
    pub month: u32,
}

impl MonthDate {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// First day of this month, if the month number is in range.
    pub fn first_day(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthDate {
    type Err = String;

    /// Parses "YYYY-MM" (the CLI/query format, not a header format).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid year in '{s}'"))?;
        let month: u32 = month.parse().map_err(|_| format!("invalid month in '{s}'"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in '{s}'"));
        }
        Ok(MonthDate::new(year, month))
    }
}

/// Parse a raw column header into a canonical month.
///
/// Rules are tried in priority order; the first match wins:
///
/// 1. `"YYYY/Mon"` — slash form with a Portuguese month abbreviation,
///    trailing dots on the abbreviation stripped ("2000/Jan.").
/// 2. `"YYYY"` — exactly four digits, month = January.
/// 3. `"MM-YYYY"` — optional trailing period stripped first ("01-1999.").
///    The month is taken as written and not range-checked.
/// 4. `"DS_POP_NN"` / `"DS_NN"` — coded two-digit suffix, year =
///    `CODED_YEAR_OFFSET + NN`, month = January.
/// 5. Generic numeric suffix — 4 trailing digits are a literal year,
///    2 trailing digits are `CODED_YEAR_OFFSET + NN`; 3 digits never match.
///
/// Returns `None` for anything else.
pub fn parse_header_date(header: &str) -> Option<MonthDate> {
    let header = header.trim();
    if header.is_empty() {
        return None;
    }

    // Rule 1: "2000/Jan" or "2000/Jan."
    if let Some((year_raw, month_raw)) = header.split_once('/') {
        let abbrev = month_raw.trim().trim_end_matches('.');
        if let (Ok(year), Some(month)) = (year_raw.trim().parse::<i32>(), month_from_abbrev(abbrev))
        {
            return Some(MonthDate::new(year, month));
        }
        // A malformed slash header may still satisfy a later rule.
    }

    // Rule 2: bare four-digit year.
    if header.len() == 4 && header.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(year) = header.parse::<i32>() {
            return Some(MonthDate::new(year, 1));
        }
    }

    // Rule 3: "01-1999" or "01-1999."
    if header.contains('-') {
        let clean = header.trim_end_matches('.');
        let parts: Vec<&str> = clean.split('-').map(str::trim).collect();
        if parts.len() == 2 {
            if let (Ok(month), Ok(year)) = (parts[0].parse::<u32>(), parts[1].parse::<i32>()) {
                return Some(MonthDate::new(year, month));
            }
        }
    }

    // Rule 4: coded suffix like "DS_POP_00" or "DS-23".
    if let Some(caps) = CODED_SUFFIX.captures(header) {
        if let Ok(offset) = caps[1].parse::<i32>() {
            return Some(MonthDate::new(CODED_YEAR_OFFSET + offset, 1));
        }
    }

    // Rule 5: generic trailing digits ("PREFIX_1999", "PREFIX99").
    if let Some(caps) = NUMERIC_SUFFIX.captures(header) {
        let digits = &caps[1];
        match digits.len() {
            4 => {
                if let Ok(year) = digits.parse::<i32>() {
                    return Some(MonthDate::new(year, 1));
                }
            }
            2 => {
                if let Ok(offset) = digits.parse::<i32>() {
                    return Some(MonthDate::new(CODED_YEAR_OFFSET + offset, 1));
                }
            }
            _ => {}
        }
    }

    None
}

fn month_from_abbrev(abbrev: &str) -> Option<u32> {
    let lookup = |a: &str| {
        MONTH_ABBREVS
            .iter()
            .find(|(name, _)| *name == a)
            .map(|(_, m)| *m)
    };
    lookup(abbrev).or_else(|| lookup(abbrev.get(..3)?))
}
