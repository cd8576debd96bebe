//! Series assembly: turning a municipality's date-indexed values into an
//! ordered time series, optionally bounded by an inclusive date range.

use serde::Serialize;

use crate::data::dataset::{Dataset, Municipality};
use crate::data::datetime::{parse_header_date, MonthDate};
use crate::error::{DashResult, DashboardError};

/// One chart-ready observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: MonthDate,
    pub value: f64,
}

/// Inclusive month range; either bound may be open.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<MonthDate>,
    pub end: Option<MonthDate>,
}

impl DateRange {
    pub fn new(start: Option<MonthDate>, end: Option<MonthDate>) -> Self {
        Self { start, end }
    }

    pub fn validate(&self) -> DashResult<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(DashboardError::InvalidRange { start, end });
            }
        }
        Ok(())
    }

    pub fn contains(&self, date: MonthDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Assemble the ordered series for one municipality.
///
/// Headers that fail date parsing are skipped silently, as are null values;
/// both are expected in real sheets and must never abort a query. Points are
/// sorted ascending by date with a stable sort, and equal dates are kept as
/// duplicates for the caller to resolve.
pub fn build_series(
    dataset: &Dataset,
    municipality: &Municipality,
    range: Option<&DateRange>,
) -> Vec<TimePoint> {
    let mut points: Vec<TimePoint> = dataset
        .date_columns
        .iter()
        .zip(&municipality.values)
        .filter_map(|(header, value)| {
            let date = parse_header_date(header)?;
            if let Some(range) = range {
                if !range.contains(date) {
                    return None;
                }
            }
            let value = (*value)?;
            Some(TimePoint { date, value })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], values: &[Option<f64>]) -> (Dataset, Municipality) {
        let municipality = Municipality {
            code: "1234".into(),
            sus_code: String::new(),
            name: "Testville".into(),
            values: values.to_vec(),
        };
        let dataset = Dataset {
            date_columns: columns.iter().map(|s| s.to_string()).collect(),
            municipalities: vec![municipality.clone()],
        };
        (dataset, municipality)
    }

    #[test]
    fn points_come_out_sorted_by_date() {
        let (ds, m) = dataset(
            &["2001/Fev", "2000/Dez", "2001/Jan"],
            &[Some(3.0), Some(1.0), Some(2.0)],
        );
        let series = build_series(&ds, &m, None);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn null_values_are_dropped() {
        let (ds, m) = dataset(&["2000/Jan", "2000/Fev"], &[None, Some(4.0)]);
        let series = build_series(&ds, &m, None);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, 4.0);
    }

    #[test]
    fn unparseable_headers_are_skipped_silently() {
        let (ds, m) = dataset(&["NOT_A_DATE", "2000/Jan"], &[Some(9.0), Some(1.0)]);
        let series = build_series(&ds, &m, None);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, MonthDate::new(2000, 1));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let (ds, m) = dataset(
            &["2009/Dez", "2010/Jan", "2011/Jun", "2012/Jan", "2012/Fev"],
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
        );
        let range = DateRange::new(
            Some(MonthDate::new(2010, 1)),
            Some(MonthDate::new(2012, 1)),
        );
        let series = build_series(&ds, &m, Some(&range));
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        // 2009-12 and 2012-02 excluded; the exact bounds included.
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn open_ended_ranges_filter_one_side_only() {
        let (ds, m) = dataset(
            &["2000/Jan", "2005/Jan", "2010/Jan"],
            &[Some(1.0), Some(2.0), Some(3.0)],
        );
        let from_2005 = DateRange::new(Some(MonthDate::new(2005, 1)), None);
        assert_eq!(build_series(&ds, &m, Some(&from_2005)).len(), 2);
        let until_2005 = DateRange::new(None, Some(MonthDate::new(2005, 1)));
        assert_eq!(build_series(&ds, &m, Some(&until_2005)).len(), 2);
    }

    #[test]
    fn inverted_range_is_invalid() {
        let range = DateRange::new(
            Some(MonthDate::new(2012, 1)),
            Some(MonthDate::new(2010, 1)),
        );
        assert!(matches!(
            range.validate(),
            Err(DashboardError::InvalidRange { .. })
        ));
        assert!(DateRange::default().validate().is_ok());
    }
}
