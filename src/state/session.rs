//! Session-scoped dataset store and query layer.
//!
//! One `DashboardSession` lives for the duration of a user session. It owns
//! the catalog, the source-fetch collaborator, and the dataset cache: each
//! key is fetched and normalized at most once, entries are immutable after
//! construction, and a failed load caches nothing. The session returns plain
//! data structures only; rendering belongs to whatever consumes them.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::data::catalog::Catalog;
use crate::data::dataset::{Dataset, Municipality};
use crate::data::loader::SourceFetch;
use crate::error::{DashResult, DashboardError};
use crate::processing::series::{build_series, DateRange, TimePoint};
use crate::processing::statistics::SummaryStats;

/// Emitted after a completed load, for the success notification.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub key: String,
    pub display_name: String,
    pub municipality_count: usize,
}

/// A query against a loaded variable for one municipality.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub variable: String,
    pub municipality_code: String,
    pub range: Option<DateRange>,
}

/// One assembled series plus its statistics. `stats` is `None` when the
/// series has no points (a composite part can be empty while its sibling
/// still has data).
#[derive(Debug, Clone)]
pub struct SeriesReport {
    pub label: String,
    pub points: Vec<TimePoint>,
    pub stats: Option<SummaryStats>,
}

/// Everything the presentation layer needs to render one completed query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub municipality_name: String,
    pub series: Vec<SeriesReport>,
}

pub struct DashboardSession<F: SourceFetch> {
    catalog: Catalog,
    fetch: F,
    cache: HashMap<String, Dataset>,
}

impl<F: SourceFetch> DashboardSession<F> {
    pub fn new(catalog: Catalog, fetch: F) -> Self {
        Self {
            catalog,
            fetch,
            cache: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Load and normalize the dataset for `key`, or reuse the cached one.
    /// Loading an already-cached key never touches the source again.
    pub fn load(&mut self, key: &str) -> DashResult<LoadSummary> {
        if let Some(dataset) = self.cache.get(key) {
            return Ok(self.summarize(key, dataset));
        }

        let source = self.catalog.source(key)?;
        let rows = match self.fetch.fetch(key, &source.file) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(key, error = %e, "dataset load failed");
                return Err(e);
            }
        };
        let dataset = Dataset::from_rows(key, source.schema, &rows)?;

        info!(
            key,
            municipalities = dataset.municipalities.len(),
            date_columns = dataset.date_columns.len(),
            "dataset loaded"
        );
        let summary = self.summarize(key, &dataset);
        self.cache.insert(key.to_string(), dataset);
        Ok(summary)
    }

    fn summarize(&self, key: &str, dataset: &Dataset) -> LoadSummary {
        LoadSummary {
            key: key.to_string(),
            display_name: self.catalog.display_name(key).to_string(),
            municipality_count: dataset.municipalities.len(),
        }
    }

    /// The cached dataset for `key`, if it has been loaded.
    pub fn dataset(&self, key: &str) -> Option<&Dataset> {
        self.cache.get(key)
    }

    /// Municipalities of a loaded dataset matching a search term, sorted by
    /// name. `None` until the dataset has been loaded.
    pub fn search_municipalities(&self, key: &str, term: &str) -> Option<Vec<&Municipality>> {
        Some(self.cache.get(key)?.search(term))
    }

    /// Run a query: load whatever the variable needs, assemble one series
    /// per backing dataset, and compute per-series statistics.
    pub fn query(&mut self, request: &QueryRequest) -> DashResult<QueryResult> {
        if let Some(range) = &request.range {
            range.validate()?;
        }

        let keys = self.catalog.resolve(&request.variable)?;
        for key in &keys {
            self.load(key)?;
        }

        let mut series = Vec::new();
        let mut municipality_name: Option<String> = None;

        for key in &keys {
            let Some(dataset) = self.cache.get(key) else {
                continue;
            };
            let Some(municipality) = dataset.municipality_by_code(&request.municipality_code)
            else {
                continue;
            };

            let points = build_series(dataset, municipality, request.range.as_ref());
            let name = if municipality.name.is_empty() {
                municipality.code.clone()
            } else {
                municipality.name.clone()
            };
            municipality_name.get_or_insert_with(|| name.clone());

            let values: Vec<f64> = points.iter().map(|p| p.value).collect();
            series.push(SeriesReport {
                label: format!("{} — {}", self.catalog.display_name(key), name),
                stats: SummaryStats::compute(&values),
                points,
            });
        }

        // Absent from every backing dataset: a composite still succeeds when
        // the municipality appears in at least one part.
        if series.is_empty() {
            return Err(DashboardError::EntityNotFound(
                request.municipality_code.clone(),
            ));
        }

        let total_points: usize = series.iter().map(|s| s.points.len()).sum();
        if total_points == 0 {
            return Err(DashboardError::NoDataInRange);
        }

        info!(
            variable = request.variable,
            municipality = request.municipality_code,
            series = series.len(),
            points = total_points,
            "query assembled"
        );
        Ok(QueryResult {
            municipality_name: municipality_name.unwrap_or_default(),
            series,
        })
    }
}
