//! Charts and their per-category series registries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::category::{Category, Metric};
use super::series::{RetentionPolicy, TimeSeries};

/// Mapping from category to its series on one chart.
///
/// Series are created on first use and live as long as the registry.
#[derive(Debug, Clone, Default)]
pub struct SeriesRegistry {
    series: BTreeMap<Category, TimeSeries>,
}

impl SeriesRegistry {
    pub const fn new() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.series.contains_key(category)
    }

    /// Get the series for `category`, creating it if absent.
    ///
    /// The flag is `true` when this call created the series.
    pub fn ensure(&mut self, category: &Category) -> (&mut TimeSeries, bool) {
        let created = !self.series.contains_key(category);
        let series = self.series.entry(category.clone()).or_default();
        (series, created)
    }

    pub fn get(&self, category: &Category) -> Option<&TimeSeries> {
        self.series.get(category)
    }

    pub fn get_mut(&mut self, category: &Category) -> Option<&mut TimeSeries> {
        self.series.get_mut(category)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &TimeSeries)> {
        self.series.iter()
    }
}

/// One chart: a metric, its series and how long they keep points.
#[derive(Debug, Clone)]
pub struct Chart {
    metric: Metric,
    retention: RetentionPolicy,
    registry: SeriesRegistry,
}

impl Chart {
    pub const fn new(metric: Metric, retention: RetentionPolicy) -> Self {
        Self {
            metric,
            retention,
            registry: SeriesRegistry::new(),
        }
    }

    pub const fn metric(&self) -> Metric {
        self.metric
    }

    pub const fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }

    pub const fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub const fn registry_mut(&mut self) -> &mut SeriesRegistry {
        &mut self.registry
    }

    /// Snapshot of every series on this chart.
    pub fn summary(&self) -> ChartSummary {
        ChartSummary {
            metric: self.metric,
            series: self
                .registry
                .iter()
                .map(|(category, series)| SeriesSummary::of(category, series))
                .collect(),
        }
    }
}

/// Per-series figures for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub category: Category,
    pub points: usize,
    pub first_at: Option<DateTime<Utc>>,
    pub last_at: Option<DateTime<Utc>>,
    pub last_value: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl SeriesSummary {
    pub fn of(category: &Category, series: &TimeSeries) -> Self {
        Self {
            category: category.clone(),
            points: series.len(),
            first_at: series.first().map(|p| p.at),
            last_at: series.latest().map(|p| p.at),
            last_value: series.latest().map(|p| p.value),
            min_value: series.min_value(),
            max_value: series.max_value(),
        }
    }
}

/// Summary of one chart, series ordered by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub metric: Metric,
    pub series: Vec<SeriesSummary>,
}
