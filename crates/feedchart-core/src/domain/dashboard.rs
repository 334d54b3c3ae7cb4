//! In-process charting layer: one chart per metric.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use super::category::{Category, Metric};
use super::chart::{Chart, ChartSummary};
use super::series::RetentionPolicy;
use crate::ports::{ChartError, ChartSink};

/// The set of charts a listener feeds.
///
/// Owns every series registry. Ownership moves into the listener task while
/// it runs and comes back when the listener finishes.
#[derive(Debug, Clone)]
pub struct Dashboard {
    charts: Vec<Chart>,
}

impl Dashboard {
    /// Create a dashboard with one chart per metric, all sharing `retention`.
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            charts: Metric::ALL
                .iter()
                .map(|&metric| Chart::new(metric, retention))
                .collect(),
        }
    }

    pub fn chart(&self, metric: Metric) -> &Chart {
        // Metric::ALL order matches construction order
        &self.charts[Self::index(metric)]
    }

    fn chart_mut(&mut self, metric: Metric) -> &mut Chart {
        &mut self.charts[Self::index(metric)]
    }

    const fn index(metric: Metric) -> usize {
        match metric {
            Metric::Cpu => 0,
            Metric::Mem => 1,
        }
    }

    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.charts.iter()
    }

    /// Total number of series across all charts.
    pub fn series_count(&self) -> usize {
        self.charts.iter().map(|c| c.registry().len()).sum()
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            charts: self.charts.iter().map(Chart::summary).collect(),
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(RetentionPolicy::unbounded())
    }
}

impl ChartSink for Dashboard {
    fn has_series(&self, metric: Metric, category: &Category) -> bool {
        self.chart(metric).registry().contains(category)
    }

    fn add_series(&mut self, metric: Metric, category: &Category) {
        self.chart_mut(metric).registry_mut().ensure(category);
    }

    fn append(
        &mut self,
        metric: Metric,
        category: &Category,
        at: DateTime<Utc>,
        value: f64,
    ) -> Result<(), ChartError> {
        let chart = self.chart_mut(metric);
        let retention = *chart.retention();
        let series = chart.registry_mut().get_mut(category).ok_or_else(|| {
            ChartError::UnknownSeries {
                metric,
                category: category.clone(),
            }
        })?;

        series.append(at, value);
        if !retention.is_unbounded() {
            let trimmed = series.apply_retention(&retention);
            if trimmed > 0 {
                series.reset_bounds();
                trace!(%metric, %category, trimmed, "Retention trimmed points");
            }
        }
        Ok(())
    }
}

/// Serializable snapshot of the whole dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub charts: Vec<ChartSummary>,
}
