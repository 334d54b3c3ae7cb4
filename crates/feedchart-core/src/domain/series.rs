//! Time series storage for a single category on a single chart.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single `(instant, value)` point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub at: DateTime<Utc>,
    pub value: f64,
}

/// How many points a series keeps.
///
/// Both limits are optional. Retention only ever trims points; the newest
/// point always survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Drop points older than `newest - max_age`.
    pub max_age: Option<Duration>,
    /// Keep at most this many points.
    pub max_points: Option<usize>,
}

impl RetentionPolicy {
    /// Keep everything.
    pub const fn unbounded() -> Self {
        Self {
            max_age: None,
            max_points: None,
        }
    }

    pub const fn is_unbounded(&self) -> bool {
        self.max_age.is_none() && self.max_points.is_none()
    }
}

/// Ordered sequence of points, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<Point>,
    min_value: Option<f64>,
    max_value: Option<f64>,
}

impl TimeSeries {
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            min_value: None,
            max_value: None,
        }
    }

    /// Append a point, keeping the series ordered by time.
    ///
    /// A point at an instant already present replaces that point's value.
    pub fn append(&mut self, at: DateTime<Utc>, value: f64) {
        // Appends are almost always in order, so search from the back.
        let idx = self.points.iter().rposition(|p| p.at <= at);
        match idx {
            Some(i) if self.points[i].at == at => {
                // The old value may have been a bound.
                self.points[i].value = value;
                self.reset_bounds();
                return;
            }
            Some(i) => self.points.insert(i + 1, Point { at, value }),
            None => self.points.insert(0, Point { at, value }),
        }

        self.min_value = Some(self.min_value.map_or(value, |m| m.min(value)));
        self.max_value = Some(self.max_value.map_or(value, |m| m.max(value)));
    }

    /// Trim points according to `policy`. Returns how many were removed.
    pub fn apply_retention(&mut self, policy: &RetentionPolicy) -> usize {
        let Some(newest) = self.points.last().map(|p| p.at) else {
            return 0;
        };
        let before = self.points.len();

        if let Some(max_age) = policy.max_age {
            if let Ok(age) = chrono::Duration::from_std(max_age) {
                if let Some(cutoff) = newest.checked_sub_signed(age) {
                    let stale = self.points.partition_point(|p| p.at < cutoff);
                    // partition_point never covers the newest point, which is >= cutoff
                    self.points.drain(..stale);
                }
            }
        }

        if let Some(max_points) = policy.max_points {
            let max_points = max_points.max(1);
            if self.points.len() > max_points {
                let excess = self.points.len() - max_points;
                self.points.drain(..excess);
            }
        }

        before - self.points.len()
    }

    /// Recompute min/max from the retained points.
    pub fn reset_bounds(&mut self) {
        self.min_value = self.points.iter().map(|p| p.value).reduce(f64::min);
        self.max_value = self.points.iter().map(|p| p.value).reduce(f64::max);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn latest(&self) -> Option<&Point> {
        self.points.last()
    }

    pub const fn min_value(&self) -> Option<f64> {
        self.min_value
    }

    pub const fn max_value(&self) -> Option<f64> {
        self.max_value
    }
}
