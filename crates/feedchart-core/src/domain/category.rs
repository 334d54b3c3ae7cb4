//! Category labels and the metric kinds each sample carries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete label distinguishing one data source from another.
///
/// On the wire this is the `color` field of a sample.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// A tracked metric. Each variant owns one chart on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cpu,
    Mem,
}

impl Metric {
    /// All metrics, in chart order.
    pub const ALL: [Self; 2] = [Self::Cpu, Self::Mem];

    /// Short name used in logs and summaries.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Mem => "mem",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_and_ordering() {
        let blue = Category::from("blue");
        let red = Category::new(String::from("red"));
        assert_eq!(blue.to_string(), "blue");
        assert!(blue < red);
        assert_eq!(red.as_str(), "red");
    }

    #[test]
    fn test_metric_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Metric::Cpu).unwrap(), "\"cpu\"");
        assert_eq!(Metric::ALL, [Metric::Cpu, Metric::Mem]);
        assert_eq!(Metric::Mem.to_string(), "mem");
    }
}
