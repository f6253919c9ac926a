/// One value series, aligned index-for-index with the owning chart's
/// category list.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Grouped-bar chart model: one bar group per category, one bar per series
/// within each group. Ephemeral; exists only to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub category_column: String,
    pub metric_column: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.series.is_empty()
    }

    /// Largest value across all series, used to scale the y axis.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0_f64, f64::max)
    }
}
