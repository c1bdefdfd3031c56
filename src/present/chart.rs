use thiserror::Error;

/// Bucket count for histograms.
pub const HISTOGRAM_BUCKETS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Line, ChartKind::Histogram];

    pub fn next(self) -> Self {
        match self {
            ChartKind::Bar => ChartKind::Line,
            ChartKind::Line => ChartKind::Histogram,
            ChartKind::Histogram => ChartKind::Bar,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Histogram => "Histogram",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisualizationUnavailable {
    #[error("No numerical columns found for visualization.")]
    NoNumericColumns,
    #[error("Column '{0}' is not a numerical column of the result.")]
    UnknownColumn(String),
    #[error("Selected column is empty.")]
    EmptyColumn(String),
    #[error("Column '{0}' holds infinite values and cannot be binned.")]
    NonFinite(String),
}

/// Half-open value range `[lower, upper)`; the last bucket also holds `upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// One bar per non-null row, keyed by row index.
    Bar { column: String, points: Vec<(usize, f64)> },
    /// Values in row order.
    Line { column: String, points: Vec<(usize, f64)> },
    Histogram { column: String, buckets: Vec<Bucket> },
}

impl Chart {
    /// Builds a chart from `(row index, value)` pairs of one column.
    pub(crate) fn build(
        kind: ChartKind,
        column: &str,
        points: Vec<(usize, f64)>,
    ) -> Result<Self, VisualizationUnavailable> {
        if points.is_empty() {
            return Err(VisualizationUnavailable::EmptyColumn(column.to_string()));
        }

        let column = column.to_string();
        Ok(match kind {
            ChartKind::Bar => Chart::Bar { column, points },
            ChartKind::Line => Chart::Line { column, points },
            ChartKind::Histogram => {
                let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(VisualizationUnavailable::NonFinite(column));
                }
                Chart::Histogram {
                    column,
                    buckets: histogram(&values, HISTOGRAM_BUCKETS),
                }
            }
        })
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Chart::Bar { .. } => ChartKind::Bar,
            Chart::Line { .. } => ChartKind::Line,
            Chart::Histogram { .. } => ChartKind::Histogram,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Chart::Bar { column, .. } | Chart::Line { column, .. } | Chart::Histogram { column, .. } => column,
        }
    }
}

/// Equal-width buckets spanning `[min, max]` of `values`.
///
/// A constant column spans `[v - 0.5, v + 0.5]`. Only finite values are
/// counted.
pub fn histogram(values: &[f64], bucket_count: usize) -> Vec<Bucket> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bucket_count == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bucket_count as f64;

    let mut buckets: Vec<Bucket> = (0..bucket_count)
        .map(|i| Bucket {
            lower: min + width * i as f64,
            upper: if i + 1 == bucket_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for v in finite {
        let index = (((v - min) / width).floor() as usize).min(bucket_count - 1);
        buckets[index].count += 1;
    }

    buckets
}
