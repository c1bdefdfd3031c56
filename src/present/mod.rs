mod chart;
mod render;
mod view;

pub use chart::{Bucket, Chart, ChartKind, VisualizationUnavailable, HISTOGRAM_BUCKETS};
pub use render::{render_chart, render_csv, render_json, render_table, render_view};
pub use view::{present, TableView, View, NO_DATA_MESSAGE};
