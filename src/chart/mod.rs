mod builder;
mod export;
mod model;
mod render;

pub use builder::{
    AGE_COLUMN, COUNT_COLUMN, REGION_COLUMN, VALUE_COLUMN, build_charts, grouped_chart,
};
pub use export::export_charts;
pub use model::{ChartSpec, Series};
pub use render::render_png;
