use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;

use crate::error::{PixReportError, Result};

use super::model::ChartSpec;

const CHART_WIDTH_PX: u32 = 1200;
const CHART_HEIGHT_PX: u32 = 480;

struct ChartStyle;

impl ChartStyle {
    const MARGIN: i32 = 16;
    const CAPTION_FONT_FAMILY: &'static str = "sans-serif";
    const CAPTION_FONT_SIZE: i32 = 28;
    const X_LABEL_AREA_SIZE: u32 = 48;
    const Y_LABEL_AREA_SIZE: u32 = 72;
    const BACKGROUND: RGBColor = WHITE;
    const LEGEND_BORDER: RGBColor = BLACK;
    // Bars of one category group span 80% of the slot, centered.
    const GROUP_FILL: f64 = 0.8;
    const GROUP_OFFSET: f64 = 0.1;

    const fn series_color(index: usize) -> RGBColor {
        const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];
        PALETTE[index % PALETTE.len()]
    }
}

/// Rasterize a grouped bar chart to PNG bytes.
///
/// # Errors
/// Returns a `ChartRender` error if drawing or PNG encoding fails.
pub fn render_png(chart: &ChartSpec) -> Result<Vec<u8>> {
    let width = CHART_WIDTH_PX;
    let height = CHART_HEIGHT_PX;
    let mut rgb_buffer = vec![255_u8; width as usize * height as usize * 3];

    {
        let drawing_area =
            BitMapBackend::with_buffer(&mut rgb_buffer, (width, height)).into_drawing_area();
        drawing_area
            .fill(&ChartStyle::BACKGROUND)
            .map_err(|e| PixReportError::ChartRender(format!("background fill error: {e}")))?;

        // An empty chart still renders as a captioned, empty plot area.
        let x_max = chart.categories.len().max(1) as f64;
        let y_max = chart.max_value().max(1.0) * 1.05;

        let mut area = ChartBuilder::on(&drawing_area)
            .margin(ChartStyle::MARGIN)
            .caption(
                &chart.title,
                (
                    ChartStyle::CAPTION_FONT_FAMILY,
                    ChartStyle::CAPTION_FONT_SIZE,
                ),
            )
            .x_label_area_size(ChartStyle::X_LABEL_AREA_SIZE)
            .y_label_area_size(ChartStyle::Y_LABEL_AREA_SIZE)
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)
            .map_err(|e| PixReportError::ChartRender(format!("chart build error: {e}")))?;

        let categories = chart.categories.clone();
        area.configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len().max(1))
            .x_label_formatter(&move |x: &f64| {
                let idx = x.floor();
                if idx < 0.0 {
                    return String::new();
                }
                categories
                    .get(idx as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .y_desc(chart.metric_column.clone())
            .x_desc(chart.category_column.clone())
            .draw()
            .map_err(|e| PixReportError::ChartRender(format!("mesh draw error: {e}")))?;

        let band = ChartStyle::GROUP_FILL / chart.series.len().max(1) as f64;
        for (series_idx, series) in chart.series.iter().enumerate() {
            let color = ChartStyle::series_color(series_idx);
            let bars = series.values.iter().enumerate().map(|(cat_idx, value)| {
                let x0 = cat_idx as f64 + ChartStyle::GROUP_OFFSET + series_idx as f64 * band;
                let x1 = x0 + band * 0.9;
                Rectangle::new([(x0, 0.0), (x1, *value)], color.filled())
            });

            area.draw_series(bars)
                .map_err(|e| PixReportError::ChartRender(format!("series draw error: {e}")))?
                .label(series.label.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }

        area.configure_series_labels()
            .background_style(ChartStyle::BACKGROUND.mix(0.8))
            .border_style(ChartStyle::LEGEND_BORDER)
            .draw()
            .map_err(|e| PixReportError::ChartRender(format!("legend draw error: {e}")))?;

        drawing_area
            .present()
            .map_err(|e| PixReportError::ChartRender(format!("present error: {e}")))?;
    }

    let rgb_image = RgbImage::from_raw(width, height, rgb_buffer).ok_or_else(|| {
        PixReportError::ChartRender("image buffer conversion failed".to_string())
    })?;
    let mut output = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb_image)
        .write_to(&mut output, ImageFormat::Png)
        .map_err(|e| PixReportError::ChartRender(format!("png encoding error: {e}")))?;

    Ok(output.into_inner())
}
