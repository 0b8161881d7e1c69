#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use crate::chart::{ChartSpec, RegionCount, Slice};
use plotters::element::Pie;
use plotters::prelude::*;

/// Fill colours, cycled when a chart has more categories
const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// Configuration options for graph generation
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 420,
        }
    }
}

/// Draws a chart as an SVG document
///
/// This is the main entry point for turning an aggregation into a picture.
/// It delegates to the pie, bar or tile-map generator depending on the chart.
///
/// # Arguments
/// * `spec` - Aggregation produced by [`crate::chart::render_chart`]
/// * `options` - Canvas size
///
/// # Returns
/// * `Ok(Some(svg))` for drawable charts, `Ok(None)` for tables and empty
///   results, which are rendered as HTML instead
///
/// # Examples
/// ```
/// use checkin::chart::{ChartSpec, Slice};
/// use checkin::graph::{GraphOptions, render_svg};
///
/// let spec = ChartSpec::Bar {
///     title: "Age Distribution".to_string(),
///     bars: vec![Slice { label: "18-25".to_string(), count: 3 }],
/// };
/// if let Ok(Some(svg)) = render_svg(&spec, &GraphOptions::default()) {
///     assert!(svg.contains("<svg"));
/// }
/// ```
pub fn render_svg(
    spec: &ChartSpec,
    options: &GraphOptions,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match spec {
        ChartSpec::Pie { title, slices } => create_pie_graph(title, slices, options).map(Some),
        ChartSpec::Bar { title, bars } => create_bar_graph(title, bars, options).map(Some),
        ChartSpec::Choropleth { title, regions } => {
            create_tile_map(title, regions, options).map(Some)
        }
        ChartSpec::Table { .. } | ChartSpec::NoData { .. } => Ok(None),
    }
}

/// Creates a pie chart with one wedge per category
///
/// # Implementation Notes
/// * Wedges start at twelve o'clock
/// * Labels carry the raw count, wedges carry the percentage
fn create_pie_graph(
    title: &str,
    slices: &[Slice],
    options: &GraphOptions,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(title, ("sans-serif", 24))?;

        let (width, height) = root.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;

        let sizes: Vec<f64> = slices.iter().map(|s| s.count as f64).collect();
        let colors: Vec<RGBColor> = (0..slices.len())
            .map(|i| PALETTE[i % PALETTE.len()])
            .collect();
        let labels: Vec<String> = slices
            .iter()
            .map(|s| format!("{} ({})", s.label, s.count))
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
        root.draw(&pie)?;

        root.present()?;
    }

    Ok(svg)
}

/// Creates a bar graph with one bar per category, in the given order
fn create_bar_graph(
    title: &str,
    bars: &[Slice],
    options: &GraphOptions,
) -> Result<String, Box<dyn std::error::Error>> {
    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let max_y = bars.iter().map(|b| b.count).max().unwrap_or(0) as u32;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(40)
            .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), 0u32..max_y + 1)?;

        let label_for = |v: &SegmentValue<u32>| -> String {
            match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            }
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Responses")
            .x_label_formatter(&label_for)
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(PALETTE[0].filled())
                .margin(12)
                .data(
                    bars.iter()
                        .enumerate()
                        .map(|(i, b)| (i as u32, b.count as u32)),
                ),
        )?;

        root.present()?;
    }

    Ok(svg)
}

/// Creates a tile map: one square per region, shaded by response count
///
/// # Implementation Notes
/// * Tiles are laid out on a near-square grid in encounter order
/// * Shade runs from light to dark blue relative to the busiest region
fn create_tile_map(
    title: &str,
    regions: &[RegionCount],
    options: &GraphOptions,
) -> Result<String, Box<dyn std::error::Error>> {
    let cols = ((regions.len() as f64).sqrt().ceil() as usize).max(1);
    let rows = regions.len().div_ceil(cols).max(1);
    let max_count = regions.iter().map(|r| r.count).max().unwrap_or(1).max(1);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(title, ("sans-serif", 24))?;
        let grid = root.margin(10, 10, 10, 10).split_evenly((rows, cols));

        for (tile, region) in grid.iter().zip(regions) {
            let ratio = region.count as f64 / max_count as f64;
            let tile = tile.margin(3, 3, 3, 3);
            tile.fill(&shade(ratio))?;

            let text_color = if ratio > 0.5 { WHITE } else { BLACK };
            tile.draw(&Text::new(
                region.code.clone(),
                (8, 8),
                ("sans-serif", 18).into_font().color(&text_color),
            ))?;
            tile.draw(&Text::new(
                format!("{} ({})", region.name, region.count),
                (8, 30),
                ("sans-serif", 13).into_font().color(&text_color),
            ))?;
        }

        root.present()?;
    }

    Ok(svg)
}

// Linear blend between a light and a dark blue
fn shade(ratio: f64) -> RGBColor {
    let ratio = ratio.clamp(0.0, 1.0);
    let light = (222.0, 235.0, 247.0);
    let dark = (8.0, 81.0, 156.0);
    let mix = |a: f64, b: f64| (a + (b - a) * ratio).round() as u8;
    RGBColor(
        mix(light.0, dark.0),
        mix(light.1, dark.1),
        mix(light.2, dark.2),
    )
}
