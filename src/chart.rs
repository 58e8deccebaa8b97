//! Stacked bar chart for a single symbol.
//!
//! `render` derives the scales, colors and stack from the dataset, then
//! appends a [`Chart`] to a [`Container`]. Nothing derived here outlives the
//! call except the finished drawing.

use std::fmt::Write;

use crate::config::ChartConfig;
use crate::dataset::Dataset;
use crate::scale;
use crate::stack;

/// A filled rectangle in plot-area coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub group: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// All rectangles of one subgroup, sharing a fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub key: String,
    pub fill: String,
    pub rects: Vec<Rect>,
}

/// One labelled tick on the horizontal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub x: f64,
    pub label: String,
}

/// A finished drawing: outer size, plot-area offset, axis and bar layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub ticks: Vec<Tick>,
    pub layers: Vec<Layer>,
}

/// Holds the drawings rendered into it, in append order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    charts: Vec<Chart>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn append(&mut self, chart: Chart) {
        self.charts.push(chart);
    }
}

/// Draws the stacked bars of `symbol` and appends them to `container`.
///
/// Always appends; rendering twice into the same container leaves two charts.
/// Missing data never fails the render: absent magnitudes produce zero-height
/// segments and a symbol with no rows produces an empty chart.
pub fn render(container: &mut Container, dataset: &Dataset, symbol: &str, config: &ChartConfig) {
    container.append(build_chart(dataset, symbol, config));
}

/// Computes the chart of `symbol` without appending it anywhere.
pub fn build_chart(dataset: &Dataset, symbol: &str, config: &ChartConfig) -> Chart {
    let subdata = dataset.rows_for(symbol);
    let groups: Vec<&str> = subdata.iter().map(|row| row.group.as_str()).collect();

    let plot_width = config.inner_width();
    let plot_height = config.inner_height();

    let x = scale::build_categorical_scale(&groups, plot_width, config.padding);
    let y = scale::LinearScale::vertical(config.y_max, plot_height);
    let colors = scale::build_color_map(dataset.subgroups(), &config.palette);
    let stacked = stack::build_stack(dataset.subgroups(), &subdata);

    let ticks = x
        .domain()
        .iter()
        .filter_map(|category| {
            x.center(category).map(|cx| Tick {
                x: cx,
                label: scale::tick_label(category),
            })
        })
        .collect();

    let layers = stacked
        .into_iter()
        .map(|series| {
            let fill = colors
                .get(&series.key)
                .unwrap_or("currentColor")
                .to_string();
            let rects = series
                .points
                .into_iter()
                .filter_map(|point| {
                    let left = x.position(&point.group)?;
                    let top = y.map(point.topline);
                    let height = (y.map(point.baseline) - top).max(0.0);
                    Some(Rect {
                        group: point.group,
                        x: left,
                        y: top,
                        width: x.bandwidth(),
                        height,
                    })
                })
                .collect();
            Layer {
                key: series.key,
                fill,
                rects,
            }
        })
        .collect();

    tracing::debug!(symbol, rows = subdata.len(), "chart built");

    Chart {
        width: config.width,
        height: config.height,
        offset_x: config.margin.left,
        offset_y: config.margin.top,
        plot_width,
        plot_height,
        ticks,
        layers,
    }
}

impl Chart {
    /// Total stacked height in pixels of all segments drawn for `group`.
    pub fn stacked_height(&self, group: &str) -> f64 {
        self.layers
            .iter()
            .flat_map(|layer| layer.rects.iter())
            .filter(|rect| rect.group == group)
            .map(|rect| rect.height)
            .sum()
    }

    /// Number of bars (one per row) drawn by the first layer.
    pub fn bar_count(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.rects.len())
    }

    /// Writes the chart as an `<svg>` element.
    pub fn write_svg<W: Write>(&self, out: &mut W) -> std::fmt::Result {
        writeln!(
            out,
            r#"<svg width="{}" height="{}">"#,
            num(self.width),
            num(self.height)
        )?;
        writeln!(
            out,
            r#"<g transform="translate({},{})">"#,
            num(self.offset_x),
            num(self.offset_y)
        )?;

        writeln!(
            out,
            concat!(
                r#"<g class="axis" transform="translate(0,{})" fill="none" "#,
                r#"font-size="10" font-family="sans-serif" text-anchor="middle">"#,
            ),
            num(self.plot_height)
        )?;
        writeln!(
            out,
            r#"<path class="domain" stroke="currentColor" d="M0,0H{}"/>"#,
            num(self.plot_width)
        )?;
        for tick in &self.ticks {
            writeln!(
                out,
                concat!(
                    r#"<g class="tick" transform="translate({},0)">"#,
                    r#"<line stroke="currentColor" y2="6"/>"#,
                    r#"<text fill="currentColor" y="9" dy="0.71em">{}</text></g>"#,
                ),
                num(tick.x),
                escape_html(&tick.label)
            )?;
        }
        writeln!(out, "</g>")?;

        writeln!(out, "<g>")?;
        for layer in &self.layers {
            writeln!(out, r#"<g fill="{}">"#, escape_html(&layer.fill))?;
            for rect in &layer.rects {
                writeln!(
                    out,
                    r#"<rect x="{}" y="{}" height="{}" width="{}"/>"#,
                    num(rect.x),
                    num(rect.y),
                    num(rect.height),
                    num(rect.width)
                )?;
            }
            writeln!(out, "</g>")?;
        }
        writeln!(out, "</g>")?;

        writeln!(out, "</g>")?;
        writeln!(out, "</svg>")
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::with_capacity(4096);
        // Writing into a String cannot fail.
        let _ = self.write_svg(&mut svg);
        svg
    }
}

/// Shortest readable form of a coordinate: integers without a fraction,
/// everything else rounded to three decimals.
fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn single_bar_height_matches_vertical_scale() {
        let data = dataset("ticker,group,x,y\nA,2024-01-01 03:00,10,5\n");
        let chart = build_chart(&data, "A", &ChartConfig::default());
        assert_eq!(chart.ticks.len(), 1);
        assert_eq!(chart.ticks[0].label, "03");
        // 15 of 60 over a 90px plot
        assert!((chart.stacked_height("2024-01-01 03:00") - 22.5).abs() < 1e-9);
        let top = &chart.layers[1].rects[0];
        assert!((top.y - 67.5).abs() < 1e-9);
    }

    #[test]
    fn layers_follow_subgroup_order_and_palette() {
        let data = dataset("ticker,group,ok,closed,error\nA,2024-01-01 03:00,1,2,3\n");
        let chart = build_chart(&data, "A", &ChartConfig::default());
        let fills: Vec<&str> = chart.layers.iter().map(|l| l.fill.as_str()).collect();
        assert_eq!(fills, vec!["#008800", "#40aabd", "#cdcdcd"]);
        let keys: Vec<&str> = chart.layers.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["ok", "closed", "error"]);
    }

    #[test]
    fn bars_only_for_requested_symbol() {
        let data = dataset(
            "ticker,group,x\nA,2024-01-01 01:00,1\nB,2024-01-01 02:00,1\nA,2024-01-01 03:00,1\n",
        );
        let chart = build_chart(&data, "A", &ChartConfig::default());
        assert_eq!(chart.bar_count(), 2);
        let labels: Vec<&str> = chart.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["01", "03"]);
    }

    #[test]
    fn duplicate_buckets_overlap() {
        let data = dataset("ticker,group,x\nA,2024-01-01 01:00,1\nA,2024-01-01 01:00,2\n");
        let chart = build_chart(&data, "A", &ChartConfig::default());
        assert_eq!(chart.bar_count(), 2);
        assert_eq!(chart.ticks.len(), 1);
        let rects = &chart.layers[0].rects;
        assert_eq!(rects[0].x, rects[1].x);
    }

    #[test]
    fn missing_values_draw_zero_height() {
        let data = dataset("ticker,group,x,y\nA,2024-01-01 01:00,,\nA,2024-01-01 02:00,-4,\n");
        let chart = build_chart(&data, "A", &ChartConfig::default());
        for layer in &chart.layers {
            for rect in &layer.rects {
                assert!(rect.height >= 0.0);
                assert_eq!(rect.height, 0.0);
            }
        }
    }

    #[test]
    fn render_appends_instead_of_replacing() {
        let data = dataset("ticker,group,x\nA,2024-01-01 01:00,1\n");
        let config = ChartConfig::default();
        let mut container = Container::new();
        render(&mut container, &data, "A", &config);
        render(&mut container, &data, "A", &config);
        assert_eq!(container.charts().len(), 2);
        assert_eq!(container.charts()[0], container.charts()[1]);
    }

    #[test]
    fn unknown_symbol_gives_empty_chart() {
        let data = dataset("ticker,group,x\nA,2024-01-01 01:00,1\n");
        let chart = build_chart(&data, "Z", &ChartConfig::default());
        assert!(chart.ticks.is_empty());
        assert_eq!(chart.bar_count(), 0);
    }

    #[test]
    fn svg_output_has_expected_elements() {
        let data = dataset("ticker,group,x,y\nA,2024-01-01 03:00,10,5\n");
        let svg = build_chart(&data, "A", &ChartConfig::default()).to_svg();
        assert!(svg.starts_with(r#"<svg width="1700" height="120">"#));
        assert!(svg.contains(r#"<g transform="translate(0,10)">"#));
        assert!(svg.contains(r#"transform="translate(0,90)""#));
        assert!(svg.contains(">03</text>"));
        assert_eq!(svg.matches("<rect ").count(), 2);
        assert!(svg.contains(r##"<g fill="#008800">"##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn num_formatting() {
        assert_eq!(num(90.0), "90");
        assert_eq!(num(67.5), "67.5");
        assert_eq!(num(1.0 / 3.0), "0.333");
        assert_eq!(num(-0.0), "0");
    }
}
