use std::fmt::Write;

use crate::chart::{self, Container};
use crate::config::ChartConfig;
use crate::dataset::Dataset;
use crate::error::LoadError;

/// A heading followed by the container holding that symbol's chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub container: Container,
}

/// The whole dashboard: one section per symbol, in sorted symbol order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    sections: Vec<Section>,
}

impl Page {
    /// Renders every symbol of `dataset` into its own fresh container.
    pub fn build(dataset: &Dataset, config: &ChartConfig) -> Self {
        let mut page = Page::default();
        for symbol in dataset.symbols() {
            let mut container = Container::new();
            chart::render(&mut container, dataset, &symbol, config);
            page.sections.push(Section {
                heading: symbol,
                container,
            });
        }
        page
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Serializes the page as a standalone HTML document.
    pub fn to_html(&self, title: &str) -> String {
        let mut html = String::with_capacity(64 * 1024);
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut html, title);
        html
    }

    fn write_html<W: Write>(&self, out: &mut W, title: &str) -> std::fmt::Result {
        write!(
            out,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 8px; }}
h2 {{ font-size: 14px; margin: 12px 0 2px 0; }}
</style>
</head>
<body>
"#,
            title = chart::escape_html(title)
        )?;
        for section in &self.sections {
            writeln!(out, "<h2>{}</h2>", chart::escape_html(&section.heading))?;
            writeln!(out, "<div>")?;
            for drawing in section.container.charts() {
                drawing.write_svg(out)?;
            }
            writeln!(out, "</div>")?;
        }
        write!(out, "</body>\n</html>\n")
    }
}

/// Loads `input`, renders every symbol and writes the page to `output`.
///
/// Loading happens before anything is rendered or written: when it fails the
/// output file is left untouched.
///
/// # Returns
/// * `anyhow::Result<usize>` - Number of charts written.
pub fn render_file<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    input: P,
    output: Q,
    config: &ChartConfig,
    title: &str,
) -> anyhow::Result<usize> {
    let dataset = load_for_render(input.as_ref())?;
    let page = Page::build(&dataset, config);
    std::fs::write(output.as_ref(), page.to_html(title))?;
    tracing::info!(
        input = %input.as_ref().display(),
        output = %output.as_ref().display(),
        charts = page.sections.len(),
        "page written"
    );
    anyhow::Ok(page.sections.len())
}

fn load_for_render(input: &std::path::Path) -> Result<Dataset, LoadError> {
    Dataset::load(input).inspect_err(|e| {
        tracing::error!(input = %input.display(), error = %e, "load failed, nothing rendered");
    })
}
