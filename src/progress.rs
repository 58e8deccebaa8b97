use crate::config::ChartConfig;
use crate::file_processing;
use crate::page;

use rayon::prelude::*;

/// Outcome of a render run over one or more CSV files.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub pages: usize,
    pub charts: usize,
    pub failed: Vec<(std::path::PathBuf, String)>,
}

/// Renders `input` into `output`.
///
/// * A file input writes one page to `output`, or to `<output>/<stem>.html`
///   when `output` is an existing directory.
/// * A directory input renders every `*.csv` in it to `<output>/<stem>.html`.
///   Files are processed in parallel on the current rayon pool with a
///   progress bar; each page is still built sequentially.
///
/// # Returns
/// * `anyhow::Result<RenderReport>` - Counts plus per-file failures in directory mode.
///
/// # Errors
/// * A single-file load or write failure.
/// * Directory listing or output directory creation failures.
pub fn process_files<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    input: P,
    output: Q,
    config: &ChartConfig,
    title: &str,
) -> anyhow::Result<RenderReport> {
    let input = input.as_ref();
    let output = output.as_ref();

    if input.is_file() {
        let target = if output.is_dir() {
            file_processing::html_path_for(input, output)?
        } else {
            output.to_path_buf()
        };
        file_processing::ensure_parent_dir_exist(&target)?;
        let charts = page::render_file(input, &target, config, title)?;
        return anyhow::Ok(RenderReport {
            pages: 1,
            charts,
            failed: Vec::new(),
        });
    }

    let files = file_processing::files_with_extension(input, "csv")?;
    if files.is_empty() {
        tracing::warn!(input = %input.display(), "no CSV files found");
        return anyhow::Ok(RenderReport::default());
    }
    std::fs::create_dir_all(output)?;

    let pb = indicatif::ProgressBar::new(files.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?
        .progress_chars("##-"),
    );

    let results: Vec<(std::path::PathBuf, anyhow::Result<usize>)> = files
        .par_iter()
        .map(|path| {
            let result = file_processing::html_path_for(path, output)
                .and_then(|target| page::render_file(path, &target, config, title));
            pb.inc(1);
            (path.clone(), result)
        })
        .collect();
    pb.finish_with_message("done");

    let mut report = RenderReport::default();
    for (path, result) in results {
        match result {
            Ok(charts) => {
                report.pages += 1;
                report.charts += charts;
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "render failed");
                report.failed.push((path, format!("{:#}", e)));
            }
        }
    }

    anyhow::Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "ticker,group,ok,error\n\
                       A,2024-01-01 03:00:00,5,1\n\
                       B,2024-01-01 03:00:00,1,0\n";

    #[test]
    fn single_file_into_directory_uses_stem() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dash.csv");
        std::fs::write(&input, CSV).unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let report = process_files(&input, &out, &ChartConfig::default(), "t").unwrap();
        assert_eq!(report.pages, 1);
        assert_eq!(report.charts, 2);
        assert!(out.join("dash.html").is_file());
    }

    #[test]
    fn directory_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("good.csv"), CSV).unwrap();
        std::fs::write(input.join("bad.csv"), "ticker,x\nA,1\n").unwrap();
        let out = dir.path().join("out");

        let report = process_files(&input, &out, &ChartConfig::default(), "t").unwrap();
        assert_eq!(report.pages, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(out.join("good.html").is_file());
        assert!(!out.join("bad.html").exists());
    }
}
