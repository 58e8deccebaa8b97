use anyhow::Context;
use feed_dash::{cli, config, progress, summary, utils};
use tracing_subscriber::EnvFilter;

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments and initialises logging.
/// 2. Validates input/output paths.
/// 3. Runs `render` (CSV to HTML charts) or `summarize` (bar logs to CSV).
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let total_start = std::time::Instant::now();
    match cli::Args::parse() {
        cli::Args::Render(args) => run_render(args)?,
        cli::Args::Summarize(args) => run_summarize(args)?,
    }

    println!(
        "✅ Completed in {:?} seconds",
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn load_config(args: &cli::RenderArgs) -> anyhow::Result<config::ChartConfig> {
    let mut chart_config = match &args.config {
        Some(path) => config::ChartConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => config::ChartConfig::default(),
    };
    if let Some(width) = args.width {
        chart_config.width = width;
    }
    if let Some(height) = args.height {
        chart_config.height = height;
    }
    if let Some(y_max) = args.y_max {
        chart_config.y_max = y_max;
    }
    chart_config.validate()?;
    Ok(chart_config)
}

fn run_render(args: cli::RenderArgs) -> anyhow::Result<()> {
    feed_dash::file_processing::check_path(&args.input)?;
    let chart_config = load_config(&args)?;
    let threads = utils::effective_threads(args.threads)?;
    println!("Start rendering...");
    println!("🚀 Using {} thread(s)", threads);

    let report = if args.threads.is_some() {
        let local_pool = utils::configure_thread_pool(threads)?;
        local_pool.install(|| {
            progress::process_files(&args.input, &args.output, &chart_config, &args.title)
        })
    } else {
        progress::process_files(&args.input, &args.output, &chart_config, &args.title)
    }
    .with_context(|| format!("rendering {}", args.input.display()))?;

    println!(
        "📈 Rendered {} chart(s) into {} page(s)",
        report.charts, report.pages
    );
    if !report.failed.is_empty() {
        for (path, error) in &report.failed {
            eprintln!("⚠️ {}: {}", path.display(), error);
        }
        anyhow::bail!("{} file(s) failed to render", report.failed.len());
    }
    Ok(())
}

fn run_summarize(args: cli::SummarizeArgs) -> anyhow::Result<()> {
    feed_dash::file_processing::check_path(&args.input)?;
    feed_dash::file_processing::ensure_parent_dir_exist(&args.output)?;
    println!("Start summarizing...");
    let instruments = summary::summarize_dir(&args.input, &args.output, args.end, args.hours)
        .with_context(|| format!("summarizing {}", args.input.display()))?;
    println!(
        "📄 Summarized {} instrument(s) into {}",
        instruments,
        args.output.display()
    );
    Ok(())
}
