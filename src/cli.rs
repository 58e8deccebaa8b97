/// Arguments of the `render` subcommand.
#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub input: std::path::PathBuf,
    pub output: std::path::PathBuf,
    pub config: Option<std::path::PathBuf>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub y_max: Option<f64>,
    pub threads: Option<usize>,
    pub title: String,
}

/// Arguments of the `summarize` subcommand.
#[derive(Debug, Clone)]
pub struct SummarizeArgs {
    pub input: std::path::PathBuf,
    pub output: std::path::PathBuf,
    pub hours: u32,
    pub end: Option<chrono::NaiveDateTime>,
}

/// Structure representing command-line arguments.
#[derive(Debug, Clone)]
pub enum Args {
    Render(RenderArgs),
    Summarize(SummarizeArgs),
}

/// Command-line arguments parser using Clap.
impl Args {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list (first item is the program name).
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        match matches.subcommand() {
            Some(("summarize", sub)) => Args::Summarize(SummarizeArgs {
                input: path_arg(sub, "input"),
                output: path_arg(sub, "output"),
                hours: sub.get_one::<u32>("hours").copied().unwrap_or(120),
                end: sub.get_one::<chrono::NaiveDateTime>("end").copied(),
            }),
            Some(("render", sub)) => Args::Render(render_args(sub)),
            _ => unreachable!("subcommand is required"),
        }
    }
}

fn render_args(sub: &clap::ArgMatches) -> RenderArgs {
    RenderArgs {
        input: path_arg(sub, "input"),
        output: path_arg(sub, "output"),
        config: sub.get_one::<String>("config").map(std::path::PathBuf::from),
        width: sub.get_one::<f64>("width").copied(),
        height: sub.get_one::<f64>("height").copied(),
        y_max: sub.get_one::<f64>("y_max").copied(),
        threads: sub.get_one::<usize>("threads").copied(),
        title: sub
            .get_one::<String>("title")
            .cloned()
            .unwrap_or_else(|| "Feed status".to_string()),
    }
}

// Required args are enforced by clap before we get here.
fn path_arg(matches: &clap::ArgMatches, id: &str) -> std::path::PathBuf {
    matches
        .get_one::<String>(id)
        .map(std::path::PathBuf::from)
        .unwrap_or_default()
}

fn input_arg(help: &'static str) -> clap::Arg {
    clap::Arg::new("input")
        .short('i')
        .long("input")
        .help(help)
        .required(true)
        .num_args(1)
}

fn output_arg(help: &'static str) -> clap::Arg {
    clap::Arg::new("output")
        .short('o')
        .long("output")
        .help(help)
        .required(true)
        .num_args(1)
}

fn command() -> clap::Command {
    clap::Command::new("feed-dash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render per-ticker stacked bar charts from an hourly status CSV")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            clap::Command::new("render")
                .about("Render CSV file(s) into HTML pages with one SVG chart per ticker")
                .arg(input_arg("Path to a CSV file or a directory of CSV files"))
                .arg(output_arg("Path to the output HTML file, or output directory"))
                .arg(
                    clap::Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(
                            "TOML file with chart layout \
                             (width, height, margin, padding, y_max, palette)",
                        )
                        .num_args(1),
                )
                .arg(
                    clap::Arg::new("width")
                        .long("width")
                        .help("Outer chart width in pixels")
                        .num_args(1)
                        .value_parser(clap::builder::ValueParser::new(parse_f64_positive)),
                )
                .arg(
                    clap::Arg::new("height")
                        .long("height")
                        .help("Outer chart height in pixels")
                        .num_args(1)
                        .value_parser(clap::builder::ValueParser::new(parse_f64_positive)),
                )
                .arg(
                    clap::Arg::new("y_max")
                        .long("y-max")
                        .help("Upper bound of the vertical domain (default: 60)")
                        .num_args(1)
                        .value_parser(clap::builder::ValueParser::new(parse_f64_positive)),
                )
                .arg(
                    clap::Arg::new("threads")
                        .short('t')
                        .long("threads")
                        .help(
                            "Number of threads to use for a directory of CSV files \
                             (default: all available)",
                        )
                        .num_args(1)
                        .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
                )
                .arg(
                    clap::Arg::new("title")
                        .long("title")
                        .help("Title of the generated page")
                        .num_args(1),
                ),
        )
        .subcommand(
            clap::Command::new("summarize")
                .about("Summarize per-instrument JSON-lines bar logs into the hourly status CSV")
                .arg(input_arg("Directory of <ticker>.jsonl bar logs"))
                .arg(output_arg("Path to the CSV file to write"))
                .arg(
                    clap::Arg::new("hours")
                        .long("hours")
                        .help("Look-back window in hours")
                        .num_args(1)
                        .default_value("120")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    clap::Arg::new("end")
                        .long("end")
                        .help(
                            "End of the window, UTC 'YYYY-MM-DD HH:MM:SS' or RFC 3339 \
                             (default: now)",
                        )
                        .num_args(1)
                        .value_parser(clap::builder::ValueParser::new(crate::summary::parse_end)),
                ),
        )
}

/// Validates that the number of threads is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the number of threads.
///
/// # Returns
/// * `Result<usize>` - Validated number of threads.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

fn parse_f64_positive(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err("Must be a positive number".to_string()),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}
