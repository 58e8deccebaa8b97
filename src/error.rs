/// Failure to turn a CSV source into a `Dataset`.
///
/// This is the only failure of the render pipeline. It is never recovered:
/// the caller aborts before any heading or chart is produced.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source could not be opened or read.
    #[error("failed to read {path}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV, e.g. a row with a different column count than the header.
    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    /// The source has no header row at all.
    #[error("missing header row")]
    MissingHeader,

    /// A reserved column (`ticker` or `group`) is absent from the header.
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// Invalid or unreadable chart configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
