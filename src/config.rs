use crate::error::ConfigError;

/// Palette used when the config does not override it, one color per subgroup position.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#008800",
    "#40aabd",
    "#cdcdcd",
    "#ff8e3f",
    "#da2ee0",
    "#666666",
];

/// Space reserved around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Margin {
            top: 10.0,
            right: 0.0,
            bottom: 20.0,
            left: 0.0,
        }
    }
}

/// Layout of a single chart.
///
/// Passed explicitly into every render call, so two pages can be rendered
/// with different layouts in the same process.
///
/// # Fields
///
/// * `width`, `height` - Outer size of the SVG drawing, margins included.
/// * `margin` - Space between the drawing border and the plot area.
/// * `padding` - Band padding of the categorical axis, as a fraction of the step.
/// * `y_max` - Upper bound of the fixed vertical domain `[0, y_max]`.
/// * `palette` - Colors assigned to subgroups by position, cycling when exhausted.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub padding: f64,
    pub y_max: f64,
    pub palette: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: 1700.0,
            height: 120.0,
            margin: Margin::default(),
            padding: 0.2,
            y_max: 60.0,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ChartConfig {
    /// Reads a TOML file. Keys absent from the file keep their defaults.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Width of the plot area (outer width minus horizontal margins).
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    /// Height of the plot area (outer height minus vertical margins).
    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Rejects layouts the renderer cannot draw.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let margins = [
            self.margin.top,
            self.margin.right,
            self.margin.bottom,
            self.margin.left,
        ];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(ConfigError::Invalid("margins must be non-negative".to_string()));
        }
        if !(self.inner_width() > 0.0) || !(self.inner_height() > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "margins leave no plot area in a {}x{} chart",
                self.width, self.height
            )));
        }
        if !(0.0..1.0).contains(&self.padding) {
            return Err(ConfigError::Invalid(format!(
                "padding must be in [0, 1), got {}",
                self.padding
            )));
        }
        if !(self.y_max.is_finite() && self.y_max > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "y_max must be positive, got {}",
                self.y_max
            )));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette must not be empty".to_string()));
        }
        Ok(())
    }
}
