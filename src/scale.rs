//! Pure mappings from data space to drawing space.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Formats accepted for naive bucket keys, tried in order.
const BUCKET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Banded categorical scale: each distinct category gets an equal-width slot.
///
/// Inner and outer padding are both `p`, expressed as a fraction of the step
/// between band starts, and the bands are centered in the extent:
/// `step = extent / (n + p)`, `bandwidth = step * (1 - p)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Distinct categories in first-seen order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Left edge of the band for `category`, or `None` if it is not in the domain.
    pub fn position(&self, category: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|c| c == category)
            .map(|i| self.start + self.step * i as f64)
    }

    /// Horizontal center of the band for `category`.
    pub fn center(&self, category: &str) -> Option<f64> {
        self.position(category).map(|x| x + self.bandwidth / 2.0)
    }
}

/// Builds the horizontal scale over `categories` spread across `[0, extent]`.
///
/// Duplicates in `categories` collapse onto the slot of their first
/// occurrence; ordering is otherwise preserved.
///
/// # Arguments
/// * `categories` - Bucket keys in row order, possibly repeated.
/// * `extent` - Width of the plot area in pixels.
/// * `padding` - Inner and outer padding as a fraction of the step.
///
/// # Returns
/// * `BandScale` - The scale; an empty domain yields a zero-width scale.
pub fn build_categorical_scale<S: AsRef<str>>(
    categories: &[S],
    extent: f64,
    padding: f64,
) -> BandScale {
    let mut domain: Vec<String> = Vec::new();
    for category in categories {
        if !domain.iter().any(|c| c == category.as_ref()) {
            domain.push(category.as_ref().to_string());
        }
    }

    let n = domain.len() as f64;
    let step = extent / (n - padding + 2.0 * padding).max(1.0);
    let start = (extent - step * (n - padding)) / 2.0;
    let bandwidth = step * (1.0 - padding);

    BandScale {
        domain,
        start: if n == 0.0 { 0.0 } else { start },
        step,
        bandwidth: if n == 0.0 { 0.0 } else { bandwidth },
    }
}

/// Linear scale from `[0, domain_max]` onto `[range_start, range_end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_max: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_max: f64, range_start: f64, range_end: f64) -> Self {
        LinearScale {
            domain_max,
            range_start,
            range_end,
        }
    }

    /// Vertical scale for a plot area of `height`: 0 maps to the bottom,
    /// `domain_max` to the top.
    pub fn vertical(domain_max: f64, height: f64) -> Self {
        Self::new(domain_max, height, 0.0)
    }

    pub fn map(&self, value: f64) -> f64 {
        self.range_start + (self.range_end - self.range_start) * (value / self.domain_max)
    }
}

/// Ordinal mapping from subgroup name to color, assigned by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    entries: Vec<(String, String)>,
}

impl ColorMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, color)| color.as_str())
    }
}

/// Assigns `palette[i % palette.len()]` to the subgroup at position `i`.
///
/// An empty palette maps every subgroup to `currentColor`.
pub fn build_color_map<S: AsRef<str>>(subgroups: &[S], palette: &[String]) -> ColorMap {
    let entries = subgroups
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let color = if palette.is_empty() {
                "currentColor".to_string()
            } else {
                palette[i % palette.len()].clone()
            };
            (key.as_ref().to_string(), color)
        })
        .collect();
    ColorMap { entries }
}

/// Hour of day (0..=23) of a bucket key, read as UTC.
///
/// A key without an explicit zone (`2024-01-01 03:00:00`, `2024-01-01T03:00`,
/// `2024-01-01`) is taken as UTC wall-clock time; the host timezone never
/// takes part. A key carrying an RFC 3339 offset is converted to UTC first.
///
/// # Returns
/// * `Option<u32>` - The hour, or `None` if the key is not a recognised timestamp.
pub fn parse_bucket_hour_utc(key: &str) -> Option<u32> {
    let key = key.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(key) {
        return Some(dt.with_timezone(&chrono::Utc).hour());
    }
    for format in BUCKET_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(key, format) {
            return Some(dt.and_utc().hour());
        }
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok().map(|_| 0)
}

/// Axis label for a bucket key: the UTC hour zero-padded to two digits,
/// or the raw key when it does not parse.
pub fn tick_label(key: &str) -> String {
    match parse_bucket_hour_utc(key) {
        Some(hour) => format!("{:02}", hour),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn band_scale_layout() {
        let scale = build_categorical_scale(&["a", "b", "c"], 1000.0, 0.2);
        // step = 1000 / (3 - 0.2 + 0.4) = 312.5
        let step = scale.position("b").unwrap() - scale.position("a").unwrap();
        assert!(close(step, 312.5));
        assert!(close(scale.bandwidth(), 250.0));
        // start = (1000 - 312.5 * 2.8) / 2 = 62.5
        assert!(close(scale.position("a").unwrap(), 62.5));
        assert!(close(scale.position("c").unwrap(), 687.5));
        assert!(close(scale.center("b").unwrap(), 500.0));
        assert_eq!(scale.position("z"), None);
    }

    #[test]
    fn band_scale_single_category_is_centered() {
        let scale = build_categorical_scale(&["only"], 100.0, 0.2);
        // step = 100 / 1.2, band = step * 0.8
        let step = 100.0 / 1.2;
        assert!(close(scale.bandwidth(), step * 0.8));
        assert!(close(scale.center("only").unwrap(), 50.0));
    }

    #[test]
    fn band_scale_collapses_duplicates_onto_first_slot() {
        let scale = build_categorical_scale(&["h1", "h2", "h1"], 100.0, 0.0);
        assert_eq!(scale.domain(), &["h1", "h2"]);
        assert!(close(scale.position("h1").unwrap(), 0.0));
        assert!(close(scale.position("h2").unwrap(), 50.0));
    }

    #[test]
    fn band_scale_empty_domain() {
        let scale = build_categorical_scale::<&str>(&[], 100.0, 0.2);
        assert!(scale.domain().is_empty());
        assert_eq!(scale.bandwidth(), 0.0);
    }

    #[test]
    fn vertical_scale_is_inverted() {
        let y = LinearScale::vertical(60.0, 90.0);
        assert!(close(y.map(0.0), 90.0));
        assert!(close(y.map(60.0), 0.0));
        assert!(close(y.map(30.0), 45.0));
    }

    #[test]
    fn colors_follow_position_and_wrap() {
        let palette: Vec<String> = vec!["#1".into(), "#2".into()];
        let colors = build_color_map(&["a", "b", "c"], &palette);
        assert_eq!(colors.get("a"), Some("#1"));
        assert_eq!(colors.get("b"), Some("#2"));
        assert_eq!(colors.get("c"), Some("#1"));
        assert_eq!(colors.get("d"), None);
    }

    #[test]
    fn bucket_hour_formats() {
        assert_eq!(parse_bucket_hour_utc("2024-01-01 03:00:00"), Some(3));
        assert_eq!(parse_bucket_hour_utc("2024-01-01 03:00"), Some(3));
        assert_eq!(parse_bucket_hour_utc("2024-01-01T23:59:59.5"), Some(23));
        assert_eq!(parse_bucket_hour_utc("2024-01-01T07:00"), Some(7));
        assert_eq!(parse_bucket_hour_utc("2024-01-01"), Some(0));
        assert_eq!(parse_bucket_hour_utc("2024-01-01T03:00:00+02:00"), Some(1));
        assert_eq!(parse_bucket_hour_utc("2024-01-01T03:00:00Z"), Some(3));
        assert_eq!(parse_bucket_hour_utc("yesterday"), None);
    }

    #[test]
    fn tick_labels_are_zero_padded() {
        assert_eq!(tick_label("2024-01-01 03:00:00"), "03");
        assert_eq!(tick_label("2024-01-01 15:00:00"), "15");
        assert_eq!(tick_label("n/a"), "n/a");
    }
}
