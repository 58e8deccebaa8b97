use crate::dataset::Row;

/// One stacked segment: the interval `[baseline, topline]` of a subgroup in a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct StackPoint {
    pub group: String,
    pub baseline: f64,
    pub topline: f64,
}

impl StackPoint {
    /// Magnitude of the segment, never negative.
    pub fn extent(&self) -> f64 {
        (self.topline - self.baseline).max(0.0)
    }
}

/// All segments of one subgroup, one point per row, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedSeries {
    pub key: String,
    pub points: Vec<StackPoint>,
}

/// Stacks `rows` by subgroup.
///
/// For each row the segment of subgroup `i` starts at the sum of the
/// magnitudes of subgroups `0..i` and ends `magnitude[i]` above that.
/// Absent values count as zero, so every interval is well formed.
///
/// # Arguments
/// * `subgroups` - Subgroup names in stack order.
/// * `rows` - Rows of one symbol; `row.values[i]` belongs to `subgroups[i]`.
///
/// # Returns
/// * `Vec<StackedSeries>` - One series per subgroup, in subgroup order.
pub fn build_stack<S: AsRef<str>>(subgroups: &[S], rows: &[&Row]) -> Vec<StackedSeries> {
    let mut series: Vec<StackedSeries> = subgroups
        .iter()
        .map(|key| StackedSeries {
            key: key.as_ref().to_string(),
            points: Vec::with_capacity(rows.len()),
        })
        .collect();

    for row in rows {
        let mut baseline = 0.0;
        for (i, s) in series.iter_mut().enumerate() {
            let magnitude = magnitude(row, i);
            let topline = baseline + magnitude;
            s.points.push(StackPoint {
                group: row.group.clone(),
                baseline,
                topline,
            });
            baseline = topline;
        }
    }

    series
}

fn magnitude(row: &Row, index: usize) -> f64 {
    row.values
        .get(index)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
