use crate::error::LoadError;

/// Column holding the category identifier.
pub const TICKER_COLUMN: &str = "ticker";
/// Column holding the time-bucket key.
pub const GROUP_COLUMN: &str = "group";

/// A single record from the input CSV.
///
/// `values` holds one entry per subgroup, in the dataset's subgroup order.
/// An entry is `None` when the cell was empty or not a number.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub ticker: String,
    pub group: String,
    pub values: Vec<Option<f64>>,
}

/// All rows of a CSV source plus the ordered subgroup names.
///
/// Built once and read-only afterwards; every chart render borrows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    subgroups: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Loads a dataset from a CSV file on disk.
    ///
    /// # Arguments
    /// * `path` - Path to a CSV file with a `ticker,group,...` header.
    ///
    /// # Returns
    /// * `Result<Dataset, LoadError>` - The parsed dataset.
    ///
    /// # Errors
    /// * `LoadError::Io` if the file cannot be opened.
    /// * Any error of [`Dataset::from_reader`].
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|source| LoadError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            rows = dataset.rows.len(),
            subgroups = dataset.subgroups.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Parses CSV from any reader.
    ///
    /// The header decides the schema: the `ticker` and `group` columns are
    /// reserved, every other column becomes a subgroup in header order.
    /// Rows whose column count differs from the header are rejected.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(LoadError::MissingHeader);
        }
        let ticker_idx = headers
            .iter()
            .position(|h| h == TICKER_COLUMN)
            .ok_or(LoadError::MissingColumn(TICKER_COLUMN))?;
        let group_idx = headers
            .iter()
            .position(|h| h == GROUP_COLUMN)
            .ok_or(LoadError::MissingColumn(GROUP_COLUMN))?;

        let value_columns: Vec<usize> = (0..headers.len())
            .filter(|i| *i != ticker_idx && *i != group_idx)
            .collect();
        let subgroups = value_columns
            .iter()
            .map(|i| headers[*i].to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(Row {
                ticker: record[ticker_idx].to_string(),
                group: record[group_idx].to_string(),
                values: value_columns
                    .iter()
                    .map(|i| parse_value(&record[*i]))
                    .collect(),
            });
        }

        Ok(Dataset { subgroups, rows })
    }

    pub fn subgroups(&self) -> &[String] {
        &self.subgroups
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Distinct tickers, sorted lexicographically.
    ///
    /// Deduplicates by scanning rows in order (first occurrence wins), then
    /// sorts the result.
    pub fn symbols(&self) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.ticker.as_str()) {
                seen.push(&row.ticker);
            }
        }
        let mut symbols: Vec<String> = seen.into_iter().map(str::to_string).collect();
        symbols.sort();
        symbols
    }

    /// Rows belonging to `symbol`, in dataset order.
    pub fn rows_for<'a>(&'a self, symbol: &str) -> Vec<&'a Row> {
        self.rows.iter().filter(|row| row.ticker == symbol).collect()
    }
}

fn parse_value(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}
