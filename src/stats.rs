//! Descriptive statistics for one column over the currently visible rows.
//! Cells that do not parse as numbers are skipped silently; a column with no
//! numeric cells falls back to four zero values so every statistic is defined.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::data::Dataset;

pub struct ColumnSummary {
    pub column: String,
    pub visible_rows: usize,
    pub total_rows: usize,
    pub numeric_rows: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// First mode; NaN when every value is unique.
    pub mode: f64,
    pub sum: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Compute the summary for `column` over the rows in `visible`. Each fallible
/// step propagates with `?`; none can actually fail once the zero-value
/// fallback is in place, but a failure must surface rather than render a
/// half-filled popup.
pub fn compute(data: &Dataset, visible: &[usize], column: usize) -> Result<ColumnSummary> {
    let mut values: Vec<f64> = visible
        .iter()
        .filter_map(|&i| data.rows[i][column].trim().parse().ok())
        .collect();
    let numeric_rows = values.len();

    if values.is_empty() {
        values = vec![0.0; 4];
    }

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let sum: f64 = values.iter().sum();
    let mean = sum / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    let (q1, q2, q3) = quartiles(&sorted)?;

    Ok(ColumnSummary {
        column: data.columns[column].name.clone(),
        visible_rows: visible.len(),
        total_rows: data.rows.len(),
        numeric_rows,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        median: median(&sorted)?,
        mode: mode(&sorted),
        sum,
        variance,
        std_dev: variance.sqrt(),
        p90: percentile(&sorted, 90.0)?,
        p95: percentile(&sorted, 95.0)?,
        p99: percentile(&sorted, 99.0)?,
        q1,
        q2,
        q3,
    })
}

impl ColumnSummary {
    /// Popup text, two statistics per line.
    pub fn to_text(&self) -> String {
        format!(
            "\n  [ {} ]\n  {}\n  rows visible: {} (of {})\n  numeric rows: {}\n\n  \
             min: {:15.4}      mean:   {:15.4}\n  \
             max: {:15.4}      median: {:15.4}\n  \
             sum: {:15.4}      mode:   {:15.4}\n\n  \
             var: {:15.4}      std:    {:15.4}\n\n  \
             p90: {:15.4}      p25:    {:15.4}\n  \
             p95: {:15.4}      p50:    {:15.4}\n  \
             p99: {:15.4}      p75:    {:15.4}",
            self.column,
            "-".repeat(4 + self.column.chars().count()),
            self.visible_rows,
            self.total_rows,
            self.numeric_rows,
            self.min,
            self.mean,
            self.max,
            self.median,
            self.sum,
            self.mode,
            self.variance,
            self.std_dev,
            self.p90,
            self.q1,
            self.p95,
            self.q2,
            self.p99,
            self.q3,
        )
    }
}

fn median(sorted: &[f64]) -> Result<f64> {
    let n = sorted.len();
    if n == 0 {
        return Err(eyre!("median of empty input"));
    }
    Ok(if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    })
}

/// Smallest of the most frequent values, or NaN when no value repeats.
fn mode(sorted: &[f64]) -> f64 {
    let mut best = f64::NAN;
    let mut best_count = 1;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_count {
            best_count = j - i;
            best = sorted[i];
        }
        i = j;
    }
    best
}

/// The relative-standing percentile: a whole index selects `sorted[i-1]`, a
/// fractional one the mean of the two values it falls between.
fn percentile(sorted: &[f64], percent: f64) -> Result<f64> {
    let n = sorted.len();
    if n == 0 {
        return Err(eyre!("percentile of empty input"));
    }
    if n == 1 {
        return Ok(sorted[0]);
    }
    if percent <= 0.0 || percent > 100.0 {
        return Err(eyre!("percentile out of bounds: {}", percent));
    }

    let index = (percent / 100.0) * n as f64;
    if index == index.trunc() {
        Ok(sorted[index as usize - 1])
    } else if index > 1.0 {
        let i = index as usize;
        Ok((sorted[i - 1] + sorted[i]) / 2.0)
    } else {
        Err(eyre!("percentile index out of bounds"))
    }
}

/// Q2 is the median; Q1/Q3 are the medians of the lower and upper halves,
/// excluding the middle element when the length is odd. A single value has
/// empty halves and NaN outer quartiles.
fn quartiles(sorted: &[f64]) -> Result<(f64, f64, f64)> {
    let n = sorted.len();
    if n == 0 {
        return Err(eyre!("quartiles of empty input"));
    }
    let (lower, upper) = if n % 2 == 0 {
        (&sorted[..n / 2], &sorted[n / 2..])
    } else {
        (&sorted[..n / 2], &sorted[n / 2 + 1..])
    };
    let q1 = if lower.is_empty() { f64::NAN } else { median(lower)? };
    let q3 = if upper.is_empty() { f64::NAN } else { median(upper)? };
    Ok((q1, median(sorted)?, q3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, Dataset};

    fn dataset(cells: &[&str]) -> Dataset {
        let mut data = Dataset {
            columns: vec![Column::new("v")],
            rows: Vec::new(),
        };
        for cell in cells {
            data.push_row(vec![cell.to_string()]);
        }
        data
    }

    #[test]
    fn test_known_values() {
        let data = dataset(&["1", "2", "3", "4"]);
        let visible = vec![0, 1, 2, 3];
        let s = compute(&data, &visible, 0).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.sum, 10.0);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q1, 1.5);
        assert_eq!(s.q2, 2.5);
        assert_eq!(s.q3, 3.5);
        assert_eq!(s.variance, 1.25);
        assert_eq!(s.numeric_rows, 4);
        // All values distinct: no mode.
        assert!(s.mode.is_nan());
    }

    #[test]
    fn test_single_numeric_value() {
        // A filter can narrow a column down to one numeric row; every
        // statistic must still be produced.
        let data = dataset(&["7", "n/a"]);
        let s = compute(&data, &[0, 1], 0).unwrap();
        assert_eq!(s.numeric_rows, 1);
        assert_eq!(s.min, 7.0);
        assert_eq!(s.max, 7.0);
        assert_eq!(s.mean, 7.0);
        assert_eq!(s.median, 7.0);
        assert_eq!(s.p90, 7.0);
        assert_eq!(s.p99, 7.0);
        assert_eq!(s.q2, 7.0);
        assert!(s.q1.is_nan());
        assert!(s.q3.is_nan());
        assert!(s.mode.is_nan());
        assert!(s.to_text().contains("[ v ]"));
    }

    #[test]
    fn test_non_numeric_cells_are_skipped() {
        let data = dataset(&["1", "n/a", " 3 ", "4"]);
        let visible = vec![0, 1, 2, 3];
        let s = compute(&data, &visible, 0).unwrap();
        assert_eq!(s.numeric_rows, 3);
        assert_eq!(s.visible_rows, 4);
        assert_eq!(s.sum, 8.0);
    }

    #[test]
    fn test_zero_fallback() {
        let data = dataset(&["x", "y"]);
        let visible = vec![0, 1];
        let s = compute(&data, &visible, 0).unwrap();
        assert_eq!(s.numeric_rows, 0);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.max, 0.0);
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.mode, 0.0);
        assert_eq!(s.q2, 0.0);
    }

    #[test]
    fn test_mode_prefers_most_frequent_then_smallest() {
        let data = dataset(&["2", "2", "1", "3", "3", "3"]);
        let s = compute(&data, &[0, 1, 2, 3, 4, 5], 0).unwrap();
        assert_eq!(s.mode, 3.0);
        let data = dataset(&["2", "2", "1", "1"]);
        let s = compute(&data, &[0, 1, 2, 3], 0).unwrap();
        assert_eq!(s.mode, 1.0);
    }

    #[test]
    fn test_statistics_respect_visible_set() {
        let data = dataset(&["1", "100", "3"]);
        let s = compute(&data, &[0, 2], 0).unwrap();
        assert_eq!(s.max, 3.0);
        assert_eq!(s.visible_rows, 2);
        assert_eq!(s.total_rows, 3);
    }

    #[test]
    fn test_percentile_semantics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        // 90th: index 3.6, mean of the 3rd and 4th values.
        assert_eq!(percentile(&sorted, 90.0).unwrap(), 3.5);
        // 50th: index 2.0 is whole, picks the 2nd value.
        assert_eq!(percentile(&sorted, 50.0).unwrap(), 2.0);
        assert_eq!(percentile(&[7.0], 99.0).unwrap(), 7.0);
    }

    #[test]
    fn test_popup_text_contains_counts() {
        let data = dataset(&["1", "2"]);
        let s = compute(&data, &[0, 1], 0).unwrap();
        let text = s.to_text();
        assert!(text.contains("[ v ]"));
        assert!(text.contains("rows visible: 2 (of 2)"));
        assert!(text.contains("numeric rows: 2"));
    }
}
