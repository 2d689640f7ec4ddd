use chrono::NaiveDate;
use serde::Serialize;

use std::{
    fmt::{self, Display},
    io::Write,
};

use crate::{
    sale::{DateFormat, Sale},
    sales::filter_range,
};

/// Summary statistics over a set of sales.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
}

/// Computes the count, mean amount, and sample standard deviation of
/// `sales`.
///
/// The mean is 0 when there are no sales, and the standard deviation is 0
/// when there are fewer than two. The deviation is accumulated in a second
/// pass over the data, around the mean from the first.
///
/// # Examples
///
/// ```
/// # use sales_range::{statistics, DateFormat, Sale};
/// let sales: Vec<Sale> = ["2022-01-01##10", "2022-01-02##20", "2022-01-03##30"]
///     .iter()
///     .map(|line| Sale::extract(line, DateFormat::Iso).unwrap())
///     .collect();
/// let stats = statistics(&sales);
/// assert_eq!(stats.count, 3);
/// assert_eq!(stats.mean, 20.0);
/// assert_eq!(stats.stddev, 10.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn statistics(sales: &[Sale]) -> Statistics {
    let count = sales.len();
    if count == 0 {
        return Statistics::default();
    }
    let n = count as f64;
    let mean = sales.iter().map(Sale::amount).sum::<f64>() / n;
    let stddev = if count > 1 {
        let squares: f64 = sales.iter().map(|s| (s.amount() - mean).powi(2)).sum();
        (squares / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    Statistics {
        count,
        mean,
        stddev,
    }
}

/// Computes [`statistics`] over the sales dated between `start` and `end`,
/// inclusive.
#[must_use]
pub fn run_query(sales: &[Sale], start: NaiveDate, end: NaiveDate) -> Statistics {
    statistics(&filter_range(sales, start, end))
}

impl Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number of sales: {}, average: {:.2}, standard deviation: {:.2}",
            self.count, self.mean, self.stddev
        )
    }
}

/// One row of query output: the range asked about and its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeReport {
    pub start: String,
    pub end: String,
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
}

impl RangeReport {
    /// Describes `stats` for the range `start..=end`, with the dates written
    /// in `format`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate, format: DateFormat, stats: Statistics) -> Self {
        Self {
            start: format.format(start),
            end: format.format(end),
            count: stats.count,
            mean: stats.mean,
            stddev: stats.stddev,
        }
    }

    /// Writes this report to `out` as CSV: a header line, then one row.
    ///
    /// # Errors
    ///
    /// Returns any errors from serializing or writing the row.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.serialize(self)?;
        wtr.flush()?;
        Ok(())
    }
}
