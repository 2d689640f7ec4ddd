use chrono::NaiveDate;

use crate::sale::Sale;

/// Returns `sales` sorted by date, earliest first.
///
/// The sort is stable: sales on the same day keep the order in which they
/// were read.
#[must_use]
pub fn sort_by_date(mut sales: Vec<Sale>) -> Vec<Sale> {
    sales.sort_by_key(Sale::date);
    sales
}

/// Returns the sales dated between `start` and `end`, inclusive, in their
/// original order.
///
/// No sales qualifying is a normal outcome and gives an empty result. So does
/// a range whose `start` is after its `end`.
///
/// # Examples
///
/// ```
/// # use sales_range::{filter_range, DateFormat, Sale};
/// let format = DateFormat::Iso;
/// let sales = [
///     Sale::extract("2022-01-01##10", format).unwrap(),
///     Sale::extract("2022-02-01##20", format).unwrap(),
/// ];
/// let start = format.parse("2022-01-15").unwrap();
/// let end = format.parse("2022-02-01").unwrap();
/// let in_range = filter_range(&sales, start, end);
/// assert_eq!(in_range.len(), 1);
/// assert_eq!(in_range[0].amount(), 20.0);
/// ```
#[must_use]
pub fn filter_range(sales: &[Sale], start: NaiveDate, end: NaiveDate) -> Vec<Sale> {
    sales
        .iter()
        .filter(|s| (start..=end).contains(&s.date()))
        .copied()
        .collect()
}

/// Returns the earliest and latest sale dates, or `None` if there are no
/// sales.
#[must_use]
pub fn date_span(sales: &[Sale]) -> Option<(NaiveDate, NaiveDate)> {
    let first = sales.iter().map(Sale::date).min()?;
    let last = sales.iter().map(Sale::date).max()?;
    Some((first, last))
}
