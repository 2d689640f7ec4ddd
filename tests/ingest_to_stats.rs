use approx::assert_relative_eq;
use chrono::NaiveDate;
use sales_range::{
    date_span, filter_range, ingest, run_query, sort_by_date, DateFormat, IngestError, Sale,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn amounts(sales: &[Sale]) -> Vec<f64> {
    sales.iter().map(Sale::amount).collect()
}

#[test]
fn mixed_file_reports_two_valid_and_one_invalid_line() {
    let ingestion = ingest(&["testdata/mixed.txt"], DateFormat::DayMonthYear).unwrap();
    assert_eq!(ingestion.summaries[0].valid, 2);
    assert_eq!(ingestion.summaries[0].invalid, 1);
    assert_eq!(ingestion.sales.len(), 2);
}

#[test]
fn merged_files_sort_into_date_order() {
    let ingestion = ingest(
        &["testdata/mixed.txt", "testdata/more.txt"],
        DateFormat::DayMonthYear,
    )
    .unwrap();
    let sales = sort_by_date(ingestion.sales);
    assert_eq!(amounts(&sales), vec![100.0, 50.0, 75.5, 300.0, 200.0]);
    assert_eq!(date_span(&sales), Some((ymd(2022, 1, 1), ymd(2022, 6, 15))));
}

#[test]
fn filtering_by_full_span_returns_every_sale_in_order() {
    let ingestion = ingest(
        &["testdata/mixed.txt", "testdata/more.txt"],
        DateFormat::DayMonthYear,
    )
    .unwrap();
    let sales = sort_by_date(ingestion.sales);
    let (first, last) = date_span(&sales).unwrap();
    assert_eq!(amounts(&filter_range(&sales, first, last)), amounts(&sales));

    let stats = run_query(&sales, first, last);
    assert_eq!(stats.count, 5);
    assert_relative_eq!(stats.mean, 145.1, epsilon = 1e-9);
    assert_relative_eq!(stats.stddev, 103.598_021_216_623_64, epsilon = 1e-9);
}

#[test]
fn query_over_sub_range_uses_only_sales_inside_it() {
    let ingestion = ingest(
        &["testdata/mixed.txt", "testdata/more.txt"],
        DateFormat::DayMonthYear,
    )
    .unwrap();
    let sales = sort_by_date(ingestion.sales);
    let stats = run_query(&sales, ymd(2022, 2, 1), ymd(2022, 5, 31));
    assert_eq!(stats.count, 3);
    assert_relative_eq!(stats.mean, 141.833_333_333_333_34, epsilon = 1e-9);
    assert_relative_eq!(stats.stddev, 137.568_467_801_794_36, epsilon = 1e-9);
}

#[test]
fn query_over_gap_between_sales_is_empty_not_an_error() {
    let ingestion = ingest(&["testdata/mixed.txt"], DateFormat::DayMonthYear).unwrap();
    let sales = sort_by_date(ingestion.sales);
    let stats = run_query(&sales, ymd(2022, 2, 1), ymd(2022, 3, 1));
    assert_eq!(stats.count, 0);
    assert_eq!(stats.mean, 0.0);
    assert_eq!(stats.stddev, 0.0);
}

#[test]
fn unreadable_file_stops_ingestion() {
    let result = ingest(
        &["testdata/mixed.txt", "testdata/missing.txt"],
        DateFormat::DayMonthYear,
    );
    assert!(matches!(result, Err(IngestError::FileUnreadable { .. })));
}
