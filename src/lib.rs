#![doc = include_str!("../README.md")]
mod ingest;
mod sale;
mod sales;
mod shell;
mod stats;

pub use ingest::{ingest, ingest_file, invalid_paths, FileSummary, IngestError, Ingestion};
pub use sale::{DateFormat, ParseFailure, Sale, DELIMITER};
pub use sales::{date_span, filter_range, sort_by_date};
pub use shell::Shell;
pub use stats::{run_query, statistics, RangeReport, Statistics};
