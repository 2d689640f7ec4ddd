use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use tracing::debug;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use sales_range::{
    date_span, ingest, invalid_paths, run_query, sort_by_date, DateFormat, RangeReport, Shell,
};

#[derive(Parser)]
#[command(version, about)]
/// Reads sales records of the form `<date>##<amount>`, one per line, and
/// reports statistics for date ranges.
struct Args {
    /// Sales files to read
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Date format used in the files (asked interactively if not given)
    #[arg(short, long, value_enum)]
    format: Option<DateFormat>,

    /// Start of a single range to report on, instead of asking
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// End of a single range to report on, instead of asking
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Print the range report as CSV (needs --format, so nothing is asked)
    #[arg(long, requires = "from", requires = "format")]
    csv: bool,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sales_range={level}")));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();
    debug!("logging initialized at level {level}");
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    let bad = invalid_paths(&args.files);
    if !bad.is_empty() {
        let list: Vec<String> = bad.iter().map(|p| p.display().to_string()).collect();
        bail!("the following file paths are invalid:\n{}", list.join("\n"));
    }

    // With --csv the format is given up front, so the shell never prompts.
    let mut shell = Shell::new(io::stdin().lock(), io::stdout());
    let format = match args.format {
        Some(format) => format,
        None => shell
            .choose_format()?
            .context("no date format selected")?,
    };

    // CSV output owns stdout, so the file summaries move to stderr.
    let mut out: Box<dyn Write> = if args.csv {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let ingestion = ingest(&args.files, format)?;
    for summary in &ingestion.summaries {
        writeln!(out, "{summary}\n")?;
    }
    let sales = sort_by_date(ingestion.sales);
    let Some((first, last)) = date_span(&sales) else {
        bail!("no sales found");
    };
    writeln!(out, "Total number of sales: {}", sales.len())?;
    writeln!(
        out,
        "Sales date range: {} to {}\n",
        format.format(first),
        format.format(last)
    )?;
    out.flush()?;

    let (Some(from), Some(to)) = (&args.from, &args.to) else {
        return shell.run(&sales, format);
    };
    let start = format
        .parse(from)
        .with_context(|| format!("reading --from date {from:?}"))?;
    let end = format
        .parse(to)
        .with_context(|| format!("reading --to date {to:?}"))?;
    if end < start {
        bail!("end date {to} is before start date {from}");
    }
    if args.csv {
        let report = RangeReport::new(start, end, format, run_query(&sales, start, end));
        report.write_csv(io::stdout())?;
    } else {
        shell.report_range(&sales, start, end, format)?;
    }
    io::stdout().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn csv_flag_requires_format_and_range() {
        let base = ["sales_range", "--csv", "--from", "01/01/2022", "--to", "15/06/2022"];
        assert!(Args::try_parse_from(base.iter().chain(&["data.txt"])).is_err());
        assert!(Args::try_parse_from(["sales_range", "--csv", "-f", "dd/MM/yyyy", "data.txt"]).is_err());
        let args = Args::try_parse_from(base.iter().chain(&["-f", "dd/MM/yyyy", "data.txt"])).unwrap();
        assert!(args.csv);
        assert_eq!(args.format, Some(DateFormat::DayMonthYear));
    }

    #[test]
    fn format_flag_takes_pattern_text() {
        let args = Args::try_parse_from(["sales_range", "--format", "yyyy-MM-dd", "a.txt"]).unwrap();
        assert_eq!(args.format, Some(DateFormat::Iso));
        assert!(Args::try_parse_from(["sales_range", "--format", "iso", "a.txt"]).is_err());
    }
}
