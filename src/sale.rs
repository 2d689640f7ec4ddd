use chrono::NaiveDate;
use clap::ValueEnum;
use regex::Regex;

use std::{
    cmp::Ordering,
    fmt::{self, Display},
    str::FromStr,
    sync::LazyLock,
};

/// The literal that separates the date from the amount on a sales line.
pub const DELIMITER: &str = "##";

static DATE_SHAPES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    DateFormat::ALL.map(|format| Regex::new(format.shape()).expect("date shape regex is valid"))
});

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("amount regex is valid")
});

/// The reasons a sales line can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("expected exactly one \"##\" delimiter, found {parts} parts")]
    MalformedLine { parts: usize },

    #[error("invalid date {text:?} (expected {pattern})")]
    InvalidDate { text: String, pattern: &'static str },

    #[error("invalid amount {text:?}")]
    InvalidAmount { text: String },
}

/// The date layouts that sales files may use.
///
/// Each variant is named on the command line by its pattern text, for
/// example `--format dd/MM/yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DateFormat {
    #[value(name = "dd/MM/yyyy")]
    DayMonthYear,
    #[value(name = "MM/dd/yyyy")]
    MonthDayYear,
    #[value(name = "yyyy/MM/dd")]
    YearMonthDay,
    #[value(name = "yyyy-MM-dd")]
    Iso,
}

impl DateFormat {
    /// Every supported format, in menu order.
    pub const ALL: [DateFormat; 4] = [
        DateFormat::DayMonthYear,
        DateFormat::MonthDayYear,
        DateFormat::YearMonthDay,
        DateFormat::Iso,
    ];

    /// Returns the human-readable pattern, such as `dd/MM/yyyy`.
    #[must_use]
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "dd/MM/yyyy",
            DateFormat::MonthDayYear => "MM/dd/yyyy",
            DateFormat::YearMonthDay => "yyyy/MM/dd",
            DateFormat::Iso => "yyyy-MM-dd",
        }
    }

    fn shape(self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => r"^(?<d>\d{2})/(?<m>\d{2})/(?<y>\d{4})$",
            DateFormat::MonthDayYear => r"^(?<m>\d{2})/(?<d>\d{2})/(?<y>\d{4})$",
            DateFormat::YearMonthDay => r"^(?<y>\d{4})/(?<m>\d{2})/(?<d>\d{2})$",
            DateFormat::Iso => r"^(?<y>\d{4})-(?<m>\d{2})-(?<d>\d{2})$",
        }
    }

    fn strftime(self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
            DateFormat::YearMonthDay => "%Y/%m/%d",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }

    /// Parses `text` as a calendar date laid out in this format.
    ///
    /// Field widths are strict: `1/1/2022` does not match `dd/MM/yyyy`.
    /// Dates that don't exist, such as 31 April, are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_range::DateFormat;
    /// let date = DateFormat::DayMonthYear.parse("15/06/2022").unwrap();
    /// assert_eq!(date.to_string(), "2022-06-15");
    /// assert!(DateFormat::DayMonthYear.parse("31/04/2022").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::InvalidDate`] if `text` does not match the
    /// pattern or names an impossible date.
    pub fn parse(self, text: &str) -> Result<NaiveDate, ParseFailure> {
        let invalid = || ParseFailure::InvalidDate {
            text: text.to_string(),
            pattern: self.pattern(),
        };
        let caps = DATE_SHAPES[self as usize].captures(text).ok_or_else(invalid)?;
        let field = |name: &str| caps[name].parse::<u32>().map_err(|_| invalid());
        let year = i32::try_from(field("y")?).map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, field("m")?, field("d")?).ok_or_else(invalid)
    }

    /// Formats `date` according to this pattern.
    #[must_use]
    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.strftime()).to_string()
    }
}

impl Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

impl FromStr for DateFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateFormat::ALL
            .into_iter()
            .find(|format| format.pattern() == s)
            .ok_or_else(|| anyhow::anyhow!("unsupported date format {s:?}"))
    }
}

/// A single sale: the day it happened and how much it was for.
///
/// Sales are ordered, and compared for equality, by date alone.
#[derive(Debug, Clone, Copy)]
pub struct Sale {
    date: NaiveDate,
    amount: f64,
}

impl Sale {
    /// Creates a sale of `amount` on `date`.
    #[must_use]
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }

    /// Parses one sales line of the form `<date>##<amount>`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_range::{DateFormat, Sale};
    /// let sale = Sale::extract("2022-01-31##100.5", DateFormat::Iso).unwrap();
    /// assert_eq!(sale.date().to_string(), "2022-01-31");
    /// assert_eq!(sale.amount(), 100.5);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] classifying why the line was rejected:
    /// * The delimiter does not appear exactly once
    /// * The date does not match `format`, or does not exist
    /// * The amount is not a decimal number
    ///
    /// A trailing delimiter with nothing after it, as in `2022-01-01##`,
    /// still counts as exactly one delimiter: the empty amount makes it
    /// [`ParseFailure::InvalidAmount`], not [`ParseFailure::MalformedLine`].
    pub fn extract(line: &str, format: DateFormat) -> Result<Self, ParseFailure> {
        let parts: Vec<&str> = line.split(DELIMITER).collect();
        let [date, amount] = parts[..] else {
            return Err(ParseFailure::MalformedLine { parts: parts.len() });
        };
        let date = format.parse(date)?;
        let amount = parse_amount(amount)?;
        Ok(Self::new(date, amount))
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

fn parse_amount(text: &str) -> Result<f64, ParseFailure> {
    let invalid = || ParseFailure::InvalidAmount {
        text: text.to_string(),
    };
    let trimmed = text.trim_ascii();
    if !AMOUNT.is_match(trimmed) {
        return Err(invalid());
    }
    trimmed.parse().map_err(|_| invalid())
}

impl Display for Sale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sale{{date: {}, amount: {}}}", self.date, self.amount)
    }
}

impl PartialEq for Sale {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

impl Eq for Sale {}

impl PartialOrd for Sale {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sale {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}
