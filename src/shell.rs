use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use std::io::{BufRead, Write};

use crate::{
    sale::{DateFormat, Sale},
    sales::date_span,
    stats::run_query,
};

/// An interactive question-and-answer session with the user.
///
/// Every prompt re-asks until it gets an acceptable answer. Running out of
/// input ends the session: the prompt methods then return `None` (or `false`
/// for [`Shell::ask_continue`]).
pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Creates a session that reads answers from `input` and writes prompts
    /// to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the session's output, for inspection once it's over.
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("end of input");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Asks the user which date layout their files use.
    ///
    /// # Errors
    ///
    /// Returns any errors from reading input or writing output.
    pub fn choose_format(&mut self) -> Result<Option<DateFormat>> {
        writeln!(
            self.output,
            "Select the date format used in your files by entering the corresponding number:"
        )?;
        for (i, format) in DateFormat::ALL.iter().enumerate() {
            writeln!(self.output, "{}: {format}", i + 1)?;
        }
        loop {
            write!(self.output, "Enter your choice: ")?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=DateFormat::ALL.len()).contains(&n) => {
                    let format = DateFormat::ALL[n - 1];
                    writeln!(self.output, "You selected: {format}")?;
                    writeln!(self.output)?;
                    return Ok(Some(format));
                }
                Ok(_) => writeln!(
                    self.output,
                    "Please enter a number between 1 and {}.",
                    DateFormat::ALL.len()
                )?,
                Err(_) => writeln!(self.output, "Invalid input. Please enter a number.")?,
            }
        }
    }

    fn read_date(&mut self, label: &str, format: DateFormat) -> Result<Option<NaiveDate>> {
        loop {
            writeln!(
                self.output,
                "Enter a valid {label} date in the format: {format}"
            )?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match format.parse(&answer) {
                Ok(date) => return Ok(Some(date)),
                Err(_) => {
                    writeln!(
                        self.output,
                        "Invalid date format: {answer} does not match the format {format}"
                    )?;
                    writeln!(self.output)?;
                }
            }
        }
    }

    /// Asks the user for a start and end date, both within `span` and in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns any errors from reading input or writing output.
    pub fn read_range(
        &mut self,
        format: DateFormat,
        span: (NaiveDate, NaiveDate),
    ) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let (first, last) = span;
        let within = |date: NaiveDate| (first..=last).contains(&date);
        let first_text = format.format(first);
        let last_text = format.format(last);
        let start = loop {
            let Some(start) = self.read_date("start", format)? else {
                return Ok(None);
            };
            if within(start) {
                break start;
            }
            writeln!(
                self.output,
                "Start date must be within the range: {first_text} to {last_text}"
            )?;
            writeln!(self.output)?;
        };
        loop {
            let Some(end) = self.read_date("end", format)? else {
                return Ok(None);
            };
            if end < start {
                writeln!(
                    self.output,
                    "End date cannot be before the start date: {}",
                    format.format(start)
                )?;
            } else if !within(end) {
                writeln!(
                    self.output,
                    "End date must be within the sales range: {first_text} to {last_text}"
                )?;
            } else {
                return Ok(Some((start, end)));
            }
            writeln!(self.output)?;
        }
    }

    /// Asks whether the user wants to query another range.
    ///
    /// # Errors
    ///
    /// Returns any errors from reading input or writing output.
    pub fn ask_continue(&mut self) -> Result<bool> {
        loop {
            write!(
                self.output,
                "Do you want to enter another date range? (yes/no): "
            )?;
            let Some(answer) = self.read_line()? else {
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "yes" => return Ok(true),
                "no" => return Ok(false),
                _ => writeln!(self.output, "Invalid input! Please enter 'yes' or 'no'.")?,
            }
        }
    }

    /// Prints statistics for the sales dated between `start` and `end`, or
    /// says there are none.
    ///
    /// # Errors
    ///
    /// Returns any errors from writing output.
    pub fn report_range(
        &mut self,
        sales: &[Sale],
        start: NaiveDate,
        end: NaiveDate,
        format: DateFormat,
    ) -> Result<()> {
        let stats = run_query(sales, start, end);
        if stats.count == 0 {
            writeln!(self.output, "There are no sales in this range.")?;
        } else {
            writeln!(
                self.output,
                "For sales within the range {} - {} the statistics (rounded to two decimal places) are :",
                format.format(start),
                format.format(end)
            )?;
            writeln!(self.output, "{stats}")?;
        }
        Ok(())
    }

    /// Repeatedly asks for a date range and prints statistics for the sales
    /// in it, until the user is done.
    ///
    /// # Errors
    ///
    /// Returns any errors from reading input or writing output.
    pub fn run(&mut self, sales: &[Sale], format: DateFormat) -> Result<()> {
        let Some(span) = date_span(sales) else {
            return Ok(());
        };
        loop {
            writeln!(self.output, "Choose a range for sales analysis.")?;
            let Some((start, end)) = self.read_range(format, span)? else {
                return Ok(());
            };
            self.report_range(sales, start, end, format)?;
            writeln!(self.output)?;
            if !self.ask_continue()? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn shell(input: &str) -> Shell<Cursor<&[u8]>, Vec<u8>> {
        Shell::new(Cursor::new(input.as_bytes()), Vec::new())
    }

    fn output(shell: Shell<Cursor<&[u8]>, Vec<u8>>) -> String {
        String::from_utf8(shell.into_output()).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Sale> {
        vec![
            Sale::new(ymd(2022, 1, 1), 10.0),
            Sale::new(ymd(2022, 1, 2), 20.0),
            Sale::new(ymd(2022, 1, 3), 30.0),
            Sale::new(ymd(2022, 2, 1), 500.0),
        ]
    }

    #[test]
    fn choose_format_fn_reprompts_until_valid_choice() {
        let mut sh = shell("abc\n7\n2\n");
        assert_eq!(sh.choose_format().unwrap(), Some(DateFormat::MonthDayYear));
        let out = output(sh);
        assert!(out.contains("4: yyyy-MM-dd"));
        assert!(out.contains("Invalid input. Please enter a number."));
        assert!(out.contains("Please enter a number between 1 and 4."));
        assert!(out.contains("You selected: MM/dd/yyyy"));
    }

    #[test]
    fn choose_format_fn_returns_none_at_end_of_input() {
        let mut sh = shell("0\n");
        assert_eq!(sh.choose_format().unwrap(), None);
    }

    #[test]
    fn read_range_fn_enforces_span_and_order() {
        let span = (ymd(2022, 1, 1), ymd(2022, 2, 1));
        let input = "bogus\n01/01/2021\n02/01/2022\n01/01/2022\n01/03/2022\n03/01/2022\n";
        let mut sh = shell(input);
        let range = sh.read_range(DateFormat::DayMonthYear, span).unwrap();
        assert_eq!(range, Some((ymd(2022, 1, 2), ymd(2022, 1, 3))));
        let out = output(sh);
        assert!(out.contains("Invalid date format: bogus does not match the format dd/MM/yyyy"));
        assert!(out.contains("Start date must be within the range: 01/01/2022 to 01/02/2022"));
        assert!(out.contains("End date cannot be before the start date: 02/01/2022"));
        assert!(out.contains("End date must be within the sales range: 01/01/2022 to 01/02/2022"));
    }

    #[test]
    fn ask_continue_fn_accepts_any_case_and_reprompts() {
        let mut sh = shell("maybe\n YES \n");
        assert!(sh.ask_continue().unwrap());
        assert!(output(sh).contains("Invalid input! Please enter 'yes' or 'no'."));
        assert!(!shell("No\n").ask_continue().unwrap());
        assert!(!shell("").ask_continue().unwrap());
    }

    #[test]
    fn run_fn_prints_statistics_for_each_range() {
        let input = "2022-01-01\n2022-01-03\nyes\n2022-01-04\n2022-01-31\nno\n";
        let mut sh = shell(input);
        sh.run(&sample(), DateFormat::Iso).unwrap();
        let out = output(sh);
        assert!(out.contains(
            "For sales within the range 2022-01-01 - 2022-01-03 the statistics (rounded to two decimal places) are :"
        ));
        assert!(out.contains("Number of sales: 3, average: 20.00, standard deviation: 10.00"));
        assert!(out.contains("There are no sales in this range."));
        assert_eq!(out.matches("Choose a range for sales analysis.").count(), 2);
    }

    #[test]
    fn run_fn_does_nothing_without_sales() {
        let mut sh = shell("2022-01-01\n");
        sh.run(&[], DateFormat::Iso).unwrap();
        assert!(output(sh).is_empty());
    }
}
