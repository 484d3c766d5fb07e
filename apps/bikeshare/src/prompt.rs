//! # Prompt Layer
//!
//! Line-oriented questions over any `BufRead` / `Write` pair.
//!
//! Validation lives here: answers are checked before they reach the
//! pipeline, and invalid answers are re-asked rather than propagated.

use bikeshare_core::{BikeshareError, Calendar, CityKey, FilterSpec};
use std::io::{BufRead, Write};

/// Parse a city answer ("Chicago", "new york city", ...).
pub fn parse_city(answer: &str) -> Result<CityKey, BikeshareError> {
    answer.parse()
}

/// Parse a month answer: `all` or a supported month name, lowercased.
pub fn parse_month(answer: &str, calendar: &Calendar) -> Result<String, BikeshareError> {
    FilterSpec::validated(answer, "all", calendar).map(|spec| spec.month)
}

/// Parse a weekday answer: `all` or a weekday name, lowercased.
pub fn parse_day(answer: &str, calendar: &Calendar) -> Result<String, BikeshareError> {
    FilterSpec::validated("all", answer, calendar).map(|spec| spec.day)
}

/// Parse a yes/no answer.
pub fn parse_yes_no(answer: &str) -> Result<bool, BikeshareError> {
    match answer.trim().to_lowercase().as_str() {
        "yes" | "y" => Ok(true),
        "no" | "n" => Ok(false),
        other => Err(BikeshareError::Validation(format!(
            "'{}' is not yes or no",
            other
        ))),
    }
}

fn io_error(e: std::io::Error) -> BikeshareError {
    BikeshareError::Io(e.to_string())
}

/// Asks questions and reads answers.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning its output.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Write a line to the output.
    pub fn say(&mut self, text: &str) -> Result<(), BikeshareError> {
        writeln!(self.output, "{}", text).map_err(io_error)
    }

    fn read_line(&mut self) -> Result<String, BikeshareError> {
        self.output.flush().map_err(io_error)?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(BikeshareError::Io("input closed".to_string()));
        }
        Ok(line.trim().to_string())
    }

    /// Ask until `parse` accepts the answer.
    ///
    /// Only `Validation` and `UnknownCity` errors trigger a re-ask; anything
    /// else (closed input) is returned.
    pub fn ask<T>(
        &mut self,
        question: &str,
        retry: &str,
        parse: impl Fn(&str) -> Result<T, BikeshareError>,
    ) -> Result<T, BikeshareError> {
        loop {
            self.say(question)?;
            let answer = self.read_line()?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(BikeshareError::Validation(reason) | BikeshareError::UnknownCity(reason)) => {
                    tracing::debug!("Rejected answer: {}", reason);
                    self.say(retry)?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn ask_city(&mut self) -> Result<CityKey, BikeshareError> {
        self.ask(
            "\nPlease insert a valid city (Chicago, New York City, Washington)",
            "\nInvalid input! We do not have any records for the selected city or there is a typing error.",
            parse_city,
        )
    }

    pub fn ask_month(&mut self, calendar: &Calendar) -> Result<String, BikeshareError> {
        self.ask(
            "\nSelect a month to filter by (from january to june) or enter all to show all records:",
            "\nInvalid input! We do not have any records for the selected month or there is a typing error.",
            |answer| parse_month(answer, calendar),
        )
    }

    pub fn ask_day(&mut self, calendar: &Calendar) -> Result<String, BikeshareError> {
        self.ask(
            "\nSelect a day to filter by (Monday to Sunday) or enter all for all records:",
            "\nInvalid input! We do not have any records for the selected day or there is a typing error.",
            |answer| parse_day(answer, calendar),
        )
    }

    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool, BikeshareError> {
        self.ask(question, "\nYour input is invalid. Please enter only 'yes' or 'no'", parse_yes_no)
    }

    /// Wait for ENTER.
    pub fn pause(&mut self) -> Result<(), BikeshareError> {
        write!(self.output, "Press the <ENTER> key to continue...").map_err(io_error)?;
        self.read_line().map(|_| ())
    }
}
