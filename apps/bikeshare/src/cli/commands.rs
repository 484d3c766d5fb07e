//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::Settings;
use crate::prompt::Prompter;
use crate::render::{
    render_duration, render_elapsed, render_header, render_record, render_report,
    render_station, render_time, render_user,
};
use bikeshare_core::{
    AnalysisPass, BikeshareError, Calendar, CityKey, CsvDirectory, FilterSpec, Page, PageSignal,
    Session, SessionRequest, TripSource, primitives::PAGE_SIZE,
};
use std::io::{BufRead, Write};

const RULE: &str = "----------------------------------------";

/// The on-disk source described by `settings`.
pub fn build_source(settings: &Settings) -> CsvDirectory {
    CsvDirectory::new(settings.data_dir.clone(), settings.catalog.clone())
}

// =============================================================================
// EXPLORE COMMAND
// =============================================================================

/// Run the interactive explorer on stdin/stdout.
pub fn cmd_explore(settings: &Settings, pause: bool) -> Result<(), BikeshareError> {
    if settings.json_mode {
        tracing::warn!("--json-mode has no effect on the interactive explorer");
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());
    let mut session = Session::new(build_source(settings), settings.calendar);

    run_explorer(&mut session, &mut prompter, &settings.calendar, pause)
}

/// The prompt loop: ask, analyse, present, page raw data, offer a restart.
///
/// Load failures are shown and the user is offered a restart; only I/O
/// errors on the prompt itself end the loop early.
pub fn run_explorer<S, R, W>(
    session: &mut Session<S>,
    prompter: &mut Prompter<R, W>,
    calendar: &Calendar,
    pause: bool,
) -> Result<(), BikeshareError>
where
    S: TripSource,
    R: BufRead,
    W: Write,
{
    loop {
        prompter.say("\nHello! Let's explore some US bikeshare data!")?;
        let city = prompter.ask_city()?;
        let month = prompter.ask_month(calendar)?;
        let day = prompter.ask_day(calendar)?;
        let request = SessionRequest::new(city, FilterSpec::new(month, day));

        tracing::info!("Analysing {} ({})", city, request.filter);
        match session.begin(request) {
            Ok(pass) => present(pass, prompter, pause)?,
            Err(
                e @ (BikeshareError::DataLoad(_)
                | BikeshareError::UnknownCity(_)
                | BikeshareError::InvalidFilter(_)),
            ) => {
                tracing::error!("Analysis failed: {}", e);
                prompter.say(&format!("\nCould not analyse {}: {}", city.display_name(), e))?;
            }
            Err(e) => return Err(e),
        }

        session.restart();
        if !prompter.ask_yes_no("\nWould you like to restart? Enter yes or no.")? {
            return Ok(());
        }
    }
}

fn present<R: BufRead, W: Write>(
    pass: &AnalysisPass,
    prompter: &mut Prompter<R, W>,
    pause: bool,
) -> Result<(), BikeshareError> {
    let report = pass.report();
    let timings = pass.timings();

    prompter.say(&render_header(report))?;
    let groups = [
        (render_time(&report.time), timings.time),
        (render_station(&report.station), timings.station),
        (render_duration(&report.duration), timings.duration),
        (render_user(&report.user, report.city), timings.user),
    ];
    for (text, elapsed) in groups {
        prompter.say(&text)?;
        prompter.say(&render_elapsed(elapsed))?;
        prompter.say(RULE)?;
        if pause {
            prompter.pause()?;
        }
    }

    show_raw_data(pass, prompter)
}

fn show_raw_data<R: BufRead, W: Write>(
    pass: &AnalysisPass,
    prompter: &mut Prompter<R, W>,
) -> Result<(), BikeshareError> {
    let total = pass.view().len();
    let mut pager = pass.pager();
    let mut signal = ask_signal(
        prompter,
        &format!("\nWould you like to see {} lines of raw data? Enter yes or no.", PAGE_SIZE),
    )?;

    loop {
        match pager.next_page(signal) {
            Page::Batch { offset, records } => {
                for (i, record) in records.iter().enumerate() {
                    prompter.say(&render_record(offset + i, record))?;
                }
                if pager.offset() >= total {
                    prompter.say("\nNo more raw data to display.")?;
                    return Ok(());
                }
                signal = ask_signal(
                    prompter,
                    &format!("\nWould you like to see {} more lines? Enter yes or no.", PAGE_SIZE),
                )?;
            }
            Page::End => {
                if signal == PageSignal::Continue {
                    prompter.say("\nNo raw data to display for these filters.")?;
                }
                return Ok(());
            }
        }
    }
}

fn ask_signal<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    question: &str,
) -> Result<PageSignal, BikeshareError> {
    Ok(if prompter.ask_yes_no(question)? {
        PageSignal::Continue
    } else {
        PageSignal::Stop
    })
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Print one report for `city` with the given selectors.
pub fn cmd_report(
    settings: &Settings,
    city: &str,
    month: &str,
    day: &str,
) -> Result<(), BikeshareError> {
    let city: CityKey = city.parse()?;
    let filter = FilterSpec::validated(month, day, &settings.calendar)?;

    let mut session = Session::new(build_source(settings), settings.calendar);
    let pass = session.begin(SessionRequest::new(city, filter))?;
    let report = pass.report();

    tracing::info!("Report ready: {} trips", report.trip_count);
    if settings.json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    } else {
        println!("{}", render_report(report));
    }

    Ok(())
}

// =============================================================================
// CITIES COMMAND
// =============================================================================

/// List the configured cities with their resolved file paths.
pub fn cmd_cities(settings: &Settings) -> Result<(), BikeshareError> {
    let source = build_source(settings);
    let mut rows = Vec::with_capacity(settings.catalog.len());
    for (city, entry) in settings.catalog.iter() {
        let path = source.path_for(city)?;
        rows.push((city, path, entry.availability.has_demographics()));
    }

    if settings.json_mode {
        let json: Vec<_> = rows
            .iter()
            .map(|(city, path, demographics)| {
                serde_json::json!({
                    "city": city.key(),
                    "name": city.display_name(),
                    "file": path.display().to_string(),
                    "exists": path.is_file(),
                    "demographics": demographics,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_default()
        );
    } else {
        println!("Cities ({}):", rows.len());
        for (city, path, demographics) in &rows {
            println!(
                "  {:<14} {} [{}{}]",
                city.display_name(),
                path.display(),
                if path.is_file() { "present" } else { "missing" },
                if *demographics { ", demographics" } else { "" }
            );
        }
    }

    Ok(())
}
