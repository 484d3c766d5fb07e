//! # Session Module
//!
//! Sequences one analysis pass: load → filter → aggregate → paginate.
//!
//! - A pass is built fresh from the source on every `begin`
//! - `restart` drops the current pass; nothing carries over
//! - Raw records are handed out five at a time, in dataset order
//!
//! The session never prompts or prints. The caller supplies validated
//! requests and continue/stop signals and renders whatever comes back.

use crate::aggregate::{Aggregator, Report};
use crate::calendar::Calendar;
use crate::filter::{FilterEngine, ScopedView};
use crate::primitives::PAGE_SIZE;
use crate::store::TripSource;
use crate::{BikeshareError, CityKey, FilterSpec, TripRecord};
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// REQUESTS AND PASSES
// =============================================================================

/// What one pass should analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub city: CityKey,
    pub filter: FilterSpec,
}

impl SessionRequest {
    #[must_use]
    pub fn new(city: CityKey, filter: FilterSpec) -> Self {
        Self { city, filter }
    }
}

/// Wall-clock time spent on each statistic group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupTimings {
    pub time: Duration,
    pub station: Duration,
    pub duration: Duration,
    pub user: Duration,
}

/// The result of one pass: the scoped view and its statistics.
#[derive(Debug, Clone)]
pub struct AnalysisPass {
    request: SessionRequest,
    view: ScopedView,
    report: Report,
    timings: GroupTimings,
}

impl AnalysisPass {
    #[must_use]
    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    #[must_use]
    pub fn view(&self) -> &ScopedView {
        &self.view
    }

    #[must_use]
    pub fn report(&self) -> &Report {
        &self.report
    }

    #[must_use]
    pub fn timings(&self) -> GroupTimings {
        self.timings
    }

    /// A pager over this pass's raw records, starting at offset 0.
    #[must_use]
    pub fn pager(&self) -> RawPager<'_> {
        RawPager::new(&self.view)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Orchestrates passes over a trip source.
///
/// Holds at most one pass. Starting a new pass or restarting discards the
/// previous dataset, view and report.
#[derive(Debug)]
pub struct Session<S: TripSource> {
    source: S,
    engine: FilterEngine,
    aggregator: Aggregator,
    current: Option<AnalysisPass>,
}

impl<S: TripSource> Session<S> {
    /// Create a session; the calendar is shared by the filter engine and
    /// the aggregator.
    #[must_use]
    pub fn new(source: S, calendar: Calendar) -> Self {
        Self {
            source,
            engine: FilterEngine::new(calendar),
            aggregator: Aggregator::new(calendar),
            current: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run a full pass for `request`.
    ///
    /// The previous pass is dropped before loading, so a failed load leaves
    /// the session empty rather than holding stale results.
    ///
    /// # Errors
    /// - `UnknownCity` if the source's catalog has no entry for the city
    /// - `DataLoad` if the source cannot be read or parsed
    /// - `InvalidFilter` if a selector cannot be resolved
    pub fn begin(&mut self, request: SessionRequest) -> Result<&AnalysisPass, BikeshareError> {
        self.current = None;

        let dataset = Arc::new(self.source.load(request.city)?);
        let view = self.engine.apply(&dataset, &request.filter)?;
        let (report, timings) = self.aggregate(&view, &request.filter);

        Ok(&*self.current.insert(AnalysisPass {
            request,
            view,
            report,
            timings,
        }))
    }

    /// The pass produced by the last successful `begin`, if any.
    #[must_use]
    pub fn current(&self) -> Option<&AnalysisPass> {
        self.current.as_ref()
    }

    /// Forget the current pass.
    pub fn restart(&mut self) {
        self.current = None;
    }

    fn aggregate(&self, view: &ScopedView, filter: &FilterSpec) -> (Report, GroupTimings) {
        let mut timings = GroupTimings::default();

        let started = Instant::now();
        let time = self.aggregator.time_stats(view);
        timings.time = started.elapsed();

        let started = Instant::now();
        let station = self.aggregator.station_stats(view);
        timings.station = started.elapsed();

        let started = Instant::now();
        let duration = self.aggregator.duration_stats(view);
        timings.duration = started.elapsed();

        let started = Instant::now();
        let user = self.aggregator.user_stats(view, view.availability());
        timings.user = started.elapsed();

        let report = Report::new(view, filter, time, station, duration, user);
        (report, timings)
    }
}

// =============================================================================
// RAW RECORD PAGINATION
// =============================================================================

/// Caller's answer after each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    Continue,
    Stop,
}

/// One pagination step.
#[derive(Debug, Clone, PartialEq)]
pub enum Page<'a> {
    /// Up to `PAGE_SIZE` records; `offset` is the view position of the first.
    Batch {
        offset: usize,
        records: Vec<&'a TripRecord>,
    },
    /// No more records: stopped by the caller or past the end of the view.
    End,
}

/// Walks a view `PAGE_SIZE` records at a time.
///
/// Never fails: asking past the end yields `Page::End`, and once ended the
/// pager stays ended.
#[derive(Debug, Clone)]
pub struct RawPager<'a> {
    view: &'a ScopedView,
    offset: usize,
    finished: bool,
}

impl<'a> RawPager<'a> {
    #[must_use]
    pub fn new(view: &'a ScopedView) -> Self {
        Self {
            view,
            offset: 0,
            finished: false,
        }
    }

    /// View position of the next batch.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Answer one signal.
    pub fn next_page(&mut self, signal: PageSignal) -> Page<'a> {
        if self.finished || signal == PageSignal::Stop || self.offset >= self.view.len() {
            self.finished = true;
            return Page::End;
        }

        let offset = self.offset;
        let records = self.view.window(offset, PAGE_SIZE);
        self.offset = offset.saturating_add(PAGE_SIZE);
        Page::Batch { offset, records }
    }
}

// =============================================================================
// TESTS
// =============================================================================
