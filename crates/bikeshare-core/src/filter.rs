//! # Filter Engine
//!
//! Narrows a [`Dataset`] to the records matching a [`FilterSpec`].
//!
//! - `all` disables a selector
//! - Month and weekday predicates combine with logical AND
//! - Filtering is commutative and idempotent
//! - A view keeps row indices into the shared dataset, never copies of rows

use crate::calendar::Calendar;
use crate::store::Dataset;
use crate::{BikeshareError, CityAvailability, CityKey, FilterSpec, TripRecord};
use chrono::Weekday;
use std::sync::Arc;

// =============================================================================
// SCOPED VIEW
// =============================================================================

/// The subset of a dataset that survived a filter, in dataset order.
#[derive(Debug, Clone)]
pub struct ScopedView {
    dataset: Arc<Dataset>,
    rows: Vec<usize>,
}

impl ScopedView {
    /// A view over every record of the dataset.
    #[must_use]
    pub fn full(dataset: Arc<Dataset>) -> Self {
        let rows = (0..dataset.len()).collect();
        Self { dataset, rows }
    }

    /// The dataset this view borrows from.
    #[must_use]
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    #[must_use]
    pub fn city(&self) -> CityKey {
        self.dataset.city()
    }

    #[must_use]
    pub fn availability(&self) -> CityAvailability {
        self.dataset.availability()
    }

    /// Dataset indices of the records in this view, ascending.
    #[must_use]
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate the records of this view in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = &TripRecord> + '_ {
        self.rows.iter().filter_map(|&i| self.dataset.get(i))
    }

    /// Up to `limit` records starting at `offset` (a view position, not a
    /// dataset index). Empty when `offset` is past the end.
    #[must_use]
    pub fn window(&self, offset: usize, limit: usize) -> Vec<&TripRecord> {
        self.rows
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|&i| self.dataset.get(i))
            .collect()
    }
}

// =============================================================================
// ROW PREDICATE
// =============================================================================

/// A resolved filter: `None` matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowPredicate {
    month: Option<u32>,
    weekday: Option<Weekday>,
}

impl RowPredicate {
    fn matches(&self, record: &TripRecord) -> bool {
        self.month.is_none_or(|m| record.month() == m)
            && self.weekday.is_none_or(|d| record.weekday() == d)
    }
}

// =============================================================================
// FILTER ENGINE
// =============================================================================

/// Applies month / weekday selectors to datasets and views.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine {
    calendar: Calendar,
}

impl FilterEngine {
    #[must_use]
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    /// Scope a dataset to the records matching `spec`.
    ///
    /// `all`/`all` returns every record in original order. Month names are
    /// resolved against the full year; a month with no trips yields an empty
    /// view, which is a valid result.
    ///
    /// # Errors
    /// Returns `BikeshareError::InvalidFilter` if a selector is neither `all`
    /// nor a month / weekday name.
    pub fn apply(
        &self,
        dataset: &Arc<Dataset>,
        spec: &FilterSpec,
    ) -> Result<ScopedView, BikeshareError> {
        self.refine(&ScopedView::full(Arc::clone(dataset)), spec)
    }

    /// Narrow an existing view further. Refining a view with the filter that
    /// produced it returns the same rows.
    pub fn refine(
        &self,
        view: &ScopedView,
        spec: &FilterSpec,
    ) -> Result<ScopedView, BikeshareError> {
        let predicate = self.resolve(spec)?;
        let rows = view
            .rows
            .iter()
            .copied()
            .filter(|&i| view.dataset.get(i).is_some_and(|r| predicate.matches(r)))
            .collect();

        Ok(ScopedView {
            dataset: Arc::clone(&view.dataset),
            rows,
        })
    }

    fn resolve(&self, spec: &FilterSpec) -> Result<RowPredicate, BikeshareError> {
        let month = if spec.month_is_all() {
            None
        } else {
            Some(self.calendar.month_number(&spec.month).ok_or_else(|| {
                BikeshareError::InvalidFilter(format!("unknown month '{}'", spec.month))
            })?)
        };

        let weekday = if spec.day_is_all() {
            None
        } else {
            Some(self.calendar.weekday(&spec.day).ok_or_else(|| {
                BikeshareError::InvalidFilter(format!("unknown day '{}'", spec.day))
            })?)
        };

        Ok(RowPredicate { month, weekday })
    }
}

// =============================================================================
// TESTS
// =============================================================================
