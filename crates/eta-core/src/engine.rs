//! The scheduling engine.
//!
//! Owns the enabler and event registries and derives a consistent estimated
//! start/end for every event.
//!
//! # Algorithm Summary
//!
//! 1. Fix each enabler's start for the cycle day (cached until invalidated)
//! 2. Order events topologically over the predecessor relation
//! 3. Estimate each event from its enabler start, predecessor ends, and
//!    duration, clamping estimates out of the past; recorded actuals win

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::enabler::EnablerJob;
use crate::event::Event;
use crate::graph::topological_order;
use crate::report::{EnablerReport, EventReport, ScheduleReport, fmt_utc, fmt_utc_opt};
use crate::types::{EnablerId, EventId, TimeOfDay, ValidationError};

/// Errors from scheduler mutation operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// `register_event` referenced an enabler that was never registered.
    #[error("enabler {0} is not registered")]
    UnknownEnabler(EnablerId),

    /// An operation referenced an event that was never registered. Non-fatal:
    /// the scheduler state is unchanged and the caller may continue.
    #[error("event {0} is not registered")]
    UnknownEvent(EventId),

    /// A field failed validation at registration.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Whether cached enabler start times may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Stale,
    Fresh,
}

/// Outcome of one full recomputation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputeSummary {
    /// Number of events that received estimates (always all of them).
    pub events_computed: usize,
    /// Events caught in a dependency cycle, in registration order. These
    /// still received estimates, but ordering guarantees may not hold among
    /// them.
    pub cyclic: Vec<EventId>,
}

impl RecomputeSummary {
    /// `true` when the pass hit a dependency cycle.
    #[must_use]
    pub fn had_cycle(&self) -> bool {
        !self.cyclic.is_empty()
    }
}

/// An event's recorded actual times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActualTimes {
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
}

/// An event's computed estimated times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimatedTimes {
    pub estimated_start: Option<DateTime<Utc>>,
    pub estimated_end: Option<DateTime<Utc>>,
}

/// One row of the all-events estimate snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEstimate {
    pub id: EventId,
    pub enabler: EnablerId,
    pub estimated_start: Option<DateTime<Utc>>,
    pub estimated_end: Option<DateTime<Utc>>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub predecessors: Vec<EventId>,
}

/// An event's projected times on an average day, from [`Scheduler::average_times`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AverageTimes {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The gating enabler's projected start on the same average day.
    pub enabler_start: DateTime<Utc>,
}

/// The scheduling engine: registries, clock state, and estimate computation.
///
/// One instance per schedule; all operations are synchronous and the engine
/// performs no I/O. A concurrent host must guard the instance with a single
/// mutual-exclusion boundary.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// The nominal scheduling day; day arithmetic anchors to its midnight.
    cycle_date: DateTime<Utc>,
    /// Wall-clock instant captured at the last recomputation entry.
    observed_at: DateTime<Utc>,
    enablers: HashMap<EnablerId, EnablerJob>,
    enabler_order: Vec<EnablerId>,
    events: HashMap<EventId, Event>,
    event_order: Vec<EventId>,
    enabler_times: Freshness,
}

impl Scheduler {
    /// Creates an empty scheduler for the given cycle date, observing the
    /// current wall clock.
    #[must_use]
    pub fn new(cycle_date: DateTime<Utc>) -> Self {
        Self::with_observed_at(cycle_date, Utc::now())
    }

    /// Creates an empty scheduler with an explicit observation instant.
    ///
    /// The deterministic seam: hosts replaying history and tests pass a fixed
    /// instant here and to [`Self::refresh_at`].
    #[must_use]
    pub fn with_observed_at(cycle_date: DateTime<Utc>, observed_at: DateTime<Utc>) -> Self {
        Self {
            cycle_date,
            observed_at,
            enablers: HashMap::new(),
            enabler_order: Vec::new(),
            events: HashMap::new(),
            event_order: Vec::new(),
            enabler_times: Freshness::Stale,
        }
    }

    /// The nominal scheduling day.
    #[must_use]
    pub const fn cycle_date(&self) -> DateTime<Utc> {
        self.cycle_date
    }

    /// The observation instant of the last recomputation.
    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Looks up an enabler job by id.
    #[must_use]
    pub fn enabler(&self, id: &EnablerId) -> Option<&EnablerJob> {
        self.enablers.get(id)
    }

    /// Looks up an event by id.
    #[must_use]
    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    /// Enabler jobs in registration order.
    pub fn enablers(&self) -> impl Iterator<Item = &EnablerJob> {
        self.enabler_order.iter().map(|id| &self.enablers[id])
    }

    /// Events in registration order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.event_order.iter().map(|id| &self.events[id])
    }

    // ========== Registration ==========

    /// Registers an enabler job and marks enabler start times stale.
    ///
    /// Re-registering an existing id replaces the timing configuration but
    /// keeps the already-gated event list.
    pub fn register_enabler(
        &mut self,
        id: EnablerId,
        average_start: TimeOfDay,
        scheduled_hour: u32,
        day_offset: u32,
    ) -> Result<(), ScheduleError> {
        let mut job = EnablerJob::new(id, average_start, scheduled_hour, day_offset)?;

        if let Some(existing) = self.enablers.get_mut(&job.id) {
            tracing::warn!(enabler = %job.id, "enabler re-registered; replacing timing configuration");
            job.events = std::mem::take(&mut existing.events);
            *existing = job;
        } else {
            self.enabler_order.push(job.id.clone());
            self.enablers.insert(job.id.clone(), job);
        }

        self.enabler_times = Freshness::Stale;
        Ok(())
    }

    /// Registers an event under its enabler.
    ///
    /// Fails with [`ScheduleError::UnknownEnabler`] if the enabler was never
    /// registered. Re-registering an existing event id replaces the
    /// definition. Any estimates the caller set on `event` are discarded.
    pub fn register_event(&mut self, mut event: Event) -> Result<(), ScheduleError> {
        if !self.enablers.contains_key(&event.enabler) {
            return Err(ScheduleError::UnknownEnabler(event.enabler.clone()));
        }

        event.estimated_start = None;
        event.estimated_end = None;

        let id = event.id.clone();
        let enabler_id = event.enabler.clone();

        if let Some(previous) = self.events.insert(id.clone(), event) {
            tracing::warn!(event = %id, "event re-registered; replacing definition");
            if previous.enabler != enabler_id {
                if let Some(old_gate) = self.enablers.get_mut(&previous.enabler) {
                    old_gate.events.retain(|e| e != &id);
                }
                if let Some(gate) = self.enablers.get_mut(&enabler_id) {
                    gate.events.push(id);
                }
            }
        } else {
            self.event_order.push(id.clone());
            if let Some(gate) = self.enablers.get_mut(&enabler_id) {
                gate.events.push(id);
            }
        }

        Ok(())
    }

    /// Overwrites an event's recorded actual times.
    ///
    /// Estimates are not touched; the caller recomputes when ready. Unknown
    /// ids are reported and leave the scheduler unchanged.
    pub fn record_actual_times(
        &mut self,
        id: &EventId,
        actual_start: Option<DateTime<Utc>>,
        actual_end: Option<DateTime<Utc>>,
    ) -> Result<(), ScheduleError> {
        let Some(event) = self.events.get_mut(id) else {
            tracing::warn!(event = %id, "cannot record actual times for unknown event");
            return Err(ScheduleError::UnknownEvent(id.clone()));
        };
        event.actual_start = actual_start;
        event.actual_end = actual_end;
        Ok(())
    }

    // ========== Recomputation ==========

    /// Refreshes all estimates against the current wall clock.
    ///
    /// A new cycle date replaces the current one and invalidates cached
    /// enabler starts; `force_enabler_recalc` invalidates them regardless.
    pub fn refresh(
        &mut self,
        new_cycle_date: Option<DateTime<Utc>>,
        force_enabler_recalc: bool,
    ) -> RecomputeSummary {
        self.refresh_at(Utc::now(), new_cycle_date, force_enabler_recalc)
    }

    /// [`Self::refresh`] with an explicit observation instant.
    pub fn refresh_at(
        &mut self,
        now: DateTime<Utc>,
        new_cycle_date: Option<DateTime<Utc>>,
        force_enabler_recalc: bool,
    ) -> RecomputeSummary {
        if let Some(cycle_date) = new_cycle_date {
            self.cycle_date = cycle_date;
            self.enabler_times = Freshness::Stale;
        }
        if force_enabler_recalc {
            self.enabler_times = Freshness::Stale;
        }
        self.recompute_estimates_at(now)
    }

    /// Recomputes every event's estimates against the current wall clock,
    /// keeping the cycle date.
    pub fn recompute_estimates(&mut self) -> RecomputeSummary {
        self.recompute_estimates_at(Utc::now())
    }

    /// [`Self::recompute_estimates`] with an explicit observation instant,
    /// used for every past-clamp in the pass.
    pub fn recompute_estimates_at(&mut self, now: DateTime<Utc>) -> RecomputeSummary {
        self.observed_at = now;
        self.refresh_enabler_times();

        let topo = topological_order(&self.event_order, &self.existing_predecessors());
        if !topo.is_acyclic() {
            tracing::warn!(
                cyclic = ?topo.cyclic,
                "dependency cycle; affected events estimated in registration order"
            );
        }

        for id in topo.order.iter().chain(topo.cyclic.iter()) {
            self.estimate_event(id, now);
        }

        tracing::debug!(events = self.event_order.len(), "estimates recomputed");
        RecomputeSummary {
            events_computed: self.event_order.len(),
            cyclic: topo.cyclic,
        }
    }

    /// Events currently involved in a dependency cycle, in registration
    /// order. Read-only; does not recompute anything.
    #[must_use]
    pub fn dependency_cycles(&self) -> Vec<EventId> {
        topological_order(&self.event_order, &self.existing_predecessors()).cyclic
    }

    /// UTC midnight of the cycle day.
    fn cycle_midnight(&self) -> DateTime<Utc> {
        self.cycle_date
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc()
    }

    /// Recomputes cached enabler starts if they are stale.
    fn refresh_enabler_times(&mut self) {
        if self.enabler_times == Freshness::Fresh {
            return;
        }

        let midnight = self.cycle_midnight();
        let cycle_date = self.cycle_date;
        for id in &self.enabler_order {
            if let Some(job) = self.enablers.get_mut(id) {
                // A start computed before the cycle date collapses onto it.
                job.estimated_start = Some(nominal_start(job, midnight).max(cycle_date));
            }
        }

        self.enabler_times = Freshness::Fresh;
        tracing::debug!(enablers = self.enabler_order.len(), "enabler starts recomputed");
    }

    /// Predecessor lists restricted to registered events, deduplicated, keyed
    /// by event id.
    fn existing_predecessors(&self) -> HashMap<EventId, Vec<EventId>> {
        self.event_order
            .iter()
            .map(|id| {
                let mut seen = HashSet::new();
                let preds = self.events[id]
                    .predecessors
                    .iter()
                    .filter(|p| self.events.contains_key(*p))
                    .filter(|p| seen.insert((*p).clone()))
                    .cloned()
                    .collect();
                (id.clone(), preds)
            })
            .collect()
    }

    /// Assigns one event's estimated times. Predecessors must already carry
    /// their estimates for this pass (topological order guarantees it outside
    /// of cycles).
    fn estimate_event(&mut self, id: &EventId, now: DateTime<Utc>) {
        let Some(event) = self.events.get(id) else {
            return;
        };

        // Recorded actuals win over any computed estimate.
        if let (Some(start), Some(end)) = (event.actual_start, event.actual_end) {
            if let Some(event) = self.events.get_mut(id) {
                event.estimated_start = Some(start);
                event.estimated_end = Some(end);
            }
            return;
        }

        let enabler_start = self
            .enablers
            .get(&event.enabler)
            .and_then(|job| job.estimated_start)
            .unwrap_or(self.cycle_date);

        // Latest finish among registered predecessors, observed ends trumping
        // estimates; unknown ids and never-estimated predecessors contribute
        // nothing.
        let mut max_pred_end: Option<DateTime<Utc>> = None;
        for pred_id in &event.predecessors {
            let Some(pred) = self.events.get(pred_id) else {
                continue;
            };
            let Some(end) = pred.actual_end.or(pred.estimated_end) else {
                continue;
            };
            if max_pred_end.is_none_or(|m| end > m) {
                max_pred_end = Some(end);
            }
        }

        let mut start = match max_pred_end {
            Some(pred_end) if pred_end > enabler_start => pred_end,
            _ => enabler_start,
        };

        // An estimate must not sit in the past: once the observation instant
        // has moved beyond the cycle date, pull the start up to it; and never
        // let a start precede the cycle date itself.
        if start < now && now > self.cycle_date {
            start = now;
        } else if start < self.cycle_date {
            start = self.cycle_date;
        }

        let end = start + event.duration.to_duration();
        if let Some(event) = self.events.get_mut(id) {
            event.estimated_start = Some(start);
            event.estimated_end = Some(end);
        }
    }

    // ========== Average-day projection ==========

    /// Projects every event onto an average day: enabler timing and durations
    /// only, ignoring actuals and the observation instant.
    ///
    /// Enabler starts follow the usual past-midnight day shift but are not
    /// floored to the cycle date. Read-only; the engine's cached estimates
    /// are untouched.
    #[must_use]
    pub fn average_times(&self) -> BTreeMap<EventId, AverageTimes> {
        let midnight = self.cycle_midnight();
        let enabler_starts: HashMap<&EnablerId, DateTime<Utc>> = self
            .enabler_order
            .iter()
            .map(|id| (id, nominal_start(&self.enablers[id], midnight)))
            .collect();

        let topo = topological_order(&self.event_order, &self.existing_predecessors());
        if !topo.is_acyclic() {
            tracing::warn!(
                cyclic = ?topo.cyclic,
                "dependency cycle; averages for affected events ignore unresolved predecessors"
            );
        }

        let mut result = BTreeMap::new();
        for id in topo.order.iter().chain(topo.cyclic.iter()) {
            let event = &self.events[id];
            let enabler_start = enabler_starts
                .get(&event.enabler)
                .copied()
                .unwrap_or(midnight);

            let mut start = enabler_start;
            for pred_id in &event.predecessors {
                if let Some(pred) = result.get(pred_id) {
                    let pred: &AverageTimes = pred;
                    if pred.end > start {
                        start = pred.end;
                    }
                }
            }

            let end = start + event.duration.to_duration();
            result.insert(
                id.clone(),
                AverageTimes {
                    start,
                    end,
                    enabler_start,
                },
            );
        }
        result
    }

    // ========== Queries & reporting ==========

    /// An event's recorded actual times. `None` (with a warning) for unknown
    /// ids.
    #[must_use]
    pub fn actual_times(&self, id: &EventId) -> Option<ActualTimes> {
        let Some(event) = self.events.get(id) else {
            tracing::warn!(event = %id, "unknown event");
            return None;
        };
        Some(ActualTimes {
            actual_start: event.actual_start,
            actual_end: event.actual_end,
        })
    }

    /// An event's estimated times. `None` (with a warning) for unknown ids.
    #[must_use]
    pub fn estimated_times(&self, id: &EventId) -> Option<EstimatedTimes> {
        let Some(event) = self.events.get(id) else {
            tracing::warn!(event = %id, "unknown event");
            return None;
        };
        Some(EstimatedTimes {
            estimated_start: event.estimated_start,
            estimated_end: event.estimated_end,
        })
    }

    /// Every event's estimate/actual snapshot, in registration order.
    #[must_use]
    pub fn event_estimates(&self) -> Vec<EventEstimate> {
        self.event_order
            .iter()
            .map(|id| {
                let event = &self.events[id];
                EventEstimate {
                    id: event.id.clone(),
                    enabler: event.enabler.clone(),
                    estimated_start: event.estimated_start,
                    estimated_end: event.estimated_end,
                    actual_start: event.actual_start,
                    actual_end: event.actual_end,
                    predecessors: event.predecessors.clone(),
                }
            })
            .collect()
    }

    /// Full structured snapshot of the scheduler for host consumption.
    #[must_use]
    pub fn report(&self) -> ScheduleReport {
        let enablers = self
            .enabler_order
            .iter()
            .map(|id| {
                let job = &self.enablers[id];
                (
                    id.to_string(),
                    EnablerReport {
                        average_start: job.average_start.to_string(),
                        scheduled_hour: job.scheduled_hour,
                        day_offset: job.day_offset,
                        estimated_start: fmt_utc_opt(job.estimated_start),
                        events: job.events.iter().map(ToString::to_string).collect(),
                    },
                )
            })
            .collect();

        let events = self
            .event_order
            .iter()
            .map(|id| {
                let event = &self.events[id];
                (
                    id.to_string(),
                    EventReport {
                        enabler: event.enabler.to_string(),
                        average_start: event.average_start.to_string(),
                        average_end: event.average_end.to_string(),
                        duration: event.duration.to_string(),
                        predecessors: event.predecessors.iter().map(ToString::to_string).collect(),
                        actual_start: fmt_utc_opt(event.actual_start),
                        actual_end: fmt_utc_opt(event.actual_end),
                        estimated_start: fmt_utc_opt(event.estimated_start),
                        estimated_end: fmt_utc_opt(event.estimated_end),
                    },
                )
            })
            .collect();

        ScheduleReport {
            observed_at: fmt_utc(self.observed_at),
            cycle_date: fmt_utc(self.cycle_date),
            enablers,
            events,
        }
    }
}

/// The enabler's nominal start anchored to the given midnight: the average
/// start on that day, shifted one day when it precedes the scheduled hour
/// (the job conceptually runs past midnight), plus the configured day offset.
fn nominal_start(job: &EnablerJob, midnight: DateTime<Utc>) -> DateTime<Utc> {
    let candidate = midnight + job.average_start.since_midnight();
    let reference = midnight + Duration::hours(i64::from(job.scheduled_hour));
    let mut start = if candidate < reference {
        candidate + Duration::days(1)
    } else {
        candidate
    };
    if job.day_offset > 0 {
        start += Duration::days(i64::from(job.day_offset));
    }
    start
}
