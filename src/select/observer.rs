//! Observation hook for stepwise runs.
//!
//! The selector pushes every Add/Drop decision to a `StepObserver` as it
//! happens. Presentation (printing, progress bars, logging) lives with the
//! observer, not with the algorithm.

use crate::domain::StepEvent;

/// Receives stepwise events in the order they are made.
pub trait StepObserver {
    fn on_step(&mut self, event: &StepEvent);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _event: &StepEvent) {}
}

impl<F> StepObserver for F
where
    F: FnMut(&StepEvent),
{
    fn on_step(&mut self, event: &StepEvent) {
        self(event)
    }
}
