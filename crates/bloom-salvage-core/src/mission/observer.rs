use super::metrics::StepRecord;
use super::Outcome;
use crate::grid::PresenceMask;
use std::sync::mpsc::Sender;

/// Borrowed view of a trial right after a completed step.
#[derive(Clone, Copy, Debug)]
pub struct StepSnapshot<'a> {
    pub step: usize,
    pub elapsed_minutes: f64,
    pub fleet_size: usize,
    pub integrity: i32,
    pub outcome: Outcome,
    pub removed: usize,
    pub exposure: usize,
    pub mask: &'a PresenceMask,
}

impl StepSnapshot<'_> {
    pub fn to_record(&self) -> StepRecord {
        StepRecord {
            step: self.step,
            elapsed_minutes: self.elapsed_minutes,
            fleet_size: self.fleet_size,
            integrity: self.integrity,
            outcome: self.outcome,
            occupied_cells: self.mask.occupied_count(),
            removed: self.removed,
            exposure: self.exposure,
        }
    }
}

/// Receives each completed step. Implementations must not block: the trial
/// calls them inline and waits for nothing they produce.
pub trait StepObserver {
    fn on_step(&mut self, snapshot: &StepSnapshot<'_>);
}

impl<F> StepObserver for F
where
    F: FnMut(&StepSnapshot<'_>),
{
    fn on_step(&mut self, snapshot: &StepSnapshot<'_>) {
        self(snapshot)
    }
}

/// Headless observer that ignores every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _snapshot: &StepSnapshot<'_>) {}
}

/// Collects an owned record per step.
#[derive(Clone, Debug, Default)]
pub struct StepRecorder {
    pub records: Vec<StepRecord>,
}

impl StepObserver for StepRecorder {
    fn on_step(&mut self, snapshot: &StepSnapshot<'_>) {
        self.records.push(snapshot.to_record());
    }
}

/// Forwards records to another thread over an unbounded channel.
/// A disconnected receiver is ignored.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    tx: Sender<StepRecord>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<StepRecord>) -> Self {
        Self { tx }
    }
}

impl StepObserver for ChannelObserver {
    fn on_step(&mut self, snapshot: &StepSnapshot<'_>) {
        let _ = self.tx.send(snapshot.to_record());
    }
}
