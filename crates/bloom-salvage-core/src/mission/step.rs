use super::{Outcome, Trial};
use crate::drift;
use crate::salvage;
use crate::zone::ZoneMonitor;

impl Trial<'_> {
    /// Advance one step and return the resulting outcome.
    ///
    /// Boats act on the post-drift distribution before the rings are assessed,
    /// so removals in a step are credited before that step's damage.
    pub fn step(&mut self) -> Outcome {
        if self.state.outcome.is_terminal() {
            return self.state.outcome;
        }
        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            self.state.finish(Outcome::Cancelled);
            return self.state.outcome;
        }

        self.state.step += 1;
        self.advect_phase();
        let removed = self.salvage_phase();
        self.state.removed_last_step = removed;
        self.removed_total += removed;
        self.assess_phase();

        if !self.state.outcome.is_terminal() && self.state.step >= self.num_steps {
            self.state.finish(Outcome::Success);
        }
        self.state.outcome
    }

    /// Replace the mask with its drifted successor.
    fn advect_phase(&mut self) {
        self.mask = drift::advect(
            &self.mask,
            self.field,
            self.config.schedule.dt_hours(),
            self.config.resolution_m,
        );
    }

    fn salvage_phase(&mut self) -> usize {
        salvage::remove(
            &mut self.mask,
            self.config.zone.intake,
            self.radii.outer,
            self.capacity,
        )
    }

    /// Inner-ring intrusion zeroes integrity; otherwise ring exposure depletes it.
    fn assess_phase(&mut self) {
        let intake = self.config.zone.intake;
        let monitor = ZoneMonitor::new(&self.mask);

        if monitor.any_in_zone(intake, self.radii.inner) {
            self.state.integrity = 0;
            self.state.exposure_last_step = 0;
            self.state.finish(Outcome::Breach);
            return;
        }

        let exposure = monitor
            .points_in_annulus(intake, self.radii.outer, self.radii.inner)
            .len();
        self.state.exposure_last_step = exposure;
        self.state.deplete(exposure);
        if self.state.integrity == 0 {
            self.state.finish(Outcome::Exhausted);
        }
    }
}
