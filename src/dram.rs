use crate::clock::{Clock, PowerProfile};

/// `Dram` is the terminal level of the hierarchy. It never misses and never evicts; the struct
/// holds no content state at all, only the cumulative cost of having been reached. Both entry
/// points charge the same latency and dynamic energy since the model does not distinguish read
/// from write timing at this level.
pub struct Dram {
    profile: PowerProfile,
    pub accesses: u64,
    pub dynamic_energy: f64,
}

impl Dram {
    pub fn build(profile: PowerProfile) -> Self {
        Self {
            profile,
            accesses: 0,
            dynamic_energy: 0.0,
        }
    }

    /// Fetch a line for a fill in the level above.
    pub fn read(&mut self, clock: &mut Clock) {
        self.access(clock);
    }

    /// Absorb a writethrough or a dirty-line writeback.
    pub fn write(&mut self, clock: &mut Clock) {
        self.access(clock);
    }

    fn access(&mut self, clock: &mut Clock) {
        clock.advance(self.profile.access_time);
        self.accesses += 1;
        self.dynamic_energy += self.profile.access_energy();
    }

    /// Idle energy over the trial, derived from the shared clock.
    pub fn idle_energy(&self, clock: &Clock) -> f64 {
        self.profile.idle_energy(clock.elapsed())
    }
}
