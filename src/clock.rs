/// Cycle time of the simulated processor: one fetch/decode cycle is charged per trace record
/// before dispatch, independent of any cache timing (2 GHz clock).
pub const PROCESSOR_CYCLE_TIME: f64 = 0.5e-9;

/// The `Clock` struct tracks the total elapsed simulation time of a single trial in seconds.
/// Every cache level and the DRAM advance the same instance by their access latency, and the
/// driver charges one processor cycle per record, so the final value is the wall-clock estimate
/// idle-energy figures are derived from. One clock is owned per trial and never shared across
/// trials.
#[derive(Debug, Default)]
pub struct Clock {
    elapsed: f64,
}

impl Clock {
    /// Create a new instance of the `Clock` struct with zero elapsed time.
    pub fn new() -> Self {
        Self { elapsed: 0.0 }
    }

    /// Advance the clock by the given number of seconds.
    pub fn advance(&mut self, seconds: f64) {
        self.elapsed += seconds;
    }

    /// Total elapsed time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// The `PowerProfile` struct groups the timing and power constants of one memory level: access
/// latency, power factor during reads/writes, idle power draw, and the fixed energy penalty paid
/// per access for fills and writebacks. Times are seconds, powers watts, penalties joules.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct PowerProfile {
    pub access_time: f64,
    pub rw_power: f64,
    pub idle_power: f64,
    pub fill_penalty: f64,
}

impl PowerProfile {
    /// L1 profile: 0.5 ns access, 1 W during accesses, 0.5 W idle per sub-cache.
    pub const L1: PowerProfile = PowerProfile {
        access_time: 0.5e-9,
        rw_power: 1.0,
        idle_power: 0.5,
        fill_penalty: 0.0,
    };

    /// L2 profile: 5 ns access, 2 W during accesses, 0.8 W idle, 5 pJ fill penalty.
    pub const L2: PowerProfile = PowerProfile {
        access_time: 5.0e-9,
        rw_power: 2.0,
        idle_power: 0.8,
        fill_penalty: 5.0e-12,
    };

    /// DRAM profile: 45 ns access, 4 W during accesses, 0.8 W idle, 640 pJ access penalty.
    pub const DRAM: PowerProfile = PowerProfile {
        access_time: 45.0e-9,
        rw_power: 4.0,
        idle_power: 0.8,
        fill_penalty: 640.0e-12,
    };

    /// Dynamic energy charged for one access at this level, hit or miss.
    pub fn access_energy(&self) -> f64 {
        self.rw_power * self.access_time + self.fill_penalty
    }

    /// Idle energy over the given elapsed time. Derived after the fact from the trial clock
    /// rather than accumulated per access.
    pub fn idle_energy(&self, elapsed: f64) -> f64 {
        self.idle_power * elapsed
    }
}
