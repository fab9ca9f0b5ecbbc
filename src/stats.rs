use std::fmt;
use std::ops::{Add, AddAssign};

/// The `AccessStats` struct is a simple collection of named counters kept by each cache level:
/// hits, misses, and dirty-line writebacks issued to the level below. Total accesses and the hit
/// ratio are derived rather than stored so the `hits + misses == accesses` invariant can never be
/// violated by a missed update.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct AccessStats {
    pub hits: u64,
    pub misses: u64,
    pub writebacks: u64,
}

impl AccessStats {
    /// Create a new instance of the `AccessStats` struct with all counters initialized to zero.
    pub fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            writebacks: 0,
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_writeback(&mut self) {
        self.writebacks += 1;
    }

    /// Total accesses observed at this level.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit. NaN when the level was never accessed; callers
    /// aggregating ratios across trials must exclude such samples rather than crash.
    pub fn hit_ratio(&self) -> f64 {
        self.hits as f64 / self.accesses() as f64
    }
}

impl Add<AccessStats> for AccessStats {
    type Output = AccessStats;

    fn add(self, rhs: AccessStats) -> Self::Output {
        Self::Output {
            hits: self.hits + rhs.hits,
            misses: self.misses + rhs.misses,
            writebacks: self.writebacks + rhs.writebacks,
        }
    }
}

impl AddAssign for AccessStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.add(rhs)
    }
}

/// `TrialMetrics` is the complete output record of one trial: per-level access counters, the
/// dynamic energy accumulated during accesses, the idle energy derived from the final clock
/// value, DRAM traffic, total elapsed time, and the number of malformed records the reader
/// skipped.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TrialMetrics {
    pub l1: AccessStats,
    pub l2: AccessStats,
    pub l1_dynamic_energy: f64,
    pub l1_idle_energy: f64,
    pub l2_dynamic_energy: f64,
    pub l2_idle_energy: f64,
    pub dram_accesses: u64,
    pub dram_dynamic_energy: f64,
    pub dram_idle_energy: f64,
    pub elapsed_seconds: f64,
    pub skipped_records: u64,
}

impl fmt::Display for TrialMetrics {
    /// Display format specification for the `TrialMetrics` struct implemented to simplify the
    /// process of outputting per-trial statistics to the terminal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "
Trial Metrics
---------------------------------
l1 hits:              {:012}
l1 misses:            {:012}
l1 writebacks:        {:012}
l2 hits:              {:012}
l2 misses:            {:012}
l2 writebacks:        {:012}
dram accesses:        {:012}
skipped records:      {:012}

l1 hit ratio:         {:.6}
l2 hit ratio:         {:.6}
l1 energy (dynamic):  {:.6e}
l1 energy (idle):     {:.6e}
l2 energy (dynamic):  {:.6e}
l2 energy (idle):     {:.6e}
dram energy (dynamic):{:.6e}
dram energy (idle):   {:.6e}
elapsed seconds:      {:.6e}
               ",
            self.l1.hits,
            self.l1.misses,
            self.l1.writebacks,
            self.l2.hits,
            self.l2.misses,
            self.l2.writebacks,
            self.dram_accesses,
            self.skipped_records,
            self.l1.hit_ratio(),
            self.l2.hit_ratio(),
            self.l1_dynamic_energy,
            self.l1_idle_energy,
            self.l2_dynamic_energy,
            self.l2_idle_energy,
            self.dram_dynamic_energy,
            self.dram_idle_energy,
            self.elapsed_seconds,
        )
    }
}
