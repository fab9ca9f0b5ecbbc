use crate::address::Geometry;
use crate::clock::{Clock, PowerProfile, PROCESSOR_CYCLE_TIME};
use crate::dram::Dram;
use crate::stats::{AccessStats, TrialMetrics};
use crate::trace::{Operation, TraceRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// `WritePolicy` selects how a cache level propagates writes to the level below it. Both
/// variants appear in practice; the hierarchy accepts either per level instead of hard-coding
/// one.
#[derive(Debug, PartialEq, Eq, Clone, Copy, clap::ValueEnum)]
pub enum WritePolicy {
    /// Absorb the write locally and mark the line dirty; the level below sees it only when the
    /// line is evicted.
    WriteBack,
    /// Forward every write to the level below immediately; lines never turn dirty.
    WriteThrough,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::WriteBack => write!(f, "write-back"),
            WritePolicy::WriteThrough => write!(f, "write-through"),
        }
    }
}

/// `ResidentLine` describes the block currently occupying a cache slot. The full address is
/// retained alongside the tag so a dirty victim can be flushed to the level below without
/// reconstructing its location from tag and index bits.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ResidentLine {
    pub tag: u32,
    pub address: u32,
    pub dirty: bool,
}

/// A cache slot: `None` while cold, `Some` once a block has been installed. A dirty line always
/// carries a tag by construction.
pub type CacheLine = Option<ResidentLine>;

/// `VictimSelector` abstracts the eviction choice made when a full set must give up a line.
/// Production wiring draws uniformly from a seeded random source; tests substitute a scripted
/// sequence to pin down exact eviction order.
pub trait VictimSelector {
    /// Return the slot to evict, in `0..ways`.
    fn select(&mut self, ways: usize) -> usize;
}

/// Uniform-random victim choice. Each trial owns an independently seeded instance so trials
/// never share eviction randomness.
pub struct RandomVictimSelector(StdRng);

impl RandomVictimSelector {
    /// Create a selector seeded from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Create a selector with a fixed seed for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl VictimSelector for RandomVictimSelector {
    fn select(&mut self, ways: usize) -> usize {
        self.0.gen_range(0..ways)
    }
}

// Selects which of the two L1 arrays an access targets. Writes always target the data side.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum L1Array {
    Instruction,
    Data,
}

/// The `L1Cache` struct models the split first-level cache: two direct-mapped arrays of equal
/// size, one holding instruction lines and one holding data lines. Each index maps to exactly
/// one line per array, so a miss has no placement choice; the only decision is whether the
/// displaced line must be flushed to L2 first. Every entry point charges the level's access
/// latency and dynamic energy whether it hits or misses.
pub struct L1Cache {
    geometry: Geometry,
    policy: WritePolicy,
    profile: PowerProfile,
    instruction_lines: Vec<CacheLine>,
    data_lines: Vec<CacheLine>,
    pub stats: AccessStats,
    pub dynamic_energy: f64,
}

impl L1Cache {
    /// Create a new `L1Cache` instance with both arrays cold.
    ///
    /// # Arguments
    ///
    /// * `geometry` - bit-field layout shared by the instruction and data arrays.
    /// * `policy` - write-propagation policy toward L2.
    /// * `profile` - timing and power constants for this level.
    pub fn build(geometry: Geometry, policy: WritePolicy, profile: PowerProfile) -> Self {
        Self {
            geometry,
            policy,
            profile,
            instruction_lines: vec![None; geometry.rows],
            data_lines: vec![None; geometry.rows],
            stats: AccessStats::new(),
            dynamic_energy: 0.0,
        }
    }

    /// Read a data line. On a miss the line is fetched through L2 and installed clean.
    pub fn read_data(
        &mut self,
        address: u32,
        l2: &mut L2Cache,
        dram: &mut Dram,
        clock: &mut Clock,
    ) -> bool {
        self.access(L1Array::Data, false, address, l2, dram, clock)
    }

    /// Fetch an instruction line. On a miss the line is fetched through L2 and installed clean.
    pub fn read_instruction(
        &mut self,
        address: u32,
        l2: &mut L2Cache,
        dram: &mut Dram,
        clock: &mut Clock,
    ) -> bool {
        self.access(L1Array::Instruction, false, address, l2, dram, clock)
    }

    /// Write a data line. Under write-back a hit marks the line dirty and a miss installs the
    /// line already dirty; under write-through the write is forwarded to L2 immediately and the
    /// resident line stays clean.
    pub fn write(
        &mut self,
        address: u32,
        l2: &mut L2Cache,
        dram: &mut Dram,
        clock: &mut Clock,
    ) -> bool {
        self.access(L1Array::Data, true, address, l2, dram, clock)
    }

    /// Shared hit/miss resolution for all three entry points.
    ///
    /// The miss path always fetches through L2 first (fill semantics regardless of the requested
    /// operation), then flushes the displaced line to L2 at its *old* address if it is dirty, and
    /// only then installs the new tag.
    fn access(
        &mut self,
        array: L1Array,
        write: bool,
        address: u32,
        l2: &mut L2Cache,
        dram: &mut Dram,
        clock: &mut Clock,
    ) -> bool {
        clock.advance(self.profile.access_time);
        self.dynamic_energy += self.profile.access_energy();

        let decoded = self.geometry.decode(address);
        let current = self.lines(array)[decoded.index];

        if let Some(resident) = current {
            if resident.tag == decoded.tag {
                self.stats.record_hit();
                if write {
                    match self.policy {
                        WritePolicy::WriteBack => {
                            self.lines_mut(array)[decoded.index] = Some(ResidentLine {
                                dirty: true,
                                ..resident
                            });
                        }
                        WritePolicy::WriteThrough => {
                            l2.write(address, dram, clock);
                        }
                    }
                }
                return true;
            }
        }

        self.stats.record_miss();
        l2.read(address, dram, clock);

        if let Some(victim) = current {
            if victim.dirty {
                self.stats.record_writeback();
                l2.write(victim.address, dram, clock);
            }
        }

        let dirty = write && self.policy == WritePolicy::WriteBack;
        if write && self.policy == WritePolicy::WriteThrough {
            l2.write(address, dram, clock);
        }
        self.lines_mut(array)[decoded.index] = Some(ResidentLine {
            tag: decoded.tag,
            address,
            dirty,
        });
        false
    }

    fn lines(&self, array: L1Array) -> &[CacheLine] {
        match array {
            L1Array::Instruction => &self.instruction_lines,
            L1Array::Data => &self.data_lines,
        }
    }

    fn lines_mut(&mut self, array: L1Array) -> &mut [CacheLine] {
        match array {
            L1Array::Instruction => &mut self.instruction_lines,
            L1Array::Data => &mut self.data_lines,
        }
    }

    /// Idle energy over the trial. The factor of two accounts for the instruction and data
    /// arrays idling concurrently.
    pub fn idle_energy(&self, clock: &Clock) -> f64 {
        self.profile.idle_energy(clock.elapsed()) * 2.0
    }
}

/// The `L2Cache` struct models the shared second-level cache: an array of sets, each holding
/// `associativity` lines any tag mapping to the set may occupy. A miss fetches the line from
/// DRAM and installs it into an empty slot when one exists; a full set gives up a victim chosen
/// by the injected selector, flushing it to DRAM first when dirty. Like L1, every entry point
/// charges latency and dynamic energy (including the fill penalty) whether it hits or misses.
pub struct L2Cache {
    geometry: Geometry,
    policy: WritePolicy,
    profile: PowerProfile,
    associativity: usize,
    sets: Vec<Vec<CacheLine>>,
    selector: Box<dyn VictimSelector>,
    pub stats: AccessStats,
    pub dynamic_energy: f64,
}

impl L2Cache {
    /// Create a new `L2Cache` instance with every set cold.
    ///
    /// # Arguments
    ///
    /// * `geometry` - bit-field layout derived from size, line size, and associativity.
    /// * `associativity` - number of lines per set.
    /// * `policy` - write-propagation policy toward DRAM.
    /// * `profile` - timing and power constants for this level.
    /// * `selector` - eviction choice for full sets.
    pub fn build(
        geometry: Geometry,
        associativity: usize,
        policy: WritePolicy,
        profile: PowerProfile,
        selector: Box<dyn VictimSelector>,
    ) -> Self {
        Self {
            geometry,
            policy,
            profile,
            associativity,
            sets: vec![vec![None; associativity]; geometry.rows],
            selector,
            stats: AccessStats::new(),
            dynamic_energy: 0.0,
        }
    }

    /// Look up a line for a fill in L1. A miss fetches the line from DRAM.
    pub fn read(&mut self, address: u32, dram: &mut Dram, clock: &mut Clock) -> bool {
        self.access(address, false, dram, clock)
    }

    /// Absorb a write arriving from L1 (a writethrough or a dirty-line flush).
    pub fn write(&mut self, address: u32, dram: &mut Dram, clock: &mut Clock) -> bool {
        self.access(address, true, dram, clock)
    }

    fn access(&mut self, address: u32, write: bool, dram: &mut Dram, clock: &mut Clock) -> bool {
        clock.advance(self.profile.access_time);
        self.dynamic_energy += self.profile.access_energy();

        let decoded = self.geometry.decode(address);
        let matching = self.sets[decoded.index]
            .iter()
            .position(|line| matches!(line, Some(resident) if resident.tag == decoded.tag));

        if let Some(slot) = matching {
            self.stats.record_hit();
            if write {
                match self.policy {
                    WritePolicy::WriteBack => {
                        if let Some(resident) = self.sets[decoded.index][slot].as_mut() {
                            resident.dirty = true;
                        }
                    }
                    WritePolicy::WriteThrough => dram.write(clock),
                }
            }
            return true;
        }

        self.stats.record_miss();
        dram.read(clock);

        let slot = match self.sets[decoded.index].iter().position(|line| line.is_none()) {
            Some(empty) => empty,
            None => {
                let victim = self.selector.select(self.associativity);
                if let Some(resident) = self.sets[decoded.index][victim] {
                    if resident.dirty {
                        self.stats.record_writeback();
                        dram.write(clock);
                    }
                }
                victim
            }
        };

        let dirty = write && self.policy == WritePolicy::WriteBack;
        if write && self.policy == WritePolicy::WriteThrough {
            dram.write(clock);
        }
        self.sets[decoded.index][slot] = Some(ResidentLine {
            tag: decoded.tag,
            address,
            dirty,
        });
        false
    }

    /// Idle energy over the trial, derived from the shared clock.
    pub fn idle_energy(&self, clock: &Clock) -> f64 {
        self.profile.idle_energy(clock.elapsed())
    }
}

/// The `MemoryHierarchy` struct is the culmination of all other structures in this module. One
/// instance owns the complete mutable state of a single trial: both caches, the DRAM counters,
/// and the shared clock. The driver entry points below are the only way that state is mutated,
/// which keeps trials independently constructible and safe to run back to back.
pub struct MemoryHierarchy {
    pub l1: L1Cache,
    pub l2: L2Cache,
    pub dram: Dram,
    pub clock: Clock,
}

impl MemoryHierarchy {
    /// Create a new `MemoryHierarchy` instance with cold caches and a zeroed clock.
    pub fn build(
        l1_geometry: Geometry,
        l2_geometry: Geometry,
        l2_associativity: usize,
        l1_policy: WritePolicy,
        l2_policy: WritePolicy,
        selector: Box<dyn VictimSelector>,
    ) -> Self {
        Self {
            l1: L1Cache::build(l1_geometry, l1_policy, PowerProfile::L1),
            l2: L2Cache::build(
                l2_geometry,
                l2_associativity,
                l2_policy,
                PowerProfile::L2,
                selector,
            ),
            dram: Dram::build(PowerProfile::DRAM),
            clock: Clock::new(),
        }
    }

    /// Read a data line through the hierarchy.
    pub fn read_data(&mut self, address: u32) -> bool {
        self.l1
            .read_data(address, &mut self.l2, &mut self.dram, &mut self.clock)
    }

    /// Fetch an instruction line through the hierarchy.
    pub fn read_instruction(&mut self, address: u32) -> bool {
        self.l1
            .read_instruction(address, &mut self.l2, &mut self.dram, &mut self.clock)
    }

    /// Write a data line through the hierarchy.
    pub fn write(&mut self, address: u32) -> bool {
        self.l1
            .write(address, &mut self.l2, &mut self.dram, &mut self.clock)
    }

    /// Process one trace record: charge the per-record processor cycle, then dispatch on the
    /// operation. Flush and ignore records are consumed without touching any cache state.
    pub fn process(&mut self, record: &TraceRecord) {
        self.clock.advance(PROCESSOR_CYCLE_TIME);
        match record.operation {
            Operation::DataRead => {
                self.read_data(record.address);
            }
            Operation::DataWrite => {
                self.write(record.address);
            }
            Operation::InstructionFetch => {
                self.read_instruction(record.address);
            }
            Operation::Flush | Operation::Ignore => {}
        }
    }

    /// Snapshot the trial's complete output record.
    ///
    /// # Arguments
    ///
    /// * `skipped_records` - malformed-line count reported by the trace reader.
    pub fn metrics(&self, skipped_records: u64) -> TrialMetrics {
        TrialMetrics {
            l1: self.l1.stats,
            l2: self.l2.stats,
            l1_dynamic_energy: self.l1.dynamic_energy,
            l1_idle_energy: self.l1.idle_energy(&self.clock),
            l2_dynamic_energy: self.l2.dynamic_energy,
            l2_idle_energy: self.l2.idle_energy(&self.clock),
            dram_accesses: self.dram.accesses,
            dram_dynamic_energy: self.dram.dynamic_energy,
            dram_idle_energy: self.dram.idle_energy(&self.clock),
            elapsed_seconds: self.clock.elapsed(),
            skipped_records,
        }
    }
}
