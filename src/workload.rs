//! Random workload generation.
//!
//! Produces reproducible process sets for policy comparisons and
//! property-style tests. The same seed always yields the same workload.
//!
//! Generated processes have ids `1..=count` in arrival order and memory
//! requirements bounded by the largest configured partition, so every
//! workload is admissible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{ProcessDescriptor, Tick, CANONICAL_CAPACITIES};

/// Seeded generator of process descriptors.
///
/// # Example
/// ```
/// use u_procsim::workload::WorkloadGenerator;
///
/// let a = WorkloadGenerator::new(42).with_count(5).generate();
/// let b = WorkloadGenerator::new(42).with_count(5).generate();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    seed: u64,
    count: usize,
    max_memory: u64,
    max_interarrival: Tick,
    cpu_range: (Tick, Tick),
    io_frequency_range: (Tick, Tick),
    io_duration_range: (Tick, Tick),
}

impl WorkloadGenerator {
    /// Creates a generator with defaults: 10 processes, canonical partition
    /// sizes, inter-arrival gaps up to 20 ticks, CPU bursts 1..=200.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            count: 10,
            max_memory: CANONICAL_CAPACITIES[0],
            max_interarrival: 20,
            cpu_range: (1, 200),
            io_frequency_range: (0, 50),
            io_duration_range: (0, 20),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Caps memory requirements, typically at the largest partition.
    pub fn with_max_memory(mut self, max_memory: u64) -> Self {
        self.max_memory = max_memory.max(1);
        self
    }

    pub fn with_max_interarrival(mut self, gap: Tick) -> Self {
        self.max_interarrival = gap;
        self
    }

    /// Inclusive CPU burst range.
    pub fn with_cpu_range(mut self, min: Tick, max: Tick) -> Self {
        self.cpu_range = (min.min(max), max.max(min));
        self
    }

    /// Generates the workload.
    pub fn generate(&self) -> Vec<ProcessDescriptor> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut arrival: Tick = 0;

        (1..=self.count)
            .map(|id| {
                let desc = ProcessDescriptor::new(
                    id as u32,
                    rng.random_range(1..=self.max_memory),
                    arrival,
                    rng.random_range(self.cpu_range.0..=self.cpu_range.1),
                )
                .with_io(
                    rng.random_range(self.io_frequency_range.0..=self.io_frequency_range.1),
                    rng.random_range(self.io_duration_range.0..=self.io_duration_range.1),
                );
                arrival += rng.random_range(0..=self.max_interarrival);
                desc
            })
            .collect()
    }
}
