//! Fixed memory partitions.
//!
//! A process must be granted a partition before it can become ready.
//! Partitions have static capacities and hold at most one process.
//!
//! # Allocation
//!
//! First fit in declared order: the table is scanned front to back and the
//! first free partition large enough wins. With the canonical layout this
//! is largest-first, which decides which processes starve under memory
//! pressure, so the scan order must not be replaced by a best-fit search.

use serde::{Deserialize, Serialize};

use super::{PartitionNumber, Pid, ProcessRecord};

/// Canonical partition capacities, numbered 1..=6 in this order.
pub const CANONICAL_CAPACITIES: [u64; 6] = [40, 25, 15, 10, 8, 2];

/// One fixed-capacity memory region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// 1-based partition number.
    pub number: PartitionNumber,
    /// Capacity in memory units.
    pub capacity: u64,
    /// Occupying process, `None` when free.
    pub occupant: Option<Pid>,
}

impl Partition {
    #[inline]
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Ordered set of partitions for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
}

impl PartitionTable {
    /// Creates a table from capacities, numbered 1.. in the given order.
    pub fn new(capacities: &[u64]) -> Self {
        let partitions = capacities
            .iter()
            .enumerate()
            .map(|(i, &capacity)| Partition {
                number: i as PartitionNumber + 1,
                capacity,
                occupant: None,
            })
            .collect();
        Self { partitions }
    }

    /// The canonical 40/25/15/10/8/2 layout.
    pub fn canonical() -> Self {
        Self::new(&CANONICAL_CAPACITIES)
    }

    /// Grants the first free partition that fits.
    ///
    /// Returns `false` and leaves the record untouched when nothing fits
    /// right now; the caller retries on a later tick.
    pub fn try_admit(&mut self, process: &mut ProcessRecord) -> bool {
        debug_assert!(
            process.partition.is_none(),
            "process {} already holds partition {:?}",
            process.id,
            process.partition
        );

        let slot = self
            .partitions
            .iter_mut()
            .find(|p| p.is_free() && p.capacity >= process.memory_required);

        match slot {
            Some(partition) => {
                partition.occupant = Some(process.id);
                process.partition = Some(partition.number);
                true
            }
            None => false,
        }
    }

    /// Frees the partition held by `process`.
    pub fn release(&mut self, process: &mut ProcessRecord) {
        let Some(number) = process.partition.take() else {
            debug_assert!(false, "process {} released without a partition", process.id);
            return;
        };

        if let Some(partition) = self.partitions.iter_mut().find(|p| p.number == number) {
            debug_assert_eq!(
                partition.occupant,
                Some(process.id),
                "partition {number} not owned by process {}",
                process.id
            );
            partition.occupant = None;
        }
    }

    /// Largest capacity in the table (0 when empty).
    pub fn largest_capacity(&self) -> u64 {
        self.partitions.iter().map(|p| p.capacity).max().unwrap_or(0)
    }

    /// Whether `memory` fits in some partition once it is free.
    pub fn can_ever_fit(&self, memory: u64) -> bool {
        memory <= self.largest_capacity()
    }

    /// Process occupying partition `number`.
    pub fn occupant_of(&self, number: PartitionNumber) -> Option<Pid> {
        self.get(number).and_then(|p| p.occupant)
    }

    /// Looks up a partition by number.
    pub fn get(&self, number: PartitionNumber) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.number == number)
    }

    pub fn free_count(&self) -> usize {
        self.partitions.iter().filter(|p| p.is_free()).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.partitions.len() - self.free_count()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }
}

impl Default for PartitionTable {
    fn default() -> Self {
        Self::canonical()
    }
}
