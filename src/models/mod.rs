//! Simulation domain models.
//!
//! Provides the data types the engine operates on: process descriptors and
//! records, the fixed partition table, and the registry/ready-pool pair.
//!
//! # Time
//!
//! All times are integer ticks relative to the start of a run (t=0).

mod partition;
mod process;
mod registry;

pub use partition::{Partition, PartitionTable, CANONICAL_CAPACITIES};
pub use process::{ProcessDescriptor, ProcessRecord, ProcessState};
pub use registry::{JobRegistry, ProcessHandle, ReadyPool};

/// Process identifier.
pub type Pid = u32;

/// One unit of simulated time.
pub type Tick = u64;

/// 1-based partition number.
pub type PartitionNumber = u32;
