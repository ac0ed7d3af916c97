//! Process model.
//!
//! A process is described once by its input descriptor and then tracked
//! through the simulation by a mutable record (the PCB).
//!
//! # Lifecycle
//!
//! ```text
//! Unadmitted → Ready → Running → { Ready ⇄ Running }* → Terminated
//! ```
//!
//! `Waiting` is part of the state space but is never entered: I/O is
//! carried on the record, not driven by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PartitionNumber, Pid, Tick};

/// Lifecycle state of a simulated process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessState {
    /// Arrived or not, but no memory partition granted yet.
    Unadmitted,
    /// Holds a partition and waits in the ready pool.
    Ready,
    /// Owns the CPU.
    Running,
    /// Blocked on I/O. Reserved.
    Waiting,
    /// Finished all CPU work; partition released.
    Terminated,
}

impl ProcessState {
    /// Label used in execution tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unadmitted => "NEW",
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Waiting => "WAITING",
            Self::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable input description of one process.
///
/// # Example
/// ```
/// use u_procsim::models::ProcessDescriptor;
///
/// let p = ProcessDescriptor::new(1, 5, 0, 3).with_io(10, 2);
/// assert_eq!(p.effective_priority(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// Unique positive process identifier.
    pub id: Pid,
    /// Memory needed to be admitted.
    pub memory_required: u64,
    /// Tick at which the process may first be admitted.
    pub arrival_time: Tick,
    /// Total CPU work.
    pub cpu_time: Tick,
    /// CPU ticks between I/O requests.
    pub io_frequency: Tick,
    /// Length of each I/O request.
    pub io_duration: Tick,
    /// Explicit priority. `None` = use the id (smaller = more urgent).
    #[serde(default)]
    pub priority: Option<u32>,
}

impl ProcessDescriptor {
    /// Creates a descriptor without I/O.
    pub fn new(id: Pid, memory_required: u64, arrival_time: Tick, cpu_time: Tick) -> Self {
        Self {
            id,
            memory_required,
            arrival_time,
            cpu_time,
            io_frequency: 0,
            io_duration: 0,
            priority: None,
        }
    }

    /// Sets the I/O frequency and duration.
    pub fn with_io(mut self, frequency: Tick, duration: Tick) -> Self {
        self.io_frequency = frequency;
        self.io_duration = duration;
        self
    }

    /// Overrides the default id-order priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Priority used by priority policies (lower = more urgent).
    pub fn effective_priority(&self) -> u32 {
        self.priority.unwrap_or(self.id)
    }
}

/// Mutable per-process simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process identifier.
    pub id: Pid,
    /// Scheduling priority (lower = more urgent).
    pub priority: u32,
    /// Memory needed to be admitted.
    pub memory_required: u64,
    /// Tick at which the process may first be admitted.
    pub arrival_time: Tick,
    /// Total CPU work.
    pub total_cpu_time: Tick,
    /// CPU work still to do. Never increases.
    pub remaining_cpu_time: Tick,
    /// Carried from the descriptor.
    pub io_frequency: Tick,
    /// Carried from the descriptor.
    pub io_duration: Tick,
    /// Granted partition, if admitted and not yet released.
    pub partition: Option<PartitionNumber>,
    /// Current lifecycle state.
    pub state: ProcessState,
    /// First dispatch tick.
    pub start_time: Option<Tick>,
    /// Termination tick.
    pub finish_time: Option<Tick>,
    /// Time spent ready. Not accrued by the engine.
    pub accumulated_wait: Tick,
    /// Ticks at which I/O operations began. Not populated by the engine.
    pub io_start_history: Vec<Tick>,
}

impl ProcessRecord {
    /// Builds a fresh, unadmitted record.
    pub fn from_descriptor(desc: &ProcessDescriptor) -> Self {
        Self {
            id: desc.id,
            priority: desc.effective_priority(),
            memory_required: desc.memory_required,
            arrival_time: desc.arrival_time,
            total_cpu_time: desc.cpu_time,
            remaining_cpu_time: desc.cpu_time,
            io_frequency: desc.io_frequency,
            io_duration: desc.io_duration,
            partition: None,
            state: ProcessState::Unadmitted,
            start_time: None,
            finish_time: None,
            accumulated_wait: 0,
            io_start_history: Vec::new(),
        }
    }

    /// Whether the process has arrived by `now`.
    #[inline]
    pub fn has_arrived(&self, now: Tick) -> bool {
        self.arrival_time <= now
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// CPU time consumed so far.
    pub fn executed_time(&self) -> Tick {
        self.total_cpu_time - self.remaining_cpu_time
    }

    /// `finish_time - arrival_time`, once terminated.
    pub fn turnaround(&self) -> Option<Tick> {
        self.finish_time
            .map(|finish| finish.saturating_sub(self.arrival_time))
    }

    /// Mean gap between consecutive I/O starts (0 with fewer than two).
    pub fn mean_io_gap(&self) -> f64 {
        let history = &self.io_start_history;
        if history.len() < 2 {
            return 0.0;
        }
        let total: Tick = history
            .windows(2)
            .map(|w| w[1].saturating_sub(w[0]))
            .sum();
        total as f64 / (history.len() - 1) as f64
    }
}
