//! Built-in scheduling policies.
//!
//! | Policy | Dispatch | Preempts | Quantum |
//! |--------|----------|----------|---------|
//! | FCFS | earliest arrival | no | none |
//! | RR | front of pool | no | yes |
//! | EP | earliest arrival, then priority | no | none |
//! | EP_RR | lowest priority value | yes | yes |
//!
//! Priority values follow the usual OS convention: lower = more urgent.

use super::{SchedulingPolicy, DEFAULT_QUANTUM};
use crate::models::{JobRegistry, ProcessHandle, ReadyPool, Tick};

/// First-Come, First-Served.
///
/// Dispatches the ready process with the earliest arrival time and runs it
/// to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fcfs;

impl SchedulingPolicy for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn pick(&self, pool: &ReadyPool, registry: &JobRegistry) -> Option<usize> {
        pool.position_min_by_key(registry, |r| r.arrival_time)
    }

    fn description(&self) -> &'static str {
        "First-Come, First-Served"
    }
}

/// Round-Robin.
///
/// The pool is a FIFO queue; the front is dispatched and a process that
/// uses up its quantum goes to the back.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    quantum: Tick,
}

impl RoundRobin {
    pub fn new(quantum: Tick) -> Self {
        debug_assert!(quantum > 0, "quantum must be positive");
        Self { quantum }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTUM)
    }
}

impl SchedulingPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn pick(&self, pool: &ReadyPool, _registry: &JobRegistry) -> Option<usize> {
        if pool.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn quantum(&self) -> Option<Tick> {
        Some(self.quantum)
    }

    fn description(&self) -> &'static str {
        "Round-Robin"
    }
}

/// External priority, non-preemptive.
///
/// Orders the pool by arrival time like FCFS; simultaneous arrivals are
/// ordered by priority. Once dispatched a process runs to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalPriority;

impl SchedulingPolicy for ExternalPriority {
    fn name(&self) -> &'static str {
        "EP"
    }

    fn pick(&self, pool: &ReadyPool, registry: &JobRegistry) -> Option<usize> {
        pool.position_min_by_key(registry, |r| (r.arrival_time, r.priority))
    }

    fn description(&self) -> &'static str {
        "External Priority (non-preemptive)"
    }
}

/// External priority with Round-Robin time slicing and priority preemption.
///
/// Dispatches the most urgent ready process. Every tick, a running process
/// is preempted as soon as a strictly more urgent one is ready; otherwise
/// it yields when its quantum runs out.
#[derive(Debug, Clone, Copy)]
pub struct ExternalPriorityRr {
    quantum: Tick,
}

impl ExternalPriorityRr {
    pub fn new(quantum: Tick) -> Self {
        debug_assert!(quantum > 0, "quantum must be positive");
        Self { quantum }
    }
}

impl Default for ExternalPriorityRr {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTUM)
    }
}

impl SchedulingPolicy for ExternalPriorityRr {
    fn name(&self) -> &'static str {
        "EP_RR"
    }

    fn pick(&self, pool: &ReadyPool, registry: &JobRegistry) -> Option<usize> {
        pool.position_min_by_key(registry, |r| r.priority)
    }

    fn should_preempt(
        &self,
        pool: &ReadyPool,
        registry: &JobRegistry,
        running: ProcessHandle,
    ) -> bool {
        self.pick(pool, registry)
            .and_then(|position| pool.iter().nth(position))
            .is_some_and(|(_, best)| registry[best].priority < registry[running].priority)
    }

    fn quantum(&self) -> Option<Tick> {
        Some(self.quantum)
    }

    fn description(&self) -> &'static str {
        "External Priority + Round-Robin (preemptive)"
    }
}
