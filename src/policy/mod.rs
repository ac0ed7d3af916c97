//! Scheduling policies.
//!
//! A policy is the engine's only pluggable part. Admission, execution and
//! completion are shared; a policy decides which ready process to dispatch,
//! whether the running process must give up the CPU to a more urgent one,
//! and how long a process may run before a forced yield.
//!
//! # Usage
//!
//! ```
//! use u_procsim::policy::{PolicyKind, SchedulingPolicy};
//!
//! let policy = PolicyKind::ExternalPriorityRr.build(100);
//! assert_eq!(policy.name(), "EP_RR");
//! assert_eq!(policy.quantum(), Some(100));
//! ```
//!
//! # Reference
//! Silberschatz, Galvin & Gagne (2018), "Operating System Concepts", Ch. 5

mod kind;
pub mod rules;

pub use kind::{ParsePolicyError, PolicyKind};
pub use rules::{ExternalPriority, ExternalPriorityRr, Fcfs, RoundRobin};

use crate::models::{JobRegistry, ProcessHandle, ReadyPool, Tick};
use std::fmt::Debug;

/// Default Round-Robin time slice in ticks.
pub const DEFAULT_QUANTUM: Tick = 100;

/// Outcome of a dispatch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the current process on the CPU.
    Continue,
    /// Dispatch the ready-pool entry at this position.
    Dispatch(usize),
    /// Nothing to run.
    Idle,
}

/// A CPU dispatch discipline.
///
/// Positions passed to and returned from a policy index the [`ReadyPool`]
/// in pool order. When several candidates are equally good the earliest
/// pool position wins.
pub trait SchedulingPolicy: Send + Sync + Debug {
    /// Short name (e.g., "RR", "EP_RR").
    fn name(&self) -> &'static str;

    /// Policy description.
    fn description(&self) -> &'static str {
        self.name()
    }

    /// Picks the pool position to dispatch on an idle CPU.
    fn pick(&self, pool: &ReadyPool, registry: &JobRegistry) -> Option<usize>;

    /// Decides what the CPU does next.
    ///
    /// A busy CPU always continues; preemption is asked separately through
    /// [`should_preempt`](Self::should_preempt) before this is called.
    fn select_next(
        &self,
        pool: &ReadyPool,
        registry: &JobRegistry,
        running: Option<ProcessHandle>,
    ) -> Decision {
        if running.is_some() {
            return Decision::Continue;
        }
        match self.pick(pool, registry) {
            Some(position) => Decision::Dispatch(position),
            None => Decision::Idle,
        }
    }

    /// Whether `running` must be preempted in favor of a ready process.
    ///
    /// Evaluated every tick, not only on arrivals.
    fn should_preempt(
        &self,
        _pool: &ReadyPool,
        _registry: &JobRegistry,
        _running: ProcessHandle,
    ) -> bool {
        false
    }

    /// Maximum contiguous run length, `None` = run to completion.
    fn quantum(&self) -> Option<Tick> {
        None
    }
}
