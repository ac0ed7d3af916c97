//! Simulation engine.
//!
//! Drives the clock one tick at a time: admission through the partition
//! table, dispatch and preemption through a [`SchedulingPolicy`], one unit
//! of CPU work, then completion or quantum expiry. Every state change is
//! recorded as a [`TransitionEvent`].
//!
//! [`SchedulingPolicy`]: crate::policy::SchedulingPolicy

mod batch;
mod simulation;
mod trace;

pub use batch::{compare_policies, PolicyRun};
pub use simulation::{simulate, Engine, SimulationReport};
pub use trace::{ExecutionTrace, TransitionEvent};
