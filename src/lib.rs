//! Single-CPU scheduling simulator.
//!
//! Simulates short-term CPU scheduling in discrete ticks. Processes must be
//! granted a fixed memory partition before they become ready; a pluggable
//! policy then decides dispatch and preemption.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ProcessDescriptor`, `ProcessRecord`,
//!   `PartitionTable`, `JobRegistry`, `ReadyPool`
//! - **`policy`**: `SchedulingPolicy` and the built-in FCFS, RR, EP, EP_RR
//! - **`engine`**: The tick loop, transition events, batch comparison
//! - **`metrics`**: Throughput, wait, turnaround, response
//! - **`validation`**: Pre-run input checks
//! - **`input`**: Descriptor text parsing
//! - **`workload`**: Seeded random workloads
//!
//! # Example
//!
//! ```
//! use u_procsim::{simulate, ProcessDescriptor, PolicyKind, SimulationConfig};
//!
//! let processes = vec![
//!     ProcessDescriptor::new(2, 10, 0, 50),
//!     ProcessDescriptor::new(1, 5, 10, 5),
//! ];
//! let config = SimulationConfig::new(PolicyKind::ExternalPriorityRr);
//! let report = simulate(&config, &processes).unwrap();
//!
//! assert_eq!(report.process(1).unwrap().finish_time, Some(15));
//! assert_eq!(report.process(2).unwrap().finish_time, Some(55));
//! ```
//!
//! # References
//!
//! - Silberschatz, Galvin & Gagne (2018), "Operating System Concepts", Ch. 5, 9
//! - Tanenbaum & Bos (2014), "Modern Operating Systems", Ch. 2.4, 3.2

pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod metrics;
pub mod models;
pub mod policy;
pub mod validation;
pub mod workload;

pub use config::SimulationConfig;
pub use engine::{simulate, Engine, SimulationReport, TransitionEvent};
pub use error::{Result, SimulationError};
pub use metrics::Metrics;
pub use models::{ProcessDescriptor, ProcessState};
pub use policy::{PolicyKind, SchedulingPolicy};
