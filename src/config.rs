//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::models::{PartitionTable, Tick, CANONICAL_CAPACITIES};
use crate::policy::{PolicyKind, SchedulingPolicy, DEFAULT_QUANTUM};

/// Settings for one simulation run.
///
/// # Example
/// ```
/// use u_procsim::config::SimulationConfig;
/// use u_procsim::policy::PolicyKind;
///
/// let config = SimulationConfig::new(PolicyKind::RoundRobin)
///     .with_quantum(50)
///     .with_partitions(vec![32, 16, 8]);
/// assert_eq!(config.quantum, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Dispatch discipline.
    pub policy: PolicyKind,
    /// Time slice for Round-Robin based policies.
    pub quantum: Tick,
    /// Partition capacities, scanned in this order.
    pub partitions: Vec<u64>,
    /// Abort after this many ticks. `None` = no limit.
    pub tick_limit: Option<Tick>,
}

impl SimulationConfig {
    /// Default settings with the given policy.
    pub fn new(policy: PolicyKind) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the quantum. Zero is ignored.
    pub fn with_quantum(mut self, quantum: Tick) -> Self {
        if quantum > 0 {
            self.quantum = quantum;
        }
        self
    }

    /// Sets partition capacities in scan order.
    pub fn with_partitions(mut self, capacities: Vec<u64>) -> Self {
        self.partitions = capacities;
        self
    }

    pub fn with_tick_limit(mut self, limit: Tick) -> Self {
        self.tick_limit = Some(limit);
        self
    }

    pub(crate) fn build_policy(&self) -> Box<dyn SchedulingPolicy> {
        self.policy.build(self.quantum.max(1))
    }

    pub(crate) fn build_partitions(&self) -> PartitionTable {
        PartitionTable::new(&self.partitions)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Fcfs,
            quantum: DEFAULT_QUANTUM,
            partitions: CANONICAL_CAPACITIES.to_vec(),
            tick_limit: None,
        }
    }
}
