//! Policy selection by name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ExternalPriority, ExternalPriorityRr, Fcfs, RoundRobin, SchedulingPolicy};
use crate::models::Tick;

/// The built-in policies, as a serializable choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolicyKind {
    #[default]
    Fcfs,
    RoundRobin,
    ExternalPriority,
    ExternalPriorityRr,
}

impl PolicyKind {
    /// Every built-in policy, in a stable order.
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Fcfs,
        PolicyKind::RoundRobin,
        PolicyKind::ExternalPriority,
        PolicyKind::ExternalPriorityRr,
    ];

    /// Instantiates the policy. `quantum` is ignored by run-to-completion policies.
    pub fn build(self, quantum: Tick) -> Box<dyn SchedulingPolicy> {
        match self {
            Self::Fcfs => Box::new(Fcfs),
            Self::RoundRobin => Box::new(RoundRobin::new(quantum)),
            Self::ExternalPriority => Box::new(ExternalPriority),
            Self::ExternalPriorityRr => Box::new(ExternalPriorityRr::new(quantum)),
        }
    }

    /// Short name, matching [`SchedulingPolicy::name`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::RoundRobin => "RR",
            Self::ExternalPriority => "EP",
            Self::ExternalPriorityRr => "EP_RR",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError(pub String);

impl fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown scheduling policy '{}' (expected FCFS, RR, EP or EP_RR)",
            self.0
        )
    }
}

impl std::error::Error for ParsePolicyError {}

impl FromStr for PolicyKind {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FCFS" => Ok(Self::Fcfs),
            "RR" | "ROUND_ROBIN" => Ok(Self::RoundRobin),
            "EP" | "EXTERNAL_PRIORITY" => Ok(Self::ExternalPriority),
            "EP_RR" | "EPRR" => Ok(Self::ExternalPriorityRr),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}
