//! Side-by-side policy comparison.
//!
//! Each policy gets its own engine and registry on its own scoped thread;
//! runs share only the read-only input.

use std::thread;

use log::info;

use super::simulation::{simulate, SimulationReport};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::models::ProcessDescriptor;
use crate::policy::PolicyKind;

/// Result of one policy in a comparison.
#[derive(Debug)]
pub struct PolicyRun {
    pub policy: PolicyKind,
    pub outcome: Result<SimulationReport>,
}

/// Runs `descriptors` under each policy concurrently.
///
/// All runs share `base` apart from the policy. Results come back in the
/// order of `policies`.
///
/// # Example
/// ```
/// use u_procsim::config::SimulationConfig;
/// use u_procsim::engine::compare_policies;
/// use u_procsim::models::ProcessDescriptor;
/// use u_procsim::policy::PolicyKind;
///
/// let processes = vec![
///     ProcessDescriptor::new(1, 5, 0, 120),
///     ProcessDescriptor::new(2, 5, 0, 10),
/// ];
/// let runs = compare_policies(&SimulationConfig::default(), &processes, &PolicyKind::ALL);
/// assert_eq!(runs.len(), 4);
/// assert!(runs.iter().all(|r| r.outcome.is_ok()));
/// ```
pub fn compare_policies(
    base: &SimulationConfig,
    descriptors: &[ProcessDescriptor],
    policies: &[PolicyKind],
) -> Vec<PolicyRun> {
    info!(
        "Comparing {} policies over {} processes",
        policies.len(),
        descriptors.len()
    );

    thread::scope(|scope| {
        let handles: Vec<_> = policies
            .iter()
            .map(|&policy| {
                let config = base.clone().with_policy(policy);
                let handle = scope.spawn(move || simulate(&config, descriptors));
                (policy, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(policy, handle)| {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                PolicyRun { policy, outcome }
            })
            .collect()
    })
}
