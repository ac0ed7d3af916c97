//! Discrete-time simulation engine.
//!
//! # Tick
//!
//! 1. Admit arrived, unadmitted processes in registry order (first-fit).
//! 2. Ask the policy whether the running process is preempted, then
//!    dispatch on an idle CPU.
//! 3. Execute one unit of CPU work (or idle) and advance the clock.
//! 4. Terminate a finished process, or requeue one whose quantum is used up.
//!
//! Completion wins over quantum expiry when both happen on the same tick.
//! Transition events are stamped with the clock at the moment they happen:
//! admission, preemption and dispatch before the clock advances,
//! termination and quantum expiry after.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::trace::{ExecutionTrace, TransitionEvent};
use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::metrics::Metrics;
use crate::models::{
    JobRegistry, PartitionTable, Pid, ProcessDescriptor, ProcessHandle, ProcessRecord,
    ProcessState, ReadyPool, Tick,
};
use crate::policy::{Decision, SchedulingPolicy};
use crate::validation::validate_input;

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Name of the policy that produced this run.
    pub policy: String,
    /// Tick at which the last process terminated.
    pub end_time: Tick,
    /// Every state transition, in the order it happened.
    pub events: Vec<TransitionEvent>,
    /// Final records, in input order.
    pub processes: Vec<ProcessRecord>,
    pub metrics: Metrics,
}

impl SimulationReport {
    /// Final record of process `pid`.
    pub fn process(&self, pid: Pid) -> Option<&ProcessRecord> {
        self.processes.iter().find(|p| p.id == pid)
    }

    /// Table view of the event stream.
    pub fn trace(&self) -> ExecutionTrace<'_> {
        ExecutionTrace::new(&self.events)
    }
}

/// Single-CPU scheduling simulator.
///
/// The registry is the only owner of process records; the ready pool and
/// the running slot hold handles into it.
///
/// # Example
///
/// ```
/// use u_procsim::config::SimulationConfig;
/// use u_procsim::engine::Engine;
/// use u_procsim::models::ProcessDescriptor;
/// use u_procsim::policy::PolicyKind;
///
/// let processes = vec![ProcessDescriptor::new(1, 5, 0, 3)];
/// let config = SimulationConfig::new(PolicyKind::Fcfs);
///
/// let report = Engine::new(&config, &processes).unwrap().run().unwrap();
/// assert_eq!(report.end_time, 3);
/// assert_eq!(report.process(1).unwrap().finish_time, Some(3));
/// ```
#[derive(Debug)]
pub struct Engine {
    policy: Box<dyn SchedulingPolicy>,
    partitions: PartitionTable,
    registry: JobRegistry,
    pool: ReadyPool,
    running: Option<ProcessHandle>,
    current_time: Tick,
    slice_used: Tick,
    tick_limit: Option<Tick>,
    events: Vec<TransitionEvent>,
}

impl Engine {
    /// Creates an engine from a configuration.
    ///
    /// Fails before the first tick on empty input, on processes no
    /// partition can ever hold, and on other structural input errors.
    pub fn new(config: &SimulationConfig, descriptors: &[ProcessDescriptor]) -> Result<Self> {
        let mut engine = Self::with_policy(
            config.build_policy(),
            config.build_partitions(),
            descriptors,
        )?;
        engine.tick_limit = config.tick_limit;
        Ok(engine)
    }

    /// Creates an engine with an explicit policy and partition table.
    pub fn with_policy(
        policy: Box<dyn SchedulingPolicy>,
        partitions: PartitionTable,
        descriptors: &[ProcessDescriptor],
    ) -> Result<Self> {
        if let Err(errors) = validate_input(descriptors, &partitions) {
            let err = SimulationError::from_validation(
                errors,
                |pid| {
                    descriptors
                        .iter()
                        .find(|d| d.id == pid)
                        .map_or(0, |d| d.memory_required)
                },
                partitions.largest_capacity(),
            );
            warn!("{} run rejected: {err}", policy.name());
            return Err(err);
        }

        Ok(Self {
            policy,
            partitions,
            registry: JobRegistry::from_descriptors(descriptors),
            pool: ReadyPool::new(),
            running: None,
            current_time: 0,
            slice_used: 0,
            tick_limit: None,
            events: Vec::new(),
        })
    }

    /// Current simulated time.
    pub fn now(&self) -> Tick {
        self.current_time
    }

    pub fn policy(&self) -> &dyn SchedulingPolicy {
        self.policy.as_ref()
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn partitions(&self) -> &PartitionTable {
        &self.partitions
    }

    pub fn ready_pool(&self) -> &ReadyPool {
        &self.pool
    }

    /// Record of the process on the CPU, if any.
    pub fn running(&self) -> Option<&ProcessRecord> {
        self.running.map(|h| &self.registry[h])
    }

    /// All events emitted so far.
    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    /// Whether every process has terminated.
    pub fn is_finished(&self) -> bool {
        self.registry.all_terminated()
    }

    /// Advances the simulation by one tick.
    ///
    /// Returns the events emitted during this tick. A finished engine does
    /// nothing and returns no events.
    pub fn step(&mut self) -> Result<&[TransitionEvent]> {
        let first = self.events.len();
        if self.is_finished() {
            return Ok(&self.events[first..]);
        }

        if let Some(limit) = self.tick_limit {
            if self.current_time >= limit {
                warn!("{} run hit tick limit {limit}", self.policy.name());
                return Err(SimulationError::TickLimitExceeded { limit });
            }
        }

        self.admit_arrivals();
        self.detect_stall()?;
        self.schedule();
        self.execute();
        self.check_invariants();

        Ok(&self.events[first..])
    }

    /// Runs until every process has terminated.
    pub fn run(mut self) -> Result<SimulationReport> {
        info!(
            "Starting {} run: {} processes, {} partitions",
            self.policy.name(),
            self.registry.len(),
            self.partitions.len()
        );

        while !self.is_finished() {
            self.step()?;
        }

        let end_time = self.current_time;
        let processes = self.registry.into_records();
        let metrics = Metrics::calculate(&processes, end_time);

        info!(
            "{} run finished at t={end_time}: throughput={:.4}, avg turnaround={:.2}",
            self.policy.name(),
            metrics.throughput,
            metrics.avg_turnaround
        );

        Ok(SimulationReport {
            policy: self.policy.name().to_string(),
            end_time,
            events: self.events,
            processes,
            metrics,
        })
    }

    fn admit_arrivals(&mut self) {
        let now = self.current_time;
        for handle in self.registry.handles() {
            let record = &mut self.registry[handle];
            if record.state != ProcessState::Unadmitted || !record.has_arrived(now) {
                continue;
            }
            if self.partitions.try_admit(record) {
                self.transition(handle, ProcessState::Ready);
                self.pool.push_back(handle);
            }
        }
    }

    /// Nothing holds memory and every pending process has arrived, yet none
    /// was admitted: no later tick can change that.
    fn detect_stall(&self) -> Result<()> {
        if self.running.is_some() || !self.pool.is_empty() || self.partitions.occupied_count() > 0
        {
            return Ok(());
        }

        let pending: Vec<&ProcessRecord> = self
            .registry
            .iter()
            .filter(|r| !r.is_terminated())
            .collect();

        if pending.iter().all(|r| r.has_arrived(self.current_time)) {
            let pending: Vec<Pid> = pending.iter().map(|r| r.id).collect();
            warn!(
                "{} run stalled at t={}: processes {pending:?} cannot be admitted",
                self.policy.name(),
                self.current_time
            );
            return Err(SimulationError::Stalled {
                time: self.current_time,
                pending,
            });
        }
        Ok(())
    }

    fn schedule(&mut self) {
        if let Some(running) = self.running {
            if self
                .policy
                .should_preempt(&self.pool, &self.registry, running)
            {
                self.requeue(running);
            }
        }

        match self
            .policy
            .select_next(&self.pool, &self.registry, self.running)
        {
            Decision::Dispatch(position) => {
                if let Some(handle) = self.pool.remove(position) {
                    self.dispatch(handle);
                }
            }
            Decision::Continue | Decision::Idle => {}
        }
    }

    fn execute(&mut self) {
        let Some(handle) = self.running else {
            self.current_time += 1;
            return;
        };

        let record = &mut self.registry[handle];
        record.remaining_cpu_time = record.remaining_cpu_time.saturating_sub(1);
        let finished = record.remaining_cpu_time == 0;
        self.slice_used += 1;
        self.current_time += 1;

        if finished {
            self.terminate(handle);
        } else if self
            .policy
            .quantum()
            .is_some_and(|quantum| self.slice_used >= quantum)
        {
            self.requeue(handle);
        }
    }

    fn dispatch(&mut self, handle: ProcessHandle) {
        debug_assert!(self.running.is_none(), "dispatch on a busy CPU");

        let now = self.current_time;
        self.registry[handle].start_time.get_or_insert(now);
        self.transition(handle, ProcessState::Running);
        self.running = Some(handle);
        self.slice_used = 0;
    }

    /// Running → Ready, back of the pool.
    fn requeue(&mut self, handle: ProcessHandle) {
        self.running = None;
        self.transition(handle, ProcessState::Ready);
        self.pool.push_back(handle);
    }

    fn terminate(&mut self, handle: ProcessHandle) {
        self.running = None;
        self.transition(handle, ProcessState::Terminated);

        let now = self.current_time;
        let record = &mut self.registry[handle];
        record.finish_time = Some(now);
        self.partitions.release(record);
    }

    fn transition(&mut self, handle: ProcessHandle, to: ProcessState) {
        let record = &mut self.registry[handle];
        let event = TransitionEvent::new(self.current_time, record.id, record.state, to);
        record.state = to;

        debug!(
            "t={} pid={} {} -> {}",
            event.time, event.pid, event.from, event.to
        );
        self.events.push(event);
    }

    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }

        let running = self.registry.count_in(ProcessState::Running);
        debug_assert!(running <= 1, "{running} processes running at t={}", self.current_time);
        debug_assert_eq!(running, usize::from(self.running.is_some()));

        for partition in self.partitions.iter() {
            if let Some(pid) = partition.occupant {
                let holder = self.registry.find(pid).map(|h| &self.registry[h]);
                debug_assert_eq!(
                    holder.and_then(|r| r.partition),
                    Some(partition.number),
                    "partition {} occupant {pid} does not hold it",
                    partition.number
                );
            }
        }

        for record in self.registry.iter() {
            debug_assert_eq!(
                record.remaining_cpu_time == 0 && record.total_cpu_time > 0,
                record.is_terminated() && record.total_cpu_time > 0,
                "process {} remaining time out of step with its state",
                record.id
            );
        }
    }
}

/// Runs one simulation with the given configuration.
pub fn simulate(
    config: &SimulationConfig,
    descriptors: &[ProcessDescriptor],
) -> Result<SimulationReport> {
    Engine::new(config, descriptors)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessState::*;
    use crate::policy::{ExternalPriorityRr, PolicyKind, SchedulingPolicy};
    use crate::workload::WorkloadGenerator;

    fn run(kind: PolicyKind, descriptors: &[ProcessDescriptor]) -> SimulationReport {
        simulate(&SimulationConfig::new(kind), descriptors).unwrap()
    }

    fn ev(time: Tick, pid: Pid, from: ProcessState, to: ProcessState) -> TransitionEvent {
        TransitionEvent::new(time, pid, from, to)
    }

    #[test]
    fn test_fcfs_single_process() {
        let report = run(PolicyKind::Fcfs, &[ProcessDescriptor::new(1, 5, 0, 3)]);

        assert_eq!(
            report.events,
            vec![
                ev(0, 1, Unadmitted, Ready),
                ev(0, 1, Ready, Running),
                ev(3, 1, Running, Terminated),
            ]
        );
        let p = report.process(1).unwrap();
        assert_eq!(p.finish_time, Some(3));
        assert_eq!(p.turnaround(), Some(3));
        assert_eq!(p.start_time, Some(0));
        assert_eq!(p.partition, None);
        assert_eq!(report.end_time, 3);
    }

    #[test]
    fn test_fcfs_runs_to_completion_in_arrival_order() {
        let report = run(
            PolicyKind::Fcfs,
            &[
                ProcessDescriptor::new(1, 5, 2, 4),
                ProcessDescriptor::new(2, 5, 0, 3),
            ],
        );
        assert_eq!(report.process(2).unwrap().finish_time, Some(3));
        assert_eq!(report.process(1).unwrap().start_time, Some(3));
        assert_eq!(report.process(1).unwrap().finish_time, Some(7));
    }

    #[test]
    fn test_idle_ticks_are_counted() {
        let report = run(PolicyKind::Fcfs, &[ProcessDescriptor::new(1, 5, 10, 2)]);
        assert_eq!(report.events[0], ev(10, 1, Unadmitted, Ready));
        assert_eq!(report.end_time, 12);
        assert_eq!(report.process(1).unwrap().turnaround(), Some(2));
    }

    #[test]
    fn test_rr_quantum_exceeded() {
        let report = run(PolicyKind::RoundRobin, &[ProcessDescriptor::new(1, 5, 0, 150)]);

        assert_eq!(
            report.events,
            vec![
                ev(0, 1, Unadmitted, Ready),
                ev(0, 1, Ready, Running),
                ev(100, 1, Running, Ready),
                ev(100, 1, Ready, Running),
                ev(150, 1, Running, Terminated),
            ]
        );
        assert_eq!(report.process(1).unwrap().start_time, Some(0));
    }

    #[test]
    fn test_rr_alternates_on_quantum() {
        let config = SimulationConfig::new(PolicyKind::RoundRobin).with_quantum(2);
        let report = simulate(
            &config,
            &[
                ProcessDescriptor::new(1, 5, 0, 3),
                ProcessDescriptor::new(2, 5, 0, 2),
            ],
        )
        .unwrap();

        let dispatches: Vec<(Tick, Pid)> = report
            .events
            .iter()
            .filter(|e| e.to == Running)
            .map(|e| (e.time, e.pid))
            .collect();
        assert_eq!(dispatches, vec![(0, 1), (2, 2), (4, 1)]);
        assert_eq!(report.process(2).unwrap().finish_time, Some(4));
        assert_eq!(report.process(1).unwrap().finish_time, Some(5));
    }

    #[test]
    fn test_completion_beats_quantum_expiry() {
        let report = run(PolicyKind::RoundRobin, &[ProcessDescriptor::new(1, 5, 0, 100)]);
        assert_eq!(report.events.last(), Some(&ev(100, 1, Running, Terminated)));
        assert!(!report.events.contains(&ev(100, 1, Running, Ready)));
    }

    #[test]
    fn test_ep_rr_priority_preemption() {
        let report = run(
            PolicyKind::ExternalPriorityRr,
            &[
                ProcessDescriptor::new(2, 5, 0, 50),
                ProcessDescriptor::new(1, 5, 10, 5),
            ],
        );

        assert_eq!(
            report.events,
            vec![
                ev(0, 2, Unadmitted, Ready),
                ev(0, 2, Ready, Running),
                ev(10, 1, Unadmitted, Ready),
                ev(10, 2, Running, Ready),
                ev(10, 1, Ready, Running),
                ev(15, 1, Running, Terminated),
                ev(15, 2, Ready, Running),
                ev(55, 2, Running, Terminated),
            ]
        );
        // start_time is set once, at the first dispatch.
        assert_eq!(report.process(2).unwrap().start_time, Some(0));
        assert_eq!(report.process(1).unwrap().start_time, Some(10));
    }

    #[test]
    fn test_ep_rr_admission_blocked_by_memory() {
        // Pid 1 arrives at t=1 but fits only in partition 1, held by pid 3.
        let config = SimulationConfig::new(PolicyKind::ExternalPriorityRr)
            .with_partitions(vec![40, 30]);
        let report = simulate(
            &config,
            &[
                ProcessDescriptor::new(3, 35, 0, 5),
                ProcessDescriptor::new(2, 20, 0, 30),
                ProcessDescriptor::new(1, 35, 1, 5),
            ],
        )
        .unwrap();

        // Pid 3 is admitted first, but pid 2 is more urgent.
        assert_eq!(report.events[2], ev(0, 2, Ready, Running));
        assert_eq!(report.process(2).unwrap().finish_time, Some(30));
        // Pid 3 runs 30..35, frees partition 1, pid 1 admitted at 35.
        assert_eq!(report.process(3).unwrap().finish_time, Some(35));
        assert_eq!(report.process(1).unwrap().start_time, Some(35));
        assert_eq!(report.end_time, 40);
    }

    #[test]
    fn test_ep_non_preemptive() {
        let report = run(
            PolicyKind::ExternalPriority,
            &[
                ProcessDescriptor::new(2, 5, 0, 50),
                ProcessDescriptor::new(1, 5, 10, 5),
            ],
        );
        assert_eq!(report.process(2).unwrap().finish_time, Some(50));
        assert_eq!(report.process(1).unwrap().start_time, Some(50));
        assert_eq!(report.process(1).unwrap().finish_time, Some(55));
        assert!(!report.events.contains(&ev(10, 2, Running, Ready)));
    }

    #[test]
    fn test_admission_waits_for_free_partition() {
        let config = SimulationConfig::new(PolicyKind::Fcfs).with_partitions(vec![10]);
        let report = simulate(
            &config,
            &[
                ProcessDescriptor::new(1, 10, 0, 4),
                ProcessDescriptor::new(2, 5, 0, 2),
            ],
        )
        .unwrap();

        // Pid 2 is admitted only once pid 1 releases the single partition.
        let admitted = report
            .trace()
            .for_process(2)
            .find(|e| e.to == Ready)
            .map(|e| e.time);
        assert_eq!(admitted, Some(4));
        assert_eq!(report.end_time, 6);
    }

    #[test]
    fn test_simultaneous_arrivals_admitted_in_input_order() {
        let report = run(
            PolicyKind::RoundRobin,
            &[
                ProcessDescriptor::new(5, 1, 0, 1),
                ProcessDescriptor::new(3, 1, 0, 1),
                ProcessDescriptor::new(4, 1, 0, 1),
            ],
        );
        let admitted: Vec<Pid> = report
            .events
            .iter()
            .filter(|e| e.to == Ready && e.from == Unadmitted)
            .map(|e| e.pid)
            .collect();
        assert_eq!(admitted, vec![5, 3, 4]);
    }

    #[test]
    fn test_unadmittable_process_reported() {
        let err = simulate(
            &SimulationConfig::default(),
            &[
                ProcessDescriptor::new(1, 5, 0, 3),
                ProcessDescriptor::new(2, 41, 0, 3),
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            SimulationError::Unadmittable {
                pid: 2,
                memory_required: 41,
                largest_partition: 40,
            }
        );
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = simulate(&SimulationConfig::default(), &[]).unwrap_err();
        assert_eq!(err, SimulationError::EmptyInput);
    }

    #[test]
    fn test_tick_limit() {
        let config = SimulationConfig::default().with_tick_limit(10);
        let err = simulate(&config, &[ProcessDescriptor::new(1, 5, 0, 50)]).unwrap_err();
        assert_eq!(err, SimulationError::TickLimitExceeded { limit: 10 });
    }

    #[test]
    fn test_zero_cpu_time_terminates_after_one_tick() {
        let report = run(PolicyKind::Fcfs, &[ProcessDescriptor::new(1, 5, 0, 0)]);
        assert_eq!(report.events.last(), Some(&ev(1, 1, Running, Terminated)));
    }

    #[test]
    fn test_step_reports_tick_events() {
        let config = SimulationConfig::default();
        let mut engine = Engine::new(&config, &[ProcessDescriptor::new(1, 5, 0, 2)]).unwrap();

        assert_eq!(engine.step().unwrap().len(), 2); // admit + dispatch
        assert_eq!(engine.running().map(|r| r.id), Some(1));
        assert_eq!(engine.partitions().occupant_of(1), Some(1));

        assert_eq!(engine.step().unwrap(), &[ev(2, 1, Running, Terminated)]);
        assert!(engine.is_finished());
        assert_eq!(engine.partitions().free_count(), 6);
        assert!(engine.step().unwrap().is_empty());
        assert_eq!(engine.now(), 2);
    }

    #[test]
    fn test_custom_policy_instance() {
        let policy: Box<dyn SchedulingPolicy> = Box::new(ExternalPriorityRr::new(10));
        let engine = Engine::with_policy(
            policy,
            PartitionTable::canonical(),
            &[ProcessDescriptor::new(1, 5, 0, 25)],
        )
        .unwrap();
        assert_eq!(engine.policy().name(), "EP_RR");

        let report = engine.run().unwrap();
        let preemptions = report
            .events
            .iter()
            .filter(|e| e.from == Running && e.to == Ready)
            .count();
        assert_eq!(preemptions, 2); // at 10 and 20
    }

    // ---------------- Run-wide properties on random workloads ----------------

    /// Steps an engine to completion, checking per-tick invariants.
    fn step_checked(kind: PolicyKind, descriptors: &[ProcessDescriptor]) {
        let config = SimulationConfig::new(kind);
        let mut engine = Engine::new(&config, descriptors).unwrap();
        let mut last_remaining: Vec<Tick> =
            engine.registry().iter().map(|r| r.remaining_cpu_time).collect();

        while !engine.is_finished() {
            let events = engine.step().unwrap().to_vec();
            let reg = engine.registry();

            assert!(reg.count_in(Running) <= 1);

            for (i, record) in reg.iter().enumerate() {
                assert!(record.remaining_cpu_time <= last_remaining[i]);
                last_remaining[i] = record.remaining_cpu_time;
                assert_eq!(record.is_terminated(), record.finish_time.is_some());
                if record.is_terminated() {
                    assert_eq!(record.remaining_cpu_time, 0);
                    assert_eq!(record.partition, None);
                }
            }

            for partition in engine.partitions().iter() {
                let holders = reg
                    .iter()
                    .filter(|r| r.partition == Some(partition.number))
                    .count();
                assert!(holders <= 1);
                assert_eq!(holders == 1, partition.occupant.is_some());
            }

            // A terminated process frees its partition in the same tick.
            for e in events.iter().filter(|e| e.to == Terminated) {
                assert!(engine.partitions().iter().all(|p| p.occupant != Some(e.pid)));
            }
        }
    }

    #[test]
    fn test_invariants_hold_for_all_policies() {
        for seed in 0..4 {
            let workload = WorkloadGenerator::new(seed).with_count(12).generate();
            for kind in PolicyKind::ALL {
                step_checked(kind, &workload);
            }
        }
    }

    #[test]
    fn test_rr_never_exceeds_quantum() {
        let workload = WorkloadGenerator::new(7)
            .with_count(10)
            .with_cpu_range(50, 400)
            .generate();

        for kind in [PolicyKind::RoundRobin, PolicyKind::ExternalPriorityRr] {
            let report = run(kind, &workload);
            let mut started: Option<(Pid, Tick)> = None;
            for e in &report.events {
                if e.to == Running {
                    started = Some((e.pid, e.time));
                } else if e.from == Running {
                    let (pid, t0) = started.take().unwrap();
                    assert_eq!(pid, e.pid);
                    assert!(e.time - t0 <= 100, "pid {pid} ran {}", e.time - t0);
                }
            }
        }
    }

    #[test]
    fn test_ep_rr_never_runs_less_urgent_process_while_more_urgent_ready() {
        let workload = WorkloadGenerator::new(11).with_count(15).generate();
        let config = SimulationConfig::new(PolicyKind::ExternalPriorityRr);
        let mut engine = Engine::new(&config, &workload).unwrap();

        while !engine.is_finished() {
            engine.step().unwrap();
            // Whatever holds the CPU after a tick is at least as urgent as
            // everything left in the pool.
            if let Some(running) = engine.running() {
                let reg = engine.registry();
                let best_ready = engine
                    .ready_pool()
                    .iter()
                    .map(|(_, h)| reg[h].priority)
                    .min();
                if let Some(best) = best_ready {
                    assert!(running.priority <= best);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let workload = WorkloadGenerator::new(3).with_count(20).generate();
        for kind in PolicyKind::ALL {
            let a = run(kind, &workload);
            let b = run(kind, &workload);
            assert_eq!(a.events, b.events);
            assert_eq!(a.metrics, b.metrics);
        }
    }
}
