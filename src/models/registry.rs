//! Job registry and ready pool.
//!
//! The registry owns every process record for a run, in input order. The
//! ready pool and the engine's running slot refer to records through
//! [`ProcessHandle`]s, so there is exactly one copy of each record.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use super::{Pid, ProcessDescriptor, ProcessRecord, ProcessState};

/// Index of a record inside a [`JobRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessHandle(pub usize);

/// Order-preserving store of all process records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRegistry {
    records: Vec<ProcessRecord>,
}

impl JobRegistry {
    /// Builds unadmitted records from descriptors, keeping input order.
    pub fn from_descriptors(descriptors: &[ProcessDescriptor]) -> Self {
        Self {
            records: descriptors.iter().map(ProcessRecord::from_descriptor).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Handles in input order.
    pub fn handles(&self) -> impl Iterator<Item = ProcessHandle> {
        (0..self.records.len()).map(ProcessHandle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.iter()
    }

    pub fn get(&self, handle: ProcessHandle) -> Option<&ProcessRecord> {
        self.records.get(handle.0)
    }

    /// Handle of the record with process id `pid`.
    pub fn find(&self, pid: Pid) -> Option<ProcessHandle> {
        self.records.iter().position(|r| r.id == pid).map(ProcessHandle)
    }

    /// Whether every record has terminated.
    pub fn all_terminated(&self) -> bool {
        self.records.iter().all(ProcessRecord::is_terminated)
    }

    /// Number of records in `state`.
    pub fn count_in(&self, state: ProcessState) -> usize {
        self.records.iter().filter(|r| r.state == state).count()
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProcessRecord> {
        self.records
    }
}

impl Index<ProcessHandle> for JobRegistry {
    type Output = ProcessRecord;

    fn index(&self, handle: ProcessHandle) -> &ProcessRecord {
        &self.records[handle.0]
    }
}

impl IndexMut<ProcessHandle> for JobRegistry {
    fn index_mut(&mut self, handle: ProcessHandle) -> &mut ProcessRecord {
        &mut self.records[handle.0]
    }
}

/// Processes eligible for dispatch, in pool order.
///
/// New arrivals and preempted processes are appended at the back. Policies
/// pick any position; ties between equal candidates go to the earlier slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyPool {
    queue: VecDeque<ProcessHandle>,
}

impl ReadyPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, handle: ProcessHandle) {
        debug_assert!(
            !self.queue.contains(&handle),
            "process handle {handle:?} already in ready pool"
        );
        self.queue.push_back(handle);
    }

    /// Removes and returns the entry at `position`.
    pub fn remove(&mut self, position: usize) -> Option<ProcessHandle> {
        self.queue.remove(position)
    }

    pub fn front(&self) -> Option<ProcessHandle> {
        self.queue.front().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, handle: ProcessHandle) -> bool {
        self.queue.contains(&handle)
    }

    /// `(position, handle)` pairs in pool order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ProcessHandle)> + '_ {
        self.queue.iter().copied().enumerate()
    }

    /// Position of the first entry minimizing `key`.
    ///
    /// Strict comparison keeps the earliest slot on ties.
    pub fn position_min_by_key<K: Ord>(
        &self,
        registry: &JobRegistry,
        key: impl Fn(&ProcessRecord) -> K,
    ) -> Option<usize> {
        let mut best: Option<(usize, K)> = None;
        for (position, handle) in self.iter() {
            let k = key(&registry[handle]);
            let better = match &best {
                Some((_, best_key)) => k < *best_key,
                None => true,
            };
            if better {
                best = Some((position, k));
            }
        }
        best.map(|(position, _)| position)
    }
}
