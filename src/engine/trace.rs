//! Transition events and execution tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Pid, ProcessState, Tick};

/// One state change performed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Tick at which the transition happened.
    pub time: Tick,
    pub pid: Pid,
    pub from: ProcessState,
    pub to: ProcessState,
}

impl TransitionEvent {
    pub fn new(time: Tick, pid: Pid, from: ProcessState, to: ProcessState) -> Self {
        Self {
            time,
            pid,
            from,
            to,
        }
    }
}

const TIME_WIDTH: usize = 18;
const PID_WIDTH: usize = 5;
const STATE_WIDTH: usize = 12;

/// Table view over an event stream.
///
/// ```
/// use u_procsim::engine::{ExecutionTrace, TransitionEvent};
/// use u_procsim::models::ProcessState;
///
/// let events = [TransitionEvent::new(0, 1, ProcessState::Unadmitted, ProcessState::Ready)];
/// let table = ExecutionTrace::new(&events).to_string();
/// assert!(table.contains("NEW"));
/// assert!(table.contains("READY"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExecutionTrace<'a> {
    events: &'a [TransitionEvent],
}

impl<'a> ExecutionTrace<'a> {
    pub fn new(events: &'a [TransitionEvent]) -> Self {
        Self { events }
    }

    /// Events concerning one process, in order.
    pub fn for_process(&self, pid: Pid) -> impl Iterator<Item = &'a TransitionEvent> {
        self.events.iter().filter(move |e| e.pid == pid)
    }

    fn border(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = TIME_WIDTH + PID_WIDTH + 2 * STATE_WIDTH + 3;
        writeln!(f, "+{}+", "-".repeat(width))
    }
}

impl fmt::Display for ExecutionTrace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::border(f)?;
        writeln!(
            f,
            "|{:>tw$}|{:>pw$}|{:>sw$}|{:>sw$}|",
            "Time of Transition",
            "PID",
            "Old State",
            "New State",
            tw = TIME_WIDTH,
            pw = PID_WIDTH,
            sw = STATE_WIDTH,
        )?;
        Self::border(f)?;
        for e in self.events {
            writeln!(
                f,
                "|{:>tw$}|{:>pw$}|{:>sw$}|{:>sw$}|",
                e.time,
                e.pid,
                e.from.label(),
                e.to.label(),
                tw = TIME_WIDTH,
                pw = PID_WIDTH,
                sw = STATE_WIDTH,
            )?;
        }
        Self::border(f)
    }
}
