//! Run performance metrics.
//!
//! Computes aggregate indicators from the final process records of a
//! finished run. Pure: records are only read.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Throughput | processes / end time |
//! | Avg Wait | mean(accumulated_wait) |
//! | Avg Turnaround | mean(finish − arrival) |
//! | Avg Response | mean over processes of the mean gap between I/O starts |
//! | CPU Utilization | busy ticks / end time |
//!
//! # Reference
//! Silberschatz, Galvin & Gagne (2018), "Operating System Concepts", Ch. 5.2

use serde::{Deserialize, Serialize};

use crate::models::{ProcessRecord, Tick};

/// Aggregate performance of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Number of processes in the run.
    pub process_count: usize,
    /// Tick at which the run ended.
    pub end_time: Tick,
    /// Completed processes per tick.
    pub throughput: f64,
    /// Mean time spent ready.
    pub avg_wait: f64,
    /// Mean `finish − arrival`.
    pub avg_turnaround: f64,
    /// Mean gap between consecutive I/O starts.
    pub avg_response: f64,
    /// Longest single turnaround.
    pub max_turnaround: Tick,
    /// Fraction of ticks the CPU was busy (0.0..1.0).
    pub cpu_utilization: f64,
}

impl Metrics {
    /// Computes metrics from final records and the end tick.
    ///
    /// Returns zeroed metrics when there are no records or `end_time` is 0.
    pub fn calculate(records: &[ProcessRecord], end_time: Tick) -> Self {
        if records.is_empty() || end_time == 0 {
            return Self::default();
        }

        let n = records.len() as f64;
        let mut total_wait: f64 = 0.0;
        let mut total_turnaround: f64 = 0.0;
        let mut total_response: f64 = 0.0;
        let mut max_turnaround: Tick = 0;
        let mut busy: Tick = 0;

        for record in records {
            total_wait += record.accumulated_wait as f64;
            total_response += record.mean_io_gap();
            busy += record.executed_time();

            if let Some(turnaround) = record.turnaround() {
                total_turnaround += turnaround as f64;
                max_turnaround = max_turnaround.max(turnaround);
            }
        }

        Self {
            process_count: records.len(),
            end_time,
            throughput: n / end_time as f64,
            avg_wait: total_wait / n,
            avg_turnaround: total_turnaround / n,
            avg_response: total_response / n,
            max_turnaround,
            cpu_utilization: (busy as f64 / end_time as f64).min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcessDescriptor, ProcessState};

    fn finished(id: u32, arrival: Tick, cpu: Tick, finish: Tick) -> ProcessRecord {
        let mut r = ProcessRecord::from_descriptor(&ProcessDescriptor::new(id, 1, arrival, cpu));
        r.remaining_cpu_time = 0;
        r.state = ProcessState::Terminated;
        r.finish_time = Some(finish);
        r
    }

    #[test]
    fn test_metrics_basic() {
        let records = vec![finished(1, 0, 3, 3), finished(2, 0, 5, 8)];
        let m = Metrics::calculate(&records, 8);

        assert_eq!(m.process_count, 2);
        assert_eq!(m.end_time, 8);
        assert!((m.throughput - 0.25).abs() < 1e-10);
        assert!((m.avg_turnaround - 5.5).abs() < 1e-10); // (3 + 8) / 2
        assert_eq!(m.max_turnaround, 8);
        assert!((m.cpu_utilization - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_turnaround_uses_arrival() {
        let records = vec![finished(1, 10, 5, 25)];
        let m = Metrics::calculate(&records, 25);
        assert!((m.avg_turnaround - 15.0).abs() < 1e-10);
        assert!((m.cpu_utilization - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_wait_and_response() {
        let mut a = finished(1, 0, 2, 2);
        a.accumulated_wait = 4;
        a.io_start_history = vec![0, 10, 30]; // mean gap 15
        let mut b = finished(2, 0, 2, 4);
        b.accumulated_wait = 2;
        b.io_start_history = vec![5]; // fewer than two → 0

        let m = Metrics::calculate(&[a, b], 4);
        assert!((m.avg_wait - 3.0).abs() < 1e-10);
        assert!((m.avg_response - 7.5).abs() < 1e-10);
    }

    #[test]
    fn test_unpopulated_fields_give_zero() {
        let m = Metrics::calculate(&[finished(1, 0, 3, 3)], 3);
        assert!((m.avg_wait - 0.0).abs() < 1e-10);
        assert!((m.avg_response - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_metrics_empty() {
        assert_eq!(Metrics::calculate(&[], 10), Metrics::default());
        assert_eq!(Metrics::calculate(&[finished(1, 0, 1, 1)], 0), Metrics::default());
    }
}
