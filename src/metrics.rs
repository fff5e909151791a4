//! Per-process and aggregate figures derived from a finished run.
//!
//! Everything here is a pure function of the task table and the execution
//! log, so the same numbers can be recomputed from a stored timeline.

use average::{Estimate, Mean};

use crate::config::{ENERGY_BASE_UNIT, ENERGY_BURST_THRESHOLD, ENERGY_HIGH_RATE, ENERGY_LOW_RATE};
use crate::core::{ExecutionInterval, Pid, Task, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessMetrics {
    pub id: Pid,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub start_time: Ticks,
    pub completion_time: Ticks,
    pub turnaround_time: Ticks,
    pub waiting_time: Ticks,
    pub response_time: Ticks,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateMetrics {
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    /// End of the last interval.
    pub makespan: Ticks,
    pub busy_time: Ticks,
    /// Time in `[0, makespan)` with nothing running.
    pub idle_time: Ticks,
    pub cpu_utilization: f64,
}

/// Energy drawn per unit of CPU time, as a function of the burst time of the
/// process that is running.
pub trait EnergyModel {
    fn rate(&self, burst_time: Ticks) -> f64;

    fn base_unit(&self) -> f64 {
        1.0
    }
}

/// Long jobs are assumed to run at a lower-power operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoTierEnergy {
    pub threshold: Ticks,
    pub low_rate: f64,
    pub high_rate: f64,
    pub base_unit: f64,
}

impl Default for TwoTierEnergy {
    fn default() -> Self {
        Self {
            threshold: ENERGY_BURST_THRESHOLD,
            low_rate: ENERGY_LOW_RATE,
            high_rate: ENERGY_HIGH_RATE,
            base_unit: ENERGY_BASE_UNIT,
        }
    }
}

impl EnergyModel for TwoTierEnergy {
    fn rate(&self, burst_time: Ticks) -> f64 {
        if burst_time > self.threshold {
            self.low_rate
        } else {
            self.high_rate
        }
    }

    fn base_unit(&self) -> f64 {
        self.base_unit
    }
}

/// Metrics for one finished task.
///
/// # Panics
/// If the task never ran to completion.
pub fn process_metrics(task: &Task) -> ProcessMetrics {
    let completion_time = task
        .completion_time
        .unwrap_or_else(|| panic!("Task {} has not completed", task.pid));
    let start_time = task
        .start_time
        .unwrap_or_else(|| panic!("Completed task {} never started", task.pid));

    let turnaround_time = completion_time - task.arrival_time;
    ProcessMetrics {
        id: task.pid,
        arrival_time: task.arrival_time,
        burst_time: task.burst_time,
        start_time,
        completion_time,
        turnaround_time,
        waiting_time: turnaround_time - task.burst_time,
        response_time: start_time - task.arrival_time,
    }
}

/// Per-process rows in pid order, plus the aggregates over them.
pub fn compute(
    tasks: &[Task],
    timeline: &[ExecutionInterval],
) -> (Vec<ProcessMetrics>, AggregateMetrics) {
    let mut rows: Vec<ProcessMetrics> = tasks.iter().map(process_metrics).collect();
    rows.sort_by_key(|row| row.id);

    let makespan = timeline.last().map_or(0, |i| i.end);
    let busy_time: Ticks = timeline.iter().map(ExecutionInterval::duration).sum();
    let cpu_utilization = if makespan == 0 {
        0.0
    } else {
        busy_time as f64 / makespan as f64
    };

    let aggregate = AggregateMetrics {
        avg_waiting_time: avg(rows.iter().map(|r| r.waiting_time as f64)),
        avg_turnaround_time: avg(rows.iter().map(|r| r.turnaround_time as f64)),
        avg_response_time: avg(rows.iter().map(|r| r.response_time as f64)),
        makespan,
        busy_time,
        idle_time: makespan - busy_time,
        cpu_utilization,
    };

    (rows, aggregate)
}

/// Σ duration × base unit × rate(burst of the running process).
pub fn energy(tasks: &[Task], timeline: &[ExecutionInterval], model: &dyn EnergyModel) -> f64 {
    timeline
        .iter()
        .map(|interval| {
            let burst = tasks[interval.task].burst_time;
            interval.duration() as f64 * model.base_unit() * model.rate(burst)
        })
        .sum()
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskState;

    fn finished(id: usize, arrival: Ticks, burst: Ticks, start: Ticks, done: Ticks) -> Task {
        Task {
            id,
            pid: id as Pid + 1,
            state: TaskState::Completed,
            arrival_time: arrival,
            burst_time: burst,
            priority: 0,
            remaining: 0,
            allocated_timeslice: None,
            start_time: Some(start),
            completion_time: Some(done),
            last_enqueued_at: None,
            admit_seq: None,
        }
    }

    fn interval(task: usize, start: Ticks, end: Ticks) -> ExecutionInterval {
        ExecutionInterval {
            task,
            pid: task as Pid + 1,
            start,
            end,
        }
    }

    #[test]
    fn waiting_and_turnaround_follow_completion() {
        let row = process_metrics(&finished(0, 2, 3, 6, 9));
        assert_eq!(row.turnaround_time, 7);
        assert_eq!(row.waiting_time, 4);
        assert_eq!(row.response_time, 4);
    }

    #[test]
    fn aggregates_count_leading_idle_time() {
        let tasks = [finished(0, 1, 2, 1, 3), finished(1, 5, 1, 5, 6)];
        let timeline = [interval(0, 1, 3), interval(1, 5, 6)];
        let (rows, agg) = compute(&tasks, &timeline);

        assert_eq!(rows.len(), 2);
        assert_eq!(agg.makespan, 6);
        assert_eq!(agg.busy_time, 3);
        assert_eq!(agg.idle_time, 3);
        assert!((agg.cpu_utilization - 0.5).abs() < 1e-9);
        assert!((agg.avg_turnaround_time - 1.5).abs() < 1e-9);
        assert!(agg.avg_waiting_time.abs() < 1e-9);
    }

    #[test]
    fn two_tier_rates_split_on_threshold() {
        let model = TwoTierEnergy::default();
        assert_eq!(model.rate(5), ENERGY_HIGH_RATE);
        assert_eq!(model.rate(6), ENERGY_LOW_RATE);
    }

    #[test]
    fn energy_sums_each_interval_at_its_process_rate() {
        // Burst 6 runs at 0.8, burst 2 at 1.2; base unit 1.5.
        let tasks = [finished(0, 0, 6, 0, 8), finished(1, 0, 2, 2, 4)];
        let timeline = [interval(0, 0, 2), interval(1, 2, 4), interval(0, 4, 8)];
        let total = energy(&tasks, &timeline, &TwoTierEnergy::default());
        let expected = 6.0 * 1.5 * 0.8 + 2.0 * 1.5 * 1.2;
        assert!((total - expected).abs() < 1e-9);
    }

    struct Flat;

    impl EnergyModel for Flat {
        fn rate(&self, _burst_time: Ticks) -> f64 {
            2.0
        }
    }

    #[test]
    fn energy_model_is_pluggable() {
        let tasks = [finished(0, 0, 3, 0, 3)];
        let timeline = [interval(0, 0, 3)];
        assert!((energy(&tasks, &timeline, &Flat) - 6.0).abs() < 1e-9);
    }
}
