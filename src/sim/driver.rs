use tracing::info;

use super::job::{ProcessRequest, validate_requests};
use crate::{
    config::{Policy, SimConfig},
    core::{ExecutionInterval, SchedCoreEvent, Task, driver::SchedCore},
    error::SimError,
    metrics::{self, AggregateMetrics, EnergyModel, ProcessMetrics},
    scheduler::{FcfsScheduler, PriorityScheduler, RoundRobinScheduler, Scheduler, SjfScheduler},
};

/// Everything a presentation layer needs from one run.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub policy: Policy,
    pub timeline: Vec<ExecutionInterval>,
    /// One row per process, in pid order.
    pub processes: Vec<ProcessMetrics>,
    pub aggregate: AggregateMetrics,
    pub energy: Option<f64>,
}

pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
}

impl<S: Scheduler> Sim<S> {
    pub fn new(requests: &[ProcessRequest], config: S::Config) -> Result<Self, SimError> {
        let jobs = validate_requests(requests)?;
        Ok(Self {
            core: SchedCore::<S>::new(&jobs, config),
        })
    }

    pub fn step(&mut self) -> Vec<SchedCoreEvent> {
        self.core.step()
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.is_finished()
    }

    pub fn run_to_completion(&mut self) {
        while !self.all_jobs_completed() {
            let events = self.step();
            if events.is_empty() {
                debug_assert!(false, "Simulation stalled at t={}", self.core.now());
                break;
            }
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.core.ctx.tasks
    }

    pub fn timeline(&self) -> &[ExecutionInterval] {
        &self.core.ctx.timeline
    }

    pub fn jobs_map<'a, T>(
        &'a self,
        f: impl Fn(&Task) -> T + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        self.tasks().iter().map(f)
    }

    pub fn report(&self, policy: Policy, energy: Option<&dyn EnergyModel>) -> SimReport {
        debug_assert!(self.all_jobs_completed(), "Report requested mid-run");
        let (processes, aggregate) = metrics::compute(self.tasks(), self.timeline());
        let energy = energy.map(|model| metrics::energy(self.tasks(), self.timeline(), model));

        SimReport {
            policy,
            timeline: self.timeline().to_vec(),
            processes,
            aggregate,
            energy,
        }
    }
}

fn run_with<S: Scheduler>(
    requests: &[ProcessRequest],
    sched_config: S::Config,
    policy: Policy,
    config: &SimConfig,
) -> Result<SimReport, SimError> {
    let mut sim = Sim::<S>::new(requests, sched_config)?;
    sim.run_to_completion();

    let energy = config.energy.as_ref().map(|m| m as &dyn EnergyModel);
    Ok(sim.report(policy, energy))
}

/// Simulates `requests` under `policy` from t=0 until every process has
/// finished.
///
/// # Errors
/// Invalid requests are rejected before anything runs; see [`SimError`].
pub fn run(
    requests: &[ProcessRequest],
    policy: Policy,
    config: &SimConfig,
) -> Result<SimReport, SimError> {
    info!(%policy, processes = requests.len(), "simulation start");

    let report = match policy {
        Policy::Fcfs => run_with::<FcfsScheduler>(requests, (), policy, config),
        Policy::Sjf => run_with::<SjfScheduler>(requests, (), policy, config),
        Policy::Priority => run_with::<PriorityScheduler>(requests, (), policy, config),
        Policy::RoundRobin { quantum } => {
            run_with::<RoundRobinScheduler>(requests, quantum, policy, config)
        }
    }?;

    info!(
        %policy,
        intervals = report.timeline.len(),
        makespan = report.aggregate.makespan,
        avg_waiting = report.aggregate.avg_waiting_time,
        avg_turnaround = report.aggregate.avg_turnaround_time,
        "simulation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU64;

    #[test]
    fn invalid_request_aborts_before_simulating() {
        let reqs = [ProcessRequest::new(1, 0, 3), ProcessRequest::new(2, 1, 0)];
        let err = run(&reqs, Policy::Fcfs, &SimConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidProcessRequest { id: 2, .. }));
    }

    #[test]
    fn energy_reported_only_when_enabled() {
        let reqs = ProcessRequest::numbered([(0, 6, 0), (1, 2, 0)]);

        let plain = run(&reqs, Policy::Fcfs, &SimConfig::default()).unwrap();
        assert_eq!(plain.energy, None);

        let config = SimConfig::default().with_energy(metrics::TwoTierEnergy::default());
        let with_energy = run(&reqs, Policy::Fcfs, &config).unwrap();
        let expected = 6.0 * 1.5 * 0.8 + 2.0 * 1.5 * 1.2;
        assert!((with_energy.energy.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn step_api_matches_one_shot_run() {
        let reqs = ProcessRequest::numbered([(0, 4, 0), (1, 3, 0), (2, 2, 0)]);
        let mut sim = Sim::<RoundRobinScheduler>::new(&reqs, NonZeroU64::new(2).unwrap()).unwrap();
        let mut steps = 0;
        while !sim.all_jobs_completed() {
            assert!(!sim.step().is_empty());
            steps += 1;
        }
        assert_eq!(steps, sim.timeline().len());

        let report = run(&reqs, Policy::round_robin(2).unwrap(), &SimConfig::default()).unwrap();
        assert_eq!(report.timeline, sim.timeline());
        let completions: Vec<u64> = sim.jobs_map(|t| t.completion_time.unwrap()).collect();
        assert_eq!(completions, vec![8, 9, 6]);
    }
}
