use anyhow::{Context, Result, bail};
use clap::Parser;
use cpusim::{
    Policy, ProcessRequest, Scheduler, Sim, SimConfig, SimReport,
    config::DEFAULT_QUANTUM,
    core::SchedCoreEvent,
    metrics::TwoTierEnergy,
    scheduler::{FcfsScheduler, PriorityScheduler, RoundRobinScheduler, SjfScheduler},
};
use rand::prelude::*;
use tracing_subscriber::EnvFilter;

/// Runs a random workload through the CPU scheduling policies.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// FCFS, SJF, Priority, RoundRobin, or "all"
    #[arg(short, long, default_value = "all")]
    policy: String,

    /// Round-Robin time quantum
    #[arg(short, long, default_value_t = DEFAULT_QUANTUM as i64)]
    quantum: i64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Length of the arrival window
    #[arg(long, default_value_t = 40)]
    ticks: u64,

    /// Chance that a process arrives on a given tick
    #[arg(long, default_value_t = 0.3)]
    p_arrival: f64,

    /// Chance that an arriving process is short
    #[arg(long, default_value_t = 0.3)]
    p_short: f64,

    #[arg(long, default_value_t = 2)]
    short_ticks: i64,

    #[arg(long, default_value_t = 6)]
    long_ticks: i64,

    /// Report energy with the default two-tier model
    #[arg(long)]
    energy: bool,

    /// Print every scheduler event
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.p_arrival) || !(0.0..=1.0).contains(&args.p_short) {
        bail!("probabilities must be within [0, 1]");
    }

    let requests = bernoulli_jobs(&args);
    if requests.is_empty() {
        bail!("workload is empty; raise --ticks or --p-arrival");
    }

    let policies = if args.policy.eq_ignore_ascii_case("all") {
        Policy::NAMES
            .iter()
            .map(|name| Policy::parse(name, Some(args.quantum)))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        vec![Policy::parse(&args.policy, Some(args.quantum))?]
    };

    let mut config = SimConfig::default();
    if args.energy {
        config = config.with_energy(TwoTierEnergy::default());
    }

    println!("{} processes (seed {})", requests.len(), args.seed);
    for policy in policies {
        if args.events {
            print_events(&requests, policy)?;
        }
        let report = cpusim::run(&requests, policy, &config)
            .with_context(|| format!("running {policy}"))?;
        print_report(&report);
    }

    Ok(())
}

fn bernoulli_jobs(args: &Args) -> Vec<ProcessRequest> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut jobs = Vec::new();

    for t in 0..args.ticks {
        if rng.random::<f64>() < args.p_arrival {
            let burst = if rng.random::<f64>() < args.p_short {
                args.short_ticks
            } else {
                args.long_ticks
            };
            let priority = rng.random_range(0..5);

            jobs.push(
                ProcessRequest::new(jobs.len() as u32 + 1, t as i64, burst).with_priority(priority),
            );
        }
    }

    jobs
}

fn print_events(requests: &[ProcessRequest], policy: Policy) -> Result<()> {
    match policy {
        Policy::Fcfs => trace_events(Sim::<FcfsScheduler>::new(requests, ())?),
        Policy::Sjf => trace_events(Sim::<SjfScheduler>::new(requests, ())?),
        Policy::Priority => trace_events(Sim::<PriorityScheduler>::new(requests, ())?),
        Policy::RoundRobin { quantum } => {
            trace_events(Sim::<RoundRobinScheduler>::new(requests, quantum)?)
        }
    }
    Ok(())
}

fn trace_events<S: Scheduler>(mut sim: Sim<S>) {
    println!("== {} events", sim.core.scheduler.name());
    while !sim.all_jobs_completed() {
        let now = sim.core.now();
        let events = sim.step();
        if events.is_empty() {
            break;
        }

        for event in events {
            let pid = |task: usize| sim.tasks()[task].pid;
            match event {
                SchedCoreEvent::Admitted { task, at } => println!("t={at} P{} admitted", pid(task)),
                SchedCoreEvent::Idle { from, to } => println!("t={from} idle until {to}"),
                SchedCoreEvent::Dispatched { interval } => println!(
                    "t={} P{} runs until {}",
                    interval.start, interval.pid, interval.end
                ),
                SchedCoreEvent::Preempted { task, remaining } => {
                    println!("t={} P{} preempted, {remaining} left", sim.core.now(), pid(task))
                }
                SchedCoreEvent::Completed { task, at } => println!("t={at} P{} done", pid(task)),
            }
        }
        debug_assert!(sim.core.now() > now, "step did not advance the clock");
    }
}

fn print_report(report: &SimReport) {
    println!("== {}", report.policy);
    println!(
        "{:>5} {:>8} {:>6} {:>6} {:>11} {:>11} {:>8} {:>9}",
        "pid", "arrival", "burst", "start", "completion", "turnaround", "waiting", "response"
    );
    for row in &report.processes {
        println!(
            "{:>5} {:>8} {:>6} {:>6} {:>11} {:>11} {:>8} {:>9}",
            format!("P{}", row.id),
            row.arrival_time,
            row.burst_time,
            row.start_time,
            row.completion_time,
            row.turnaround_time,
            row.waiting_time,
            row.response_time
        );
    }

    let agg = &report.aggregate;
    println!("Average waiting time: {:.2} ticks", agg.avg_waiting_time);
    println!("Average turnaround time: {:.2} ticks", agg.avg_turnaround_time);
    println!("Average response time: {:.2} ticks", agg.avg_response_time);
    println!(
        "Makespan: {} ticks, idle {} ticks, utilization {:.1}%",
        agg.makespan,
        agg.idle_time,
        agg.cpu_utilization * 100.0
    );
    if let Some(energy) = report.energy {
        println!("Total energy consumption: {energy:.2} units");
    }
    println!();
}
