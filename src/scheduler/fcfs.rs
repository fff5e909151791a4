use super::priq::{PriqScheduler, RankPolicy};
use crate::core::{Rank, Task};

/// First-Come-First-Served: earliest arrival, then lowest pid.
pub struct Fcfs;

impl RankPolicy for Fcfs {
    const NAME: &'static str = "FCFS";

    fn rank(task: &Task) -> Rank {
        Rank(task.arrival_time as i64, u64::from(task.pid), 0)
    }
}

pub type FcfsScheduler = PriqScheduler<Fcfs>;
