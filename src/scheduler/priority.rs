use super::priq::{PriqScheduler, RankPolicy};
use crate::core::{Rank, Task};

/// Static priority (non-preemptive). Lower values are more urgent; ties go
/// to the earliest arrival, then the lowest pid.
pub struct StaticPriority;

impl RankPolicy for StaticPriority {
    const NAME: &'static str = "Priority";

    fn rank(task: &Task) -> Rank {
        Rank(task.priority, task.arrival_time, u64::from(task.pid))
    }
}

pub type PriorityScheduler = PriqScheduler<StaticPriority>;
