use super::priq::{PriqScheduler, RankPolicy};
use crate::core::{Rank, Task};

/// Shortest-Job-First (non-preemptive): least remaining work, then the order
/// tasks became eligible.
pub struct ShortestJobFirst;

impl RankPolicy for ShortestJobFirst {
    const NAME: &'static str = "SJF";

    fn rank(task: &Task) -> Rank {
        let seq = task
            .admit_seq
            .expect("Task ranked before it was admitted");
        Rank(task.remaining as i64, seq, 0)
    }
}

pub type SjfScheduler = PriqScheduler<ShortestJobFirst>;
