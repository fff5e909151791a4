pub mod fcfs;
pub mod priority;
pub mod priq;
pub mod round_robin;
pub mod sjf;

use crate::core::{
    Ticks,
    state::{SimCtx, TaskId},
};
pub use fcfs::{Fcfs, FcfsScheduler};
pub use priority::{PriorityScheduler, StaticPriority};
pub use priq::{PriqScheduler, RankPolicy};
pub use round_robin::RoundRobinScheduler;
pub use sjf::{ShortestJobFirst, SjfScheduler};

pub type EnqueueFlags = u64;

// Task just arrived
pub const ENQ_WAKEUP: EnqueueFlags = 1 << 0;
// Task was taken off the CPU with work left
pub const ENQ_PREEMPT: EnqueueFlags = 1 << 32;
// Task has been queued before
pub const ENQ_REENQ: EnqueueFlags = 1 << 40;

// Run until the task has no work left
pub const SLICE_INF: Ticks = Ticks::MAX;

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchError {
    NoRunnableTask,
}

/// A dispatching policy.
///
/// The driver admits arrivals and hands each one to `enqueue`; whenever the
/// CPU is free it asks `dispatch` for the next task. A task runs for at most
/// the slice it was enqueued with, then is either completed by the driver or
/// handed back to `enqueue` with `ENQ_PREEMPT | ENQ_REENQ`.
pub trait Scheduler {
    type Config;

    fn init(ctx: &mut SimCtx, config: Self::Config) -> Self;

    fn name(&self) -> &'static str;

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags);

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<TaskId, DispatchError>;
}
