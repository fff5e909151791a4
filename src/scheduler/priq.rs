use std::marker::PhantomData;

use super::{DispatchError, ENQ_REENQ, EnqueueFlags, SLICE_INF, Scheduler, SimCtx, TaskId};
use crate::core::{DsqId, Rank, Task};

/// Ordering rule for a non-preemptive policy.
pub trait RankPolicy {
    const NAME: &'static str;

    fn rank(task: &Task) -> Rank;
}

/// Non-preemptive scheduler over a single ranked queue: the lowest-ranked
/// eligible task runs to completion.
pub struct PriqScheduler<P: RankPolicy> {
    global_priq: DsqId,
    _policy: PhantomData<P>,
}

impl<P: RankPolicy> Scheduler for PriqScheduler<P> {
    type Config = ();

    fn init(ctx: &mut SimCtx, _config: ()) -> Self {
        Self {
            global_priq: ctx.create_dsq_priq(),
            _policy: PhantomData,
        }
    }

    fn name(&self) -> &'static str {
        P::NAME
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags) {
        debug_assert_eq!(
            flags & ENQ_REENQ,
            0,
            "{} never preempts, task {task} re-enqueued",
            P::NAME
        );
        let rank = P::rank(ctx.task(task));
        ctx.dsq_push_priq(self.global_priq, task, SLICE_INF, rank);
    }

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<TaskId, DispatchError> {
        ctx.dsq_pop(self.global_priq)
            .ok_or(DispatchError::NoRunnableTask)
    }
}
