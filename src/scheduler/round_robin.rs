use std::num::NonZeroU64;

use super::{DispatchError, EnqueueFlags, Scheduler, SimCtx, TaskId};
use crate::core::DsqId;

/// Preemptive Round-Robin over one FIFO queue. Every task gets the same
/// quantum; a preempted task goes to the tail, behind whatever arrived while
/// it was running (the driver admits arrivals before re-enqueueing it).
pub struct RoundRobinScheduler {
    global_dsq: DsqId,
    quantum: NonZeroU64,
}

impl Scheduler for RoundRobinScheduler {
    type Config = NonZeroU64;

    fn init(ctx: &mut SimCtx, quantum: NonZeroU64) -> Self {
        Self {
            global_dsq: ctx.create_dsq_fifo(),
            quantum,
        }
    }

    fn name(&self) -> &'static str {
        "RoundRobin"
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags) {
        let _ = flags;
        ctx.dsq_push_fifo(self.global_dsq, task, self.quantum.get());
    }

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Result<TaskId, DispatchError> {
        ctx.dsq_pop(self.global_dsq)
            .ok_or(DispatchError::NoRunnableTask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::priq::test_util::job;
    use crate::scheduler::{ENQ_PREEMPT, ENQ_REENQ, ENQ_WAKEUP};

    #[test]
    fn fifo_with_requeue_at_tail() {
        let jobs = [job(1, 0, 5, 0), job(2, 0, 5, 0)];
        let mut ctx = SimCtx::new(&jobs);
        let mut rr = RoundRobinScheduler::init(&mut ctx, NonZeroU64::new(2).unwrap());
        for task in ctx.admit_arrivals() {
            rr.enqueue(&mut ctx, task, ENQ_WAKEUP);
        }

        let first = rr.dispatch(&mut ctx).unwrap();
        assert_eq!(first, 0);
        assert_eq!(ctx.task(first).allocated_timeslice, Some(2));
        assert_eq!(ctx.task(first).last_enqueued_at, Some(0));

        ctx.advance_time(2);
        rr.enqueue(&mut ctx, first, ENQ_PREEMPT | ENQ_REENQ);
        assert_eq!(ctx.task(first).last_enqueued_at, Some(2));
        assert_eq!(ctx.task(1).last_enqueued_at, Some(0));
        assert_eq!(rr.dispatch(&mut ctx), Ok(1));
        assert_eq!(rr.dispatch(&mut ctx), Ok(0));
        assert_eq!(rr.dispatch(&mut ctx), Err(DispatchError::NoRunnableTask));
    }
}
