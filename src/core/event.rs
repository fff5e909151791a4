use crate::core::{ExecutionInterval, TaskId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedCoreEvent {
    // Task entered the ready set
    Admitted {
        task: TaskId,
        at: Ticks,
    },
    // Nothing runnable; clock jumped to the next arrival
    Idle {
        from: Ticks,
        to: Ticks,
    },
    Dispatched {
        interval: ExecutionInterval,
    },
    // Slice expired with work left; task went back to its queue
    Preempted {
        task: TaskId,
        remaining: Ticks,
    },
    Completed {
        task: TaskId,
        at: Ticks,
    },
}
