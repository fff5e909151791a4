use super::state::{SimCtx, TaskState, Ticks};

/// Re-checks the core invariants after every step. All checks are
/// `debug_assert!`s.
#[derive(Debug)]
pub struct Observer {
    last_now: Ticks,
    // Timeline entries already checked
    checked_intervals: usize,
}

impl Observer {
    pub fn new() -> Self {
        Self {
            last_now: 0,
            checked_intervals: 0,
        }
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        debug_assert!(
            ctx.now >= self.last_now,
            "Clock went backwards: {} -> {}",
            self.last_now,
            ctx.now
        );
        self.last_now = ctx.now;

        if let Some(task_id) = ctx.current {
            let task = ctx.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Running,
                "current task {task_id} must be Running"
            );
        }

        for (&task_id, &dsq_id) in &ctx.task_to_dsq {
            let task = ctx.task(task_id);
            debug_assert_ne!(
                task.state,
                TaskState::Completed,
                "Completed task {task_id} still present in DSQ {dsq_id:?}"
            );
            debug_assert_ne!(
                task.state,
                TaskState::Running,
                "Running task {task_id} must not appear in any DSQ"
            );
            if let Some(dsq) = ctx.dsqs.get(dsq_id) {
                debug_assert!(
                    dsq.contains(task_id),
                    "task_to_dsq claims task {task_id} in DSQ {dsq_id:?}, but queue does not contain it"
                );
            } else {
                debug_assert!(false, "task_to_dsq references unknown DSQ {dsq_id:?}");
            }
        }

        // Single CPU: each new interval must start no earlier than the previous one ended
        let start = self.checked_intervals.saturating_sub(1);
        for pair in ctx.timeline[start..].windows(2) {
            debug_assert!(
                pair[0].end <= pair[1].start,
                "Overlapping intervals {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
        for interval in &ctx.timeline[self.checked_intervals..] {
            debug_assert!(interval.end > interval.start, "Empty interval {interval:?}");
        }
        self.checked_intervals = ctx.timeline.len();
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}
