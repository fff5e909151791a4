use tracing::{debug, trace};

use super::{
    event::SchedCoreEvent,
    observer::Observer,
    state::{SimCtx, TaskId, Ticks},
};
use crate::scheduler::{
    DispatchError, ENQ_PREEMPT, ENQ_REENQ, ENQ_WAKEUP, EnqueueFlags, Scheduler,
};
use crate::sim::job::Job;

pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(jobs: &[Job], config: S::Config) -> Self {
        let mut ctx = SimCtx::new(jobs);
        let scheduler = S::init(&mut ctx, config);
        let observer = Observer::new();
        Self {
            ctx,
            scheduler,
            observer,
        }
    }

    /// Runs one dispatch: admits arrivals, jumps over an idle gap if nothing
    /// is eligible, then gives the CPU to the task the scheduler picks for at
    /// most its slice.
    ///
    /// Returns no events once every task has completed. Each step that
    /// returns events advances the clock, so a run takes at most one step
    /// per unit of total burst time.
    pub fn step(&mut self) -> Vec<SchedCoreEvent> {
        let mut events = Vec::new();
        self.admit(&mut events);

        if !self.ctx.has_eligible() {
            let Some(next) = self.ctx.next_arrival_time() else {
                debug_assert!(
                    self.ctx.all_completed(),
                    "Nothing eligible or pending, but tasks remain"
                );
                return events;
            };
            debug!(from = self.ctx.now, to = next, "cpu idle");
            events.push(SchedCoreEvent::Idle {
                from: self.ctx.now,
                to: next,
            });
            self.ctx.advance_to(next);
            self.admit(&mut events);
        }

        match self.scheduler.dispatch(&mut self.ctx) {
            Ok(task) => self.run_task(task, &mut events),
            Err(DispatchError::NoRunnableTask) => {
                // Scheduler left CPU idle.
                debug_assert!(
                    false,
                    "{} had eligible tasks but dispatched none",
                    self.scheduler.name()
                );
            }
        }

        self.observer.observe(&self.ctx);
        events
    }

    fn run_task(&mut self, task_id: TaskId, events: &mut Vec<SchedCoreEvent>) {
        let (slice, remaining) = {
            let task = self.ctx.task(task_id);
            let slice = task
                .allocated_timeslice
                .expect("Dispatched task must have a slice");
            (slice, task.remaining)
        };
        debug_assert!(remaining > 0, "Dispatched task {task_id} has no work left");
        let ran = slice.min(remaining);

        self.ctx.set_running(task_id);
        let start = self.ctx.now;
        self.ctx.advance_time(ran);
        self.ctx.record_interval(task_id, start);
        let remaining = {
            let task = self.ctx.task_mut(task_id);
            task.remaining -= ran;
            task.remaining
        };

        let interval = *self
            .ctx
            .timeline
            .last()
            .expect("Interval was just recorded");
        debug!(
            pid = interval.pid,
            start = interval.start,
            end = interval.end,
            remaining,
            "dispatched"
        );
        events.push(SchedCoreEvent::Dispatched { interval });
        self.ctx.clear_cpu();

        // Arrivals during the slice queue up ahead of the preempted task
        self.admit(events);

        if remaining == 0 {
            self.ctx.mark_completed(task_id, self.ctx.now);
            debug!(pid = interval.pid, at = self.ctx.now, "completed");
            events.push(SchedCoreEvent::Completed {
                task: task_id,
                at: self.ctx.now,
            });
        } else {
            self.ctx.mark_runnable(task_id);
            debug!(pid = interval.pid, remaining, "preempted");
            let flags: EnqueueFlags = ENQ_PREEMPT | ENQ_REENQ;
            self.scheduler.enqueue(&mut self.ctx, task_id, flags);
            events.push(SchedCoreEvent::Preempted {
                task: task_id,
                remaining,
            });
        }
    }

    fn admit(&mut self, events: &mut Vec<SchedCoreEvent>) {
        for task in self.ctx.admit_arrivals() {
            trace!(pid = self.ctx.task(task).pid, at = self.ctx.now, "admitted");
            self.scheduler.enqueue(&mut self.ctx, task, ENQ_WAKEUP);
            events.push(SchedCoreEvent::Admitted {
                task,
                at: self.ctx.now,
            });
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ctx.all_completed()
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }
}
