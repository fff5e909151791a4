use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;

use crate::sim::job::Job;

// Index into Task Vec
pub type TaskId = usize;
// User-visible process id (1-based submission order)
pub type Pid = u32;
pub type Ticks = u64;
new_key_type! {
    pub struct DsqId;
}

/// Dispatch ordering key. Smaller ranks are dispatched first; fields are
/// compared left to right.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct Rank(pub i64, pub u64, pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    // Not yet arrived
    Pending,
    Runnable,
    Running,
    Completed,
}

#[derive(Debug)]
pub struct Task {
    pub id: TaskId,
    pub pid: Pid,
    pub state: TaskState,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: i64,
    pub remaining: Ticks,
    pub allocated_timeslice: Option<Ticks>,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
    pub last_enqueued_at: Option<Ticks>,
    // Order in which the task entered the ready set
    pub admit_seq: Option<u64>,
}

/// One contiguous stretch of CPU time given to a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionInterval {
    pub task: TaskId,
    pub pid: Pid,
    pub start: Ticks,
    pub end: Ticks,
}

impl ExecutionInterval {
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop Rank's Ord
impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (other.0, other.1, other.2).cmp(&(self.0, self.1, self.2))
    }
}

#[derive(Debug)]
pub enum Dsq {
    Fifo {
        tasks: VecDeque<TaskId>,
    },
    Priq {
        tasks: KeyedPriorityQueue<TaskId, Rank>,
    },
}

impl Dsq {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            tasks: VecDeque::new(),
        }
    }

    pub fn new_priq() -> Self {
        Self::Priq {
            tasks: KeyedPriorityQueue::new(),
        }
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        match self {
            Self::Fifo { tasks } => tasks.contains(&task_id),
            Self::Priq { tasks } => tasks.iter().any(|t| *t.0 == task_id),
        }
    }
}

/// Everything one simulation run owns: the clock, the per-process runtime
/// state, the dispatch queues and the execution log.
///
/// The ready-set bookkeeping also lives here. Tasks are admitted from
/// `arrivals` (sorted by arrival time, then pid) exactly once, so a task
/// can never be made eligible twice; after that only the scheduler moves it
/// between its queues and the CPU.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub current: Option<TaskId>,
    pub tasks: Vec<Task>,
    pub dsqs: SlotMap<DsqId, Dsq>,
    pub task_to_dsq: FxHashMap<TaskId, DsqId>,
    pub timeline: Vec<ExecutionInterval>,

    arrivals: Vec<TaskId>,
    arrival_cursor: usize,
    // Increment upon admission
    next_admit_seq: u64,
}

impl SimCtx {
    /// `jobs` must already be validated and sorted by pid; task ids are
    /// their positions.
    pub fn new(jobs: &[Job]) -> Self {
        let tasks: Vec<Task> = jobs
            .iter()
            .enumerate()
            .map(|(id, job)| Task {
                id,
                pid: job.id,
                state: TaskState::Pending,
                arrival_time: job.arrival_time,
                burst_time: job.burst_time,
                priority: job.priority,
                remaining: job.burst_time,
                allocated_timeslice: None,
                start_time: None,
                completion_time: None,
                last_enqueued_at: None,
                admit_seq: None,
            })
            .collect();

        let mut arrivals: Vec<TaskId> = (0..tasks.len()).collect();
        arrivals.sort_by_key(|&id| (tasks[id].arrival_time, tasks[id].pid));

        Self {
            now: 0,
            current: None,
            tasks,
            dsqs: SlotMap::with_key(),
            task_to_dsq: FxHashMap::default(),
            timeline: Vec::new(),
            arrivals,
            arrival_cursor: 0,
            next_admit_seq: 0,
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    // Jump across an idle gap
    pub fn advance_to(&mut self, when: Ticks) {
        debug_assert!(when >= self.now, "Clock must not run backwards");
        self.now = when;
    }

    /// Marks every not-yet-admitted task with `arrival_time <= now` as
    /// runnable and returns them in ascending pid order.
    ///
    /// Admission sequence numbers are handed out in arrival order (pid breaks
    /// ties), which is the "became eligible" order policies may rank by.
    pub fn admit_arrivals(&mut self) -> Vec<TaskId> {
        let now = self.now;
        let admitted: Vec<TaskId> = self.arrivals[self.arrival_cursor..]
            .iter()
            .copied()
            .take_while(|&id| self.tasks[id].arrival_time <= now) // Contiguous, since arrivals are sorted
            .collect();
        self.arrival_cursor += admitted.len();

        for &id in &admitted {
            let seq = self.next_admit_seq;
            self.next_admit_seq += 1;

            let task = self.task_mut(id);
            debug_assert_eq!(
                task.state,
                TaskState::Pending,
                "Task {id} admitted twice"
            );
            debug_assert!(task.remaining > 0, "Admitted task {id} has no work");
            task.state = TaskState::Runnable;
            task.admit_seq = Some(seq);
        }

        let mut by_pid = admitted;
        by_pid.sort_by_key(|&id| self.tasks[id].pid);
        by_pid
    }

    pub fn has_eligible(&self) -> bool {
        !self.task_to_dsq.is_empty()
    }

    /// Earliest arrival strictly after the current clock among tasks that
    /// have not been admitted yet.
    pub fn next_arrival_time(&self) -> Option<Ticks> {
        self.arrivals[self.arrival_cursor..]
            .iter()
            .map(|&id| self.tasks[id].arrival_time)
            .find(|&t| t > self.now)
    }

    pub fn create_dsq_fifo(&mut self) -> DsqId {
        self.dsqs.insert(Dsq::new_fifo())
    }

    pub fn create_dsq_priq(&mut self) -> DsqId {
        self.dsqs.insert(Dsq::new_priq())
    }

    fn dsq_push(&mut self, dsq_id: DsqId, task_id: TaskId, slice: Ticks, rank: Option<Rank>) {
        assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Task {task_id} already present in some DSQ"
        );
        assert!(slice > 0, "Task {task_id} enqueued with an empty slice");

        let now = self.now;
        let task = self.task_mut(task_id);
        debug_assert!(
            task.state == TaskState::Runnable,
            "Task {task_id} must be Runnable when enqueued"
        );

        task.allocated_timeslice = Some(slice);
        task.last_enqueued_at = Some(now);
        let dsq = self.dsqs.get_mut(dsq_id).expect("Unknown DSQ");

        match dsq {
            Dsq::Fifo { tasks } => tasks.push_back(task_id),
            Dsq::Priq { tasks } => {
                tasks.push(
                    task_id,
                    rank.expect("Attempted to push to a PrioDsq with no rank"),
                );
            }
        };

        self.task_to_dsq.insert(task_id, dsq_id);
    }

    pub fn dsq_push_fifo(&mut self, dsq_id: DsqId, task_id: TaskId, slice: Ticks) {
        self.dsq_push(dsq_id, task_id, slice, None);
    }

    pub fn dsq_push_priq(&mut self, dsq_id: DsqId, task_id: TaskId, slice: Ticks, rank: Rank) {
        self.dsq_push(dsq_id, task_id, slice, Some(rank));
    }

    pub fn dsq_pop(&mut self, dsq_id: DsqId) -> Option<TaskId> {
        let dsq = self.dsqs.get_mut(dsq_id)?;
        let task = match dsq {
            Dsq::Fifo { tasks } => tasks.pop_front(),
            Dsq::Priq { tasks } => tasks.pop().map(|t| t.0),
        }?;

        let removed = self.task_to_dsq.remove(&task);
        debug_assert!(removed.is_some(), "Task {task} missing DSQ membership");

        Some(task)
    }

    pub fn task_in_any_dsq(&self, task_id: TaskId) -> bool {
        self.task_to_dsq.contains_key(&task_id)
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(|t| t.state == TaskState::Completed)
    }

    pub fn mark_runnable(&mut self, task_id: TaskId) {
        let task = self.task_mut(task_id);
        debug_assert!(
            task.state != TaskState::Completed,
            "Completed task {} cannot be runnable",
            task.id
        );
        task.state = TaskState::Runnable;
    }

    pub fn mark_completed(&mut self, task_id: TaskId, completion_time: Ticks) {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Completing task {} that is still enqueued",
            task_id
        );

        let task = &mut self.tasks[task_id];
        debug_assert!(
            task.state == TaskState::Running,
            "Task {task_id} must have been running before marked complete"
        );
        debug_assert_eq!(task.remaining, 0, "Task {task_id} completed with work left");

        task.state = TaskState::Completed;
        task.completion_time = Some(completion_time);
    }

    // Return previous state
    pub fn set_running(&mut self, task_id: TaskId) -> TaskState {
        debug_assert!(
            !self.task_to_dsq.contains_key(&task_id),
            "Running task {task_id} must not be enqueued"
        );
        debug_assert!(self.current.is_none(), "CPU already running a task");

        let now = self.now;
        self.current = Some(task_id);
        let task_state = self.task_mut(task_id);
        let prev_state = task_state.state;
        task_state.state = TaskState::Running;
        task_state.start_time.get_or_insert(now);
        prev_state
    }

    pub fn clear_cpu(&mut self) {
        self.current = None;
    }

    /// Appends `[start, now)` for `task` to the timeline.
    pub fn record_interval(&mut self, task_id: TaskId, start: Ticks) {
        debug_assert!(self.now > start, "Empty execution interval for {task_id}");
        let pid = self.task(task_id).pid;
        self.timeline.push(ExecutionInterval {
            task: task_id,
            pid,
            start,
            end: self.now,
        });
    }
}
