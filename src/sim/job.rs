use rustc_hash::FxHashSet;

use crate::config::DEFAULT_PRIORITY;
use crate::core::state::{Pid, Ticks};
use crate::error::SimError;

/// A process as submitted by the caller. Times are signed so that bad input
/// can be reported instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRequest {
    pub id: Pid,
    pub arrival_time: i64,
    pub burst_time: i64,
    pub priority: i64,
}

impl ProcessRequest {
    pub fn new(id: Pid, arrival_time: i64, burst_time: i64) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Numbers `(arrival_time, burst_time, priority)` tuples P1, P2, ... in
    /// submission order.
    pub fn numbered<I>(specs: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (i64, i64, i64)>,
    {
        specs
            .into_iter()
            .zip(1..)
            .map(|((arrival, burst, priority), id)| {
                Self::new(id, arrival, burst).with_priority(priority)
            })
            .collect()
    }
}

/// A validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: Pid,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: i64,
}

impl TryFrom<&ProcessRequest> for Job {
    type Error = SimError;

    fn try_from(req: &ProcessRequest) -> Result<Self, Self::Error> {
        let invalid = |reason: String| SimError::InvalidProcessRequest { id: req.id, reason };

        if req.burst_time <= 0 {
            return Err(invalid(format!(
                "burst time must be positive, got {}",
                req.burst_time
            )));
        }
        if req.arrival_time < 0 {
            return Err(invalid(format!(
                "arrival time must not be negative, got {}",
                req.arrival_time
            )));
        }

        Ok(Self {
            id: req.id,
            arrival_time: req.arrival_time as Ticks,
            burst_time: req.burst_time as Ticks,
            priority: req.priority,
        })
    }
}

/// Checks every request and returns the jobs sorted by pid. Fails on the
/// first bad request; nothing is simulated in that case.
///
/// The clock never passes the latest arrival plus the total burst, so a
/// workload is also refused when that bound does not fit in [`Ticks`].
pub fn validate_requests(requests: &[ProcessRequest]) -> Result<Vec<Job>, SimError> {
    if requests.is_empty() {
        return Err(SimError::NoProcesses);
    }

    let mut seen = FxHashSet::default();
    let mut jobs = Vec::with_capacity(requests.len());
    let mut latest_arrival: Ticks = 0;
    let mut total_burst: Ticks = 0;
    for req in requests {
        if !seen.insert(req.id) {
            return Err(SimError::InvalidProcessRequest {
                id: req.id,
                reason: "duplicate process id".to_string(),
            });
        }
        let job = Job::try_from(req)?;

        latest_arrival = latest_arrival.max(job.arrival_time);
        total_burst = total_burst
            .checked_add(job.burst_time)
            .filter(|total| latest_arrival.checked_add(*total).is_some())
            .ok_or_else(|| SimError::InvalidProcessRequest {
                id: req.id,
                reason: "workload would run past the end of the clock".to_string(),
            })?;
        jobs.push(job);
    }

    jobs.sort_by_key(|job| job.id);
    Ok(jobs)
}
