use std::fmt;
use std::num::NonZeroU64;

use crate::error::SimError;
use crate::metrics::TwoTierEnergy;

/// Priority given to requests that do not set one.
pub const DEFAULT_PRIORITY: i64 = 0;

pub const DEFAULT_QUANTUM: u64 = 2;

// Two-tier DVFS approximation: bursts longer than the threshold run at the
// low rate.
pub const ENERGY_BURST_THRESHOLD: u64 = 5;
pub const ENERGY_LOW_RATE: f64 = 0.8;
pub const ENERGY_HIGH_RATE: f64 = 1.2;
pub const ENERGY_BASE_UNIT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fcfs,
    Sjf,
    Priority,
    RoundRobin { quantum: NonZeroU64 },
}

impl Policy {
    pub const NAMES: [&'static str; 4] = ["FCFS", "SJF", "Priority", "RoundRobin"];

    pub fn round_robin(quantum: u64) -> Result<Self, SimError> {
        NonZeroU64::new(quantum)
            .map(|quantum| Self::RoundRobin { quantum })
            .ok_or_else(|| {
                SimError::InvalidConfiguration("round-robin quantum must be positive".to_string())
            })
    }

    /// Resolves a policy by name. Names are case-insensitive and ignore
    /// spaces, dashes and underscores, so "Round Robin" and "round_robin"
    /// both work. `quantum` is only read for Round-Robin, where it is
    /// required.
    pub fn parse(name: &str, quantum: Option<i64>) -> Result<Self, SimError> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "fcfs" => Ok(Self::Fcfs),
            "sjf" => Ok(Self::Sjf),
            "priority" => Ok(Self::Priority),
            "roundrobin" | "rr" => match quantum {
                Some(q) if q > 0 => Self::round_robin(q as u64),
                Some(q) => Err(SimError::InvalidConfiguration(format!(
                    "round-robin quantum must be positive, got {q}"
                ))),
                None => Err(SimError::InvalidConfiguration(
                    "round-robin requires a quantum".to_string(),
                )),
            },
            _ => Err(SimError::InvalidConfiguration(format!(
                "unknown policy {name:?}, expected one of {:?}",
                Self::NAMES
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => Self::NAMES[0],
            Self::Sjf => Self::NAMES[1],
            Self::Priority => Self::NAMES[2],
            Self::RoundRobin { .. } => Self::NAMES[3],
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin { quantum } => write!(f, "{}(q={quantum})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Per-run options that are not part of the policy itself.
#[derive(Debug, Clone, Default)]
pub struct SimConfig {
    /// Report energy consumption using this model.
    pub energy: Option<TwoTierEnergy>,
}

impl SimConfig {
    pub fn with_energy(mut self, model: TwoTierEnergy) -> Self {
        self.energy = Some(model);
        self
    }
}
