//! Single-CPU process scheduling simulator.
//!
//! [`run`] takes a list of [`ProcessRequest`]s and a [`Policy`] and returns the
//! execution timeline plus per-process and aggregate metrics. For
//! step-by-step inspection use [`Sim`] with one of the schedulers directly.

pub mod config;
pub mod core;
pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod sim;

pub use config::{Policy, SimConfig};
pub use error::SimError;
pub use scheduler::Scheduler;
pub use sim::{ProcessRequest, Sim, SimReport, run};
