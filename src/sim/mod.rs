pub mod driver;
pub mod job;

pub use driver::{Sim, SimReport, run};
pub use job::{Job, ProcessRequest, validate_requests};
