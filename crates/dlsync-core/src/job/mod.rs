//! Job record model: the shape of one tracked download as reported by the
//! download service, its status state machine, and the start request.

mod record;
mod request;
mod status;

pub use record::{JobId, JobRecord};
pub use request::{StartRequest, ValidationError};
pub use status::{ActiveSet, JobStatus};
