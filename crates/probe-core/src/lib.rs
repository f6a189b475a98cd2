pub mod config;
pub mod error;
pub mod record;
pub mod result;

pub use config::ProbeConfig;
pub use error::ProbeError;
pub use record::{Recorder, StepOutcome, StepRecord};
pub use result::ProbeResult;
