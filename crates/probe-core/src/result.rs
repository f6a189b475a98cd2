use crate::error::ProbeError;

pub type ProbeResult<T> = Result<T, ProbeError>;
