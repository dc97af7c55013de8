//! Errors of the intersection.

use crate::direction::Direction;
use keos::KernelError;

/// Enum representing errors reported by the intersection.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TrafficError {
    /// A U-turn was requested from the given road. (EINVAL)
    IllegalMovement(Direction),
    /// The kernel could not provide a thread or another resource. (ENOMEM)
    ResourceExhaustion,
    /// The intersection was used against its protocol, e.g. `after_exit`
    /// without a matching `before_entry`. (EPERM)
    MisuseViolation(&'static str),
}

impl TrafficError {
    /// Report a protocol violation.
    ///
    /// The violation is logged. Debug builds treat it as a bug and panic;
    /// release builds hand it back to the caller.
    #[track_caller]
    pub(crate) fn misuse<T>(what: &'static str) -> Result<T, TrafficError> {
        keos::warning!("intersection: {what}");
        if cfg!(debug_assertions) {
            panic!("misuse of the intersection: {what}");
        }
        Err(TrafficError::MisuseViolation(what))
    }
}

impl From<TrafficError> for KernelError {
    fn from(e: TrafficError) -> Self {
        match e {
            TrafficError::IllegalMovement(_) => KernelError::InvalidArgument,
            TrafficError::ResourceExhaustion => KernelError::NoMemory,
            TrafficError::MisuseViolation(_) => KernelError::OperationNotPermitted,
        }
    }
}

impl From<KernelError> for TrafficError {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::NoMemory => TrafficError::ResourceExhaustion,
            KernelError::OperationNotPermitted => {
                TrafficError::MisuseViolation("operation not permitted")
            }
            KernelError::NoSuchEntry => TrafficError::MisuseViolation("no such entry"),
            KernelError::InvalidArgument => TrafficError::MisuseViolation("invalid argument"),
        }
    }
}
