//! Error taxonomy for the platform glue.
//!
//! Configuration problems (missing resources, unusable DMA mask) and quirk
//! hook failures are fatal and abort the attach. A deferred dependency is
//! the only retryable case; callers check it with [`PlatError::is_retryable`]
//! and re-run the attach later.

pub type Result<T = ()> = core::result::Result<T, PlatError>;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatError {
    #[error("usb support is disabled")]
    Disabled,
    #[error("no interrupt resource")]
    NoIrq,
    #[error("invalid register resource")]
    BadResource,
    #[error("dma mask not supported")]
    DmaMask,
    #[error("clock enable failed")]
    ClockEnable,
    #[error("dependency not ready")]
    ProbeDefer,
    #[error("quirk hook failed: {0}")]
    QuirkHook(&'static str),
    #[error("firmware load failed: {0}")]
    Firmware(&'static str),
    #[error("operation timed out")]
    Timeout,
    #[error("invalid parameter")]
    InvalidParam,
    #[error("invalid power state transition")]
    PowerState,
    #[error("no memory available")]
    NoMemory,
}

impl PlatError {
    /// A retryable failure: the dependency may show up later, so the caller
    /// should fully release and try the attach again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlatError::ProbeDefer)
    }
}
