//! Clock handle contract.

use crate::err::Result;

/// One gated clock. Handles are reference counted by the provider; the
/// glue only balances enable/disable.
pub trait ClockOp: Send + Sync + 'static {
    fn enable(&self) -> Result;
    fn disable(&self);
}
