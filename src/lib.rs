//! Platform bus glue for a generic xHCI host-controller core.
//!
//! The glue locates the controller's resources through a platform
//! environment trait, brings up clocks and PHYs in dependency order,
//! instantiates the USB2 primary / USB3 companion controller pair over the
//! one physical register window, wires them to the generic core, and tears
//! everything down symmetrically. System sleep and runtime power
//! transitions coordinate the PHY wake-retention path along the way.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod attach;
pub mod clk;
mod context;
mod diag;
pub mod err;
pub mod hcd;
pub mod osal;
pub mod phy;
mod power;
pub mod quirk;
pub mod regs;
mod remove;
pub mod variant;

use alloc::sync::Arc;

pub use clk::ClockOp;
pub use context::{ControllerContext, IMOD_INTERVAL_DEFAULT_NS};
pub use err::{PlatError, Result};
pub use hcd::{CoreOp, Hcd, HcdRole, WakeSource};
pub use osal::{
    DeviceNode, DramWindow, NodeKind, PlatformOp, RuntimePmEvent, WakeLockOp, resolve_sysdev,
};
pub use phy::{PhyMode, PhyOp};
pub use power::PowerState;
pub use quirk::{AncestorScan, Quirks, scan_ancestors};
pub use regs::{LinkState, Mmio, PORTSC_OFFSET, link_state};
pub use variant::{ACPI_GENERIC_ID, PlatVariant};

/// One attached controller instance: the context plus the registered
/// primary/companion pair. Built by [`XhciPlat::attach`], torn down by
/// [`XhciPlat::remove`].
pub struct XhciPlat<E: PlatformOp> {
    pub(crate) env: Arc<E>,
    pub(crate) core: Arc<dyn CoreOp>,
    pub(crate) ctx: ControllerContext,
    pub(crate) primary: Hcd,
    pub(crate) companion: Hcd,
    pub(crate) power: PowerState,
}

impl<E: PlatformOp> core::fmt::Debug for XhciPlat<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XhciPlat")
            .field("env", &"<E: PlatformOp>")
            .field("core", &"<dyn CoreOp>")
            .field("ctx", &self.ctx)
            .field("primary", &self.primary)
            .field("companion", &self.companion)
            .field("power", &self.power)
            .finish()
    }
}

impl<E: PlatformOp> XhciPlat<E> {
    pub fn context(&self) -> &ControllerContext {
        &self.ctx
    }

    pub fn hcd(&self, role: HcdRole) -> &Hcd {
        match role {
            HcdRole::Primary => &self.primary,
            HcdRole::Companion => &self.companion,
        }
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }
}
