//! Per-instance controller state.

use alloc::sync::Arc;
use spin::Mutex;

use crate::clk::ClockOp;
use crate::osal::{DeviceNode, WakeLockOp};
use crate::phy::PhyOp;
use crate::quirk::Quirks;
use crate::regs::Mmio;
use crate::variant::PlatVariant;

/// Interrupt moderation default, nanoseconds. Firmware may override it
/// with `imod-interval-ns`.
pub const IMOD_INTERVAL_DEFAULT_NS: u32 = 40_000;

/// Records whether the remote-wake retention path was armed during the
/// last suspend. Armed at most once per suspend and consumed exactly once
/// by the matching resume; an unbalanced toggle would corrupt the PHY
/// retention state.
#[derive(Debug, Default)]
pub(crate) struct WakeEnableState {
    armed: bool,
}

impl WakeEnableState {
    pub(crate) fn arm(&mut self) {
        debug_assert!(!self.armed);
        self.armed = true;
    }

    /// Clears the state, reporting whether it was armed.
    pub(crate) fn take(&mut self) -> bool {
        core::mem::take(&mut self.armed)
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Everything one physical controller instance owns. Created at attach,
/// mutated only during attach and power transitions, emptied by teardown.
pub struct ControllerContext {
    pub(crate) node: DeviceNode,
    pub(crate) sysdev: DeviceNode,
    pub(crate) mmio: Option<Mmio>,
    pub(crate) irq: u32,
    pub(crate) reg_clk: Option<Arc<dyn ClockOp>>,
    pub(crate) bus_clk: Option<Arc<dyn ClockOp>>,
    pub(crate) quirks: Quirks,
    pub(crate) variant: PlatVariant,
    pub(crate) usb_phy: Option<Arc<dyn PhyOp>>,
    pub(crate) phy_usb2: Option<Arc<dyn PhyOp>>,
    pub(crate) phy_usb3: Option<Arc<dyn PhyOp>>,
    pub(crate) imod_interval_ns: u32,
    pub(crate) removing: Mutex<bool>,
    pub(crate) wake: WakeEnableState,
    pub(crate) main_wakelock: Option<Arc<dyn WakeLockOp>>,
    pub(crate) shared_wakelock: Option<Arc<dyn WakeLockOp>>,
}

impl core::fmt::Debug for ControllerContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerContext")
            .field("node", &self.node)
            .field("sysdev", &self.sysdev)
            .field("mmio", &self.mmio)
            .field("irq", &self.irq)
            .field("reg_clk", &self.reg_clk.as_ref().map(|_| "<dyn ClockOp>"))
            .field("bus_clk", &self.bus_clk.as_ref().map(|_| "<dyn ClockOp>"))
            .field("quirks", &self.quirks)
            .field("variant", &self.variant)
            .field("usb_phy", &self.usb_phy.as_ref().map(|_| "<dyn PhyOp>"))
            .field("phy_usb2", &self.phy_usb2.as_ref().map(|_| "<dyn PhyOp>"))
            .field("phy_usb3", &self.phy_usb3.as_ref().map(|_| "<dyn PhyOp>"))
            .field("imod_interval_ns", &self.imod_interval_ns)
            .field("removing", &self.removing)
            .field("wake", &self.wake)
            .field(
                "main_wakelock",
                &self.main_wakelock.as_ref().map(|_| "<dyn WakeLockOp>"),
            )
            .field(
                "shared_wakelock",
                &self.shared_wakelock.as_ref().map(|_| "<dyn WakeLockOp>"),
            )
            .finish()
    }
}

impl ControllerContext {
    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn variant(&self) -> PlatVariant {
        self.variant
    }

    pub fn imod_interval_ns(&self) -> u32 {
        self.imod_interval_ns
    }

    pub fn irq(&self) -> u32 {
        self.irq
    }

    pub fn sysdev(&self) -> DeviceNode {
        self.sysdev
    }

    pub fn node(&self) -> DeviceNode {
        self.node
    }

    pub fn is_removing(&self) -> bool {
        *self.removing.lock()
    }

    pub(crate) fn mmio(&self) -> Option<Mmio> {
        self.mmio
    }
}
