//! Platform environment boundary.
//!
//! Everything the glue needs from the host runtime (firmware node walk,
//! properties, resources, registration, power bookkeeping) goes through
//! [`PlatformOp`] so that platform ports implement one trait and tests can
//! supply a fake.

use core::time::Duration;

use alloc::{sync::Arc, vec::Vec};

use crate::clk::ClockOp;
use crate::err::Result;
use crate::hcd::HcdRole;
use crate::phy::PhyOp;
use crate::regs::Mmio;

/// Opaque handle to one device node in the platform's device hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceNode(pub usize);

/// How a node is described to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Not described by firmware, not on a recognized bus.
    Plain,
    /// Carries a device-tree or ACPI description.
    Firmware,
    /// Sits on a peripheral bus the DMA layer already knows (e.g. PCI).
    PeripheralBus,
}

/// Runtime power-framework bookkeeping events. The glue only sequences
/// them; the accounting itself lives behind the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimePmEvent {
    SetActive,
    Enable,
    GetNoresume,
    GetSync,
    PutNoidle,
    Forbid,
    Disable,
    SetSuspended,
}

/// One DRAM target window, as described by the interconnect. Consumed by
/// the Marvell init quirk.
#[derive(Debug, Clone, Copy)]
pub struct DramWindow {
    pub base: u64,
    pub size: u64,
    pub target: u8,
    pub attr: u8,
}

/// A wakeup source held while the controller must keep the system awake.
pub trait WakeLockOp: Send + Sync + 'static {
    fn stay_awake(&self);
    fn relax(&self);
    fn unregister(&self);
}

/// The platform environment the glue is instantiated on.
pub trait PlatformOp: Send + Sync + 'static {
    fn dev_name(&self) -> &str;

    /// Global kill switch for USB support.
    fn usb_disabled(&self) -> bool {
        false
    }

    // --- device hierarchy and firmware properties ---

    fn self_node(&self) -> DeviceNode;
    fn parent(&self, node: DeviceNode) -> Option<DeviceNode>;
    fn node_kind(&self, node: DeviceNode) -> NodeKind;

    /// Compatibility identifier of the device itself, if firmware-described.
    fn compatible(&self) -> Option<&str>;

    fn read_bool(&self, node: DeviceNode, prop: &str) -> bool;
    fn read_u32(&self, node: DeviceNode, prop: &str) -> Option<u32>;

    // --- resources ---

    fn irq(&self) -> Result<u32>;

    /// Map register resource `index`. Index 0 is the controller window;
    /// platform quirks may ask for further windows.
    fn map_registers(&self, index: usize) -> Result<Mmio>;
    fn unmap_registers(&self, mmio: Mmio);

    /// Configure DMA addressing capability of `node` to `bits` wide.
    fn set_dma_mask(&self, node: DeviceNode, bits: u32) -> Result;

    /// Look up a clock by consumer name (`None` is the unnamed bus clock).
    /// Absence is `Ok(None)`; only a broken description is an error.
    fn clock(&self, name: Option<&str>) -> Result<Option<Arc<dyn ClockOp>>>;

    /// PHY looked up by name on `node`. Absence is tolerated.
    fn phy_by_name(&self, node: DeviceNode, name: &str) -> Option<Arc<dyn PhyOp>>;

    /// PHY referenced through a firmware phandle property on `node`.
    /// May fail with [`crate::PlatError::ProbeDefer`] when the provider is
    /// not bound yet.
    fn phy_by_phandle(&self, node: DeviceNode, name: &str) -> Result<Option<Arc<dyn PhyOp>>>;

    fn request_firmware(&self, name: &str) -> Result<Vec<u8>>;

    fn dram_windows(&self) -> Vec<DramWindow> {
        Vec::new()
    }

    // --- wakeup and power bookkeeping ---

    fn wakeup_source(&self, name: &str) -> Arc<dyn WakeLockOp>;
    fn set_wakeup_capable(&self, capable: bool);
    fn device_may_wakeup(&self) -> bool;

    /// Whether the port is in the OTG-connect-only state, in which the
    /// remote-wake retention path must stay unarmed across suspend.
    fn otg_connect_only(&self) -> bool {
        false
    }

    fn runtime_pm(&self, event: RuntimePmEvent);
    fn enable_async_suspend(&self);

    // --- controller registration ---

    fn register_controller(&self, role: HcdRole, irq: u32, shared_irq: bool) -> Result;
    fn unregister_controller(&self, role: HcdRole);

    fn root_hub_present(&self, role: HcdRole) -> bool;

    /// Any downstream device still attached below the given root hub.
    fn downstream_connected(&self, role: HcdRole) -> bool;

    fn set_root_hub_wakeup(&self, role: HcdRole, enable: bool);

    fn delay(&self, duration: Duration);
}

/// Walk the ancestor chain until a node the system firmware (or a known
/// peripheral bus) can vouch for; that node owns DMA configuration and
/// firmware-property lookups. Falls back to the device itself.
pub fn resolve_sysdev<E: PlatformOp + ?Sized>(env: &E) -> DeviceNode {
    let mut node = env.self_node();
    loop {
        match env.node_kind(node) {
            NodeKind::Firmware | NodeKind::PeripheralBus => return node,
            NodeKind::Plain => {}
        }
        match env.parent(node) {
            Some(parent) => node = parent,
            None => return env.self_node(),
        }
    }
}
