//! Quirk bitmask and the ancestor property scan.

use bitflags::bitflags;
use log::debug;

use crate::osal::{DeviceNode, PlatformOp};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Quirks: u32 {
        /// Instantiated through the platform bus; the core must not try to
        /// derive a PCI function from the device.
        const PLAT = 1 << 0;
        const HW_LPM_DISABLE = 1 << 1;
        const LPM_SUPPORT = 1 << 2;
        const BROKEN_PORT_PED = 1 << 3;
        const L2_SUPPORT = 1 << 4;
        const SKIP_PHY_INIT = 1 << 5;
        const RESET_ON_RESUME = 1 << 6;
    }
}

/// Result of walking the device's ancestor chain for quirk properties.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AncestorScan {
    pub quirks: Quirks,
    pub imod_interval_ns: Option<u32>,
}

/// Collect boolean quirk properties and the interrupt-moderation override
/// from the device and every ancestor. Booleans accumulate: affirmed
/// anywhere in the chain wins. The numeric override is overwritten as
/// found, so an outer definition replaces an inner one.
pub fn scan_ancestors<E: PlatformOp + ?Sized>(env: &E) -> AncestorScan {
    let mut scan = AncestorScan::default();

    let mut node: Option<DeviceNode> = Some(env.self_node());
    while let Some(cur) = node {
        if env.read_bool(cur, "usb2-lpm-disable") {
            scan.quirks |= Quirks::HW_LPM_DISABLE;
        }
        if env.read_bool(cur, "usb3-lpm-capable") {
            scan.quirks |= Quirks::LPM_SUPPORT;
        }
        if env.read_bool(cur, "quirk-broken-port-ped") {
            scan.quirks |= Quirks::BROKEN_PORT_PED;
        }
        if let Some(value) = env.read_u32(cur, "imod-interval-ns") {
            debug!("imod-interval-ns = {} at node {:?}", value, cur);
            scan.imod_interval_ns = Some(value);
        }
        node = env.parent(cur);
    }

    scan
}
