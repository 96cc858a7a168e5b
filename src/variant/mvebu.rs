//! Marvell EBU variants.

use log::debug;

use crate::context::ControllerContext;
use crate::err::{PlatError, Result};
use crate::osal::PlatformOp;
use crate::phy::PhyMode;

const MAX_WINDOWS: usize = 4;

const fn win_ctrl(window: usize) -> usize {
    window * 8
}

const fn win_base(window: usize) -> usize {
    4 + window * 8
}

/// Program the controller's MBus bridge windows from the DRAM layout.
/// The window registers live in a second register resource.
pub(crate) fn mbus_init_quirk<E: PlatformOp + ?Sized>(env: &E) -> Result {
    let wins = env.map_registers(1)?;
    let dram = env.dram_windows();

    for window in 0..MAX_WINDOWS {
        wins.write32(win_ctrl(window), 0);
        wins.write32(win_base(window), 0);
    }

    for (window, cs) in dram.iter().take(MAX_WINDOWS).enumerate() {
        let ctrl = ((cs.size - 1) as u32 & 0xffff_0000)
            | ((cs.attr as u32) << 8)
            | ((cs.target as u32) << 4)
            | 1;
        debug!("mbus window {window}: ctrl {ctrl:#010x} base {:#x}", cs.base);
        wins.write32(win_ctrl(window), ctrl);
        wins.write32(win_base(window), cs.base as u32 & 0xffff_0000);
    }

    env.unmap_registers(wins);
    Ok(())
}

/// Armada 3700: link training fails after power-on unless the USB3 PHY is
/// forced into host mode before the core reset.
pub(crate) fn a3700_plat_setup(ctx: &ControllerContext) -> Result {
    if let Some(phy) = &ctx.phy_usb3 {
        phy.set_mode(PhyMode::Host)
            .map_err(|_| PlatError::QuirkHook("usb3 phy host mode"))?;
    }
    Ok(())
}
