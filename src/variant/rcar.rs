//! Renesas R-Car variant: the controller runs vendor firmware that must be
//! pushed through the download registers before the core is set up, and
//! again on resume because the SoC powers the block down in sleep.

use core::time::Duration;

use log::{debug, info};

use crate::context::ControllerContext;
use crate::err::{PlatError, Result};
use crate::osal::PlatformOp;

pub(crate) const FIRMWARE_V1: &str = "r8a779x_usb3_v1.dlmem";
pub(crate) const FIRMWARE_V3: &str = "r8a779x_usb3_v3.dlmem";

const USB3_INT_ENA: usize = 0x224;
const USB3_DL_CTRL: usize = 0x250;
const USB3_FW_DATA0: usize = 0x258;
const USB3_LCLK: usize = 0xa44;

const INT_ENA_VAL: u32 = 0x032f;
const DL_CTRL_ENABLE: u32 = 1 << 0;
const DL_CTRL_FW_SUCCESS: u32 = 1 << 4;
const DL_CTRL_FW_SET_DATA0: u32 = 1 << 8;
const LCLK_ENA_VAL: u32 = 0x0103_0001;

const FW_POLL_LIMIT: usize = 100;
const FW_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Push `name` into the controller. Skipped when a previous download
/// already reported success, so running once per logical controller is
/// harmless.
pub(crate) fn download_firmware<E: PlatformOp + ?Sized>(
    env: &E,
    ctx: &ControllerContext,
    name: &'static str,
) -> Result {
    let Some(mmio) = ctx.mmio() else {
        return Err(PlatError::BadResource);
    };

    if mmio.read32(USB3_DL_CTRL) & DL_CTRL_FW_SUCCESS != 0 {
        debug!("firmware {name} already downloaded");
        return Ok(());
    }

    let data = env.request_firmware(name)?;
    info!("downloading firmware {name} ({} bytes)", data.len());

    mmio.write32(USB3_INT_ENA, INT_ENA_VAL);

    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        mmio.write32(USB3_FW_DATA0, u32::from_le_bytes(word));
        mmio.update32(USB3_DL_CTRL, |v| v | DL_CTRL_FW_SET_DATA0);
    }

    mmio.update32(USB3_DL_CTRL, |v| v | DL_CTRL_ENABLE);

    for _ in 0..FW_POLL_LIMIT {
        if mmio.read32(USB3_DL_CTRL) & DL_CTRL_FW_SUCCESS != 0 {
            info!("firmware {name} accepted");
            return Ok(());
        }
        env.delay(FW_POLL_INTERVAL);
    }

    Err(PlatError::Firmware(name))
}

/// Ungate the link clock right before the core starts.
pub(crate) fn start(ctx: &ControllerContext) {
    if let Some(mmio) = ctx.mmio() {
        mmio.write32(USB3_LCLK, LCLK_ENA_VAL);
    }
}
