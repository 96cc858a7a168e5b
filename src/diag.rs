//! SuperSpeed compliance diagnostic attribute.
//!
//! Exposes the raw PORTSC snapshot at the fixed diagnostic offset and a
//! write path that forces the port into compliance mode for electrical
//! testing. Only the literal value "1" does anything.

use log::info;

use crate::err::{PlatError, Result};
use crate::osal::PlatformOp;
use crate::regs::{LinkState, PORTSC, PORTSC_OFFSET, PortscValue};
use crate::XhciPlat;

impl<E: PlatformOp> XhciPlat<E> {
    /// Raw snapshot of the diagnostic port status register.
    pub fn ss_compliance(&self) -> Result<u32> {
        let mmio = self.ctx.mmio().ok_or(PlatError::BadResource)?;
        Ok(mmio.read32(PORTSC_OFFSET))
    }

    /// Accepts the literal "1": latches PLS to the compliance encoding
    /// with the link write strobe set. Non-numeric input is rejected;
    /// other numbers are ignored, leaving the register untouched.
    pub fn set_ss_compliance(&self, input: &str) -> Result {
        let value: i32 = input.trim().parse().map_err(|_| PlatError::InvalidParam)?;
        if value != 1 {
            info!("only 1 is allowed for input value");
            return Ok(());
        }

        let mmio = self.ctx.mmio().ok_or(PlatError::BadResource)?;
        let mut portsc = PortscValue::new(mmio.read32(PORTSC_OFFSET));
        portsc.modify(PORTSC::PLS.val(LinkState::Compliance as u32) + PORTSC::LWS::SET);
        mmio.write32(PORTSC_OFFSET, portsc.get());

        info!("ss host compliance enabled portsc {:#x}", portsc.get());
        Ok(())
    }
}
