//! System sleep and runtime power transitions.
//!
//! The platform power framework serializes these calls, so the wake
//! state needs no lock of its own: suspend and resume on one instance
//! never overlap.

use log::{debug, info};

use crate::err::{PlatError, Result};
use crate::hcd::WakeSource;
use crate::osal::PlatformOp;
use crate::XhciPlat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Active,
    Suspending,
    Suspended,
    Resuming,
}

impl<E: PlatformOp> XhciPlat<E> {
    /// System suspend. Wake capability follows the device's wake-enable
    /// setting; when the port is not in the OTG-connect-only state the
    /// PHY wake-retention path is armed so a remote wake can resume us.
    pub fn suspend(&mut self) -> Result {
        if self.power != PowerState::Active {
            return Err(PlatError::PowerState);
        }
        self.power = PowerState::Suspending;
        info!("xhci-plat: suspend {}", self.env.dev_name());

        let allow_wake = self.env.device_may_wakeup();
        if let Err(err) = self.core.suspend(allow_wake) {
            self.power = PowerState::Active;
            return Err(err);
        }

        if !self.env.otg_connect_only() {
            if let Some(phy) = &self.ctx.phy_usb2 {
                phy.arm_wake();
            }
            if let Some(phy) = &self.ctx.phy_usb3 {
                phy.arm_wake();
            }
            self.ctx.wake.arm();
        }

        self.power = PowerState::Suspended;
        Ok(())
    }

    /// System resume. Disarms the retention path in strict reverse order
    /// of arming (USB3 before USB2; the PHY firmware requires the pairing)
    /// and clears the wake state exactly once before restarting the core.
    pub fn resume(&mut self) -> Result {
        if self.power != PowerState::Suspended {
            return Err(PlatError::PowerState);
        }
        self.power = PowerState::Resuming;
        info!("xhci-plat: resume {}", self.env.dev_name());

        if let Err(err) = self.ctx.variant.resume_quirk(self.env.as_ref(), &self.ctx) {
            self.power = PowerState::Suspended;
            return Err(err);
        }

        if self.ctx.wake.take() {
            if let Some(phy) = &self.ctx.phy_usb3 {
                phy.disarm_wake();
            }
            if let Some(phy) = &self.ctx.phy_usb2 {
                phy.disarm_wake();
            }
        }

        match self.core.resume(WakeSource::None) {
            Ok(()) => {
                self.power = PowerState::Active;
                Ok(())
            }
            Err(err) => {
                self.power = PowerState::Suspended;
                Err(err)
            }
        }
    }

    /// Runtime suspend is deliberately a successful no-op for now; real
    /// runtime idling is deferred until the core grows the capability.
    pub fn runtime_suspend(&self) -> Result {
        debug!("xhci-plat: runtime suspend {}", self.env.dev_name());
        Ok(())
    }

    /// See [`Self::runtime_suspend`].
    pub fn runtime_resume(&self) -> Result {
        debug!("xhci-plat: runtime resume {}", self.env.dev_name());
        Ok(())
    }
}
