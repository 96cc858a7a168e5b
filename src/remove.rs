//! Teardown sequencer.
//!
//! Runs once, releases everything the attach acquired in strict reverse
//! order, and waits (bounded) for downstream devices to quiesce before
//! pulling the controllers out from under them.

use core::time::Duration;

use log::{info, warn};

use crate::hcd::HcdRole;
use crate::osal::{PlatformOp, RuntimePmEvent};
use crate::XhciPlat;

const DISCONNECT_POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Generous upper bound on the disconnect wait, in poll intervals
/// (about ten seconds). Exceeding it is logged, never fatal.
const DISCONNECT_POLL_BOUND: usize = 500;

impl<E: PlatformOp> XhciPlat<E> {
    /// Detach both controllers and release every resource. Safe against
    /// re-entry: only the first call does any work.
    pub fn remove(&mut self) {
        {
            let mut removing = self.ctx.removing.lock();
            if *removing {
                warn!("xhci-plat: remove re-entered");
                return;
            }
            *removing = true;
            // The guard drops here; the disconnect wait below must not
            // sleep holding the lock.
        }

        info!("xhci-plat: remove {}", self.env.dev_name());
        self.env.runtime_pm(RuntimePmEvent::GetSync);

        info!("wake unlock");
        if let Some(lock) = self.ctx.main_wakelock.take() {
            lock.relax();
            lock.unregister();
        }
        if let Some(lock) = self.ctx.shared_wakelock.take() {
            lock.relax();
            lock.unregister();
        }

        if self.env.root_hub_present(HcdRole::Primary)
            && self.env.root_hub_present(HcdRole::Companion)
        {
            self.wait_for_disconnect();
        }

        self.env.unregister_controller(HcdRole::Companion);
        self.core.stop(HcdRole::Companion);
        self.companion.registered = false;

        if let Some(phy) = self.ctx.usb_phy.take() {
            phy.shutdown();
        }

        // The parent device owns the lifetime of these PHYs; dropping the
        // handles without a shutdown avoids releasing them twice.
        self.ctx.phy_usb2 = None;
        self.ctx.phy_usb3 = None;

        self.env.unregister_controller(HcdRole::Primary);
        self.core.stop(HcdRole::Primary);
        self.primary.registered = false;

        if let Some(mmio) = self.ctx.mmio.take() {
            self.env.unmap_registers(mmio);
        }

        if let Some(clk) = self.ctx.bus_clk.take() {
            clk.disable();
        }
        if let Some(clk) = self.ctx.reg_clk.take() {
            clk.disable();
        }

        self.env.runtime_pm(RuntimePmEvent::Disable);
        self.env.runtime_pm(RuntimePmEvent::PutNoidle);
        self.env.runtime_pm(RuntimePmEvent::SetSuspended);
    }

    /// Poll both port trees until no downstream device remains, up to the
    /// bound. Hot-plug can still race us, so the bound exhausting is only
    /// logged and teardown proceeds.
    fn wait_for_disconnect(&self) {
        for _ in 0..DISCONNECT_POLL_BOUND {
            let busy = self.env.downstream_connected(HcdRole::Primary)
                || self.env.downstream_connected(HcdRole::Companion);
            if !busy {
                info!("device disconnect all done");
                return;
            }
            info!("waiting for hub disconnect");
            self.env.delay(DISCONNECT_POLL_INTERVAL);
        }
        warn!("timed out waiting for downstream disconnect");
    }
}
