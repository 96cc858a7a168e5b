//! Attach sequence: resource resolution, dependency acquisition and
//! bring-up of the controller pair.
//!
//! Every acquisition pushes its release onto an unwind stack; an error
//! anywhere pops the stack in reverse, so a failed attach leaves nothing
//! mounted and a deferred dependency can retry from a clean slate.

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use log::{debug, info, warn};
use spin::Mutex;

use crate::context::{ControllerContext, IMOD_INTERVAL_DEFAULT_NS, WakeEnableState};
use crate::err::{PlatError, Result};
use crate::hcd::{CoreOp, Hcd, HcdRole};
use crate::osal::{PlatformOp, RuntimePmEvent, resolve_sysdev};
use crate::phy::PhyMode;
use crate::power::PowerState;
use crate::quirk::{Quirks, scan_ancestors};
use crate::variant::PlatVariant;
use crate::XhciPlat;

/// Reverse-order release stack. Dropping it runs the recorded release
/// actions last-acquired-first; `defuse` commits the acquisitions to the
/// caller instead.
struct Unwind {
    steps: Vec<Box<dyn FnOnce()>>,
}

impl Unwind {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn push(&mut self, release: impl FnOnce() + 'static) {
        self.steps.push(Box::new(release));
    }

    fn defuse(mut self) {
        self.steps.clear();
    }
}

impl Drop for Unwind {
    fn drop(&mut self) {
        while let Some(release) = self.steps.pop() {
            release();
        }
    }
}

impl<E: PlatformOp> XhciPlat<E> {
    /// Probe the platform device and bring both logical controllers up.
    ///
    /// Fatal configuration errors abort with everything released; a
    /// [`PlatError::ProbeDefer`] asks the caller to retry once the missing
    /// dependency is bound.
    pub fn attach(env: Arc<E>, core: Arc<dyn CoreOp>) -> Result<Self> {
        info!("xhci-plat: attach {}", env.dev_name());

        if env.usb_disabled() {
            return Err(PlatError::Disabled);
        }

        let mut unwind = Unwind::new();

        // Wake locks are held from here until remove so the system cannot
        // sleep away under a half-attached controller.
        let main_wakelock = env.wakeup_source(env.dev_name());
        main_wakelock.stay_awake();
        {
            let lock = main_wakelock.clone();
            unwind.push(move || {
                lock.relax();
                lock.unregister();
            });
        }
        let shared_wakelock = env.wakeup_source(env.dev_name());
        shared_wakelock.stay_awake();
        {
            let lock = shared_wakelock.clone();
            unwind.push(move || {
                lock.relax();
                lock.unregister();
            });
        }

        let irq = env.irq()?;

        // The DMA mask must be in place before the first register access;
        // some platforms silently corrupt transfers otherwise.
        let sysdev = resolve_sysdev(env.as_ref());
        env.set_dma_mask(sysdev, 64)
            .or_else(|_| env.set_dma_mask(sysdev, 32))
            .map_err(|_| PlatError::DmaMask)?;

        env.runtime_pm(RuntimePmEvent::SetActive);
        env.runtime_pm(RuntimePmEvent::Enable);
        env.runtime_pm(RuntimePmEvent::GetNoresume);
        {
            let env = env.clone();
            unwind.push(move || {
                env.runtime_pm(RuntimePmEvent::PutNoidle);
                env.runtime_pm(RuntimePmEvent::Disable);
            });
        }

        let mut primary = Hcd::new(HcdRole::Primary, env.dev_name());
        primary.skip_phy_init = true;

        let mmio = env.map_registers(0)?;
        {
            let env = env.clone();
            unwind.push(move || env.unmap_registers(mmio));
        }

        // Not all platforms have clocks, so absence is not an error.
        let reg_clk = env.clock(Some("reg"))?;
        if let Some(clk) = &reg_clk {
            clk.enable().map_err(|_| PlatError::ClockEnable)?;
            let clk = clk.clone();
            unwind.push(move || clk.disable());
        }
        let bus_clk = env.clock(None)?;
        if let Some(clk) = &bus_clk {
            clk.enable().map_err(|_| PlatError::ClockEnable)?;
            let clk = clk.clone();
            unwind.push(move || clk.disable());
        }

        // Copied by value; the descriptor source may go away afterwards.
        let variant = PlatVariant::from_compatible(env.compatible());

        env.set_wakeup_capable(true);

        let mut companion = Hcd::new(HcdRole::Companion, env.dev_name());
        companion.skip_phy_init = true;

        let scan = scan_ancestors(env.as_ref());
        let mut quirks = scan.quirks | Quirks::PLAT | variant.quirks();
        let imod_interval_ns = scan.imod_interval_ns.unwrap_or(IMOD_INTERVAL_DEFAULT_NS);

        // The generic PHY is optional, but a provider that exists and is
        // not bound yet must surface as a retryable failure.
        let usb_phy = match env.phy_by_phandle(sysdev, "usb-phy") {
            Err(err) if err.is_retryable() => return Err(err),
            Err(_) | Ok(None) => None,
            Ok(Some(phy)) => {
                phy.init()?;
                let shutdown = phy.clone();
                unwind.push(move || shutdown.shutdown());
                Some(phy)
            }
        };

        let parent = env.parent(env.self_node());

        let phy_usb2 = parent.and_then(|p| env.phy_by_name(p, "usb2-phy"));
        if phy_usb2.is_none() {
            warn!("{}: failed to get usb2 phy", env.dev_name());
        }
        let phy_usb3 = parent.and_then(|p| env.phy_by_name(p, "usb3-phy"));
        if phy_usb3.is_none() {
            warn!("{}: failed to get usb3 phy", env.dev_name());
        }

        // Failure to read is the same as the property being absent.
        match parent.and_then(|p| env.read_u32(p, "xhci_l2_support")) {
            Some(1) => quirks |= Quirks::L2_SUPPORT,
            value => debug!("{}: no l2 support ({value:?})", env.dev_name()),
        }

        let tpl_support = env.read_bool(sysdev, "tpl-support");
        primary.tpl_support = tpl_support;
        companion.tpl_support = tpl_support;

        let ctx = ControllerContext {
            node: env.self_node(),
            sysdev,
            mmio: Some(mmio),
            irq,
            reg_clk,
            bus_clk,
            quirks,
            variant,
            usb_phy,
            phy_usb2,
            phy_usb3,
            imod_interval_ns,
            removing: Mutex::new(false),
            wake: WakeEnableState::default(),
            main_wakelock: Some(main_wakelock),
            shared_wakelock: Some(shared_wakelock),
        };

        variant.plat_setup(env.as_ref(), &ctx)?;

        if ctx.quirks.contains(Quirks::SKIP_PHY_INIT) {
            primary.skip_phy_init = true;
            companion.skip_phy_init = true;
        }

        register_hcd(env.as_ref(), core.as_ref(), &ctx, &mut primary)?;
        {
            let env = env.clone();
            let core = core.clone();
            unwind.push(move || {
                env.unregister_controller(HcdRole::Primary);
                core.stop(HcdRole::Primary);
            });
        }

        if core.max_primary_streams() >= 4 {
            companion.can_do_streams = true;
        }

        register_hcd(env.as_ref(), core.as_ref(), &ctx, &mut companion)?;

        env.enable_async_suspend();
        env.runtime_pm(RuntimePmEvent::PutNoidle);

        env.set_root_hub_wakeup(HcdRole::Primary, true);
        env.set_root_hub_wakeup(HcdRole::Companion, true);

        // Runtime pm stays off until a user opts in.
        env.runtime_pm(RuntimePmEvent::Forbid);

        unwind.defuse();
        info!("xhci-plat: {} attached, irq {}", env.dev_name(), irq);

        Ok(Self {
            env,
            core,
            ctx,
            primary,
            companion,
            power: PowerState::Active,
        })
    }
}

/// Bring one logical controller up and make it visible: init quirk,
/// generic setup, role-specific PHY retuning, platform start hook, core
/// start, registration. A registration failure stops the core again so
/// the caller sees an all-or-nothing result.
fn register_hcd<E: PlatformOp + ?Sized>(
    env: &E,
    core: &dyn CoreOp,
    ctx: &ControllerContext,
    hcd: &mut Hcd,
) -> Result {
    ctx.variant.init_quirk(env, ctx)?;
    core.gen_setup(ctx.quirks)?;

    // The core reset wipes the PHY CR port settings, so tuning is redone
    // here. Which PHY belongs to which role is fixed by the calibration
    // interface: the primary owns the USB2 pairing, the companion the
    // USB3 one.
    match hcd.role() {
        HcdRole::Primary => {
            if let Some(phy) = &ctx.phy_usb2 {
                phy.tune(PhyMode::Host);
            }
        }
        HcdRole::Companion => {
            if let Some(phy) = &ctx.phy_usb3 {
                phy.tune(PhyMode::Host);
            }
        }
    }

    ctx.variant.plat_start(ctx);
    core.run(hcd.role())?;

    if let Err(err) = env.register_controller(hcd.role(), ctx.irq, true) {
        core.stop(hcd.role());
        return Err(err);
    }
    hcd.registered = true;
    debug!("registered {:?} hcd", hcd.role());
    Ok(())
}
