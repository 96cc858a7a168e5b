//! Logical host-controller handles and the generic core contract.

use alloc::string::String;

use crate::err::Result;
use crate::quirk::Quirks;

/// The two logical controllers bound to one physical instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HcdRole {
    /// The USB2 "main" controller. Owns the shared core state, so it is
    /// registered first and unregistered last.
    Primary,
    /// The USB3 "shared" companion.
    Companion,
}

/// One logical host-controller instance. Primary and companion share the
/// register window and interrupt line of their [`crate::ControllerContext`]
/// and carry the same name.
#[derive(Debug)]
pub struct Hcd {
    role: HcdRole,
    name: String,
    pub(crate) skip_phy_init: bool,
    pub(crate) can_do_streams: bool,
    pub(crate) tpl_support: bool,
    pub(crate) registered: bool,
}

impl Hcd {
    pub(crate) fn new(role: HcdRole, name: &str) -> Self {
        Self {
            role,
            name: String::from(name),
            skip_phy_init: false,
            can_do_streams: false,
            tpl_support: false,
            registered: false,
        }
    }

    pub fn role(&self) -> HcdRole {
        self.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_do_streams(&self) -> bool {
        self.can_do_streams
    }

    /// Whether the generic framework should leave PHY bring-up to the
    /// glue instead of doing its own.
    pub fn skip_phy_init(&self) -> bool {
        self.skip_phy_init
    }

    pub fn tpl_support(&self) -> bool {
        self.tpl_support
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

/// Wake source handed to the core on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSource {
    None,
    Hibernation,
}

/// Contract of the generic xHCI core engine. Ring management, transfer
/// scheduling and event processing all live behind this trait; the glue
/// only configures and starts it.
pub trait CoreOp: Send + Sync + 'static {
    /// Generic reset/setup pass, run once per logical controller after the
    /// platform init quirk.
    fn gen_setup(&self, quirks: Quirks) -> Result;

    fn run(&self, role: HcdRole) -> Result;
    fn stop(&self, role: HcdRole);

    fn suspend(&self, allow_wake: bool) -> Result;
    fn resume(&self, wake: WakeSource) -> Result;

    /// Size of the largest supported primary stream array, as reported by
    /// the capability registers.
    fn max_primary_streams(&self) -> u8;
}
