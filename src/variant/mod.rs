//! Platform-specific behavior, keyed by firmware compatibility string.
//!
//! Each variant is a closed set of hooks invoked at fixed points of the
//! attach/resume sequence. The variant is copied by value into the
//! controller context, so the lookup table has no lifetime of its own.

mod mvebu;
mod rcar;

use crate::context::ControllerContext;
use crate::err::Result;
use crate::osal::PlatformOp;
use crate::quirk::Quirks;

/// The single identifier recognized on ACPI systems; it selects generic
/// behavior.
pub const ACPI_GENERIC_ID: &str = "PNP0D10";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatVariant {
    #[default]
    Generic,
    MvebuArmada,
    MvebuArmada3700,
    RcarGen2,
    RcarGen3,
}

impl PlatVariant {
    /// Map a firmware compatibility string to its variant. Unknown or
    /// missing strings get generic behavior.
    pub fn from_compatible(compatible: Option<&str>) -> Self {
        match compatible {
            Some("marvell,armada-375-xhci") | Some("marvell,armada-380-xhci") => {
                PlatVariant::MvebuArmada
            }
            Some("marvell,armada3700-xhci") => PlatVariant::MvebuArmada3700,
            Some("renesas,xhci-r8a7790")
            | Some("renesas,xhci-r8a7791")
            | Some("renesas,xhci-r8a7793")
            | Some("renesas,rcar-gen2-xhci") => PlatVariant::RcarGen2,
            Some("renesas,xhci-r8a7795")
            | Some("renesas,xhci-r8a7796")
            | Some("renesas,rcar-gen3-xhci") => PlatVariant::RcarGen3,
            _ => PlatVariant::Generic,
        }
    }

    pub fn from_acpi_id(id: &str) -> Option<Self> {
        (id == ACPI_GENERIC_ID).then_some(PlatVariant::Generic)
    }

    /// Quirk bits the variant contributes on top of the firmware
    /// properties.
    pub(crate) fn quirks(self) -> Quirks {
        match self {
            PlatVariant::MvebuArmada3700 => Quirks::RESET_ON_RESUME,
            _ => Quirks::empty(),
        }
    }

    pub fn firmware_name(self) -> Option<&'static str> {
        match self {
            PlatVariant::RcarGen2 => Some(rcar::FIRMWARE_V1),
            PlatVariant::RcarGen3 => Some(rcar::FIRMWARE_V3),
            _ => None,
        }
    }

    /// Early platform setup, before the core is touched.
    pub(crate) fn plat_setup<E: PlatformOp + ?Sized>(
        self,
        _env: &E,
        ctx: &ControllerContext,
    ) -> Result {
        match self {
            PlatVariant::MvebuArmada3700 => mvebu::a3700_plat_setup(ctx),
            _ => Ok(()),
        }
    }

    /// Per-controller init quirk, run before the generic setup pass.
    pub(crate) fn init_quirk<E: PlatformOp + ?Sized>(
        self,
        env: &E,
        ctx: &ControllerContext,
    ) -> Result {
        match self {
            PlatVariant::MvebuArmada => mvebu::mbus_init_quirk(env),
            PlatVariant::RcarGen2 => rcar::download_firmware(env, ctx, rcar::FIRMWARE_V1),
            PlatVariant::RcarGen3 => rcar::download_firmware(env, ctx, rcar::FIRMWARE_V3),
            _ => Ok(()),
        }
    }

    /// Last platform word before the core starts running.
    pub(crate) fn plat_start(self, ctx: &ControllerContext) {
        match self {
            PlatVariant::RcarGen2 | PlatVariant::RcarGen3 => rcar::start(ctx),
            _ => {}
        }
    }

    /// Resume-side quirk; a failure aborts the resume.
    pub(crate) fn resume_quirk<E: PlatformOp + ?Sized>(
        self,
        env: &E,
        ctx: &ControllerContext,
    ) -> Result {
        match self {
            PlatVariant::RcarGen2 => rcar::download_firmware(env, ctx, rcar::FIRMWARE_V1),
            PlatVariant::RcarGen3 => rcar::download_firmware(env, ctx, rcar::FIRMWARE_V3),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatible_match_table() {
        assert_eq!(
            PlatVariant::from_compatible(Some("generic-xhci")),
            PlatVariant::Generic
        );
        assert_eq!(
            PlatVariant::from_compatible(Some("xhci-platform")),
            PlatVariant::Generic
        );
        assert_eq!(
            PlatVariant::from_compatible(Some("marvell,armada-380-xhci")),
            PlatVariant::MvebuArmada
        );
        assert_eq!(
            PlatVariant::from_compatible(Some("marvell,armada3700-xhci")),
            PlatVariant::MvebuArmada3700
        );
        assert_eq!(
            PlatVariant::from_compatible(Some("renesas,xhci-r8a7791")),
            PlatVariant::RcarGen2
        );
        assert_eq!(
            PlatVariant::from_compatible(Some("renesas,rcar-gen3-xhci")),
            PlatVariant::RcarGen3
        );
        assert_eq!(PlatVariant::from_compatible(None), PlatVariant::Generic);
    }

    #[test]
    fn acpi_match() {
        assert_eq!(
            PlatVariant::from_acpi_id(ACPI_GENERIC_ID),
            Some(PlatVariant::Generic)
        );
        assert_eq!(PlatVariant::from_acpi_id("PNP0000"), None);
    }

    #[test]
    fn firmware_names() {
        assert!(PlatVariant::Generic.firmware_name().is_none());
        assert_eq!(
            PlatVariant::RcarGen2.firmware_name(),
            Some("r8a779x_usb3_v1.dlmem")
        );
        assert_eq!(
            PlatVariant::RcarGen3.firmware_name(),
            Some("r8a779x_usb3_v3.dlmem")
        );
    }
}
