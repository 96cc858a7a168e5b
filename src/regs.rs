//! MMIO window and the port status register.

use core::ptr::NonNull;

use mbarrier::mb;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tock_registers::{LocalRegisterCopy, register_bitfields};

/// Offset of the first port status/control register inside the mapped
/// operational window.
pub const PORTSC_OFFSET: usize = 0x430;

/// A mapped register window shared by both logical controllers.
#[derive(Clone, Copy, Debug)]
pub struct Mmio {
    base: NonNull<u8>,
    len: usize,
}

unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}

impl Mmio {
    /// # Safety
    ///
    /// `base` must point to a register window of at least `len` bytes that
    /// stays mapped for the lifetime of the value.
    pub const unsafe fn new(base: NonNull<u8>, len: usize) -> Self {
        Self { base, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    pub fn read32(&self, offset: usize) -> u32 {
        assert!(offset + 4 <= self.len);
        unsafe { (self.base.as_ptr().add(offset) as *const u32).read_volatile() }
    }

    pub fn write32(&self, offset: usize, value: u32) {
        assert!(offset + 4 <= self.len);
        unsafe { (self.base.as_ptr().add(offset) as *mut u32).write_volatile(value) };
        mb();
    }

    /// Read-modify-write of one 32-bit register.
    pub fn update32(&self, offset: usize, f: impl FnOnce(u32) -> u32) -> u32 {
        let value = f(self.read32(offset));
        self.write32(offset, value);
        value
    }
}

// Port Status and Control Register. Only the fields the glue touches are
// spelled out.
register_bitfields![u32,
    pub PORTSC [
        /// Current connect status
        CCS OFFSET(0) NUMBITS(1) [],
        /// Port enabled/disabled
        PED OFFSET(1) NUMBITS(1) [],
        /// Port reset
        PR OFFSET(4) NUMBITS(1) [],
        /// Port link state
        PLS OFFSET(5) NUMBITS(4) [],
        /// Port power
        PP OFFSET(9) NUMBITS(1) [],
        /// Port speed
        SPEED OFFSET(10) NUMBITS(4) [],
        /// Link state write strobe
        LWS OFFSET(16) NUMBITS(1) [],
        /// Connect status change
        CSC OFFSET(17) NUMBITS(1) [],
    ]
];

pub type PortscValue = LocalRegisterCopy<u32, PORTSC::Register>;

/// PLS field encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum LinkState {
    U0 = 0,
    U1 = 1,
    U2 = 2,
    U3 = 3,
    Disabled = 4,
    RxDetect = 5,
    Inactive = 6,
    Polling = 7,
    Recovery = 8,
    HotReset = 9,
    Compliance = 10,
    TestMode = 11,
    Resume = 15,
}

/// Decode the link state of a raw PORTSC snapshot.
pub fn link_state(portsc: u32) -> Option<LinkState> {
    let value = PortscValue::new(portsc);
    LinkState::try_from(value.read(PORTSC::PLS) as u8).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portsc_field_layout() {
        // PLS occupies bits 5..=8, LWS bit 16.
        let mut value = PortscValue::new(0);
        value.modify(PORTSC::PLS.val(LinkState::Compliance as u32) + PORTSC::LWS::SET);
        assert_eq!(value.get(), (10 << 5) | (1 << 16));
    }

    #[test]
    fn link_state_decode() {
        assert_eq!(link_state(10 << 5), Some(LinkState::Compliance));
        assert_eq!(link_state(0), Some(LinkState::U0));
        assert_eq!(link_state(12 << 5), None);
    }

    #[test]
    fn mmio_volatile_roundtrip() {
        let mut backing = [0u32; 4];
        let mmio = unsafe {
            Mmio::new(
                core::ptr::NonNull::new(backing.as_mut_ptr() as *mut u8).unwrap(),
                16,
            )
        };
        mmio.write32(8, 0xdead_beef);
        assert_eq!(mmio.read32(8), 0xdead_beef);
        mmio.update32(8, |v| v & 0xffff_0000);
        assert_eq!(mmio.read32(8), 0xdead_0000);
    }
}
