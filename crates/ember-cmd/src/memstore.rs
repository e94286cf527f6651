//! # Memstore
//!
//! Layout of the shared memstore: one slot per draw context, followed by one
//! slot per ring buffer. Slot 0 is the global slot.

use core::mem::{offset_of, size_of};

use ember_core::{ByteSize, Error, GpuAddr, Result};

// =============================================================================
// SLOT LAYOUT
// =============================================================================

/// One memstore slot as seen by the CP
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct DevMemstore {
    /// Start-of-pipeline timestamp
    pub soptimestamp: u32,
    /// Reserved
    pub sbz: u32,
    /// End-of-pipeline timestamp
    pub eoptimestamp: u32,
    /// Reserved
    pub sbz2: u32,
    /// Set while the ring buffer is preempted
    pub preempted: u32,
    /// Reserved
    pub sbz3: u32,
    /// Timestamp a waiter asked to be woken at
    pub ref_wait_ts: u32,
    /// Reserved
    pub sbz4: u32,
    /// Draw context currently executing
    pub current_context: u32,
    /// Reserved
    pub sbz5: u32,
}

static_assertions::const_assert_eq!(size_of::<DevMemstore>(), 40);

/// Total memstore size
pub const MEMSTORE_SIZE: ByteSize = ByteSize::from_kib(32);

/// Ring buffer priority levels, each with its own slot
pub const PRIORITY_MAX_RB_LEVELS: u32 = 4;

/// Global slot
pub const MEMSTORE_GLOBAL: u32 = 0;

/// Last slot available to draw contexts; ring buffer slots follow it
pub const MEMSTORE_MAX: u32 = MEMSTORE_SLOTS - 1 - PRIORITY_MAX_RB_LEVELS;

const MEMSTORE_SLOTS: u32 = (MEMSTORE_SIZE.as_bytes() / size_of::<DevMemstore>() as u64) as u32;

// =============================================================================
// MEMSTORE
// =============================================================================

/// GPU view of the memstore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memstore {
    base: GpuAddr,
}

impl Memstore {
    /// Memstore mapped at `base`
    pub const fn new(base: GpuAddr) -> Self {
        Self { base }
    }

    fn current_context(&self, slot: u32) -> GpuAddr {
        self.base.offset(
            slot as u64 * size_of::<DevMemstore>() as u64
                + offset_of!(DevMemstore, current_context) as u64,
        )
    }

    /// `current_context` of the global slot
    pub fn global_current_context(&self) -> GpuAddr {
        self.current_context(MEMSTORE_GLOBAL)
    }

    /// `current_context` of ring buffer `rb_id`'s slot
    pub fn rb_current_context(&self, rb_id: u32) -> Result<GpuAddr> {
        if rb_id >= PRIORITY_MAX_RB_LEVELS {
            return Err(Error::InvalidParameter);
        }
        Ok(self.current_context(MEMSTORE_MAX + rb_id))
    }
}
