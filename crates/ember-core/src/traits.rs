//! # EMBER Core Traits
//!
//! Interfaces to the parts of the driver that command sequencing depends on
//! but does not own.
//!
//! ## Trait Hierarchy
//!
//! ```text
//! Device
//!    │
//!    ├── FaultMonitor      (recovery state)
//!    ├── SharedMemory      (setstate / memstore writes from the CPU)
//!    │
//!    ├── Ringbuffer        (one per CP queue)
//!    │      │
//!    │      └── issue_internal_cmds
//!    │
//!    └── MMU
//!           │
//!           └── Pagetable  (TTBR0 / CONTEXTIDR)
//! ```

use crate::error::Result;
use crate::types::*;

// =============================================================================
// PAGETABLE
// =============================================================================

/// A GPU pagetable as seen by the command processor
///
/// The MMU layer owns the descriptor; sequencing only reads the register
/// values derived from it.
pub trait Pagetable {
    /// Identity used to decide whether a switch is needed
    fn handle(&self) -> PagetableHandle;

    /// Translation table base register value
    fn ttbr0(&self) -> u64;

    /// Context identifier (ASID) programmed alongside TTBR0
    fn contextidr(&self) -> u32;
}

// =============================================================================
// RING BUFFER
// =============================================================================

bitflags::bitflags! {
    /// Flags attached to an internal ring buffer submission
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CmdFlags: u32 {
        /// Commands run in protected mode (privileged register access)
        const PMODE = 1 << 0;
    }
}

/// A ring buffer driving one command processor queue
///
/// Implementations are expected to keep submissions FIFO per ring buffer;
/// switch sequences rely on that ordering.
pub trait Ringbuffer {
    /// Ring buffer index (selects the per-ring memstore slot)
    fn id(&self) -> u32;

    /// Pagetable of the draw context currently active on this ring buffer
    ///
    /// `None` means no draw context is active and the device default
    /// pagetable is in use.
    fn active_pagetable(&self) -> Option<PagetableHandle>;

    /// GPU address of this ring buffer's pagetable info block
    fn pagetable_desc_addr(&self) -> GpuAddr;

    /// Copy `cmds` into the ring and kick the command processor
    fn issue_internal_cmds(&self, flags: CmdFlags, cmds: &[u32]) -> Result<Timestamp>;
}

// =============================================================================
// DEVICE STATE
// =============================================================================

/// Fault/recovery state of the device
pub trait FaultMonitor {
    /// True while a GPU fault is pending recovery
    fn in_fault(&self) -> bool;
}

/// CPU access to GPU-shared kernel buffers
pub trait SharedMemory {
    /// Write one word at `addr`
    fn write_u32(&self, addr: GpuAddr, value: u32) -> Result<()>;
}

// =============================================================================
// STATIC ASSERTIONS
// =============================================================================

static_assertions::assert_impl_all!(GpuAddr: Send, Sync, Copy);
static_assertions::assert_impl_all!(PagetableHandle: Send, Sync, Copy);
static_assertions::assert_impl_all!(ContextId: Send, Sync, Copy);
