//! # EMBER Command Sequencing
//!
//! Synthesis and submission of the command sequences that switch a ring
//! buffer to a new pagetable and record the new draw context.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     IommuSwitch::set_pt_ctx                       │
//! │                                                                   │
//! │  ┌──────────────────────────────┐    ┌────────────────────────┐   │
//! │  │  SwitchSequencer (PMODE)     │    │  Context record        │   │
//! │  │                              │    │                        │   │
//! │  │  set_apriv(raise)            │    │  identifier            │   │
//! │  │  prefetch_stall ─────────────┼──┐ │  memstore[rb] = id     │   │
//! │  │  PagetableSwitch (per gen)   │  │ │  memstore[global] = id │   │
//! │  │  invalidate_state            │  │ │  CACHE_INVALIDATE      │   │
//! │  │  set_apriv(lower)            │  │ └───────────┬────────────┘   │
//! │  └──────────────┬───────────────┘  │             │                │
//! │                 │          setstate NOP IB       │                │
//! │                 ▼                                ▼                │
//! │        ┌─────────────────────────────────────────────────┐       │
//! │        │   Ringbuffer::issue_internal_cmds  (FIFO/ring)  │       │
//! │        └─────────────────────────────────────────────────┘       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Switch Flow
//!
//! 1. Compare the requested pagetable with the one active on the ring buffer
//! 2. If they differ, build the privileged switch sequence in a one-page
//!    transient buffer and issue it in protected mode
//! 3. Always issue the context record as its own submission

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Switch sequences are built in heap buffers
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod barrier;
pub mod caps;
pub mod context;
pub mod memstore;
pub mod pagetable;
pub mod privilege;
pub mod sequence;
pub mod submit;
pub mod sync;

#[cfg(test)]
mod mock;

// Re-exports
pub use caps::{DeviceCaps, DeviceFeatures, MmuType};
pub use memstore::Memstore;
pub use pagetable::{A6xxSmmuV2, PagetableSwitch, pagetable_switch_for};
pub use sequence::SwitchSequencer;
pub use submit::{IommuSwitch, Submission, SwitchReport};
