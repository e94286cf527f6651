//! # EMBER Core
//!
//! Foundational types and collaborator traits for the EMBER Adreno driver.
//!
//! Everything the command sequencing layer consumes from the rest of the
//! driver (pagetables, ring buffers, fault tracking, shared memory) is
//! described here as a narrow trait, so that sequence synthesis never reaches
//! into global device state.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ember-core                             │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Traits    │  │   Types     │  │     Error           │  │
//! │  │ (Pagetable, │  │ (GpuAddr,   │  │   Handling          │  │
//! │  │ Ringbuffer) │  │  ContextId) │  │                     │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod error;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use error::{Error, Result, RingbufferError};
pub use traits::*;
pub use types::*;
