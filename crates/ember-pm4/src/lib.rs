//! # EMBER PM4
//!
//! Command word encoding for the Adreno command processor (CP).
//!
//! ## Packet Formats
//!
//! ```text
//!  type-4 (register write)
//!  ┌────┬────┬────┬─────────────────┬────┬─────────┐
//!  │0100│ P  │ 0  │ register (17:0) │ P  │ count   │
//!  └────┴────┴────┴─────────────────┴────┴─────────┘
//!   31   27   26        25:8          7     6:0
//!
//!  type-7 (opcode packet)
//!  ┌────┬────┬────┬──────────┬────┬───────────────┐
//!  │0111│0000│ P  │ opcode   │ P  │ count         │
//!  └────┴────┴────┴──────────┴────┴───────────────┘
//!   31        23     22:16     15      14:0
//! ```
//!
//! `P` are odd-parity bits over the neighbouring field. The CP rejects
//! headers with a bad parity bit, so every header is produced by the
//! helpers in [`packet`].
//!
//! Words are appended to a [`CommandStream`], a bounded view over caller
//! provided storage that refuses any write that would not fit.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

pub mod decode;
pub mod opcodes;
pub mod packet;
pub mod registers;
pub mod stream;

// Re-exports
pub use decode::{Packet, PacketIter, decode};
pub use opcodes::Opcode;
pub use packet::{GPUADDR_WORDS, mem_packet_header, packet_header, register_write};
pub use stream::CommandStream;
