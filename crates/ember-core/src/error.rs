//! # EMBER Error Handling
//!
//! Error types shared by every EMBER crate.
//!
//! Errors are plain `Copy` values so they can cross the `no_std` boundary and
//! be returned from command synthesis without allocation.

use core::fmt;

// =============================================================================
// RESULT TYPE
// =============================================================================

/// EMBER Result type alias
pub type Result<T> = core::result::Result<T, Error>;

// =============================================================================
// ERROR ENUM
// =============================================================================

/// EMBER unified error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Invalid parameter provided
    InvalidParameter,
    /// Operation not supported on this hardware
    NotSupported,

    // =========================================================================
    // Hardware Errors
    // =========================================================================
    /// Invalid GPU generation/architecture
    InvalidGeneration,

    // =========================================================================
    // Memory Errors
    // =========================================================================
    /// Out of system memory
    OutOfMemory,

    // =========================================================================
    // Command Errors
    // =========================================================================
    /// A command sequence does not fit in its buffer
    SequenceTooLarge {
        /// Words the sequence needed at the point it overflowed
        needed: usize,
        /// Capacity of the buffer, in words
        capacity: usize,
    },
    /// Malformed PM4 packet
    InvalidCommand,
    /// Ring buffer rejected an internal submission
    Ringbuffer(RingbufferError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Generic
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::NotSupported => write!(f, "operation not supported"),

            // Hardware
            Self::InvalidGeneration => write!(f, "invalid GPU generation"),

            // Memory
            Self::OutOfMemory => write!(f, "out of memory"),

            // Command
            Self::SequenceTooLarge { needed, capacity } => write!(
                f,
                "command sequence too large: {} words needed, {} available",
                needed, capacity
            ),
            Self::InvalidCommand => write!(f, "invalid command"),
            Self::Ringbuffer(e) => write!(f, "ringbuffer error: {:?}", e),
        }
    }
}

// =============================================================================
// SUB-ERROR TYPES
// =============================================================================

/// Ring buffer submission error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingbufferError {
    /// Not enough space left in the ring for the commands
    Full,
    /// Ring buffer has been stopped (suspend, reset in progress)
    Stopped,
    /// Waiting for ring space timed out
    Timeout,
    /// Device hung while the commands were being queued
    DeviceHung,
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<RingbufferError> for Error {
    fn from(e: RingbufferError) -> Self {
        Error::Ringbuffer(e)
    }
}
