//! # EMBER Core Types
//!
//! Fundamental type definitions used across the driver stack.
//!
//! These types provide:
//! - Strong typing for GPU addresses and the way they are split into words
//! - Identifiers for contexts, pagetables and timestamps
//! - Adreno generation detection

use core::fmt;

// =============================================================================
// GPU ADDRESS
// =============================================================================

/// GPU Virtual Address
///
/// This is an address in the GPU's virtual address space.
/// It is NOT a CPU pointer and cannot be dereferenced directly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct GpuAddr(u64);

impl GpuAddr {
    /// Create a new GPU address
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Create a null GPU address
    #[inline]
    pub const fn null() -> Self {
        Self(0)
    }

    /// Offset by bytes
    #[inline]
    pub const fn offset(self, bytes: u64) -> Self {
        Self(self.0.wrapping_add(bytes))
    }

    /// Low word, as it appears first in a command stream
    #[inline]
    pub const fn lower_32_bits(self) -> u32 {
        self.0 as u32
    }

    /// High word, emitted right after [`GpuAddr::lower_32_bits`]
    #[inline]
    pub const fn upper_32_bits(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for GpuAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuAddr(0x{:016x})", self.0)
    }
}

impl fmt::Display for GpuAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

// =============================================================================
// SIZE TYPES
// =============================================================================

/// Size in bytes
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ByteSize(u64);

impl ByteSize {
    /// 4 KiB
    pub const KIB_4: Self = Self(4 * 1024);

    /// Create from KiB
    #[inline]
    pub const fn from_kib(kib: u64) -> Self {
        Self(kib * 1024)
    }

    /// Get as bytes
    #[inline]
    pub const fn as_bytes(self) -> u64 {
        self.0
    }

    /// Number of 32-bit words that fit in this size
    #[inline]
    pub const fn as_words(self) -> usize {
        (self.0 / 4) as usize
    }
}

impl fmt::Debug for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1024 {
            write!(f, "{} KiB", self.0 / 1024)
        } else {
            write!(f, "{} B", self.0)
        }
    }
}

/// CPU page size used for transient command buffers
pub const PAGE_SIZE: ByteSize = ByteSize::KIB_4;

// =============================================================================
// HANDLE TYPES
// =============================================================================

/// Opaque handle to a driver object
///
/// Handles are type-safe wrappers that prevent mixing different object types.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Handle<T> {
    id: u64,
    _marker: core::marker::PhantomData<T>,
}

impl<T> Handle<T> {
    /// Create a new handle
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            _marker: core::marker::PhantomData,
        }
    }

    /// Get the raw ID
    #[inline]
    pub const fn id(self) -> u64 {
        self.id
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Handle<{}>(0x{:x})",
            core::any::type_name::<T>(),
            self.id
        )
    }
}

/// Marker for pagetable handle
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PagetableMarker;

/// Handle to a pagetable owned by the MMU layer
pub type PagetableHandle = Handle<PagetableMarker>;

// =============================================================================
// CONTEXT / TIMESTAMP IDENTIFIERS
// =============================================================================

/// Draw context identifier
///
/// Zero is reserved for the global context and is what gets recorded when
/// no context is attached to a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ContextId(u32);

impl ContextId {
    /// The global (kernel) context
    pub const GLOBAL: Self = Self(0);

    /// Create a context identifier
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Ring buffer timestamp returned by an internal submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Timestamp(pub u32);

// =============================================================================
// GPU GENERATION
// =============================================================================

/// Adreno GPU generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum GpuGeneration {
    /// Unknown/unsupported generation
    Unknown = 0,
    /// A5xx (Snapdragon 820 - 865 era)
    A5xx    = 5,
    /// A6xx (SMMU v2 table update packet)
    A6xx    = 6,
    /// A7xx
    A7xx    = 7,
}

impl GpuGeneration {
    /// Determine generation from the `CHIPID` register value
    ///
    /// The core revision lives in bits 31:24.
    pub const fn from_chip_id(chip_id: u32) -> Self {
        match chip_id >> 24 {
            5 => Self::A5xx,
            6 => Self::A6xx,
            7 => Self::A7xx,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpuaddr_halves() {
        let addr = GpuAddr::new(0x0000_0001_fc00_1000);
        assert_eq!(addr.lower_32_bits(), 0xfc00_1000);
        assert_eq!(addr.upper_32_bits(), 0x0000_0001);
        assert_eq!(addr.offset(0x20).lower_32_bits(), 0xfc00_1020);
    }

    #[test]
    fn test_page_words() {
        assert_eq!(PAGE_SIZE.as_words(), 1024);
    }

    #[test]
    fn test_generation_from_chip_id() {
        assert_eq!(GpuGeneration::from_chip_id(0x0603_0001), GpuGeneration::A6xx);
        assert_eq!(GpuGeneration::from_chip_id(0x0506_0000), GpuGeneration::A5xx);
        assert_eq!(GpuGeneration::from_chip_id(0x0300_0000), GpuGeneration::Unknown);
    }

    #[test]
    fn test_handle_identity() {
        let a = PagetableHandle::new(1);
        let b = PagetableHandle::new(2);
        assert_ne!(a, b);
        assert_eq!(a, PagetableHandle::new(1));
    }
}
