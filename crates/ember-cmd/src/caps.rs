//! # Device Capabilities
//!
//! Immutable per-device configuration handed to every sequence generator.

use ember_core::{GpuAddr, GpuGeneration, PagetableHandle};

use crate::memstore::Memstore;

// =============================================================================
// FEATURES
// =============================================================================

bitflags::bitflags! {
    /// Device features that change the shape of switch sequences
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFeatures: u32 {
        /// CP raises privilege for SMMU_TABLE_UPDATE on its own
        const APRIV = 1 << 0;
        /// Performance counters are in use and must survive a switch
        const PERFCOUNTERS = 1 << 1;
    }
}

/// Kind of MMU attached to the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmuType {
    /// No MMU, GPU uses physical addresses
    None,
    /// SMMU with per-process pagetables
    Iommu,
}

// =============================================================================
// SETSTATE BUFFER
// =============================================================================

/// Byte offset of the NOP indirect buffer inside the setstate buffer
pub const SETSTATE_NOP_OFFSET: u64 = 1024;

// =============================================================================
// DEVICE CAPS
// =============================================================================

/// Device configuration read by switch sequence generators
///
/// Built once at device init and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DeviceCaps {
    /// Adreno generation, selects the pagetable switch generator
    pub generation: GpuGeneration,
    /// Feature bits
    pub features: DeviceFeatures,
    /// MMU type
    pub mmu: MmuType,
    /// SMMU context bank used by the user context
    pub user_cb_num: u32,
    /// GPU address of the IOMMU setstate buffer
    pub setstate: GpuAddr,
    /// Shared memstore
    pub memstore: Memstore,
    /// Pagetable in use while no draw context is active
    pub default_pagetable: PagetableHandle,
}

impl DeviceCaps {
    /// Check a feature bit
    #[inline]
    pub fn has_feature(&self, feature: DeviceFeatures) -> bool {
        self.features.contains(feature)
    }

    /// Check if an MMU is attached
    #[inline]
    pub fn has_mmu(&self) -> bool {
        self.mmu != MmuType::None
    }

    /// GPU address of the two-word NOP buffer used to stall prefetch
    #[inline]
    pub fn setstate_nop_addr(&self) -> GpuAddr {
        self.setstate.offset(SETSTATE_NOP_OFFSET)
    }
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            generation: GpuGeneration::A6xx,
            features: DeviceFeatures::empty(),
            mmu: MmuType::Iommu,
            user_cb_num: 0,
            setstate: GpuAddr::null(),
            memstore: Memstore::new(GpuAddr::null()),
            default_pagetable: PagetableHandle::new(0),
        }
    }
}
