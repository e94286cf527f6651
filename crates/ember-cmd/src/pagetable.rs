//! # Pagetable Switch
//!
//! Generation specific part of the switch sequence: program the new
//! TTBR0/CONTEXTIDR into the SMMU context bank from the CP and leave a shadow
//! copy in the ring buffer's pagetable info block.

use core::fmt;
use core::mem::offset_of;

use ember_core::{Error, GpuGeneration, Result, Ringbuffer};
use ember_pm4::opcodes::WAIT_REG_MEM_EQ_REGISTER;
use ember_pm4::packet::GPUADDR_WORDS;
use ember_pm4::registers::{A6XX_RBBM_PERFCTR_SRAM_INIT_CMD, A6XX_RBBM_PERFCTR_SRAM_INIT_STATUS};
use ember_pm4::{CommandStream, Opcode, packet_header, register_write};

use crate::caps::{DeviceCaps, DeviceFeatures};
use crate::sync::{WAIT_FOR_IDLE_WORDS, WAIT_FOR_ME_WORDS, wait_for_idle, wait_for_me};

// =============================================================================
// PAGETABLE INFO BLOCK
// =============================================================================

/// Per ring buffer pagetable bookkeeping shared with the CP
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct PagetableInfo {
    /// Pagetable name last switched to on any ring buffer
    pub current_global_ptname: i32,
    /// Pagetable name active on this ring buffer
    pub current_rb_ptname: i32,
    /// Pagetable name a pending switch moves to
    pub incoming_ptname: i32,
    /// Non-zero while a switch is pending
    pub switch_pt_enable: i32,
    /// TTBR0 of the active pagetable
    pub ttbr0: u64,
    /// CONTEXTIDR of the active pagetable
    pub contextidr: u32,
}

/// Byte offset of [`PagetableInfo::ttbr0`]
pub const PT_INFO_TTBR0_OFFSET: u64 = offset_of!(PagetableInfo, ttbr0) as u64;

// =============================================================================
// STRATEGY
// =============================================================================

/// Generation specific pagetable switch emitter
pub trait PagetableSwitch: Send + Sync {
    /// Generator name, for logs
    fn name(&self) -> &'static str;

    /// Upper bound on the words [`PagetableSwitch::emit`] can write
    fn max_words(&self) -> usize;

    /// Emit the switch to `ttbr0`/`contextidr` for ring buffer `rb`
    ///
    /// Returns the number of words written.
    fn emit(
        &self,
        stream: &mut CommandStream<'_>,
        caps: &DeviceCaps,
        rb: &dyn Ringbuffer,
        ttbr0: u64,
        contextidr: u32,
    ) -> Result<usize>;
}

impl fmt::Debug for dyn PagetableSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PagetableSwitch({})", self.name())
    }
}

/// Pick the switch generator for a GPU generation
pub fn pagetable_switch_for(generation: GpuGeneration) -> Result<&'static dyn PagetableSwitch> {
    match generation {
        GpuGeneration::A6xx => Ok(&A6xxSmmuV2),
        GpuGeneration::Unknown => Err(Error::InvalidGeneration),
        GpuGeneration::A5xx | GpuGeneration::A7xx => Err(Error::NotSupported),
    }
}

// =============================================================================
// A6XX
// =============================================================================

/// A6xx switch through `CP_SMMU_TABLE_UPDATE`
#[derive(Debug, Clone, Copy, Default)]
pub struct A6xxSmmuV2;

impl A6xxSmmuV2 {
    const TABLE_UPDATE_WORDS: usize = 5;
    const SHADOW_WRITE_WORDS: usize = 1 + GPUADDR_WORDS as usize + 3;
    const PERFCTR_CLEAR_WORDS: usize = 2;
    const PERFCTR_WAIT_WORDS: usize = 7;

    /// Words written when performance counters are in use
    pub const BASE_WORDS: usize = 2 * (WAIT_FOR_IDLE_WORDS + WAIT_FOR_ME_WORDS)
        + Self::TABLE_UPDATE_WORDS
        + Self::SHADOW_WRITE_WORDS;

    /// Words written when the counters are cleared across the switch
    pub const MAX_WORDS: usize =
        Self::BASE_WORDS + Self::PERFCTR_CLEAR_WORDS + Self::PERFCTR_WAIT_WORDS;
}

impl PagetableSwitch for A6xxSmmuV2 {
    fn name(&self) -> &'static str {
        "a6xx-smmu-v2"
    }

    fn max_words(&self) -> usize {
        Self::MAX_WORDS
    }

    fn emit(
        &self,
        stream: &mut CommandStream<'_>,
        caps: &DeviceCaps,
        rb: &dyn Ringbuffer,
        ttbr0: u64,
        contextidr: u32,
    ) -> Result<usize> {
        let start = stream.len();
        let ttbr0_lo = ttbr0 as u32;
        let ttbr0_hi = (ttbr0 >> 32) as u32;

        // Counters are cleared on every switch unless someone is reading them
        let clear_counters = !caps.has_feature(DeviceFeatures::PERFCOUNTERS);

        wait_for_idle(stream)?;
        wait_for_me(stream)?;

        if clear_counters {
            stream.emit(&[register_write(A6XX_RBBM_PERFCTR_SRAM_INIT_CMD, 1), 1])?;
        }

        // CP switches the pagetable and flushes the TLB
        stream.emit(&[
            packet_header(Opcode::SmmuTableUpdate, 4),
            ttbr0_lo,
            ttbr0_hi,
            contextidr,
            caps.user_cb_num,
        ])?;

        stream.emit_mem_packet(
            Opcode::MemWrite,
            rb.pagetable_desc_addr().offset(PT_INFO_TTBR0_OFFSET),
            &[ttbr0_lo, ttbr0_hi, contextidr],
        )?;

        // Release everything queued behind the table update
        wait_for_me(stream)?;
        wait_for_idle(stream)?;

        if clear_counters {
            stream.emit(&[
                packet_header(Opcode::WaitRegMem, 6),
                WAIT_REG_MEM_EQ_REGISTER,
                A6XX_RBBM_PERFCTR_SRAM_INIT_STATUS,
                0x0,
                0x1,
                0x1,
                0x0,
            ])?;
        }

        Ok(stream.len() - start)
    }
}
