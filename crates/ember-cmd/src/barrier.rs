//! # Prefetch Barrier
//!
//! `CP_WAIT_FOR_ME` and `CP_WAIT_FOR_IDLE` do not stop the CP prefetcher from
//! reading ahead. Jumping into a real indirect buffer does: the prefetch
//! parser stalls until the IB has executed. The IB is a single NOP kept in
//! the setstate buffer.

use ember_core::{GpuAddr, Result, SharedMemory};
use ember_pm4::packet::GPUADDR_WORDS;
use ember_pm4::{CommandStream, Opcode, packet_header};

use crate::caps::DeviceCaps;
use crate::sync::{WAIT_FOR_IDLE_WORDS, WAIT_FOR_ME_WORDS, wait_for_idle, wait_for_me};

/// Size in words of the NOP indirect buffer
pub const NOP_IB_WORDS: u32 = 2;

/// Words written by [`prefetch_stall`]
pub const PREFETCH_STALL_WORDS: usize =
    WAIT_FOR_ME_WORDS + 1 + GPUADDR_WORDS as usize + 1 + WAIT_FOR_IDLE_WORDS;

/// Stall CP prefetch until everything before this point has retired
///
/// `nop_addr` is the NOP indirect buffer set up by [`init_setstate`].
pub fn prefetch_stall(stream: &mut CommandStream<'_>, nop_addr: GpuAddr) -> Result<usize> {
    stream.reserve(PREFETCH_STALL_WORDS)?;

    let mut count = wait_for_me(stream)?;
    count += stream.emit_mem_packet(Opcode::IndirectBufferPfe, nop_addr, &[NOP_IB_WORDS])?;
    count += wait_for_idle(stream)?;

    Ok(count)
}

/// Write the NOP indirect buffer into the setstate buffer
///
/// Must run once at device init, before the first pagetable switch. The NOP
/// header skips the following word, so the IB is [`NOP_IB_WORDS`] long.
pub fn init_setstate(caps: &DeviceCaps, mem: &dyn SharedMemory) -> Result<()> {
    if !caps.has_mmu() {
        return Ok(());
    }

    mem.write_u32(caps.setstate_nop_addr(), packet_header(Opcode::Nop, 1))?;
    log::debug!("setstate NOP IB at {}", caps.setstate_nop_addr());

    Ok(())
}
