//! # Context Record
//!
//! Commands that publish the incoming draw context: an identifier marker for
//! dump tools, the context id in the ring buffer and global memstore slots,
//! then a cache invalidate.

use ember_core::{ContextId, Result, Ringbuffer};
use ember_pm4::opcodes::{CACHE_INVALIDATE, CONTEXT_TO_MEM_IDENTIFIER};
use ember_pm4::packet::GPUADDR_WORDS;
use ember_pm4::{CommandStream, Opcode, packet_header};

use crate::caps::DeviceCaps;

const MEMSTORE_WRITE_WORDS: usize = 1 + GPUADDR_WORDS as usize + 1;

/// Words written by [`write_context_record`]
pub const CONTEXT_RECORD_WORDS: usize = 2 + 2 * MEMSTORE_WRITE_WORDS + 2;

/// Record `context` as current on `rb` and globally
///
/// `None` records id 0. Both memstore writes carry the same id.
pub fn write_context_record(
    stream: &mut CommandStream<'_>,
    caps: &DeviceCaps,
    rb: &dyn Ringbuffer,
    context: Option<ContextId>,
) -> Result<usize> {
    let id = context.unwrap_or(ContextId::GLOBAL).raw();
    let rb_slot = caps.memstore.rb_current_context(rb.id())?;

    stream.reserve(CONTEXT_RECORD_WORDS)?;

    let mut count = stream.emit(&[packet_header(Opcode::Nop, 1), CONTEXT_TO_MEM_IDENTIFIER])?;
    count += stream.emit_mem_packet(Opcode::MemWrite, rb_slot, &[id])?;
    count += stream.emit_mem_packet(
        Opcode::MemWrite,
        caps.memstore.global_current_context(),
        &[id],
    )?;
    count += stream.emit(&[packet_header(Opcode::EventWrite, 1), CACHE_INVALIDATE])?;

    Ok(count)
}
