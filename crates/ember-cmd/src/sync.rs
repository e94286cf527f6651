//! # CP Synchronization
//!
//! Barrier packets. Both are a bare type-7 header; the CP waits on the GPU
//! timeline, the host never blocks on them.

use ember_core::Result;
use ember_pm4::{CommandStream, Opcode, packet_header};

/// Words written by [`wait_for_idle`]
pub const WAIT_FOR_IDLE_WORDS: usize = 1;

/// Words written by [`wait_for_me`]
pub const WAIT_FOR_ME_WORDS: usize = 1;

/// Stall the CP until the GPU pipeline has drained
#[inline]
pub fn wait_for_idle(stream: &mut CommandStream<'_>) -> Result<usize> {
    stream.push(packet_header(Opcode::WaitForIdle, 0))
}

/// Stall the CP until its micro engine has consumed all prior packets
#[inline]
pub fn wait_for_me(stream: &mut CommandStream<'_>) -> Result<usize> {
    stream.push(packet_header(Opcode::WaitForMe, 0))
}
