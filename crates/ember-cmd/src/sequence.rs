//! # Switch Sequence
//!
//! Composes the privileged pagetable switch:
//!
//! ```text
//! set_apriv(raise) → prefetch_stall → PagetableSwitch
//!                 → invalidate_state → set_apriv(lower)
//! ```
//!
//! The context record is not part of it; it goes out as its own submission.

use core::fmt;

use ember_core::{Pagetable, Result, Ringbuffer};
use ember_pm4::opcodes::SET_DRAW_STATE_DISABLE_ALL;
use ember_pm4::{CommandStream, Opcode, packet_header};

use crate::barrier::{PREFETCH_STALL_WORDS, prefetch_stall};
use crate::caps::DeviceCaps;
use crate::pagetable::{A6xxSmmuV2, PagetableSwitch, pagetable_switch_for};
use crate::privilege::{APRIV_WORDS, set_apriv};

/// Words written by [`invalidate_state`]
pub const INVALIDATE_STATE_WORDS: usize = 4;

/// Worst case words of a full switch sequence
pub const MAX_SWITCH_WORDS: usize =
    2 * APRIV_WORDS + PREFETCH_STALL_WORDS + A6xxSmmuV2::MAX_WORDS + INVALIDATE_STATE_WORDS;

/// Drop all cached draw state groups
fn invalidate_state(stream: &mut CommandStream<'_>) -> Result<usize> {
    stream.emit(&[
        packet_header(Opcode::SetDrawState, 3),
        SET_DRAW_STATE_DISABLE_ALL,
        0x0,
        0x0,
    ])
}

// =============================================================================
// SEQUENCER
// =============================================================================

/// Builds pagetable switch sequences for one device
pub struct SwitchSequencer {
    caps: DeviceCaps,
    pagetable: &'static dyn PagetableSwitch,
}

impl SwitchSequencer {
    /// Sequencer using the switch generator for `caps.generation`
    pub fn new(caps: DeviceCaps) -> Result<Self> {
        let pagetable = pagetable_switch_for(caps.generation)?;
        Ok(Self::with_strategy(caps, pagetable))
    }

    /// Sequencer with an explicit switch generator
    pub fn with_strategy(caps: DeviceCaps, pagetable: &'static dyn PagetableSwitch) -> Self {
        Self { caps, pagetable }
    }

    /// Device configuration
    #[inline]
    pub fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    /// Upper bound on the words [`SwitchSequencer::build_switch_sequence`] writes
    pub fn max_words(&self) -> usize {
        2 * APRIV_WORDS + PREFETCH_STALL_WORDS + self.pagetable.max_words() + INVALIDATE_STATE_WORDS
    }

    /// Append the switch of `rb` to `pt` to `stream`
    ///
    /// Returns the number of words written. On error the stream may hold a
    /// partial sequence and must not be submitted.
    pub fn build_switch_sequence(
        &self,
        stream: &mut CommandStream<'_>,
        rb: &dyn Ringbuffer,
        pt: &dyn Pagetable,
    ) -> Result<usize> {
        let mut count = set_apriv(stream, &self.caps, true)?;

        count += prefetch_stall(stream, self.caps.setstate_nop_addr())?;
        count += self
            .pagetable
            .emit(stream, &self.caps, rb, pt.ttbr0(), pt.contextidr())?;
        count += invalidate_state(stream)?;

        count += set_apriv(stream, &self.caps, false)?;

        Ok(count)
    }
}

impl fmt::Debug for SwitchSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchSequencer")
            .field("caps", &self.caps)
            .field("pagetable", &self.pagetable.name())
            .finish()
    }
}
