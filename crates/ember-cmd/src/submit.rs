//! # Internal Submission
//!
//! Builds switch and context record commands into private buffers and hands
//! them to the ring buffer.
//!
//! ## Pagetable switch
//!
//! ```text
//! Idle ──alloc──► Allocated ──build──► Built ──issue──► Submitted
//!   │                 │                  │
//!   └─► OutOfMemory   └─► Skipped        └─► SequenceTooLarge / transport error
//!                        (GPU fault)
//! ```
//!
//! The transient buffer is dropped on every path.

use alloc::vec::Vec;
use core::fmt;

use ember_core::{
    CmdFlags, ContextId, Error, FaultMonitor, PAGE_SIZE, Pagetable, Result, Ringbuffer, Timestamp,
};
use ember_pm4::CommandStream;

use crate::context::{CONTEXT_RECORD_WORDS, write_context_record};
use crate::sequence::{MAX_SWITCH_WORDS, SwitchSequencer};

/// Size of the transient buffer for a pagetable switch
pub const SWITCH_BUFFER_WORDS: usize = PAGE_SIZE.as_words();

/// Size of the stack buffer for a context record
pub const CONTEXT_BUFFER_WORDS: usize = 15;

static_assertions::const_assert!(MAX_SWITCH_WORDS <= SWITCH_BUFFER_WORDS);
static_assertions::const_assert!(CONTEXT_RECORD_WORDS <= CONTEXT_BUFFER_WORDS);

// =============================================================================
// TRANSIENT BUFFER
// =============================================================================

/// Heap command buffer owned by a single submission
struct TransientBuffer {
    words: Vec<u32>,
}

impl TransientBuffer {
    fn try_new(words: usize) -> Result<Self> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(words)
            .map_err(|_| Error::OutOfMemory)?;
        buffer.resize(words, 0);
        Ok(Self { words: buffer })
    }

    fn stream(&mut self) -> CommandStream<'_> {
        CommandStream::new(&mut self.words)
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Outcome of a pagetable switch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Switch queued on the ring buffer
    Issued(Timestamp),
    /// Device is recovering from a fault, nothing was queued
    Skipped,
}

/// What [`IommuSwitch::set_pt_ctx`] queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchReport {
    /// Pagetable switch, `None` when no switch was needed
    pub pagetable: Option<Submission>,
    /// Timestamp of the context record
    pub context: Timestamp,
}

// =============================================================================
// IOMMU SWITCH
// =============================================================================

/// Entry point for pagetable and context switches on an IOMMU device
pub struct IommuSwitch<'a> {
    sequencer: SwitchSequencer,
    fault: &'a dyn FaultMonitor,
    switch_buffer_words: usize,
}

impl<'a> IommuSwitch<'a> {
    /// Create a switcher; `fault` gates pagetable switches during recovery
    pub fn new(sequencer: SwitchSequencer, fault: &'a dyn FaultMonitor) -> Self {
        Self {
            sequencer,
            fault,
            switch_buffer_words: SWITCH_BUFFER_WORDS,
        }
    }

    #[cfg(test)]
    fn with_switch_buffer_words(mut self, words: usize) -> Self {
        self.switch_buffer_words = words;
        self
    }

    /// Switch `rb` to `pt` in protected mode
    pub fn set_pagetable_gpu(
        &self,
        rb: &dyn Ringbuffer,
        pt: &dyn Pagetable,
    ) -> Result<Submission> {
        let mut buffer = TransientBuffer::try_new(self.switch_buffer_words)?;

        if self.fault.in_fault() {
            log::warn!("rb{}: GPU fault pending, pagetable switch skipped", rb.id());
            return Ok(Submission::Skipped);
        }

        let mut stream = buffer.stream();
        let count = self
            .sequencer
            .build_switch_sequence(&mut stream, rb, pt)
            .inspect_err(|err| {
                if let Error::SequenceTooLarge { needed, capacity } = err {
                    log::warn!(
                        "rb{}: switch needs {} words, buffer holds {}",
                        rb.id(),
                        needed,
                        capacity
                    );
                }
            })?;

        let timestamp = rb
            .issue_internal_cmds(CmdFlags::PMODE, stream.as_slice())
            .inspect_err(|err| log::warn!("rb{}: pagetable switch rejected: {}", rb.id(), err))?;

        log::debug!(
            "rb{}: pagetable switch ttbr0={:#x} contextidr={:#x} ({} words)",
            rb.id(),
            pt.ttbr0(),
            pt.contextidr(),
            count
        );

        Ok(Submission::Issued(timestamp))
    }

    /// Publish `context` as the current draw context of `rb`
    pub fn set_context_gpu(
        &self,
        rb: &dyn Ringbuffer,
        context: Option<ContextId>,
    ) -> Result<Timestamp> {
        let mut words = [0u32; CONTEXT_BUFFER_WORDS];
        let mut stream = CommandStream::new(&mut words);

        write_context_record(&mut stream, self.sequencer.caps(), rb, context)?;

        let timestamp = rb
            .issue_internal_cmds(CmdFlags::empty(), stream.as_slice())
            .inspect_err(|err| log::warn!("rb{}: context record rejected: {}", rb.id(), err))?;

        log::debug!(
            "rb{}: context {} recorded",
            rb.id(),
            context.unwrap_or(ContextId::GLOBAL).raw()
        );

        Ok(timestamp)
    }

    /// Switch `rb` to `pt` if needed, then record `context`
    ///
    /// Any switch error is returned before the context record is queued.
    pub fn set_pt_ctx(
        &self,
        rb: &dyn Ringbuffer,
        pt: &dyn Pagetable,
        context: Option<ContextId>,
    ) -> Result<SwitchReport> {
        let caps = self.sequencer.caps();
        let mut pagetable = None;

        if caps.has_mmu() {
            let current = rb.active_pagetable().unwrap_or(caps.default_pagetable);
            if current != pt.handle() {
                pagetable = Some(self.set_pagetable_gpu(rb, pt)?);
            }
        }

        let context = self.set_context_gpu(rb, context)?;

        Ok(SwitchReport { pagetable, context })
    }
}

impl fmt::Debug for IommuSwitch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IommuSwitch")
            .field("sequencer", &self.sequencer)
            .field("in_fault", &self.fault.in_fault())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::{DeviceCaps, DeviceFeatures, MmuType};
    use crate::memstore::Memstore;
    use crate::mock::{MockFault, MockPagetable, MockRingbuffer};
    use crate::pagetable::PagetableSwitch;
    use crate::sync::wait_for_idle;
    use ember_core::{GpuAddr, PagetableHandle, RingbufferError};
    use ember_pm4::{Opcode, Packet, decode};

    /// Switch generator that does not fit in a page
    struct Oversized;

    static OVERSIZED: Oversized = Oversized;

    impl PagetableSwitch for Oversized {
        fn name(&self) -> &'static str {
            "oversized"
        }

        fn max_words(&self) -> usize {
            2000
        }

        fn emit(
            &self,
            stream: &mut CommandStream<'_>,
            _caps: &DeviceCaps,
            _rb: &dyn Ringbuffer,
            _ttbr0: u64,
            _contextidr: u32,
        ) -> Result<usize> {
            let mut count = 0;
            for _ in 0..self.max_words() {
                count += wait_for_idle(stream)?;
            }
            Ok(count)
        }
    }

    const PT_A: PagetableHandle = PagetableHandle::new(1);
    const PT_B: PagetableHandle = PagetableHandle::new(2);

    fn caps() -> DeviceCaps {
        DeviceCaps {
            features: DeviceFeatures::PERFCOUNTERS,
            setstate: GpuAddr::new(0xfc00_0000),
            memstore: Memstore::new(GpuAddr::new(0xfd00_0000)),
            default_pagetable: PT_A,
            ..DeviceCaps::default()
        }
    }

    fn pt_b() -> MockPagetable {
        MockPagetable::new(PT_B, 0x0000_0002_0040_0000, 9)
    }

    fn switcher(caps: DeviceCaps, fault: &MockFault) -> IommuSwitch<'_> {
        IommuSwitch::new(SwitchSequencer::new(caps).unwrap(), fault)
    }

    #[test]
    fn test_switch_and_context_record() {
        let fault = MockFault::new(false);
        let switch = switcher(caps(), &fault);
        let rb = MockRingbuffer::new(0).with_active_pagetable(PT_A);

        let report = switch.set_pt_ctx(&rb, &pt_b(), Some(ContextId::new(7))).unwrap();
        assert_eq!(report.pagetable, Some(Submission::Issued(Timestamp(1))));
        assert_eq!(report.context, Timestamp(2));

        let submissions = rb.submissions();
        assert_eq!(submissions.len(), 2);

        let (flags, switch_cmds) = &submissions[0];
        assert_eq!(*flags, CmdFlags::PMODE);
        assert_eq!(switch_cmds.len(), 4 + 6 + 15 + 4 + 4);

        let (flags, context_cmds) = &submissions[1];
        assert_eq!(*flags, CmdFlags::empty());
        assert_eq!(context_cmds.len(), CONTEXT_RECORD_WORDS);

        let writes: Vec<Packet<'_>> = decode(context_cmds)
            .map(|p| p.unwrap().1)
            .filter(|p| p.is(Opcode::MemWrite))
            .collect();
        assert_eq!(writes.len(), 2);
        assert!(writes.iter().all(|p| p.payload()[2] == 7));
    }

    #[test]
    fn test_same_pagetable_only_records_context() {
        let fault = MockFault::new(false);
        let switch = switcher(caps(), &fault);
        let rb = MockRingbuffer::new(1).with_active_pagetable(PT_B);

        let report = switch.set_pt_ctx(&rb, &pt_b(), Some(ContextId::new(3))).unwrap();
        assert_eq!(report.pagetable, None);

        let submissions = rb.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].1.len(), CONTEXT_RECORD_WORDS);
    }

    #[test]
    fn test_idle_ring_buffer_uses_default_pagetable() {
        let fault = MockFault::new(false);
        let switch = switcher(caps(), &fault);
        let rb = MockRingbuffer::new(0);
        let default = MockPagetable::new(PT_A, 0x1000, 0);

        let report = switch.set_pt_ctx(&rb, &default, None).unwrap();
        assert_eq!(report.pagetable, None);
        assert_eq!(rb.submissions().len(), 1);
    }

    #[test]
    fn test_fault_skips_switch() {
        let fault = MockFault::new(true);
        let switch = switcher(caps(), &fault);
        let rb = MockRingbuffer::new(0).with_active_pagetable(PT_A);

        assert_eq!(switch.set_pagetable_gpu(&rb, &pt_b()).unwrap(), Submission::Skipped);
        assert!(rb.submissions().is_empty());

        let report = switch.set_pt_ctx(&rb, &pt_b(), Some(ContextId::new(4))).unwrap();
        assert_eq!(report.pagetable, Some(Submission::Skipped));
        assert_eq!(rb.submissions().len(), 1);
    }

    #[test]
    fn test_transport_error_propagates() {
        let fault = MockFault::new(false);
        let switch = switcher(caps(), &fault);
        let rb = MockRingbuffer::new(0)
            .with_active_pagetable(PT_A)
            .failing(Error::Ringbuffer(RingbufferError::Full));

        let err = switch.set_pt_ctx(&rb, &pt_b(), Some(ContextId::new(7))).unwrap_err();
        assert_eq!(err, Error::Ringbuffer(RingbufferError::Full));
        assert!(rb.submissions().is_empty());
    }

    #[test]
    fn test_no_mmu_only_records_context() {
        let fault = MockFault::new(false);
        let caps = DeviceCaps {
            mmu: MmuType::None,
            ..caps()
        };
        let switch = switcher(caps, &fault);
        let rb = MockRingbuffer::new(0).with_active_pagetable(PT_A);

        let report = switch.set_pt_ctx(&rb, &pt_b(), Some(ContextId::new(7))).unwrap();
        assert_eq!(report.pagetable, None);
        assert_eq!(rb.submissions().len(), 1);
    }

    #[test]
    fn test_invalid_ring_buffer_id() {
        let fault = MockFault::new(false);
        let switch = switcher(caps(), &fault);
        let rb = MockRingbuffer::new(6);

        assert_eq!(switch.set_context_gpu(&rb, None).unwrap_err(), Error::InvalidParameter);
        assert!(rb.submissions().is_empty());
    }

    #[test]
    fn test_oversized_sequence_not_submitted() {
        let fault = MockFault::new(false);
        let sequencer = SwitchSequencer::with_strategy(caps(), &OVERSIZED);
        let switch = IommuSwitch::new(sequencer, &fault);
        let rb = MockRingbuffer::new(0).with_active_pagetable(PT_A);

        let err = switch.set_pagetable_gpu(&rb, &pt_b()).unwrap_err();
        assert!(matches!(err, Error::SequenceTooLarge { capacity: SWITCH_BUFFER_WORDS, .. }));
        assert!(rb.submissions().is_empty());

        // No context record after a failed switch either
        let err = switch.set_pt_ctx(&rb, &pt_b(), Some(ContextId::new(7))).unwrap_err();
        assert!(matches!(err, Error::SequenceTooLarge { .. }));
        assert!(rb.submissions().is_empty());
    }

    #[test]
    fn test_switch_allocation_failure_not_submitted() {
        let fault = MockFault::new(false);
        let switch = switcher(caps(), &fault).with_switch_buffer_words(usize::MAX);
        let rb = MockRingbuffer::new(0).with_active_pagetable(PT_A);

        assert_eq!(switch.set_pagetable_gpu(&rb, &pt_b()).unwrap_err(), Error::OutOfMemory);
        assert_eq!(
            switch.set_pt_ctx(&rb, &pt_b(), None).unwrap_err(),
            Error::OutOfMemory
        );
        assert!(rb.submissions().is_empty());
    }

    #[test]
    fn test_transient_buffer_allocation_failure() {
        assert!(matches!(TransientBuffer::try_new(usize::MAX), Err(Error::OutOfMemory)));

        let mut buffer = TransientBuffer::try_new(SWITCH_BUFFER_WORDS).unwrap();
        assert_eq!(buffer.stream().capacity(), 1024);
    }
}
