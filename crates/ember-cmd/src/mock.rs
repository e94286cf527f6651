//! Test doubles for the collaborator traits

use alloc::vec::Vec;

use ember_core::{
    CmdFlags, Error, FaultMonitor, GpuAddr, Pagetable, PagetableHandle, Result, Ringbuffer,
    SharedMemory, Timestamp,
};
use spin::Mutex;

// =============================================================================
// RING BUFFER
// =============================================================================

#[derive(Default)]
struct RingState {
    submissions: Vec<(CmdFlags, Vec<u32>)>,
    timestamp: u32,
}

/// Ring buffer that records every submission
pub struct MockRingbuffer {
    id: u32,
    active: Option<PagetableHandle>,
    pagetable_desc: GpuAddr,
    fail: Option<Error>,
    state: Mutex<RingState>,
}

impl MockRingbuffer {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            active: None,
            pagetable_desc: GpuAddr::new(0xfe00_0000),
            fail: None,
            state: Mutex::new(RingState::default()),
        }
    }

    pub fn with_active_pagetable(mut self, pt: PagetableHandle) -> Self {
        self.active = Some(pt);
        self
    }

    pub fn with_pagetable_desc(mut self, addr: GpuAddr) -> Self {
        self.pagetable_desc = addr;
        self
    }

    /// Reject every submission with `err`
    pub fn failing(mut self, err: Error) -> Self {
        self.fail = Some(err);
        self
    }

    pub fn submissions(&self) -> Vec<(CmdFlags, Vec<u32>)> {
        self.state.lock().submissions.clone()
    }
}

impl Ringbuffer for MockRingbuffer {
    fn id(&self) -> u32 {
        self.id
    }

    fn active_pagetable(&self) -> Option<PagetableHandle> {
        self.active
    }

    fn pagetable_desc_addr(&self) -> GpuAddr {
        self.pagetable_desc
    }

    fn issue_internal_cmds(&self, flags: CmdFlags, cmds: &[u32]) -> Result<Timestamp> {
        if let Some(err) = self.fail {
            return Err(err);
        }

        let mut state = self.state.lock();
        state.submissions.push((flags, cmds.to_vec()));
        state.timestamp += 1;
        Ok(Timestamp(state.timestamp))
    }
}

// =============================================================================
// PAGETABLE
// =============================================================================

pub struct MockPagetable {
    handle: PagetableHandle,
    ttbr0: u64,
    contextidr: u32,
}

impl MockPagetable {
    pub fn new(handle: PagetableHandle, ttbr0: u64, contextidr: u32) -> Self {
        Self {
            handle,
            ttbr0,
            contextidr,
        }
    }
}

impl Pagetable for MockPagetable {
    fn handle(&self) -> PagetableHandle {
        self.handle
    }

    fn ttbr0(&self) -> u64 {
        self.ttbr0
    }

    fn contextidr(&self) -> u32 {
        self.contextidr
    }
}

// =============================================================================
// DEVICE STATE
// =============================================================================

pub struct MockFault(bool);

impl MockFault {
    pub fn new(in_fault: bool) -> Self {
        Self(in_fault)
    }
}

impl FaultMonitor for MockFault {
    fn in_fault(&self) -> bool {
        self.0
    }
}

/// Shared memory that logs writes instead of performing them
pub struct MockSharedMemory {
    writes: Mutex<Vec<(GpuAddr, u32)>>,
}

impl MockSharedMemory {
    pub fn new() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<(GpuAddr, u32)> {
        self.writes.lock().clone()
    }
}

impl SharedMemory for MockSharedMemory {
    fn write_u32(&self, addr: GpuAddr, value: u32) -> Result<()> {
        self.writes.lock().push((addr, value));
        Ok(())
    }
}
