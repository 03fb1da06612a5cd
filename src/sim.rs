// CLASSIFICATION: COMMUNITY
// Filename: sim.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-27

//! Simulated kernel backend running execution units as std threads.
//!
//! Real device targets implement [`Halt`] with a trap instruction; here a
//! halted unit parks its thread forever, which is unwind-free and stops
//! exactly the issuing thread, matching the device semantics closely
//! enough for tests and host-side development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use devassert_device::{AssertionBuffer, Halt, LaunchContext, ASSERTION_CAPACITY};

/// Execution context for one simulated device thread.
pub struct SimThread<const CAP: usize = ASSERTION_CAPACITY> {
    buffer: Option<Arc<AssertionBuffer<CAP>>>,
    caller_id: u32,
    block_id: [u32; 3],
    thread_id: [u32; 3],
    halted: Arc<AtomicBool>,
}

impl<const CAP: usize> SimThread<CAP> {
    /// Create a context for one unit of the simulated grid.
    #[must_use]
    pub fn new(
        buffer: Option<Arc<AssertionBuffer<CAP>>>,
        caller_id: u32,
        block_id: [u32; 3],
        thread_id: [u32; 3],
    ) -> Self {
        Self {
            buffer,
            caller_id,
            block_id,
            thread_id,
            halted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag set when this unit halts.
    #[must_use]
    pub fn halted_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.halted)
    }
}

impl<const CAP: usize> LaunchContext<CAP> for SimThread<CAP> {
    fn assertion_buffer(&self) -> Option<&AssertionBuffer<CAP>> {
        self.buffer.as_deref()
    }

    fn caller_id(&self) -> u32 {
        self.caller_id
    }

    fn block_id(&self) -> [u32; 3] {
        self.block_id
    }

    fn thread_id(&self) -> [u32; 3] {
        self.thread_id
    }
}

impl<const CAP: usize> Halt for SimThread<CAP> {
    fn halt(&self) -> ! {
        self.halted.store(true, Ordering::SeqCst);
        loop {
            thread::park();
        }
    }
}

/// Handle to one spawned simulated unit.
pub struct SimHandle {
    handle: JoinHandle<()>,
    halted: Arc<AtomicBool>,
}

impl SimHandle {
    /// Whether the unit has halted itself via a failed assertion.
    #[must_use]
    pub fn halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Join a unit that ran to completion.
    ///
    /// A halted unit never finishes; callers wait for the buffer to
    /// quiesce and check [`SimHandle::halted`] instead of joining it.
    pub fn join(self) {
        if !self.halted() {
            let _ = self.handle.join();
        }
    }
}

/// Spawn one simulated execution unit running `body` with its context.
pub fn spawn_unit<const CAP: usize, F>(ctx: SimThread<CAP>, body: F) -> SimHandle
where
    F: FnOnce(&SimThread<CAP>) + Send + 'static,
{
    let halted = ctx.halted_flag();
    let handle = thread::spawn(move || body(&ctx));
    SimHandle { handle, halted }
}
