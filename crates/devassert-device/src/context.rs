// Author: Lukas Bower
// Purpose: Execution-context and halt capabilities consumed by the check macro.

//! Capabilities the launch machinery supplies to each kernel invocation.

use crate::record::AssertionBuffer;

/// Irreversibly stop the issuing execution unit.
///
/// Backends map this onto whatever the platform offers: a hardware trap on
/// real device targets, or a parked thread in host-side simulation. The
/// halt applies to exactly the calling unit and must not unwind; other
/// units keep running.
pub trait Halt {
    /// Stop executing further instructions on this unit.
    fn halt(&self) -> !;
}

impl<T: Halt + ?Sized> Halt for &T {
    fn halt(&self) -> ! {
        (**self).halt()
    }
}

/// Busy halt for bare-metal backends with no cheaper primitive.
pub struct SpinHalt;

impl Halt for SpinHalt {
    fn halt(&self) -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}

/// Per-invocation arguments the launch collaborator passes into a kernel:
/// the shared buffer (absent when reporting is disabled), the opaque caller
/// identifier, and the unit's coordinates within the parallel grid.
pub trait LaunchContext<const CAP: usize> {
    /// Shared assertion buffer for this launch, if reporting is enabled.
    fn assertion_buffer(&self) -> Option<&AssertionBuffer<CAP>>;

    /// Opaque identifier of the kernel launch.
    fn caller_id(&self) -> u32;

    /// Block coordinates of this execution unit.
    fn block_id(&self) -> [u32; 3];

    /// Thread coordinates of this execution unit within its block.
    fn thread_id(&self) -> [u32; 3];
}

impl<const CAP: usize, T: LaunchContext<CAP> + ?Sized> LaunchContext<CAP> for &T {
    fn assertion_buffer(&self) -> Option<&AssertionBuffer<CAP>> {
        (**self).assertion_buffer()
    }

    fn caller_id(&self) -> u32 {
        (**self).caller_id()
    }

    fn block_id(&self) -> [u32; 3] {
        (**self).block_id()
    }

    fn thread_id(&self) -> [u32; 3] {
        (**self).thread_id()
    }
}
