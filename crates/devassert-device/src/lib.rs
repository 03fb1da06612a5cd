// Author: Lukas Bower
// Purpose: Record assertion failures from massively parallel kernel threads.
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![no_std]

//! Bounded, race-safe assertion reporting for device kernels.
//!
//! A kernel running on thousands of simultaneous threads cannot unwind, and
//! halting every thread the moment one check fails would lose the failure
//! details still being written by its neighbours. Instead each failing
//! thread claims one slot in a shared [`AssertionBuffer`] with a single
//! atomic increment, populates a fixed-size [`AssertionFailureRecord`], and
//! only then traps. The host reads the buffer back after the launch
//! completes.
//!
//! The [`device_assert!`] macro is the call-site entry point; it needs an
//! execution context implementing [`LaunchContext`] (buffer, caller id and
//! grid coordinates, supplied by the launch machinery) and [`Halt`] (the
//! backend's way of stopping exactly the issuing execution unit).
//!
//! Once any assertion fires, the kernel's remaining output must be treated
//! as garbage; nothing here stops the other threads.

#[cfg(test)]
extern crate std;

mod context;
mod record;
mod recorder;
mod text;

pub use context::{Halt, LaunchContext, SpinHalt};
pub use record::{
    AssertionBuffer, AssertionFailureRecord, FieldString, ASSERTION_CAPACITY, MAX_STR_LEN,
};
pub use recorder::record_assertion_failure;
pub use text::copy_truncated;

/// Check a condition inside kernel code.
///
/// The condition is evaluated exactly once. When it holds, nothing happens.
/// When it fails, the stringified condition and source location are recorded
/// into the context's assertion buffer together with the caller id and grid
/// coordinates, and the calling execution unit is halted via [`Halt::halt`].
/// With the `recording` feature disabled this degrades to a plain
/// halt-on-false check.
#[macro_export]
macro_rules! device_assert {
    ($ctx:expr, $cond:expr) => {{
        let ctx = &$ctx;
        let passed: bool = $cond;
        if !passed {
            $crate::record_assertion_failure(
                $crate::LaunchContext::assertion_buffer(ctx),
                stringify!($cond),
                file!(),
                module_path!(),
                line!(),
                $crate::LaunchContext::caller_id(ctx),
                $crate::LaunchContext::block_id(ctx),
                $crate::LaunchContext::thread_id(ctx),
            );
            $crate::Halt::halt(ctx);
        }
    }};
}
