// Author: Lukas Bower
// Purpose: Race-safe slot claim and record population for failing threads.

//! The single entry point a failing thread uses to report a condition.

use core::hint;
use core::sync::atomic::Ordering;

use crate::record::{AssertionBuffer, AssertionFailureRecord};

/// Record one assertion failure into the shared buffer.
///
/// An absent buffer means the mechanism is disabled at run time; the call
/// returns immediately. Otherwise the candidate slot index is taken from a
/// single atomic increment of `assertion_count`, so no two threads are ever
/// assigned the same slot.
///
/// A claim at or past the capacity writes nothing. It spins until
/// `written_count` catches up with `min(assertion_count, CAP)`, so that the
/// caller cannot trap ahead of records still being written by other
/// threads, then returns. `written_count` is monotonic and every in-range
/// writer increments it after publishing, so the wait always terminates.
///
/// This routine never halts the calling thread; that is the call site's
/// job once it returns.
#[cfg(feature = "recording")]
#[allow(clippy::too_many_arguments)]
pub fn record_assertion_failure<const CAP: usize>(
    buffer: Option<&AssertionBuffer<CAP>>,
    message: &str,
    file: &str,
    function: &str,
    line: u32,
    caller_id: u32,
    block_id: [u32; 3],
    thread_id: [u32; 3],
) {
    let Some(buffer) = buffer else {
        return;
    };

    let nid = buffer.assertion_count.fetch_add(1, Ordering::SeqCst);

    // The slot index is zero-based, so `nid == CAP` is already past the end.
    if nid as usize >= CAP {
        loop {
            let claimed = buffer.assertion_count.load(Ordering::SeqCst).min(CAP as u32);
            if buffer.written_count.load(Ordering::SeqCst) >= claimed {
                break;
            }
            hint::spin_loop();
        }
        return;
    }

    let record = AssertionFailureRecord::new(
        message, file, function, line, caller_id, block_id, thread_id,
    );
    buffer.records[nid as usize].call_once(|| record);
    buffer.written_count.fetch_add(1, Ordering::SeqCst);
}

/// Recording compiled out; the call site degrades to halt-on-false.
#[cfg(not(feature = "recording"))]
#[allow(clippy::too_many_arguments)]
pub fn record_assertion_failure<const CAP: usize>(
    _buffer: Option<&AssertionBuffer<CAP>>,
    _message: &str,
    _file: &str,
    _function: &str,
    _line: u32,
    _caller_id: u32,
    _block_id: [u32; 3],
    _thread_id: [u32; 3],
) {
}
