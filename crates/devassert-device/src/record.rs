// Author: Lukas Bower
// Purpose: Define the shared assertion record and bounded buffer data model.

//! Fixed-capacity assertion failure records and the shared buffer holding
//! them. One buffer exists per kernel launch; the launch machinery owns it
//! and resets it between launches.

use core::sync::atomic::{AtomicU32, Ordering};

use heapless::String as HeaplessString;
use spin::Once;

use crate::text::copy_truncated;

/// Maximum length in bytes of each text field of a record.
pub const MAX_STR_LEN: usize = 512;
/// Default number of failure records a buffer can hold.
pub const ASSERTION_CAPACITY: usize = 10;

/// Fixed-capacity string used for record text fields.
pub type FieldString = HeaplessString<MAX_STR_LEN>;

/// One assertion failure, written exactly once by the thread that claimed
/// its slot and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionFailureRecord {
    message: FieldString,
    file: FieldString,
    function: FieldString,
    line: u32,
    caller_id: u32,
    block_id: [u32; 3],
    thread_id: [u32; 3],
}

impl AssertionFailureRecord {
    /// Build a record, truncating text fields that exceed [`MAX_STR_LEN`].
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        message: &str,
        file: &str,
        function: &str,
        line: u32,
        caller_id: u32,
        block_id: [u32; 3],
        thread_id: [u32; 3],
    ) -> Self {
        Self {
            message: copy_truncated(message),
            file: copy_truncated(file),
            function: copy_truncated(function),
            line,
            caller_id,
            block_id,
            thread_id,
        }
    }

    /// Stringified form of the failed condition.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source file containing the failed check.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Enclosing function or module of the failed check.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Source line of the failed check.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Opaque identifier of the kernel launch that produced this record.
    #[must_use]
    pub const fn caller_id(&self) -> u32 {
        self.caller_id
    }

    /// Block coordinates of the failing execution unit.
    #[must_use]
    pub const fn block_id(&self) -> [u32; 3] {
        self.block_id
    }

    /// Thread coordinates of the failing execution unit within its block.
    #[must_use]
    pub const fn thread_id(&self) -> [u32; 3] {
        self.thread_id
    }
}

/// Shared buffer of assertion failures for one kernel launch.
///
/// `assertion_count` counts slot-claim attempts and may exceed `CAP`;
/// `written_count` counts fully populated records and never exceeds
/// `min(assertion_count, CAP)`. Both are only ever mutated by atomic
/// increment. Each slot is a write-once cell, so no two threads can ever
/// publish the same index and a reader only observes complete records.
pub struct AssertionBuffer<const CAP: usize = ASSERTION_CAPACITY> {
    pub(crate) assertion_count: AtomicU32,
    pub(crate) written_count: AtomicU32,
    pub(crate) records: [Once<AssertionFailureRecord>; CAP],
}

impl<const CAP: usize> AssertionBuffer<CAP> {
    /// Create an empty buffer with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assertion_count: AtomicU32::new(0),
            written_count: AtomicU32::new(0),
            records: core::array::from_fn(|_| Once::new()),
        }
    }

    /// Number of records the buffer can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Number of slot-claim attempts so far. May exceed the capacity.
    #[must_use]
    pub fn assertion_count(&self) -> u32 {
        self.assertion_count.load(Ordering::SeqCst)
    }

    /// Number of records whose population has fully completed.
    #[must_use]
    pub fn written_count(&self) -> u32 {
        self.written_count.load(Ordering::SeqCst)
    }

    /// Number of slots actually claimed, `min(assertion_count, CAP)`.
    #[must_use]
    pub fn claimed(&self) -> usize {
        (self.assertion_count() as usize).min(CAP)
    }

    /// Number of claim attempts that found the buffer full and were dropped.
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.assertion_count().saturating_sub(CAP as u32)
    }

    /// Iterate over fully populated records in slot-claim order.
    ///
    /// Slots claimed but not yet published are skipped; after the launch
    /// has quiesced this yields exactly `written_count` records.
    pub fn records(&self) -> impl Iterator<Item = &AssertionFailureRecord> + '_ {
        self.records[..self.claimed()].iter().filter_map(Once::get)
    }

    /// Restore the pristine state. Requires exclusive access; the launch
    /// machinery calls this between launches.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<const CAP: usize> Default for AssertionBuffer<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty() {
        let buffer: AssertionBuffer<4> = AssertionBuffer::new();
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.assertion_count(), 0);
        assert_eq!(buffer.written_count(), 0);
        assert_eq!(buffer.claimed(), 0);
        assert_eq!(buffer.dropped(), 0);
        assert_eq!(buffer.records().count(), 0);
    }

    #[test]
    fn record_keeps_all_fields() {
        let record = AssertionFailureRecord::new(
            "idx < len",
            "kernels/gather.rs",
            "gather::kernel",
            42,
            7,
            [1, 0, 0],
            [31, 0, 0],
        );
        assert_eq!(record.message(), "idx < len");
        assert_eq!(record.file(), "kernels/gather.rs");
        assert_eq!(record.function(), "gather::kernel");
        assert_eq!(record.line(), 42);
        assert_eq!(record.caller_id(), 7);
        assert_eq!(record.block_id(), [1, 0, 0]);
        assert_eq!(record.thread_id(), [31, 0, 0]);
    }

    #[test]
    fn record_truncates_oversized_message() {
        let long = std::string::String::from_utf8(std::vec![b'a'; MAX_STR_LEN + 100]).unwrap();
        let record = AssertionFailureRecord::new(&long, "f.rs", "m", 1, 0, [0; 3], [0; 3]);
        assert_eq!(record.message().len(), MAX_STR_LEN);
    }

    #[test]
    #[cfg(feature = "recording")]
    fn reset_restores_pristine_state() {
        let mut buffer: AssertionBuffer<2> = AssertionBuffer::new();
        crate::record_assertion_failure(
            Some(&buffer),
            "cond",
            "f.rs",
            "m",
            1,
            0,
            [0; 3],
            [0; 3],
        );
        assert_eq!(buffer.assertion_count(), 1);
        buffer.reset();
        assert_eq!(buffer.assertion_count(), 0);
        assert_eq!(buffer.written_count(), 0);
        assert_eq!(buffer.records().count(), 0);
    }
}
