// CLASSIFICATION: COMMUNITY
// Filename: report.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-27

//! Owned failure reports assembled from a quiesced assertion buffer.
//!
//! Records in the shared buffer are fixed-capacity and borrow from the
//! buffer; reporting copies them into owned values so they can outlive a
//! reset, be rendered for humans, or be exported as JSONL.

use std::fmt;
use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use devassert_device::AssertionFailureRecord;

/// Errors encountered while exporting a failure report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing the report to the sink failed.
    #[error("failed to write failure report: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding a failure as JSON failed.
    #[error("failed to encode failure report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One assertion failure, owned and attributed to its launch.
#[derive(Clone, Debug, Serialize)]
pub struct ReportedFailure {
    /// Name of the kernel that produced the failure, if still known.
    pub kernel_name: Option<String>,
    /// Caller id of the producing launch.
    pub caller_id: u32,
    /// Stringified failed condition.
    pub message: String,
    /// Source file of the failed check.
    pub file: String,
    /// Enclosing function or module of the failed check.
    pub function: String,
    /// Source line of the failed check.
    pub line: u32,
    /// Block coordinates of the failing execution unit.
    pub block_id: [u32; 3],
    /// Thread coordinates of the failing execution unit.
    pub thread_id: [u32; 3],
}

impl ReportedFailure {
    /// Copy a buffer record into an owned, attributed failure.
    #[must_use]
    pub fn from_record(record: &AssertionFailureRecord, kernel_name: Option<String>) -> Self {
        Self {
            kernel_name,
            caller_id: record.caller_id(),
            message: record.message().to_string(),
            file: record.file().to_string(),
            function: record.function().to_string(),
            line: record.line(),
            block_id: record.block_id(),
            thread_id: record.thread_id(),
        }
    }
}

/// Complete readback of one launch's assertion buffer.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FailureReport {
    /// Total slot-claim attempts, including dropped ones.
    pub assertion_count: u32,
    /// Fully written records.
    pub written_count: u32,
    /// Claim attempts dropped after the buffer filled.
    pub dropped: u32,
    /// The recorded failures in slot-claim order.
    pub failures: Vec<ReportedFailure>,
}

impl FailureReport {
    /// Whether no failure was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Export the failures as JSONL, one object per line.
    pub fn write_jsonl<W: Write>(&self, mut sink: W) -> Result<(), ReportError> {
        for failure in &self.failures {
            serde_json::to_writer(&mut sink, failure)?;
            writeln!(sink)?;
        }
        Ok(())
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} device-side assertion failure(s): {} written, {} dropped",
            self.assertion_count, self.written_count, self.dropped
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            let kernel = failure.kernel_name.as_deref().unwrap_or("<unknown kernel>");
            write!(
                f,
                "\n  [{i}] `{}` failed at {}:{} in {} (kernel {kernel}, caller {}, block {:?}, thread {:?})",
                failure.message,
                failure.file,
                failure.line,
                failure.function,
                failure.caller_id,
                failure.block_id,
                failure.thread_id,
            )?;
        }
        Ok(())
    }
}
