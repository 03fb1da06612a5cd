// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-27

//! Host-side collaborator for bounded device assertion reporting.
//!
//! The device core (`devassert-device`) lets any thread of a parallel
//! kernel record a failure into a shared fixed-capacity buffer and then
//! halt itself. This crate supplies everything around that core that runs
//! on the host: the [`launch::LaunchRegistry`] that owns the buffer, hands
//! out caller identifiers and resets state between launches; the
//! [`report`] module that turns recorded failures into human-readable
//! summaries and JSONL; and the [`sim`] backend that drives kernels as
//! std threads for tests and development.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod launch;
pub mod report;
pub mod sim;

pub use devassert_device::{
    copy_truncated, device_assert, record_assertion_failure, AssertionBuffer,
    AssertionFailureRecord, FieldString, Halt, LaunchContext, SpinHalt, ASSERTION_CAPACITY,
    MAX_STR_LEN,
};
pub use launch::{LaunchRecord, LaunchRegistry, RegistryError};
pub use report::{FailureReport, ReportError, ReportedFailure};
pub use sim::{spawn_unit, SimHandle, SimThread};
