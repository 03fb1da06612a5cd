// CLASSIFICATION: COMMUNITY
// Filename: launch.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-27

//! Launch registry owning the shared assertion buffer.
//!
//! The registry is the host half of the buffer provisioning interface: it
//! allocates the buffer, hands each kernel launch an opaque caller id plus
//! a handle to the buffer, and reads the records back once the launch has
//! completed. Between launches it resets the buffer so records never leak
//! across launches.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, error, warn};
use spin::Mutex;
use thiserror::Error;

use devassert_device::{AssertionBuffer, ASSERTION_CAPACITY};

use crate::report::{FailureReport, ReportedFailure};

/// Environment variable enabling assertion recording at run time.
pub const ENABLE_ENV: &str = "DEVASSERT_ENABLE";

/// Maximum number of launch records retained for failure attribution.
const MAX_LAUNCH_RECORDS: usize = 1024;

/// Errors surfaced by the launch registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Reset was requested while kernel contexts still hold the buffer.
    #[error("assertion buffer still shared by {0} outstanding handle(s)")]
    BufferShared(usize),
}

/// One registered kernel launch.
#[derive(Clone, Debug)]
pub struct LaunchRecord {
    /// Caller id handed to the kernel for this launch.
    pub caller_id: u32,
    /// Name of the launched kernel.
    pub kernel_name: String,
}

/// Owns the shared assertion buffer and attributes failures to launches.
///
/// A disabled registry holds no buffer at all; every kernel then receives
/// an absent buffer reference and recording degrades to plain halts.
pub struct LaunchRegistry<const CAP: usize = ASSERTION_CAPACITY> {
    buffer: Option<Arc<AssertionBuffer<CAP>>>,
    launches: Mutex<VecDeque<LaunchRecord>>,
    next_caller_id: AtomicU32,
}

impl<const CAP: usize> LaunchRegistry<CAP> {
    /// Create a registry, allocating the shared buffer when enabled.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            buffer: enabled.then(|| Arc::new(AssertionBuffer::new())),
            launches: Mutex::new(VecDeque::new()),
            next_caller_id: AtomicU32::new(0),
        }
    }

    /// Create a registry honouring the [`ENABLE_ENV`] run-time switch.
    #[must_use]
    pub fn from_env() -> Self {
        let enabled = std::env::var(ENABLE_ENV).map(|v| v == "1").unwrap_or(false);
        Self::new(enabled)
    }

    /// Whether assertion recording is enabled for this registry.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.buffer.is_some()
    }

    /// Register a kernel launch and return the caller id to pass to it.
    ///
    /// The oldest launch record is evicted once the retention bound is
    /// reached; failures from an evicted launch still report their caller
    /// id, just without a kernel name.
    pub fn register_launch(&self, kernel_name: &str) -> u32 {
        let caller_id = self.next_caller_id.fetch_add(1, Ordering::SeqCst);
        let mut launches = self.launches.lock();
        if launches.len() == MAX_LAUNCH_RECORDS {
            launches.pop_front();
        }
        launches.push_back(LaunchRecord {
            caller_id,
            kernel_name: kernel_name.to_string(),
        });
        debug!("registered kernel launch '{kernel_name}' as caller {caller_id}");
        caller_id
    }

    /// Handle to the shared buffer for passing into a kernel launch.
    #[must_use]
    pub fn buffer(&self) -> Option<Arc<AssertionBuffer<CAP>>> {
        self.buffer.clone()
    }

    /// Kernel name recorded for a caller id, if still retained.
    #[must_use]
    pub fn kernel_name(&self, caller_id: u32) -> Option<String> {
        self.launches
            .lock()
            .iter()
            .find(|launch| launch.caller_id == caller_id)
            .map(|launch| launch.kernel_name.clone())
    }

    /// Read the buffer back into an owned failure report.
    ///
    /// Call after the launch has quiesced; entries past `written_count`
    /// are not yet valid and are excluded.
    #[must_use]
    pub fn snapshot(&self) -> FailureReport {
        let Some(buffer) = self.buffer.as_deref() else {
            return FailureReport::default();
        };
        let failures: Vec<ReportedFailure> = buffer
            .records()
            .map(|record| ReportedFailure::from_record(record, self.kernel_name(record.caller_id())))
            .collect();
        let report = FailureReport {
            assertion_count: buffer.assertion_count(),
            written_count: buffer.written_count(),
            dropped: buffer.dropped(),
            failures,
        };
        if !report.failures.is_empty() {
            error!(
                "{} device-side assertion failure(s) recorded",
                report.failures.len()
            );
        }
        if report.dropped > 0 {
            warn!(
                "{} assertion failure(s) dropped after the buffer filled",
                report.dropped
            );
        }
        report
    }

    /// Reset the buffer and launch log for the next launch.
    ///
    /// Fails if any kernel context still holds a buffer handle, since a
    /// reset under a live writer would break the slot-claim protocol.
    pub fn reset(&mut self) -> Result<(), RegistryError> {
        if let Some(buffer) = self.buffer.as_mut() {
            let outstanding = Arc::strong_count(buffer) - 1;
            match Arc::get_mut(buffer) {
                Some(buffer) => buffer.reset(),
                None => return Err(RegistryError::BufferShared(outstanding)),
            }
        }
        self.launches.lock().clear();
        self.next_caller_id.store(0, Ordering::SeqCst);
        Ok(())
    }
}

impl<const CAP: usize> Default for LaunchRegistry<CAP> {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_ids_are_monotonic() {
        let registry: LaunchRegistry<4> = LaunchRegistry::new(true);
        assert_eq!(registry.register_launch("gemm"), 0);
        assert_eq!(registry.register_launch("softmax"), 1);
        assert_eq!(registry.kernel_name(1).as_deref(), Some("softmax"));
        assert_eq!(registry.kernel_name(9), None);
    }

    #[test]
    fn disabled_registry_hands_out_no_buffer() {
        let registry: LaunchRegistry<4> = LaunchRegistry::new(false);
        assert!(!registry.is_enabled());
        assert!(registry.buffer().is_none());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn reset_requires_exclusive_buffer() {
        let mut registry: LaunchRegistry<4> = LaunchRegistry::new(true);
        let handle = registry.buffer().unwrap();
        assert!(matches!(
            registry.reset(),
            Err(RegistryError::BufferShared(1))
        ));
        drop(handle);
        registry.reset().unwrap();
        assert_eq!(registry.register_launch("gemm"), 0);
    }

    #[test]
    fn launch_log_is_bounded() {
        let registry: LaunchRegistry<4> = LaunchRegistry::new(true);
        for i in 0..(MAX_LAUNCH_RECORDS + 10) {
            registry.register_launch(&format!("kernel-{i}"));
        }
        assert_eq!(registry.launches.lock().len(), MAX_LAUNCH_RECORDS);
        // The oldest records were evicted.
        assert_eq!(registry.kernel_name(0), None);
    }
}
