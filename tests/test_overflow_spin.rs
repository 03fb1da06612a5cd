// CLASSIFICATION: COMMUNITY
// Filename: test_overflow_spin.rs v0.2
// Date Modified: 2026-08-27
// Author: Lukas Bower

use std::sync::{Arc, Barrier};
use std::thread;

use devassert::{record_assertion_failure, AssertionBuffer};

fn report<const CAP: usize>(buffer: &AssertionBuffer<CAP>, message: &str, lane: u32) {
    record_assertion_failure(
        Some(buffer),
        message,
        "kernels/checks.rs",
        "checks::kernel",
        23,
        2,
        [0, 0, 0],
        [lane, 0, 0],
    );
}

#[test]
fn five_threads_against_two_slots() {
    let buffer: Arc<AssertionBuffer<2>> = Arc::new(AssertionBuffer::new());
    let barrier = Arc::new(Barrier::new(5));

    let workers: Vec<_> = (0..5)
        .map(|lane| {
            let buffer = Arc::clone(&buffer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                report(&buffer, &format!("fail-{lane}"), lane);
            })
        })
        .collect();
    // Every call returns, including the three that found the buffer full.
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(buffer.assertion_count(), 5);
    assert_eq!(buffer.written_count(), 2);
    assert_eq!(buffer.dropped(), 3);
    assert_eq!(buffer.records().count(), 2);
    for record in buffer.records() {
        assert!(record.message().starts_with("fail-"));
    }
}

#[test]
fn overflowing_call_waits_for_accepted_writes() {
    let buffer: Arc<AssertionBuffer<2>> = Arc::new(AssertionBuffer::new());
    report(&buffer, "fail-0", 0);
    report(&buffer, "fail-1", 1);

    let barrier = Arc::new(Barrier::new(3));
    let workers: Vec<_> = (2..5)
        .map(|lane| {
            let buffer = Arc::clone(&buffer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                report(&buffer, "late", lane);
                // An overflowing call may only return once every accepted
                // slot has been fully written.
                assert_eq!(buffer.written_count(), 2);
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(buffer.assertion_count(), 5);
    assert_eq!(buffer.written_count(), 2);
    let messages: Vec<&str> = buffer.records().map(|r| r.message()).collect();
    assert_eq!(messages, ["fail-0", "fail-1"]);
}

#[test]
fn boundary_claim_at_capacity_is_dropped() {
    let buffer: AssertionBuffer<2> = AssertionBuffer::new();
    report(&buffer, "fail-0", 0);
    report(&buffer, "fail-1", 1);
    // The third claim gets nid == 2 == capacity and must not write.
    report(&buffer, "overflow", 2);
    assert_eq!(buffer.assertion_count(), 3);
    assert_eq!(buffer.written_count(), 2);
    assert!(buffer.records().all(|r| r.message() != "overflow"));
}
