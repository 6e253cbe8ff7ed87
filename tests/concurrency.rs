//! Concurrency Stress Tests
//!
//! Many executors churning begin/close over a tiny pool while hostile
//! monitors enumerate the registry and fire termination requests from stale
//! snapshots. Nothing here may panic, double-register, or leak a registry
//! entry.

use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use vertexdb::prelude::*;

const WRITERS: usize = 16;
const ITERATIONS: usize = 100;
const MONITORS: usize = 4;

#[test]
fn concurrent_lifecycle_with_hostile_monitors() {
    let kernel = Arc::new(Kernel::builder().pool_capacity(4).build());
    let writers_done = Arc::new(AtomicBool::new(false));
    let stamps_seen = Arc::new(Mutex::new(HashSet::new()));

    let writers: Vec<_> = (0..WRITERS)
        .map(|_| {
            let kernel = Arc::clone(&kernel);
            let stamps_seen = Arc::clone(&stamps_seen);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..ITERATIONS {
                    let (tx, handle) = kernel
                        .begin_transaction(TransactionType::Explicit, AccessMode::Write)
                        .expect("begin");
                    assert!(
                        stamps_seen.lock().unwrap().insert(handle.generation()),
                        "a generation stamp was issued twice"
                    );
                    match rng.gen_range(0..3) {
                        // commit may be refused if a monitor marked us; both
                        // outcomes are legal, panicking is not
                        0 => {
                            let _ = tx.commit();
                        }
                        1 => tx.rollback().expect("rollback"),
                        _ => tx.close().expect("close"),
                    }
                }
            })
        })
        .collect();

    let monitors: Vec<_> = (0..MONITORS)
        .map(|_| {
            let kernel = Arc::clone(&kernel);
            let writers_done = Arc::clone(&writers_done);
            thread::spawn(move || {
                let mut previous: Vec<TransactionHandle> = Vec::new();
                while !writers_done.load(Ordering::Relaxed) {
                    let current = kernel.list_open_transaction_handles();
                    assert!(
                        current.len() <= WRITERS,
                        "registry can never exceed the number of live executors"
                    );
                    // fire at the previous snapshot: most of these handles are
                    // stale by now and must fail closed
                    for handle in previous.drain(..) {
                        let _ = handle.mark_for_termination(TerminationReason::Terminated);
                        let _ = handle.is_open();
                    }
                    previous = current;
                    thread::yield_now();
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().expect("writer thread");
    }
    writers_done.store(true, Ordering::Relaxed);
    for monitor in monitors {
        monitor.join().expect("monitor thread");
    }

    // quiescent: no live entries, every stamp unique, nothing lost
    assert_eq!(kernel.active_count(), 0);
    assert!(kernel.list_open_transaction_handles().is_empty());

    let stats = kernel.stats();
    assert_eq!(stats.started_total, (WRITERS * ITERATIONS) as u64);
    assert_eq!(stamps_seen.lock().unwrap().len(), WRITERS * ITERATIONS);
    assert!(
        stats.idle_pooled_objects <= 4,
        "pool retention stays within capacity"
    );
}

#[test]
fn terminate_all_races_running_executors_safely() {
    let kernel = Arc::new(Kernel::builder().pool_capacity(2).build());

    let writers: Vec<_> = (0..8)
        .map(|_| {
            let kernel = Arc::clone(&kernel);
            thread::spawn(move || {
                let mut refused = 0usize;
                for _ in 0..50 {
                    let (tx, _handle) = kernel
                        .begin_transaction(TransactionType::Implicit, AccessMode::Read)
                        .expect("begin");
                    if tx.commit().is_err() {
                        refused += 1;
                    }
                }
                refused
            })
        })
        .collect();

    let killer = {
        let kernel = Arc::clone(&kernel);
        thread::spawn(move || {
            let mut marked_total = 0usize;
            for _ in 0..200 {
                marked_total += kernel.terminate_all(TerminationReason::Terminated);
                thread::yield_now();
            }
            marked_total
        })
    };

    let mut refused_total = 0;
    for writer in writers {
        refused_total += writer.join().expect("writer thread");
    }
    let marked_total = killer.join().expect("killer thread");

    // every refusal traces back to a mark; counters drift (a marked
    // transaction may roll up in a later sweep too) but the direction holds
    assert!(refused_total <= marked_total);
    assert_eq!(kernel.active_count(), 0);
}
