//! Property Tests
//!
//! Model-based checks over arbitrary operation sequences: generation stamps
//! strictly increase and never repeat, the registry mirrors the set of live
//! transactions exactly, stale handles stay inert, and commit refuses iff a
//! termination was requested.

use proptest::prelude::*;
use std::sync::Arc;
use vertexdb::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Begin,
    Commit,
    Rollback,
    Mark,
    PokeStale,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Begin),
        Just(Op::Commit),
        Just(Op::Rollback),
        Just(Op::Mark),
        Just(Op::PokeStale),
    ]
}

proptest! {
    #[test]
    fn lifecycle_invariants_hold_for_any_op_sequence(
        ops in proptest::collection::vec(op_strategy(), 1..128)
    ) {
        let kernel = Kernel::builder().pool_capacity(2).build();

        // model: the live transactions we own, and handles whose logical
        // transaction is over
        let mut live: Vec<(Arc<KernelTransaction>, TransactionHandle, bool)> = Vec::new();
        let mut stale: Vec<TransactionHandle> = Vec::new();
        let mut last_stamp = 0u64;

        for op in ops {
            match op {
                Op::Begin => {
                    let (tx, handle) = kernel
                        .begin_transaction(TransactionType::Explicit, AccessMode::Write)
                        .unwrap();
                    prop_assert!(
                        handle.generation().as_u64() > last_stamp,
                        "stamps must strictly increase"
                    );
                    last_stamp = handle.generation().as_u64();
                    live.push((tx, handle, false));
                }
                Op::Commit => {
                    if let Some((tx, handle, marked)) = live.pop() {
                        let result = tx.commit();
                        prop_assert_eq!(
                            result.is_err(),
                            marked,
                            "commit refuses iff termination was requested"
                        );
                        stale.push(handle);
                    }
                }
                Op::Rollback => {
                    if let Some((tx, handle, _marked)) = live.pop() {
                        tx.rollback().unwrap();
                        stale.push(handle);
                    }
                }
                Op::Mark => {
                    if let Some((_tx, handle, marked)) = live.last_mut() {
                        prop_assert!(handle.mark_for_termination(TerminationReason::Timeout));
                        *marked = true;
                    }
                }
                Op::PokeStale => {
                    if let Some(handle) = stale.last() {
                        prop_assert!(!handle.is_open(), "finished transactions stay closed");
                        prop_assert!(
                            !handle.mark_for_termination(TerminationReason::Terminated),
                            "stale handles must fail closed"
                        );
                    }
                }
            }

            // the registry mirrors the live set exactly
            prop_assert_eq!(kernel.active_count(), live.len());
            prop_assert_eq!(kernel.list_open_transaction_handles().len(), live.len());

            // no occupant carries a termination it did not earn
            for (tx, _handle, marked) in &live {
                if !*marked {
                    prop_assert!(tx.termination_reason().is_none());
                }
            }
        }

        for (tx, handle, _marked) in live.drain(..) {
            tx.close().unwrap();
            prop_assert!(!handle.is_open());
        }
        prop_assert_eq!(kernel.active_count(), 0);
    }

    #[test]
    fn recycled_slots_never_honor_old_stamps(reuses in 2usize..32) {
        let kernel = Kernel::builder().pool_capacity(1).build();
        let mut retired: Vec<TransactionHandle> = Vec::new();

        for _ in 0..reuses {
            let (tx, handle) = kernel
                .begin_transaction(TransactionType::Explicit, AccessMode::Write)
                .unwrap();

            for old in &retired {
                prop_assert!(!old.is_underlying_transaction(&tx));
                prop_assert!(!old.mark_for_termination(TerminationReason::Terminated));
            }
            prop_assert!(
                tx.termination_reason().is_none(),
                "no stale request may leak into a new occupant"
            );

            tx.commit().unwrap();
            retired.push(handle);
        }

        prop_assert_eq!(kernel.stats().allocated_objects, 1);
    }
}
