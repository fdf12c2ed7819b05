//! Fuzz testing for operation sequences.
//!
//! Runs arbitrary insert/remove/grow sequences against a small in-memory
//! bag and audits the entry chain after every step.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use bagdb::{Bag, BagConfig, MemRegion};

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(String),
    Remove(String),
    Grow,
}

fuzz_target!(|ops: Vec<Op>| {
    let Ok(config) = BagConfig::new(256, 64 * 1024) else {
        return;
    };
    let Ok(mut bag) = Bag::from_region(MemRegion::new(), config) else {
        return;
    };

    for op in ops.into_iter().take(256) {
        let _ = match op {
            Op::Insert(key) => bag.insert(&key),
            Op::Remove(key) => bag.remove(&key),
            Op::Grow => bag.grow().map(|_| ()),
        };

        assert!(bag.check().is_ok());
        assert!(!bag.is_poisoned());
    }
});
