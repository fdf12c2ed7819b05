//! Fuzz testing for opening untrusted bag regions.
//!
//! Arbitrary bytes are handed to `Bag::from_region`. Opening must either
//! fail cleanly or yield a bag whose reads never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use bagdb::{Bag, BagConfig, MemRegion};

fuzz_target!(|data: &[u8]| {
    let region = MemRegion::from_bytes(data.to_vec());

    if let Ok(bag) = Bag::from_region(region, BagConfig::default()) {
        let _ = bag.list();
        let _ = bag.stats();
        for entry in bag.entries() {
            if entry.is_err() {
                break;
            }
        }
    }
});
