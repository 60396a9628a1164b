#![no_main]

use std::sync::Arc;

use cardpool::policy::recency_pool::RecencyPool;
use libfuzzer_sys::fuzz_target;

type Build = fn(&u8, u8) -> Result<u16, ()>;

fn build(name: &u8, payload: u8) -> Result<u16, ()> {
    // payload 0 simulates a failed construction
    if payload == 0 {
        return Err(());
    }
    Ok(u16::from(*name) << 8 | u16::from(payload))
}

// Fuzz arbitrary fetch/touch/mark/remove sequences on RecencyPool
//
// After every operation storage and both recency sets must agree, the pool
// must stay within capacity, and protected names must still be stored.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks capacity (0-31, clamped by the pool)
    let capacity = (data[0] as usize) % 32;
    let mut pool = RecencyPool::<u8, u8, Build>::new(capacity, build);

    for chunk in data[1..].chunks_exact(3) {
        let op = chunk[0] % 7;
        let name = chunk[1] % 48;
        let arg = chunk[2];

        match op {
            0 => {
                let before = pool.len();
                if pool.fetch(&name, Some(arg)).is_err() {
                    assert_eq!(pool.len(), before);
                    assert!(!pool.contains(&name));
                }
            }
            1 => {
                let stored = pool.contains(&name);
                let hit = matches!(pool.fetch(&name, None), Ok(Some(_)));
                assert_eq!(hit, stored);
            }
            2 => {
                let stored = pool.contains(&name);
                assert_eq!(pool.touch(&name, None), stored);
            }
            3 => {
                pool.mark_stateful(&name, Arc::new(u16::from(arg)));
                assert!(pool.contains(&name));
            }
            4 => {
                pool.remove(&name);
                assert!(!pool.contains(&name));
            }
            5 => {
                let _ = pool.peek(&name);
            }
            6 => {
                if arg == 0 {
                    pool.clear();
                }
            }
            _ => unreachable!(),
        }

        assert!(pool.check_invariants().is_ok());
        assert!(pool.len() <= pool.capacity());
        assert!(pool.protected_len() <= pool.protected_capacity());
        for protected in pool.protected_order() {
            assert!(pool.contains(protected));
        }
    }
});
