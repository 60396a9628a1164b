#![no_main]

use cardpool::ds::RecencySet;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary touch/remove/pop sequences on RecencySet
//
// Mirrors every operation on a Vec and checks iteration order matches.
fuzz_target!(|data: &[u8]| {
    let mut set: RecencySet<u8> = RecencySet::new();
    let mut model: Vec<u8> = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 4;
        let key = pair[1] % 32;

        match op {
            0 => {
                let inserted = set.touch(&key);
                assert_eq!(inserted, !model.contains(&key));
                model.retain(|&k| k != key);
                model.push(key);
            }
            1 => {
                let removed = set.remove(&key);
                assert_eq!(removed, model.contains(&key));
                model.retain(|&k| k != key);
            }
            2 => {
                let popped = set.pop_oldest();
                let expected = if model.is_empty() {
                    None
                } else {
                    Some(model.remove(0))
                };
                assert_eq!(popped, expected);
            }
            3 => {
                assert_eq!(set.contains(&key), model.contains(&key));
            }
            _ => unreachable!(),
        }

        set.debug_validate_invariants();
        assert_eq!(set.len(), model.len());
        assert!(set.iter().copied().eq(model.iter().copied()));
    }
});
