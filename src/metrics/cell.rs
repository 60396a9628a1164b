use std::cell::Cell;

/// Counter bumped from `&self` methods.
///
/// `Send` but not `Sync`; share a pool across threads through
/// `ConcurrentRecencyPool`, which serializes every access.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }
}
