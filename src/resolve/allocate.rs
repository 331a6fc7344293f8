//! Footnote identifier allocation.
//!
//! Synthetic footnotes must never reuse an identifier that the author wrote by
//! hand, and must never reuse one handed out earlier in the same pass. The
//! allocator starts from a citation's rank and walks upward until both hold,
//! then raises its watermark to the value it returned.

use slog::trace;
use std::collections::HashSet;

/// A collision-avoiding, strictly increasing identifier allocator.
///
/// Each allocation pass owns its own allocator. The set of existing
/// identifiers is shared and never modified.
#[derive(Debug)]
pub struct IdAllocator<'a> {
    existing: &'a HashSet<String>,
    watermark: usize,
}

impl<'a> IdAllocator<'a> {
    pub fn new(existing: &'a HashSet<String>) -> IdAllocator<'a> {
        IdAllocator {
            existing,
            watermark: 0,
        }
    }

    /// Allocate an identifier for a citation of the given rank.
    pub fn allocate(&mut self, rank: usize) -> usize {
        let mut candidate = rank;
        while candidate <= self.watermark || self.existing.contains(&candidate.to_string()) {
            candidate += 1;
        }

        if candidate != rank {
            trace!(
                slog_scope::logger(),
                "Rank {} moved to identifier {}",
                rank,
                candidate
            );
        }

        self.watermark = candidate;
        candidate
    }

    /// The highest identifier allocated so far, or 0.
    #[cfg(test)]
    pub(crate) fn watermark(&self) -> usize {
        self.watermark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_collisions() {
        let set = HashSet::new();
        let mut alloc = IdAllocator::new(&set);

        assert_eq!(alloc.allocate(1), 1);
        assert_eq!(alloc.allocate(2), 2);
        assert_eq!(alloc.allocate(3), 3);
        assert_eq!(alloc.watermark(), 3);
    }

    #[test]
    fn skips_existing() {
        let set = existing(&["1"]);
        let mut alloc = IdAllocator::new(&set);

        assert_eq!(alloc.allocate(1), 2);
    }

    #[test]
    fn stays_above_watermark() {
        let set = existing(&["2", "3"]);
        let mut alloc = IdAllocator::new(&set);

        // 1 is free; 2 and 3 are taken, so rank 2 lands on 4 and rank 3
        // must then move past 4.
        assert_eq!(alloc.allocate(1), 1);
        assert_eq!(alloc.allocate(2), 4);
        assert_eq!(alloc.allocate(3), 5);
    }

    #[test]
    fn non_numeric_existing_ids_never_collide() {
        let set = existing(&["note", "a1"]);
        let mut alloc = IdAllocator::new(&set);

        assert_eq!(alloc.allocate(1), 1);
    }

    #[test]
    fn independent_allocators() {
        let set = existing(&["1"]);
        let mut refs = IdAllocator::new(&set);
        let mut defs = IdAllocator::new(&set);

        assert_eq!(refs.allocate(1), 2);
        assert_eq!(refs.allocate(2), 3);
        assert_eq!(defs.allocate(1), 2);
    }
}
