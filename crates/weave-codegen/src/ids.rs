//! Collision-free short identifiers for one compile run

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Issues random identifiers, never the same one twice
///
/// Identifiers are valid as function path segments, fake player names and
/// host identifier suffixes.
#[derive(Debug)]
pub struct IdAllocator {
    rng: StdRng,
    issued: HashSet<String>,
    length: usize,
}

impl IdAllocator {
    pub fn new(length: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), length)
    }

    /// Deterministic allocator for reproducible output
    pub fn seeded(seed: u64, length: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), length)
    }

    fn with_rng(rng: StdRng, length: usize) -> Self {
        Self {
            rng,
            issued: HashSet::new(),
            length: length.max(1),
        }
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let id: String = (0..self.length)
                .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
                .collect();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Number of identifiers issued so far
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_even_when_short() {
        let mut ids = IdAllocator::seeded(7, 1);
        let issued: HashSet<String> = (0..ALPHABET.len()).map(|_| ids.next_id()).collect();
        assert_eq!(issued.len(), ALPHABET.len());
    }

    #[test]
    fn ids_use_the_alphabet() {
        let id = IdAllocator::default().next_id();
        assert_eq!(id.len(), 8);
        assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn seeded_allocators_repeat() {
        let mut a = IdAllocator::seeded(42, 8);
        let mut b = IdAllocator::seeded(42, 8);
        assert_eq!(a.next_id(), b.next_id());
    }
}
