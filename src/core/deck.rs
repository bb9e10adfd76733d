//! Deck module - infinite reshuffling draw sequence
//!
//! Holds two consecutive shuffled copies of the source deck in one buffer.
//! When popping vacates a half (crossing the midpoint or wrapping at the
//! end), that half is reshuffled in place with Fisher-Yates on the game
//! PRNG. The invariant this buys: `peek(i)` is valid for any `i` below the
//! source deck length without ever forcing a reshuffle mid-peek, so the
//! PRNG consumption depends only on how many items were *popped* - never on
//! how many were peeked. Replay determinism rests on that.

use crate::core::rng::GameRng;

/// An endless deck built from a finite source deck.
#[derive(Debug, Clone)]
pub struct InfiniteDeck<T: Copy> {
    /// Two shuffled copies of the source deck, back to back.
    buf: Vec<T>,
    /// Source deck length (half the buffer).
    size: usize,
    /// Next item to pop, an index into `buf`.
    cursor: usize,
    rng: GameRng,
}

impl<T: Copy> InfiniteDeck<T> {
    /// Build from a non-empty source deck, shuffling both halves up front.
    pub fn new(source: Vec<T>, mut rng: GameRng) -> Self {
        assert!(!source.is_empty(), "empty source deck");
        let size = source.len();
        let mut buf = Vec::with_capacity(size * 2);
        buf.extend_from_slice(&source);
        buf.extend_from_slice(&source);
        rng.shuffle(&mut buf[..size]);
        rng.shuffle(&mut buf[size..]);
        Self {
            buf,
            size,
            cursor: 0,
            rng,
        }
    }

    /// How far ahead [`peek`](Self::peek) may look.
    pub fn peek_limit(&self) -> usize {
        self.size
    }

    /// The item `i` draws ahead (0 = the next pop). Panics beyond the
    /// lookahead limit; anything further would not be settled yet.
    pub fn peek(&self, i: usize) -> T {
        assert!(i < self.size, "peek {i} beyond lookahead limit {}", self.size);
        self.buf[(self.cursor + i) % self.buf.len()]
    }

    /// Draw the next item. Reshuffles the half just vacated when the cursor
    /// crosses a half boundary.
    pub fn pop(&mut self) -> T {
        let item = self.buf[self.cursor];
        self.cursor += 1;

        if self.cursor == self.size {
            // First half fully consumed; lookahead now lives in the second.
            self.rng.shuffle(&mut self.buf[..self.size]);
        } else if self.cursor == self.size * 2 {
            self.cursor = 0;
            let size = self.size;
            self.rng.shuffle(&mut self.buf[size..]);
        }

        item
    }

    /// Hand the generator back (for games that share one PRNG stream).
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(seed: u32) -> InfiniteDeck<u32> {
        InfiniteDeck::new((0..9).collect(), GameRng::seeded(seed))
    }

    #[test]
    fn test_deck_pop_matches_peek() {
        let mut d = deck(5);
        for _ in 0..100 {
            let expected = d.peek(0);
            assert_eq!(d.pop(), expected);
        }
    }

    #[test]
    fn test_deck_each_half_is_a_permutation() {
        let mut d = deck(8);
        // Every window of `size` pops aligned to a half boundary contains
        // each source item exactly once.
        for _ in 0..6 {
            let mut half: Vec<u32> = (0..9).map(|_| d.pop()).collect();
            half.sort_unstable();
            assert_eq!(half, (0..9).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_deck_peek_does_not_change_pop_sequence() {
        let mut plain = deck(21);
        let mut peeked = deck(21);

        for step in 0..200 {
            // Hammer the lookahead in arbitrary patterns before every pop.
            for i in 0..peeked.peek_limit() {
                let _ = peeked.peek(i);
                let _ = peeked.peek((i * 7 + step) % peeked.peek_limit());
            }
            assert_eq!(plain.pop(), peeked.pop(), "diverged at pop {step}");
        }
    }

    #[test]
    fn test_deck_peek_is_stable_until_pop() {
        let d = deck(13);
        let first: Vec<u32> = (0..d.peek_limit()).map(|i| d.peek(i)).collect();
        let second: Vec<u32> = (0..d.peek_limit()).map(|i| d.peek(i)).collect();
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "beyond lookahead limit")]
    fn test_deck_peek_past_limit_panics() {
        let d = deck(1);
        let _ = d.peek(9);
    }

    #[test]
    fn test_deck_deterministic_for_same_seed() {
        let mut a = deck(77);
        let mut b = deck(77);
        for _ in 0..500 {
            assert_eq!(a.pop(), b.pop());
        }
    }
}
