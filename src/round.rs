//! Letter set and per-round sampling.

use rand::Rng;
use rand::seq::SliceRandom;

/// The fixed letter set, in order.
pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Letters shown per round.
pub const CHOICES: usize = 3;

pub fn is_letter(c: char) -> bool {
    ALPHABET.contains(&c)
}

/// Three distinct letters on screen plus the position of the one being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    letters: [char; CHOICES],
    target: usize,
}

impl Round {
    /// Validated constructor: letters must come from `ALPHABET`, be pairwise
    /// distinct, and `target` must index one of them.
    #[cfg(test)]
    pub fn new(letters: [char; CHOICES], target: usize) -> Option<Self> {
        if target >= CHOICES || !letters.iter().all(|c| is_letter(*c)) {
            return None;
        }
        for i in 0..CHOICES {
            if letters[i + 1..].contains(&letters[i]) {
                return None;
            }
        }
        Some(Self { letters, target })
    }

    /// Draw a fresh round: a Fisher-Yates prefix of the alphabet gives three
    /// letters without replacement, then one position is picked as the target.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut pool = ALPHABET;
        let (picked, _) = pool.partial_shuffle(rng, CHOICES);
        let mut letters = [' '; CHOICES];
        letters.copy_from_slice(picked);
        Self {
            letters,
            target: rng.gen_range(0..CHOICES),
        }
    }

    pub fn letters(&self) -> [char; CHOICES] {
        self.letters
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn target_letter(&self) -> char {
        self.letters[self.target]
    }

    pub fn position_of(&self, letter: char) -> Option<usize> {
        self.letters.iter().position(|c| *c == letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn new_rejects_bad_rounds() {
        assert!(Round::new(['B', 'Q', 'M'], 2).is_some());
        assert!(Round::new(['B', 'B', 'M'], 0).is_none());
        assert!(Round::new(['B', 'Q', 'M'], 3).is_none());
        assert!(Round::new(['b', 'Q', 'M'], 0).is_none());
        assert!(Round::new(['1', 'Q', 'M'], 0).is_none());
    }

    #[test]
    fn accessors() {
        let round = Round::new(['B', 'Q', 'M'], 2).unwrap();
        assert_eq!(round.target_letter(), 'M');
        assert_eq!(round.position_of('Q'), Some(1));
        assert_eq!(round.position_of('Z'), None);
    }

    #[test]
    fn prop_generated_rounds_are_valid() {
        fn property(seed: u64) -> bool {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20).all(|_| {
                let round = Round::generate(&mut rng);
                let letters = round.letters();
                Round::new(letters, round.target()).is_some()
                    && letters.contains(&round.target_letter())
            })
        }

        let mut qc = quickcheck::QuickCheck::new().tests(50);
        qc.quickcheck(property as fn(u64) -> bool);
    }

    #[test]
    fn sampling_covers_letters_and_positions() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut letter_hits = [0u32; 26];
        let mut target_hits = [0u32; CHOICES];
        let rounds = 26_000;
        for _ in 0..rounds {
            let round = Round::generate(&mut rng);
            for c in round.letters() {
                letter_hits[(c as u8 - b'A') as usize] += 1;
            }
            target_hits[round.target()] += 1;
        }

        // 每个字母期望出现 3000 次，每个位置期望 ~8667 次
        let expected_letter = rounds * CHOICES as u32 / 26;
        for hits in letter_hits {
            assert!(hits.abs_diff(expected_letter) < expected_letter / 10, "{hits}");
        }
        let expected_target = rounds / CHOICES as u32;
        for hits in target_hits {
            assert!(hits.abs_diff(expected_target) < expected_target / 10, "{hits}");
        }
    }
}
