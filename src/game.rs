//! Round lifecycle and scoring.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::round::{CHOICES, Round};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoring {
    pub reward: u32,
    pub penalty: u32,
    /// Time between a correct answer and the next round.
    pub next_round_delay: Duration,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            reward: 10,
            penalty: 2,
            next_round_delay: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingAnswer,
    CorrectFeedback,
    WrongFeedback,
}

/// Visual marking of a letter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    Unmarked,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
    /// Selection outside the current round, or while the round is already won.
    Ignored,
}

pub struct Game {
    scoring: Scoring,
    rng: StdRng,
    round: Round,
    marks: [Mark; CHOICES],
    phase: Phase,
    score: u32,
    next_round_at: Option<Instant>,
}

impl Game {
    pub fn new(scoring: Scoring) -> Self {
        Self::with_rng(scoring, StdRng::from_entropy())
    }

    pub fn with_rng(scoring: Scoring, mut rng: StdRng) -> Self {
        let round = Round::generate(&mut rng);
        Self::with_round(scoring, rng, round)
    }

    /// Start from a known round; later rounds are drawn from `rng`.
    pub fn with_round(scoring: Scoring, rng: StdRng, round: Round) -> Self {
        Self {
            scoring,
            rng,
            round,
            marks: [Mark::Unmarked; CHOICES],
            phase: Phase::AwaitingAnswer,
            score: 0,
            next_round_at: None,
        }
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn marks(&self) -> [Mark; CHOICES] {
        self.marks
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    #[cfg(test)]
    pub fn next_round_at(&self) -> Option<Instant> {
        self.next_round_at
    }

    /// Evaluate the letter at `position` against the round's target.
    pub fn select(&mut self, position: usize, now: Instant) -> Outcome {
        if position >= CHOICES || self.phase == Phase::CorrectFeedback {
            return Outcome::Ignored;
        }

        if position == self.round.target() {
            self.marks[position] = Mark::Correct;
            self.score = self.score.saturating_add(self.scoring.reward);
            self.phase = Phase::CorrectFeedback;
            self.next_round_at = Some(now + self.scoring.next_round_delay);
            log::info!(
                "Correct: {} (score {})",
                self.round.target_letter(),
                self.score
            );
            Outcome::Correct
        } else {
            self.marks[position] = Mark::Wrong;
            self.score = self.score.saturating_sub(self.scoring.penalty);
            self.phase = Phase::WrongFeedback;
            log::info!(
                "Wrong: picked {} for {} (score {})",
                self.round.letters()[position],
                self.round.target_letter(),
                self.score
            );
            Outcome::Wrong
        }
    }

    /// Select by letter; letters not on screen are ignored.
    pub fn select_letter(&mut self, letter: char, now: Instant) -> Outcome {
        match self.round.position_of(letter.to_ascii_uppercase()) {
            Some(position) => self.select(position, now),
            None => Outcome::Ignored,
        }
    }

    /// Start the next round once the feedback delay has passed.
    /// Returns true when a new round began.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_round_at {
            Some(at) if now >= at => {
                self.start_round();
                true
            }
            _ => false,
        }
    }

    fn start_round(&mut self) {
        self.round = Round::generate(&mut self.rng);
        self.marks = [Mark::Unmarked; CHOICES];
        self.phase = Phase::AwaitingAnswer;
        self.next_round_at = None;
        log::debug!("New round: {:?}", self.round.letters());
    }
}
