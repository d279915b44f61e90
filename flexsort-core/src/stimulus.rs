//! Stimulus cards and the seeded deck they are drawn from.
//!
//! The subject sorts each stimulus onto one of four fixed reference cards.
//! Every stimulus the deck produces matches a *different* reference card on
//! each attribute, so the correct card under one rule is never the correct
//! card under another. That is what makes "still applying the old rule"
//! observable as a distinct error.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::types::Rule;

/// Card color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

/// Card shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Triangle,
    Star,
    Cross,
    Circle,
}

/// A card: color, shape, and number of symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stimulus {
    pub color: Color,
    pub shape: Shape,
    pub count: u8,
}

/// The four reference cards the subject sorts onto, indexed by choice.
pub const REFERENCE_CARDS: [Stimulus; 4] = [
    Stimulus {
        color: Color::Red,
        shape: Shape::Triangle,
        count: 1,
    },
    Stimulus {
        color: Color::Green,
        shape: Shape::Star,
        count: 2,
    },
    Stimulus {
        color: Color::Yellow,
        shape: Shape::Cross,
        count: 3,
    },
    Stimulus {
        color: Color::Blue,
        shape: Shape::Circle,
        count: 4,
    },
];

impl Stimulus {
    /// Whether two cards share the attribute named by `rule`.
    #[must_use]
    pub fn matches_on(&self, other: &Stimulus, rule: Rule) -> bool {
        match rule {
            Rule::Color => self.color == other.color,
            Rule::Shape => self.shape == other.shape,
            Rule::Number => self.count == other.count,
        }
    }

    /// Index of the reference card this stimulus matches under `rule`.
    #[must_use]
    pub fn matching_card(&self, rule: Rule) -> Option<u8> {
        REFERENCE_CARDS
            .iter()
            .position(|card| self.matches_on(card, rule))
            .map(|idx| idx as u8)
    }

    /// True when each rule points at a different reference card.
    #[must_use]
    pub fn is_unambiguous(&self) -> bool {
        match (
            self.matching_card(Rule::Color),
            self.matching_card(Rule::Shape),
            self.matching_card(Rule::Number),
        ) {
            (Some(c), Some(s), Some(n)) => c != s && s != n && c != n,
            _ => false,
        }
    }
}

/// Seeded source of unambiguous stimuli.
#[derive(Debug, Clone)]
pub struct StimulusDeck {
    seed: u64,
    rng: StdRng,
}

impl StimulusDeck {
    /// Create a deck; `None` picks a seed from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this deck was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw the next stimulus.
    pub fn draw(&mut self) -> Stimulus {
        let mut order = [0usize, 1, 2, 3];
        order.shuffle(&mut self.rng);
        Stimulus {
            color: REFERENCE_CARDS[order[0]].color,
            shape: REFERENCE_CARDS[order[1]].shape,
            count: REFERENCE_CARDS[order[2]].count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_cards_match_themselves_on_every_rule() {
        for (idx, card) in REFERENCE_CARDS.iter().enumerate() {
            for rule in Rule::ALL {
                assert_eq!(card.matching_card(rule), Some(idx as u8));
            }
        }
    }

    #[test]
    fn test_deck_only_draws_unambiguous_stimuli() {
        let mut deck = StimulusDeck::new(Some(7));
        for _ in 0..200 {
            assert!(deck.draw().is_unambiguous());
        }
    }

    #[test]
    fn test_same_seed_draws_same_sequence() {
        let mut a = StimulusDeck::new(Some(42));
        let mut b = StimulusDeck::new(Some(42));
        for _ in 0..36 {
            assert_eq!(a.draw(), b.draw());
        }
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_reference_card_is_ambiguous() {
        assert!(!REFERENCE_CARDS[0].is_unambiguous());
    }
}
