//! Scripted subjects for driving simulated sessions.

use clap::ValueEnum;
use flexsort_core::{REFERENCE_CARDS, Rule, RuleContext, Stimulus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Response pattern of a simulated subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Always sorts by the active rule.
    Perfect,
    /// Repeats the retired rule for three trials after each switch.
    Perseverative,
    /// Keeps sorting by color for the whole session.
    Stuck,
    /// Picks a card at random.
    Random,
}

impl Profile {
    /// Response time range in seconds.
    fn response_times(&self) -> (f64, f64) {
        match self {
            Self::Perfect => (0.8, 1.6),
            Self::Perseverative => (1.2, 2.6),
            Self::Stuck => (1.8, 3.6),
            Self::Random => (0.5, 4.5),
        }
    }
}

/// A deterministic stand-in for a human subject.
#[derive(Debug)]
pub struct ScriptedSubject {
    profile: Profile,
    rng: StdRng,
}

impl ScriptedSubject {
    pub fn new(profile: Profile, seed: u64) -> Self {
        Self {
            profile,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose a card and a response time for the pending trial.
    pub fn respond(&mut self, ctx: &RuleContext, stimulus: &Stimulus) -> (u8, f64) {
        let choice = match self.profile {
            Profile::Perfect => card_for(stimulus, ctx.rule),
            Profile::Perseverative => match ctx.previous_rule {
                Some(prev) if (2..=4).contains(&ctx.position.trial_in_block) => {
                    card_for(stimulus, prev)
                }
                _ => card_for(stimulus, ctx.rule),
            },
            Profile::Stuck => card_for(stimulus, Rule::Color),
            Profile::Random => self.rng.gen_range(0..REFERENCE_CARDS.len() as u8),
        };
        let (low, high) = self.profile.response_times();
        (choice, self.rng.gen_range(low..high))
    }
}

// Deck stimuli always match exactly one reference card per rule.
fn card_for(stimulus: &Stimulus, rule: Rule) -> u8 {
    stimulus.matching_card(rule).unwrap_or(0)
}
