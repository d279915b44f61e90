//! Rule block scheduler.
//!
//! Owns the fixed block-to-rule mapping for a session and the position of
//! the next trial within it. Pure counter: the block layout is validated and
//! fixed at construction, so the scheduler can never enter an invalid state.

use tracing::info;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::types::Rule;

/// Position of a trial inside the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPosition {
    /// 1-based block number.
    pub block: u32,
    /// 1-based position within the block.
    pub trial_in_block: u32,
}

/// Rule context for the next trial to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    pub trial_number: u32,
    pub rule: Rule,
    /// Rule of the immediately preceding block; `None` in block 1.
    pub previous_rule: Option<Rule>,
    pub position: BlockPosition,
    /// First trial of a post-switch block.
    pub rule_switch: bool,
}

/// Outcome of advancing past one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStep {
    /// Next trial stays in the same block.
    Continue,
    /// Next trial opens a new block under a different rule.
    RuleSwitch { from: Rule, to: Rule },
    /// The final block has finished; no further trials.
    Complete,
}

/// Sequences trials into rule blocks.
#[derive(Debug, Clone)]
pub struct RuleBlockScheduler {
    rules: Vec<Rule>,
    block_size: u32,
    /// 0-based index of the active block.
    block_idx: usize,
    /// Trials already presented in the active block.
    trials_in_block: u32,
    complete: bool,
}

impl RuleBlockScheduler {
    /// Build a scheduler, rejecting block layouts it cannot run.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rules: config.rules(),
            block_size: config.block_size,
            block_idx: 0,
            trials_in_block: 0,
            complete: false,
        })
    }

    /// Number of blocks in the session.
    pub fn block_count(&self) -> u32 {
        self.rules.len() as u32
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Total trials the session will present.
    pub fn total_trials(&self) -> u32 {
        self.block_count() * self.block_size
    }

    /// Rule of a 1-based block number.
    pub fn rule_for_block(&self, block: u32) -> Option<Rule> {
        block
            .checked_sub(1)
            .and_then(|idx| self.rules.get(idx as usize))
            .copied()
    }

    /// Block and in-block position of a 1-based trial number.
    pub fn position_of(&self, trial_number: u32) -> Option<BlockPosition> {
        if trial_number == 0 || trial_number > self.total_trials() {
            return None;
        }
        let idx = trial_number - 1;
        Some(BlockPosition {
            block: idx / self.block_size + 1,
            trial_in_block: idx % self.block_size + 1,
        })
    }

    /// Rule active when the given trial is presented.
    pub fn rule_at(&self, trial_number: u32) -> Option<Rule> {
        self.position_of(trial_number)
            .and_then(|pos| self.rule_for_block(pos.block))
    }

    /// Rule of the active block.
    pub fn current_rule(&self) -> Rule {
        self.rules[self.block_idx]
    }

    /// Rule of the block before the active one.
    pub fn previous_rule(&self) -> Option<Rule> {
        self.block_idx
            .checked_sub(1)
            .map(|idx| self.rules[idx])
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Context for the next trial, or `None` once the session is complete.
    pub fn context(&self) -> Option<RuleContext> {
        if self.complete {
            return None;
        }
        Some(RuleContext {
            trial_number: self.block_idx as u32 * self.block_size + self.trials_in_block + 1,
            rule: self.current_rule(),
            previous_rule: self.previous_rule(),
            position: BlockPosition {
                block: self.block_idx as u32 + 1,
                trial_in_block: self.trials_in_block + 1,
            },
            rule_switch: self.block_idx > 0 && self.trials_in_block == 0,
        })
    }

    /// Move past the trial just presented.
    pub fn advance(&mut self) -> SchedulerStep {
        if self.complete {
            return SchedulerStep::Complete;
        }

        self.trials_in_block += 1;
        if self.trials_in_block < self.block_size {
            return SchedulerStep::Continue;
        }

        if self.block_idx + 1 >= self.rules.len() {
            self.complete = true;
            info!(blocks = self.rules.len(), "Final block finished");
            return SchedulerStep::Complete;
        }

        let from = self.current_rule();
        self.block_idx += 1;
        self.trials_in_block = 0;
        let to = self.current_rule();
        info!(block = self.block_idx + 1, %from, %to, "Rule switch");
        SchedulerStep::RuleSwitch { from, to }
    }
}
