#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure progression system that pays stardust for cleared stages and picks the next one.

use star_forge_core::{ProgressionSink, StageClear, StageNumber};
use tracing::debug;

/// Stardust paid for every cleared stage.
pub const CLEAR_REWARD: u32 = 100;

/// Extra stardust paid when a stage is cleared within its optimal move count.
pub const OPTIMAL_BONUS: u32 = 50;

/// Stardust granted for a single clear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reward {
    /// Flat payment for clearing the stage.
    pub base: u32,
    /// Payment for matching or beating the optimal move count.
    pub bonus: u32,
}

impl Reward {
    /// Computes the reward earned by `report`.
    #[must_use]
    pub fn for_clear(report: &StageClear) -> Self {
        let bonus = if report.move_count <= report.min_moves {
            OPTIMAL_BONUS
        } else {
            0
        };
        Self {
            base: CLEAR_REWARD,
            bonus,
        }
    }

    /// Sum of base payment and bonus.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.base.saturating_add(self.bonus)
    }
}

/// Player meta-progress: the current level and the stardust balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progression {
    level: StageNumber,
    stardust: u32,
    last_reward: Option<Reward>,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(StageNumber::new(1), 0)
    }
}

impl Progression {
    /// Creates progression state starting at `level` with `stardust` in the bank.
    #[must_use]
    pub const fn new(level: StageNumber, stardust: u32) -> Self {
        Self {
            level,
            stardust,
            last_reward: None,
        }
    }

    /// Level the player is currently on.
    #[must_use]
    pub const fn level(&self) -> StageNumber {
        self.level
    }

    /// Current stardust balance.
    #[must_use]
    pub const fn stardust(&self) -> u32 {
        self.stardust
    }

    /// Reward paid for the most recent clear, if any.
    #[must_use]
    pub const fn last_reward(&self) -> Option<Reward> {
        self.last_reward
    }

    /// Deducts `amount` from the balance.
    ///
    /// Returns `false` and leaves the balance untouched when it is too low.
    pub fn spend(&mut self, amount: u32) -> bool {
        match self.stardust.checked_sub(amount) {
            Some(remaining) => {
                self.stardust = remaining;
                true
            }
            None => false,
        }
    }
}

impl ProgressionSink for Progression {
    fn on_stage_clear(&mut self, report: &StageClear) {
        let reward = Reward::for_clear(report);
        self.stardust = self.stardust.saturating_add(reward.total());
        self.last_reward = Some(reward);
        self.level = report.stage.next();
        debug!(
            stage = %report.stage,
            moves = report.move_count,
            min = report.min_moves,
            reward = reward.total(),
            balance = self.stardust,
            "stage reward paid"
        );
    }

    fn next_stage(&self) -> Option<StageNumber> {
        Some(self.level)
    }
}
