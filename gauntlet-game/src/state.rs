//! Game progress model.
//!
//! The persisted JSON shape is the one the browser client reads:
//! `{"ideaName", "ideaDescription", "paid", "levels": {"1": {...}}}`.

use std::collections::BTreeMap;

use gauntlet_judge::{Level, Verdict};
use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Progress on a single level. Absent from the map means "not attempted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct LevelState {
    /// Set by the first PASS, never cleared except by reset
    pub passed: bool,
    /// One per judging call, whatever the outcome
    pub attempts: u32,
    /// Text of the latest submission
    pub last_input: String,
    /// Latest verdict returned by a judge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<Verdict>,
}

/// Where a level stands for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Locked,
    Unattempted,
    Failed,
    Passed,
}

/// Aggregate root for one player's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub idea_name: String,
    pub idea_description: String,
    /// Unlock flag for levels 3-5
    pub paid: bool,
    #[serde(default)]
    #[cfg_attr(feature = "typescript", ts(type = "Record<number, LevelState>"))]
    pub levels: BTreeMap<Level, LevelState>,
}

impl GameState {
    /// Start a run for an idea. Both fields are trimmed and must be non-empty.
    pub fn new(idea_name: &str, idea_description: &str) -> Result<Self, GameError> {
        let (name, description) = (idea_name.trim(), idea_description.trim());
        if name.is_empty() || description.is_empty() {
            return Err(GameError::EmptyIdea);
        }

        Ok(Self {
            idea_name: name.to_string(),
            idea_description: description.to_string(),
            paid: false,
            levels: BTreeMap::new(),
        })
    }

    /// Progress on a level, if attempted.
    pub fn level(&self, level: Level) -> Option<&LevelState> {
        self.levels.get(&level)
    }

    /// Whether a level has been passed.
    pub fn is_passed(&self, level: Level) -> bool {
        self.level(level).is_some_and(|s| s.passed)
    }

    /// Whether the player may submit to a level right now.
    pub fn check_access(&self, level: Level) -> Result<(), GameError> {
        if level.is_paywalled() && !self.paid {
            return Err(GameError::Paywalled(level));
        }
        if let Some(previous) = level.previous() {
            if !self.is_passed(previous) {
                return Err(GameError::PreviousLevelIncomplete(level));
            }
        }
        if self.is_passed(level) {
            return Err(GameError::AlreadyPassed(level));
        }
        Ok(())
    }

    /// Current status of a level.
    pub fn level_status(&self, level: Level) -> LevelStatus {
        match self.level(level) {
            Some(state) if state.passed => LevelStatus::Passed,
            _ => match self.check_access(level) {
                Err(_) => LevelStatus::Locked,
                Ok(()) if self.level(level).is_some_and(|s| s.attempts > 0) => LevelStatus::Failed,
                Ok(()) => LevelStatus::Unattempted,
            },
        }
    }

    /// Number of passed levels (0-5).
    pub fn passed_count(&self) -> usize {
        self.levels.values().filter(|s| s.passed).count()
    }

    /// Sum of attempts over every level, saturating at `u32::MAX`.
    pub fn total_attempts(&self) -> u32 {
        self.levels
            .values()
            .fold(0u32, |total, s| total.saturating_add(s.attempts))
    }

    /// Passed levels over the total number of levels.
    pub fn completion_ratio(&self) -> f64 {
        self.passed_count() as f64 / Level::COUNT as f64
    }

    /// All five levels passed.
    pub fn is_complete(&self) -> bool {
        Level::ALL.iter().all(|l| self.is_passed(*l))
    }

    /// Where a resumed game should open: the first level not yet passed,
    /// or the last level when everything is done.
    pub fn first_incomplete_level(&self) -> Level {
        Level::ALL
            .into_iter()
            .find(|l| !self.is_passed(*l))
            .unwrap_or(Level::CrisisResponse)
    }
}
