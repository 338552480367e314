//! Pure state transitions.
//!
//! Every change to a run goes through [`reduce`]; the controller only adds
//! judging, persistence and the in-flight guard around it.

use gauntlet_judge::{Level, Verdict};

use crate::error::GameError;
use crate::state::{GameState, LevelState};

/// Outcome of one judging call as seen by the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgment {
    /// A judge returned a verdict
    Judged(Verdict),
    /// The call failed (network, parse, configuration); still an attempt
    Unjudged(String),
}

/// Something the player did.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Register the idea; only valid with no game in progress
    StartGame { name: String, description: String },
    /// Set the paid flag (idempotent)
    Unlock,
    /// Apply one judged (or failed) submission
    RecordAttempt {
        level: Level,
        input: String,
        judgment: Judgment,
    },
    /// Discard the run
    Reset,
}

/// Apply an action to the current run.
pub fn reduce(state: Option<GameState>, action: Action) -> Result<Option<GameState>, GameError> {
    match action {
        Action::StartGame { name, description } => match state {
            Some(_) => Err(GameError::GameInProgress),
            None => GameState::new(&name, &description).map(Some),
        },

        Action::Unlock => {
            let mut state = state.ok_or(GameError::NoGame)?;
            state.paid = true;
            Ok(Some(state))
        }

        Action::RecordAttempt {
            level,
            input,
            judgment,
        } => {
            let mut state = state.ok_or(GameError::NoGame)?;
            if input.trim().is_empty() {
                return Err(GameError::EmptySubmission);
            }
            state.check_access(level)?;

            let entry = state.levels.entry(level).or_insert_with(LevelState::default);
            entry.attempts = entry.attempts.saturating_add(1);
            entry.last_input = input;
            if let Judgment::Judged(verdict) = judgment {
                entry.passed = verdict.is_pass();
                entry.last_result = Some(verdict);
            }

            Ok(Some(state))
        }

        Action::Reset => Ok(None),
    }
}
