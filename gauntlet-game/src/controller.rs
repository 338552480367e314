//! Gameplay controller.
//!
//! Owns the live run, talks to the judge and keeps the store in step. All
//! state changes are delegated to [`reduce`]; this layer adds judging, the
//! in-flight guard and persistence.

use dashmap::DashSet;
use gauntlet_judge::{JudgeError, JudgeRequest, Level, Verdict, VerdictKind};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::GameError;
use crate::judge_client::Judge;
use crate::report::{build_report, ReportId, ReportSnapshot, ReportView};
use crate::state::{GameState, LevelState, LevelStatus};
use crate::store::{KeyValueStore, ProgressStore};
use crate::transition::{reduce, Action, Judgment};

/// Result of one submission, in the shape the UI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub level: Level,
    /// The judge's verdict, or a FAIL-shaped stand-in when judging failed
    pub verdict: Verdict,
    /// False when `verdict` is a stand-in
    pub judged: bool,
    /// Level progress after the attempt was recorded
    pub level_state: LevelState,
}

impl SubmissionOutcome {
    pub fn is_pass(&self) -> bool {
        self.judged && self.verdict.is_pass()
    }
}

struct Session {
    game: Option<GameState>,
    active: Level,
    /// Bumped whenever the run is replaced, so late judgments can be dropped
    generation: u64,
}

/// Removes a level from the in-flight set when the submission ends.
struct JudgingGuard<'a> {
    judging: &'a DashSet<Level>,
    level: Level,
}

impl Drop for JudgingGuard<'_> {
    fn drop(&mut self) {
        self.judging.remove(&self.level);
    }
}

/// Stand-in verdict for a submission that could not be judged.
pub fn unjudged_verdict(error: &JudgeError) -> Verdict {
    let (reason, hint) = match error {
        JudgeError::Upstream(_) => (
            "Unable to connect to the judges. Please try again.",
            "Check your connection and retry.",
        ),
        JudgeError::Parse(_) => (
            "The judges' answer came back garbled. Please try again.",
            "Resubmit the same answer; nothing was decided.",
        ),
        JudgeError::Configuration(_) => (
            "The judges are not available right now.",
            "Try again later.",
        ),
        JudgeError::InvalidRequest(_) => (
            "Your submission could not be judged.",
            "Check that your answer is filled in and retry.",
        ),
    };

    Verdict {
        verdict: VerdictKind::Fail,
        reasons: vec![reason.to_string()],
        hint: hint.to_string(),
    }
}

/// Drives one player's run.
pub struct GameController<J, S> {
    judge: J,
    store: ProgressStore<S>,
    session: RwLock<Session>,
    judging: DashSet<Level>,
}

impl<J: Judge, S: KeyValueStore> GameController<J, S> {
    /// Restore any persisted run and resume at its first incomplete level.
    pub fn open(judge: J, store: S) -> Self {
        let store = ProgressStore::new(store);
        let game = store.load_game();
        let active = game
            .as_ref()
            .map(GameState::first_incomplete_level)
            .unwrap_or(Level::ProblemStatement);

        match &game {
            Some(state) => info!(
                passed = state.passed_count(),
                active = %active,
                "Resumed game in progress"
            ),
            None => debug!("No game in progress"),
        }

        Self {
            judge,
            store,
            session: RwLock::new(Session {
                game,
                active,
                generation: 0,
            }),
            judging: DashSet::new(),
        }
    }

    /// Snapshot of the live run.
    pub async fn state(&self) -> Option<GameState> {
        self.session.read().await.game.clone()
    }

    pub async fn active_level(&self) -> Level {
        self.session.read().await.active
    }

    /// Whether a judging call for `level` is outstanding.
    pub fn is_judging(&self, level: Level) -> bool {
        self.judging.contains(&level)
    }

    /// Status of every level, in play order.
    pub async fn level_statuses(&self) -> Vec<(Level, LevelStatus)> {
        let session = self.session.read().await;
        Level::ALL
            .into_iter()
            .map(|level| {
                let status = match &session.game {
                    Some(game) => game.level_status(level),
                    None => LevelStatus::Locked,
                };
                (level, status)
            })
            .collect()
    }

    /// Register the idea and start at level 1.
    pub async fn start_game(&self, name: &str, description: &str) -> Result<GameState, GameError> {
        let mut session = self.session.write().await;
        let game = reduce(
            session.game.clone(),
            Action::StartGame {
                name: name.to_string(),
                description: description.to_string(),
            },
        )?;

        session.game = game;
        session.active = Level::ProblemStatement;
        session.generation += 1;
        self.persist(&session.game);

        info!(name_len = name.trim().len(), "Game started");
        session.game.clone().ok_or(GameError::NoGame)
    }

    /// Set the paid flag. Idempotent.
    pub async fn unlock(&self) -> Result<(), GameError> {
        let mut session = self.session.write().await;
        let was_paid = session.game.as_ref().is_some_and(|g| g.paid);

        session.game = reduce(session.game.clone(), Action::Unlock)?;
        if !was_paid {
            self.persist(&session.game);
            info!("Gauntlet unlocked");
        }
        Ok(())
    }

    /// Discard the live run. Saved reports are kept.
    ///
    /// The in-memory run is dropped even when the saved copy cannot be
    /// removed; that failure is returned so the caller knows the old run
    /// will come back on the next [`open`](Self::open).
    pub async fn reset(&self) -> Result<(), GameError> {
        let mut session = self.session.write().await;
        session.game = None;
        session.active = Level::ProblemStatement;
        session.generation += 1;

        if let Err(e) = self.store.clear_game() {
            warn!(error = %e, "Failed to clear saved game");
            return Err(e.into());
        }
        info!("Game reset");
        Ok(())
    }

    /// Move to `level`. Passed levels may be revisited; locked ones may not.
    pub async fn proceed(&self, level: Level) -> Result<Level, GameError> {
        let mut session = self.session.write().await;
        let game = session.game.as_ref().ok_or(GameError::NoGame)?;

        match game.check_access(level) {
            Ok(()) | Err(GameError::AlreadyPassed(_)) => {}
            Err(e) => return Err(e),
        }

        session.active = level;
        debug!(level = %level, "Active level changed");
        Ok(level)
    }

    /// Judge an answer for the active level and record the attempt.
    ///
    /// Gating and duplicate checks happen before the judge is called. A
    /// judging failure still counts as an attempt and comes back as a
    /// FAIL-shaped outcome with `judged == false`.
    pub async fn submit(&self, input: &str) -> Result<SubmissionOutcome, GameError> {
        let (level, idea_name, generation) = {
            let session = self.session.read().await;
            let game = session.game.as_ref().ok_or(GameError::NoGame)?;
            if input.trim().is_empty() {
                return Err(GameError::EmptySubmission);
            }
            game.check_access(session.active)?;
            (session.active, game.idea_name.clone(), session.generation)
        };

        if !self.judging.insert(level) {
            debug!(level = %level, "Submission rejected, judgment outstanding");
            return Err(GameError::AlreadyJudging(level));
        }
        let _guard = JudgingGuard {
            judging: &self.judging,
            level,
        };

        debug!(level = %level, input_len = input.len(), "Submitting for judgment");
        let result = self
            .judge
            .judge(JudgeRequest::new(level, idea_name, input))
            .await;

        let (judgment, verdict) = match result {
            Ok(verdict) => (Judgment::Judged(verdict.clone()), verdict),
            Err(e) => {
                warn!(level = %level, error = %e, "Submission could not be judged");
                (Judgment::Unjudged(e.to_string()), unjudged_verdict(&e))
            }
        };
        let judged = matches!(judgment, Judgment::Judged(_));

        let mut session = self.session.write().await;
        if session.generation != generation {
            warn!(level = %level, "Dropping judgment for a replaced game");
            return Err(GameError::Superseded(level));
        }

        session.game = reduce(
            session.game.clone(),
            Action::RecordAttempt {
                level,
                input: input.to_string(),
                judgment,
            },
        )?;
        self.persist(&session.game);

        let level_state = session
            .game
            .as_ref()
            .and_then(|g| g.level(level))
            .cloned()
            .unwrap_or_default();

        info!(
            level = %level,
            attempts = level_state.attempts,
            verdict = ?verdict.verdict,
            judged,
            "Attempt recorded"
        );

        Ok(SubmissionOutcome {
            level,
            verdict,
            judged,
            level_state,
        })
    }

    /// Freeze a completed run under its own key.
    pub async fn generate_report(&self) -> Result<ReportSnapshot, GameError> {
        let session = self.session.read().await;
        let game = session.game.as_ref().ok_or(GameError::NoGame)?;
        if !game.is_complete() {
            return Err(GameError::Incomplete {
                passed: game.passed_count(),
            });
        }

        let snapshot = ReportSnapshot::capture(game);
        self.store.save_report(&snapshot)?;
        info!(report_id = %snapshot.id, "Report generated");
        Ok(snapshot)
    }

    /// Render a saved report, or the live run when the snapshot is missing.
    pub fn view_report(&self, id: &ReportId) -> Option<ReportView> {
        self.store
            .load_report(id)
            .map(|loaded| build_report(&loaded.state))
    }

    fn persist(&self, game: &Option<GameState>) {
        let result = match game {
            Some(state) => self.store.save_game(state),
            None => self.store.clear_game(),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist game state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unjudged_verdict_by_failure_class() {
        let network = unjudged_verdict(&JudgeError::Upstream("refused".into()));
        assert_eq!(network.verdict, VerdictKind::Fail);
        assert_eq!(
            network.reasons,
            vec!["Unable to connect to the judges. Please try again.".to_string()]
        );
        assert_eq!(network.hint, "Check your connection and retry.");

        let garbled = unjudged_verdict(&JudgeError::Parse("eof".into()));
        assert_ne!(garbled.reasons, network.reasons);
        assert!(!garbled.is_pass());
    }
}
