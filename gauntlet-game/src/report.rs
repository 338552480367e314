//! Shareable reports.
//!
//! A report is a frozen copy of a run stored under its own key, so it
//! outlives a later reset of the live game.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use gauntlet_judge::Level;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::state::GameState;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Length of a report identifier.
pub const REPORT_ID_LEN: usize = 16;

/// Opaque sharing token for a report.
///
/// Derived from the idea name and creation time; collisions are possible
/// and tolerated. Not an access-control mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Base64 of `idea_name + epoch_millis`, alphanumerics only, truncated.
    pub fn derive(idea_name: &str, created_at: DateTime<Utc>) -> Self {
        let seed = format!("{}{}", idea_name, created_at.timestamp_millis());
        let id = STANDARD
            .encode(seed.as_bytes())
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(REPORT_ID_LEN)
            .collect();
        Self(id)
    }

    /// Accept an identifier from a URL; alphanumeric only.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= REPORT_ID_LEN
            && raw.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Frozen copy of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub id: ReportId,
    pub created_at: DateTime<Utc>,
    pub state: GameState,
}

impl ReportSnapshot {
    /// Snapshot a run now.
    pub fn capture(state: &GameState) -> Self {
        Self::capture_at(state, Utc::now())
    }

    /// Snapshot a run at a given time.
    pub fn capture_at(state: &GameState, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ReportId::derive(&state.idea_name, created_at),
            created_at,
            state: state.clone(),
        }
    }
}

/// One passed level as shown in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    #[cfg_attr(feature = "typescript", ts(type = "number"))]
    pub level: Level,
    pub persona: String,
    pub task: String,
    pub answer: String,
    /// Judge's hint from the passing verdict
    pub judge_note: Option<String>,
}

/// Read-only summary of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub idea_name: String,
    pub idea_description: String,
    pub entries: Vec<ReportEntry>,
    pub passed_count: usize,
    pub total_attempts: u32,
    pub completion_ratio: f64,
    /// Completion as a rounded percentage
    pub completion_percent: u32,
    /// All five judges passed
    pub survived: bool,
}

/// Summarize a run: passed levels in ascending order plus totals.
pub fn build_report(state: &GameState) -> ReportView {
    let entries: Vec<ReportEntry> = state
        .levels
        .iter()
        .filter(|(_, progress)| progress.passed)
        .map(|(level, progress)| {
            let info = catalog::info(*level);
            ReportEntry {
                level: *level,
                persona: info.persona.to_string(),
                task: info.task_label.to_string(),
                answer: progress.last_input.clone(),
                judge_note: progress.last_result.as_ref().map(|r| r.hint.clone()),
            }
        })
        .collect();

    let passed_count = entries.len();
    let completion_ratio = passed_count as f64 / Level::COUNT as f64;

    ReportView {
        idea_name: state.idea_name.clone(),
        idea_description: state.idea_description.clone(),
        passed_count,
        total_attempts: state.total_attempts(),
        completion_ratio,
        completion_percent: (completion_ratio * 100.0).round() as u32,
        survived: passed_count == Level::COUNT,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LevelState;
    use chrono::TimeZone;
    use gauntlet_judge::{Verdict, VerdictKind};

    fn level_state(passed: bool, attempts: u32, hint: &str) -> LevelState {
        LevelState {
            passed,
            attempts,
            last_input: format!("answer after {} tries", attempts),
            last_result: Some(Verdict {
                verdict: if passed { VerdictKind::Pass } else { VerdictKind::Fail },
                reasons: vec!["r".into()],
                hint: hint.into(),
            }),
        }
    }

    #[test]
    fn test_report_lists_passed_levels_in_order() {
        let mut state = GameState::new("Acme", "invoices").unwrap();
        state.levels.insert(Level::ValueProposition, level_state(true, 2, "defend it"));
        state.levels.insert(Level::ProblemStatement, level_state(true, 1, "ship it"));

        let report = build_report(&state);

        let levels: Vec<Level> = report.entries.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![Level::ProblemStatement, Level::ValueProposition]);
        assert_eq!(report.passed_count, 2);
        assert_eq!(report.total_attempts, 3);
        assert_eq!(report.completion_percent, 40);
        assert!(!report.survived);

        let first = &report.entries[0];
        assert_eq!(first.persona, "The Skeptic");
        assert_eq!(first.task, "Problem Statement");
        assert_eq!(first.judge_note.as_deref(), Some("ship it"));
    }

    #[test]
    fn test_failed_levels_count_attempts_only() {
        let mut state = GameState::new("Acme", "invoices").unwrap();
        state.levels.insert(Level::ProblemStatement, level_state(false, 4, "narrow"));

        let report = build_report(&state);
        assert!(report.entries.is_empty());
        assert_eq!(report.passed_count, 0);
        assert_eq!(report.total_attempts, 4);
        assert_eq!(report.completion_ratio, 0.0);
    }

    #[test]
    fn test_tampered_attempt_counts_saturate() {
        let json = r#"{
            "ideaName": "Acme",
            "ideaDescription": "invoices",
            "paid": false,
            "levels": {
                "1": {"passed": true, "attempts": 4294967295, "lastInput": "x"},
                "2": {"passed": false, "attempts": 1, "lastInput": "y"}
            }
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();

        let report = build_report(&state);
        assert_eq!(report.total_attempts, u32::MAX);
        assert_eq!(report.passed_count, 1);
    }

    #[test]
    fn test_survived() {
        let mut state = GameState::new("Acme", "invoices").unwrap();
        for level in Level::ALL {
            state.levels.insert(level, level_state(true, 1, "ok"));
        }
        let report = build_report(&state);
        assert!(report.survived);
        assert_eq!(report.completion_percent, 100);
    }

    #[test]
    fn test_report_id() {
        let at = Utc.timestamp_millis_opt(1_767_225_600_000).unwrap();
        let id = ReportId::derive("Acme", at);

        assert_eq!(id.as_str(), "QWNtZTE3NjcyMjU2");
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(id, ReportId::derive("Acme", at));
        assert_eq!(ReportId::parse(id.as_str()), Some(id));

        assert_eq!(ReportId::parse("../etc/passwd"), None);
        assert_eq!(ReportId::parse(""), None);
    }
}
