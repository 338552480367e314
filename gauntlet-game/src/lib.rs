//! Gauntlet Game - progress, gating and reports for the idea gauntlet
//!
//! A player registers an idea, then answers five prompts in order. Each
//! answer is judged PASS/FAIL; levels 3-5 need the unlock, and every level
//! needs the previous one passed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   GameController                     │
//! │  ┌───────────┐  ┌─────────────┐  ┌───────────────┐   │
//! │  │  reduce   │  │ Judge       │  │ ProgressStore │   │
//! │  │ (pure)    │  │ (in-process │  │ (memory/file) │   │
//! │  │           │  │  or HTTP)   │  │               │   │
//! │  └───────────┘  └─────────────┘  └───────────────┘   │
//! └──────────────────────────────────────────────────────┘
//!                          │
//!                    build_report
//! ```

pub mod catalog;
pub mod controller;
pub mod error;
pub mod judge_client;
pub mod report;
pub mod state;
pub mod store;
pub mod transition;

pub use catalog::LevelInfo;
pub use controller::{unjudged_verdict, GameController, SubmissionOutcome};
pub use error::{GameError, StorageError};
pub use judge_client::{HttpJudge, Judge};
pub use report::{build_report, ReportEntry, ReportId, ReportSnapshot, ReportView};
pub use state::{GameState, LevelState, LevelStatus};
pub use store::{FileStore, KeyValueStore, LoadedReport, MemoryStore, ProgressStore};
pub use transition::{reduce, Action, Judgment};
