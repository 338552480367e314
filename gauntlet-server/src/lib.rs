//! Gauntlet Server - the judging endpoint
//!
//! Accepts `POST /api/judge` submissions from the browser client, asks the
//! level's persona for a verdict and relays it.
//!
//! ## Routes
//!
//! - **`POST /api/judge`**: judge one submission
//! - **`GET /health`**: liveness, plus whether a model credential is set
//! - **`GET /version`**: build details
//! - **`OPTIONS *`**: CORS preflight

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::{Args, Provider};
pub use error::{Result, ServerError};
pub use server::{run, serve, AppState};
