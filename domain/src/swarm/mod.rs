//! Swarm subdomain - the hand-off protocol between agents.
//!
//! ```text
//! Pending ──activate──► Active(a₀) ──hand_off──► Active(a₁) ─ ... ─► Completed
//!                            │                                         ▲
//!                            └──────────────── fail ──────► Failed     │
//!                                                   answer / budget ───┘
//! ```
//!
//! - [`state::SwarmState`] - the state machine plus hop budget
//! - [`context::SharedContext`] - query and findings visible to every agent
//! - [`history::ExecutionHistory`] - ordered record of activations
//! - [`result::InvestigationResult`] - per-agent findings reduced from history
//! - [`report::format_report`] - human-readable rendering of a result

pub mod context;
pub mod history;
pub mod report;
pub mod result;
pub mod state;
