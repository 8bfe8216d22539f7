//! Conversation orchestration: per-session state, the intake controller,
//! and history search.

pub mod controller;
pub mod search;
pub mod session;

pub use controller::{ControllerError, ConversationController};
pub use session::{IgnoreReason, Intake, IntakeOutcome, SessionContext, SummaryOutcome};
