//! Form dialogue core.
//!
//! Sequences field prompts, moves into review once every field was asked,
//! and drives corrections until the user confirms.

mod directive;
mod errors;
mod field_list;
mod field_matcher;
mod machine;
mod phase;
mod reply;
mod response_store;
mod session;

pub use directive::Directive;
pub use errors::{DialogError, TRANSPORT_RETRY_MESSAGE};
pub use field_list::FieldList;
pub use field_matcher::FieldMatcher;
pub use machine::{DialogStateMachine, Progress, TurnPlan};
pub use phase::DialogPhase;
pub use reply::{ConfirmationReply, DialogInput};
pub use response_store::{ReconcileReport, ResponseStore, ReviewEntry};
pub use session::{FormSession, SessionStatus};
