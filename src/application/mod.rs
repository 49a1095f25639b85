//! Application layer - turn handling over the dialogue core.
//!
//! `SessionController` runs turns against a single session and the form
//! collaborator. `DialogService` addresses sessions by id, stores them between
//! turns and enforces one turn in flight per session. `IdleSweeper` evicts
//! sessions nobody has touched for a while.

mod dialog_service;
mod idle_sweeper;
mod session_controller;

pub use dialog_service::{DialogService, SessionView, StartedDialog, TurnReport};
pub use idle_sweeper::{IdleSweeper, SweeperConfig};
pub use session_controller::{SessionController, DEFAULT_CALL_TIMEOUT};
