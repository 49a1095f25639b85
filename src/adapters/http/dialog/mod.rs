//! HTTP adapter for the form dialogue.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    DirectiveResponse, ErrorResponse, FinalizeResponse, InputAction, InputRequest,
    SessionResponse, StartSessionRequest, StartSessionResponse, TurnResponse,
};
pub use handlers::DialogHandlers;
pub use routes::dialog_routes;
