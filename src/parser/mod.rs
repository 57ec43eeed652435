//! Terminal escape sequence parser
//!
//! A stateful decoder that converts a byte stream into terminal actions,
//! resilient to arbitrary chunk boundaries.

mod action;
mod state;

pub use action::{Action, CsiAction, CsiParams, EscAction};
pub use state::Parser;
