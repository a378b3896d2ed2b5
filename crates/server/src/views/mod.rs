//! View models: plain serializable structs the client renders as-is.
//!
//! Builders take everything they need as arguments, including the
//! [`SessionContext`], so nothing is read from ambient request state.

pub mod card;
pub mod detail;
pub mod genre_filter;
pub mod grid;
pub mod search_box;

use serde::Serialize;

use crate::identity::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub signed_in: bool,
    pub admin: bool,
}

impl From<&SessionContext> for SessionView {
    fn from(session: &SessionContext) -> Self {
        Self {
            signed_in: session.viewer.is_some(),
            admin: session.admin,
        }
    }
}
