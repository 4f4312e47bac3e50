//! The interaction state machine of an editing session.
//!
//! ```text
//!            start_drag              end_drag / cancel_drag
//!   Idle ───────────────► Dragging ───────────────────────► Idle
//!    │
//!    │       start_lasso             end_lasso / cancel_lasso
//!    └──────────────────► Lasso ─────────────────────────► Idle
//! ```
//!
//! Only one gesture runs at a time, and a new one can start only from `Idle`.
use super::drag::DragSession;
use super::lasso::LassoSession;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum InteractionState {
    /// No gesture in progress
    #[default]
    Idle,
    Dragging(DragSession),
    Lasso(LassoSession),
}

impl InteractionState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &InteractionState) -> bool {
        match (self, new_state) {
            // Any gesture ends back in Idle
            (_, InteractionState::Idle) => true,
            (InteractionState::Idle, _) => true,
            _ => false,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Dragging(_))
    }

    pub fn is_lasso(&self) -> bool {
        matches!(self, InteractionState::Lasso(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Dragging(_) => "drag",
            InteractionState::Lasso(_) => "lasso selection",
        }
    }

    pub fn drag(&self) -> Option<&DragSession> {
        match self {
            InteractionState::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn lasso(&self) -> Option<&LassoSession> {
        match self {
            InteractionState::Lasso(lasso) => Some(lasso),
            _ => None,
        }
    }
}
