//=========================================================================
// State Request
//=========================================================================
//
// The single deferred stack instruction.
//
// States arm the slot during their logic pass; the application manager
// takes it once per frame, before logic, and applies it. A second
// request in the same frame replaces the first.
//
//   NoRequest ──change/push/pop──▶ armed ──poll──▶ NoRequest
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::debug;

//=== Internal Dependencies ===============================================

use super::GameState;

//=== RequestKind =========================================================

/// Observable state of the request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestKind {
    #[default]
    NoRequest,
    ChangeRequest,
    PushRequest,
    PopRequest,
}

//=== StateRequest ========================================================

/// Pending stack operation, carrying the target state for change/push.
#[derive(Default)]
pub enum StateRequest {
    #[default]
    None,

    /// Exit and drop the top, then enter the target in its place.
    Change(Box<dyn GameState>),

    /// Pause the top, then enter the target above it.
    Push(Box<dyn GameState>),

    /// Exit and drop the top, then resume the one beneath. Ignored on the
    /// floor state.
    Pop,
}

impl StateRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::None => RequestKind::NoRequest,
            Self::Change(_) => RequestKind::ChangeRequest,
            Self::Push(_) => RequestKind::PushRequest,
            Self::Pop => RequestKind::PopRequest,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Arms the slot, replacing whatever was pending.
    pub(crate) fn arm(&mut self, request: StateRequest) {
        if !self.is_none() {
            debug!(
                target: "app",
                "{:?} replaces unapplied {:?}",
                request.kind(),
                self.kind()
            );
        }
        *self = request;
    }

    /// Takes the pending request, leaving `None` behind.
    pub(crate) fn take(&mut self) -> StateRequest {
        std::mem::take(self)
    }
}

impl fmt::Debug for StateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Change(state) => f.debug_tuple("Change").field(&state.name()).finish(),
            Self::Push(state) => f.debug_tuple("Push").field(&state.name()).finish(),
            Self::Pop => f.write_str("Pop"),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
