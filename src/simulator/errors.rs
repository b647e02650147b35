//! Simulator error types
//!
//! [`SimulatorError`] reports a broken internal invariant of the call-stack
//! simulator. The simulator is deterministic over its sorted input, so none of
//! these can be produced by user data; seeing one means the state machine
//! itself is wrong. Callers treat them as fatal and never retry.

use super::frame::CallId;
use crate::trace::TraceError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    /// The active cursor points at a frame that was never created
    #[error("Call frame {call_id} does not exist")]
    MissingFrame { call_id: CallId },

    /// A returning frame that should be absorbing a child has none
    #[error("Call frame {call_id} is returning but never entered a child call")]
    MissingChild { call_id: CallId },

    /// A frame tried to return before its child produced a value
    #[error("Call frame {call_id} cannot return before child {child_id} has returned")]
    ChildPending { call_id: CallId, child_id: CallId },

    /// A frame claimed a tail that is not in the sorted input
    #[error("Call frame {call_id} has no interval at suffix offset {offset}")]
    SuffixExhausted { call_id: CallId, offset: usize },

    /// The recorded steps failed trace validation
    #[error("Recorded steps do not form a valid trace: {0}")]
    InvalidTrace(#[from] TraceError),
}
