//! Request lifecycle stages
//!
//! The six fixed points in request processing where extension callbacks run.
//! This set is the system's stable extension surface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six lifecycle stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Request arrived, nothing parsed yet
    Preparse,
    /// The request has been parsed into a structured form
    Postparse,
    /// Just before the compiled query runs
    Prerun,
    /// The query ran; a result is available
    Postrun,
    /// The response is being assembled and may still be mutated
    Prerespond,
    /// The request failed after parsing
    PostrunError,
}

impl Stage {
    /// All stages, in lifecycle order.
    pub const ALL: [Stage; 6] = [
        Stage::Preparse,
        Stage::Postparse,
        Stage::Prerun,
        Stage::Postrun,
        Stage::Prerespond,
        Stage::PostrunError,
    ];

    /// The wire/registration name of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preparse => "PREPARSE",
            Stage::Postparse => "POSTPARSE",
            Stage::Prerun => "PRERUN",
            Stage::Postrun => "POSTRUN",
            Stage::Prerespond => "PRERESPOND",
            Stage::PostrunError => "POSTRUN-ERROR",
        }
    }

    /// Whether the stage runs after the query has executed.
    ///
    /// Post-execution stages visit versions newest-first, translating
    /// results back down to the version the client actually requested.
    pub fn is_post_execution(&self) -> bool {
        matches!(
            self,
            Stage::Postrun | Stage::Prerespond | Stage::PostrunError
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
