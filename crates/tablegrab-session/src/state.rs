//! Capture State Machine
//!
//! ```text
//! NoSession
//!   ↓ start
//! Capturing ──┐ capture / finish
//!   ↑─────────┘
//!   ↓ clear
//! NoSession
//! ```
//!
//! `clear` is accepted in both states.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// No capture in progress for the tab
    NoSession,
    /// A session exists and pages can be added to it
    Capturing,
}

/// User actions driving the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAction {
    Start,
    Capture,
    Finish,
    Clear,
}

impl CaptureState {
    pub fn allows(&self, action: CaptureAction) -> bool {
        match (self, action) {
            (CaptureState::NoSession, CaptureAction::Start) => true,
            (CaptureState::Capturing, CaptureAction::Capture) => true,
            (CaptureState::Capturing, CaptureAction::Finish) => true,
            (_, CaptureAction::Clear) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureState::NoSession => "no_session",
            CaptureState::Capturing => "capturing",
        }
    }
}

impl CaptureAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureAction::Start => "start",
            CaptureAction::Capture => "capture",
            CaptureAction::Finish => "finish",
            CaptureAction::Clear => "clear",
        }
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
