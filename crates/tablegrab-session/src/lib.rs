//! tablegrab Paginated Capture
//!
//! Accumulates the rows of one table across successive pages of a
//! paginated listing:
//! - One capture session per browser tab, at most one at a time
//! - Sessions persist on every mutation and survive popup close/reopen
//! - Header rows repeated on every page are dropped while merging

mod error;
mod machine;
pub mod merge;
mod session;
mod state;
mod store;

pub use error::SessionError;
pub use machine::{CaptureOutcome, CaptureReport, PaginationMachine};
pub use merge::{merge, MergeResult};
pub use session::PaginationSession;
pub use state::{CaptureAction, CaptureState};
pub use store::{SessionMap, SessionStore, SESSIONS_KEY};

pub type Result<T> = std::result::Result<T, SessionError>;
