//! tablegrab Table Provider
//!
//! The content side of the extension scans a page's DOM and answers
//! table requests addressed to a browser tab. This crate holds the table
//! model, the request/response messages, and the async provider contract
//! the capture engine talks to.

mod channel;
mod error;
mod protocol;
mod provider;
mod tab_id;
mod table;

pub use channel::{MessageChannel, MessagingProvider};
pub use error::ProviderError;
pub use protocol::{TableRequest, TableResponse, TablesResponse};
pub use provider::TableProvider;
pub use tab_id::TabId;
pub use table::{cell_text, Cell, Row, Table};

pub type Result<T> = std::result::Result<T, ProviderError>;
