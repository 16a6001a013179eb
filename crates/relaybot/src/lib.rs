//! relaybot - Telegram front end of the video relay
//!
//! # Module Structure
//!
//! - `cli`: command line definition
//! - `fetch`: offline `fetch` and `check` commands
//! - `supervisor`: dispatcher restart loop
//! - `telegram`: commands, handlers and the status sink

pub mod cli;
pub mod fetch;
pub mod supervisor;
pub mod telegram;

pub use telegram::{schema, HandlerDeps, HandlerError};
