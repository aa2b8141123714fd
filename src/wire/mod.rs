//! JSON messages exchanged with game clients. Outbound events are the only
//! contract browsers depend on, so their shape must not drift.

pub mod client_message;
pub mod server_event;

pub use client_message::ClientMessage;
pub use server_event::ServerEvent;
