//! Conversation session management
//!
//! This module provides the `SessionController` that owns one panel's conversation:
//! - Timeline of messages, seeded with a greeting
//! - The pending gate (one exchange in flight at a time)
//! - Text and voice exchanges through a `Transport`
//! - Reply normalization into display text

mod controller;
mod conversation;
mod message;

pub use controller::{ExchangeOutcome, IgnoreReason, OpenExchange, SessionController};
pub use conversation::Conversation;
pub use message::{Message, MessageId, Origin};
