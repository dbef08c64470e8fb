//! Storage traits for clients, authorization codes and access tokens.
//!
//! The flows depend only on these traits. Failures are reported as a
//! [`BoxError`](crate::error::BoxError), which the flows wrap as
//! `server_error` without exposing the message.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - in-process store backed by `dashmap`

pub mod client;
pub mod code;
pub mod memory;
pub mod token;

pub use client::ClientStorage;
pub use code::AuthCodeStorage;
pub use memory::MemoryStore;
pub use token::AccessTokenStorage;
