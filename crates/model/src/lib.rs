//! Data model shared by the news chat crates.
//!
//! This crate establishes the contract between the conversation manager
//! and whatever backend answers its searches. A gateway implements
//! [`SearchGateway`], and the manager only ever sees the types defined
//! here, so the HTTP client and the in-process test double are
//! interchangeable.
//!
//! Types in this crate don't define any behavior beyond pure derivations
//! (relevance tiers, timestamp parsing). Everything stateful lives in the
//! crates that use them.

#![deny(missing_docs)]

mod error;
mod gateway;
mod message;
mod request;
mod response;
mod result;

pub use error::*;
pub use gateway::*;
pub use message::*;
pub use request::*;
pub use response::*;
pub use result::*;
