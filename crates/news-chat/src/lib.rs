//! A news assistant for the terminal.
//!
//! The crate includes a CLI tool that talks to a news search backend over
//! HTTP. The rendering and decoration helpers are usable on their own by
//! other front ends built on [`news_chat_core`].

#![deny(missing_docs)]

pub mod markup;
pub mod render;

/// Re-exports of [`news_chat_core`] crate.
pub mod core {
    pub use news_chat_core::*;
}
