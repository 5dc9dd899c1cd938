//! Command-line rendering of flashcard collections.
//!
//! The `cardface` binary loads a YAML [`CollectionFile`] and renders its cards
//! with `cardface-render`, using the in-memory engine from `cardface-engine`.
//!
//! ```text
//! cardface render deck.yaml              # every card, as text
//! cardface render deck.yaml --card 3     # one card
//! cardface render deck.yaml --json       # RenderOutput per card
//! cardface voices deck.yaml --lang ja_JP # voice chosen for each TTS tag
//! ```

pub mod commands;
pub mod config;

pub use commands::{render, voices, RenderOptions};
pub use config::CollectionFile;
