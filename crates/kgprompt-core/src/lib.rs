//! Core types for the knowledge-graph prompt editor.
//!
//! Holds the ontology model and everything that keeps it consistent across
//! edits: id generation, schema migration, validation, the closed action and
//! field vocabularies, and the debounced persistence adapter.
//!
//! Storage backends (e.g. `kgprompt-store-sqlite`) implement
//! [`store::StateStore`]; the prompt compiler lives in `kgprompt-prompt`.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// trait's return types instead.
#![allow(async_fn_in_trait)]

pub mod action;
pub mod defaults;
pub mod edit;
pub mod error;
pub mod id;
pub mod migrate;
pub mod model;
pub mod persist;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
