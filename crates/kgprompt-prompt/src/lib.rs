//! Ontology → extraction-prompt compiler.
//!
//! Pure and synchronous. The output depends only on the set of entities and
//! relationships, never on their order in the model, so the same ontology
//! always compiles to the same text (and the same [`fingerprint`]).
//!
//! # Quick start
//!
//! ```no_run
//! use kgprompt_core::model::Ontology;
//!
//! let prompt = kgprompt_prompt::build_prompt(&Ontology::defaults());
//! println!("{prompt}");
//! ```

mod collate;
mod render;

use kgprompt_core::{
  Error, Result,
  model::Ontology,
  validate::validate_state,
};
use sha2::{Digest, Sha256};
use tracing::debug;

pub use collate::natural_cmp;

// ─── Public API ──────────────────────────────────────────────────────────────

/// Render `model` as a system prompt. Never fails; empty sections fall back
/// to fixed placeholder text.
pub fn build_prompt(model: &Ontology) -> String { render::render(model) }

/// Validate `model` and render it only if it has no errors.
pub fn compile(model: &Ontology) -> Result<String> {
  let errors = validate_state(model);
  if errors.has_errors() {
    return Err(Error::ValidationFailed(Box::new(errors)));
  }
  let prompt = build_prompt(model);
  debug!(
    entities = model.entities.len(),
    relationships = model.relationships.len(),
    bytes = prompt.len(),
    "compiled prompt"
  );
  Ok(prompt)
}

/// Lowercase hex SHA-256 of a compiled prompt.
pub fn fingerprint(prompt: &str) -> String {
  hex::encode(Sha256::digest(prompt.as_bytes()))
}

#[cfg(test)]
mod tests;
